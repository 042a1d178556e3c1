use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use chrono::NaiveDate;
use tokio::sync::Mutex;

use super::StoreError;

const HEADER: &str = "user_id,date,total_words,used_words,flag";

/// One line of the progress log. One record per essay submission;
/// duplicates for the same (user, date) are allowed and never deduplicated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressRecord {
    pub user_id: String,
    pub date: NaiveDate,
    pub total_words: usize,
    pub used_words: usize,
    pub submitted: bool,
}

impl ProgressRecord {
    fn to_line(&self) -> String {
        format!(
            "{},{},{},{},{}",
            self.user_id,
            self.date.format("%Y-%m-%d"),
            self.total_words,
            self.used_words,
            if self.submitted { "yes" } else { "no" }
        )
    }

    fn parse(line: &str, line_no: usize) -> Result<Self, StoreError> {
        let malformed = |reason: &str| StoreError::Malformed {
            line: line_no,
            reason: reason.to_string(),
        };

        let mut fields = line.split(',');
        let user_id = fields.next().ok_or_else(|| malformed("missing user_id"))?;
        let date = fields
            .next()
            .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
            .ok_or_else(|| malformed("bad date"))?;
        let total_words = fields
            .next()
            .and_then(|raw| raw.parse().ok())
            .ok_or_else(|| malformed("bad total_words"))?;
        let used_words = fields
            .next()
            .and_then(|raw| raw.parse().ok())
            .ok_or_else(|| malformed("bad used_words"))?;
        let submitted = match fields.next() {
            Some("yes") => true,
            Some("no") => false,
            _ => return Err(malformed("bad flag")),
        };

        Ok(Self {
            user_id: user_id.to_string(),
            date,
            total_words,
            used_words,
            submitted,
        })
    }
}

/// Append-only CSV log, created with its header on first write. Appends and
/// reads are serialized by a mutex; no existing line is ever rewritten.
pub struct ProgressLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl ProgressLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub async fn append(&self, record: &ProgressRecord) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        self.ensure_exists()?;

        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        writeln!(file, "{}", record.to_line())?;
        Ok(())
    }

    /// Number of records whose `user_id` field matches exactly.
    pub async fn count_for_user(&self, user_id: &str) -> Result<usize, StoreError> {
        let records = self.records().await?;
        Ok(records.iter().filter(|r| r.user_id == user_id).count())
    }

    pub async fn records(&self) -> Result<Vec<ProgressRecord>, StoreError> {
        let _guard = self.lock.lock().await;
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let raw = std::fs::read_to_string(&self.path)?;
        raw.lines()
            .enumerate()
            .skip(1)
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| ProgressRecord::parse(line, idx + 1))
            .collect()
    }

    fn ensure_exists(&self) -> Result<(), StoreError> {
        if self.path.exists() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, format!("{HEADER}\n"))?;
        Ok(())
    }
}
