use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One vocabulary item of a daily lesson. The schedule file uses the short
/// `pos` key for the part of speech.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordEntry {
    pub word: String,
    #[serde(rename = "pos")]
    pub part_of_speech: String,
    pub translation: String,
    pub example: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyLesson {
    pub theme: String,
    pub words: Vec<WordEntry>,
}

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("failed to read schedule {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse schedule {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Read-only lesson plan keyed by ISO calendar date. Loaded once at startup;
/// a malformed file is a fatal error, never a partially loaded schedule.
pub struct Schedule {
    days: BTreeMap<NaiveDate, DailyLesson>,
}

impl Schedule {
    pub fn new(days: BTreeMap<NaiveDate, DailyLesson>) -> Self {
        Self { days }
    }

    pub fn load(path: &Path) -> Result<Self, ScheduleError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ScheduleError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let days = serde_json::from_str(&raw).map_err(|source| ScheduleError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { days })
    }

    pub fn lesson_for(&self, date: NaiveDate) -> Option<&DailyLesson> {
        self.days.get(&date)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}
