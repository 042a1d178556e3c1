use std::path::PathBuf;

use chrono::NaiveDate;

use super::StoreError;

/// Raw submitted essays, one text file per (user, date). A second
/// submission on the same day overwrites the first.
pub struct EssayArchive {
    dir: PathBuf,
}

impl EssayArchive {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn store(&self, user_id: &str, date: NaiveDate, text: &str) -> Result<PathBuf, StoreError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(user_id, date);
        std::fs::write(&path, text)?;
        Ok(path)
    }

    pub fn path_for(&self, user_id: &str, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("{user_id}_{}.txt", date.format("%Y-%m-%d")))
    }
}
