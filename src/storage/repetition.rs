use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use tokio::sync::Mutex;

use super::StoreError;

type RepetitionMap = BTreeMap<String, BTreeSet<String>>;

/// Words each user missed and should review, persisted as a JSON document
/// mapping user id to a sorted list of distinct words. Every update is a
/// read-modify-write of the whole file, so the mutex here is what keeps
/// concurrent submissions from losing each other's unions.
pub struct RepetitionStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl RepetitionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Union the given words into the user's set. Inserting a word that is
    /// already present leaves the set unchanged.
    pub async fn add_missed<I>(&self, user_id: &str, words: I) -> Result<(), StoreError>
    where
        I: IntoIterator<Item = String>,
    {
        let _guard = self.lock.lock().await;
        let mut map = self.read_map()?;
        map.entry(user_id.to_string()).or_default().extend(words);
        self.write_map(&map)?;
        Ok(())
    }

    pub async fn words_for(&self, user_id: &str) -> Result<Vec<String>, StoreError> {
        let _guard = self.lock.lock().await;
        let map = self.read_map()?;
        Ok(map
            .get(user_id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    fn read_map(&self) -> Result<RepetitionMap, StoreError> {
        if !self.path.exists() {
            return Ok(RepetitionMap::new());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(RepetitionMap::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    fn write_map(&self, map: &RepetitionMap) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(map)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}
