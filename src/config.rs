use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    pub schedule_path: PathBuf,
    pub storage_dir: PathBuf,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let bot_token = env_string("BOT_TOKEN").ok_or(ConfigError::Missing("BOT_TOKEN"))?;

        let schedule_path = env_string("SCHEDULE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("words_schedule.json"));

        let storage_dir = env_string("STORAGE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("storage"));

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            bot_token,
            schedule_path,
            storage_dir,
            log_level,
        })
    }

    pub fn progress_path(&self) -> PathBuf {
        self.storage_dir.join("progress.csv")
    }

    pub fn repetition_path(&self) -> PathBuf {
        self.storage_dir.join("repetition.json")
    }

    pub fn essays_dir(&self) -> PathBuf {
        self.storage_dir.join("essays")
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
