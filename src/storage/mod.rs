pub mod essays;
pub mod progress;
pub mod repetition;

pub use essays::EssayArchive;
pub use progress::{ProgressLog, ProgressRecord};
pub use repetition::RepetitionStore;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("store JSON invalid: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed progress record at line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}
