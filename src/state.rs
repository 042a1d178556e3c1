use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::Mutex;

use crate::feedback::FeedbackProvider;
use crate::schedule::Schedule;
use crate::storage::{EssayArchive, ProgressLog, RepetitionStore};

/// Source of "today" for lesson lookup. Tests pin it to a fixed date.
#[derive(Debug, Clone, Copy)]
pub enum Clock {
    System,
    Fixed(NaiveDate),
}

impl Clock {
    pub fn today(&self) -> NaiveDate {
        match self {
            Clock::System => chrono::Local::now().date_naive(),
            Clock::Fixed(date) => *date,
        }
    }
}

/// Everything the dispatcher needs, shared across handler tasks.
///
/// `awaiting_essay` is the single-slot continuation of the submission
/// workflow: a user id is present iff that user's next plain message is to
/// be read as essay text instead of a menu command.
pub struct AppState {
    schedule: Schedule,
    progress: ProgressLog,
    repetition: RepetitionStore,
    essays: EssayArchive,
    feedback: Arc<dyn FeedbackProvider>,
    awaiting_essay: Mutex<HashSet<String>>,
    clock: Clock,
}

impl AppState {
    pub fn new(
        schedule: Schedule,
        progress: ProgressLog,
        repetition: RepetitionStore,
        essays: EssayArchive,
        feedback: Arc<dyn FeedbackProvider>,
        clock: Clock,
    ) -> Self {
        Self {
            schedule,
            progress,
            repetition,
            essays,
            feedback,
            awaiting_essay: Mutex::new(HashSet::new()),
            clock,
        }
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn progress(&self) -> &ProgressLog {
        &self.progress
    }

    pub fn repetition(&self) -> &RepetitionStore {
        &self.repetition
    }

    pub fn essays(&self) -> &EssayArchive {
        &self.essays
    }

    pub fn feedback(&self) -> &dyn FeedbackProvider {
        self.feedback.as_ref()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub async fn mark_awaiting_essay(&self, user_id: &str) {
        self.awaiting_essay.lock().await.insert(user_id.to_string());
    }

    /// Consumes the pending slot. Returns whether an essay was expected.
    pub async fn take_awaiting_essay(&self, user_id: &str) -> bool {
        self.awaiting_essay.lock().await.remove(user_id)
    }

    pub async fn cancel_awaiting_essay(&self, user_id: &str) {
        self.awaiting_essay.lock().await.remove(user_id);
    }
}
