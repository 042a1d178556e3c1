use tracing::{error, info};

use crate::bot::keyboard::{MY_PROGRESS, REPETITION, SUBMIT_ESSAY, SUPPORT, TODAYS_WORDS};
use crate::schedule::DailyLesson;
use crate::state::AppState;
use crate::storage::{ProgressRecord, StoreError};
use crate::usage::{check_usage, missed_words};

pub const GREETING: &str =
    "Hi! I'm VocabularBot — your daily English vocabulary coach. Tap 📘 Today's words to get started.";
pub const CHOOSE_ACTION: &str = "Choose an action:";
pub const NO_LESSON_TODAY: &str = "Nothing scheduled for today.";
pub const SEND_ESSAY_PROMPT: &str = "Send your essay as one message.";
pub const NOTHING_TO_REPEAT: &str = "Nothing to repeat yet.";
pub const NOTHING_TO_SCORE: &str =
    "No lesson today, so there is nothing to score. Check back tomorrow!";
pub const FEEDBACK_UNAVAILABLE: &str =
    "Could not get feedback right now — your essay was saved and scored.";
pub const STORE_FAILURE: &str = "Something went wrong on our side. Please try again later.";
pub const SUPPORT_TEXT: &str =
    "If you'd like to support the project ❤️\n📲 Kaspi Gold: +7 777 772 21 70\nThank you so much!";

/// One outbound message. The transport layer decides how each variant is
/// rendered (parse mode, attached keyboard).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Markdown(String),
    /// Plain text accompanied by the main menu keyboard.
    Menu(String),
}

impl Reply {
    pub fn text(&self) -> &str {
        match self {
            Reply::Text(s) | Reply::Markdown(s) | Reply::Menu(s) => s,
        }
    }
}

/// Routes one inbound message. Commands and button labels are matched
/// exactly; while a user has a pending essay slot, any other text is taken
/// as the essay. A command issued before the essay arrives wins: the
/// pending slot is dropped and the command runs. Everything else is
/// ignored without a reply.
pub async fn handle_text(state: &AppState, user_id: &str, text: &str) -> Vec<Reply> {
    let trimmed = text.trim();

    if is_known_command(trimmed) {
        state.cancel_awaiting_essay(user_id).await;
        return dispatch_command(state, user_id, trimmed).await;
    }

    if state.take_awaiting_essay(user_id).await {
        return match submit_essay(state, user_id, text).await {
            Ok(replies) => replies,
            Err(err) => {
                error!(user = %user_id, error = %err, "essay submission failed");
                vec![Reply::Text(STORE_FAILURE.to_string())]
            }
        };
    }

    Vec::new()
}

fn is_known_command(text: &str) -> bool {
    matches!(
        text,
        "/start" | "/menu" | TODAYS_WORDS | SUBMIT_ESSAY | REPETITION | MY_PROGRESS | SUPPORT
    )
}

async fn dispatch_command(state: &AppState, user_id: &str, text: &str) -> Vec<Reply> {
    match text {
        "/start" => vec![Reply::Menu(GREETING.to_string())],
        "/menu" => vec![Reply::Menu(CHOOSE_ACTION.to_string())],
        TODAYS_WORDS => todays_words(state),
        SUBMIT_ESSAY => {
            state.mark_awaiting_essay(user_id).await;
            vec![Reply::Text(SEND_ESSAY_PROMPT.to_string())]
        }
        REPETITION => repetition_words(state, user_id).await,
        MY_PROGRESS => my_progress(state, user_id).await,
        SUPPORT => vec![Reply::Text(SUPPORT_TEXT.to_string())],
        _ => Vec::new(),
    }
}

fn todays_words(state: &AppState) -> Vec<Reply> {
    match state.schedule().lesson_for(state.today()) {
        Some(lesson) => vec![Reply::Markdown(render_lesson(lesson))],
        None => vec![Reply::Text(NO_LESSON_TODAY.to_string())],
    }
}

fn render_lesson(lesson: &DailyLesson) -> String {
    let mut text = format!("🎯 Theme: {}\n\n", lesson.theme);
    for entry in &lesson.words {
        text.push_str(&format!(
            "🔹 *{}* ({}) — {}\n_{}_\n\n",
            entry.word, entry.part_of_speech, entry.translation, entry.example
        ));
    }
    text
}

async fn repetition_words(state: &AppState, user_id: &str) -> Vec<Reply> {
    match state.repetition().words_for(user_id).await {
        Ok(words) if words.is_empty() => vec![Reply::Text(NOTHING_TO_REPEAT.to_string())],
        Ok(words) => {
            let list = words
                .iter()
                .map(|word| format!("🔁 {word}"))
                .collect::<Vec<_>>()
                .join("\n");
            vec![Reply::Text(list)]
        }
        Err(err) => {
            error!(user = %user_id, error = %err, "repetition store read failed");
            vec![Reply::Text(STORE_FAILURE.to_string())]
        }
    }
}

async fn my_progress(state: &AppState, user_id: &str) -> Vec<Reply> {
    match state.progress().count_for_user(user_id).await {
        Ok(count) => vec![Reply::Text(format!("📈 Essays submitted: {count}"))],
        Err(err) => {
            error!(user = %user_id, error = %err, "progress log read failed");
            vec![Reply::Text(STORE_FAILURE.to_string())]
        }
    }
}

/// The composite submission workflow: archive, score, feedback, progress,
/// repetition, then the two reply messages. A failed feedback call keeps
/// the persisted side of the workflow intact and only swaps the second
/// reply for an apology.
async fn submit_essay(state: &AppState, user_id: &str, text: &str) -> Result<Vec<Reply>, StoreError> {
    let today = state.today();

    let Some(lesson) = state.schedule().lesson_for(today) else {
        info!(user = %user_id, "essay received on a day with no lesson");
        return Ok(vec![Reply::Text(NOTHING_TO_SCORE.to_string())]);
    };

    state.essays().store(user_id, today, text)?;

    let used = check_usage(&lesson.words, text);
    let missed = missed_words(&lesson.words, &used);

    let feedback = match state.feedback().review_essay(text).await {
        Ok(critique) => Some(critique),
        Err(err) => {
            error!(user = %user_id, error = %err, "feedback request failed");
            None
        }
    };

    state
        .progress()
        .append(&ProgressRecord {
            user_id: user_id.to_string(),
            date: today,
            total_words: lesson.words.len(),
            used_words: used.len(),
            submitted: true,
        })
        .await?;

    if !missed.is_empty() {
        state.repetition().add_missed(user_id, missed).await?;
    }

    info!(user = %user_id, used = used.len(), total = lesson.words.len(), "essay scored");

    let mut replies = vec![Reply::Text(format!(
        "📝 Essay received.\n✅ Used {} of {} words.",
        used.len(),
        lesson.words.len()
    ))];
    replies.push(match feedback {
        Some(critique) => Reply::Text(format!("📊 Feedback:\n{critique}")),
        None => Reply::Text(FEEDBACK_UNAVAILABLE.to_string()),
    });
    Ok(replies)
}
