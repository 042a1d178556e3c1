use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tempfile::TempDir;

use vocabot::bot::dispatcher::{
    FEEDBACK_UNAVAILABLE, NOTHING_TO_REPEAT, NOTHING_TO_SCORE, NO_LESSON_TODAY, SEND_ESSAY_PROMPT,
};
use vocabot::bot::keyboard::{MY_PROGRESS, REPETITION, SUBMIT_ESSAY, TODAYS_WORDS};
use vocabot::bot::{handle_text, Reply};
use vocabot::feedback::{FeedbackError, FeedbackProvider};
use vocabot::schedule::{DailyLesson, Schedule};
use vocabot::state::{AppState, Clock};
use vocabot::storage::{EssayArchive, ProgressLog, RepetitionStore};

const LESSON_DAY: &str = "2024-01-01";

/// Canned critique, or a failing backend when `critique` is `None`.
struct StubFeedback {
    critique: Option<String>,
}

#[async_trait]
impl FeedbackProvider for StubFeedback {
    async fn review_essay(&self, _essay: &str) -> Result<String, FeedbackError> {
        self.critique.clone().ok_or(FeedbackError::EmptyResponse)
    }
}

struct Fixture {
    state: AppState,
    _dir: TempDir,
}

fn travel_schedule() -> Schedule {
    let days: BTreeMap<NaiveDate, DailyLesson> = serde_json::from_str(
        r#"{
            "2024-01-01": {
                "theme": "Travel",
                "words": [
                    {
                        "word": "itinerary",
                        "pos": "noun",
                        "translation": "маршрут",
                        "example": "Our itinerary includes three cities."
                    }
                ]
            }
        }"#,
    )
    .unwrap();
    Schedule::new(days)
}

fn fixture_on(day: &str, critique: Option<&str>) -> Fixture {
    let dir = TempDir::new().unwrap();
    let state = AppState::new(
        travel_schedule(),
        ProgressLog::new(dir.path().join("progress.csv")),
        RepetitionStore::new(dir.path().join("repetition.json")),
        EssayArchive::new(dir.path().join("essays")),
        Arc::new(StubFeedback {
            critique: critique.map(str::to_string),
        }),
        Clock::Fixed(NaiveDate::parse_from_str(day, "%Y-%m-%d").unwrap()),
    );
    Fixture { state, _dir: dir }
}

async fn submit(state: &AppState, user: &str, essay: &str) -> Vec<Reply> {
    let prompt = handle_text(state, user, SUBMIT_ESSAY).await;
    assert_eq!(prompt[0].text(), SEND_ESSAY_PROMPT);
    handle_text(state, user, essay).await
}

#[tokio::test]
async fn essay_using_every_word_scores_full_marks() {
    let fx = fixture_on(LESSON_DAY, Some("Nice essay!"));

    let replies = submit(&fx.state, "42", "My itinerary was great").await;

    assert_eq!(replies.len(), 2);
    assert!(replies[0].text().contains("Used 1 of 1 words"));
    assert!(replies[1].text().contains("Nice essay!"));

    let records = fx.state.progress().records().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].total_words, 1);
    assert_eq!(records[0].used_words, 1);
    assert!(records[0].submitted);

    // Nothing missed, so nothing to repeat.
    assert!(fx.state.repetition().words_for("42").await.unwrap().is_empty());
}

#[tokio::test]
async fn missed_words_show_up_under_repetition() {
    let fx = fixture_on(LESSON_DAY, Some("Work on vocabulary."));

    let replies = submit(&fx.state, "42", "I had fun").await;
    assert!(replies[0].text().contains("Used 0 of 1 words"));

    let repetition = handle_text(&fx.state, "42", REPETITION).await;
    assert!(repetition[0].text().contains("itinerary"));

    // Another user sees their own (empty) set.
    let other = handle_text(&fx.state, "7", REPETITION).await;
    assert_eq!(other[0].text(), NOTHING_TO_REPEAT);
}

#[tokio::test]
async fn repeated_misses_do_not_duplicate_repetition_words() {
    let fx = fixture_on(LESSON_DAY, Some("ok"));

    submit(&fx.state, "42", "I had fun").await;
    submit(&fx.state, "42", "Still no travel words").await;

    let words = fx.state.repetition().words_for("42").await.unwrap();
    assert_eq!(words, vec!["itinerary".to_string()]);

    // Both submissions were counted, though.
    assert_eq!(fx.state.progress().count_for_user("42").await.unwrap(), 2);
}

#[tokio::test]
async fn progress_counts_only_the_calling_user() {
    let fx = fixture_on(LESSON_DAY, Some("ok"));

    submit(&fx.state, "42", "My itinerary was great").await;
    submit(&fx.state, "42", "Another itinerary essay").await;
    submit(&fx.state, "7", "I had fun").await;

    let replies = handle_text(&fx.state, "42", MY_PROGRESS).await;
    assert!(replies[0].text().contains('2'));

    let replies = handle_text(&fx.state, "7", MY_PROGRESS).await;
    assert!(replies[0].text().contains('1'));
}

#[tokio::test]
async fn no_lesson_day_rejects_scoring_and_writes_nothing() {
    let fx = fixture_on("2024-02-02", Some("ok"));

    let words = handle_text(&fx.state, "42", TODAYS_WORDS).await;
    assert_eq!(words[0].text(), NO_LESSON_TODAY);

    let replies = submit(&fx.state, "42", "An essay with no lesson").await;
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].text(), NOTHING_TO_SCORE);

    assert_eq!(fx.state.progress().count_for_user("42").await.unwrap(), 0);
    assert!(fx.state.repetition().words_for("42").await.unwrap().is_empty());
}

#[tokio::test]
async fn feedback_failure_still_persists_the_submission() {
    let fx = fixture_on(LESSON_DAY, None);

    let replies = submit(&fx.state, "42", "I had fun").await;

    assert_eq!(replies.len(), 2);
    assert!(replies[0].text().contains("Used 0 of 1 words"));
    assert_eq!(replies[1].text(), FEEDBACK_UNAVAILABLE);

    assert_eq!(fx.state.progress().count_for_user("42").await.unwrap(), 1);
    assert_eq!(
        fx.state.repetition().words_for("42").await.unwrap(),
        vec!["itinerary".to_string()]
    );
}

#[tokio::test]
async fn command_issued_while_awaiting_essay_wins() {
    let fx = fixture_on(LESSON_DAY, Some("ok"));

    handle_text(&fx.state, "42", SUBMIT_ESSAY).await;
    let replies = handle_text(&fx.state, "42", MY_PROGRESS).await;
    assert!(replies[0].text().contains("Essays submitted"));

    // The pending slot is gone: plain text is now ignored, not scored.
    let replies = handle_text(&fx.state, "42", "this is not an essay anymore").await;
    assert!(replies.is_empty());
    assert_eq!(fx.state.progress().count_for_user("42").await.unwrap(), 0);
}

#[tokio::test]
async fn unrecognized_text_is_silently_ignored() {
    let fx = fixture_on(LESSON_DAY, Some("ok"));
    let replies = handle_text(&fx.state, "42", "what can you do?").await;
    assert!(replies.is_empty());
}

#[tokio::test]
async fn same_day_resubmission_overwrites_archive_but_appends_progress() {
    let fx = fixture_on(LESSON_DAY, Some("ok"));
    let day = NaiveDate::parse_from_str(LESSON_DAY, "%Y-%m-%d").unwrap();

    submit(&fx.state, "42", "first draft").await;
    submit(&fx.state, "42", "second draft with itinerary").await;

    let archived =
        std::fs::read_to_string(fx.state.essays().path_for("42", day)).unwrap();
    assert_eq!(archived, "second draft with itinerary");
    assert_eq!(fx.state.progress().count_for_user("42").await.unwrap(), 2);
}

#[tokio::test]
async fn start_and_menu_show_the_keyboard() {
    let fx = fixture_on(LESSON_DAY, Some("ok"));

    let start = handle_text(&fx.state, "42", "/start").await;
    assert!(matches!(start[0], Reply::Menu(_)));

    let menu = handle_text(&fx.state, "42", "/menu").await;
    assert!(matches!(menu[0], Reply::Menu(_)));
}

#[tokio::test]
async fn todays_words_renders_the_lesson() {
    let fx = fixture_on(LESSON_DAY, Some("ok"));

    let replies = handle_text(&fx.state, "42", TODAYS_WORDS).await;
    let text = replies[0].text();
    assert!(text.contains("Travel"));
    assert!(text.contains("itinerary"));
    assert!(text.contains("noun"));
    assert!(matches!(replies[0], Reply::Markdown(_)));
}
