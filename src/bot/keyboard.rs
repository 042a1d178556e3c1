use teloxide::types::{KeyboardButton, KeyboardMarkup};

pub const TODAYS_WORDS: &str = "📘 Today's words";
pub const SUBMIT_ESSAY: &str = "✍️ Submit essay";
pub const REPETITION: &str = "🔁 Repetition";
pub const MY_PROGRESS: &str = "📊 My progress";
pub const SUPPORT: &str = "💰 Support";

/// The fixed five-button reply keyboard shown by /start and /menu.
pub fn main_menu() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![
        vec![
            KeyboardButton::new(TODAYS_WORDS),
            KeyboardButton::new(SUBMIT_ESSAY),
        ],
        vec![
            KeyboardButton::new(REPETITION),
            KeyboardButton::new(MY_PROGRESS),
            KeyboardButton::new(SUPPORT),
        ],
    ])
    .resize_keyboard(true)
}
