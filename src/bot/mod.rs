pub mod dispatcher;
pub mod keyboard;

pub use dispatcher::{handle_text, Reply};
