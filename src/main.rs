use std::sync::Arc;

use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::*;
use teloxide::types::ParseMode;

use vocabot::bot::{handle_text, keyboard, Reply};
use vocabot::config::Config;
use vocabot::feedback::LlmFeedback;
use vocabot::logging;
use vocabot::schedule::Schedule;
use vocabot::state::{AppState, Clock};
use vocabot::storage::{EssayArchive, ProgressLog, RepetitionStore};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err}");
            std::process::exit(1);
        }
    };

    let _log_guard = logging::init_tracing(&config.log_level);

    let schedule = match Schedule::load(&config.schedule_path) {
        Ok(schedule) => schedule,
        Err(err) => {
            tracing::error!(error = %err, "schedule load failed");
            std::process::exit(1);
        }
    };
    tracing::info!(days = schedule.len(), "schedule loaded");

    let state = Arc::new(AppState::new(
        schedule,
        ProgressLog::new(config.progress_path()),
        RepetitionStore::new(config.repetition_path()),
        EssayArchive::new(config.essays_dir()),
        Arc::new(LlmFeedback::from_env()),
        Clock::System,
    ));

    let bot = Bot::new(&config.bot_token);
    tracing::info!("vocabot polling for updates");

    let handler = dptree::entry().branch(Update::filter_message().endpoint(handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    tracing::info!("vocabot stopped");
}

async fn handle_message(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let user_id = match msg.from() {
        Some(user) => user.id.0.to_string(),
        None => return Ok(()),
    };
    let text = match msg.text() {
        Some(text) => text,
        None => return Ok(()),
    };

    for reply in handle_text(&state, &user_id, text).await {
        send_reply(&bot, msg.chat.id, reply).await?;
    }
    Ok(())
}

async fn send_reply(bot: &Bot, chat_id: ChatId, reply: Reply) -> ResponseResult<()> {
    match reply {
        Reply::Text(text) => {
            bot.send_message(chat_id, text).await?;
        }
        Reply::Markdown(text) => {
            bot.send_message(chat_id, text)
                .parse_mode(ParseMode::Markdown)
                .await?;
        }
        Reply::Menu(text) => {
            bot.send_message(chat_id, text)
                .reply_markup(keyboard::main_menu())
                .await?;
        }
    }
    Ok(())
}
