pub mod actions;
pub mod callbacks;
pub mod commands;
pub mod messages;
pub mod utils;

pub use callbacks::callback_handler;
pub use commands::command_handler;
pub use messages::message_handler;

use std::error::Error;

use tokio::time;

use crate::bot_state::BotState;

pub type HandlerResult = Result<(), Box<dyn Error + Send + Sync>>;

pub async fn session_cleanup_task(state: BotState) {
    let mut interval = time::interval(time::Duration::from_secs(600));

    loop {
        interval.tick().await;
        state.sessions.cleanup().await;
        log::info!("📊 Active booking sessions: {}", state.sessions.len().await);
    }
}
