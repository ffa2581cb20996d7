use teloxide::{prelude::*, utils::command::BotCommands};

mod bot_state;
mod config;
mod controller;
mod error;
mod gateway;
mod handlers;
mod identity;
mod models;
mod pricing;
mod selection;
mod session;
mod view;

#[cfg(test)]
mod test_utils;

use crate::bot_state::BotState;
use crate::config::AppConfig;
use crate::gateway::HttpGateway;
use crate::handlers::{callback_handler, command_handler, message_handler};

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
enum Command {
    #[command(description = "open the booking widget")]
    Start,
    #[command(description = "show help")]
    Help,
    #[command(description = "apply a coupon code")]
    Coupon(String),
    #[command(description = "close the booking widget")]
    Close,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenvy::dotenv().ok();
    env_logger::init();
    log::info!("Starting booking widget bot...");

    let config = AppConfig::from_env()?;
    let gateway = HttpGateway::new(&config)?;
    log::info!("✅ Booking endpoint configured: {}", config.api_url);

    let state = BotState::new(config, gateway);

    let state_clone = state.clone();
    tokio::spawn(async move {
        handlers::session_cleanup_task(state_clone).await;
    });

    let bot = Bot::from_env();

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(command_handler),
        )
        .branch(Update::filter_callback_query().endpoint(callback_handler))
        .branch(Update::filter_message().endpoint(message_handler));

    log::info!("🚀 Starting dispatcher...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
