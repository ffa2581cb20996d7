use teloxide::prelude::*;
use teloxide::types::ParseMode;

use crate::bot_state::BotState;
use crate::controller::InitOutcome;
use crate::handlers::utils::{close_widget, refresh_widget, settle};
use crate::handlers::HandlerResult;
use crate::identity::TelegramIdentity;

use crate::Command;

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    state: BotState,
) -> HandlerResult {
    match cmd {
        Command::Start => handle_start(bot, msg, state).await?,
        Command::Help => handle_help(bot, msg).await?,
        Command::Coupon(code) => handle_coupon(bot, msg, state, code).await?,
        Command::Close => handle_close(bot, msg, state).await?,
    }
    Ok(())
}

async fn handle_start(bot: Bot, msg: Message, state: BotState) -> HandlerResult {
    let chat_id = msg.chat.id;
    let slot = state.sessions.open(chat_id).await;
    refresh_widget(&bot, chat_id, &slot, &state).await?;

    let identity = TelegramIdentity::new(bot.clone(), chat_id, msg.chat.is_private(), msg.from.clone());
    match state.controller.initialize(&slot.session, &identity).await {
        InitOutcome::LoginRequired => {
            log::info!("Chat {} has no user attached, login requested", chat_id);
            close_widget(&bot, chat_id, &slot, &state).await;
        }
        InitOutcome::Ready | InitOutcome::Failed => {
            refresh_widget(&bot, chat_id, &slot, &state).await?;
        }
    }
    Ok(())
}

async fn handle_help(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(
        msg.chat.id,
        "📅 *Booking help*\n\n\
        /start \\- open the booking widget\n\
        /coupon CODE \\- apply a coupon code\n\
        /close \\- close the widget\n\n\
        *How it works:*\n\
        1\\. Tick the services you want\n\
        2\\. Pick a date, then a time slot\n\
        3\\. Optionally apply a coupon\n\
        4\\. Press *Confirm Booking*",
    )
    .parse_mode(ParseMode::MarkdownV2)
    .await?;

    Ok(())
}

async fn handle_coupon(bot: Bot, msg: Message, state: BotState, code: String) -> HandlerResult {
    let chat_id = msg.chat.id;
    let Some(slot) = state.sessions.get(chat_id).await else {
        bot.send_message(chat_id, "Send /start to open the booking widget first.").await?;
        return Ok(());
    };
    slot.widget.lock().await.awaiting_coupon = false;

    let follow_up = state.controller.apply_coupon(&slot.session, &code).await;
    settle(&bot, chat_id, &slot, &state, follow_up).await
}

async fn handle_close(bot: Bot, msg: Message, state: BotState) -> HandlerResult {
    let chat_id = msg.chat.id;
    if let Some(slot) = state.sessions.get(chat_id).await {
        close_widget(&bot, chat_id, &slot, &state).await;
    }
    Ok(())
}
