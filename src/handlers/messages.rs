use teloxide::prelude::*;

use crate::bot_state::BotState;
use crate::handlers::utils::settle;
use crate::handlers::HandlerResult;

/// Plain text is only meaningful right after "Apply coupon" was pressed.
pub async fn message_handler(bot: Bot, msg: Message, state: BotState) -> HandlerResult {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    if text.starts_with('/') {
        return Ok(());
    }

    let chat_id = msg.chat.id;
    let Some(slot) = state.sessions.get(chat_id).await else {
        bot.send_message(chat_id, "Send /start to book an appointment.").await?;
        return Ok(());
    };

    let awaiting_coupon = std::mem::take(&mut slot.widget.lock().await.awaiting_coupon);
    if !awaiting_coupon {
        bot.send_message(chat_id, "Use the buttons on the booking message, or /coupon CODE to apply a coupon.")
            .await?;
        return Ok(());
    }

    let follow_up = state.controller.apply_coupon(&slot.session, text).await;
    settle(&bot, chat_id, &slot, &state, follow_up).await
}
