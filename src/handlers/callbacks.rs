use teloxide::prelude::*;

use crate::bot_state::BotState;
use crate::controller::FollowUp;
use crate::handlers::actions::WidgetAction;
use crate::handlers::utils::{close_widget, settle};
use crate::handlers::HandlerResult;

pub async fn callback_handler(bot: Bot, q: CallbackQuery, state: BotState) -> HandlerResult {
    bot.answer_callback_query(q.id.clone()).await?;

    let (Some(data), Some(message)) = (q.data.as_deref(), q.message.as_ref()) else {
        return Ok(());
    };
    let chat_id = message.chat().id;

    let Some(action) = WidgetAction::parse(data) else {
        log::warn!("Unknown callback data {:?} in chat {}", data, chat_id);
        return Ok(());
    };
    if action == WidgetAction::Ignore {
        return Ok(());
    }

    let Some(slot) = state.sessions.get(chat_id).await else {
        bot.send_message(chat_id, "⌛ This booking session has expired. Send /start to begin again.")
            .await?;
        return Ok(());
    };

    // Presses on older widget messages are ignored.
    if slot.widget.lock().await.message_id != Some(message.id()) {
        return Ok(());
    }

    let controller = &state.controller;
    let follow_up = match action {
        WidgetAction::StartBooking => {
            controller.start_booking(&slot.session).await;
            FollowUp::Nothing
        }
        WidgetAction::ToggleService(index) => {
            let service_id = slot.session.lock().await.service_id_at(index).map(str::to_string);
            match service_id {
                Some(service_id) => controller.toggle_service(&slot.session, &service_id).await,
                None => FollowUp::Nothing,
            }
        }
        WidgetAction::SelectDate(date) => {
            controller
                .select_date(&slot.session, date, state.config.today())
                .await
        }
        WidgetAction::SelectTime(index) => {
            let token = slot.session.lock().await.slot_at(index).map(str::to_string);
            if let Some(token) = token {
                controller.select_time(&slot.session, &token).await;
            }
            FollowUp::Nothing
        }
        WidgetAction::EnterCoupon => {
            slot.widget.lock().await.awaiting_coupon = true;
            bot.send_message(chat_id, "🏷 Send me your coupon code.").await?;
            FollowUp::Nothing
        }
        WidgetAction::Confirm => controller.confirm(&slot.session).await,
        WidgetAction::BackToBooking => {
            controller.back_to_booking(&slot.session).await;
            FollowUp::Nothing
        }
        WidgetAction::Close => {
            close_widget(&bot, chat_id, &slot, &state).await;
            return Ok(());
        }
        WidgetAction::Ignore => return Ok(()),
    };

    settle(&bot, chat_id, &slot, &state, follow_up).await
}
