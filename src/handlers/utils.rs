use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, ParseMode};
use teloxide::{ApiError, RequestError};

use crate::bot_state::{BotState, ChatSlot};
use crate::controller::FollowUp;
use crate::handlers::actions::WidgetAction;
use crate::handlers::HandlerResult;
use crate::identity::{IdentityProvider, TelegramIdentity};
use crate::view::{self, BookingView, SlotPanel, SummaryView, Tone, View};

const SLOTS_PER_ROW: usize = 3;

/// Escapes Telegram MarkdownV2 special characters.
pub fn escape_markdown_v2(text: &str) -> String {
    let specials = ['_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!'];
    let mut out = String::with_capacity(text.len() * 2);

    for ch in text.chars() {
        if specials.contains(&ch) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn button(label: impl Into<String>, action: WidgetAction) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(label.into(), action.to_callback_data())
}

fn inert(label: impl Into<String>) -> InlineKeyboardButton {
    button(label, WidgetAction::Ignore)
}

/// Turns a view description into MarkdownV2 text and an inline keyboard.
pub fn render_telegram(view: &View) -> (String, InlineKeyboardMarkup) {
    match view {
        View::Loading => ("⏳ Loading\\.\\.\\.".to_string(), InlineKeyboardMarkup::default()),
        View::Landing { user_name } => (
            format!(
                "👋 *Welcome, {}\\!*\n\nBook your appointment in a few taps\\.",
                escape_markdown_v2(user_name)
            ),
            InlineKeyboardMarkup::new(vec![vec![button("📅 Start booking", WidgetAction::StartBooking)]]),
        ),
        View::Booking(booking) => render_booking(booking),
        View::Confirmation { user_name, booking_ref } => {
            let mut text = format!(
                "✅ *Booking confirmed\\!*\n\nThank you, {}\\. We look forward to seeing you\\.",
                escape_markdown_v2(user_name)
            );
            if let Some(reference) = booking_ref {
                text.push_str(&format!("\n\n*Reference:* `{}`", reference));
            }
            (
                text,
                InlineKeyboardMarkup::new(vec![vec![button("Close", WidgetAction::Close)]]),
            )
        }
        View::Error { message, can_go_back } => {
            let mut rows = Vec::new();
            if *can_go_back {
                rows.push(vec![button("◀️ Back to booking", WidgetAction::BackToBooking)]);
            }
            rows.push(vec![button("Close", WidgetAction::Close)]);
            (
                format!("❌ *Something went wrong*\n\n{}", escape_markdown_v2(message)),
                InlineKeyboardMarkup::new(rows),
            )
        }
    }
}

fn render_booking(booking: &BookingView) -> (String, InlineKeyboardMarkup) {
    let mut text = String::from("📅 *Book an appointment*\n\n*Summary*\n");
    match &booking.summary {
        SummaryView::Empty => text.push_str(&escape_markdown_v2(SummaryView::EMPTY_TEXT)),
        SummaryView::Priced { items, subtotal, discount, total } => {
            for item in items {
                text.push_str(&format!("{}: {}\n", escape_markdown_v2(&item.label), escape_markdown_v2(&item.amount)));
            }
            text.push_str(&format!(
                "*{}:* {}\n",
                escape_markdown_v2(&subtotal.label),
                escape_markdown_v2(&subtotal.amount)
            ));
            if let Some(discount) = discount {
                text.push_str(&format!(
                    "{}: {}\n",
                    escape_markdown_v2(&discount.label),
                    escape_markdown_v2(&discount.amount)
                ));
            }
            text.push_str(&format!(
                "*{}: {}*",
                escape_markdown_v2(&total.label),
                escape_markdown_v2(&total.amount)
            ));
        }
    }

    if let Some(coupon) = &booking.coupon {
        let icon = match coupon.tone {
            Tone::Neutral => "⏳",
            Tone::Success => "🏷",
            Tone::Error => "⚠️",
        };
        text.push_str(&format!("\n\n{} {}", icon, escape_markdown_v2(&coupon.text)));
    }

    if let SlotPanel::Notice(notice) = &booking.slots {
        text.push_str(&format!("\n\n🕒 _{}_", escape_markdown_v2(notice.text())));
    }

    let mut keyboard: Vec<Vec<InlineKeyboardButton>> = Vec::new();

    for row in &booking.services {
        let mark = if row.checked { "✅" } else { "⬜" };
        keyboard.push(vec![button(
            format!("{} {} · {} {}", mark, row.name, row.price, row.duration),
            WidgetAction::ToggleService(row.index),
        )]);
    }

    keyboard.push(vec![inert(booking.calendar.title.clone())]);
    keyboard.push(
        ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"]
            .iter()
            .map(|d| inert(*d))
            .collect(),
    );
    for week in booking.calendar.weeks() {
        keyboard.push(
            week.into_iter()
                .map(|cell| match cell {
                    None => inert(" "),
                    Some(day) if !day.enabled => inert("·"),
                    Some(day) => {
                        let label = day.date.format("%-d").to_string();
                        let label = if day.selected { format!("[{}]", label) } else { label };
                        button(label, WidgetAction::SelectDate(day.date))
                    }
                })
                .collect(),
        );
    }

    if let SlotPanel::Slots(slots) = &booking.slots {
        for chunk in slots.chunks(SLOTS_PER_ROW) {
            keyboard.push(
                chunk
                    .iter()
                    .map(|slot| {
                        let label = if slot.selected { format!("✅ {}", slot.label) } else { slot.label.clone() };
                        button(label, WidgetAction::SelectTime(slot.index))
                    })
                    .collect(),
            );
        }
    }

    keyboard.push(vec![button("🏷 Apply coupon", WidgetAction::EnterCoupon)]);

    let confirm = if booking.confirm.enabled {
        button(format!("✅ {}", booking.confirm.label), WidgetAction::Confirm)
    } else {
        inert(format!("🔒 {}", booking.confirm.label))
    };
    keyboard.push(vec![confirm]);

    (text, InlineKeyboardMarkup::new(keyboard))
}

/// Re-renders the chat's widget message from its current session.
/// Sends a new message when there is none to edit yet.
pub async fn refresh_widget(
    bot: &Bot,
    chat_id: ChatId,
    slot: &ChatSlot,
    state: &BotState,
) -> Result<(), RequestError> {
    let view = {
        let session = slot.session.lock().await;
        view::render(&session, state.config.today(), &state.config.currency)
    };
    let (text, keyboard) = render_telegram(&view);

    let mut widget = slot.widget.lock().await;
    match widget.message_id {
        Some(message_id) => {
            let edited = bot
                .edit_message_text(chat_id, message_id, text)
                .parse_mode(ParseMode::MarkdownV2)
                .reply_markup(keyboard)
                .await;
            match edited {
                Ok(_) | Err(RequestError::Api(ApiError::MessageNotModified)) => Ok(()),
                Err(e) => Err(e),
            }
        }
        None => {
            let sent = bot
                .send_message(chat_id, text)
                .parse_mode(ParseMode::MarkdownV2)
                .reply_markup(keyboard)
                .await?;
            widget.message_id = Some(sent.id);
            Ok(())
        }
    }
}

/// Shows the state change, then runs its network follow-up and shows the result.
pub async fn settle(
    bot: &Bot,
    chat_id: ChatId,
    slot: &ChatSlot,
    state: &BotState,
    follow_up: FollowUp,
) -> HandlerResult {
    state
        .controller
        .settle(&slot.session, follow_up, move || refresh_widget(bot, chat_id, slot, state))
        .await?;
    Ok(())
}

/// Removes the widget message and forgets the chat's session.
pub async fn close_widget(bot: &Bot, chat_id: ChatId, slot: &ChatSlot, state: &BotState) {
    let message_id = slot.widget.lock().await.message_id;
    let identity = TelegramIdentity::new(bot.clone(), chat_id, true, None).with_widget_message(message_id);
    if let Err(e) = identity.close_window().await {
        log::warn!("Could not close widget in chat {}: {}", chat_id, e);
    }
    state.sessions.remove(chat_id).await;
    log::info!("👋 Widget closed in chat {}", chat_id);
}
