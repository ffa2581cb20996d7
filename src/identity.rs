use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{MessageId, User};

use crate::error::{BookingError, BookingResult};
use crate::models::UserProfile;

/// Chat-platform login/profile boundary.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn init(&self) -> BookingResult<()>;

    fn is_logged_in(&self) -> bool;

    /// Starts the platform login flow. The caller stops initialising afterwards.
    async fn login(&self) -> BookingResult<()>;

    async fn profile(&self) -> BookingResult<UserProfile>;

    async fn close_window(&self) -> BookingResult<()>;
}

/// Identity taken from the Telegram user attached to an update.
pub struct TelegramIdentity {
    bot: Bot,
    chat_id: ChatId,
    is_private: bool,
    user: Option<User>,
    widget_message: Option<MessageId>,
}

impl TelegramIdentity {
    pub fn new(bot: Bot, chat_id: ChatId, is_private: bool, user: Option<User>) -> Self {
        Self {
            bot,
            chat_id,
            is_private,
            user,
            widget_message: None,
        }
    }

    pub fn with_widget_message(mut self, message_id: Option<MessageId>) -> Self {
        self.widget_message = message_id;
        self
    }
}

pub fn profile_from_user(user: &User) -> UserProfile {
    UserProfile {
        user_id: user.id.0.to_string(),
        display_name: user.full_name(),
    }
}

#[async_trait]
impl IdentityProvider for TelegramIdentity {
    async fn init(&self) -> BookingResult<()> {
        if !self.is_private {
            return Err(BookingError::Auth(
                "Bookings can only be made in a private chat with the bot.".to_string(),
            ));
        }
        Ok(())
    }

    fn is_logged_in(&self) -> bool {
        self.user.as_ref().map_or(false, |u| !u.is_bot)
    }

    async fn login(&self) -> BookingResult<()> {
        self.bot
            .send_message(
                self.chat_id,
                "🔐 Please open a private chat with me and send /start to sign in.",
            )
            .await
            .map_err(|e| BookingError::Network(e.to_string()))?;
        Ok(())
    }

    async fn profile(&self) -> BookingResult<UserProfile> {
        self.user
            .as_ref()
            .map(profile_from_user)
            .ok_or_else(|| BookingError::Auth("Could not read your profile.".to_string()))
    }

    async fn close_window(&self) -> BookingResult<()> {
        if let Some(message_id) = self.widget_message {
            self.bot
                .delete_message(self.chat_id, message_id)
                .await
                .map_err(|e| BookingError::Network(e.to_string()))?;
        }
        Ok(())
    }
}
