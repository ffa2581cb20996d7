use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use teloxide::types::{ChatId, MessageId};
use tokio::sync::{Mutex, RwLock};

use crate::config::AppConfig;
use crate::controller::BookingController;
use crate::gateway::HttpGateway;
use crate::session::Session;

/// Telegram-side state of one widget: the message being edited in place and
/// whether the next text message is a coupon code.
#[derive(Debug, Default, Clone, Copy)]
pub struct WidgetHandle {
    pub message_id: Option<MessageId>,
    pub awaiting_coupon: bool,
}

pub struct ChatSlot {
    pub session: Mutex<Session>,
    pub widget: Mutex<WidgetHandle>,
}

impl ChatSlot {
    fn new() -> Self {
        ChatSlot {
            session: Mutex::new(Session::new()),
            widget: Mutex::new(WidgetHandle::default()),
        }
    }
}

type ChatMap<K> = Arc<RwLock<HashMap<K, (Arc<ChatSlot>, SystemTime)>>>;

/// In-memory sessions keyed by chat, dropped after an idle period.
#[derive(Clone)]
pub struct SessionCache<K = ChatId> {
    chats: ChatMap<K>,
    ttl: Duration,
}

impl<K> SessionCache<K>
where
    K: std::hash::Hash + Eq + Copy + std::fmt::Display,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            chats: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Replaces any previous session of the chat with a fresh one.
    pub async fn open(&self, key: K) -> Arc<ChatSlot> {
        let slot = Arc::new(ChatSlot::new());
        let mut chats = self.chats.write().await;
        if chats.insert(key, (slot.clone(), SystemTime::now())).is_some() {
            log::debug!("🔄 Restarted session for chat {}", key);
        }
        slot
    }

    /// Live session of the chat, refreshing its idle timer.
    pub async fn get(&self, key: K) -> Option<Arc<ChatSlot>> {
        let mut chats = self.chats.write().await;
        let expired = chats.get(&key)?.1.elapsed().unwrap_or_default() >= self.ttl;
        if expired {
            chats.remove(&key);
            return None;
        }
        let (slot, touched) = chats.get_mut(&key)?;
        *touched = SystemTime::now();
        Some(slot.clone())
    }

    pub async fn remove(&self, key: K) {
        self.chats.write().await.remove(&key);
    }

    pub async fn len(&self) -> usize {
        self.chats.read().await.len()
    }

    pub async fn cleanup(&self) {
        let mut chats = self.chats.write().await;
        let now = SystemTime::now();
        let previous_count = chats.len();

        chats.retain(|_, (_, touched)| now.duration_since(*touched).unwrap_or_default() < self.ttl);

        log::debug!("🧹 Sessions cleaned: {} -> {} entries", previous_count, chats.len());
    }
}

#[derive(Clone)]
pub struct BotState {
    pub config: Arc<AppConfig>,
    pub controller: Arc<BookingController<HttpGateway>>,
    pub sessions: SessionCache,
}

impl BotState {
    pub fn new(config: AppConfig, gateway: HttpGateway) -> Self {
        let sessions = SessionCache::new(config.session_ttl);
        Self {
            config: Arc::new(config),
            controller: Arc::new(BookingController::new(Arc::new(gateway))),
            sessions,
        }
    }
}
