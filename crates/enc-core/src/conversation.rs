//! Broadcast confirmation flow: `Idle -> AwaitingBroadcast -> Idle`.
//!
//! Sessions are keyed by (chat, user) so that in a group only the admin's own
//! follow-up text can complete the flow. Expiry is evaluated lazily against the
//! caller-supplied clock.

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use crate::domain::{ChatId, UserId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub chat_id: ChatId,
    pub user_id: UserId,
}

impl SessionKey {
    pub fn new(chat_id: ChatId, user_id: UserId) -> Self {
        Self { chat_id, user_id }
    }
}

#[derive(Debug)]
pub struct Conversations {
    timeout: Option<Duration>,
    opened: HashMap<SessionKey, Instant>,
}

impl Conversations {
    /// `timeout = None` keeps sessions open until completed or cancelled.
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            timeout,
            opened: HashMap::new(),
        }
    }

    /// Enter `AwaitingBroadcast`. Re-opening restarts the expiry clock.
    pub fn open(&mut self, key: SessionKey) {
        self.open_at(key, Instant::now());
    }

    pub fn open_at(&mut self, key: SessionKey, now: Instant) {
        self.opened.insert(key, now);
    }

    /// Leave `AwaitingBroadcast` without side effects. Returns whether a live session existed.
    pub fn cancel(&mut self, key: SessionKey) -> bool {
        self.cancel_at(key, Instant::now())
    }

    pub fn cancel_at(&mut self, key: SessionKey, now: Instant) -> bool {
        self.expire_at(key, now);
        self.opened.remove(&key).is_some()
    }

    /// Consume a live session for an incoming broadcast payload.
    ///
    /// Returns `true` exactly once per opened session; the caller then runs the broadcast.
    pub fn take_pending(&mut self, key: SessionKey) -> bool {
        self.take_pending_at(key, Instant::now())
    }

    pub fn take_pending_at(&mut self, key: SessionKey, now: Instant) -> bool {
        self.cancel_at(key, now)
    }

    fn expire_at(&mut self, key: SessionKey, now: Instant) {
        let Some(timeout) = self.timeout else {
            return;
        };
        if let Some(opened) = self.opened.get(&key) {
            if now.saturating_duration_since(*opened) >= timeout {
                tracing::info!(
                    chat_id = key.chat_id.0,
                    user_id = key.user_id.0,
                    "broadcast session expired"
                );
                self.opened.remove(&key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> SessionKey {
        SessionKey::new(ChatId(10), UserId(10))
    }

    #[test]
    fn starts_idle() {
        let mut c = Conversations::new(None);
        assert!(!c.take_pending(key()));
        assert!(!c.cancel(key()));
    }

    #[test]
    fn open_then_take_returns_to_idle() {
        let mut c = Conversations::new(None);
        c.open(key());
        assert!(c.take_pending(key()));
        assert!(!c.take_pending(key()));
    }

    #[test]
    fn cancel_closes_session() {
        let mut c = Conversations::new(None);
        c.open(key());
        assert!(c.cancel(key()));
        assert!(!c.cancel(key()));
        assert!(!c.take_pending(key()));
    }

    #[test]
    fn sessions_are_per_chat_and_user() {
        let mut c = Conversations::new(None);
        c.open(key());
        assert!(!c.take_pending(SessionKey::new(ChatId(10), UserId(11))));
        assert!(!c.take_pending(SessionKey::new(ChatId(11), UserId(10))));
        assert!(c.take_pending(key()));
    }

    #[test]
    fn live_until_timeout() {
        let start = Instant::now();
        let mut c = Conversations::new(Some(Duration::from_secs(60)));
        c.open_at(key(), start);
        assert!(c.take_pending_at(key(), start + Duration::from_secs(59)));
    }

    #[test]
    fn expires_after_timeout() {
        let start = Instant::now();
        let mut c = Conversations::new(Some(Duration::from_secs(60)));
        c.open_at(key(), start);
        assert!(!c.take_pending_at(key(), start + Duration::from_secs(60)));

        c.open_at(key(), start);
        assert!(!c.cancel_at(key(), start + Duration::from_secs(61)));
    }

    #[test]
    fn reopening_restarts_the_clock() {
        let start = Instant::now();
        let mut c = Conversations::new(Some(Duration::from_secs(60)));
        c.open_at(key(), start);
        c.open_at(key(), start + Duration::from_secs(50));
        assert!(c.take_pending_at(key(), start + Duration::from_secs(100)));
    }
}
