//! Per-user dialog sessions, keyed by `"{channel}:{user_id}"`.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::dialog::state::DialogSession;

/// Build the session key for a user on a channel.
pub fn session_key(channel: &str, user_id: &str) -> String {
    format!("{channel}:{user_id}")
}

struct SessionEntry {
    session: DialogSession,
    touched_at: Instant,
}

/// In-memory map of active dialogs.
///
/// Idle sessions are never stored: setting a session to Idle removes it.
/// With an idle timeout configured, a session untouched for longer than the
/// timeout reads back as Idle and is dropped by [`SessionStore::prune_expired`].
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionEntry>>,
    idle_timeout: Option<Duration>,
}

impl SessionStore {
    pub fn new(idle_timeout: Option<Duration>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout,
        }
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout
    }

    fn is_expired(&self, entry: &SessionEntry) -> bool {
        self.idle_timeout
            .is_some_and(|timeout| entry.touched_at.elapsed() > timeout)
    }

    /// Current session for `key`, Idle when absent or expired.
    pub async fn get(&self, key: &str) -> DialogSession {
        let sessions = self.sessions.read().await;
        match sessions.get(key) {
            Some(entry) if !self.is_expired(entry) => entry.session.clone(),
            _ => DialogSession::Idle,
        }
    }

    /// Replace the session for `key`.
    pub async fn set(&self, key: &str, session: DialogSession) {
        let mut sessions = self.sessions.write().await;
        if session == DialogSession::Idle {
            sessions.remove(key);
        } else {
            sessions.insert(
                key.to_string(),
                SessionEntry {
                    session,
                    touched_at: Instant::now(),
                },
            );
        }
    }

    pub async fn clear(&self, key: &str) {
        self.sessions.write().await.remove(key);
    }

    /// Drop expired sessions. Returns how many were removed.
    pub async fn prune_expired(&self) -> usize {
        if self.idle_timeout.is_none() {
            return 0;
        }
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| !self.is_expired(entry));
        let pruned = before - sessions.len();
        if pruned > 0 {
            tracing::debug!(pruned, "Pruned expired dialog sessions");
        }
        pruned
    }

    /// Number of sessions currently stored (expired ones included until pruned).
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_format() {
        assert_eq!(session_key("telegram", "42"), "telegram:42");
    }

    #[tokio::test]
    async fn missing_session_is_idle() {
        let store = SessionStore::default();
        assert_eq!(store.get("cli:local").await, DialogSession::Idle);
    }

    #[tokio::test]
    async fn set_and_get() {
        let store = SessionStore::default();
        let session = DialogSession::AwaitingDriver {
            pending_plate: "A1A1A1".into(),
        };
        store.set("telegram:1", session.clone()).await;
        assert_eq!(store.get("telegram:1").await, session);
        assert_eq!(store.get("telegram:2").await, DialogSession::Idle);
    }

    #[tokio::test]
    async fn setting_idle_removes_entry() {
        let store = SessionStore::default();
        store.set("telegram:1", DialogSession::AwaitingPlate).await;
        assert_eq!(store.len().await, 1);
        store.set("telegram:1", DialogSession::Idle).await;
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn users_are_isolated() {
        let store = SessionStore::default();
        store.set("telegram:1", DialogSession::AwaitingPlate).await;
        store.clear("telegram:2").await;
        assert_eq!(store.get("telegram:1").await, DialogSession::AwaitingPlate);
    }

    #[tokio::test]
    async fn without_timeout_nothing_expires() {
        let store = SessionStore::new(None);
        store.set("telegram:1", DialogSession::AwaitingPlate).await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(store.prune_expired().await, 0);
        assert_eq!(store.get("telegram:1").await, DialogSession::AwaitingPlate);
    }

    #[tokio::test]
    async fn expired_session_reads_idle_and_is_pruned() {
        let store = SessionStore::new(Some(Duration::from_millis(10)));
        store.set("telegram:1", DialogSession::AwaitingPlate).await;
        tokio::time::sleep(Duration::from_millis(40)).await;

        assert_eq!(store.get("telegram:1").await, DialogSession::Idle);
        assert_eq!(store.prune_expired().await, 1);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn fresh_session_survives_prune() {
        let store = SessionStore::new(Some(Duration::from_secs(60)));
        store.set("telegram:1", DialogSession::AwaitingPlate).await;
        assert_eq!(store.prune_expired().await, 0);
        assert_eq!(store.get("telegram:1").await, DialogSession::AwaitingPlate);
    }
}
