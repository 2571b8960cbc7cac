use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{SessionData, SessionError, SessionId, SessionStore};

/// Process-local session store
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, SessionData>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, id: &SessionId) -> Result<Option<SessionData>, SessionError> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(id)
            .filter(|data| !data.is_expired(Utc::now()))
            .cloned())
    }

    async fn save(&self, id: &SessionId, data: &SessionData) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(*id, data.clone());
        Ok(())
    }

    async fn destroy(&self, id: &SessionId) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(id);
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64, SessionError> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, data| !data.is_expired(now));
        Ok((before - sessions.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionUser;
    use crate::types::Role;
    use chrono::Duration;

    fn data(expires_in: Duration) -> SessionData {
        let now = Utc::now();
        SessionData {
            user: SessionUser {
                user_id: 1,
                username: "test".to_string(),
                role: Role::Admin,
            },
            created_at: now,
            expires_at: now + expires_in,
        }
    }

    #[tokio::test]
    async fn purge_drops_only_expired_records() {
        let store = MemorySessionStore::new();
        let live = SessionId::generate();
        let stale = SessionId::generate();
        store.save(&live, &data(Duration::minutes(10))).await.unwrap();
        store.save(&stale, &data(Duration::minutes(-10))).await.unwrap();

        assert_eq!(store.purge_expired().await.unwrap(), 1);
        assert_eq!(store.len().await, 1);
        assert!(store.load(&live).await.unwrap().is_some());
    }
}
