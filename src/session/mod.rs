//! Cookie-keyed sessions.
//!
//! A `Session` is the request-scoped view: it is started from the incoming
//! cookie, mutated by login/logout, and committed back to a `SessionStore`
//! once the page has been produced. Stores only ever see whole records keyed
//! by `SessionId`.

pub mod cookie;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::types::Role;

pub use memory::MemorySessionStore;
pub use postgres::PgSessionStore;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a cookie value; anything but a UUID is rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw.trim()).ok().map(Self)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Authenticated user stored in a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub user: SessionUser,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionData {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Persistence for session records
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns `None` for unknown or expired sessions
    async fn load(&self, id: &SessionId) -> Result<Option<SessionData>, SessionError>;

    async fn save(&self, id: &SessionId, data: &SessionData) -> Result<(), SessionError>;

    async fn destroy(&self, id: &SessionId) -> Result<(), SessionError>;

    /// Remove expired records, returning how many were dropped
    async fn purge_expired(&self) -> Result<u64, SessionError>;
}

/// What the response must do with the session cookie
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieDirective {
    Keep,
    Set(SessionId),
    Expire,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Change {
    Unchanged,
    Updated,
    Destroyed,
}

/// Request-scoped session state
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    data: Option<SessionData>,
    issued: bool,
    replaced: Option<SessionId>,
    change: Change,
    ttl: Duration,
}

impl Session {
    /// Resume the session named by the cookie or begin a fresh one.
    pub async fn start(
        store: &dyn SessionStore,
        cookie_value: Option<&str>,
        ttl: Duration,
    ) -> Result<Self, SessionError> {
        if let Some(id) = cookie_value.and_then(SessionId::parse) {
            let data = store.load(&id).await?;
            return Ok(Self {
                id,
                data,
                issued: false,
                replaced: None,
                change: Change::Unchanged,
                ttl,
            });
        }

        let id = SessionId::generate();
        debug!("Started new session {}", id);
        Ok(Self {
            id,
            data: None,
            issued: true,
            replaced: None,
            change: Change::Unchanged,
            ttl,
        })
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.data.as_ref().map(|d| &d.user)
    }

    /// Store an authenticated user. The session id is rotated so a token
    /// handed out before login cannot be reused afterwards.
    pub fn login(&mut self, user: SessionUser) {
        let now = Utc::now();
        if !self.issued {
            self.replaced = Some(self.id);
        }
        self.id = SessionId::generate();
        self.issued = true;
        self.data = Some(SessionData {
            user,
            created_at: now,
            expires_at: now + self.ttl,
        });
        self.change = Change::Updated;
    }

    /// Drop all session state.
    pub fn destroy(&mut self) {
        self.data = None;
        self.change = Change::Destroyed;
    }

    pub fn is_destroyed(&self) -> bool {
        self.change == Change::Destroyed
    }

    /// Persist changes and report what to do with the cookie.
    pub async fn commit(self, store: &dyn SessionStore) -> Result<CookieDirective, SessionError> {
        if let Some(previous) = &self.replaced {
            store.destroy(previous).await?;
        }

        match self.change {
            Change::Destroyed => {
                store.destroy(&self.id).await?;
                info!("Destroyed session {}", self.id);
                Ok(CookieDirective::Expire)
            }
            Change::Updated => {
                if let Some(data) = &self.data {
                    store.save(&self.id, data).await?;
                }
                Ok(CookieDirective::Set(self.id))
            }
            Change::Unchanged if self.issued => Ok(CookieDirective::Set(self.id)),
            Change::Unchanged => Ok(CookieDirective::Keep),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn teacher() -> SessionUser {
        SessionUser {
            user_id: 2,
            username: "teacher".to_string(),
            role: Role::Teacher,
        }
    }

    #[test]
    fn parses_only_uuid_cookies() {
        assert!(SessionId::parse("not-a-session").is_none());
        assert!(SessionId::parse("<script>").is_none());
        let id = SessionId::generate();
        assert_eq!(SessionId::parse(&id.to_string()), Some(id));
    }

    #[tokio::test]
    async fn new_session_sets_cookie() {
        let store = MemorySessionStore::new();
        let session = Session::start(&store, None, Duration::minutes(5)).await.unwrap();
        assert!(session.user().is_none());
        let id = *session.id();
        assert_eq!(session.commit(&store).await.unwrap(), CookieDirective::Set(id));
        assert!(store.load(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn login_persists_and_resumes() {
        let store = MemorySessionStore::new();
        let mut session = Session::start(&store, None, Duration::minutes(5)).await.unwrap();
        session.login(teacher());
        let CookieDirective::Set(id) = session.commit(&store).await.unwrap() else {
            panic!("login must set the cookie");
        };

        let resumed = Session::start(&store, Some(&id.to_string()), Duration::minutes(5)).await.unwrap();
        assert_eq!(resumed.user(), Some(&teacher()));
        assert_eq!(resumed.commit(&store).await.unwrap(), CookieDirective::Keep);
    }

    #[tokio::test]
    async fn login_rotates_existing_session_id() {
        let store = MemorySessionStore::new();
        let mut first = Session::start(&store, None, Duration::minutes(5)).await.unwrap();
        first.login(teacher());
        let CookieDirective::Set(old) = first.commit(&store).await.unwrap() else {
            panic!("expected cookie");
        };

        let mut again = Session::start(&store, Some(&old.to_string()), Duration::minutes(5)).await.unwrap();
        again.login(teacher());
        let CookieDirective::Set(new) = again.commit(&store).await.unwrap() else {
            panic!("expected cookie");
        };
        assert_ne!(old, new);
        assert!(store.load(&old).await.unwrap().is_none());
        assert!(store.load(&new).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn destroy_removes_record_and_expires_cookie() {
        let store = MemorySessionStore::new();
        let mut session = Session::start(&store, None, Duration::minutes(5)).await.unwrap();
        session.login(teacher());
        let CookieDirective::Set(id) = session.commit(&store).await.unwrap() else {
            panic!("expected cookie");
        };

        let mut resumed = Session::start(&store, Some(&id.to_string()), Duration::minutes(5)).await.unwrap();
        resumed.destroy();
        assert!(resumed.user().is_none());
        assert_eq!(resumed.commit(&store).await.unwrap(), CookieDirective::Expire);
        assert!(store.load(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_sessions_do_not_resume() {
        let store = MemorySessionStore::new();
        let mut session = Session::start(&store, None, Duration::minutes(-1)).await.unwrap();
        session.login(teacher());
        let CookieDirective::Set(id) = session.commit(&store).await.unwrap() else {
            panic!("expected cookie");
        };
        let resumed = Session::start(&store, Some(&id.to_string()), Duration::minutes(5)).await.unwrap();
        assert!(resumed.user().is_none());
    }
}
