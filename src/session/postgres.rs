use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::{debug, warn};

use super::{SessionData, SessionError, SessionId, SessionStore, SessionUser};
use crate::types::Role;

/// Session records in the `sessions` table
#[derive(Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn load(&self, id: &SessionId) -> Result<Option<SessionData>, SessionError> {
        let row = sqlx::query(
            r#"
            SELECT user_id, username, role, created_at, expires_at
            FROM sessions
            WHERE id = $1
            AND expires_at > now()
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let role: String = row.try_get("role")?;
        let Ok(role) = role.parse::<Role>() else {
            warn!("Discarding session {} with unknown role '{}'", id, role);
            return Ok(None);
        };

        let created_at: DateTime<Utc> = row.try_get("created_at")?;
        let expires_at: DateTime<Utc> = row.try_get("expires_at")?;

        Ok(Some(SessionData {
            user: SessionUser {
                user_id: row.try_get("user_id")?,
                username: row.try_get("username")?,
                role,
            },
            created_at,
            expires_at,
        }))
    }

    async fn save(&self, id: &SessionId, data: &SessionData) -> Result<(), SessionError> {
        sqlx::query(
            r#"
            INSERT INTO sessions (id, user_id, username, role, created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                user_id = EXCLUDED.user_id,
                username = EXCLUDED.username,
                role = EXCLUDED.role,
                expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(data.user.user_id)
        .bind(&data.user.username)
        .bind(data.user.role.as_str())
        .bind(data.created_at)
        .bind(data.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn destroy(&self, id: &SessionId) -> Result<(), SessionError> {
        sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64, SessionError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= now()")
            .execute(&self.pool)
            .await?;
        debug!("Purged {} expired sessions", result.rows_affected());
        Ok(result.rows_affected())
    }
}
