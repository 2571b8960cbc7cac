use sqlx::{postgres::PgPoolOptions, Executor, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the database layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Schema applied by `schoolmate-admin init-db`
pub const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Owns the Postgres connection pool shared by every request
#[derive(Clone)]
pub struct DatabaseManager {
    pool: PgPool,
}

impl DatabaseManager {
    /// Create the pool from configuration. Connections are opened lazily.
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let url = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;
        let url = Self::validate_url(url)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect_lazy(url.as_str())?;

        info!("Created database pool for: {}", Self::redacted(&url));
        Ok(Self { pool })
    }

    /// Create the pool and verify connectivity immediately
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let manager = Self::connect_lazy(config)?;
        manager.health_check().await?;
        Ok(manager)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Apply the bundled schema. Statements are idempotent.
    pub async fn apply_schema(&self) -> Result<(), DatabaseError> {
        (&self.pool).execute(SCHEMA_SQL).await?;
        info!("Applied SchoolMate schema");
        Ok(())
    }

    /// Close the pool (e.g., on shutdown)
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }

    fn validate_url(raw: &str) -> Result<url::Url, DatabaseError> {
        let url = url::Url::parse(raw).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        match url.scheme() {
            "postgres" | "postgresql" => {}
            _ => return Err(DatabaseError::InvalidDatabaseUrl),
        }
        if url.path().trim_start_matches('/').is_empty() {
            return Err(DatabaseError::InvalidDatabaseUrl);
        }
        Ok(url)
    }

    /// Connection string safe for logs (password removed)
    fn redacted(url: &url::Url) -> String {
        let mut url = url.clone();
        if url.password().is_some() {
            let _ = url.set_password(Some("***"));
        }
        url.to_string()
    }
}
