use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub routes: RouteConfig,
    pub pages: PageConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Backend {
    Postgres,
    Memory,
}

impl Backend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Some(Backend::Postgres),
            "memory" | "mem" => Some(Backend::Memory),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub enable_cors: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: Backend,
    /// Read from DATABASE_URL; required for the postgres backend.
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub backend: Backend,
    pub cookie_name: String,
    pub cookie_secure: bool,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Whether `page2=1337` reaches the report-card generator.
    pub enable_report_card_override: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    pub announcement_limit: i64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("SCHOOLMATE_BIND_ADDRESS") {
            self.server.bind_address = v;
        }
        if let Some(port) = env::var("SCHOOLMATE_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }
        if let Ok(v) = env::var("SERVER_ENABLE_CORS") {
            self.server.enable_cors = v.parse().unwrap_or(self.server.enable_cors);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Some(backend) = env::var("SCHOOLMATE_DATABASE_BACKEND").ok().as_deref().and_then(Backend::parse) {
            self.database.backend = backend;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Session overrides; the store follows the database backend unless set explicitly
        self.session.backend = self.database.backend;
        if let Some(backend) = env::var("SESSION_BACKEND").ok().as_deref().and_then(Backend::parse) {
            self.session.backend = backend;
        }
        if let Ok(v) = env::var("SESSION_COOKIE_NAME") {
            if !v.trim().is_empty() {
                self.session.cookie_name = v.trim().to_string();
            }
        }
        if let Ok(v) = env::var("SESSION_COOKIE_SECURE") {
            self.session.cookie_secure = v.parse().unwrap_or(self.session.cookie_secure);
        }
        if let Ok(v) = env::var("SESSION_TTL_MINUTES") {
            self.session.ttl_minutes = v.parse().unwrap_or(self.session.ttl_minutes);
        }

        // Route overrides
        if let Ok(v) = env::var("ROUTES_ENABLE_REPORT_CARD_OVERRIDE") {
            self.routes.enable_report_card_override =
                v.parse().unwrap_or(self.routes.enable_report_card_override);
        }

        // Page overrides
        if let Ok(v) = env::var("PAGES_ANNOUNCEMENT_LIMIT") {
            self.pages.announcement_limit = v.parse().unwrap_or(self.pages.announcement_limit);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                bind_address: "0.0.0.0".to_string(),
                port: 8000,
                enable_cors: true,
            },
            database: DatabaseConfig {
                backend: Backend::Postgres,
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            session: SessionConfig {
                backend: Backend::Postgres,
                cookie_name: "SCHOOLMATE_SESSID".to_string(),
                cookie_secure: false,
                ttl_minutes: 24 * 60,
            },
            routes: RouteConfig {
                enable_report_card_override: true,
            },
            pages: PageConfig {
                announcement_limit: 10,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                bind_address: "0.0.0.0".to_string(),
                port: 8000,
                enable_cors: false,
            },
            database: DatabaseConfig {
                backend: Backend::Postgres,
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            session: SessionConfig {
                backend: Backend::Postgres,
                cookie_name: "SCHOOLMATE_SESSID".to_string(),
                cookie_secure: true,
                ttl_minutes: 8 * 60,
            },
            routes: RouteConfig {
                enable_report_card_override: true,
            },
            pages: PageConfig {
                announcement_limit: 10,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                bind_address: "0.0.0.0".to_string(),
                port: 8000,
                enable_cors: false,
            },
            database: DatabaseConfig {
                backend: Backend::Postgres,
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            session: SessionConfig {
                backend: Backend::Postgres,
                cookie_name: "SCHOOLMATE_SESSID".to_string(),
                cookie_secure: true,
                ttl_minutes: 60,
            },
            routes: RouteConfig {
                enable_report_card_override: true,
            },
            pages: PageConfig {
                announcement_limit: 5,
            },
        }
    }

    /// Development defaults wired to the in-memory backends, used by tests and demos.
    pub fn in_memory() -> Self {
        let mut config = Self::development();
        config.database.backend = Backend::Memory;
        config.session.backend = Backend::Memory;
        config
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
