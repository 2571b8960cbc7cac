use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Duration;
use serde_json::json;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::config::{AppConfig, Backend};
use crate::database::{ConnectionProvider, DatabaseManager, MemoryConnectionProvider, PgConnectionProvider};
use crate::dispatch::{Dispatcher, FormFields};
use crate::error::PageError;
use crate::pages::Collaborators;
use crate::session::{cookie, MemorySessionStore, PgSessionStore, Session, SessionStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub provider: Arc<dyn ConnectionProvider>,
    pub sessions: Arc<dyn SessionStore>,
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    pub fn new(
        config: Arc<AppConfig>,
        provider: Arc<dyn ConnectionProvider>,
        sessions: Arc<dyn SessionStore>,
        collaborators: Collaborators,
    ) -> Self {
        let dispatcher = Arc::new(Dispatcher::new(collaborators, Arc::clone(&config)));
        Self {
            config,
            provider,
            sessions,
            dispatcher,
        }
    }

    /// Build backends as configured
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        let manager = match (config.database.backend, config.session.backend) {
            (Backend::Memory, Backend::Memory) => None,
            _ => Some(DatabaseManager::connect_lazy(&config.database)?),
        };

        let provider: Arc<dyn ConnectionProvider> = match (config.database.backend, &manager) {
            (Backend::Postgres, Some(manager)) => Arc::new(PgConnectionProvider::new(manager.clone())),
            _ => {
                info!("Using in-memory demo database");
                Arc::new(MemoryConnectionProvider::demo()?)
            }
        };

        let sessions: Arc<dyn SessionStore> = match (config.session.backend, &manager) {
            (Backend::Postgres, Some(manager)) => Arc::new(PgSessionStore::new(manager.pool().clone())),
            _ => {
                info!("Using in-memory session store");
                Arc::new(MemorySessionStore::new())
            }
        };

        Ok(Self::new(config, provider, sessions, Collaborators::standard()))
    }
}

pub fn app(state: AppState) -> Router {
    let router = Router::new()
        .route("/", get(index_get).post(index_post))
        .route("/index.php", get(index_get).post(index_post))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http());

    let router = if state.config.server.enable_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    };

    router.with_state(state)
}

/// Plain visits carry no form fields and land on the login page
async fn index_get(State(state): State<AppState>, jar: CookieJar) -> Response {
    serve(&state, jar, FormFields::new()).await
}

async fn index_post(State(state): State<AppState>, jar: CookieJar, form: FormFields) -> Response {
    serve(&state, jar, form).await
}

async fn serve(state: &AppState, jar: CookieJar, form: FormFields) -> Response {
    let session_config = &state.config.session;
    let cookie_value = cookie::session_cookie(&jar, session_config);
    let ttl = Duration::minutes(session_config.ttl_minutes);

    let mut session = match Session::start(state.sessions.as_ref(), cookie_value.as_deref(), ttl).await {
        Ok(session) => session,
        Err(e) => return PageError::from(e).into_response(),
    };

    let outcome = state
        .dispatcher
        .dispatch(state.provider.as_ref(), &mut session, &form)
        .await;

    let directive = match session.commit(state.sessions.as_ref()).await {
        Ok(directive) => directive,
        Err(e) => return PageError::from(e).into_response(),
    };
    let jar = cookie::apply_directive(jar, &directive, session_config);

    match outcome {
        Ok(page) => (jar, (page.status, Html(page.html()))).into_response(),
        Err(e) => (jar, e).into_response(),
    }
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.provider.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}

/// Periodically drop expired sessions from the store
pub fn spawn_session_purge(sessions: Arc<dyn SessionStore>, every: std::time::Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            match sessions.purge_expired().await {
                Ok(0) => {}
                Ok(n) => info!("Purged {} expired sessions", n),
                Err(e) => error!("Session purge failed: {}", e),
            }
        }
    })
}
