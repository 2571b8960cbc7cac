use anyhow::Context;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use schoolmate::config;
use schoolmate::server::{self, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::config().clone();
    tracing::info!(
        "Starting SchoolMate in {:?} mode (database: {:?}, sessions: {:?})",
        config.environment,
        config.database.backend,
        config.session.backend
    );

    let bind_addr = format!("{}:{}", config.server.bind_address, config.server.port);
    let state = AppState::from_config(config).context("failed to initialize backends")?;

    server::spawn_session_purge(state.sessions.clone(), Duration::from_secs(300));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("SchoolMate listening on http://{}", bind_addr);

    axum::serve(listener, server::app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
