use serde_json::json;

use crate::cli::utils::{connect, output_success};
use crate::cli::OutputFormat;

pub async fn init_db(output_format: OutputFormat) -> anyhow::Result<()> {
    let manager = connect().await?;
    manager.apply_schema().await?;
    manager.close().await;
    output_success(output_format, "Schema applied", None)
}

pub async fn check(output_format: OutputFormat) -> anyhow::Result<()> {
    let manager = connect().await?;
    manager.health_check().await?;
    let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(manager.pool())
        .await?;
    manager.close().await;
    output_success(
        output_format,
        &format!("Database reachable ({} users)", users),
        Some(json!({ "users": users })),
    )
}
