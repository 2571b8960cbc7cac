use anyhow::Context;
use serde_json::json;

use crate::auth;
use crate::cli::utils::{connect, output_success};
use crate::cli::OutputFormat;
use crate::types::Role;

pub async fn add_user(username: &str, password: &str, role: Role, output_format: OutputFormat) -> anyhow::Result<()> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        anyhow::bail!("username and password must not be empty");
    }

    let password_hash = auth::hash_password(password)?;
    let manager = connect().await?;
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO users (username, password_hash, role) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(username)
    .bind(&password_hash)
    .bind(role.as_str())
    .fetch_one(manager.pool())
    .await
    .with_context(|| format!("failed to create user '{}'", username))?;
    manager.close().await;

    output_success(
        output_format,
        &format!("Created {} user '{}' (id {})", role, username, id),
        Some(json!({ "id": id, "username": username, "role": role.as_str() })),
    )
}

pub fn hash_password(password: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let hash = auth::hash_password(password)?;
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&json!({ "hash": hash }))?),
        OutputFormat::Text => println!("{}", hash),
    }
    Ok(())
}
