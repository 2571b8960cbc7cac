use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::config::{config, Backend};
use crate::database::DatabaseManager;

/// Output a success message in the appropriate format
pub fn output_success(output_format: OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });
            if let (Some(Value::Object(extra)), Some(target)) = (data, response.as_object_mut()) {
                target.extend(extra);
            }
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Connect to the configured Postgres database
pub async fn connect() -> anyhow::Result<DatabaseManager> {
    let config = config();
    if config.database.backend == Backend::Memory {
        anyhow::bail!("the in-memory backend has nothing to administer; set DATABASE_URL");
    }
    Ok(DatabaseManager::connect(&config.database).await?)
}
