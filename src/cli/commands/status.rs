use anyhow::Context;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::Database;
use crate::services::{SetupService, UserService};

pub async fn handle(config: AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let db = Database::connect(&config.database)
        .await
        .with_context(|| format!("failed to open database {}", config.database.url))?;

    let status = SetupService::new(&db).status().await?;
    let users = UserService::new(&db).count_users().await?;
    db.close().await;

    let mut data = serde_json::to_value(&status)?;
    data["userCount"] = users.into();

    let message = if status.initialized {
        "Instance is initialized"
    } else {
        "Instance is not initialized"
    };
    output_success(output_format, message, Some(data))
}
