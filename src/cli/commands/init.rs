use anyhow::Context;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::Database;
use crate::handlers::public::setup::initialize;
use crate::services::SetupService;

/// Offline counterpart of `POST /api/setup/init`; same validation, same
/// single-use guarantee.
pub async fn handle(
    config: AppConfig,
    org_name: String,
    email: String,
    password: String,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let db = Database::connect(&config.database)
        .await
        .with_context(|| format!("failed to open database {}", config.database.url))?;

    let result = initialize(
        &SetupService::new(&db),
        Some(org_name),
        Some(email),
        Some(password),
    )
    .await;
    db.close().await;
    let (org, user) = result?;

    output_success(
        output_format,
        "Instance initialized",
        Some(json!({
            "orgId": org.id,
            "orgName": org.name,
            "userId": user.id,
            "email": user.email,
            "role": user.role,
        })),
    )
}
