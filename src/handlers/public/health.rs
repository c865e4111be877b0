// handlers/public/health.rs - GET /api/health handler

use axum::extract::State;
use serde::Serialize;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: String,
    pub database: &'static str,
}

/// GET /api/health - Liveness plus a database ping
///
/// Answers 503 when the database cannot be reached.
pub async fn health(State(state): State<AppState>) -> ApiResult<HealthStatus> {
    if let Err(e) = state.db.health_check().await {
        tracing::error!("Health check failed: {}", e);
        return Err(ApiError::service_unavailable("Database unavailable"));
    }

    Ok(ApiResponse::success(HealthStatus {
        status: "ok",
        timestamp: chrono::Utc::now().to_rfc3339(),
        database: "ok",
    })
    .with_message("Server is running"))
}
