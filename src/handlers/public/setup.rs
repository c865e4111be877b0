// handlers/public/setup.rs - GET /api/setup/status and POST /api/setup/init handlers

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::auth::issue_token;
use crate::auth::password::hash_password_blocking;
use crate::database::models::{Organization, Role, User};
use crate::error::ApiError;
use crate::handlers::input::{
    require_credentials, validate_email, validate_new_password, validate_org_name,
};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{SetupService, SetupStatus};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitRequest {
    pub org_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitResponse {
    pub user_id: String,
    pub org_id: String,
    pub email: String,
    pub role: Role,
    pub token: String,
}

/// GET /api/setup/status - Whether the instance has been bootstrapped
pub async fn setup_status(State(state): State<AppState>) -> ApiResult<SetupStatus> {
    Ok(ApiResponse::success(state.setup.status().await?))
}

/// POST /api/setup/init - First-time setup: organization plus founding super-admin
///
/// Expected Input:
/// ```json
/// { "orgName": "Acme", "email": "a@acme.com", "password": "Abc12345!" }
/// ```
///
/// Only works once. Later calls answer 409 before the body is looked at.
pub async fn setup_init(
    State(state): State<AppState>,
    payload: Result<Json<InitRequest>, JsonRejection>,
) -> ApiResult<InitResponse> {
    if state.setup.is_initialized().await? {
        return Err(ApiError::conflict("Instance is already initialized"));
    }

    let Json(body) = payload?;
    let (org, user) = initialize(&state.setup, body.org_name, body.email, body.password).await?;
    let token = issue_token(&user.id, user.role, &state.config.security)?;

    Ok(ApiResponse::created(InitResponse {
        user_id: user.id,
        org_id: org.id,
        email: user.email,
        role: user.role,
        token,
    })
    .with_message("Instance initialized successfully with super admin created"))
}

/// Validate bootstrap input and create the instance. Shared with `piper init`.
pub async fn initialize(
    setup: &SetupService,
    org_name: Option<String>,
    email: Option<String>,
    password: Option<String>,
) -> Result<(Organization, User), ApiError> {
    let org_name = validate_org_name(org_name)?;
    let (email, password) = require_credentials(email, password)?;
    validate_email(&email)?;
    validate_new_password(&password)?;

    let password_hash = hash_password_blocking(password).await?;
    Ok(setup
        .initialize_instance(&org_name, &email, &password_hash)
        .await?)
}
