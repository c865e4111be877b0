// handlers/public/auth.rs - POST /api/auth/login handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::auth::issue_token;
use crate::auth::password::verify_password_blocking;
use crate::database::models::Role;
use crate::error::ApiError;
use crate::handlers::input::{require_credentials, validate_email};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user_id: String,
    pub email: String,
    pub role: Role,
    pub token: String,
}

/// POST /api/auth/login - Authenticate user and receive JWT token
///
/// Expected Input:
/// ```json
/// { "email": "a@acme.com", "password": "Abc12345!" }
/// ```
///
/// Unknown email and wrong password produce the same 401 message.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let Json(body) = payload?;
    let (email, password) = require_credentials(body.email, body.password)?;
    validate_email(&email)?;

    let Some(user) = state.users.get_by_email(&email).await? else {
        tracing::warn!("Failed login for unknown email");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    };

    if !verify_password_blocking(password, user.password_hash.clone()).await? {
        tracing::warn!("Failed login for user {}", user.id);
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    let token = issue_token(&user.id, user.role, &state.config.security)?;
    tracing::info!("User {} logged in", user.id);

    Ok(ApiResponse::success(LoginResponse {
        user_id: user.id,
        email: user.email,
        role: user.role,
        token,
    })
    .with_message("Login successful"))
}
