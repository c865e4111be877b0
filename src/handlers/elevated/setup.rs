// handlers/elevated/setup.rs - POST /api/setup/create-admin handler

use axum::{extract::rejection::JsonRejection, extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::auth::password::hash_password_blocking;
use crate::auth::Action;
use crate::database::models::Role;
use crate::error::ApiError;
use crate::handlers::input::{require_credentials, validate_email, validate_new_password};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateAdminRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedUser {
    pub user_id: String,
    pub email: String,
    pub role: Role,
}

/// POST /api/setup/create-admin - Create an admin or plain user account
///
/// Expected Input:
/// ```json
/// { "email": "ops@acme.com", "password": "Abc12345!", "role": "admin" }
/// ```
///
/// `role` is `admin` (default) or `user`. Super-admins are made by
/// promoting an existing account.
pub async fn create_admin(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    payload: Result<Json<CreateAdminRequest>, JsonRejection>,
) -> ApiResult<CreatedUser> {
    auth_user.authorize(&Action::CreateUser)?;

    let Json(body) = payload?;
    let (email, password) = require_credentials(body.email, body.password)?;
    validate_email(&email)?;
    validate_new_password(&password)?;

    let role = match body.role.as_deref() {
        None | Some("admin") => Role::Admin,
        Some("user") => Role::User,
        Some(_) => {
            return Err(ApiError::validation_error(
                "Invalid role. Must be 'admin' or 'user'",
            ))
        }
    };

    let password_hash = hash_password_blocking(password).await?;
    let user = state.users.create_user(&email, &password_hash, role).await?;

    tracing::info!("User {} created {} account {}", auth_user.user_id, user.role, user.id);
    let message = match user.role {
        Role::Admin => "Admin created successfully",
        _ => "User created successfully",
    };

    Ok(ApiResponse::created(CreatedUser {
        user_id: user.id,
        email: user.email,
        role: user.role,
    })
    .with_message(message))
}
