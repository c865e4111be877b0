// handlers/elevated/users.rs - /api/admin/users handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::auth::Action;
use crate::database::models::{Role, User};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: Option<String>,
}

async fn require_user(state: &AppState, user_id: &str) -> Result<User, ApiError> {
    state
        .users
        .get_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))
}

/// GET /api/admin/users - Every account, newest first, without password hashes
pub async fn user_list(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Vec<User>> {
    auth_user.authorize(&Action::AdministerUsers)?;

    let users = state.users.list_all().await?;
    Ok(ApiResponse::success(users).with_message("Users retrieved successfully"))
}

/// PUT /api/admin/users/:id/role - Change a user's global role
///
/// Expected Input:
/// ```json
/// { "role": "super-admin" | "admin" | "user" }
/// ```
pub async fn user_update_role(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(user_id): Path<String>,
    payload: Result<Json<UpdateRoleRequest>, JsonRejection>,
) -> ApiResult<User> {
    auth_user.authorize(&Action::AdministerUsers)?;

    let Json(body) = payload?;
    let new_role: Role = body
        .role
        .as_deref()
        .and_then(|r| r.parse().ok())
        .ok_or_else(|| {
            ApiError::validation_error("Invalid role. Must be 'super-admin', 'admin' or 'user'")
        })?;

    let target = require_user(&state, &user_id).await?;
    let super_admins = state.users.count_by_role(Role::SuperAdmin).await?;

    auth_user.authorize(&Action::ChangeUserRole {
        target_role: target.role,
        new_role,
        super_admins,
    })?;

    let updated = state.users.update_role(&target.id, new_role).await?;

    tracing::info!(
        "User {} changed role of {} from {} to {}",
        auth_user.user_id,
        updated.id,
        target.role,
        updated.role
    );
    Ok(ApiResponse::success(updated).with_message(format!("User role updated to {}", new_role)))
}

/// DELETE /api/admin/users/:id - Delete a user and their team memberships
pub async fn user_delete(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> ApiResult<()> {
    auth_user.authorize(&Action::AdministerUsers)?;

    let target = require_user(&state, &user_id).await?;
    let super_admins = state.users.count_by_role(Role::SuperAdmin).await?;

    auth_user.authorize(&Action::DeleteUser {
        target: &target.id,
        target_role: target.role,
        super_admins,
    })?;

    state.users.delete_user(&target.id).await?;

    tracing::info!("User {} deleted user {}", auth_user.user_id, target.id);
    Ok(ApiResponse::message_only("User deleted successfully"))
}
