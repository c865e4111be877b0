// handlers/protected/auth.rs - logout, profile and password change for the caller
//
// These routes take no account id: the subject is always the token's user.

use axum::{extract::rejection::JsonRejection, extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::auth::password::{hash_password_blocking, verify_password_blocking};
use crate::database::models::{Permission, Role};
use crate::error::ApiError;
use crate::handlers::input::validate_new_password;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMembership {
    pub team_id: String,
    pub name: String,
    pub permission: Permission,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub email: String,
    pub role: Role,
    pub created_at: i64,
    pub updated_at: i64,
    pub teams: Vec<TeamMembership>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// POST /api/auth/logout - Tokens are stateless; the client discards its copy
pub async fn logout(Extension(auth_user): Extension<AuthUser>) -> ApiResult<()> {
    tracing::info!("User {} logged out", auth_user.user_id);
    Ok(ApiResponse::message_only("Logout successful"))
}

/// GET /api/auth/me - The caller's profile and team memberships
pub async fn me(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Profile> {
    let user = state
        .users
        .get_by_id(&auth_user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let teams = state
        .teams
        .list_user_teams(&user.id)
        .await?
        .into_iter()
        .filter_map(|entry| {
            let permission = entry
                .members
                .iter()
                .find(|m| m.user_id == user.id)
                .map(|m| m.permission)?;
            Some(TeamMembership {
                team_id: entry.team.id,
                name: entry.team.name,
                permission,
            })
        })
        .collect();

    Ok(ApiResponse::success(Profile {
        id: user.id,
        email: user.email,
        role: user.role,
        created_at: user.created_at,
        updated_at: user.updated_at,
        teams,
    }))
}

/// PUT /api/auth/password - Change the caller's own password
///
/// Expected Input:
/// ```json
/// { "currentPassword": "Abc12345!", "newPassword": "Xyz67890#" }
/// ```
pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> ApiResult<()> {
    let Json(body) = payload?;
    let (current, new) = match (body.current_password, body.new_password) {
        (Some(current), Some(new)) if !current.is_empty() && !new.is_empty() => (current, new),
        _ => {
            return Err(ApiError::validation_error(
                "Current password and new password are required",
            ))
        }
    };

    let user = state
        .users
        .get_by_id(&auth_user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if !verify_password_blocking(current, user.password_hash.clone()).await? {
        tracing::warn!("Password change for user {} with wrong current password", user.id);
        return Err(ApiError::validation_error("Current password is incorrect"));
    }
    validate_new_password(&new)?;

    let new_hash = hash_password_blocking(new).await?;
    state.users.update_password(&user.id, &new_hash).await?;

    tracing::info!("User {} changed their password", user.id);
    Ok(ApiResponse::message_only("Password updated successfully"))
}
