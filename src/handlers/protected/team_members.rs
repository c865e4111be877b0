// handlers/protected/team_members.rs - /api/team/:id/members handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::auth::Action;
use crate::database::models::{Permission, TeamMember};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

const INVALID_PERMISSION: &str = "Permission must be 'view' or 'edit'";
const NOT_A_MEMBER: &str = "User is not a member of this team";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    pub user_id: Option<String>,
    pub permission: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMemberRequest {
    pub permission: Option<String>,
}

fn parse_permission(value: &str) -> Result<Permission, ApiError> {
    value
        .parse()
        .map_err(|_| ApiError::validation_error(INVALID_PERMISSION))
}

async fn require_team(state: &AppState, team_id: &str) -> Result<(), ApiError> {
    match state.teams.get_team(team_id).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::not_found("Team not found")),
    }
}

/// POST /api/team/:id/members - Add a member, or overwrite an existing
/// member's permission
///
/// Expected Input:
/// ```json
/// { "userId": "usr_...", "permission": "edit" }
/// ```
///
/// `permission` defaults to `view`.
pub async fn member_add(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(team_id): Path<String>,
    payload: Result<Json<AddMemberRequest>, JsonRejection>,
) -> ApiResult<TeamMember> {
    auth_user.authorize(&Action::ManageTeamMembers)?;
    require_team(&state, &team_id).await?;

    let Json(body) = payload?;
    let user_id = body
        .user_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::validation_error("User ID is required"))?;

    if state.users.get_by_id(&user_id).await?.is_none() {
        return Err(ApiError::not_found("User not found"));
    }

    let permission = match body.permission.as_deref() {
        Some(value) => parse_permission(value)?,
        None => Permission::default(),
    };

    let member = state.teams.add_member(&team_id, &user_id, permission).await?;

    tracing::info!(
        "User {} set {} as {} member of team {}",
        auth_user.user_id,
        user_id,
        member.permission,
        team_id
    );
    Ok(ApiResponse::created(member))
}

/// DELETE /api/team/:id/members/:userId - Remove a member
pub async fn member_remove(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path((team_id, user_id)): Path<(String, String)>,
) -> ApiResult<()> {
    auth_user.authorize(&Action::ManageTeamMembers)?;
    require_team(&state, &team_id).await?;

    if !state.teams.is_member(&team_id, &user_id).await? {
        return Err(ApiError::not_found(NOT_A_MEMBER));
    }
    state.teams.remove_member(&team_id, &user_id).await?;

    tracing::info!("User {} removed {} from team {}", auth_user.user_id, user_id, team_id);
    Ok(ApiResponse::message_only("Member removed successfully"))
}

/// PUT /api/team/:id/members/:userId - Change a member's permission
///
/// Expected Input:
/// ```json
/// { "permission": "view" }
/// ```
pub async fn member_update(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path((team_id, user_id)): Path<(String, String)>,
    payload: Result<Json<UpdateMemberRequest>, JsonRejection>,
) -> ApiResult<TeamMember> {
    auth_user.authorize(&Action::ManageTeamMembers)?;
    require_team(&state, &team_id).await?;

    if state.teams.get_user_permission(&team_id, &user_id).await?.is_none() {
        return Err(ApiError::not_found(NOT_A_MEMBER));
    }

    let Json(body) = payload?;
    let permission = body
        .permission
        .as_deref()
        .ok_or_else(|| ApiError::validation_error(INVALID_PERMISSION))
        .and_then(parse_permission)?;

    let member = state
        .teams
        .update_member_permission(&team_id, &user_id, permission)
        .await?;
    Ok(ApiResponse::success(member))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_parsing() {
        assert_eq!(parse_permission("edit").unwrap(), Permission::Edit);
        assert_eq!(parse_permission("view").unwrap(), Permission::View);
        let err = parse_permission("admin").unwrap_err();
        assert_eq!(err.message(), INVALID_PERMISSION);
    }
}
