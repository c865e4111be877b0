// handlers/protected/team.rs - /api/team and /api/team/:id handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::auth::Action;
use crate::database::models::{Team, TeamWithMembers};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateTeamRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTeamRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// GET /api/team - All teams with members, most recently updated first
pub async fn team_list(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Vec<TeamWithMembers>> {
    auth_user.authorize(&Action::ManageTeams)?;
    Ok(ApiResponse::success(state.teams.list_teams().await?))
}

/// GET /api/team/:id - One team with members and member count
pub async fn team_get(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(team_id): Path<String>,
) -> ApiResult<TeamWithMembers> {
    auth_user.authorize(&Action::ManageTeams)?;

    let team = state
        .teams
        .get_team(&team_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Team not found"))?;
    Ok(ApiResponse::success(team))
}

/// POST /api/team - Create a team
///
/// Expected Input:
/// ```json
/// { "name": "Backend", "description": "API and storage" }
/// ```
pub async fn team_create(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    payload: Result<Json<CreateTeamRequest>, JsonRejection>,
) -> ApiResult<Team> {
    auth_user.authorize(&Action::ManageTeams)?;

    let Json(body) = payload?;
    let name = body.name.unwrap_or_default();
    let team = state
        .teams
        .create_team(&name, body.description.as_deref())
        .await?;

    tracing::info!("User {} created team {} ({})", auth_user.user_id, team.id, team.name);
    Ok(ApiResponse::created(team))
}

/// PUT /api/team/:id - Partial update; omitted fields keep their value
pub async fn team_update(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(team_id): Path<String>,
    payload: Result<Json<UpdateTeamRequest>, JsonRejection>,
) -> ApiResult<Team> {
    auth_user.authorize(&Action::ManageTeams)?;

    let Json(body) = payload?;
    if matches!(&body.name, Some(name) if name.trim().is_empty()) {
        return Err(ApiError::validation_error("Team name must be a non-empty string"));
    }

    let team = state
        .teams
        .update_team(&team_id, body.name.as_deref(), body.description.as_deref())
        .await?;
    Ok(ApiResponse::success(team))
}

/// DELETE /api/team/:id - Remove a team and every membership in it
pub async fn team_delete(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(team_id): Path<String>,
) -> ApiResult<()> {
    auth_user.authorize(&Action::ManageTeams)?;

    state.teams.delete_team(&team_id).await?;

    tracing::info!("User {} deleted team {}", auth_user.user_id, team_id);
    Ok(ApiResponse::message_only("Team deleted successfully"))
}
