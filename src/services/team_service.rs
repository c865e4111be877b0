use sqlx::SqlitePool;
use std::collections::HashMap;
use tracing::info;

use crate::database::models::{Permission, Team, TeamMember, TeamWithMembers};
use crate::database::{generate_id, now_millis, Database};
use crate::services::StoreError;

const TEAM_COLUMNS: &str = "id, name, description, created_at, updated_at";
const MEMBER_COLUMNS: &str = "team_id, user_id, permission, added_at";

/// Team store: owns teams and their membership rows.
///
/// Listing order is a display convention kept stable for tests: teams by
/// `updated_at` and members by `added_at`, newest first, ties broken by
/// insertion order (newest first).
#[derive(Clone)]
pub struct TeamService {
    pool: SqlitePool,
}

fn normalize_name(name: &str) -> Result<String, StoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StoreError::InvalidArgument(
            "Team name is required and must be a non-empty string".to_string(),
        ));
    }
    Ok(name.to_string())
}

fn normalize_description(description: &str) -> Option<String> {
    let description = description.trim();
    (!description.is_empty()).then(|| description.to_string())
}

impl TeamService {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }

    pub async fn create_team(&self, name: &str, description: Option<&str>) -> Result<Team, StoreError> {
        let now = now_millis();
        let team = Team {
            id: generate_id("team"),
            name: normalize_name(name)?,
            description: description.and_then(normalize_description),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO teams (id, name, description, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&team.id)
        .bind(&team.name)
        .bind(&team.description)
        .bind(team.created_at)
        .bind(team.updated_at)
        .execute(&self.pool)
        .await?;

        info!("Created team {} ({})", team.id, team.name);
        Ok(team)
    }

    pub async fn get_team(&self, team_id: &str) -> Result<Option<TeamWithMembers>, StoreError> {
        let team = sqlx::query_as::<_, Team>(&format!(
            "SELECT {TEAM_COLUMNS} FROM teams WHERE id = ?"
        ))
        .bind(team_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(team) = team else {
            return Ok(None);
        };

        let members = self.members_of(team_id).await?;
        Ok(Some(TeamWithMembers::new(team, members)))
    }

    pub async fn list_teams(&self) -> Result<Vec<TeamWithMembers>, StoreError> {
        let teams = sqlx::query_as::<_, Team>(&format!(
            "SELECT {TEAM_COLUMNS} FROM teams ORDER BY updated_at DESC, rowid DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        let members = sqlx::query_as::<_, TeamMember>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM team_members ORDER BY added_at DESC, rowid DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(Self::attach_members(teams, members))
    }

    /// Teams the user belongs to, most recently updated first.
    pub async fn list_user_teams(&self, user_id: &str) -> Result<Vec<TeamWithMembers>, StoreError> {
        let teams = sqlx::query_as::<_, Team>(
            "SELECT t.id, t.name, t.description, t.created_at, t.updated_at
             FROM teams t
             INNER JOIN team_members tm ON tm.team_id = t.id
             WHERE tm.user_id = ?
             ORDER BY t.updated_at DESC, t.rowid DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let members = sqlx::query_as::<_, TeamMember>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM team_members
             WHERE team_id IN (SELECT team_id FROM team_members WHERE user_id = ?)
             ORDER BY added_at DESC, rowid DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Self::attach_members(teams, members))
    }

    /// Partial update; `None` keeps the stored value. An empty description clears it.
    pub async fn update_team(
        &self,
        team_id: &str,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Team, StoreError> {
        let name = name.map(normalize_name).transpose()?;
        let replace_description = description.is_some();
        let description = description.and_then(normalize_description);

        // Strictly increasing `updated_at` so the update always moves the team to the front
        sqlx::query_as::<_, Team>(&format!(
            "UPDATE teams
             SET name = COALESCE(?, name),
                 description = CASE WHEN ? THEN ? ELSE description END,
                 updated_at = MAX(?, updated_at + 1)
             WHERE id = ?
             RETURNING {TEAM_COLUMNS}"
        ))
        .bind(name)
        .bind(replace_description)
        .bind(description)
        .bind(now_millis())
        .bind(team_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound("Team not found".to_string()))
    }

    /// Remove the team and all of its memberships as one unit.
    pub async fn delete_team(&self, team_id: &str) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let members = sqlx::query("DELETE FROM team_members WHERE team_id = ?")
            .bind(team_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let deleted = sqlx::query("DELETE FROM teams WHERE id = ?")
            .bind(team_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(StoreError::NotFound("Team not found".to_string()));
        }

        tx.commit().await?;

        info!("Deleted team {} with {} member(s)", team_id, members);
        Ok(())
    }

    /// Insert a membership, or overwrite the permission of an existing one.
    /// `added_at` is only written on first insertion.
    pub async fn add_member(
        &self,
        team_id: &str,
        user_id: &str,
        permission: Permission,
    ) -> Result<TeamMember, StoreError> {
        let member = sqlx::query_as::<_, TeamMember>(&format!(
            "INSERT INTO team_members (team_id, user_id, permission, added_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT (team_id, user_id) DO UPDATE SET permission = excluded.permission
             RETURNING {MEMBER_COLUMNS}"
        ))
        .bind(team_id)
        .bind(user_id)
        .bind(permission)
        .bind(now_millis())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if StoreError::is_foreign_key_violation(&e) {
                StoreError::NotFound("Team or user not found".to_string())
            } else {
                StoreError::Database(e)
            }
        })?;

        Ok(member)
    }

    /// Returns whether a membership row was removed.
    pub async fn remove_member(&self, team_id: &str, user_id: &str) -> Result<bool, StoreError> {
        let removed = sqlx::query("DELETE FROM team_members WHERE team_id = ? AND user_id = ?")
            .bind(team_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(removed > 0)
    }

    pub async fn update_member_permission(
        &self,
        team_id: &str,
        user_id: &str,
        permission: Permission,
    ) -> Result<TeamMember, StoreError> {
        sqlx::query_as::<_, TeamMember>(&format!(
            "UPDATE team_members SET permission = ?
             WHERE team_id = ? AND user_id = ?
             RETURNING {MEMBER_COLUMNS}"
        ))
        .bind(permission)
        .bind(team_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound("User is not a member of this team".to_string()))
    }

    pub async fn get_user_permission(
        &self,
        team_id: &str,
        user_id: &str,
    ) -> Result<Option<Permission>, StoreError> {
        let permission = sqlx::query_scalar::<_, Permission>(
            "SELECT permission FROM team_members WHERE team_id = ? AND user_id = ?",
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(permission)
    }

    pub async fn is_member(&self, team_id: &str, user_id: &str) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM team_members WHERE team_id = ? AND user_id = ?)",
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn members_of(&self, team_id: &str) -> Result<Vec<TeamMember>, StoreError> {
        let members = sqlx::query_as::<_, TeamMember>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM team_members
             WHERE team_id = ?
             ORDER BY added_at DESC, rowid DESC"
        ))
        .bind(team_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(members)
    }

    /// Group already-ordered member rows under their teams, preserving both orders.
    fn attach_members(teams: Vec<Team>, members: Vec<TeamMember>) -> Vec<TeamWithMembers> {
        let mut by_team: HashMap<String, Vec<TeamMember>> = HashMap::new();
        for member in members {
            by_team.entry(member.team_id.clone()).or_default().push(member);
        }

        teams
            .into_iter()
            .map(|team| {
                let members = by_team.remove(&team.id).unwrap_or_default();
                TeamWithMembers::new(team, members)
            })
            .collect()
    }
}
