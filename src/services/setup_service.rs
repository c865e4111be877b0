use serde::Serialize;
use sqlx::SqlitePool;
use tracing::info;

use crate::database::models::{Organization, Role, User};
use crate::database::{generate_id, now_millis, Database};
use crate::services::StoreError;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupStatus {
    pub initialized: bool,
    pub super_admin_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_name: Option<String>,
}

/// One-shot instance bootstrap: the organization row and the founding super-admin.
#[derive(Clone)]
pub struct SetupService {
    pool: SqlitePool,
}

impl SetupService {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }

    pub async fn organization(&self) -> Result<Option<Organization>, StoreError> {
        let org = sqlx::query_as::<_, Organization>(
            "SELECT id, name, description, created_at, updated_at FROM organization LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(org)
    }

    pub async fn is_initialized(&self) -> Result<bool, StoreError> {
        Ok(self.organization().await?.is_some())
    }

    pub async fn status(&self) -> Result<SetupStatus, StoreError> {
        let org = self.organization().await?;
        let super_admin_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = ?")
                .bind(Role::SuperAdmin)
                .fetch_one(&self.pool)
                .await?;

        Ok(SetupStatus {
            initialized: org.is_some(),
            super_admin_count,
            org_name: org.map(|o| o.name),
        })
    }

    /// Create the organization and its founding super-admin in one
    /// transaction. Succeeds at most once per database; the schema's
    /// singleton constraint decides between concurrent attempts.
    pub async fn initialize_instance(
        &self,
        org_name: &str,
        admin_email: &str,
        admin_password_hash: &str,
    ) -> Result<(Organization, User), StoreError> {
        let already_initialized = || StoreError::Conflict("Instance is already initialized".to_string());

        let now = now_millis();
        let org = Organization {
            id: generate_id("org"),
            name: org_name.to_string(),
            description: None,
            created_at: now,
            updated_at: now,
        };
        let user = User {
            id: generate_id("usr"),
            email: admin_email.to_string(),
            password_hash: admin_password_hash.to_string(),
            role: Role::SuperAdmin,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.pool.begin().await?;

        // Writing first takes the lock up front; a racing initializer waits
        // for this commit and then trips the singleton constraint.
        sqlx::query(
            "INSERT INTO organization (id, name, description, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&org.id)
        .bind(&org.name)
        .bind(&org.description)
        .bind(org.created_at)
        .bind(org.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if StoreError::is_unique_violation(&e) {
                already_initialized()
            } else {
                StoreError::Database(e)
            }
        })?;

        sqlx::query(
            "INSERT INTO users (id, email, password_hash, role, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if StoreError::is_unique_violation(&e) {
                StoreError::Conflict("User with this email already exists".to_string())
            } else {
                StoreError::Database(e)
            }
        })?;

        tx.commit().await?;

        info!("Instance initialized: organization {} ({}), super-admin {}", org.id, org.name, user.id);
        Ok((org, user))
    }
}
