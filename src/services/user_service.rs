use sqlx::SqlitePool;
use tracing::info;

use crate::database::models::{Role, User};
use crate::database::{generate_id, now_millis, Database};
use crate::services::StoreError;

const USER_COLUMNS: &str = "id, email, password_hash, role, created_at, updated_at";

/// Identity store: owns user rows and the last-super-admin invariant.
#[derive(Clone)]
pub struct UserService {
    pool: SqlitePool,
}

impl UserService {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }

    /// Create a user. Emails are unique regardless of case.
    pub async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<User, StoreError> {
        let now = now_millis();
        let user = User {
            id: generate_id("usr"),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            role,
            created_at: now,
            updated_at: now,
        };

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
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if StoreError::is_unique_violation(&e) {
                StoreError::Conflict("User with this email already exists".to_string())
            } else {
                StoreError::Database(e)
            }
        })?;

        info!("Created user {} with role {}", user.id, user.role);
        Ok(user)
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Change a user's role. Demoting the last super-admin fails and leaves
    /// the row untouched; the count check and the write are one statement.
    ///
    /// The conditional write opens the transaction so SQLite takes the write
    /// lock (honouring `busy_timeout`) before anything is read. A racing
    /// demotion waits, then sees the committed count.
    pub async fn update_role(&self, user_id: &str, new_role: Role) -> Result<User, StoreError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET role = ?, updated_at = MAX(?, updated_at)
             WHERE id = ?
               AND (role != 'super-admin'
                    OR ? = 'super-admin'
                    OR (SELECT COUNT(*) FROM users WHERE role = 'super-admin') > 1)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(new_role)
        .bind(now_millis())
        .bind(user_id)
        .bind(new_role.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(updated) = updated else {
            return Err(Self::missing_or_last_super_admin(&mut tx, user_id, "demote").await);
        };

        tx.commit().await?;

        info!("User {} role changed to {}", user_id, updated.role);
        Ok(updated)
    }

    pub async fn update_password(&self, user_id: &str, new_hash: &str) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
            .bind(new_hash)
            .bind(now_millis())
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("User not found".to_string()));
        }
        Ok(())
    }

    /// Delete a user and their team memberships. Deleting the last
    /// super-admin fails and rolls both deletes back. Both statements are
    /// writes, so the transaction holds the write lock from its first step.
    pub async fn delete_user(&self, user_id: &str) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let memberships = sqlx::query("DELETE FROM team_members WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let result = sqlx::query(
            "DELETE FROM users
             WHERE id = ?
               AND (role != 'super-admin'
                    OR (SELECT COUNT(*) FROM users WHERE role = 'super-admin') > 1)",
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Self::missing_or_last_super_admin(&mut tx, user_id, "delete").await);
        }

        tx.commit().await?;

        info!("Deleted user {} and {} team membership(s)", user_id, memberships);
        Ok(())
    }

    /// Explain a conditional write that matched no row. Runs inside the
    /// writer's transaction, so the answer reflects the state it saw.
    async fn missing_or_last_super_admin(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        user_id: &str,
        verb: &str,
    ) -> StoreError {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = ?)")
            .bind(user_id)
            .fetch_one(&mut **tx)
            .await;

        match exists {
            Ok(true) => StoreError::InvariantViolation(format!("Cannot {verb} the last super-admin")),
            Ok(false) => StoreError::NotFound("User not found".to_string()),
            Err(e) => StoreError::Database(e),
        }
    }

    /// All users, newest first.
    pub async fn list_all(&self) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, rowid DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    pub async fn count_by_role(&self, role: Role) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = ?")
            .bind(role)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn count_users(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn service() -> UserService {
        let db = Database::connect_in_memory().await.unwrap();
        UserService::new(&db)
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict_regardless_of_case() {
        let users = service().await;
        users.create_user("a@acme.com", "h", Role::User).await.unwrap();

        let err = users.create_user("A@Acme.com", "h", Role::User).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)), "got {err:?}");

        let found = users.get_by_email("A@ACME.COM").await.unwrap().unwrap();
        assert_eq!(found.email, "a@acme.com");
    }

    #[tokio::test]
    async fn last_super_admin_cannot_be_demoted() {
        let users = service().await;
        let root = users.create_user("root@acme.com", "h", Role::SuperAdmin).await.unwrap();

        let err = users.update_role(&root.id, Role::User).await.unwrap_err();
        assert!(matches!(err, StoreError::InvariantViolation(_)), "got {err:?}");

        let unchanged = users.get_by_id(&root.id).await.unwrap().unwrap();
        assert_eq!(unchanged.role, Role::SuperAdmin);
        assert_eq!(unchanged.updated_at, root.updated_at);

        // Re-asserting the same role is not a demotion
        let same = users.update_role(&root.id, Role::SuperAdmin).await.unwrap();
        assert_eq!(same.role, Role::SuperAdmin);
    }

    #[tokio::test]
    async fn demotion_allowed_with_a_second_super_admin() {
        let users = service().await;
        let first = users.create_user("one@acme.com", "h", Role::SuperAdmin).await.unwrap();
        let second = users.create_user("two@acme.com", "h", Role::Admin).await.unwrap();

        users.update_role(&second.id, Role::SuperAdmin).await.unwrap();
        let demoted = users.update_role(&first.id, Role::User).await.unwrap();
        assert_eq!(demoted.role, Role::User);
        assert_eq!(users.count_by_role(Role::SuperAdmin).await.unwrap(), 1);

        // Now `second` is the last one
        let err = users.update_role(&second.id, Role::Admin).await.unwrap_err();
        assert!(matches!(err, StoreError::InvariantViolation(_)));
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let users = service().await;
        assert!(matches!(
            users.update_role("usr_missing", Role::Admin).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            users.delete_user("usr_missing").await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            users.update_password("usr_missing", "h").await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn last_super_admin_cannot_be_deleted() {
        let users = service().await;
        let root = users.create_user("root@acme.com", "h", Role::SuperAdmin).await.unwrap();
        let plain = users.create_user("dev@acme.com", "h", Role::User).await.unwrap();

        let err = users.delete_user(&root.id).await.unwrap_err();
        assert!(matches!(err, StoreError::InvariantViolation(_)));
        assert!(users.get_by_id(&root.id).await.unwrap().is_some());

        users.delete_user(&plain.id).await.unwrap();
        assert!(users.get_by_id(&plain.id).await.unwrap().is_none());
        assert_eq!(users.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn list_all_is_newest_first() {
        let users = service().await;
        let a = users.create_user("a@acme.com", "h", Role::User).await.unwrap();
        let b = users.create_user("b@acme.com", "h", Role::User).await.unwrap();
        let c = users.create_user("c@acme.com", "h", Role::Admin).await.unwrap();

        let ids: Vec<String> = users.list_all().await.unwrap().into_iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![c.id, b.id, a.id]);
        assert_eq!(users.count_by_role(Role::User).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn update_password_replaces_hash() {
        let users = service().await;
        let user = users.create_user("a@acme.com", "old", Role::User).await.unwrap();
        users.update_password(&user.id, "new").await.unwrap();
        let reloaded = users.get_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(reloaded.password_hash, "new");
    }
}
