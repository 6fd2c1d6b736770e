//! User repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use ams_core::error::{AppError, ErrorKind};
use ams_core::result::AppResult;
use ams_entity::user::{Role, User, UserAccount};

/// Repository for the user lookups the authentication flows need.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an active user by email (case-insensitive), with role names.
    pub async fn find_active_by_email(&self, email: &str) -> AppResult<Option<UserAccount>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE LOWER(email) = LOWER($1) AND is_active = TRUE",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find user by email", e)
        })?;

        self.with_roles(user).await
    }

    /// Find an active user by primary key, with role names.
    pub async fn find_active_by_id(&self, id: Uuid) -> AppResult<Option<UserAccount>> {
        let user =
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 AND is_active = TRUE")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to find active user", e)
                })?;

        self.with_roles(user).await
    }

    /// Active roles assigned to a user, sorted by name.
    pub async fn find_roles(&self, user_id: Uuid) -> AppResult<Vec<Role>> {
        sqlx::query_as::<_, Role>(
            "SELECT r.* FROM roles r \
             JOIN user_roles ur ON ur.role_id = r.id \
             WHERE ur.user_id = $1 AND r.is_active = TRUE \
             ORDER BY r.name",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load user roles", e))
    }

    /// Replace the password digest of an active user.
    ///
    /// Returns `false` when no active user has that ID.
    pub async fn update_password(&self, id: Uuid, password_hash: &str) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = NOW() \
             WHERE id = $1 AND is_active = TRUE",
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update password", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn with_roles(&self, user: Option<User>) -> AppResult<Option<UserAccount>> {
        match user {
            Some(user) => {
                let roles = self.find_roles(user.id).await?;
                let names = roles.into_iter().map(|r| r.name).collect();
                Ok(Some(UserAccount::new(user, names)))
            }
            None => Ok(None),
        }
    }
}
