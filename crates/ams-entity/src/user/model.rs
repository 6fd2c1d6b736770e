//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Login email address.
    pub email: String,
    /// Argon2 password hash (PHC string).
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Deactivated users cannot log in or refresh.
    pub is_active: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Full display name, `"First Last"`.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A user together with the names of their active roles.
///
/// This is what the authentication flows need to mint an access token.
#[derive(Debug, Clone)]
pub struct UserAccount {
    /// The user row.
    pub user: User,
    /// Names of the roles assigned to the user.
    pub roles: Vec<String>,
}

impl UserAccount {
    /// Creates an account view from a user and role names.
    pub fn new(user: User, roles: Vec<String>) -> Self {
        Self { user, roles }
    }

    /// The user's ID.
    pub fn id(&self) -> Uuid {
        self.user.id
    }

    /// The user's email address.
    pub fn email(&self) -> &str {
        &self.user.email
    }
}
