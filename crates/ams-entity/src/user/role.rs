//! Role entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A named role that can be assigned to users.
///
/// Role names are carried into access tokens as `role` claims; what a role
/// grants is decided elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Role {
    /// Unique role identifier.
    pub id: Uuid,
    /// Role name as it appears in tokens.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Inactive roles are not granted to their holders.
    pub is_active: bool,
    /// When the role was created.
    pub created_at: DateTime<Utc>,
}
