//! API key entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A static API key issued to a location or integration.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApiKey {
    /// Unique key identifier.
    pub id: Uuid,
    /// The key value presented in the API key header.
    #[serde(skip_serializing)]
    pub key: String,
    /// What the key is used for.
    pub description: String,
    /// Disabled keys are rejected.
    pub is_active: bool,
    /// Keys are rejected from this instant on.
    pub expires_at: DateTime<Utc>,
    /// Owning location, if any.
    pub location_id: Option<Uuid>,
}

impl ApiKey {
    /// Whether the key may be used at `now`.
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.expires_at > now
    }
}
