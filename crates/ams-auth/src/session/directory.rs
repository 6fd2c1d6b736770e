//! User lookup and password storage seam used by the session manager.

use async_trait::async_trait;
use uuid::Uuid;

use ams_core::result::AppResult;
use ams_database::repositories::UserRepository;
use ams_entity::user::UserAccount;

/// Active users, their role names, and their password digests.
#[async_trait]
pub trait UserDirectory: Send + Sync + 'static {
    /// Active user by email, case-insensitive.
    async fn find_active_by_email(&self, email: &str) -> AppResult<Option<UserAccount>>;

    /// Active user by ID.
    async fn find_active_by_id(&self, user_id: Uuid) -> AppResult<Option<UserAccount>>;

    /// Stores a new digest; `false` when the user is missing or inactive.
    async fn update_password_hash(&self, user_id: Uuid, digest: &str) -> AppResult<bool>;
}

#[async_trait]
impl UserDirectory for UserRepository {
    async fn find_active_by_email(&self, email: &str) -> AppResult<Option<UserAccount>> {
        UserRepository::find_active_by_email(self, email).await
    }

    async fn find_active_by_id(&self, user_id: Uuid) -> AppResult<Option<UserAccount>> {
        UserRepository::find_active_by_id(self, user_id).await
    }

    async fn update_password_hash(&self, user_id: Uuid, digest: &str) -> AppResult<bool> {
        UserRepository::update_password(self, user_id, digest).await
    }
}
