//! Password digest seam used by the login and password-change flows.

use async_trait::async_trait;

use ams_core::result::AppResult;

/// Argon2id digest at the default cost over a fixed salt and tag.
///
/// Verified against when no user matches a login email so the miss costs
/// the same as a wrong password. No plaintext produces it.
pub const DECOY_DIGEST: &str = "$argon2id$v=19$m=19456,t=2,p=1$jvf3/IpkwI7F5nnCuAjNBQ$xHxd65657kLjTOX2BXzUpySD8UjNqd56RRCiUwz7RZ0";

/// Produces and checks password digests.
#[async_trait]
pub trait PasswordScheme: Send + Sync + 'static {
    /// Returns `Ok(false)` on mismatch; errors only on malformed digests
    /// or internal failures.
    async fn verify(&self, password: &str, digest: &str) -> AppResult<bool>;

    /// Digests a new password with a fresh salt.
    async fn digest(&self, password: &str) -> AppResult<String>;
}
