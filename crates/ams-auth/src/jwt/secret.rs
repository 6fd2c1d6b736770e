//! Opaque refresh token secrets.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::RngCore;
use rand::rngs::OsRng;

/// Number of random bytes behind each refresh secret.
pub const REFRESH_SECRET_BYTES: usize = 64;

/// Generates a refresh secret: 64 bytes from the OS CSPRNG, standard base64.
pub fn generate_refresh_secret() -> String {
    let mut bytes = [0u8; REFRESH_SECRET_BYTES];
    OsRng.fill_bytes(&mut bytes);
    STANDARD.encode(bytes)
}
