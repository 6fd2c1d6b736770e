//! Access token minting, verification, and refresh secret generation.

pub mod claims;
pub mod codec;
pub mod secret;

pub use claims::Claims;
pub use codec::{MintedToken, TokenCodec};
pub use secret::generate_refresh_secret;
