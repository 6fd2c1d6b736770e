//! Password hashing, verification and strength rules.

pub mod hasher;
pub mod policy;
pub mod scheme;

pub use hasher::PasswordHasher;
pub use policy::PasswordPolicy;
pub use scheme::{DECOY_DIGEST, PasswordScheme};
