//! User and role entities.

pub mod model;
pub mod role;

pub use model::{User, UserAccount};
pub use role::Role;
