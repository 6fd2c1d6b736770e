//! Refresh token persistence.
//!
//! Two backends share one contract:
//! - PostgreSQL, with each unit of work running in one transaction
//! - In-memory, committing each unit under a single mutex acquisition

pub mod memory;
pub mod postgres;
pub mod store;

pub use memory::MemoryRefreshTokenStore;
pub use postgres::PgRefreshTokenStore;
pub use store::{RefreshTokenStore, RefreshTokenUnit};
