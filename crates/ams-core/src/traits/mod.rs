//! Core traits defined in `ams-core` and implemented by other crates.

pub mod clock;

pub use clock::{Clock, SystemClock};
