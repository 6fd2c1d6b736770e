//! Wall-clock abstraction used for every timestamp comparison.

use chrono::{DateTime, Utc};

/// Source of the current time.
///
/// Token issuance, expiry checks and revocation timestamps all read the time
/// through this trait so tests can pin or advance it.
pub trait Clock: Send + Sync + 'static {
    /// Returns the current UTC time.
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_monotonic_enough() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
