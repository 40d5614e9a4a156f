//! Wall-clock abstraction

use chrono::{DateTime, Utc};

/// Source of the current wall-clock time.
///
/// The engine computes all elapsed time from differences between `now()`
/// readings, so swapping this for a manual clock makes the time arithmetic
/// deterministic in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
