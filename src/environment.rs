//! Injected dependencies for the engine.
//!
//! External concerns (time, for now) are abstracted behind traits so
//! reducible operations stay deterministic and testable.

use chrono::{DateTime, Utc};

/// Clock trait - abstracts time operations for testability.
///
/// Production code injects [`SystemClock`]; tests inject [`FixedClock`] so
/// reservation and draw timestamps are reproducible.
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Fixed clock for deterministic tests.
///
/// Always returns the same time.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock {
    time: DateTime<Utc>,
}

impl FixedClock {
    /// Creates a clock pinned to the given time
    #[must_use]
    pub const fn new(time: DateTime<Utc>) -> Self {
        Self { time }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_is_stable() {
        let time = Utc::now();
        let clock = FixedClock::new(time);
        assert_eq!(clock.now(), time);
        assert_eq!(clock.now(), clock.now());
    }
}
