//! Wall-clock source for session timestamps.

use chrono::{DateTime, Utc};

/// Where `started_at`/`completed_at` come from. Quiz timers never read this; they
/// run on tokio time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
    #[default]
    System,
    Frozen(DateTime<Utc>),
}

impl Clock {
    #[must_use]
    pub fn system() -> Self {
        Self::System
    }

    /// A clock that always reports `at`.
    #[must_use]
    pub fn frozen(at: DateTime<Utc>) -> Self {
        Self::Frozen(at)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Frozen(at) => *at,
        }
    }
}

/// Seconds since the epoch used by `test_now` (2024-05-17T12:00:00Z).
pub const TEST_TIMESTAMP: i64 = 1_715_947_200;

/// Deterministic timestamp for tests.
#[must_use]
pub fn test_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(TEST_TIMESTAMP, 0).unwrap_or_default()
}

#[must_use]
pub fn test_clock() -> Clock {
    Clock::frozen(test_now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frozen_clock_never_moves() {
        let clock = test_clock();
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.now().to_rfc3339(), "2024-05-17T12:00:00+00:00");
    }

    #[test]
    fn system_clock_is_the_default() {
        assert_eq!(Clock::default(), Clock::system());
        assert!(Clock::system().now() > test_now());
    }
}
