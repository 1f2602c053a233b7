//! Time source for expiry enforcement.
//!
//! Verification itself never looks at the clock; only [`crate::policy::expiry`]
//! does, and it takes the clock as a parameter.

use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Source of "now" for expiry decisions.
pub trait Clock: Send + Sync {
    /// Current instant in UTC.
    fn now_utc(&self) -> DateTime<Utc>;
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now_utc(&self) -> DateTime<Utc> {
        (**self).now_utc()
    }
}

/// Operating system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Hand-driven clock for expiry tests.
#[cfg(any(test, feature = "test-seams"))]
#[derive(Debug, Clone)]
pub struct MockClock {
    now: DateTime<Utc>,
}

#[cfg(any(test, feature = "test-seams"))]
impl MockClock {
    /// Clock standing at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    /// Clock standing at an RFC 3339 timestamp.
    ///
    /// # Panics
    /// If `timestamp` is not RFC 3339.
    pub fn from_rfc3339(timestamp: &str) -> Self {
        match DateTime::parse_from_rfc3339(timestamp) {
            Ok(at) => Self::new(at.with_timezone(&Utc)),
            Err(e) => panic!("bad mock clock timestamp '{}': {}", timestamp, e),
        }
    }

    /// Jump to `now`, forwards or backwards.
    pub fn set(&mut self, now: DateTime<Utc>) {
        self.now = now;
    }

    /// Move forward by `step`.
    pub fn advance(&mut self, step: chrono::Duration) {
        self.now += step;
    }
}

#[cfg(any(test, feature = "test-seams"))]
impl Clock for MockClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn system_clock_tracks_wall_time() {
        let before = Utc::now();
        let now = SystemClock.now_utc();
        assert!(now >= before);
        assert!(now <= Utc::now());
    }

    #[test]
    fn mock_clock_stands_still_until_moved() {
        let mut clock = MockClock::from_rfc3339("2030-01-01T23:30:00+02:00");
        let start = Utc.with_ymd_and_hms(2030, 1, 1, 21, 30, 0).unwrap();
        assert_eq!(clock.now_utc(), start);
        assert_eq!(clock.now_utc(), start);

        clock.advance(chrono::Duration::minutes(45));
        assert_eq!(clock.now_utc(), Utc.with_ymd_and_hms(2030, 1, 1, 22, 15, 0).unwrap());

        clock.set(start);
        assert_eq!(clock.now_utc(), start);
    }

    #[test]
    fn shared_clock_reads_through_arc() {
        let at = Utc.with_ymd_and_hms(2031, 7, 4, 0, 0, 0).unwrap();
        let shared: Arc<dyn Clock> = Arc::new(MockClock::new(at));
        assert_eq!(shared.now_utc(), at);
    }

    #[test]
    #[should_panic(expected = "bad mock clock timestamp")]
    fn mock_clock_rejects_bad_timestamp() {
        MockClock::from_rfc3339("tomorrow");
    }
}
