//! Time source and record id generation.
//!
//! Expiry deadlines and timestamp ids are all epoch milliseconds. Everything
//! reads time through [`Clock`] so tests can move it forward.

use chrono::{DateTime, Duration, Utc};
use std::fmt::Debug;
use std::sync::atomic::{AtomicI64, Ordering};

/// Milliseconds in one day (expiry arithmetic).
pub const DAY_MS: i64 = 86_400_000;

pub trait Clock: Send + Sync + Debug {
    fn now_millis(&self) -> i64;

    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.now_millis()).unwrap_or_else(Utc::now)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    pub fn new(start_millis: i64) -> Self {
        Self {
            millis: AtomicI64::new(start_millis),
        }
    }

    pub fn at(instant: DateTime<Utc>) -> Self {
        Self::new(instant.timestamp_millis())
    }

    pub fn advance(&self, by: Duration) {
        self.millis.fetch_add(by.num_milliseconds(), Ordering::SeqCst);
    }

    pub fn set(&self, millis: i64) {
        self.millis.store(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.millis.load(Ordering::SeqCst)
    }
}

/// Timestamp-derived ids that never repeat within a process.
///
/// Returns `max(now, last + 1)`, so two records created in the same
/// millisecond still get distinct, strictly increasing ids.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicI64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self, clock: &dyn Clock) -> i64 {
        let now = clock.now_millis();
        let prev = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or(now);
        now.max(prev + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualClock::new(1_000);
        clock.advance(Duration::days(1));
        assert_eq!(clock.now_millis(), 1_000 + DAY_MS);
    }

    #[test]
    fn test_ids_strictly_increase_on_frozen_clock() {
        let clock = ManualClock::new(1_700_000_000_000);
        let ids = IdGenerator::new();

        let first = ids.next(&clock);
        let second = ids.next(&clock);
        let third = ids.next(&clock);

        assert_eq!(first, 1_700_000_000_000);
        assert!(second > first);
        assert!(third > second);
    }

    #[test]
    fn test_ids_follow_clock_when_it_moves_ahead() {
        let clock = ManualClock::new(10);
        let ids = IdGenerator::new();
        ids.next(&clock);
        clock.set(500);
        assert_eq!(ids.next(&clock), 500);
    }
}
