//! Time sources for stamping taps.

use crate::rhythm::Timestamp;
use chrono::{DateTime, Utc};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

/// Something that can tell the current time.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A virtual clock that only moves when told to.
///
/// Clones share the same time, so a synthetic event source can advance the
/// clock a capture is reading from.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Some(next) = chrono::Duration::from_std(by)
            .ok()
            .and_then(|by| self.now.get().checked_add_signed(by))
        {
            self.now.set(next);
        }
    }

    /// Move to `at`. Time never runs backwards, so earlier instants are ignored.
    pub fn advance_to(&self, at: DateTime<Utc>) {
        if at > self.now.get() {
            self.now.set(at);
        }
    }

    pub fn datetime(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(DateTime::UNIX_EPOCH)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from(self.now.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::default();
        let other = clock.clone();

        other.advance(Duration::from_millis(1_500));

        assert_eq!(
            crate::rhythm::delta(Timestamp::from(DateTime::UNIX_EPOCH), clock.now()),
            1_500_000
        );
    }

    #[test]
    fn test_manual_clock_never_runs_backwards() {
        let clock = ManualClock::default();
        clock.advance(Duration::from_secs(2));
        clock.advance_to(DateTime::UNIX_EPOCH);

        assert_eq!(clock.now().as_micros(), 2_000_000);
    }
}
