//! Rhythm data model: captured taps and the delays derived from them.
//!
//! Only relative gaps are ever stored or compared, so a rhythm does not
//! depend on the wall-clock time it was tapped at.

use super::timing::{delta, Timestamp};
use serde::{Deserialize, Serialize};

/// Maximum number of taps kept per capture attempt.
pub const MAX_TAPS: usize = 32;

/// Maximum number of delays a rhythm can hold.
pub const MAX_DELAYS: usize = MAX_TAPS - 1;

/// Fewest taps a rhythm must have to be recorded.
pub const MIN_RECORD_TAPS: usize = 3;

/// Ordered tap timestamps of one capture attempt.
///
/// Insertion order is temporal order. Taps past [`MAX_TAPS`] are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TapSequence {
    taps: Vec<Timestamp>,
}

impl TapSequence {
    pub fn new() -> Self {
        Self {
            taps: Vec::with_capacity(MAX_TAPS),
        }
    }

    /// Build a sequence from timestamps, keeping at most [`MAX_TAPS`].
    pub fn from_timestamps(taps: impl IntoIterator<Item = Timestamp>) -> Self {
        let mut seq = Self::new();
        for tap in taps {
            seq.push(tap);
        }
        seq
    }

    /// Append a tap. Returns `false` (and keeps the sequence unchanged) when full.
    pub fn push(&mut self, tap: Timestamp) -> bool {
        if self.is_full() {
            return false;
        }
        self.taps.push(tap);
        true
    }

    pub fn clear(&mut self) {
        self.taps.clear();
    }

    pub fn len(&self) -> usize {
        self.taps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.taps.len() >= MAX_TAPS
    }

    pub fn timestamps(&self) -> &[Timestamp] {
        &self.taps
    }

    /// Consecutive tap gaps in microseconds, in order.
    pub fn intervals(&self) -> impl Iterator<Item = i64> + '_ {
        self.taps.windows(2).map(|pair| delta(pair[0], pair[1]))
    }

    /// The delay sequence, or `None` with fewer than two taps.
    pub fn delays(&self) -> Option<DelaySequence> {
        if self.taps.len() < 2 {
            return None;
        }
        Some(DelaySequence(self.intervals().collect()))
    }
}

/// Signed microsecond gaps between consecutive taps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelaySequence(Vec<i64>);

impl DelaySequence {
    pub fn new(delays: Vec<i64>) -> Self {
        Self(delays)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }

    /// Total span of the rhythm in microseconds.
    pub fn total_micros(&self) -> i64 {
        self.0.iter().fold(0i64, |acc, d| acc.saturating_add(*d))
    }
}

/// A delay sequence loaded from storage, fixed for a whole unlock session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceRhythm {
    delays: DelaySequence,
}

impl ReferenceRhythm {
    pub fn new(delays: DelaySequence) -> Self {
        Self { delays }
    }

    pub fn delay_count(&self) -> usize {
        self.delays.len()
    }

    /// Number of taps a matching attempt must contain.
    pub fn tap_count(&self) -> usize {
        self.delays.len() + 1
    }

    pub fn delays(&self) -> &[i64] {
        self.delays.as_slice()
    }

    /// Time from the first tap to the last, in microseconds.
    pub fn total_micros(&self) -> i64 {
        self.delays.total_micros()
    }
}
