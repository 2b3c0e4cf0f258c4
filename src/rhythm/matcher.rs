//! Tolerance-based comparison of a tapped attempt against a reference rhythm.
//!
//! Every interval is checked on its own against the matching reference delay.
//! There is no aggregate distance and no tempo normalisation: one badly timed
//! tap fails the whole attempt, and a rhythm tapped uniformly faster or slower
//! than recorded fails as soon as one interval drifts past the tolerance.

use super::types::{ReferenceRhythm, TapSequence};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default per-interval tolerance (200ms).
pub const DEFAULT_TOLERANCE_MICROS: u64 = 200_000;

/// Why an attempt was accepted or rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOutcome {
    /// Every interval is within tolerance.
    Match,
    /// The attempt has a different number of taps than the reference expects.
    TapCountMismatch { expected: usize, actual: usize },
    /// The attempt holds no taps at all.
    Empty,
    /// The interval at `index` is `distance_micros` away from the reference.
    OutOfTolerance { index: usize, distance_micros: u64 },
}

impl MatchOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, MatchOutcome::Match)
    }
}

/// Compares tap sequences against a reference rhythm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RhythmMatcher {
    tolerance_micros: u64,
}

impl Default for RhythmMatcher {
    fn default() -> Self {
        Self {
            tolerance_micros: DEFAULT_TOLERANCE_MICROS,
        }
    }
}

impl RhythmMatcher {
    /// Create a matcher with the given per-interval tolerance.
    pub fn new(tolerance: Duration) -> Self {
        Self {
            tolerance_micros: u64::try_from(tolerance.as_micros()).unwrap_or(u64::MAX),
        }
    }

    pub fn tolerance_micros(&self) -> u64 {
        self.tolerance_micros
    }

    /// Whether `candidate` reproduces `reference` within tolerance.
    pub fn matches(&self, candidate: &TapSequence, reference: &ReferenceRhythm) -> bool {
        self.evaluate(candidate, reference).is_match()
    }

    /// Compare `candidate` against `reference`, reporting the first failure.
    ///
    /// A distance exactly equal to the tolerance still matches.
    pub fn evaluate(&self, candidate: &TapSequence, reference: &ReferenceRhythm) -> MatchOutcome {
        if candidate.len() != reference.tap_count() {
            return MatchOutcome::TapCountMismatch {
                expected: reference.tap_count(),
                actual: candidate.len(),
            };
        }

        if candidate.is_empty() {
            return MatchOutcome::Empty;
        }

        for (index, (delay, expected)) in candidate
            .intervals()
            .zip(reference.delays().iter())
            .enumerate()
        {
            let distance_micros = delay.abs_diff(*expected);
            debug!(index, delay, expected, distance_micros, "Interval compared");
            if distance_micros > self.tolerance_micros {
                return MatchOutcome::OutOfTolerance {
                    index,
                    distance_micros,
                };
            }
        }

        MatchOutcome::Match
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rhythm::timing::Timestamp;
    use crate::rhythm::types::DelaySequence;
    use chrono::{DateTime, Duration as ChronoDuration};

    fn taps_from_delays(delays_us: &[i64]) -> TapSequence {
        let base = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let mut at = base;
        let mut taps = vec![Timestamp::from(at)];
        for d in delays_us {
            at += ChronoDuration::microseconds(*d);
            taps.push(Timestamp::from(at));
        }
        TapSequence::from_timestamps(taps)
    }

    fn reference(delays_us: &[i64]) -> ReferenceRhythm {
        ReferenceRhythm::new(DelaySequence::new(delays_us.to_vec()))
    }

    #[test]
    fn test_identical_rhythm_matches() {
        let delays = [300_000, 400_000, 150_000, 900_000];
        let matcher = RhythmMatcher::default();

        assert!(matcher.matches(&taps_from_delays(&delays), &reference(&delays)));
    }

    #[test]
    fn test_tolerance_boundary_is_inclusive() {
        let reference = reference(&[300_000, 400_000, 500_000]);
        let matcher = RhythmMatcher::default();

        for i in 0..3 {
            let mut slower = [300_000, 400_000, 500_000];
            slower[i] += 200_000;
            assert!(matcher.matches(&taps_from_delays(&slower), &reference));

            let mut faster = [300_000, 400_000, 500_000];
            faster[i] -= 200_000;
            assert!(matcher.matches(&taps_from_delays(&faster), &reference));
        }
    }

    #[test]
    fn test_just_past_tolerance_rejects() {
        let reference = reference(&[300_000, 400_000, 500_000]);
        let matcher = RhythmMatcher::default();

        for i in 0..3 {
            let mut delays = [300_000, 400_000, 500_000];
            delays[i] += 200_001;
            assert_eq!(
                matcher.evaluate(&taps_from_delays(&delays), &reference),
                MatchOutcome::OutOfTolerance {
                    index: i,
                    distance_micros: 200_001
                }
            );
        }
    }

    #[test]
    fn test_tap_count_mismatch_rejects() {
        let reference = reference(&[300_000, 400_000]);
        let matcher = RhythmMatcher::default();

        let extra = taps_from_delays(&[300_000, 400_000, 0]);
        assert_eq!(
            matcher.evaluate(&extra, &reference),
            MatchOutcome::TapCountMismatch {
                expected: 3,
                actual: 4
            }
        );

        let missing = taps_from_delays(&[300_000]);
        assert!(!matcher.matches(&missing, &reference));
    }

    #[test]
    fn test_empty_attempt_never_matches() {
        let matcher = RhythmMatcher::default();
        assert!(!matcher.matches(&TapSequence::new(), &reference(&[100_000])));
    }

    #[test]
    fn test_uniform_tempo_change_is_not_normalised() {
        let recorded = [400_000, 400_000, 400_000];
        let doubled = [800_000, 800_000, 800_000];
        let matcher = RhythmMatcher::default();

        assert!(!matcher.matches(&taps_from_delays(&doubled), &reference(&recorded)));
    }

    #[test]
    fn test_custom_tolerance() {
        let matcher = RhythmMatcher::new(Duration::from_millis(50));
        assert_eq!(matcher.tolerance_micros(), 50_000);

        let reference = reference(&[300_000]);
        assert!(matcher.matches(&taps_from_delays(&[350_000]), &reference));
        assert!(!matcher.matches(&taps_from_delays(&[350_001]), &reference));
    }

    #[test]
    fn test_extreme_stored_delay_does_not_overflow() {
        let matcher = RhythmMatcher::default();
        let reference = reference(&[i64::MIN]);
        assert!(!matcher.matches(&taps_from_delays(&[1_000]), &reference));
    }
}
