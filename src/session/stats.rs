//! Per-session attempt counters.
//!
//! Counts are kept in memory for the lifetime of one session and are never
//! written anywhere: no history of attempts survives the process.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Running counters for one record or unlock session.
#[derive(Debug)]
pub struct AttemptLog {
    /// Capture attempts finalized
    attempts: u64,
    /// Taps kept across all attempts
    taps_captured: u64,
    /// Attempts rejected by the matcher
    bad_rhythms: u64,
    /// Session start time
    session_start: DateTime<Utc>,
}

impl AttemptLog {
    pub fn new() -> Self {
        Self {
            attempts: 0,
            taps_captured: 0,
            bad_rhythms: 0,
            session_start: Utc::now(),
        }
    }

    /// Record a finalized capture attempt holding `taps` taps.
    pub fn record_attempt(&mut self, taps: usize) {
        self.attempts += 1;
        self.taps_captured += taps as u64;
    }

    /// Record an attempt the matcher rejected.
    pub fn record_bad_rhythm(&mut self) {
        self.bad_rhythms += 1;
    }

    /// Get the current statistics.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            attempts: self.attempts,
            taps_captured: self.taps_captured,
            bad_rhythms: self.bad_rhythms,
            session_start: self.session_start,
            session_duration_secs: (Utc::now() - self.session_start)
                .num_seconds()
                .max(0) as u64,
        }
    }
}

impl Default for AttemptLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of session statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub attempts: u64,
    pub taps_captured: u64,
    pub bad_rhythms: u64,
    pub session_start: DateTime<Utc>,
    pub session_duration_secs: u64,
}

impl SessionStats {
    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        format!(
            "Session Statistics:\n\
             - Attempts: {}\n\
             - Taps captured: {}\n\
             - Bad rhythms: {}\n\
             - Session duration: {} seconds",
            self.attempts, self.taps_captured, self.bad_rhythms, self.session_duration_secs
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attempt_counting() {
        let mut log = AttemptLog::new();

        log.record_attempt(3);
        log.record_bad_rhythm();
        log.record_attempt(4);

        let stats = log.stats();
        assert_eq!(stats.attempts, 2);
        assert_eq!(stats.taps_captured, 7);
        assert_eq!(stats.bad_rhythms, 1);
    }

    #[test]
    fn test_summary_format() {
        let summary = AttemptLog::new().stats().summary();

        assert!(summary.contains("Attempts: 0"));
        assert!(summary.contains("Bad rhythms: 0"));
        assert!(summary.contains("Session duration"));
    }
}
