//! Rhythm model, persistence and matching.
//!
//! This module contains:
//! - Timestamps and microsecond deltas
//! - Tap, delay and reference sequences
//! - The flat-file rhythm store
//! - The per-interval tolerance matcher

pub mod matcher;
pub mod store;
pub mod timing;
pub mod types;

// Re-export commonly used types
pub use matcher::{MatchOutcome, RhythmMatcher, DEFAULT_TOLERANCE_MICROS};
pub use store::{load, save, RECORD_WIDTH};
pub use timing::{delta, Timestamp};
pub use types::{
    DelaySequence, ReferenceRhythm, TapSequence, MAX_DELAYS, MAX_TAPS, MIN_RECORD_TAPS,
};
