//! Tap capture for taplock.
//!
//! This module contains:
//! - Clocks used to stamp taps
//! - The idle/active/finalized capture state machine

pub mod clock;
pub mod machine;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use machine::{CaptureState, RhythmCapture, DEFAULT_SILENCE_TIMEOUT};
