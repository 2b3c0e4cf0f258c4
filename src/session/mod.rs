//! Session orchestration for taplock.
//!
//! This module provides the record and unlock flows and the counters that
//! describe a finished session.

pub mod controller;
pub mod stats;

// Re-export commonly used types
pub use controller::{AttemptOutcome, Mode, SessionController, SessionOutcome, SessionReport};
pub use stats::{AttemptLog, SessionStats};
