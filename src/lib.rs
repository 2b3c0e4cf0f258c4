//! taplock - lock a screen until a tapped rhythm is reproduced.
//!
//! The user records a rhythm once by tapping it. Afterwards the surface stays
//! locked until the same rhythm is tapped again within tolerance. Only the
//! timing between taps matters, never which key or button was used.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                           taplock                            │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐         │
//! │  │   Surface   │──▶│   Capture   │──▶│   Matcher   │ unlock  │
//! │  │ (terminal)  │   │ (1s silence)│   │ (±200ms)    │         │
//! │  └─────────────┘   └─────────────┘   └─────────────┘         │
//! │                           │                 ▲                │
//! │                           ▼ record          │ load           │
//! │                    ┌─────────────────────────────┐           │
//! │                    │     Rhythm file (delays)    │           │
//! │                    └─────────────────────────────┘           │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use taplock::{Config, Mode, SessionController, TerminalSurface};
//!
//! let config = Config::default();
//! let mut surface = TerminalSurface::open("TapLock").expect("terminal");
//! let mut session = SessionController::from_config(&config);
//!
//! let report = session
//!     .run(Mode::Unlock, &mut surface, Path::new("rhythm.bin"))
//!     .expect("session");
//! println!("{}", report.stats.summary());
//! ```

pub mod capture;
pub mod config;
pub mod error;
pub mod rhythm;
pub mod session;
pub mod surface;

// Re-export key types at crate root for convenience
pub use capture::{CaptureState, Clock, ManualClock, RhythmCapture, SystemClock};
pub use config::{Config, ConfigError};
pub use error::{Result, TaplockError};
pub use rhythm::{
    DelaySequence, MatchOutcome, ReferenceRhythm, RhythmMatcher, TapSequence, Timestamp,
};
pub use session::{Mode, SessionController, SessionOutcome, SessionReport, SessionStats};
pub use surface::{ChannelSurface, ScriptedSurface, Surface, SurfaceEvent, TerminalSurface};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Shown after a rhythm has been recorded.
pub const STORAGE_NOTICE: &str = "\
The rhythm file holds the raw delays between your taps, unencrypted.
Anyone who can read it can learn the rhythm. Keep it readable only by you.";
