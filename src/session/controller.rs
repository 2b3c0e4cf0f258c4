//! Record and unlock sessions.
//!
//! Recording runs exactly one capture attempt and persists it if it is long
//! enough. Unlocking loads the reference once, then captures and compares
//! attempts until one matches. A mismatch is reported to the surface and the
//! next attempt starts straight away, with no lockout, limit or backoff.

use super::stats::{AttemptLog, SessionStats};
use crate::capture::{Clock, RhythmCapture, SystemClock};
use crate::config::Config;
use crate::error::{Result, TaplockError};
use crate::rhythm::{
    store, MatchOutcome, ReferenceRhythm, RhythmMatcher, TapSequence, MIN_RECORD_TAPS,
};
use crate::surface::Surface;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Which session to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Capture a new rhythm and store it.
    Record,
    /// Keep the surface locked until the stored rhythm is reproduced.
    Unlock,
}

/// Result of one unlock attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Matched,
    Mismatch(MatchOutcome),
}

/// How a session ended successfully.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionOutcome {
    /// A rhythm of `taps` taps was written.
    Recorded { taps: usize },
    /// The stored rhythm was reproduced.
    Unlocked,
}

/// Summary of a finished session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    pub mode: Mode,
    pub outcome: SessionOutcome,
    pub stats: SessionStats,
}

/// Drives capture, matching and persistence for one session.
pub struct SessionController<C: Clock = SystemClock> {
    capture: RhythmCapture<C>,
    matcher: RhythmMatcher,
    log: AttemptLog,
}

impl SessionController<SystemClock> {
    /// Build a controller from configuration, using the system clock.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            RhythmCapture::new(config.silence_timeout),
            RhythmMatcher::new(config.tolerance),
        )
    }
}

impl<C: Clock> SessionController<C> {
    pub fn new(capture: RhythmCapture<C>, matcher: RhythmMatcher) -> Self {
        Self {
            capture,
            matcher,
            log: AttemptLog::new(),
        }
    }

    /// Statistics gathered so far.
    pub fn stats(&self) -> SessionStats {
        self.log.stats()
    }

    /// Run a session of the given mode against the rhythm file at `path`.
    pub fn run<S: Surface + ?Sized>(
        &mut self,
        mode: Mode,
        surface: &mut S,
        path: &Path,
    ) -> Result<SessionReport> {
        let outcome = match mode {
            Mode::Record => self.record(surface, path)?,
            Mode::Unlock => self.unlock(surface, path)?,
        };
        Ok(SessionReport {
            mode,
            outcome,
            stats: self.log.stats(),
        })
    }

    /// Capture one rhythm and write it to `path`.
    ///
    /// Fails with [`TaplockError::TooShort`] and writes nothing when fewer than
    /// [`MIN_RECORD_TAPS`] taps were captured.
    pub fn record<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        path: &Path,
    ) -> Result<SessionOutcome> {
        let taps = self.capture_attempt(surface)?;

        if taps.len() < MIN_RECORD_TAPS {
            warn!(taps = taps.len(), "Recorded rhythm too short, not saving");
            return Err(TaplockError::TooShort {
                taps: taps.len(),
                required: MIN_RECORD_TAPS,
            });
        }

        store::save(path, &taps)?;
        Ok(SessionOutcome::Recorded { taps: taps.len() })
    }

    /// Load the reference at `path`, then loop on attempts until one matches.
    pub fn unlock<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        path: &Path,
    ) -> Result<SessionOutcome> {
        let reference = store::load(path)?;
        info!(
            delays = reference.delay_count(),
            "Reference rhythm loaded, waiting for taps"
        );

        loop {
            match self.attempt(surface, &reference)? {
                AttemptOutcome::Matched => {
                    info!(attempts = self.log.stats().attempts, "Rhythm matched");
                    return Ok(SessionOutcome::Unlocked);
                }
                AttemptOutcome::Mismatch(reason) => {
                    info!(?reason, "Bad rhythm");
                    self.log.record_bad_rhythm();
                    surface.bad_rhythm();
                }
            }
        }
    }

    /// Capture one attempt and compare it against `reference`.
    pub fn attempt<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        reference: &ReferenceRhythm,
    ) -> Result<AttemptOutcome> {
        let taps = self.capture_attempt(surface)?;
        Ok(match self.matcher.evaluate(&taps, reference) {
            MatchOutcome::Match => AttemptOutcome::Matched,
            other => AttemptOutcome::Mismatch(other),
        })
    }

    fn capture_attempt<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Result<TapSequence> {
        let taps = self.capture.run_until_finalized(surface)?;
        self.log.record_attempt(taps.len());
        Ok(taps)
    }
}
