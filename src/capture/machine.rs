//! Rhythm capture state machine.
//!
//! A capture attempt moves through three states:
//!
//! ```text
//!   Idle ──tap──▶ Active ──silence──▶ Finalized
//!    ▲  │           │ ▲
//!    └──┘silence    └─┘tap
//! ```
//!
//! Silence is a wait on the surface that times out. While idle the wait is
//! simply re-armed, so there is no limit on how long the user may take to
//! start. Once a tap has been seen, the first full silence period ends the
//! attempt: there is no explicit "done" action.

use super::clock::{Clock, SystemClock};
use crate::error::{Result, TaplockError};
use crate::rhythm::{TapSequence, Timestamp};
use crate::surface::{Surface, SurfaceEvent};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, trace};

/// Default silence gap that ends an attempt.
pub const DEFAULT_SILENCE_TIMEOUT: Duration = Duration::from_secs(1);

/// State of a capture attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptureState {
    /// No tap yet.
    Idle,
    /// At least one tap, still listening.
    Active,
    /// A silence period followed the last tap; the attempt is over.
    Finalized,
}

/// Collects tap timestamps for one attempt at a time.
pub struct RhythmCapture<C: Clock = SystemClock> {
    clock: C,
    silence_timeout: Duration,
    taps: TapSequence,
    state: CaptureState,
    dropped: usize,
}

impl RhythmCapture<SystemClock> {
    /// Capture against the system clock.
    pub fn new(silence_timeout: Duration) -> Self {
        Self::with_clock(SystemClock, silence_timeout)
    }
}

impl Default for RhythmCapture<SystemClock> {
    fn default() -> Self {
        Self::new(DEFAULT_SILENCE_TIMEOUT)
    }
}

impl<C: Clock> RhythmCapture<C> {
    pub fn with_clock(clock: C, silence_timeout: Duration) -> Self {
        Self {
            clock,
            silence_timeout,
            taps: TapSequence::new(),
            state: CaptureState::Idle,
            dropped: 0,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn silence_timeout(&self) -> Duration {
        self.silence_timeout
    }

    /// Taps collected so far in the current attempt.
    pub fn taps(&self) -> &TapSequence {
        &self.taps
    }

    /// Taps ignored in the current attempt because the buffer was full.
    pub fn dropped_taps(&self) -> usize {
        self.dropped
    }

    /// Discard any in-progress attempt and return to idle.
    pub fn reset(&mut self) {
        self.taps.clear();
        self.dropped = 0;
        self.state = CaptureState::Idle;
    }

    /// Record a tap at the current time.
    ///
    /// Taps past the buffer capacity are ignored. Has no effect once the
    /// attempt is finalized.
    pub fn notify_tap(&mut self) {
        if self.state == CaptureState::Finalized {
            return;
        }

        let now: Timestamp = self.clock.now();
        if self.taps.push(now) {
            trace!(tap = self.taps.len(), "Tap recorded");
        } else {
            self.dropped += 1;
            debug!(dropped = self.dropped, "Tap buffer full, ignoring tap");
        }
        self.state = CaptureState::Active;
    }

    /// Apply one silence period (a wait that timed out).
    ///
    /// Idle stays idle and the wait is re-armed; Active becomes Finalized.
    pub fn on_silence(&mut self) -> CaptureState {
        if self.state == CaptureState::Active {
            self.state = CaptureState::Finalized;
        }
        self.state
    }

    /// Run one capture attempt against `surface` until it is finalized.
    ///
    /// Each round drains every pending notification, forwarding redraws to the
    /// surface and recording taps, then waits up to the silence timeout for
    /// more. A failing drain or wait aborts the attempt.
    pub fn run_until_finalized<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
    ) -> Result<TapSequence> {
        self.reset();

        loop {
            while let Some(event) = surface
                .poll_pending()
                .map_err(|e| TaplockError::io("Cannot read input events", e))?
            {
                match event {
                    SurfaceEvent::Redraw => surface.redraw(),
                    SurfaceEvent::Tap => self.notify_tap(),
                }
            }

            let pending = surface
                .wait(self.silence_timeout)
                .map_err(|e| TaplockError::io("Cannot wait for input events", e))?;

            if !pending && self.on_silence() == CaptureState::Finalized {
                break;
            }
        }

        info!(
            taps = self.taps.len(),
            dropped = self.dropped,
            "Capture finalized"
        );
        Ok(std::mem::take(&mut self.taps))
    }
}
