//! Deterministic synthetic surface driven by a [`ManualClock`].
//!
//! Notifications are scheduled at offsets from the moment the surface is
//! created. Waiting either jumps the clock to the next scheduled step or, when
//! nothing is due before the timeout, advances it by the full timeout. No real
//! time passes, so capture timing can be exercised exactly.

use super::{Surface, SurfaceEvent};
use crate::capture::clock::ManualClock;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::io;
use std::time::Duration;

/// One scheduled action of a scripted surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptStep {
    Tap,
    Redraw,
    /// The wait that reaches this step fails.
    WaitFailure,
}

/// A surface that replays a fixed script against a virtual clock.
#[derive(Debug)]
pub struct ScriptedSurface {
    clock: ManualClock,
    start: DateTime<Utc>,
    script: VecDeque<(DateTime<Utc>, ScriptStep)>,
    pending: VecDeque<SurfaceEvent>,
    redraws: u64,
    bad_rhythms: u64,
}

impl ScriptedSurface {
    /// Schedule `steps` at their offsets from the clock's current time.
    pub fn new(clock: ManualClock, steps: impl IntoIterator<Item = (Duration, ScriptStep)>) -> Self {
        let start = clock.datetime();
        let mut script: Vec<(DateTime<Utc>, ScriptStep)> = steps
            .into_iter()
            .map(|(offset, step)| (start + to_chrono(offset), step))
            .collect();
        script.sort_by_key(|(at, _)| *at);

        Self {
            clock,
            start,
            script: script.into(),
            pending: VecDeque::new(),
            redraws: 0,
            bad_rhythms: 0,
        }
    }

    /// Schedule taps at the given millisecond offsets.
    pub fn taps_at_ms(clock: ManualClock, offsets_ms: &[u64]) -> Self {
        Self::new(
            clock,
            offsets_ms
                .iter()
                .map(|ms| (Duration::from_millis(*ms), ScriptStep::Tap)),
        )
    }

    /// Virtual time elapsed since the surface was created.
    pub fn elapsed(&self) -> Duration {
        (self.clock.datetime() - self.start)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    /// Whether every scheduled step has been delivered.
    pub fn is_exhausted(&self) -> bool {
        self.script.is_empty() && self.pending.is_empty()
    }

    pub fn redraw_count(&self) -> u64 {
        self.redraws
    }

    pub fn bad_rhythm_count(&self) -> u64 {
        self.bad_rhythms
    }
}

fn to_chrono(d: Duration) -> chrono::Duration {
    chrono::Duration::from_std(d).unwrap_or(chrono::Duration::zero())
}

impl Surface for ScriptedSurface {
    fn poll_pending(&mut self) -> io::Result<Option<SurfaceEvent>> {
        Ok(self.pending.pop_front())
    }

    fn wait(&mut self, timeout: Duration) -> io::Result<bool> {
        if !self.pending.is_empty() {
            return Ok(true);
        }

        let deadline = self.clock.datetime() + to_chrono(timeout);
        match self.script.front() {
            Some((at, _)) if *at <= deadline => {
                self.clock.advance_to(*at);
                let now = self.clock.datetime();
                while let Some((_, step)) = self.script.front().filter(|(at, _)| *at <= now) {
                    let step = *step;
                    self.script.pop_front();
                    match step {
                        ScriptStep::Tap => self.pending.push_back(SurfaceEvent::Tap),
                        ScriptStep::Redraw => self.pending.push_back(SurfaceEvent::Redraw),
                        ScriptStep::WaitFailure => {
                            return Err(io::Error::new(
                                io::ErrorKind::Interrupted,
                                "scripted wait failure",
                            ))
                        }
                    }
                }
                Ok(true)
            }
            _ => {
                self.clock.advance(timeout);
                Ok(false)
            }
        }
    }

    fn redraw(&mut self) {
        self.redraws += 1;
    }

    fn bad_rhythm(&mut self) {
        self.bad_rhythms += 1;
    }
}
