//! Channel-fed surface for embedding taplock behind another display layer.
//!
//! The owning UI pushes [`SurfaceEvent`]s from any thread through the
//! [`Sender`] returned by [`ChannelSurface::new`]. The surface holds no sender
//! of its own: once every producer is gone, waiting fails.

use super::{Surface, SurfaceEvent};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::collections::VecDeque;
use std::io;
use std::time::Duration;

/// Capacity of the notification channel.
const CHANNEL_CAPACITY: usize = 1_024;

/// A surface whose notifications arrive over a crossbeam channel.
pub struct ChannelSurface {
    receiver: Receiver<SurfaceEvent>,
    /// Events already taken off the channel by `wait`.
    pending: VecDeque<SurfaceEvent>,
    redraws: u64,
    bad_rhythms: u64,
}

impl ChannelSurface {
    /// Create a surface and the sender that feeds it.
    pub fn new() -> (Self, Sender<SurfaceEvent>) {
        // Bounded so a runaway producer cannot grow memory without limit
        let (sender, receiver) = bounded(CHANNEL_CAPACITY);
        (Self::from_receiver(receiver), sender)
    }

    /// Wrap the receiving end of an existing channel.
    pub fn from_receiver(receiver: Receiver<SurfaceEvent>) -> Self {
        Self {
            receiver,
            pending: VecDeque::new(),
            redraws: 0,
            bad_rhythms: 0,
        }
    }

    pub fn redraw_count(&self) -> u64 {
        self.redraws
    }

    pub fn bad_rhythm_count(&self) -> u64 {
        self.bad_rhythms
    }
}

fn disconnected() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "event channel disconnected")
}

impl Surface for ChannelSurface {
    /// Queued events are still delivered after the producers are gone; the
    /// disconnect surfaces on the next `wait`.
    fn poll_pending(&mut self) -> io::Result<Option<SurfaceEvent>> {
        if let Some(event) = self.pending.pop_front() {
            return Ok(Some(event));
        }
        match self.receiver.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => Ok(None),
        }
    }

    fn wait(&mut self, timeout: Duration) -> io::Result<bool> {
        if !self.pending.is_empty() {
            return Ok(true);
        }
        match self.receiver.recv_timeout(timeout) {
            Ok(event) => {
                self.pending.push_back(event);
                Ok(true)
            }
            Err(RecvTimeoutError::Timeout) => Ok(false),
            Err(RecvTimeoutError::Disconnected) => Err(disconnected()),
        }
    }

    fn redraw(&mut self) {
        self.redraws += 1;
    }

    fn bad_rhythm(&mut self) {
        self.bad_rhythms += 1;
    }
}
