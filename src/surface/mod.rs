//! Display surface and event source abstraction.
//!
//! The capture engine only needs a source of discrete notifications that it
//! can drain without blocking and then wait on with a timeout. Rendering,
//! window management and input grabbing stay behind this trait.

pub mod channel;
pub mod scripted;
pub mod terminal;

use serde::{Deserialize, Serialize};
use std::io;
use std::time::Duration;

pub use channel::ChannelSurface;
pub use scripted::{ScriptStep, ScriptedSurface};
pub use terminal::TerminalSurface;

/// A notification delivered by the display surface.
///
/// Taps carry no identity (no key code, no button, no position): only the
/// moment they are observed matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceEvent {
    /// One beat of the rhythm.
    Tap,
    /// The surface needs to be drawn again.
    Redraw,
}

/// A blockable event source plus the few display hooks the session uses.
pub trait Surface {
    /// Take the next queued notification without blocking.
    ///
    /// Returns `Ok(None)` once nothing is pending.
    fn poll_pending(&mut self) -> io::Result<Option<SurfaceEvent>>;

    /// Block until a notification is pending (`true`) or `timeout` elapses (`false`).
    fn wait(&mut self, timeout: Duration) -> io::Result<bool>;

    /// Draw the surface again after a [`SurfaceEvent::Redraw`].
    fn redraw(&mut self) {}

    /// Tell the user the last attempt did not match.
    fn bad_rhythm(&mut self) {}
}
