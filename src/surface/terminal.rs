//! Full-screen terminal surface built on crossterm.
//!
//! The surface takes over the terminal: alternate screen, raw mode, mouse
//! capture and a hidden cursor. Any key press or mouse button press counts as
//! a tap; resizes and regaining focus ask for a redraw. Mouse motion and other
//! events are dropped without ending a wait. The terminal is restored
//! when the surface is dropped.

use super::{Surface, SurfaceEvent};
use crate::error::{Result, TaplockError};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
        Event, KeyEventKind, MouseEventKind,
    },
    execute, queue,
    style::Print,
    terminal::{
        self, disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use std::collections::VecDeque;
use std::io::{self, IsTerminal, Stdout, Write};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Message shown after a rejected attempt.
const BAD_RHYTHM_TEXT: &str = "Bad rhythm.";

/// A crossterm-backed full-screen surface.
///
/// Without keyboard enhancement flags the terminal reports held-key
/// auto-repeat as ordinary presses, so holding a key down produces a stream of
/// taps. Tap with short presses, or with mouse clicks, which do not repeat.
pub struct TerminalSurface {
    stdout: Stdout,
    /// Notifications already read off the terminal by `wait`.
    pending: VecDeque<SurfaceEvent>,
    title: String,
    status: Option<&'static str>,
    open: bool,
}

impl TerminalSurface {
    /// Take over the terminal and draw `title` in the middle of the screen.
    pub fn open(title: impl Into<String>) -> Result<Self> {
        let stdout = io::stdout();
        if !stdout.is_terminal() {
            return Err(TaplockError::DisplayInit(io::Error::new(
                io::ErrorKind::Unsupported,
                "stdout is not a terminal",
            )));
        }

        enable_raw_mode().map_err(TaplockError::DisplayInit)?;

        let mut surface = Self {
            stdout,
            pending: VecDeque::new(),
            title: title.into(),
            status: None,
            open: true,
        };

        // From here on, Drop undoes whatever part of the setup succeeded.
        execute!(
            surface.stdout,
            EnterAlternateScreen,
            EnableMouseCapture,
            EnableFocusChange,
            Hide
        )
        .map_err(TaplockError::DisplayInit)?;

        surface.draw().map_err(TaplockError::DisplayInit)?;
        debug!("Terminal surface opened");
        Ok(surface)
    }

    /// Restore the terminal. Safe to call more than once.
    pub fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        restore_terminal();
        debug!("Terminal surface closed");
    }

    fn draw(&mut self) -> io::Result<()> {
        let (cols, rows) = terminal::size()?;
        let mid = rows / 2;

        queue!(self.stdout, Clear(ClearType::All))?;
        queue!(
            self.stdout,
            MoveTo(centered(cols, &self.title), mid.saturating_sub(1)),
            Print(&self.title)
        )?;
        if let Some(status) = self.status {
            queue!(
                self.stdout,
                MoveTo(centered(cols, status), mid.saturating_add(1)),
                Print(status)
            )?;
        }
        self.stdout.flush()
    }
}

impl Drop for TerminalSurface {
    fn drop(&mut self) {
        self.close();
    }
}

/// Put the terminal back into its normal state.
///
/// Errors are ignored: this also runs from panic and signal handlers, where
/// nothing better can be done.
pub fn restore_terminal() {
    let _ = execute!(
        io::stdout(),
        Show,
        DisableFocusChange,
        DisableMouseCapture,
        LeaveAlternateScreen
    );
    let _ = disable_raw_mode();
}

fn centered(cols: u16, text: &str) -> u16 {
    let width = u16::try_from(text.chars().count()).unwrap_or(cols);
    cols.saturating_sub(width) / 2
}

/// Map a terminal event to a surface notification, if it is one.
fn classify(event: &Event) -> Option<SurfaceEvent> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => Some(SurfaceEvent::Tap),
        Event::Mouse(mouse) if matches!(mouse.kind, MouseEventKind::Down(_)) => {
            Some(SurfaceEvent::Tap)
        }
        Event::Resize(_, _) | Event::FocusGained => Some(SurfaceEvent::Redraw),
        _ => None,
    }
}

/// Take the next tap or redraw off the terminal without blocking.
///
/// Events that are neither (mouse motion, releases, focus loss) are consumed
/// and dropped.
fn next_notification(
    mut poll: impl FnMut(Duration) -> io::Result<bool>,
    mut read: impl FnMut() -> io::Result<Event>,
) -> io::Result<Option<SurfaceEvent>> {
    while poll(Duration::ZERO)? {
        if let Some(notification) = classify(&read()?) {
            return Ok(Some(notification));
        }
    }
    Ok(None)
}

/// Block until a tap or redraw arrives (`true`) or `timeout` elapses (`false`).
///
/// Only notifications end the wait early: any other terminal event is dropped
/// and the wait resumes for whatever time is left. The notification that ends
/// the wait is queued on `pending`.
fn wait_for_notification(
    pending: &mut VecDeque<SurfaceEvent>,
    timeout: Duration,
    mut poll: impl FnMut(Duration) -> io::Result<bool>,
    mut read: impl FnMut() -> io::Result<Event>,
) -> io::Result<bool> {
    if !pending.is_empty() {
        return Ok(true);
    }

    let deadline = Instant::now() + timeout;
    let mut remaining = timeout;
    loop {
        if !poll(remaining)? {
            return Ok(false);
        }
        if let Some(notification) = classify(&read()?) {
            pending.push_back(notification);
            return Ok(true);
        }
        remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Ok(false);
        }
    }
}

impl Surface for TerminalSurface {
    fn poll_pending(&mut self) -> io::Result<Option<SurfaceEvent>> {
        if let Some(notification) = self.pending.pop_front() {
            return Ok(Some(notification));
        }
        next_notification(event::poll, event::read)
    }

    fn wait(&mut self, timeout: Duration) -> io::Result<bool> {
        wait_for_notification(&mut self.pending, timeout, event::poll, event::read)
    }

    fn redraw(&mut self) {
        if let Err(e) = self.draw() {
            warn!("Could not redraw terminal surface: {e}");
        }
    }

    fn bad_rhythm(&mut self) {
        self.status = Some(BAD_RHYTHM_TEXT);
        self.redraw();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{
        KeyCode, KeyEvent, KeyEventState, KeyModifiers, MouseButton, MouseEvent,
    };

    fn key(kind: KeyEventKind) -> Event {
        Event::Key(KeyEvent {
            code: KeyCode::Char(' '),
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        })
    }

    fn mouse(kind: MouseEventKind) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column: 3,
            row: 4,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn test_key_press_is_a_tap() {
        assert_eq!(classify(&key(KeyEventKind::Press)), Some(SurfaceEvent::Tap));
        assert_eq!(classify(&key(KeyEventKind::Release)), None);
        assert_eq!(classify(&key(KeyEventKind::Repeat)), None);
    }

    #[test]
    fn test_mouse_button_press_is_a_tap() {
        assert_eq!(
            classify(&mouse(MouseEventKind::Down(MouseButton::Left))),
            Some(SurfaceEvent::Tap)
        );
        assert_eq!(
            classify(&mouse(MouseEventKind::Down(MouseButton::Right))),
            Some(SurfaceEvent::Tap)
        );
        assert_eq!(classify(&mouse(MouseEventKind::Up(MouseButton::Left))), None);
        assert_eq!(classify(&mouse(MouseEventKind::Moved)), None);
    }

    #[test]
    fn test_resize_requests_redraw() {
        assert_eq!(classify(&Event::Resize(80, 24)), Some(SurfaceEvent::Redraw));
        assert_eq!(classify(&Event::FocusGained), Some(SurfaceEvent::Redraw));
        assert_eq!(classify(&Event::FocusLost), None);
    }

    #[test]
    fn test_centered_column() {
        assert_eq!(centered(80, "TapLock"), 36);
        assert_eq!(centered(4, "TapLock"), 0);
    }

    /// Feeds `events` to the wait loop as if they were already queued.
    fn run_wait(events: Vec<Event>, timeout: Duration) -> (bool, VecDeque<SurfaceEvent>, usize) {
        let queue = std::cell::RefCell::new(VecDeque::from(events));
        let mut pending = VecDeque::new();
        let notified = wait_for_notification(
            &mut pending,
            timeout,
            |_| Ok(!queue.borrow().is_empty()),
            || {
                queue
                    .borrow_mut()
                    .pop_front()
                    .ok_or_else(|| io::Error::from(io::ErrorKind::WouldBlock))
            },
        )
        .unwrap();
        let left = queue.borrow().len();
        (notified, pending, left)
    }

    #[test]
    fn test_mouse_motion_does_not_end_the_wait() {
        let events = vec![
            mouse(MouseEventKind::Moved),
            mouse(MouseEventKind::Drag(MouseButton::Left)),
            mouse(MouseEventKind::Up(MouseButton::Left)),
            Event::FocusLost,
        ];

        let (notified, pending, left) = run_wait(events, Duration::from_secs(1));

        assert!(!notified);
        assert!(pending.is_empty());
        assert_eq!(left, 0);
    }

    #[test]
    fn test_tap_after_motion_ends_the_wait() {
        let events = vec![
            mouse(MouseEventKind::Moved),
            key(KeyEventKind::Release),
            mouse(MouseEventKind::Down(MouseButton::Left)),
            key(KeyEventKind::Press),
        ];

        let (notified, pending, left) = run_wait(events, Duration::from_secs(1));

        assert!(notified);
        assert_eq!(pending, VecDeque::from([SurfaceEvent::Tap]));
        // The key press stays queued for the next drain.
        assert_eq!(left, 1);
    }

    #[test]
    fn test_wait_with_queued_notification_returns_at_once() {
        let mut pending = VecDeque::from([SurfaceEvent::Redraw]);
        let notified = wait_for_notification(
            &mut pending,
            Duration::from_secs(1),
            |_| panic!("terminal polled while a notification was queued"),
            || panic!("terminal read while a notification was queued"),
        )
        .unwrap();

        assert!(notified);
        assert_eq!(pending.len(), 1);
    }

    #[test]
    fn test_drain_skips_unclassified_events() {
        let queue = std::cell::RefCell::new(VecDeque::from([
            mouse(MouseEventKind::Moved),
            Event::Resize(100, 40),
            mouse(MouseEventKind::Moved),
        ]));
        let poll = |_: Duration| -> io::Result<bool> { Ok(!queue.borrow().is_empty()) };
        let read = || -> io::Result<Event> {
            queue
                .borrow_mut()
                .pop_front()
                .ok_or_else(|| io::Error::from(io::ErrorKind::WouldBlock))
        };

        assert_eq!(
            next_notification(poll, read).unwrap(),
            Some(SurfaceEvent::Redraw)
        );
        assert_eq!(next_notification(poll, read).unwrap(), None);
        assert!(queue.borrow().is_empty());
    }

    #[test]
    fn test_held_key_repeats_count_as_taps() {
        // A held key without enhancement flags: one press per repeat.
        let queue = std::cell::RefCell::new(VecDeque::from(vec![key(KeyEventKind::Press); 3]));
        let poll = |_: Duration| -> io::Result<bool> { Ok(!queue.borrow().is_empty()) };
        let read = || -> io::Result<Event> {
            queue
                .borrow_mut()
                .pop_front()
                .ok_or_else(|| io::Error::from(io::ErrorKind::WouldBlock))
        };

        let mut taps = 0;
        while let Some(notification) = next_notification(poll, read).unwrap() {
            assert_eq!(notification, SurfaceEvent::Tap);
            taps += 1;
        }
        assert_eq!(taps, 3);
    }
}
