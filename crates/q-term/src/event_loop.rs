// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Event loop — read, dispatch, render.
//
// One thread, one loop. Each iteration:
//
//   1. Render the frame if anything changed since the last render.
//   2. Wait on stdin with `poll()` for up to the tick timeout.
//   3. Bytes arrived: parse them into key events and hand each one to
//      the application. Nothing arrived: flush a pending lone ESC as the
//      Escape key.
//   4. Check the SIGWINCH flag and tell the application about the new
//      size.
//
// # SIGWINCH Handling
//
// The signal handler only sets an `AtomicBool`. The loop checks it once
// per iteration, so a resize is picked up within one tick.
//
// # Escape Sequence Timeout
//
// A lone ESC byte could be the Escape key or the start of a CSI
// sequence. The parser holds it as pending; if the next poll times out
// with no new bytes, it was the Escape key.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::frame::RenderFrame;
use crate::input::{KeyEvent, Parser};
use crate::output::FrameWriter;
use crate::reader::{ReadOutcome, StdinReader};
use crate::terminal::{Size, Terminal};

// ─── SIGWINCH ────────────────────────────────────────────────────────────────

/// Global flag set by the SIGWINCH handler. Checked each loop iteration.
static SIGWINCH_RECEIVED: AtomicBool = AtomicBool::new(false);

/// Install a signal handler for SIGWINCH (terminal resize).
///
/// The handler only stores to an atomic, which is async-signal-safe.
/// No `SA_RESTART`: an interrupted `poll()` returns early so the resize
/// is handled without waiting for the tick.
#[cfg(unix)]
fn install_sigwinch_handler() {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = sigwinch_handler as *const () as usize;
        sa.sa_flags = 0;
        libc::sigemptyset(&raw mut sa.sa_mask);
        libc::sigaction(libc::SIGWINCH, &raw const sa, std::ptr::null_mut());
    }
}

#[cfg(unix)]
extern "C" fn sigwinch_handler(_sig: libc::c_int) {
    SIGWINCH_RECEIVED.store(true, Ordering::Relaxed);
}

#[cfg(not(unix))]
fn install_sigwinch_handler() {}

// ─── App Trait ───────────────────────────────────────────────────────────────

/// What the application tells the event loop to do after handling an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Continue running.
    Continue,
    /// Exit the event loop cleanly.
    Quit,
}

/// Application interface for the event loop.
///
/// The loop calls [`on_event`](App::on_event) for every decoded key,
/// [`on_resize`](App::on_resize) when the window changes size, and
/// [`paint`](App::paint) whenever either of those happened.
pub trait App {
    /// Handle one key event. Return [`Action::Quit`] to exit the loop.
    fn on_event(&mut self, event: &KeyEvent) -> Action;

    /// Handle terminal resize. The frame has already been resized.
    fn on_resize(&mut self, _size: Size) {}

    /// Paint the current state into `frame`.
    ///
    /// The frame is cleared before this call. Set the cursor with
    /// [`RenderFrame::set_cursor`]; a frame without a cursor leaves the
    /// hardware cursor hidden.
    fn paint(&mut self, frame: &mut RenderFrame);
}

/// Hand `events` to `app` in order, stopping at the first quit.
pub fn dispatch(app: &mut impl App, events: &[KeyEvent]) -> Action {
    for event in events {
        if app.on_event(event) == Action::Quit {
            return Action::Quit;
        }
    }
    Action::Continue
}

// ─── Loop Config ─────────────────────────────────────────────────────────────

/// Configuration for the event loop timing.
#[derive(Debug, Clone, Copy)]
pub struct LoopConfig {
    /// How long one `poll()` waits for input.
    ///
    /// Also the Escape key latency: a lone ESC is resolved after one
    /// empty tick. Default: 100 ms.
    pub tick: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(100),
        }
    }
}

// ─── EventLoop ───────────────────────────────────────────────────────────────

/// The terminal event loop.
///
/// Owns the terminal, parser and frame writer. Call [`run`](Self::run)
/// to enter the loop; it returns when the application signals
/// [`Action::Quit`] or stdin closes.
///
/// ```no_run
/// use q_term::event_loop::{Action, App, EventLoop};
/// use q_term::frame::RenderFrame;
/// use q_term::input::KeyEvent;
///
/// struct MyApp;
///
/// impl App for MyApp {
///     fn on_event(&mut self, event: &KeyEvent) -> Action {
///         if event.is_ctrl(b'q') {
///             return Action::Quit;
///         }
///         Action::Continue
///     }
///
///     fn paint(&mut self, frame: &mut RenderFrame) {}
/// }
///
/// let mut event_loop = EventLoop::new()?;
/// event_loop.run(&mut MyApp)?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct EventLoop {
    terminal: Terminal,
    parser: Parser,
    writer: FrameWriter,
    config: LoopConfig,
}

impl EventLoop {
    /// Create a new event loop with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal size cannot be determined.
    pub fn new() -> io::Result<Self> {
        Self::with_config(LoopConfig::default())
    }

    /// Create a new event loop with custom timing configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal size cannot be determined.
    pub fn with_config(config: LoopConfig) -> io::Result<Self> {
        Ok(Self {
            terminal: Terminal::new()?,
            parser: Parser::new(),
            writer: FrameWriter::new(),
            config,
        })
    }

    /// The current terminal size.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.terminal.size()
    }

    /// Run the event loop until the application returns [`Action::Quit`].
    ///
    /// Enters raw mode, installs the SIGWINCH handler, runs the loop, and
    /// restores the terminal on exit (even on error).
    ///
    /// # Errors
    ///
    /// Returns an error if terminal setup, reading stdin, or writing a
    /// frame fails.
    pub fn run(&mut self, app: &mut impl App) -> io::Result<()> {
        self.terminal.enter()?;
        install_sigwinch_handler();

        let result = self.run_inner(app);

        // Always clean up, even if the loop errored.
        self.terminal.leave()?;

        result
    }

    fn run_inner(&mut self, app: &mut impl App) -> io::Result<()> {
        let size = self.terminal.size();
        let mut frame = RenderFrame::new(size.cols, size.rows);
        let mut reader = StdinReader::new(self.config.tick);
        let mut dirty = true;

        loop {
            // ── Render if dirty ──────────────────────────────────
            if dirty {
                frame.clear();
                app.paint(&mut frame);
                self.writer.render(&frame);
                self.writer.flush_stdout()?;
                dirty = false;
            }

            // ── Read stdin ───────────────────────────────────────
            let events = match reader.read()? {
                ReadOutcome::Bytes(bytes) => self.parser.advance(&bytes),
                ReadOutcome::Timeout if self.parser.has_pending() => self.parser.flush(),
                ReadOutcome::Timeout => Vec::new(),
                ReadOutcome::Eof => {
                    tracing::debug!("stdin closed");
                    return Ok(());
                }
            };

            if !events.is_empty() {
                if dispatch(app, &events) == Action::Quit {
                    return Ok(());
                }
                dirty = true;
            }

            // ── Check for terminal resize ────────────────────────
            if SIGWINCH_RECEIVED.swap(false, Ordering::Relaxed) {
                let new_size = self.terminal.refresh_size();
                tracing::debug!(cols = new_size.cols, rows = new_size.rows, "resize");
                frame.resize(new_size.cols, new_size.rows);
                app.on_resize(new_size);
                dirty = true;
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
