// SPDX-License-Identifier: MIT
//
// Terminal control for quecto.
//
// `Terminal` puts stdin into raw mode, moves to the alternate screen and
// puts both back when it is dropped or when the editor panics. The size
// is read once at startup and again on SIGWINCH. An unknown size is fatal.
//
// Unsafe: termios, ioctl, isatty and a raw write(2) in the panic hook.
#![allow(unsafe_code)]

use std::io::{self, Write};
use std::sync::{Mutex, Once};

use crate::ansi;

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub cols: u16,
    pub rows: u16,
}

/// Ask the OS for the window size of stdout.
///
/// `None` when stdout is not a terminal or reports a zero dimension.
#[cfg(unix)]
#[must_use]
pub fn get_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) };
    (rc == 0 && ws.ws_col > 0 && ws.ws_row > 0).then_some(Size {
        cols: ws.ws_col,
        rows: ws.ws_row,
    })
}

#[cfg(not(unix))]
#[must_use]
pub fn get_size() -> Option<Size> {
    None
}

// ─── Raw Mode ───────────────────────────────────────────────────────────────

/// Clear every flag that makes the line discipline cook input or output.
///
/// Same effect as `cfmakeraw`, plus one-byte blocking reads
/// (`VMIN = 1`, `VTIME = 0`); the reader's `poll` supplies the timeout.
#[cfg(unix)]
fn make_raw(t: &mut libc::termios) {
    t.c_iflag &= !(libc::IGNBRK
        | libc::BRKINT
        | libc::PARMRK
        | libc::ISTRIP
        | libc::INLCR
        | libc::IGNCR
        | libc::ICRNL
        | libc::IXON);
    t.c_oflag &= !libc::OPOST;
    t.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);
    t.c_cflag &= !(libc::CSIZE | libc::PARENB);
    t.c_cflag |= libc::CS8;
    t.c_cc[libc::VMIN] = 1;
    t.c_cc[libc::VTIME] = 0;
}

/// Termios saved on entry, also read by the panic hook.
#[cfg(unix)]
static SAVED_TERMIOS: Mutex<Option<libc::termios>> = Mutex::new(None);

/// The terminal's cooked settings, held while raw mode is on.
#[cfg(unix)]
struct RawMode {
    fd: libc::c_int,
    cooked: libc::termios,
}

#[cfg(unix)]
impl RawMode {
    /// Switch `fd` to raw mode. `Ok(None)` when it is not a terminal.
    fn enable(fd: libc::c_int) -> io::Result<Option<Self>> {
        if unsafe { libc::isatty(fd) } == 0 {
            return Ok(None);
        }

        let mut cooked: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(fd, &raw mut cooked) } != 0 {
            return Err(io::Error::last_os_error());
        }
        let mut raw = cooked;
        make_raw(&mut raw);
        if unsafe { libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const raw) } != 0 {
            return Err(io::Error::last_os_error());
        }

        if let Ok(mut saved) = SAVED_TERMIOS.lock() {
            *saved = Some(cooked);
        }
        Ok(Some(Self { fd, cooked }))
    }

    fn restore(self) -> io::Result<()> {
        if unsafe { libc::tcsetattr(self.fd, libc::TCSAFLUSH, &raw const self.cooked) } != 0 {
            return Err(io::Error::last_os_error());
        }
        if let Ok(mut saved) = SAVED_TERMIOS.lock() {
            *saved = None;
        }
        Ok(())
    }
}

// ─── Panic Hook ─────────────────────────────────────────────────────────────

/// Written straight to fd 1 when the editor panics: reset attributes, show
/// the cursor, then leave the alternate screen.
const PANIC_RESTORE: &[u8] = b"\x1b[0m\x1b[?25h\x1b[?1049l";

static PANIC_HOOK: Once = Once::new();

/// Chain a hook in front of the current one that puts the terminal back
/// first, so the panic message lands on a usable screen.
///
/// The escape bytes go out with `write(2)` rather than `io::stdout()`: the
/// panic may have happened while the stdout lock was held.
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            #[cfg(unix)]
            unsafe {
                let _ = libc::write(
                    libc::STDOUT_FILENO,
                    PANIC_RESTORE.as_ptr().cast::<libc::c_void>(),
                    PANIC_RESTORE.len(),
                );
                if let Ok(saved) = SAVED_TERMIOS.lock() {
                    if let Some(cooked) = saved.as_ref() {
                        let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, cooked);
                    }
                }
            }
            #[cfg(not(unix))]
            {
                let _ = io::stdout().write_all(PANIC_RESTORE);
                let _ = io::stdout().flush();
            }
            previous(info);
        }));
    });
}

// ─── Terminal ───────────────────────────────────────────────────────────────

/// Owner of the terminal while the editor runs.
///
/// ```no_run
/// use q_term::terminal::Terminal;
///
/// let mut term = Terminal::new()?;
/// term.enter()?;
/// // draw, read keys...
/// term.leave()?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct Terminal {
    size: Size,
    active: bool,
    #[cfg(unix)]
    raw: Option<RawMode>,
}

impl Terminal {
    /// A handle sized to the current window. Raw mode is not entered yet.
    ///
    /// # Errors
    ///
    /// Fails with `Unsupported` when the window size cannot be read. The
    /// screen cannot be laid out without it.
    pub fn new() -> io::Result<Self> {
        get_size().map(Self::with_size).ok_or_else(|| {
            io::Error::new(io::ErrorKind::Unsupported, "unable to determine terminal size")
        })
    }

    /// A handle with a given size, for callers that already know it.
    #[must_use]
    pub const fn with_size(size: Size) -> Self {
        Self {
            size,
            active: false,
            #[cfg(unix)]
            raw: None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Re-read the window size after SIGWINCH. Keeps the old size if the
    /// query fails.
    pub fn refresh_size(&mut self) -> Size {
        if let Some(size) = get_size() {
            self.size = size;
        }
        self.size
    }

    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Go raw, switch to the alternate screen and clear it. Does nothing
    /// when already active.
    ///
    /// # Errors
    ///
    /// Fails if termios or the terminal write fails.
    pub fn enter(&mut self) -> io::Result<()> {
        if self.active {
            return Ok(());
        }
        install_panic_hook();

        #[cfg(unix)]
        {
            self.raw = RawMode::enable(libc::STDIN_FILENO)?;
        }
        // From here on, drop restores whatever got switched.
        self.active = true;

        let mut out = io::stdout().lock();
        ansi::enter_alt_screen(&mut out)?;
        ansi::cursor_hide(&mut out)?;
        ansi::clear_screen(&mut out)?;
        out.flush()?;

        tracing::debug!(cols = self.size.cols, rows = self.size.rows, "entered raw mode");
        Ok(())
    }

    /// Undo [`enter`](Self::enter). Does nothing when inactive.
    ///
    /// # Errors
    ///
    /// Fails if the terminal write or termios restore fails.
    pub fn leave(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        // Termios comes back even when the screen write fails.
        let screen = restore_screen();
        #[cfg(unix)]
        if let Some(raw) = self.raw.take() {
            raw.restore()?;
        }
        screen?;

        tracing::debug!("left raw mode");
        Ok(())
    }
}

fn restore_screen() -> io::Result<()> {
    let mut out = io::stdout().lock();
    ansi::reset(&mut out)?;
    ansi::cursor_show(&mut out)?;
    ansi::exit_alt_screen(&mut out)?;
    out.flush()
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
