// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Stdin reader — collects raw bytes from the terminal.
//
// The event loop is single-threaded: each iteration calls
// `StdinReader::read` which waits on stdin with `poll()` for at most the
// configured timeout, then does one `read()` if data is ready. A timeout
// is how the loop learns that a pending lone ESC really was the Escape
// key, and how it gets a chance to notice SIGWINCH.

use std::io;
use std::time::Duration;

/// Byte chunk read from stdin.
///
/// A single keypress is 1-6 bytes, a paste can be kilobytes.
const READ_BUF_SIZE: usize = 4096;

/// What one [`StdinReader::read`] call produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// A non-empty chunk of raw stdin bytes.
    Bytes(Vec<u8>),
    /// Nothing arrived within the timeout (or the wait was interrupted
    /// by a signal).
    Timeout,
    /// Stdin reached end of file.
    Eof,
}

/// Polling stdin reader.
///
/// ```no_run
/// use std::time::Duration;
/// use q_term::reader::{ReadOutcome, StdinReader};
///
/// let mut reader = StdinReader::new(Duration::from_millis(100));
/// match reader.read()? {
///     ReadOutcome::Bytes(bytes) => println!("got {} bytes", bytes.len()),
///     ReadOutcome::Timeout => {}
///     ReadOutcome::Eof => return Ok(()),
/// }
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct StdinReader {
    #[cfg(unix)]
    fd: libc::c_int,
    timeout: Duration,
    buf: Box<[u8; READ_BUF_SIZE]>,
}

impl StdinReader {
    /// Create a reader that waits at most `timeout` per call.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            #[cfg(unix)]
            fd: libc::STDIN_FILENO,
            timeout,
            buf: Box::new([0u8; READ_BUF_SIZE]),
        }
    }

    /// A reader on another descriptor. The caller keeps ownership of `fd`.
    #[cfg(unix)]
    #[must_use]
    pub fn from_fd(fd: libc::c_int, timeout: Duration) -> Self {
        Self {
            fd,
            ..Self::new(timeout)
        }
    }

    /// The per-call wait.
    #[inline]
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Wait for stdin to become readable and read what is available.
    ///
    /// # Errors
    ///
    /// Returns the OS error if `poll()` or `read()` fails for any reason
    /// other than `EINTR`.
    #[cfg(unix)]
    pub fn read(&mut self) -> io::Result<ReadOutcome> {
        let fd = self.fd;
        let timeout_ms = i32::try_from(self.timeout.as_millis()).unwrap_or(i32::MAX);

        let ready = unsafe {
            let mut pfd = libc::pollfd {
                fd,
                events: libc::POLLIN,
                revents: 0,
            };
            libc::poll(&raw mut pfd, 1, timeout_ms)
        };

        if ready < 0 {
            return interrupted_as_timeout(io::Error::last_os_error());
        }
        if ready == 0 {
            return Ok(ReadOutcome::Timeout);
        }

        let n = unsafe { libc::read(fd, self.buf.as_mut_ptr().cast(), self.buf.len()) };

        match n {
            0 => Ok(ReadOutcome::Eof),
            n if n < 0 => interrupted_as_timeout(io::Error::last_os_error()),
            #[allow(clippy::cast_sign_loss)] // n > 0 here.
            n => Ok(ReadOutcome::Bytes(self.buf[..n as usize].to_vec())),
        }
    }

    /// Non-unix fallback: a blocking read with no timeout.
    #[cfg(not(unix))]
    pub fn read(&mut self) -> io::Result<ReadOutcome> {
        use std::io::Read;

        match io::stdin().lock().read(&mut self.buf[..]) {
            Ok(0) => Ok(ReadOutcome::Eof),
            Ok(n) => Ok(ReadOutcome::Bytes(self.buf[..n].to_vec())),
            Err(e) => interrupted_as_timeout(e),
        }
    }
}

/// A signal cut the wait short; report it like an empty tick so the loop
/// can look at the resize flag.
fn interrupted_as_timeout(err: io::Error) -> io::Result<ReadOutcome> {
    if err.kind() == io::ErrorKind::Interrupted {
        Ok(ReadOutcome::Timeout)
    } else {
        Err(err)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
