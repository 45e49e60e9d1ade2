// SPDX-License-Identifier: MIT
//
// Output buffering and frame rendering.
//
// Two components work together so a frame reaches the terminal in one
// `write()`:
//
//   OutputBuffer — accumulates all bytes in memory so the entire frame
//   can be written in a single syscall.
//
//   FrameWriter — walks a `RenderFrame` and emits it: hide the cursor,
//   home, each line followed by clear-to-end-of-line, then place and show
//   the cursor. Every line is rewritten each frame; quecto's frames are
//   small enough that this is cheaper than tracking what changed.

use std::io::{self, Write};

use crate::ansi;
use crate::frame::RenderFrame;

// ─── OutputBuffer ────────────────────────────────────────────────────────────

/// A byte buffer that accumulates output for a single `write()` syscall.
///
/// Default capacity: 16 KB, enough for most frames without reallocation.
pub struct OutputBuffer {
    buf: Vec<u8>,
}

const DEFAULT_CAPACITY: usize = 16_384;

impl OutputBuffer {
    /// Create an empty buffer with default capacity (16 KB).
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes (for testing and debugging).
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Clear the buffer for reuse (keeps allocated capacity).
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Write accumulated output to stdout and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to stdout fails.
    pub fn flush_stdout(&mut self) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        self.flush_to(&mut stdout)
    }

    /// Write accumulated output to an arbitrary writer and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if !self.buf.is_empty() {
            w.write_all(&self.buf)?;
            w.flush()?;
            self.buf.clear();
        }
        Ok(())
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Real flushing goes through flush_stdout() / flush_to().
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── FrameWriter ─────────────────────────────────────────────────────────────

/// Turns a [`RenderFrame`] into terminal bytes.
///
/// ```
/// use q_term::frame::{Attr, RenderFrame};
/// use q_term::output::FrameWriter;
///
/// let mut frame = RenderFrame::new(10, 1);
/// frame.line_mut(0).unwrap().push_str("hi", Attr::empty());
/// frame.set_cursor(2, 0);
///
/// let mut writer = FrameWriter::new();
/// writer.render(&frame);
/// assert!(writer.as_bytes().ends_with(b"\x1b[1;3H\x1b[?25h"));
/// ```
pub struct FrameWriter {
    out: OutputBuffer,
}

impl FrameWriter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            out: OutputBuffer::new(),
        }
    }

    /// Append the escape sequences and content for `frame`.
    ///
    /// Writes into an in-memory buffer and cannot fail.
    pub fn render(&mut self, frame: &RenderFrame) {
        // Writing into a Vec never returns an error.
        let _ = self.render_inner(frame);
    }

    fn render_inner(&mut self, frame: &RenderFrame) -> io::Result<()> {
        let out = &mut self.out;
        ansi::cursor_hide(out)?;
        ansi::cursor_home(out)?;

        let last = frame.lines().len().saturating_sub(1);
        for (y, line) in frame.lines().iter().enumerate() {
            for span in line.spans() {
                if span.attr.is_empty() {
                    out.write_all(&span.bytes)?;
                } else {
                    ansi::attrs(out, span.attr)?;
                    out.write_all(&span.bytes)?;
                    ansi::reset(out)?;
                }
            }
            ansi::clear_to_eol(out)?;
            if y < last {
                out.write_all(b"\r\n")?;
            }
        }

        if let Some((x, y)) = frame.cursor() {
            ansi::cursor_to(out, x, y)?;
            ansi::cursor_show(out)?;
        }
        Ok(())
    }

    /// The bytes rendered so far (for testing and debugging).
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.out.as_bytes()
    }

    /// Write the rendered frame to stdout in one call.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to stdout fails.
    pub fn flush_stdout(&mut self) -> io::Result<()> {
        self.out.flush_stdout()
    }

    /// Write the rendered frame to `w`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        self.out.flush_to(w)
    }
}

impl Default for FrameWriter {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
