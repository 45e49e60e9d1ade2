//! Row — one line of buffer text, stored as raw bytes.
//!
//! A row never contains a line terminator. Bytes are kept exactly as they
//! were typed or loaded: no UTF-8 validation happens anywhere in the
//! editor core. Multi-byte awareness comes from the helpers at the bottom
//! of this module, which recognize continuation bytes (`10xxxxxx`) and
//! step over whole characters.

use std::ops::Range;

// ---------------------------------------------------------------------------
// Row
// ---------------------------------------------------------------------------

/// A single logical line of bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Row {
    bytes: Vec<u8>,
}

impl Row {
    /// An empty row.
    #[must_use]
    pub const fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// A row holding `bytes`. The caller guarantees there is no `\n` in it.
    #[must_use]
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    // -- Access -------------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Length in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    // -- Mutation -----------------------------------------------------------

    /// Insert one byte at `at`, clamped to the row length.
    pub fn insert_byte(&mut self, at: usize, byte: u8) {
        let at = at.min(self.bytes.len());
        self.bytes.insert(at, byte);
    }

    /// Remove the bytes in `range` (clamped to the row).
    pub fn remove(&mut self, range: Range<usize>) {
        let end = range.end.min(self.bytes.len());
        let start = range.start.min(end);
        self.bytes.drain(start..end);
    }

    /// Replace the bytes in `range` with `with`. Returns the length of the
    /// inserted bytes.
    pub fn replace(&mut self, range: Range<usize>, with: &[u8]) -> usize {
        let end = range.end.min(self.bytes.len());
        let start = range.start.min(end);
        self.bytes.splice(start..end, with.iter().copied());
        with.len()
    }

    /// Append bytes to the end of the row.
    pub fn append(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    /// Split the row at `at`: this row keeps `[0, at)`, the returned row
    /// gets the rest.
    #[must_use]
    pub fn split_off(&mut self, at: usize) -> Self {
        let at = at.min(self.bytes.len());
        Self {
            bytes: self.bytes.split_off(at),
        }
    }
}

impl From<&[u8]> for Row {
    fn from(bytes: &[u8]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<&str> for Row {
    fn from(s: &str) -> Self {
        Self::from_bytes(s.as_bytes())
    }
}

// ---------------------------------------------------------------------------
// UTF-8 helpers
// ---------------------------------------------------------------------------

/// True for a UTF-8 continuation byte (`10xxxxxx`).
#[inline]
#[must_use]
pub const fn is_continuation(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}

/// The byte length a lead byte announces: `110xxxxx` → 2, `1110xxxx` → 3,
/// `11110xxx` → 4, anything else → 1.
#[inline]
#[must_use]
pub const fn char_len(lead: u8) -> usize {
    if lead & 0xE0 == 0xC0 {
        2
    } else if lead & 0xF0 == 0xE0 {
        3
    } else if lead & 0xF8 == 0xF0 {
        4
    } else {
        1
    }
}

/// The next character boundary after `at`: one byte forward, then past any
/// continuation bytes. Returns `bytes.len()` at or past the end.
#[must_use]
pub fn next_boundary(bytes: &[u8], at: usize) -> usize {
    if at >= bytes.len() {
        return bytes.len();
    }
    let mut pos = at + 1;
    while pos < bytes.len() && is_continuation(bytes[pos]) {
        pos += 1;
    }
    pos
}

/// The previous character boundary before `at`: one byte back, then back
/// over continuation bytes to the lead byte. Returns 0 at the start.
#[must_use]
pub fn prev_boundary(bytes: &[u8], at: usize) -> usize {
    let mut pos = at.min(bytes.len());
    if pos == 0 {
        return 0;
    }
    pos -= 1;
    while pos > 0 && is_continuation(bytes[pos]) {
        pos -= 1;
    }
    pos
}

/// Clamp `at` to the row and move it back onto a character boundary.
#[must_use]
pub fn snap_to_boundary(bytes: &[u8], at: usize) -> usize {
    let mut pos = at.min(bytes.len());
    while pos > 0 && pos < bytes.len() && is_continuation(bytes[pos]) {
        pos -= 1;
    }
    pos
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
