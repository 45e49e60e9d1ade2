// SPDX-License-Identifier: MIT
//
// RenderFrame — one screenful of styled output.
//
// The editor paints into a frame; the frame writer turns it into bytes.
// A frame is a fixed number of lines, each a run of styled spans, plus
// an optional cursor cell. Spans hold raw bytes: the editor has already
// expanded tabs and replaced anything unprintable, so the writer copies
// bytes through untouched.
//
// Adjacent spans with the same attributes are merged on push, so a line
// of plain text is a single span and the writer emits one SGR pair per
// style change.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

// ─── Text Attributes ─────────────────────────────────────────────────────────

bitflags::bitflags! {
    /// Text attributes, mapped to SGR parameters by the frame writer.
    ///
    /// ```
    /// use q_term::frame::Attr;
    ///
    /// assert!(Attr::INVERSE.contains(Attr::INVERSE));
    /// assert!(Attr::empty().is_empty());
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attr: u8 {
        /// SGR 7 — swap foreground and background.
        const INVERSE = 1 << 0;
    }
}

// ─── Span ────────────────────────────────────────────────────────────────────

/// A run of bytes drawn with one set of attributes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Span {
    pub bytes: Vec<u8>,
    pub attr: Attr,
}

// ─── Line ────────────────────────────────────────────────────────────────────

/// One screen line: styled spans drawn left to right.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Line {
    spans: Vec<Span>,
}

impl Line {
    #[must_use]
    pub const fn new() -> Self {
        Self { spans: Vec::new() }
    }

    /// Append bytes with the given attributes, merging into the last span
    /// when the attributes match. Empty input is ignored.
    pub fn push(&mut self, bytes: &[u8], attr: Attr) {
        if bytes.is_empty() {
            return;
        }
        match self.spans.last_mut() {
            Some(last) if last.attr == attr => last.bytes.extend_from_slice(bytes),
            _ => self.spans.push(Span {
                bytes: bytes.to_vec(),
                attr,
            }),
        }
    }

    /// Append a single byte.
    #[inline]
    pub fn push_byte(&mut self, byte: u8, attr: Attr) {
        self.push(&[byte], attr);
    }

    /// Append a string.
    #[inline]
    pub fn push_str(&mut self, s: &str, attr: Attr) {
        self.push(s.as_bytes(), attr);
    }

    #[inline]
    #[must_use]
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// All span bytes concatenated, ignoring attributes.
    #[must_use]
    pub fn text(&self) -> Vec<u8> {
        self.spans.iter().flat_map(|s| s.bytes.iter().copied()).collect()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.spans.clear();
    }
}

// ─── RenderFrame ─────────────────────────────────────────────────────────────

/// A full screen of lines plus the cursor cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderFrame {
    width: u16,
    height: u16,
    lines: Vec<Line>,
    cursor: Option<(u16, u16)>,
}

impl RenderFrame {
    /// Create an empty frame of `width` × `height` cells.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            lines: vec![Line::new(); usize::from(height)],
            cursor: None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Change the frame size. All content is cleared.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.lines = vec![Line::new(); usize::from(height)];
        self.cursor = None;
    }

    /// Empty every line and drop the cursor.
    pub fn clear(&mut self) {
        for line in &mut self.lines {
            line.clear();
        }
        self.cursor = None;
    }

    #[must_use]
    pub fn line(&self, y: usize) -> Option<&Line> {
        self.lines.get(y)
    }

    /// Mutable access to line `y`, or `None` past the bottom.
    pub fn line_mut(&mut self, y: usize) -> Option<&mut Line> {
        self.lines.get_mut(y)
    }

    #[inline]
    #[must_use]
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Place the hardware cursor at `(x, y)` after the frame is drawn.
    #[inline]
    pub const fn set_cursor(&mut self, x: u16, y: u16) {
        self.cursor = Some((x, y));
    }

    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> Option<(u16, u16)> {
        self.cursor
    }
}

// ─── Width Helpers ───────────────────────────────────────────────────────────

/// Display width of `s` in terminal columns.
#[inline]
#[must_use]
pub fn str_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// The longest prefix of `s` that fits in `max_cols` columns.
///
/// A wide character that would straddle the limit is left out entirely.
#[must_use]
pub fn clip_to_width(s: &str, max_cols: usize) -> &str {
    let mut used = 0;
    for (idx, ch) in s.char_indices() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > max_cols {
            return &s[..idx];
        }
        used += w;
    }
    s
}

// ─── Tests ───────────────────────────────────────────────────────────────────
