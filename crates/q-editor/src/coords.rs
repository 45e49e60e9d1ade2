//! Coordinate mapping — byte offsets to render columns and back.
//!
//! Every screen decision goes through [`CoordinateMapper`]: where the
//! cursor is drawn, how far a row scrolls horizontally, and where a row
//! wraps. It walks a row as a sequence of glyphs:
//!
//! | lead byte    | bytes | columns                       |
//! |--------------|-------|-------------------------------|
//! | `\t`         | 1     | up to the next tab stop       |
//! | `110xxxxx`   | 2     | 1                             |
//! | `1110xxxx`   | 3     | 2                             |
//! | `11110xxx`   | 4     | 2                             |
//! | anything else| 1     | 1                             |
//!
//! The width classes are a heuristic and the byte counts are trusted from
//! the lead byte. A glyph whose announced length runs past the end of the
//! row still counts its width, then the walk stops; nothing past the row
//! end is ever read.

use crate::row::char_len;

/// Default distance between tab stops.
pub const DEFAULT_TAB_STOP: usize = 4;

// ---------------------------------------------------------------------------
// Glyph
// ---------------------------------------------------------------------------

/// One unit of a row as the mapper sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    /// Byte offset of the lead byte.
    pub start: usize,
    /// Bytes consumed (clipped at the row end).
    pub len: usize,
    /// Render column where the glyph begins.
    pub rx: usize,
    /// Columns the glyph occupies.
    pub width: usize,
}

impl Glyph {
    /// Render column just past the glyph.
    #[inline]
    #[must_use]
    pub const fn end_rx(&self) -> usize {
        self.rx + self.width
    }
}

/// Iterator over the glyphs of a row. Created by [`CoordinateMapper::glyphs`].
pub struct Glyphs<'a> {
    bytes: &'a [u8],
    pos: usize,
    rx: usize,
    tab_stop: usize,
}

impl Iterator for Glyphs<'_> {
    type Item = Glyph;

    fn next(&mut self) -> Option<Glyph> {
        let &lead = self.bytes.get(self.pos)?;
        let (len, width) = if lead == b'\t' {
            (1, self.tab_stop - self.rx % self.tab_stop)
        } else {
            width_class(lead)
        };
        let glyph = Glyph {
            start: self.pos,
            len: len.min(self.bytes.len() - self.pos),
            rx: self.rx,
            width,
        };
        self.pos += glyph.len;
        self.rx += width;
        Some(glyph)
    }
}

/// `(bytes, columns)` for a non-tab lead byte. Three and four byte
/// sequences are two columns wide.
const fn width_class(lead: u8) -> (usize, usize) {
    let len = char_len(lead);
    (len, if len >= 3 { 2 } else { 1 })
}

// ---------------------------------------------------------------------------
// CoordinateMapper
// ---------------------------------------------------------------------------

/// Converts between byte columns (`cx`) and render columns (`rx`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateMapper {
    tab_stop: usize,
}

impl CoordinateMapper {
    /// A mapper with tab stops every `tab_stop` columns (minimum 1).
    #[must_use]
    pub fn new(tab_stop: usize) -> Self {
        Self {
            tab_stop: tab_stop.max(1),
        }
    }

    #[inline]
    #[must_use]
    pub const fn tab_stop(&self) -> usize {
        self.tab_stop
    }

    /// Walk the glyphs of `bytes` from the start.
    #[must_use]
    pub const fn glyphs<'a>(&self, bytes: &'a [u8]) -> Glyphs<'a> {
        Glyphs {
            bytes,
            pos: 0,
            rx: 0,
            tab_stop: self.tab_stop,
        }
    }

    /// Render column of byte offset `cx`: the total width of every glyph
    /// that starts before `cx`.
    #[must_use]
    pub fn cx_to_rx(&self, bytes: &[u8], cx: usize) -> usize {
        self.glyphs(bytes)
            .take_while(|g| g.start < cx)
            .last()
            .map_or(0, |g| g.end_rx())
    }

    /// Byte offset of the glyph whose columns contain `rx`, or the row
    /// length when `rx` is past the end.
    #[must_use]
    pub fn rx_to_cx(&self, bytes: &[u8], rx: usize) -> usize {
        self.glyphs(bytes)
            .find(|g| rx < g.end_rx())
            .map_or(bytes.len(), |g| g.start)
    }

    /// Total render width of a row.
    #[must_use]
    pub fn row_width(&self, bytes: &[u8]) -> usize {
        self.cx_to_rx(bytes, bytes.len())
    }
}

impl Default for CoordinateMapper {
    fn default() -> Self {
        Self::new(DEFAULT_TAB_STOP)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
