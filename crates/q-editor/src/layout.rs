//! Viewport layout — from buffer rows to a painted frame.
//!
//! The screen is split into three bands:
//!
//! ```text
//!  ┌──────────────────────────────┐
//!  │ text rows (screen_rows)      │  gutter column + row fragment, or `~`
//!  │ ...                          │
//!  ├──────────────────────────────┤
//!  │ status line (inverse)        │  name[*]              row,col
//!  ├──────────────────────────────┤
//!  │ message / `>` prompt         │
//!  └──────────────────────────────┘
//! ```
//!
//! Two layout modes share one [`Viewport`]:
//!
//! - **Scroll**: one screen line per row. `col_offset` is the first visible
//!   render column and follows the cursor horizontally.
//! - **Wrap**: a row of width `L` takes `max(1, ceil(L / w))` screen lines,
//!   `w` being the text width. A wide glyph that would straddle the edge
//!   moves whole to the next line instead, so such rows can take more.
//!   No horizontal scroll; `col_offset` instead counts how many leading
//!   screen lines of the top row are scrolled off.
//!
//! Offsets are clamped, never re-centered: they move just far enough to
//! bring the cursor back on screen.

use q_term::frame::{Attr, Line, RenderFrame, clip_to_width, str_width};
use unicode_width::UnicodeWidthChar;

use crate::buffer::TextBuffer;
use crate::coords::CoordinateMapper;
use crate::cursor::Cursor;

/// Longest file name shown on the status line, in columns.
const STATUS_NAME_MAX: usize = 20;

/// Left padding before every text row.
const GUTTER: usize = 1;

// ---------------------------------------------------------------------------
// Modes
// ---------------------------------------------------------------------------

/// How rows longer than the screen are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutMode {
    /// Truncate and scroll horizontally.
    #[default]
    Scroll,
    /// Soft-wrap onto following screen lines.
    Wrap,
}

/// What goes on the bottom line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BottomLine<'a> {
    Empty,
    /// A transient status message.
    Message(&'a str),
    /// The command prompt. `cursor` is a byte offset into `input`.
    Prompt {
        prefix: &'a str,
        input: &'a str,
        cursor: usize,
    },
}

// ---------------------------------------------------------------------------
// Viewport
// ---------------------------------------------------------------------------

/// Scroll state and screen geometry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewport {
    row_offset: usize,
    col_offset: usize,
    screen_rows: usize,
    screen_cols: usize,
    mode: LayoutMode,
}

impl Viewport {
    /// A viewport for a terminal of `rows` × `cols`. Two rows are reserved
    /// for the status and message lines.
    #[must_use]
    pub fn new(rows: u16, cols: u16) -> Self {
        let mut viewport = Self {
            row_offset: 0,
            col_offset: 0,
            screen_rows: 0,
            screen_cols: 0,
            mode: LayoutMode::Scroll,
        };
        viewport.resize(rows, cols);
        viewport
    }

    /// Adopt a new terminal size. Offsets are fixed up on the next render.
    pub fn resize(&mut self, rows: u16, cols: u16) {
        self.screen_rows = usize::from(rows).saturating_sub(2);
        self.screen_cols = usize::from(cols);
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn row_offset(&self) -> usize {
        self.row_offset
    }

    /// Render column (Scroll) or skipped screen lines of the top row (Wrap).
    #[inline]
    #[must_use]
    pub const fn col_offset(&self) -> usize {
        self.col_offset
    }

    /// Number of text rows.
    #[inline]
    #[must_use]
    pub const fn screen_rows(&self) -> usize {
        self.screen_rows
    }

    #[inline]
    #[must_use]
    pub const fn screen_cols(&self) -> usize {
        self.screen_cols
    }

    /// Columns available for row content, after the gutter. At least 1.
    #[inline]
    #[must_use]
    pub fn text_cols(&self) -> usize {
        self.screen_cols.saturating_sub(GUTTER).max(1)
    }

    #[inline]
    #[must_use]
    pub const fn mode(&self) -> LayoutMode {
        self.mode
    }

    /// Switch layout mode. `col_offset` means something different in each
    /// mode, so it is reset on a change.
    pub fn set_mode(&mut self, mode: LayoutMode) {
        if self.mode != mode {
            self.mode = mode;
            self.col_offset = 0;
        }
    }

    // -- Scrolling ----------------------------------------------------------

    /// Adjust the offsets so the cursor is visible and return its screen
    /// cell `(x, y)` within the text area (x includes the gutter).
    pub fn scroll(
        &mut self,
        buf: &TextBuffer,
        cursor: &Cursor,
        mapper: &CoordinateMapper,
    ) -> (usize, usize) {
        let rx = cursor_rx(buf, cursor, mapper);
        match self.mode {
            LayoutMode::Scroll => self.scroll_rows(cursor.row, rx),
            LayoutMode::Wrap => {
                let wrap = WrapMetrics::new(buf, mapper, cursor.row, rx, self.text_cols());
                self.scroll_wrapped(&wrap, cursor.row)
            }
        }
    }

    fn scroll_rows(&mut self, row: usize, rx: usize) -> (usize, usize) {
        let rows = self.screen_rows.max(1);
        let cols = self.text_cols();

        if row < self.row_offset {
            self.row_offset = row;
        }
        if row >= self.row_offset + rows {
            self.row_offset = row + 1 - rows;
        }
        if rx < self.col_offset {
            self.col_offset = rx;
        }
        if rx >= self.col_offset + cols {
            self.col_offset = rx + 1 - cols;
        }

        (GUTTER + rx - self.col_offset, row - self.row_offset)
    }

    fn scroll_wrapped(&mut self, wrap: &WrapMetrics<'_>, row: usize) -> (usize, usize) {
        let rows = self.screen_rows.max(1);
        let x = GUTTER + wrap.cursor_vcol;

        // Cursor above the top line: it becomes the top line.
        if row < self.row_offset || (row == self.row_offset && wrap.cursor_vline < self.col_offset)
        {
            self.row_offset = row;
            self.col_offset = wrap.cursor_vline;
            return (x, 0);
        }

        // Every row takes at least one line, so rows further back than a
        // screen can't be visible.
        if row - self.row_offset >= rows {
            self.row_offset = row + 1 - rows;
            self.col_offset = 0;
        }
        self.col_offset = self.col_offset.min(wrap.lines(self.row_offset) - 1);

        // Screen lines from the top line down to the cursor's line.
        let mut distance = if row == self.row_offset {
            wrap.cursor_vline - self.col_offset
        } else {
            let head = wrap.lines(self.row_offset) - self.col_offset;
            let middle: usize = (self.row_offset + 1..row).map(|r| wrap.lines(r)).sum();
            head + middle + wrap.cursor_vline
        };

        while distance >= rows {
            self.col_offset += 1;
            if self.col_offset >= wrap.lines(self.row_offset) {
                self.row_offset += 1;
                self.col_offset = 0;
            }
            distance -= 1;
        }

        (x, distance)
    }

    // -- Rendering ----------------------------------------------------------

    /// Scroll, then paint the text rows, status line and bottom line into
    /// `frame` and place the cursor.
    pub fn render(
        &mut self,
        frame: &mut RenderFrame,
        buf: &TextBuffer,
        cursor: &Cursor,
        mapper: &CoordinateMapper,
        bottom: &BottomLine<'_>,
    ) {
        let text_cursor = self.scroll(buf, cursor, mapper);
        let width = usize::from(frame.width());

        match self.mode {
            LayoutMode::Scroll => self.draw_rows(frame, buf, mapper),
            LayoutMode::Wrap => {
                let rx = cursor_rx(buf, cursor, mapper);
                let wrap = WrapMetrics::new(buf, mapper, cursor.row, rx, self.text_cols());
                self.draw_wrapped(frame, buf, &wrap);
            }
        }

        if let Some(line) = frame.line_mut(self.screen_rows) {
            draw_status(line, width, buf, cursor);
        }

        let prompt_x = frame
            .line_mut(self.screen_rows + 1)
            .and_then(|line| draw_bottom(line, width, bottom));

        let (x, y) = prompt_x.map_or(text_cursor, |x| (x, self.screen_rows + 1));
        let max_x = frame.width().saturating_sub(1);
        let max_y = frame.height().saturating_sub(1);
        frame.set_cursor(to_cell(x).min(max_x), to_cell(y).min(max_y));
    }

    fn draw_rows(&self, frame: &mut RenderFrame, buf: &TextBuffer, mapper: &CoordinateMapper) {
        let lo = self.col_offset;
        let hi = lo + self.text_cols();
        for y in 0..self.screen_rows {
            let Some(line) = frame.line_mut(y) else { break };
            match buf.row(self.row_offset + y) {
                Some(row) => {
                    push_spaces(line, GUTTER);
                    push_segment(line, row.as_bytes(), mapper, lo, hi);
                }
                None => line.push_byte(b'~', Attr::empty()),
            }
        }
    }

    fn draw_wrapped(&self, frame: &mut RenderFrame, buf: &TextBuffer, wrap: &WrapMetrics<'_>) {
        let w = wrap.width;
        let mut y = 0;
        let mut r = self.row_offset;
        let mut skip = self.col_offset;

        while y < self.screen_rows {
            let Some(line) = frame.line_mut(y) else { break };
            let Some(row) = buf.row(r) else {
                line.push_byte(b'~', Attr::empty());
                y += 1;
                continue;
            };

            let starts = line_starts(row.as_bytes(), wrap.mapper, w);
            for k in skip..wrap.lines(r) {
                let Some(line) = frame.line_mut(y) else { break };
                // The cursor's extra line has no start of its own and draws empty.
                let lo = starts.get(k).copied().unwrap_or(usize::MAX);
                let hi = starts.get(k + 1).copied().unwrap_or_else(|| lo.saturating_add(w));
                push_spaces(line, GUTTER);
                push_segment(line, row.as_bytes(), wrap.mapper, lo, hi);
                y += 1;
                if y >= self.screen_rows {
                    break;
                }
            }
            skip = 0;
            r += 1;
        }
    }
}

// ---------------------------------------------------------------------------
// Wrap metrics
// ---------------------------------------------------------------------------

/// Screen-line counts for wrap mode, with the cursor row's extra line.
struct WrapMetrics<'a> {
    buf: &'a TextBuffer,
    mapper: &'a CoordinateMapper,
    width: usize,
    cursor_row: usize,
    cursor_vline: usize,
    cursor_vcol: usize,
}

impl<'a> WrapMetrics<'a> {
    fn new(
        buf: &'a TextBuffer,
        mapper: &'a CoordinateMapper,
        cursor_row: usize,
        rx: usize,
        width: usize,
    ) -> Self {
        let starts = buf
            .row(cursor_row)
            .map_or_else(|| vec![0], |row| line_starts(row.as_bytes(), mapper, width));
        // Last line starting at or before the cursor. A cursor a full width
        // past it sits on the extra line.
        let k = starts.partition_point(|&s| s <= rx).saturating_sub(1);
        let into = rx - starts[k];
        Self {
            buf,
            mapper,
            width,
            cursor_row,
            cursor_vline: k + into / width,
            cursor_vcol: into % width,
        }
    }

    /// Screen lines taken by row `r`. A cursor sitting at the end of a full
    /// last line gets one more line.
    fn lines(&self, r: usize) -> usize {
        let Some(row) = self.buf.row(r) else { return 1 };
        let base = line_starts(row.as_bytes(), self.mapper, self.width).len();
        if r == self.cursor_row {
            base.max(self.cursor_vline + 1)
        } else {
            base
        }
    }
}

/// Render column where each screen line of a wrapped row begins. Always
/// starts with 0.
///
/// Lines break every `width` columns, except that a glyph wider than one
/// column which would straddle the break starts the next line instead.
/// Tabs and glyphs wider than the whole line are still cut.
fn line_starts(bytes: &[u8], mapper: &CoordinateMapper, width: usize) -> Vec<usize> {
    let mut starts = vec![0];
    let mut start = 0;
    for glyph in mapper.glyphs(bytes) {
        while glyph.end_rx() > start + width {
            let movable = bytes[glyph.start] != b'\t' && glyph.rx > start && glyph.width <= width;
            start = if movable { glyph.rx } else { start + width };
            starts.push(start);
        }
    }
    starts
}

// ---------------------------------------------------------------------------
// Painting helpers
// ---------------------------------------------------------------------------

/// Render column of the cursor; 0 when parked past the last row.
fn cursor_rx(buf: &TextBuffer, cursor: &Cursor, mapper: &CoordinateMapper) -> usize {
    buf.row(cursor.row)
        .map_or(0, |row| mapper.cx_to_rx(row.as_bytes(), cursor.col))
}

fn push_spaces(line: &mut Line, n: usize) {
    for _ in 0..n {
        line.push_byte(b' ', Attr::empty());
    }
}

/// Paint the part of a row that falls in render columns `[lo, hi)`.
///
/// Glyphs cut by either edge are drawn as spaces for their visible part.
fn push_segment(line: &mut Line, bytes: &[u8], mapper: &CoordinateMapper, lo: usize, hi: usize) {
    for glyph in mapper.glyphs(bytes) {
        if glyph.end_rx() <= lo {
            continue;
        }
        if glyph.rx >= hi {
            break;
        }
        if glyph.rx >= lo && glyph.end_rx() <= hi {
            push_glyph(line, &bytes[glyph.start..glyph.start + glyph.len], glyph.width);
        } else {
            push_spaces(line, glyph.end_rx().min(hi) - glyph.rx.max(lo));
        }
    }
}

/// Paint one glyph into exactly `width` columns.
///
/// Tabs become spaces. Control bytes are shown in inverse video as the
/// letter `'@' + byte`, or `?` beyond Ctrl-Z. Multi-byte sequences that
/// don't decode, or whose real display width doesn't fit the column
/// budget, are shown as an inverse `?`.
fn push_glyph(line: &mut Line, bytes: &[u8], width: usize) {
    let lead = bytes[0];
    match lead {
        b'\t' => push_spaces(line, width),
        0x00..=0x1A => line.push_byte(b'@' + lead, Attr::INVERSE),
        0x1B..=0x1F | 0x7F => line.push_byte(b'?', Attr::INVERSE),
        0x20..=0x7E => line.push_byte(lead, Attr::empty()),
        _ => {
            let shown = std::str::from_utf8(bytes)
                .ok()
                .and_then(|s| s.chars().next())
                .and_then(UnicodeWidthChar::width)
                .filter(|&w| w > 0 && w <= width);
            match shown {
                Some(w) => {
                    line.push(bytes, Attr::empty());
                    push_spaces(line, width - w);
                }
                None => {
                    line.push_byte(b'?', Attr::INVERSE);
                    push_spaces(line, width.saturating_sub(1));
                }
            }
        }
    }
}

/// The inverse status line: `name[*]` on the left, `row,col` on the right.
fn draw_status(line: &mut Line, width: usize, buf: &TextBuffer, cursor: &Cursor) {
    let name = buf
        .filename()
        .map_or_else(|| "[New]".to_string(), |p| p.display().to_string());
    let mut left = clip_to_width(&name, STATUS_NAME_MAX).to_string();
    if buf.is_dirty() {
        left.push('*');
    }
    let left = clip_to_width(&left, width);
    let right = format!("{},{}", cursor.row + 1, cursor.col + 1);

    let used = str_width(left);
    line.push_str(left, Attr::INVERSE);
    if used + right.len() <= width {
        line.push_str(&" ".repeat(width - used - right.len()), Attr::INVERSE);
        line.push_str(&right, Attr::INVERSE);
    } else {
        line.push_str(&" ".repeat(width - used), Attr::INVERSE);
    }
}

/// Paint the bottom line. Returns the cursor column when a prompt is shown.
fn draw_bottom(line: &mut Line, width: usize, bottom: &BottomLine<'_>) -> Option<usize> {
    match *bottom {
        BottomLine::Empty => None,
        BottomLine::Message(msg) => {
            line.push_str(clip_to_width(msg, width), Attr::empty());
            None
        }
        BottomLine::Prompt {
            prefix,
            input,
            cursor,
        } => {
            let text = format!("{prefix}{input}");
            let at = prefix.len() + cursor.min(input.len());
            // Keep the cursor on screen when the input is wider than the line.
            let skip = if width > 0 && at >= width {
                at + 1 - width
            } else {
                0
            };
            let visible = text.get(skip..).unwrap_or("");
            line.push_str(clip_to_width(visible, width), Attr::empty());
            Some(at - skip)
        }
    }
}

fn to_cell(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
