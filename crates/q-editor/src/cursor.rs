//! Cursor — the editing position and its movement.
//!
//! A `Cursor` is a plain `(row, col)` pair where `col` is a **byte offset**
//! into the row. Movement methods take the buffer as a parameter and keep
//! two invariants:
//!
//! - `col` never exceeds the row length and never points at a UTF-8
//!   continuation byte;
//! - `row` is at most `num_rows`. It equals `num_rows` only when the cursor
//!   is parked past the last row, as in an empty buffer.
//!
//! Horizontal moves step over whole characters. Vertical moves keep the
//! byte column and snap it back onto the new row.

use crate::buffer::TextBuffer;
use crate::row::{next_boundary, prev_boundary, snap_to_boundary};

/// An editing position: row index and byte column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub row: usize,
    pub col: usize,
}

impl Cursor {
    /// Row 0, column 0.
    pub const ORIGIN: Self = Self { row: 0, col: 0 };

    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    // -- Horizontal ---------------------------------------------------------

    /// One whole character left. Stops at column 0 (no wrap).
    pub fn move_left(&mut self, buf: &TextBuffer) {
        if self.col == 0 {
            return;
        }
        let bytes = buf.row(self.row).map_or(&[][..], |r| r.as_bytes());
        self.col = prev_boundary(bytes, self.col);
    }

    /// One whole character right. At the end of a row, wraps to the start
    /// of the next row if there is one.
    pub fn move_right(&mut self, buf: &TextBuffer) {
        let len = buf.row_len(self.row);
        if self.row < buf.num_rows() && self.col < len {
            let bytes = buf.row(self.row).map_or(&[][..], |r| r.as_bytes());
            self.col = next_boundary(bytes, self.col);
        } else if self.row + 1 < buf.num_rows() {
            self.row += 1;
            self.col = 0;
        }
    }

    /// Start of the row.
    pub const fn home(&mut self) {
        self.col = 0;
    }

    /// End of the row. No-op when parked past the last row.
    pub fn end(&mut self, buf: &TextBuffer) {
        if let Some(row) = buf.row(self.row) {
            self.col = row.len();
        }
    }

    // -- Vertical -----------------------------------------------------------

    /// One row up, keeping the byte column where the new row allows.
    pub fn move_up(&mut self, buf: &TextBuffer) {
        if self.row > 0 {
            self.row -= 1;
        }
        self.clamp(buf);
    }

    /// One row down. Never moves onto the parked position past the end.
    pub fn move_down(&mut self, buf: &TextBuffer) {
        if self.row + 1 < buf.num_rows() {
            self.row += 1;
        }
        self.clamp(buf);
    }

    /// `rows` rows up.
    pub fn page_up(&mut self, buf: &TextBuffer, rows: usize) {
        self.row = self.row.saturating_sub(rows);
        self.clamp(buf);
    }

    /// `rows` rows down, stopping at the last row.
    pub fn page_down(&mut self, buf: &TextBuffer, rows: usize) {
        let last = buf.num_rows().saturating_sub(1);
        if self.row < last {
            self.row = self.row.saturating_add(rows).min(last);
        }
        self.clamp(buf);
    }

    /// Jump to 1-indexed `line`, clamped to `[1, num_rows]`, column 0.
    /// An empty buffer leaves the cursor at the origin.
    pub fn goto_line(&mut self, buf: &TextBuffer, line: usize) {
        let last = buf.num_rows().saturating_sub(1);
        self.row = line.saturating_sub(1).min(last);
        self.col = 0;
    }

    // -- Clamping -----------------------------------------------------------

    /// Pull the cursor back inside the buffer after an edit that may have
    /// shortened its row or removed rows.
    pub fn clamp(&mut self, buf: &TextBuffer) {
        self.row = self.row.min(buf.num_rows());
        let bytes = buf.row(self.row).map_or(&[][..], |r| r.as_bytes());
        self.col = snap_to_boundary(bytes, self.col);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
