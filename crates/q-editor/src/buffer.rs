//! Text buffer — the ordered rows of one file.
//!
//! A `TextBuffer` owns a `Vec<Row>` plus the file it is bound to and a
//! dirty flag. Every structural edit lives here: inserting and deleting
//! rows, inserting a byte, deleting a whole character backward or forward,
//! splitting a row at the cursor, and merging a row into its neighbor.
//!
//! # Design choices
//!
//! - **Columns are byte offsets.** The cursor's column indexes straight
//!   into the row's bytes and always sits on a character boundary. Bytes
//!   are inserted raw, one per keystroke, with no UTF-8 validation.
//!
//! - **Zero rows is not one empty row.** A fresh buffer has no rows and
//!   the cursor parks at row 0 (one past the end). The first inserted byte
//!   creates the row.
//!
//! - **Bounds violations are absorbed.** Deleting a row that doesn't exist
//!   or backspacing at the origin does nothing. Only load and save report
//!   errors.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::cursor::Cursor;
use crate::error::BufferError;
use crate::row::{Row, next_boundary, prev_boundary};

// ---------------------------------------------------------------------------
// TextBuffer
// ---------------------------------------------------------------------------

/// The rows of one file, with its name and dirty flag.
pub struct TextBuffer {
    rows: Vec<Row>,
    dirty: bool,
    filename: Option<PathBuf>,
}

impl TextBuffer {
    // -- Construction -------------------------------------------------------

    /// An empty buffer (zero rows) with no file name.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rows: Vec::new(),
            dirty: false,
            filename: None,
        }
    }

    /// Build a buffer from file content. See [`split_rows`] for the rules.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            rows: split_rows(bytes),
            dirty: false,
            filename: None,
        }
    }

    /// Load `path` into a new buffer bound to that path.
    ///
    /// A file that doesn't exist yet is not an error: the result is an
    /// empty buffer that will create the file on first save.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::Load`] if the file exists but cannot be read.
    pub fn open(path: &Path) -> Result<Self, BufferError> {
        let mut buffer = match fs::read(path) {
            Ok(bytes) => {
                let buffer = Self::from_bytes(&bytes);
                tracing::info!(
                    path = %path.display(),
                    rows = buffer.num_rows(),
                    bytes = bytes.len(),
                    "loaded file"
                );
                buffer
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "new file");
                Self::new()
            }
            Err(source) => {
                return Err(BufferError::Load {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        buffer.filename = Some(path.to_path_buf());
        Ok(buffer)
    }

    // -- Access -------------------------------------------------------------

    /// Number of rows. Zero for an empty buffer.
    #[inline]
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    #[must_use]
    pub fn row(&self, at: usize) -> Option<&Row> {
        self.rows.get(at)
    }

    #[inline]
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Byte length of row `at`, or 0 if it doesn't exist.
    #[inline]
    #[must_use]
    pub fn row_len(&self, at: usize) -> usize {
        self.rows.get(at).map_or(0, Row::len)
    }

    /// Mutable access for whole-buffer rewrites (substitution). The caller
    /// is responsible for calling [`mark_dirty`](Self::mark_dirty).
    pub(crate) fn rows_mut(&mut self) -> &mut [Row] {
        &mut self.rows
    }

    // -- Metadata -----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub const fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// The file this buffer saves to, if any.
    #[inline]
    #[must_use]
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    #[inline]
    pub fn set_filename(&mut self, path: PathBuf) {
        self.filename = Some(path);
    }

    // -- Row operations -----------------------------------------------------

    /// Insert a row holding `content` at `at`, clamped to `[0, num_rows]`.
    ///
    /// Content holding `\n` becomes one row per line, cut the same way a
    /// loaded file is, so no row ever carries a terminator.
    pub fn insert_row(&mut self, at: usize, content: &[u8]) {
        let at = at.min(self.rows.len());
        let lines = content.split(|&b| b == b'\n').map(strip_line_end);
        self.rows.splice(at..at, lines);
        self.dirty = true;
    }

    /// Remove row `at`. Out of range is a no-op.
    pub fn delete_row(&mut self, at: usize) {
        if at < self.rows.len() {
            self.rows.remove(at);
            self.dirty = true;
        }
    }

    // -- Editing at the cursor ----------------------------------------------

    /// Insert one raw byte at the cursor and advance past it.
    ///
    /// When the cursor is parked one past the last row, an empty row is
    /// appended first. `\n` splits the row like [`insert_newline`] and `\r`
    /// is dropped.
    ///
    /// [`insert_newline`]: Self::insert_newline
    pub fn insert_char(&mut self, cursor: &mut Cursor, byte: u8) {
        match byte {
            b'\n' => return self.insert_newline(cursor),
            b'\r' => return,
            _ => {}
        }
        if cursor.row >= self.rows.len() {
            self.insert_row(self.rows.len(), b"");
            cursor.row = self.rows.len() - 1;
        }
        let row = &mut self.rows[cursor.row];
        let col = cursor.col.min(row.len());
        row.insert_byte(col, byte);
        cursor.col = col + 1;
        self.dirty = true;
    }

    /// Split the row at the cursor and move to the start of the new row.
    ///
    /// At column 0 an empty row is inserted above instead, which leaves the
    /// current row intact.
    pub fn insert_newline(&mut self, cursor: &mut Cursor) {
        if cursor.col == 0 || cursor.row >= self.rows.len() {
            self.insert_row(cursor.row, b"");
        } else {
            let tail = self.rows[cursor.row].split_off(cursor.col);
            self.rows.insert(cursor.row + 1, tail);
            self.dirty = true;
        }
        cursor.row += 1;
        cursor.col = 0;
    }

    /// Delete the character before the cursor (Backspace).
    ///
    /// At column 0 of a later row the row is merged onto the previous one
    /// and the cursor lands at the join. Does nothing at the origin or
    /// when the cursor is parked past the last row.
    pub fn delete_backward(&mut self, cursor: &mut Cursor) {
        if cursor.row >= self.rows.len() || (cursor.row == 0 && cursor.col == 0) {
            return;
        }

        if cursor.col > 0 {
            let row = &mut self.rows[cursor.row];
            let col = cursor.col.min(row.len());
            let start = prev_boundary(row.as_bytes(), col);
            row.remove(start..col);
            cursor.col = start;
        } else {
            let current = self.rows.remove(cursor.row);
            let prev = &mut self.rows[cursor.row - 1];
            cursor.col = prev.len();
            prev.append(current.as_bytes());
            cursor.row -= 1;
        }
        self.dirty = true;
    }

    /// Delete the character under the cursor (Delete).
    ///
    /// At the end of a row the next row is merged onto this one. The
    /// cursor does not move. Does nothing past the last row or at the end
    /// of the last row.
    pub fn delete_forward(&mut self, cursor: &Cursor) {
        let Some(row) = self.rows.get_mut(cursor.row) else {
            return;
        };

        if cursor.col < row.len() {
            let end = next_boundary(row.as_bytes(), cursor.col);
            row.remove(cursor.col..end);
            self.dirty = true;
        } else if cursor.row + 1 < self.rows.len() {
            let next = self.rows.remove(cursor.row + 1);
            self.rows[cursor.row].append(next.as_bytes());
            self.dirty = true;
        }
    }

    // -- File I/O -----------------------------------------------------------

    /// The file content: every row followed by `\n`.
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        let total = self.rows.iter().map(|r| r.len() + 1).sum();
        let mut out = Vec::with_capacity(total);
        for row in &self.rows {
            out.extend_from_slice(row.as_bytes());
            out.push(b'\n');
        }
        out
    }

    /// Write the buffer to its file, creating or truncating it. Returns the
    /// number of bytes written and clears the dirty flag.
    ///
    /// # Errors
    ///
    /// [`BufferError::NoFileName`] if the buffer isn't bound to a file,
    /// [`BufferError::Save`] if the write fails. The dirty flag is left
    /// set on failure.
    pub fn save(&mut self) -> Result<usize, BufferError> {
        let path = self.filename.as_ref().ok_or(BufferError::NoFileName)?;
        let content = self.serialize();

        match fs::write(path, &content) {
            Ok(()) => {
                tracing::info!(path = %path.display(), bytes = content.len(), "saved");
                self.dirty = false;
                Ok(content.len())
            }
            Err(source) => {
                tracing::warn!(path = %path.display(), error = %source, "save failed");
                Err(BufferError::Save {
                    path: path.clone(),
                    source,
                })
            }
        }
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TextBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextBuffer")
            .field("rows", &self.rows.len())
            .field("dirty", &self.dirty)
            .field("filename", &self.filename)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Split file content into rows.
///
/// Lines are separated by `\n`. Trailing `\r` and `\n` bytes are stripped
/// from each line, so CRLF files load cleanly. A final terminator does not
/// produce an extra empty row, and empty input gives zero rows.
#[must_use]
pub fn split_rows(bytes: &[u8]) -> Vec<Row> {
    if bytes.is_empty() {
        return Vec::new();
    }
    let body = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    body.split(|&b| b == b'\n').map(strip_line_end).collect()
}

/// One line of content as a row, minus trailing `\r` bytes.
fn strip_line_end(line: &[u8]) -> Row {
    let end = line.iter().rposition(|&b| b != b'\r').map_or(0, |i| i + 1);
    Row::from_bytes(&line[..end])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn rows_of(buf: &TextBuffer) -> Vec<&[u8]> {
        buf.rows().iter().map(Row::as_bytes).collect()
    }

    fn buffer(text: &str) -> TextBuffer {
        TextBuffer::from_bytes(text.as_bytes())
    }

    // -- Construction -------------------------------------------------------

    #[test]
    fn new_buffer_has_zero_rows() {
        let buf = TextBuffer::new();
        assert_eq!(buf.num_rows(), 0);
        assert!(!buf.is_dirty());
        assert!(buf.filename().is_none());
        assert!(buf.serialize().is_empty());
    }

    #[test]
    fn final_terminator_is_optional() {
        assert_eq!(rows_of(&buffer("a\nb\n")), vec![b"a" as &[u8], b"b"]);
        assert_eq!(rows_of(&buffer("a\nb")), vec![b"a" as &[u8], b"b"]);
    }

    #[test]
    fn crlf_is_stripped() {
        assert_eq!(
            rows_of(&buffer("one\r\ntwo\r\n")),
            vec![b"one" as &[u8], b"two"]
        );
    }

    #[test]
    fn blank_lines_survive_load() {
        assert_eq!(
            rows_of(&buffer("a\n\n\nb\n")),
            vec![b"a" as &[u8], b"", b"", b"b"]
        );
        assert_eq!(rows_of(&buffer("\n")), vec![b"" as &[u8]]);
    }

    #[test]
    fn from_bytes_is_clean() {
        assert!(!buffer("x").is_dirty());
    }

    // -- Row operations -----------------------------------------------------

    #[test]
    fn insert_row_clamps_index() {
        let mut buf = buffer("a\nb");
        buf.insert_row(99, b"c");
        assert_eq!(rows_of(&buf), vec![b"a" as &[u8], b"b", b"c"]);
        assert!(buf.is_dirty());
    }

    #[test]
    fn delete_row_out_of_range_is_noop() {
        let mut buf = buffer("a");
        buf.delete_row(5);
        assert_eq!(buf.num_rows(), 1);
        assert!(!buf.is_dirty());
        buf.delete_row(0);
        assert_eq!(buf.num_rows(), 0);
        assert!(buf.is_dirty());
    }

    #[test]
    fn insert_row_splits_multiline_content() {
        let mut buf = buffer("top");
        buf.insert_row(1, b"one\r\ntwo\nthree\r");
        assert_eq!(
            rows_of(&buf),
            vec![b"top" as &[u8], b"one", b"two", b"three"]
        );
        let reloaded = TextBuffer::from_bytes(&buf.serialize());
        assert_eq!(rows_of(&reloaded), rows_of(&buf));
    }

    #[test]
    fn insert_empty_row() {
        let mut buf = buffer("a");
        buf.insert_row(0, b"");
        assert_eq!(rows_of(&buf), vec![b"" as &[u8], b"a"]);
    }

    // -- insert_char --------------------------------------------------------

    #[test]
    fn insert_into_empty_buffer_creates_row() {
        let mut buf = TextBuffer::new();
        let mut cur = Cursor::ORIGIN;
        buf.insert_char(&mut cur, b'h');
        buf.insert_char(&mut cur, b'i');
        assert_eq!(rows_of(&buf), vec![b"hi" as &[u8]]);
        assert_eq!(cur, Cursor::new(0, 2));
        assert!(buf.is_dirty());
    }

    #[test]
    fn insert_in_middle() {
        let mut buf = buffer("ac");
        let mut cur = Cursor::new(0, 1);
        buf.insert_char(&mut cur, b'b');
        assert_eq!(rows_of(&buf), vec![b"abc" as &[u8]]);
        assert_eq!(cur.col, 2);
    }

    #[test]
    fn insert_raw_utf8_bytes() {
        let mut buf = TextBuffer::new();
        let mut cur = Cursor::ORIGIN;
        for &b in "é".as_bytes() {
            buf.insert_char(&mut cur, b);
        }
        assert_eq!(buf.row(0).unwrap().as_bytes(), "é".as_bytes());
        assert_eq!(cur.col, 2);
    }

    #[test]
    fn insert_line_feed_splits_row() {
        let mut buf = buffer("ab");
        let mut cur = Cursor::new(0, 1);
        buf.insert_char(&mut cur, b'\n');
        assert_eq!(rows_of(&buf), vec![b"a" as &[u8], b"b"]);
        assert_eq!(cur, Cursor::new(1, 0));

        let reloaded = TextBuffer::from_bytes(&buf.serialize());
        assert_eq!(rows_of(&reloaded), rows_of(&buf));
    }

    #[test]
    fn insert_carriage_return_is_dropped() {
        let mut buf = buffer("ab");
        let mut cur = Cursor::new(0, 2);
        buf.insert_char(&mut cur, b'\r');
        assert_eq!(rows_of(&buf), vec![b"ab" as &[u8]]);
        assert_eq!(cur, Cursor::new(0, 2));
        assert!(!buf.is_dirty());
    }

    // -- insert_newline -----------------------------------------------------

    #[test]
    fn newline_splits_row() {
        let mut buf = buffer("abcdef");
        let mut cur = Cursor::new(0, 3);
        buf.insert_newline(&mut cur);
        assert_eq!(rows_of(&buf), vec![b"abc" as &[u8], b"def"]);
        assert_eq!(cur, Cursor::new(1, 0));
    }

    #[test]
    fn newline_at_column_zero_inserts_above() {
        let mut buf = buffer("abc");
        let mut cur = Cursor::new(0, 0);
        buf.insert_newline(&mut cur);
        assert_eq!(rows_of(&buf), vec![b"" as &[u8], b"abc"]);
        assert_eq!(cur, Cursor::new(1, 0));
    }

    #[test]
    fn newline_at_end_of_row_adds_empty_row() {
        let mut buf = buffer("abc");
        let mut cur = Cursor::new(0, 3);
        buf.insert_newline(&mut cur);
        assert_eq!(rows_of(&buf), vec![b"abc" as &[u8], b""]);
    }

    #[test]
    fn newline_in_empty_buffer() {
        let mut buf = TextBuffer::new();
        let mut cur = Cursor::ORIGIN;
        buf.insert_newline(&mut cur);
        assert_eq!(buf.num_rows(), 1);
        assert_eq!(cur, Cursor::new(1, 0));
    }

    // -- delete_backward ----------------------------------------------------

    #[test]
    fn backspace_at_origin_is_noop() {
        let mut buf = buffer("abc");
        let mut cur = Cursor::ORIGIN;
        buf.delete_backward(&mut cur);
        assert_eq!(rows_of(&buf), vec![b"abc" as &[u8]]);
        assert!(!buf.is_dirty());
    }

    #[test]
    fn backspace_past_last_row_is_noop() {
        let mut buf = buffer("abc");
        let mut cur = Cursor::new(1, 0);
        buf.delete_backward(&mut cur);
        assert_eq!(rows_of(&buf), vec![b"abc" as &[u8]]);
        assert_eq!(cur, Cursor::new(1, 0));
    }

    #[test]
    fn backspace_at_column_zero_merges_rows() {
        let mut buf = buffer("abc\ndef");
        let mut cur = Cursor::new(1, 0);
        buf.delete_backward(&mut cur);
        assert_eq!(rows_of(&buf), vec![b"abcdef" as &[u8]]);
        assert_eq!(cur, Cursor::new(0, 3));
    }

    #[test]
    fn backspace_removes_whole_multibyte_char() {
        let mut buf = buffer("a日");
        let mut cur = Cursor::new(0, 4);
        buf.delete_backward(&mut cur);
        assert_eq!(rows_of(&buf), vec![b"a" as &[u8]]);
        assert_eq!(cur.col, 1);
    }

    #[test]
    fn three_backspaces_empty_three_cjk_chars() {
        let mut buf = buffer("日本語");
        let mut cur = Cursor::new(0, 9);
        for expected in [6, 3, 0] {
            buf.delete_backward(&mut cur);
            assert_eq!(buf.row_len(0), expected);
            assert_eq!(cur.col, expected);
        }
        assert_eq!(rows_of(&buf), vec![b"" as &[u8]]);
    }

    // -- delete_forward -----------------------------------------------------

    #[test]
    fn delete_forward_removes_char_under_cursor() {
        let mut buf = buffer("a日b");
        let cur = Cursor::new(0, 1);
        buf.delete_forward(&cur);
        assert_eq!(rows_of(&buf), vec![b"ab" as &[u8]]);
    }

    #[test]
    fn delete_forward_at_end_merges_next_row() {
        let mut buf = buffer("abc\ndef");
        let cur = Cursor::new(0, 3);
        buf.delete_forward(&cur);
        assert_eq!(rows_of(&buf), vec![b"abcdef" as &[u8]]);
    }

    #[test]
    fn delete_forward_at_end_of_last_row_is_noop() {
        let mut buf = buffer("abc");
        buf.delete_forward(&Cursor::new(0, 3));
        buf.delete_forward(&Cursor::new(4, 0));
        assert_eq!(rows_of(&buf), vec![b"abc" as &[u8]]);
        assert!(!buf.is_dirty());
    }

    #[test]
    fn delete_forward_undoes_insert() {
        let mut buf = buffer("hello");
        let mut cur = Cursor::new(0, 2);
        buf.insert_char(&mut cur, b'X');
        let back = Cursor::new(0, 2);
        buf.delete_forward(&back);
        assert_eq!(rows_of(&buf), vec![b"hello" as &[u8]]);
    }

    // -- Serialize ----------------------------------------------------------

    #[test]
    fn serialize_terminates_every_row() {
        let buf = buffer("a\n\nbc");
        assert_eq!(buf.serialize(), b"a\n\nbc\n");
        let total: usize = buf.rows().iter().map(Row::len).sum();
        assert_eq!(buf.serialize().len(), total + buf.num_rows());
    }

    #[test]
    fn edits_survive_serialize_and_reload() {
        let mut buf = buffer("first\nsecond\nthird");
        let mut cur = Cursor::new(1, 3);
        buf.insert_newline(&mut cur);
        buf.insert_char(&mut cur, b'!');
        buf.delete_backward(&mut Cursor::new(3, 0));
        buf.delete_forward(&Cursor::new(0, 0));

        let reloaded = TextBuffer::from_bytes(&buf.serialize());
        assert_eq!(rows_of(&reloaded), rows_of(&buf));
    }

    // -- Properties ---------------------------------------------------------

    #[derive(Debug, Clone)]
    enum Edit {
        Insert(u8),
        Newline,
        Backspace,
        Delete,
        MoveTo(usize, usize),
    }

    fn edit() -> impl Strategy<Value = Edit> {
        prop_oneof![
            4 => any::<u8>().prop_map(Edit::Insert),
            4 => prop::sample::select(vec![b'a', b'\t', b' ', 0xC3, 0xA9, 0xE6, 0x97, 0xA5])
                .prop_map(Edit::Insert),
            1 => Just(Edit::Newline),
            2 => Just(Edit::Backspace),
            2 => Just(Edit::Delete),
            2 => (0..8usize, 0..12usize).prop_map(|(r, c)| Edit::MoveTo(r, c)),
        ]
    }

    /// A line of file content: any bytes except terminators.
    fn line() -> impl Strategy<Value = Vec<u8>> {
        let byte = any::<u8>().prop_filter("terminator", |b| *b != b'\n' && *b != b'\r');
        prop::collection::vec(byte, 0..12)
    }

    fn apply(buf: &mut TextBuffer, cur: &mut Cursor, edit: &Edit) {
        match *edit {
            Edit::Insert(byte) => buf.insert_char(cur, byte),
            Edit::Newline => buf.insert_newline(cur),
            Edit::Backspace => buf.delete_backward(cur),
            Edit::Delete => buf.delete_forward(cur),
            Edit::MoveTo(row, col) => *cur = Cursor::new(row, col),
        }
        cur.clamp(buf);
    }

    proptest! {
        /// Any edit sequence survives serialize then reload unchanged.
        #[test]
        fn edit_sequences_survive_reload(
            lines in prop::collection::vec(line(), 0..5),
            edits in prop::collection::vec(edit(), 0..40),
        ) {
            let mut buf = TextBuffer::new();
            for (i, l) in lines.iter().enumerate() {
                buf.insert_row(i, l);
            }
            let mut cur = Cursor::ORIGIN;
            for e in &edits {
                apply(&mut buf, &mut cur, e);
            }

            for row in buf.rows() {
                prop_assert!(!row.as_bytes().contains(&b'\n'));
                prop_assert!(!row.as_bytes().contains(&b'\r'));
            }
            let reloaded = TextBuffer::from_bytes(&buf.serialize());
            prop_assert_eq!(rows_of(&reloaded), rows_of(&buf));
        }

        /// Inserting a byte then deleting forward at the same boundary
        /// restores the row.
        #[test]
        fn insert_then_delete_forward_restores_row(
            text in "[a-z\t ]{0,20}",
            at in 0..=20usize,
            byte in prop::sample::select(vec![b'x', b'\t', b' ', b'~', 0x01]),
        ) {
            let mut buf = buffer(&text);
            let col = at.min(text.len());
            let mut cur = Cursor::new(0, col);
            buf.insert_char(&mut cur, byte);
            buf.delete_forward(&Cursor::new(0, col));
            prop_assert_eq!(buf.row(0).map_or(&[][..], Row::as_bytes), text.as_bytes());
        }
    }

    // -- File I/O -----------------------------------------------------------

    #[test]
    fn open_missing_file_is_empty_and_bound() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.txt");
        let buf = TextBuffer::open(&path).unwrap();
        assert_eq!(buf.num_rows(), 0);
        assert_eq!(buf.filename(), Some(path.as_path()));
        assert!(!buf.is_dirty());
    }

    #[test]
    fn open_directory_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = TextBuffer::open(dir.path()).unwrap_err();
        assert!(matches!(err, BufferError::Load { .. }));
    }

    #[test]
    fn save_and_reopen_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.txt");
        fs::write(&path, "one\r\ntwo").unwrap();

        let mut buf = TextBuffer::open(&path).unwrap();
        let mut cur = Cursor::new(1, 3);
        buf.insert_char(&mut cur, b'!');
        assert!(buf.is_dirty());

        assert_eq!(buf.save().unwrap(), 9);
        assert!(!buf.is_dirty());
        assert_eq!(fs::read(&path).unwrap(), b"one\ntwo!\n");

        let reopened = TextBuffer::open(&path).unwrap();
        assert_eq!(rows_of(&reopened), rows_of(&buf));
    }

    #[test]
    fn save_truncates_longer_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.txt");
        fs::write(&path, "a much longer original file\n").unwrap();

        let mut buf = TextBuffer::from_bytes(b"short");
        buf.set_filename(path.clone());
        buf.save().unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"short\n");
    }

    #[test]
    fn save_without_filename_errors() {
        let mut buf = buffer("x");
        buf.mark_dirty();
        assert!(matches!(buf.save(), Err(BufferError::NoFileName)));
        assert!(buf.is_dirty());
    }

    #[test]
    fn save_failure_keeps_dirty() {
        let dir = tempfile::tempdir().unwrap();
        let mut buf = buffer("x");
        buf.set_filename(dir.path().join("missing").join("file.txt"));
        buf.mark_dirty();
        assert!(matches!(buf.save(), Err(BufferError::Save { .. })));
        assert!(buf.is_dirty());
    }

    #[test]
    fn debug_format_is_summary() {
        let debug = format!("{:?}", buffer("a\nb"));
        assert!(debug.contains("TextBuffer"));
        assert!(debug.contains("rows: 2"));
    }
}
