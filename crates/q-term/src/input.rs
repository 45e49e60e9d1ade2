// SPDX-License-Identifier: MIT
//
// Terminal input parser.
//
// Turns raw stdin bytes into key events. quecto only enables plain raw
// mode, so the parser handles what a legacy terminal sends:
//
// - Legacy CSI sequences (arrows, editing keys) with xterm modifiers
// - SS3 sequences (arrows and Home/End in application cursor mode)
// - Control bytes (Ctrl+letter, Enter, Tab, Backspace)
// - Alt+key (ESC followed by a printable byte)
// - Everything else as raw bytes, one event per byte
//
// Bytes at or above 0x80 are not decoded into characters. The editor
// stores text as raw bytes, so each byte of a UTF-8 sequence arrives
// as its own `KeyCode::Byte` and is inserted verbatim.
//
// # Design
//
// The parser keeps a small byte buffer because escape sequences can
// span multiple `read()` calls. Feed bytes with [`Parser::advance`].
// After a poll timeout with no new bytes, call [`Parser::flush`] to
// emit a pending lone ESC as a real Escape keypress.

use bitflags::bitflags;

// ─── Event Types ────────────────────────────────────────────────────────────

/// A keyboard event with key identity and modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Which key was pressed.
    pub code: KeyCode,
    /// Active modifier keys (Shift, Alt, Ctrl).
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// A key with no modifiers.
    #[inline]
    #[must_use]
    pub const fn plain(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
        }
    }

    /// A key with explicit modifiers.
    #[inline]
    #[must_use]
    pub const fn with(code: KeyCode, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }

    /// Ctrl + the given letter (`b'q'` for Ctrl-Q).
    #[inline]
    #[must_use]
    pub const fn ctrl(letter: u8) -> Self {
        Self::with(KeyCode::Byte(letter), Modifiers::CTRL)
    }

    /// Whether this is Ctrl + `letter` with no other modifiers.
    #[inline]
    #[must_use]
    pub fn is_ctrl(&self, letter: u8) -> bool {
        self.modifiers == Modifiers::CTRL && self.code == KeyCode::Byte(letter)
    }
}

/// Identity of a key.
///
/// Named keys have dedicated variants; everything else is a raw
/// [`Byte`](KeyCode::Byte). A control byte is reported as the letter
/// it corresponds to together with [`Modifiers::CTRL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    /// A printable ASCII byte, a control letter, or one byte of a
    /// multi-byte UTF-8 sequence.
    Byte(u8),
    // ── Named keys ──────────────────────────────────────────────
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    // ── Navigation ──────────────────────────────────────────────
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
}

bitflags! {
    /// Keyboard modifier flags.
    ///
    /// Matches the xterm CSI modifier encoding where `param = 1 + bitmask`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const CTRL  = 0b0000_0100;
    }
}

// ─── Parser ─────────────────────────────────────────────────────────────────

/// Terminal input parser.
///
/// Feed raw bytes via [`advance`](Parser::advance) and collect
/// [`KeyEvent`]s. Incomplete sequences are buffered internally and
/// parsing resumes when more bytes arrive.
///
/// # Escape vs escape-sequence ambiguity
///
/// A bare `ESC` byte could be a standalone Escape keypress or the start
/// of a multi-byte sequence. The parser holds it as pending; the caller
/// waits for a poll timeout and then calls [`flush`](Parser::flush).
pub struct Parser {
    /// Accumulated raw bytes waiting to be parsed.
    buf: Vec<u8>,
}

impl Parser {
    /// Create a new parser with an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(64),
        }
    }

    /// Feed raw bytes from stdin and return all events that can be parsed.
    ///
    /// Bytes that form an incomplete sequence are kept and combined with
    /// the next call.
    pub fn advance(&mut self, data: &[u8]) -> Vec<KeyEvent> {
        self.buf.extend_from_slice(data);
        let mut events = Vec::new();
        let mut pos = 0;

        while pos < self.buf.len() {
            match try_parse(&self.buf[pos..]) {
                Parsed::Event(event, consumed) => {
                    events.push(event);
                    pos += consumed;
                }
                Parsed::Incomplete => break,
                Parsed::Skip(n) => pos += n,
            }
        }

        if pos > 0 {
            self.buf.drain(..pos);
        }

        events
    }

    /// Are there unconsumed bytes that might complete with more data?
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Flush pending bytes as literal key events.
    ///
    /// A lone ESC becomes [`KeyCode::Escape`]; any other leftover byte
    /// is reported the same way a single byte would be.
    pub fn flush(&mut self) -> Vec<KeyEvent> {
        let events = self
            .buf
            .iter()
            .map(|&byte| {
                if byte == 0x1B {
                    KeyEvent::plain(KeyCode::Escape)
                } else {
                    byte_event(byte)
                }
            })
            .collect();
        self.buf.clear();
        events
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Stateless Parsing Functions ────────────────────────────────────────────

/// Result of trying to parse one event from the buffer.
enum Parsed {
    /// Successfully parsed an event, consuming `usize` bytes.
    Event(KeyEvent, usize),
    /// Sequence is incomplete; need more bytes.
    Incomplete,
    /// Unrecognized sequence, skip `usize` bytes.
    Skip(usize),
}

/// Try to parse a single event from the start of `buf`.
fn try_parse(buf: &[u8]) -> Parsed {
    match buf.first() {
        None => Parsed::Skip(0),
        Some(0x1B) => parse_escape(buf),
        Some(&b) => Parsed::Event(byte_event(b), 1),
    }
}

/// Decode a single non-ESC byte.
const fn byte_event(b: u8) -> KeyEvent {
    match b {
        0x08 | 0x7F => KeyEvent::plain(KeyCode::Backspace),
        0x09 => KeyEvent::plain(KeyCode::Tab),
        0x0A | 0x0D => KeyEvent::plain(KeyCode::Enter),
        0x01..=0x1A => KeyEvent::ctrl(b + b'a' - 1),
        // NUL and 0x1C..=0x1F: Ctrl+@, Ctrl+\, Ctrl+], Ctrl+^, Ctrl+_.
        0x00 | 0x1B..=0x1F => KeyEvent::ctrl(b + b'@'),
        _ => KeyEvent::plain(KeyCode::Byte(b)),
    }
}

// ── Escape sequences ────────────────────────────────────────────────────────

fn parse_escape(buf: &[u8]) -> Parsed {
    debug_assert_eq!(buf[0], 0x1B);

    if buf.len() < 2 {
        return Parsed::Incomplete;
    }

    match buf[1] {
        b'[' => parse_csi(buf),
        b'O' => parse_ss3(buf),
        // Alt+printable character.
        b @ 0x20..=0x7E => Parsed::Event(KeyEvent::with(KeyCode::Byte(b), Modifiers::ALT), 2),
        // Unknown byte after ESC: emit standalone Escape, reparse the rest.
        _ => Parsed::Event(KeyEvent::plain(KeyCode::Escape), 1),
    }
}

// ── CSI (Control Sequence Introducer) ───────────────────────────────────────

fn parse_csi(buf: &[u8]) -> Parsed {
    debug_assert!(buf.len() >= 2 && buf[0] == 0x1B && buf[1] == b'[');

    // Scan for the final byte (0x40..=0x7E). Parameter bytes are
    // 0x30..=0x3F, intermediate bytes 0x20..=0x2F.
    let mut end = 2;
    while end < buf.len() {
        let b = buf[end];
        if (0x40..=0x7E).contains(&b) {
            break;
        }
        if !(0x20..=0x3F).contains(&b) {
            return Parsed::Skip(end + 1);
        }
        end += 1;
    }

    if end >= buf.len() {
        return Parsed::Incomplete;
    }

    let final_byte = buf[end];
    let params = parse_csi_params(&buf[2..end]);
    let consumed = end + 1;
    let modifiers = params
        .get(1)
        .map_or(Modifiers::empty(), |&p| decode_modifiers(p));

    // ── Tilde-terminated sequences (editing keys) ───────────────────
    if final_byte == b'~' {
        let code = match params.first().copied().unwrap_or(0) {
            1 | 7 => KeyCode::Home,
            3 => KeyCode::Delete,
            4 | 8 => KeyCode::End,
            5 => KeyCode::PageUp,
            6 => KeyCode::PageDown,
            _ => return Parsed::Skip(consumed),
        };
        return Parsed::Event(KeyEvent::with(code, modifiers), consumed);
    }

    // ── Letter-terminated sequences ─────────────────────────────────
    let event = match final_byte {
        b'A' => KeyEvent::with(KeyCode::Up, modifiers),
        b'B' => KeyEvent::with(KeyCode::Down, modifiers),
        b'C' => KeyEvent::with(KeyCode::Right, modifiers),
        b'D' => KeyEvent::with(KeyCode::Left, modifiers),
        b'H' => KeyEvent::with(KeyCode::Home, modifiers),
        b'F' => KeyEvent::with(KeyCode::End, modifiers),
        b'Z' => KeyEvent::with(KeyCode::Tab, Modifiers::SHIFT),
        _ => return Parsed::Skip(consumed),
    };

    Parsed::Event(event, consumed)
}

// ── SS3 (Single Shift 3) ───────────────────────────────────────────────────

fn parse_ss3(buf: &[u8]) -> Parsed {
    debug_assert!(buf.len() >= 2 && buf[0] == 0x1B && buf[1] == b'O');

    if buf.len() < 3 {
        return Parsed::Incomplete;
    }

    let code = match buf[2] {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        _ => return Parsed::Skip(3),
    };

    Parsed::Event(KeyEvent::plain(code), 3)
}

// ─── Helpers ────────────────────────────────────────────────────────────────

/// Parse semicolon-separated numeric CSI parameters.
///
/// Examples: `1;5` → `[1, 5]`, `3~` body `3` → `[3]`, empty → `[]`.
/// Colon sub-parameters are skipped.
fn parse_csi_params(raw: &[u8]) -> Vec<u16> {
    if raw.is_empty() {
        return Vec::new();
    }

    raw.split(|&b| b == b';')
        .map(|field| {
            field
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .fold(0u16, |acc, &d| {
                    acc.saturating_mul(10).saturating_add(u16::from(d - b'0'))
                })
        })
        .collect()
}

/// Decode an xterm modifier parameter into `Modifiers` bitflags.
///
/// The encoding is `1 + bitmask`. A parameter of 0 or 1 means none.
#[allow(clippy::cast_possible_truncation)]
const fn decode_modifiers(param: u16) -> Modifiers {
    let val = if param > 0 { param - 1 } else { 0 };
    Modifiers::from_bits_truncate(val as u8)
}

// ─── Tests ──────────────────────────────────────────────────────────────────
