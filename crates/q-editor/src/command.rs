//! Command prompt — the `>` line at the bottom of the screen.
//!
//! Ctrl-X opens the prompt. The user types a command, Enter runs it and
//! Escape cancels. The outcome is a [`CommandResult`] whose message goes
//! on the bottom line.
//!
//! # Supported commands
//!
//! | Command               | Action                                        |
//! |-----------------------|-----------------------------------------------|
//! | `w`                   | Save to the buffer's file                     |
//! | `q`                   | Quit (refused if the buffer is modified)      |
//! | `q!`                  | Quit, discarding changes                      |
//! | `wq`                  | Save, then quit if the save worked            |
//! | `N`                   | Go to line `N` (1-indexed, clamped)           |
//! | `r/pat/rep/flags`     | Regex replace over the whole buffer           |
//! | `set args`            | Change or show options                        |
//!
//! Anything else, including an empty line, is ignored.
//!
//! # Replace syntax
//!
//! Fields are separated by `/`; `\/` is a literal slash. With no `/` after
//! the pattern the command does nothing. With no `/` after the replacement
//! there are no flags. Flags are `g` (every match) and `i` (ignore case).

use crate::buffer::TextBuffer;
use crate::cursor::Cursor;
use crate::options::{Options, SetDirective, parse_set};
use crate::substitute::{SubFlags, substitute};

/// Text shown before the prompt input.
pub const PROMPT: &str = ">";

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// A parsed prompt command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `w` — save.
    Write,
    /// `q` — quit unless modified.
    Quit,
    /// `q!` — quit unconditionally.
    ForceQuit,
    /// `wq` — save and quit.
    WriteQuit,
    /// `N` — go to line `N` (1-indexed).
    GotoLine(usize),
    /// `r/pattern/replacement/flags` — regex replace.
    Substitute {
        pattern: String,
        replacement: String,
        flags: SubFlags,
    },
    /// `set ...` — option directives.
    Set(Vec<SetDirective>),
    /// Anything else. Holds the trimmed input.
    Unknown(String),
}

/// The result of executing a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Command succeeded. Optional message for the bottom line.
    Ok(Option<String>),
    /// Command failed. Message for the bottom line.
    Err(String),
    /// Editor should quit.
    Quit,
}

// ---------------------------------------------------------------------------
// CommandLine
// ---------------------------------------------------------------------------

/// The prompt's input buffer.
///
/// Only printable ASCII is accepted, so the cursor is both a char and a
/// byte offset. The `>` is not stored.
#[derive(Debug, Clone, Default)]
pub struct CommandLine {
    input: String,
    cursor: usize,
}

impl CommandLine {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            input: String::new(),
            cursor: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Insert a printable ASCII character at the cursor. Anything else is
    /// rejected and `false` returned.
    pub fn insert_char(&mut self, ch: char) -> bool {
        if !(ch == ' ' || ch.is_ascii_graphic()) {
            return false;
        }
        self.input.insert(self.cursor, ch);
        self.cursor += 1;
        true
    }

    /// Delete the character before the cursor.
    /// Returns `true` if a character was deleted.
    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.input.remove(self.cursor);
        true
    }

    /// Delete the character at the cursor.
    /// Returns `true` if a character was deleted.
    pub fn delete(&mut self) -> bool {
        if self.cursor >= self.input.len() {
            return false;
        }
        self.input.remove(self.cursor);
        true
    }

    pub const fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.input.len() {
            self.cursor += 1;
        }
    }

    pub const fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.input.len();
    }

    pub fn clear(&mut self) {
        self.input.clear();
        self.cursor = 0;
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }

    /// Parse the current input into a [`Command`].
    #[must_use]
    pub fn parse(&self) -> Command {
        parse_command(&self.input)
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse prompt input (without the `>`) into a [`Command`].
#[must_use]
pub fn parse_command(input: &str) -> Command {
    let trimmed = input.trim();

    match trimmed {
        "w" => return Command::Write,
        "q" => return Command::Quit,
        "q!" => return Command::ForceQuit,
        "wq" => return Command::WriteQuit,
        _ => {}
    }

    if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        // Numbers too large for usize still mean "the last line".
        let line = trimmed.parse().unwrap_or(usize::MAX);
        return Command::GotoLine(line);
    }

    if let Some(body) = trimmed.strip_prefix("r/") {
        return parse_substitute(body).unwrap_or_else(|| Command::Unknown(trimmed.to_string()));
    }

    if trimmed == "set" {
        return Command::Set(parse_set(""));
    }
    if let Some(args) = trimmed.strip_prefix("set ") {
        return Command::Set(parse_set(args));
    }

    Command::Unknown(trimmed.to_string())
}

/// Parse everything after `r/`. `None` when the pattern isn't terminated.
fn parse_substitute(body: &str) -> Option<Command> {
    let (pattern, rest) = split_at_unescaped(body, '/')?;

    let (replacement, flags) = split_at_unescaped(rest, '/').unwrap_or((rest, ""));

    Some(Command::Substitute {
        pattern: unescape_delim(pattern, '/'),
        replacement: unescape_delim(replacement, '/'),
        flags: SubFlags::parse(flags),
    })
}

/// Split a string at the first unescaped occurrence of `delim`.
///
/// `\<delim>` is an escaped delimiter and not a split point.
/// Returns `Some((before, after))` or `None` if there is no unescaped
/// delimiter.
fn split_at_unescaped(s: &str, delim: char) -> Option<(&str, &str)> {
    let mut escaped = false;
    for (byte_idx, ch) in s.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if ch == '\\' {
            escaped = true;
            continue;
        }
        if ch == delim {
            return Some((&s[..byte_idx], &s[byte_idx + ch.len_utf8()..]));
        }
    }
    None
}

/// `\<delim>` → `<delim>`. Other `\X` sequences pass through unchanged
/// for the regex engine.
fn unescape_delim(s: &str, delim: char) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\\' && chars.peek() == Some(&delim) {
            result.push(delim);
            chars.next();
            continue;
        }
        result.push(ch);
    }

    result
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

/// Run a command against the editor state.
///
/// The cursor is clamped afterwards, since a replacement can shorten the
/// row it sits on.
pub fn execute(
    cmd: &Command,
    buf: &mut TextBuffer,
    cursor: &mut Cursor,
    opts: &mut Options,
) -> CommandResult {
    tracing::debug!(?cmd, "execute");

    let result = match cmd {
        Command::Write => save(buf),
        Command::Quit => {
            if buf.is_dirty() {
                CommandResult::Err("Unsaved changes!".into())
            } else {
                CommandResult::Quit
            }
        }
        Command::ForceQuit => CommandResult::Quit,
        Command::WriteQuit => match save(buf) {
            CommandResult::Ok(_) => CommandResult::Quit,
            failed => failed,
        },
        Command::GotoLine(line) => {
            cursor.goto_line(buf, *line);
            CommandResult::Ok(None)
        }
        Command::Substitute {
            pattern,
            replacement,
            flags,
        } => match substitute(buf, pattern, replacement, *flags) {
            Ok(count) => CommandResult::Ok(Some(format!("Replaced {count} occurrences"))),
            Err(_) => CommandResult::Err("Error: Invalid Regex".into()),
        },
        Command::Set(directives) => match opts.apply_all(directives) {
            Ok(shown) => CommandResult::Ok(shown),
            Err(err) => CommandResult::Err(format!("Error: {err}")),
        },
        Command::Unknown(_) => CommandResult::Ok(None),
    };

    cursor.clamp(buf);
    result
}

fn save(buf: &mut TextBuffer) -> CommandResult {
    match buf.save() {
        Ok(bytes) => {
            let name = buf
                .filename()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            CommandResult::Ok(Some(format!("Saved to {name} ({bytes} bytes)")))
        }
        Err(err) => CommandResult::Err(format!("Error: {err}")),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
