// SPDX-License-Identifier: MIT
//
// quecto — a minimalist, screen-oriented terminal text editor.
//
// This is the main binary that wires the two crates together:
//
//   q-term   → raw mode, key decoding, polling reader, frame writer, event loop
//   q-editor → rows, buffer, cursor, layout, commands, options
//
// The Editor struct implements q-term's App trait. Each keypress flows
// through:
//
//   stdin → parser → on_event → prompt or edit dispatch → buffer/cursor
//   paint → viewport.render → RenderFrame → frame writer → terminal
//
// Layout:
//
//   ┌──────────────────────────────┐
//   │ text area + gutter           │  ← rows - 2
//   ├──────────────────────────────┤
//   │ status line (INVERSE)        │  ← 1 row
//   ├──────────────────────────────┤
//   │ message / `>` prompt         │  ← 1 row
//   └──────────────────────────────┘

use std::env;
use std::error::Error;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Mutex;

use q_editor::buffer::TextBuffer;
use q_editor::command::{self, Command, CommandLine, CommandResult, PROMPT};
use q_editor::cursor::Cursor;
use q_editor::layout::{BottomLine, Viewport};
use q_editor::options::Options;

use q_term::event_loop::{Action, App, EventLoop};
use q_term::frame::RenderFrame;
use q_term::input::{KeyCode, KeyEvent, Modifiers};
use q_term::terminal::Size;

/// Shown on the first Ctrl-Q with unsaved changes.
const QUIT_WARNING: &str = "Unsaved changes! Press Ctrl+Q again.";

/// Environment variable naming the log file.
const LOG_ENV: &str = "QUECTO_LOG";

const USAGE: &str = "\
usage: quecto [--wrap|-w] [--tabstop N] [FILE]

  -w, --wrap       soft-wrap long lines
      --tabstop N  columns between tab stops (1-16, default 4)
  -h, --help       show this help

keys: Ctrl-S save, Ctrl-X command prompt, Ctrl-Q quit";

// ─── Editor ─────────────────────────────────────────────────────────────────

/// The whole editing session: one buffer, its cursor and the screen state.
struct Editor {
    buffer: TextBuffer,
    cursor: Cursor,
    viewport: Viewport,
    options: Options,

    /// The `>` prompt while it is open.
    prompt: Option<CommandLine>,

    /// Transient message for the bottom line. Stays until replaced.
    message: Option<String>,

    /// Set by a Ctrl-Q that was refused because of unsaved changes. The
    /// next key decides: another Ctrl-Q quits, anything else disarms.
    quit_armed: bool,
}

impl Editor {
    fn new(buffer: TextBuffer, options: Options, size: Size) -> Self {
        let mut viewport = Viewport::new(size.rows, size.cols);
        viewport.set_mode(options.layout_mode());
        Self {
            buffer,
            cursor: Cursor::ORIGIN,
            viewport,
            options,
            prompt: None,
            message: None,
            quit_armed: false,
        }
    }

    fn set_message(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
    }

    // ── Edit keys ───────────────────────────────────────────────────────

    fn handle_edit_key(&mut self, event: &KeyEvent) -> Action {
        let armed = std::mem::take(&mut self.quit_armed);

        if event.modifiers.contains(Modifiers::CTRL) {
            if let KeyCode::Byte(letter) = event.code {
                return self.handle_control(letter, armed);
            }
        }
        if event.modifiers.contains(Modifiers::ALT) {
            return Action::Continue;
        }

        let buf = &mut self.buffer;
        let cur = &mut self.cursor;
        match event.code {
            KeyCode::Byte(byte) => buf.insert_char(cur, byte),
            KeyCode::Tab => buf.insert_char(cur, b'\t'),
            KeyCode::Enter => buf.insert_newline(cur),
            KeyCode::Backspace => buf.delete_backward(cur),
            KeyCode::Delete => buf.delete_forward(cur),
            KeyCode::Up => cur.move_up(buf),
            KeyCode::Down => cur.move_down(buf),
            KeyCode::Left => cur.move_left(buf),
            KeyCode::Right => cur.move_right(buf),
            KeyCode::Home => cur.home(),
            KeyCode::End => cur.end(buf),
            KeyCode::PageUp => cur.page_up(buf, self.viewport.screen_rows()),
            KeyCode::PageDown => cur.page_down(buf, self.viewport.screen_rows()),
            KeyCode::Escape => {}
        }
        Action::Continue
    }

    fn handle_control(&mut self, letter: u8, armed: bool) -> Action {
        match letter {
            b'q' => return self.quit(armed),
            b's' => return self.run_command(&Command::Write),
            b'x' => self.prompt = Some(CommandLine::new()),
            _ => {}
        }
        Action::Continue
    }

    fn quit(&mut self, armed: bool) -> Action {
        if armed || !self.buffer.is_dirty() {
            tracing::info!(discarded = self.buffer.is_dirty(), "quit");
            return Action::Quit;
        }
        self.quit_armed = true;
        self.set_message(QUIT_WARNING);
        Action::Continue
    }

    // ── Prompt keys ─────────────────────────────────────────────────────

    fn handle_prompt_key(&mut self, event: &KeyEvent) -> Action {
        let Some(prompt) = self.prompt.as_mut() else {
            return Action::Continue;
        };
        if event
            .modifiers
            .intersects(Modifiers::CTRL | Modifiers::ALT)
        {
            return Action::Continue;
        }

        match event.code {
            KeyCode::Escape => self.prompt = None,
            KeyCode::Enter if !prompt.is_empty() => {
                let cmd = prompt.parse();
                self.prompt = None;
                return self.run_command(&cmd);
            }
            KeyCode::Byte(byte) => {
                prompt.insert_char(char::from(byte));
            }
            KeyCode::Backspace => {
                prompt.backspace();
            }
            KeyCode::Delete => {
                prompt.delete();
            }
            KeyCode::Left => prompt.move_left(),
            KeyCode::Right => prompt.move_right(),
            KeyCode::Home => prompt.move_home(),
            KeyCode::End => prompt.move_end(),
            _ => {}
        }
        Action::Continue
    }

    fn run_command(&mut self, cmd: &Command) -> Action {
        let result = command::execute(cmd, &mut self.buffer, &mut self.cursor, &mut self.options);
        match result {
            CommandResult::Ok(msg) => {
                if let Some(msg) = msg {
                    self.set_message(msg);
                }
                Action::Continue
            }
            CommandResult::Err(msg) => {
                self.set_message(msg);
                Action::Continue
            }
            CommandResult::Quit => Action::Quit,
        }
    }
}

impl App for Editor {
    fn on_event(&mut self, event: &KeyEvent) -> Action {
        if self.prompt.is_some() {
            return self.handle_prompt_key(event);
        }
        let action = self.handle_edit_key(event);
        self.cursor.clamp(&self.buffer);
        action
    }

    fn on_resize(&mut self, size: Size) {
        self.viewport.resize(size.rows, size.cols);
    }

    fn paint(&mut self, frame: &mut RenderFrame) {
        self.viewport.set_mode(self.options.layout_mode());
        let mapper = self.options.mapper();

        let bottom = match &self.prompt {
            Some(prompt) => BottomLine::Prompt {
                prefix: PROMPT,
                input: prompt.input(),
                cursor: prompt.cursor(),
            },
            None => self
                .message
                .as_deref()
                .map_or(BottomLine::Empty, BottomLine::Message),
        };

        self.viewport
            .render(frame, &self.buffer, &self.cursor, &mapper, &bottom);
    }
}

// ─── Command line ───────────────────────────────────────────────────────────

/// Parsed command-line arguments.
#[derive(Debug, Default, PartialEq, Eq)]
struct CliArgs {
    wrap: bool,
    tab_stop: Option<usize>,
    file: Option<PathBuf>,
    help: bool,
}

impl CliArgs {
    fn options(&self) -> Result<Options, Box<dyn Error>> {
        let mut options = Options::new();
        options.set_wrap(self.wrap);
        if let Some(tab_stop) = self.tab_stop {
            options.set_tab_stop(tab_stop)?;
        }
        Ok(options)
    }
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<CliArgs, String> {
    let mut cli = CliArgs::default();
    let mut args = args.into_iter();
    let mut only_files = false;

    while let Some(arg) = args.next() {
        if only_files || arg == "-" || !arg.starts_with('-') {
            if cli.file.is_some() {
                return Err(format!("unexpected argument: {arg}"));
            }
            cli.file = Some(PathBuf::from(arg));
            continue;
        }

        match arg.as_str() {
            "--" => only_files = true,
            "-w" | "--wrap" => cli.wrap = true,
            "-h" | "--help" => cli.help = true,
            "--tabstop" => {
                let value = args
                    .next()
                    .ok_or_else(|| "--tabstop needs a value".to_string())?;
                cli.tab_stop = Some(parse_tab_stop(&value)?);
            }
            _ => match arg.strip_prefix("--tabstop=") {
                Some(value) => cli.tab_stop = Some(parse_tab_stop(value)?),
                None => return Err(format!("unknown option: {arg}")),
            },
        }
    }

    Ok(cli)
}

fn parse_tab_stop(value: &str) -> Result<usize, String> {
    value
        .parse()
        .map_err(|_| format!("invalid tab stop: {value}"))
}

// ─── Logging ────────────────────────────────────────────────────────────────

/// Send `tracing` output to the file named by `QUECTO_LOG`, if set.
///
/// The terminal is in raw mode while the editor runs, so logs never go to
/// stdout or stderr.
fn init_logging() -> Result<(), Box<dyn Error>> {
    let Some(path) = env::var_os(LOG_ENV) else {
        return Ok(());
    };
    let file = File::create(&path)
        .map_err(|e| format!("cannot open log file {}: {e}", Path::new(&path).display()))?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .map_err(|e| format!("cannot install logger: {e}"))?;
    Ok(())
}

// ─── Entry point ────────────────────────────────────────────────────────────

fn run() -> Result<(), Box<dyn Error>> {
    let cli = parse_args(env::args().skip(1))?;
    if cli.help {
        println!("{USAGE}");
        return Ok(());
    }

    init_logging()?;
    let options = cli.options()?;

    let buffer = match &cli.file {
        Some(path) => TextBuffer::open(path)?,
        None => TextBuffer::new(),
    };

    let mut event_loop =
        EventLoop::new().map_err(|e| format!("failed to initialize terminal: {e}"))?;
    tracing::info!(size = ?event_loop.size(), file = ?cli.file, "starting");

    let mut editor = Editor::new(buffer, options, event_loop.size());
    event_loop.run(&mut editor)?;
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        tracing::error!(error = %e, "fatal");
        eprintln!("quecto: {e}");
        process::exit(1);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::fs;

    use q_editor::layout::LayoutMode;
    use q_term::event_loop::dispatch;

    use super::*;

    // ── Helpers ─────────────────────────────────────────────────────────

    const SIZE: Size = Size { cols: 80, rows: 24 };

    /// A printable key.
    fn press(ch: char) -> KeyEvent {
        let mut utf8 = [0; 4];
        assert_eq!(ch.encode_utf8(&mut utf8).len(), 1, "press() takes ASCII");
        KeyEvent::plain(KeyCode::Byte(utf8[0]))
    }

    /// Ctrl + letter.
    fn ctrl(letter: char) -> KeyEvent {
        KeyEvent::ctrl(letter.to_ascii_lowercase() as u8)
    }

    /// A named key.
    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::plain(code)
    }

    /// The raw bytes of `s`, one event each, the way the parser delivers them.
    fn typed(s: &str) -> Vec<KeyEvent> {
        s.bytes().map(|b| KeyEvent::plain(KeyCode::Byte(b))).collect()
    }

    fn feed(e: &mut Editor, events: &[KeyEvent]) -> Action {
        dispatch(e, events)
    }

    fn editor_with(text: &str) -> Editor {
        Editor::new(TextBuffer::from_bytes(text.as_bytes()), Options::new(), SIZE)
    }

    fn rows(e: &Editor) -> Vec<String> {
        e.buffer
            .rows()
            .iter()
            .map(|r| String::from_utf8_lossy(r.as_bytes()).into_owned())
            .collect()
    }

    fn paint(e: &mut Editor) -> RenderFrame {
        let mut frame = RenderFrame::new(SIZE.cols, SIZE.rows);
        e.paint(&mut frame);
        frame
    }

    fn line_text(frame: &RenderFrame, y: usize) -> String {
        String::from_utf8_lossy(&frame.line(y).unwrap().text()).into_owned()
    }

    // ── Typing ──────────────────────────────────────────────────────────

    #[test]
    fn typing_into_empty_buffer() {
        let mut e = editor_with("");
        feed(&mut e, &typed("hi"));
        assert_eq!(rows(&e), ["hi"]);
        assert_eq!(e.cursor, Cursor::new(0, 2));
        assert!(e.buffer.is_dirty());
    }

    #[test]
    fn enter_splits_and_tab_inserts() {
        let mut e = editor_with("");
        feed(&mut e, &typed("ab"));
        feed(&mut e, &[key(KeyCode::Left), key(KeyCode::Enter), key(KeyCode::Tab)]);
        assert_eq!(rows(&e), ["a", "\tb"]);
        assert_eq!(e.cursor, Cursor::new(1, 1));
    }

    #[test]
    fn backspace_at_row_start_merges() {
        let mut e = editor_with("abc\ndef");
        e.cursor = Cursor::new(1, 0);
        feed(&mut e, &[key(KeyCode::Backspace)]);
        assert_eq!(rows(&e), ["abcdef"]);
        assert_eq!(e.cursor, Cursor::new(0, 3));
    }

    #[test]
    fn multibyte_typed_byte_by_byte() {
        let mut e = editor_with("");
        feed(&mut e, &typed("日本語"));
        assert_eq!(e.buffer.row_len(0), 9);
        assert_eq!(e.cursor.col, 9);

        feed(&mut e, &[key(KeyCode::Backspace)]);
        assert_eq!(rows(&e), ["日本"]);
        feed(&mut e, &[key(KeyCode::Backspace), key(KeyCode::Backspace)]);
        assert_eq!(rows(&e), [""]);
    }

    #[test]
    fn ctrl_h_is_backspace() {
        // The parser maps 0x08 to Backspace; check the editor treats it so.
        let mut parser = q_term::input::Parser::new();
        let events = parser.advance(b"ab\x08");
        let mut e = editor_with("");
        feed(&mut e, &events);
        assert_eq!(rows(&e), ["a"]);
    }

    #[test]
    fn delete_forward_merges_next_row() {
        let mut e = editor_with("ab\ncd");
        e.cursor = Cursor::new(0, 2);
        feed(&mut e, &[key(KeyCode::Delete)]);
        assert_eq!(rows(&e), ["abcd"]);
    }

    #[test]
    fn escape_and_alt_keys_are_ignored() {
        let mut e = editor_with("x");
        feed(
            &mut e,
            &[
                key(KeyCode::Escape),
                KeyEvent::with(KeyCode::Byte(b'a'), Modifiers::ALT),
                ctrl('t'),
            ],
        );
        assert_eq!(rows(&e), ["x"]);
        assert!(!e.buffer.is_dirty());
    }

    // ── Navigation ──────────────────────────────────────────────────────

    #[test]
    fn right_steps_over_whole_character_and_wraps() {
        let mut e = editor_with("é\nz");
        feed(&mut e, &[key(KeyCode::Right)]);
        assert_eq!(e.cursor, Cursor::new(0, 2));
        feed(&mut e, &[key(KeyCode::Right)]);
        assert_eq!(e.cursor, Cursor::new(1, 0));
    }

    #[test]
    fn page_keys_move_by_screen_rows() {
        let text: Vec<String> = (0..50).map(|i| format!("line {i}")).collect();
        let mut e = editor_with(&text.join("\n"));
        feed(&mut e, &[key(KeyCode::PageDown)]);
        assert_eq!(e.cursor.row, 22);
        feed(&mut e, &[key(KeyCode::PageDown), key(KeyCode::PageDown)]);
        assert_eq!(e.cursor.row, 49);
        feed(&mut e, &[key(KeyCode::PageUp)]);
        assert_eq!(e.cursor.row, 27);
    }

    #[test]
    fn vertical_move_clamps_column() {
        let mut e = editor_with("long line\nab");
        feed(&mut e, &[key(KeyCode::End), key(KeyCode::Down)]);
        assert_eq!(e.cursor, Cursor::new(1, 2));
        feed(&mut e, &[key(KeyCode::Home)]);
        assert_eq!(e.cursor.col, 0);
    }

    // ── Quit ────────────────────────────────────────────────────────────

    #[test]
    fn ctrl_q_on_clean_buffer_quits() {
        let mut e = editor_with("x");
        assert_eq!(feed(&mut e, &[ctrl('q')]), Action::Quit);
    }

    #[test]
    fn ctrl_q_twice_with_changes() {
        let mut e = editor_with("");
        feed(&mut e, &typed("x"));
        assert_eq!(feed(&mut e, &[ctrl('q')]), Action::Continue);
        assert_eq!(e.message.as_deref(), Some(QUIT_WARNING));
        assert_eq!(feed(&mut e, &[ctrl('q')]), Action::Quit);
    }

    #[test]
    fn other_key_disarms_quit() {
        let mut e = editor_with("");
        feed(&mut e, &typed("x"));
        feed(&mut e, &[ctrl('q'), key(KeyCode::Left)]);
        assert_eq!(feed(&mut e, &[ctrl('q')]), Action::Continue);
    }

    // ── Save ────────────────────────────────────────────────────────────

    #[test]
    fn ctrl_s_saves_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.txt");
        let buffer = TextBuffer::open(&path).unwrap();
        let mut e = Editor::new(buffer, Options::new(), SIZE);

        feed(&mut e, &typed("hello"));
        feed(&mut e, &[ctrl('s')]);

        assert_eq!(fs::read(&path).unwrap(), b"hello\n");
        assert!(!e.buffer.is_dirty());
        assert_eq!(
            e.message,
            Some(format!("Saved to {} (6 bytes)", path.display()))
        );
    }

    #[test]
    fn ctrl_s_without_name_reports_error() {
        let mut e = editor_with("");
        feed(&mut e, &typed("x"));
        feed(&mut e, &[ctrl('s')]);
        assert_eq!(e.message.as_deref(), Some("Error: no file name"));
        assert!(e.buffer.is_dirty());
    }

    // ── Prompt ──────────────────────────────────────────────────────────

    fn prompt(e: &mut Editor, input: &str) -> Action {
        feed(e, &[ctrl('x')]);
        feed(e, &typed(input));
        feed(e, &[key(KeyCode::Enter)])
    }

    #[test]
    fn prompt_goto_line() {
        let mut e = editor_with("1\n2\n3\n4\n5");
        prompt(&mut e, "2");
        assert_eq!(e.cursor, Cursor::new(1, 0));
        assert!(e.prompt.is_none());
        prompt(&mut e, "99");
        assert_eq!(e.cursor.row, 4);
    }

    #[test]
    fn prompt_keys_edit_the_input_not_the_buffer() {
        let mut e = editor_with("text");
        feed(&mut e, &[ctrl('x')]);
        feed(&mut e, &typed("ab"));
        feed(&mut e, &[key(KeyCode::Backspace), key(KeyCode::Home), press('x')]);
        assert_eq!(e.prompt.as_ref().map(CommandLine::input), Some("xa"));
        assert_eq!(rows(&e), ["text"]);
    }

    #[test]
    fn prompt_escape_cancels() {
        let mut e = editor_with("x");
        feed(&mut e, &[ctrl('x')]);
        feed(&mut e, &typed("q"));
        assert_eq!(feed(&mut e, &[key(KeyCode::Escape)]), Action::Continue);
        assert!(e.prompt.is_none());
    }

    #[test]
    fn prompt_enter_on_empty_input_stays_open() {
        let mut e = editor_with("x");
        feed(&mut e, &[ctrl('x'), key(KeyCode::Enter)]);
        assert!(e.prompt.is_some());
    }

    #[test]
    fn prompt_replace() {
        let mut e = editor_with("aaa\nxaay\naaa");
        prompt(&mut e, "r/a+/b/g");
        assert_eq!(rows(&e), ["b", "xby", "b"]);
        assert_eq!(e.message.as_deref(), Some("Replaced 3 occurrences"));
    }

    #[test]
    fn prompt_quit_refused_then_forced() {
        let mut e = editor_with("");
        feed(&mut e, &typed("x"));
        assert_eq!(prompt(&mut e, "q"), Action::Continue);
        assert_eq!(e.message.as_deref(), Some("Unsaved changes!"));
        assert_eq!(prompt(&mut e, "q!"), Action::Quit);
    }

    #[test]
    fn prompt_set_wrap_switches_layout() {
        let mut e = editor_with("x");
        prompt(&mut e, "set wrap");
        paint(&mut e);
        assert_eq!(e.viewport.mode(), LayoutMode::Wrap);
        prompt(&mut e, "set nowrap");
        paint(&mut e);
        assert_eq!(e.viewport.mode(), LayoutMode::Scroll);
    }

    // ── Paint ───────────────────────────────────────────────────────────

    #[test]
    fn paint_places_cursor_after_gutter() {
        let mut e = editor_with("hello");
        feed(&mut e, &[key(KeyCode::End)]);
        let frame = paint(&mut e);
        assert_eq!(line_text(&frame, 0), " hello");
        assert_eq!(line_text(&frame, 1), "~");
        assert_eq!(frame.cursor(), Some((6, 0)));
    }

    #[test]
    fn paint_shows_prompt() {
        let mut e = editor_with("hello");
        feed(&mut e, &[ctrl('x')]);
        feed(&mut e, &typed("wq"));
        let frame = paint(&mut e);
        assert_eq!(line_text(&frame, 23), ">wq");
        assert_eq!(frame.cursor(), Some((3, 23)));
    }

    #[test]
    fn resize_changes_text_rows() {
        let mut e = editor_with("x");
        e.on_resize(Size { cols: 40, rows: 10 });
        assert_eq!(e.viewport.screen_rows(), 8);
        assert_eq!(e.viewport.screen_cols(), 40);
    }

    // ── Command line ────────────────────────────────────────────────────

    fn args(list: &[&str]) -> Result<CliArgs, String> {
        parse_args(list.iter().map(|s| (*s).to_string()))
    }

    #[test]
    fn cli_flags_and_file() {
        let cli = args(&["-w", "--tabstop", "8", "notes.txt"]).unwrap();
        assert_eq!(
            cli,
            CliArgs {
                wrap: true,
                tab_stop: Some(8),
                file: Some(PathBuf::from("notes.txt")),
                help: false,
            }
        );
        let opts = cli.options().unwrap();
        assert!(opts.wrap());
        assert_eq!(opts.tab_stop(), 8);
    }

    #[test]
    fn cli_tabstop_equals_form() {
        assert_eq!(args(&["--tabstop=2"]).unwrap().tab_stop, Some(2));
    }

    #[test]
    fn cli_errors() {
        assert!(args(&["--bogus"]).is_err());
        assert!(args(&["--tabstop"]).is_err());
        assert!(args(&["--tabstop", "x"]).is_err());
        assert!(args(&["a", "b"]).is_err());
        assert!(args(&["--tabstop", "99"]).unwrap().options().is_err());
    }

    #[test]
    fn cli_double_dash_allows_dash_names() {
        let cli = args(&["--", "-odd"]).unwrap();
        assert_eq!(cli.file, Some(PathBuf::from("-odd")));
    }

    #[test]
    fn cli_help() {
        assert!(args(&["--help"]).unwrap().help);
        assert_eq!(args(&[]).unwrap(), CliArgs::default());
    }
}
