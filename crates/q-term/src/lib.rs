// SPDX-License-Identifier: MIT
//
// q-term — Terminal shell for quecto.
//
// Everything between the editor core and the terminal device: raw mode
// and the alternate screen, the window size, decoding key sequences,
// polling stdin, and writing a finished frame in one go.
//
// This crate avoids external TUI frameworks (ratatui, crossterm) in favor
// of direct terminal control via ANSI escape sequences and raw termios.
// It knows nothing about text buffers; the editor paints a `RenderFrame`
// and this crate puts it on screen.

pub mod ansi;
pub mod event_loop;
pub mod frame;
pub mod input;
pub mod output;
pub mod reader;
pub mod terminal;
