//! # q-editor — Editor core for quecto
//!
//! This crate contains the text engine and everything that turns it into a
//! screen:
//!
//! - **[`row`]** — `Row`, one line of raw bytes, plus UTF-8 boundary helpers
//! - **[`buffer`]** — `TextBuffer`: rows, file binding, dirty flag, load/save
//! - **[`cursor`]** — `Cursor` (row, byte column) with navigation
//! - **[`coords`]** — `CoordinateMapper`: byte offsets ↔ render columns
//! - **[`layout`]** — `Viewport`: scrolling and soft-wrap, paints a `RenderFrame`
//! - **[`command`]** — the `>` prompt: input line, parsing, execution
//! - **[`substitute`]** — regex replace across the buffer
//! - **[`options`]** — runtime options and the `set` command
//! - **[`error`]** — error types for the fallible operations

pub mod buffer;
pub mod command;
pub mod coords;
pub mod cursor;
pub mod error;
pub mod layout;
pub mod options;
pub mod row;
pub mod substitute;
