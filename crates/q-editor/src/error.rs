//! Error types for the editor core.
//!
//! Structural bounds violations (deleting a row that doesn't exist,
//! moving past the end of a row) are absorbed silently by the operations
//! themselves. Only the operations below can fail, and each failure is
//! recoverable: the editor shows it on the message line and keeps going.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures from loading or saving a [`TextBuffer`](crate::buffer::TextBuffer).
#[derive(Debug, Error)]
pub enum BufferError {
    /// `save` was called on a buffer that was never bound to a file.
    #[error("no file name")]
    NoFileName,

    /// The file exists but could not be read.
    #[error("cannot read {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file could not be created, truncated, or written.
    #[error("cannot write {}: {source}", .path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failures from a regex substitution.
#[derive(Debug, Error)]
pub enum SubstituteError {
    #[error("invalid regex: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Failures from a `set` directive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
    #[error("unknown option: {0}")]
    UnknownOption(String),

    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
}
