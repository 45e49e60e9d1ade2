//! Regex find-and-replace over the whole buffer.
//!
//! Patterns are compiled with `regex::bytes`, so rows are searched as raw
//! bytes and invalid UTF-8 never stops a search. Replacements are literal:
//! `$1` and friends are inserted as typed.
//!
//! Each row is scanned left to right. After a replacement the search
//! resumes just past the inserted text, so a replacement is never matched
//! again. Empty matches need two extra rules to guarantee progress:
//!
//! - after replacing an empty match, the search resumes one whole
//!   character past the insertion;
//! - an empty match that starts exactly where the previous replacement
//!   ended is skipped.
//!
//! So `a*` → `X` on `baaac` gives `XbXcX`.

use regex::bytes::{Regex, RegexBuilder};

use crate::buffer::TextBuffer;
use crate::error::SubstituteError;
use crate::row::{Row, next_boundary};

/// Substitution flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubFlags {
    /// `g` — replace every match, not just the first in the buffer.
    pub global: bool,
    /// `i` — case-insensitive matching.
    pub case_insensitive: bool,
}

impl SubFlags {
    /// Parse a flag string such as `"gi"`. Unknown flags are ignored.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        let mut flags = Self::default();
        for ch in s.chars() {
            match ch {
                'g' => flags.global = true,
                'i' => flags.case_insensitive = true,
                _ => {}
            }
        }
        flags
    }
}

/// Replace matches of `pattern` with `replacement` across the buffer and
/// return how many were replaced. Without [`SubFlags::global`] only the
/// first match in the buffer is replaced.
///
/// The buffer is marked dirty when anything was replaced.
///
/// # Errors
///
/// [`SubstituteError::InvalidPattern`] when the pattern doesn't compile;
/// the buffer is left untouched.
pub fn substitute(
    buf: &mut TextBuffer,
    pattern: &str,
    replacement: &str,
    flags: SubFlags,
) -> Result<usize, SubstituteError> {
    let re = RegexBuilder::new(pattern)
        .case_insensitive(flags.case_insensitive)
        .build()
        .inspect_err(|err| tracing::warn!(pattern, error = %err, "invalid substitution pattern"))?;

    let limit = if flags.global { usize::MAX } else { 1 };
    let mut count = 0;

    for row in buf.rows_mut() {
        if count >= limit {
            break;
        }
        count += substitute_row(&re, row, replacement.as_bytes(), limit - count);
    }

    if count > 0 {
        buf.mark_dirty();
    }
    tracing::debug!(pattern, count, global = flags.global, "substitute");
    Ok(count)
}

/// Replace up to `max` matches in one row.
fn substitute_row(re: &Regex, row: &mut Row, replacement: &[u8], max: usize) -> usize {
    let mut count = 0;
    let mut at = 0;
    let mut last_end = None;

    while count < max && at <= row.len() {
        let Some(m) = re.find_at(row.as_bytes(), at) else {
            break;
        };
        let (start, end) = (m.start(), m.end());

        if start == end && last_end == Some(start) {
            if start >= row.len() {
                break;
            }
            at = next_boundary(row.as_bytes(), start);
            continue;
        }

        let resume = start + row.replace(start..end, replacement);
        count += 1;
        last_end = Some(resume);

        at = if start == end {
            if resume >= row.len() {
                break;
            }
            next_boundary(row.as_bytes(), resume)
        } else {
            resume
        };
    }

    count
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
