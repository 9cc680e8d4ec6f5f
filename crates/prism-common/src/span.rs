//! Source spans.
//!
//! A `Span` records where a declaration lives in its source unit. Lines and
//! columns are 1-based (as reported by the parser), offsets are 0-based byte
//! positions. Anonymous declarations are identified by their starting line
//! and column, so both are always populated.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The location of a syntax node in its source unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    /// Start position (byte offset)
    pub start_offset: u32,
    /// End position (byte offset, exclusive)
    pub end_offset: u32,
    pub start_line: u32,
    pub end_line: u32,
    pub start_column: u32,
    pub end_column: u32,
}

impl Span {
    /// Create a span covering whole lines, with columns starting at 1.
    ///
    /// Offsets are left at zero; this is what fixture builders use when only
    /// line information matters.
    #[must_use]
    pub const fn lines(start_line: u32, end_line: u32) -> Self {
        Self {
            start_offset: 0,
            end_offset: 0,
            start_line,
            end_line,
            start_column: 1,
            end_column: 1,
        }
    }

    /// Create a single-line span starting at `column`.
    #[must_use]
    pub const fn at(line: u32, column: u32) -> Self {
        Self {
            start_offset: 0,
            end_offset: 0,
            start_line: line,
            end_line: line,
            start_column: column,
            end_column: column,
        }
    }

    /// Set byte offsets.
    #[must_use]
    pub const fn with_offsets(mut self, start: u32, end: u32) -> Self {
        self.start_offset = start;
        self.end_offset = end;
        self
    }

    /// Number of lines covered by this span (at least 1).
    #[must_use]
    pub const fn line_count(&self) -> u32 {
        if self.end_line > self.start_line {
            self.end_line - self.start_line + 1
        } else {
            1
        }
    }

    /// Check whether `other` lies completely inside this span.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        (self.start_line, self.start_column) <= (other.start_line, other.start_column)
            && (other.end_line, other.end_column) <= (self.end_line, self.end_column)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_column)
    }
}

#[cfg(test)]
#[path = "../tests/span_tests.rs"]
mod tests;
