//! Source location tracking.
//!
//! `Span` tracks the position of tokens in source code for error reporting
//! and for recovering the line structure that decorations are built from.

/// A span of source text.
///
/// Tracks byte offsets and line/column positions for error reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Span {
    /// Byte offset where this span starts.
    pub start: usize,
    /// Byte offset where this span ends (exclusive).
    pub end: usize,
    /// 1-based line number where this span starts.
    pub line: u32,
    /// 1-based column number where this span starts.
    pub column: u32,
}

impl Span {
    /// Creates a new span.
    #[must_use]
    pub const fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    /// Returns the text this span covers in the given source.
    #[must_use]
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }

    /// Returns the line on which this span ends.
    ///
    /// Raw strings and block comments may cover several lines.
    #[must_use]
    pub fn end_line(&self, source: &str) -> u32 {
        let newlines = self.text(source).bytes().filter(|&b| b == b'\n').count();
        self.line + u32::try_from(newlines).unwrap_or(u32::MAX - self.line)
    }
}
