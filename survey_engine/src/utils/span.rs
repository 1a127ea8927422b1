//! Source location tracking for condition strings
//!
//! Conditions are single-line, so a span is a pair of byte offsets into the
//! normalized condition text. Spans are carried into error messages and log
//! context so a broken form configuration can be located quickly.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A byte range of condition text from start (inclusive) to end (exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "Span start must not be after end");
        Self { start, end }
    }

    /// Span covering the whole of `input`
    pub fn covering(input: &str) -> Self {
        Self::new(0, input.len())
    }

    /// Get the source text for this span, or `""` if the span does not fit
    pub fn slice<'a>(&self, input: &'a str) -> &'a str {
        input.get(self.start..self.end).unwrap_or("")
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 1-based columns read better in operator-facing messages
        write!(f, "col {}-{}", self.start + 1, self.end + 1)
    }
}

/// A value with its location in the condition text
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Spanned<T> {
    pub value: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(value: T, span: Span) -> Self {
        Self { value, span }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_out_of_range_is_empty() {
        let text = "9 = Oui";
        assert_eq!(Span::new(0, 1).slice(text), "9");
        assert_eq!(Span::new(4, 40).slice(text), "");
    }

    #[test]
    fn test_display_is_one_based() {
        assert_eq!(Span::new(0, 7).to_string(), "col 1-8");
    }
}
