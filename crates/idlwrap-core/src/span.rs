//! Source location tracking for error reporting.
//!
//! Provides [`Span`] to track where tokens, declarations and errors occur in
//! an interface file.

use std::fmt;

/// A region of source text.
///
/// Carries both the byte range (for slicing verbatim text such as default
/// arguments) and the human-facing line:column of its first byte.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Byte offset of the first byte.
    pub offset: u32,
    /// Length in bytes.
    pub len: u32,
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed, byte-based).
    pub col: u32,
}

impl Span {
    /// Create a new span.
    #[inline]
    pub fn new(offset: u32, len: u32, line: u32, col: u32) -> Self {
        Self {
            offset,
            len,
            line,
            col,
        }
    }

    /// Create a zero-length span at a position.
    #[inline]
    pub fn point(offset: u32, line: u32, col: u32) -> Self {
        Self::new(offset, 0, line, col)
    }

    /// Whether this span is empty (zero length).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The length of this span in bytes.
    #[inline]
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Byte offset one past the last byte.
    #[inline]
    pub fn end(&self) -> u32 {
        self.offset + self.len
    }

    /// Smallest span covering both `self` and `other`.
    ///
    /// The line and column are taken from whichever span starts first.
    #[inline]
    pub fn merge(self, other: Span) -> Span {
        let first = if self.offset <= other.offset {
            self
        } else {
            other
        };
        let end = self.end().max(other.end());
        Span {
            offset: first.offset,
            len: end - first.offset,
            line: first.line,
            col: first.col,
        }
    }

    /// The text this span covers, if it lies within `source`.
    pub fn slice<'a>(&self, source: &'a str) -> Option<&'a str> {
        source.get(self.offset as usize..self.end() as usize)
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_basics() {
        let span = Span::new(4, 10, 1, 5);
        assert_eq!(span.len(), 10);
        assert_eq!(span.end(), 14);
        assert!(!span.is_empty());

        let empty = Span::point(4, 1, 5);
        assert!(empty.is_empty());
    }

    #[test]
    fn span_display() {
        let span = Span::new(40, 5, 3, 15);
        assert_eq!(format!("{}", span), "3:15");
    }

    #[test]
    fn span_merge_in_order() {
        let foo = Span::new(4, 3, 1, 5);
        let bar = Span::new(9, 3, 1, 10);
        let merged = foo.merge(bar);

        assert_eq!(merged.offset, 4);
        assert_eq!(merged.len, 8);
        assert_eq!(merged.col, 5);
    }

    #[test]
    fn span_merge_reverse_order() {
        let foo = Span::new(9, 3, 1, 10);
        let bar = Span::new(4, 3, 1, 5);
        let merged = foo.merge(bar);

        assert_eq!(merged.offset, 4);
        assert_eq!(merged.len, 8);
        assert_eq!(merged.col, 5);
    }

    #[test]
    fn span_merge_across_lines() {
        let first = Span::new(2, 4, 1, 3);
        let second = Span::new(20, 2, 3, 1);
        let merged = first.merge(second);

        assert_eq!(merged.line, 1);
        assert_eq!(merged.col, 3);
        assert_eq!(merged.len, 20);
    }

    #[test]
    fn span_slice() {
        let source = "int x = 5;";
        let span = Span::new(4, 1, 1, 5);
        assert_eq!(span.slice(source), Some("x"));
        assert_eq!(Span::new(8, 10, 1, 9).slice(source), None);
    }
}
