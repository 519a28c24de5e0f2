//! Source locations for tokens, AST nodes, and diagnostics

use serde::{Deserialize, Serialize};

/// A region of the original SQL text.
///
/// Byte offsets are half-open (`start..end`); line and column are 1-indexed
/// and refer to the start of the region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Byte offset of the first byte
    pub start: u32,

    /// Byte offset one past the last byte
    pub end: u32,

    /// Line of the first byte (1-indexed)
    pub line: u32,

    /// Column of the first byte (1-indexed)
    pub column: u32,
}

impl Span {
    /// Create a new span
    pub fn new(start: u32, end: u32, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    /// An empty span pointing at the start of the input
    pub fn zero() -> Self {
        Self::new(0, 0, 1, 1)
    }

    /// Merge two spans into one covering both.
    ///
    /// The result starts at whichever span begins first and ends at whichever
    /// ends last; line/column come from the earlier span.
    pub fn merge(self, other: Span) -> Span {
        let (first, _) = if self.start <= other.start {
            (self, other)
        } else {
            (other, self)
        };
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            line: first.line,
            column: first.column,
        }
    }

    /// Length of the region in bytes
    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Whether the region is empty
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_earliest_position() {
        let a = Span::new(10, 14, 2, 3);
        let b = Span::new(20, 25, 3, 1);

        let merged = a.merge(b);
        assert_eq!(merged.start, 10);
        assert_eq!(merged.end, 25);
        assert_eq!(merged.line, 2);
        assert_eq!(merged.column, 3);

        // Order should not matter
        assert_eq!(b.merge(a), merged);
    }

    #[test]
    fn display_is_line_colon_column() {
        assert_eq!(Span::new(5, 9, 3, 7).to_string(), "3:7");
    }
}
