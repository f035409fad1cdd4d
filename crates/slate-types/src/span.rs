use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a token or AST node sits in a cell's source.
///
/// Lines and columns are 1-based, matching what a user counts in the
/// editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

impl Span {
    pub fn new(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
        Self {
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// A zero-width span at one position.
    pub fn point(line: u32, col: u32) -> Self {
        Self::new(line, col, line, col)
    }

    /// The smallest span covering both `self` and `other`.
    ///
    /// Positions compare as (line, column) pairs, so the result starts at
    /// the earlier start and ends at the later end regardless of order.
    pub fn merge(self, other: Span) -> Span {
        let (start_line, start_col) =
            (self.start_line, self.start_col).min((other.start_line, other.start_col));
        let (end_line, end_col) =
            (self.end_line, self.end_col).max((other.end_line, other.end_col));
        Span::new(start_line, start_col, end_line, end_col)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_col)
    }
}

/// One cell's source text, named for diagnostics.
///
/// Cells are small, so line extraction walks the text on demand instead
/// of carrying an offset index.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub source: String,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    /// The 1-based `line_number`th line, without its terminator.
    ///
    /// `\r\n` endings lose the `\r` as well, so diagnostics never embed a
    /// stray carriage return. Returns `None` past the last line.
    pub fn line(&self, line_number: u32) -> Option<&str> {
        let wanted = line_number.checked_sub(1)? as usize;
        self.source
            .split('\n')
            .nth(wanted)
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_point() {
        let s = Span::point(1, 5);
        assert_eq!((s.start_line, s.start_col), (1, 5));
        assert_eq!((s.end_line, s.end_col), (1, 5));
    }

    #[test]
    fn test_span_merge() {
        let a = Span::new(1, 5, 1, 10);
        let b = Span::new(2, 3, 2, 8);
        let merged = a.merge(b);
        assert_eq!(merged, Span::new(1, 5, 2, 8));
        // order does not matter
        assert_eq!(b.merge(a), merged);
    }

    #[test]
    fn test_span_merge_same_line() {
        let a = Span::new(1, 5, 1, 10);
        let b = Span::new(1, 3, 1, 8);
        let merged = a.merge(b);
        assert_eq!(merged.start_col, 3);
        assert_eq!(merged.end_col, 10);
    }

    #[test]
    fn test_span_display() {
        let s = Span::new(3, 7, 3, 15);
        assert_eq!(format!("{s}"), "3:7");
    }

    #[test]
    fn test_source_file_line_extraction() {
        let src = SourceFile::new("cell", "x = 1\ny = 2\nx + y");
        assert_eq!(src.line(1), Some("x = 1"));
        assert_eq!(src.line(2), Some("y = 2"));
        assert_eq!(src.line(3), Some("x + y"));
        assert_eq!(src.line(0), None);
        assert_eq!(src.line(4), None);
    }

    #[test]
    fn test_source_file_crlf() {
        let src = SourceFile::new("cell", "line one\r\nline two\r\n");
        assert_eq!(src.line(1), Some("line one"));
        assert_eq!(src.line(2), Some("line two"));
    }

    #[test]
    fn test_source_file_empty() {
        let src = SourceFile::new("cell", "");
        assert_eq!(src.line(1), Some(""));
        assert_eq!(src.line(2), None);
    }
}
