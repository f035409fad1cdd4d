use crate::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of syntax errors reported before fail-fast.
pub const MAX_ERRORS: usize = 20;

/// Error severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Numeric error code (E100–E299).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Lexical errors (E100–E149) ──
    pub const UNEXPECTED_CHAR: Self = Self(100);
    pub const UNTERMINATED_STRING: Self = Self(101);
    pub const INVALID_NUMBER: Self = Self(102);
    pub const INVALID_ESCAPE: Self = Self(103);

    // ── Parse errors (E150–E199) ──
    pub const UNEXPECTED_TOKEN: Self = Self(150);
    pub const UNCLOSED_BRACE: Self = Self(151);
    pub const INVALID_ASSIGN_TARGET: Self = Self(152);

    // ── Structural limits (E200–E299) ──
    pub const NESTING_LIMIT_EXCEEDED: Self = Self(200);
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

/// A structured syntax error for one cell's source.
///
/// Carries the offending source line so the notebook layer can format a
/// trace without re-reading the cell text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntaxError {
    /// Name of the source unit (e.g., "cell").
    pub file: String,
    /// Error code (e.g., E150).
    pub code: ErrorCode,
    /// Error severity.
    pub severity: Severity,
    /// Human-readable error message.
    pub message: String,
    /// Source location.
    #[serde(flatten)]
    pub span: Span,
    /// The exact source line for context.
    pub source_line: String,
}

impl SyntaxError {
    /// Create a new error.
    pub fn new(
        file: impl Into<String>,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
        source_line: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            code,
            severity: Severity::Error,
            message: message.into(),
            span,
            source_line: source_line.into(),
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} {}", self.span, self.code, self.message)
    }
}

impl std::error::Error for SyntaxError {}

/// A collection of syntax errors, capped at [`MAX_ERRORS`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyntaxErrors {
    pub errors: Vec<SyntaxError>,
    /// Total errors encountered, including any dropped past the cap.
    pub total_errors: usize,
}

impl SyntaxErrors {
    /// Create an empty collection.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Record an error. Errors past [`MAX_ERRORS`] are counted but dropped.
    pub fn push(&mut self, error: SyntaxError) {
        self.total_errors += 1;
        if self.errors.len() < MAX_ERRORS {
            self.errors.push(error);
        }
    }

    /// Returns `true` if any error has been recorded.
    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    /// Merge another collection into this one.
    pub fn extend(&mut self, other: SyntaxErrors) {
        for e in other.errors {
            self.push(e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cap_at_max_errors() {
        let mut errs = SyntaxErrors::empty();
        for i in 0..(MAX_ERRORS + 5) {
            errs.push(SyntaxError::new(
                "cell",
                ErrorCode::UNEXPECTED_TOKEN,
                format!("error {i}"),
                Span::point(1, 1),
                "",
            ));
        }
        assert_eq!(errs.errors.len(), MAX_ERRORS);
        assert_eq!(errs.total_errors, MAX_ERRORS + 5);
    }

    #[test]
    fn test_display_format() {
        let e = SyntaxError::new(
            "cell",
            ErrorCode::UNEXPECTED_TOKEN,
            "expected ')', got newline",
            Span::new(2, 8, 2, 8),
            "print(x",
        );
        assert_eq!(format!("{e}"), "2:8: E150 expected ')', got newline");
    }
}
