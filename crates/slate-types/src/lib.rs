//! Shared types for the slate cell language.
//!
//! This crate defines the AST node types, source spans, and syntax error
//! types used across the lexer, parser, and evaluator.

mod error;
mod span;
pub mod ast;

pub use error::{ErrorCode, Severity, SyntaxError, SyntaxErrors, MAX_ERRORS};
pub use span::{SourceFile, Span};
