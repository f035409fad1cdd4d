//! Runtime error types for the slate evaluator.

use crate::value::Value;
use std::fmt;

/// Evaluation error — runtime traps raised while executing cell code.
#[derive(Debug, Clone)]
pub enum EvalError {
    /// Division by zero, NaN/Infinity-producing arithmetic, etc.
    ArithmeticTrap(String),
    /// Unknown variable
    UndefinedVariable(String),
    /// Type mismatch at runtime
    TypeMismatch(String),
    /// `nil.field`, method call on nil, etc.
    NilAccess(String),
    /// Unknown function, or calling something that is not callable
    UnknownFunction(String),
    /// Prelude module call failure (bad arguments, invalid pattern, ...)
    ModuleError(String),
    /// The guarded `input` binding was called
    InputRejected(String),
    /// `return` statement (used internally for control flow)
    Return(Value),
    /// `return` reached outside a function body
    ReturnOutsideFunction,
    /// Generic runtime error
    Runtime(String),
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArithmeticTrap(msg) => write!(f, "arithmetic trap: {msg}"),
            Self::UndefinedVariable(name) => write!(f, "undefined variable: {name}"),
            Self::TypeMismatch(msg) => write!(f, "type mismatch: {msg}"),
            Self::NilAccess(msg) => write!(f, "nil access: {msg}"),
            Self::UnknownFunction(msg) => write!(f, "unknown function: {msg}"),
            Self::ModuleError(msg) => write!(f, "module error: {msg}"),
            Self::InputRejected(prompt) => write!(
                f,
                "interactive input('{prompt}') is not supported in this editor; \
                 hardcode your values instead (e.g. x = 10)"
            ),
            Self::Return(_) => write!(f, "return"),
            Self::ReturnOutsideFunction => write!(f, "'return' outside of a function"),
            Self::Runtime(msg) => write!(f, "runtime error: {msg}"),
        }
    }
}

impl std::error::Error for EvalError {}

/// Result alias for evaluator operations.
pub type EvalResult<T> = Result<T, EvalError>;
