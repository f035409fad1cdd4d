//! Slate evaluator: tree-walking execution over a shared environment.
//!
//! The evaluator runs parsed cell programs against a persistent
//! [`Environment`]. Bindings survive across runs, `print` output is
//! captured into the evaluator's buffer, and runtime faults surface as
//! [`EvalError`] values while leaving already-applied bindings in place.

mod env;
mod error;
mod evaluator;
mod modules;
mod value;

pub use env::Environment;
pub use error::{EvalError, EvalResult};
pub use evaluator::Evaluator;
pub use value::{Builtin, FunctionValue, Module, Value};
