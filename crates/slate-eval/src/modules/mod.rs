//! Prelude module dispatch.
//!
//! Each module is a namespace value bound in the prelude scope; calls like
//! `num.sqrt(2)` route through [`call`] to the per-module function tables.

mod charts;
mod db;
mod num;
mod plot;
mod re_mod;
mod table;
mod time_mod;

use crate::error::{EvalError, EvalResult};
use crate::value::{Module, Value};

/// Dispatch `module.function(args)` to the owning module.
pub fn call(module: Module, function: &str, args: Vec<Value>) -> EvalResult<Value> {
    match module {
        Module::Num => num::call(function, args),
        Module::Table => table::call(function, args),
        Module::Plot => plot::call(function, args),
        Module::Charts => charts::call(function, args),
        Module::Re => re_mod::call(function, args),
        Module::Db => db::call(function, args),
        Module::Time => time_mod::call(function, args),
    }
}

pub(crate) fn unknown_function(module: Module, function: &str) -> EvalError {
    EvalError::ModuleError(format!(
        "module '{}' has no function '{function}'",
        module.name()
    ))
}

// ── Shared argument helpers ──────────────────────────────────────────────

pub(crate) fn no_args(name: &str, args: Vec<Value>) -> EvalResult<()> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(EvalError::TypeMismatch(format!(
            "{name}() expects no arguments, got {}",
            args.len()
        )))
    }
}

pub(crate) fn one_arg(name: &str, args: Vec<Value>) -> EvalResult<[Value; 1]> {
    <[Value; 1]>::try_from(args).map_err(|args| {
        EvalError::TypeMismatch(format!("{name}() expects 1 argument, got {}", args.len()))
    })
}

pub(crate) fn two_args(name: &str, args: Vec<Value>) -> EvalResult<[Value; 2]> {
    <[Value; 2]>::try_from(args).map_err(|args| {
        EvalError::TypeMismatch(format!("{name}() expects 2 arguments, got {}", args.len()))
    })
}

pub(crate) fn three_args(name: &str, args: Vec<Value>) -> EvalResult<[Value; 3]> {
    <[Value; 3]>::try_from(args).map_err(|args| {
        EvalError::TypeMismatch(format!("{name}() expects 3 arguments, got {}", args.len()))
    })
}

pub(crate) fn expect_number(name: &str, value: &Value) -> EvalResult<f64> {
    match value {
        Value::Number(n) => Ok(*n),
        other => Err(EvalError::TypeMismatch(format!(
            "{name}() requires number, got {}",
            other.type_name()
        ))),
    }
}

pub(crate) fn expect_string(name: &str, value: &Value) -> EvalResult<String> {
    match value {
        Value::Str(s) => Ok(s.clone()),
        other => Err(EvalError::TypeMismatch(format!(
            "{name}() requires string, got {}",
            other.type_name()
        ))),
    }
}

pub(crate) fn expect_list(name: &str, value: &Value) -> EvalResult<Vec<Value>> {
    match value {
        Value::List(items) => Ok(items.clone()),
        other => Err(EvalError::TypeMismatch(format!(
            "{name}() requires list, got {}",
            other.type_name()
        ))),
    }
}

/// A list argument where every element must be a number.
pub(crate) fn expect_numbers(name: &str, value: &Value) -> EvalResult<Vec<f64>> {
    let items = expect_list(name, value)?;
    items
        .iter()
        .map(|v| expect_number(name, v))
        .collect()
}
