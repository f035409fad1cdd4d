//! Runtime values for the slate cell language.

use crate::env::Environment;
use slate_types::ast::Block;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A runtime value.
#[derive(Debug, Clone)]
pub enum Value {
    Number(f64),
    Str(String),
    Bool(bool),
    Nil,
    List(Vec<Value>),
    Record(BTreeMap<String, Value>),
    /// A user-defined function (`fn(a, b) { ... }`).
    Function(Arc<FunctionValue>),
    /// A built-in function bound in the prelude (`print`, `len`, ...).
    Builtin(Builtin),
    /// A prelude module (`num`, `re`, ...). Dispatched by method call.
    Module(Module),
}

/// A user-defined function: parameters, body, and the environment
/// snapshot captured at the point of definition.
#[derive(Debug)]
pub struct FunctionValue {
    pub params: Vec<String>,
    pub body: Block,
    pub captured: Environment,
}

/// Built-in functions available as global bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Print,
    Len,
    Str,
    Type,
    /// The guarded `input` binding — always faults (interactive input is
    /// not available in the scratch editor).
    Input,
}

impl Builtin {
    /// The name this builtin is bound under in the prelude.
    pub fn name(self) -> &'static str {
        match self {
            Builtin::Print => "print",
            Builtin::Len => "len",
            Builtin::Str => "str",
            Builtin::Type => "type",
            Builtin::Input => "input",
        }
    }
}

/// Prelude modules, dispatched by `(module, function)` name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Module {
    /// Numeric/array helpers (`num.sqrt`, `num.mean`, ...).
    Num,
    /// Tabular data (`table.from_records`, ...).
    Table,
    /// Text plotting (`plot.bar`, `plot.line`).
    Plot,
    /// Statistical summaries and histograms (`charts.hist`, ...).
    Charts,
    /// Regular expressions (`re.find`, ...).
    Re,
    /// Embedded record store (`db.open`, `db.insert`, ...).
    Db,
    /// Clock access (`time.now`, `time.millis`).
    Time,
}

impl Module {
    /// The name this module is bound under in the prelude.
    pub fn name(self) -> &'static str {
        match self {
            Module::Num => "num",
            Module::Table => "table",
            Module::Plot => "plot",
            Module::Charts => "charts",
            Module::Re => "re",
            Module::Db => "db",
            Module::Time => "time",
        }
    }
}

impl Value {
    /// The value's type name, as reported by `type(x)` and error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Bool(_) => "bool",
            Value::Nil => "nil",
            Value::List(_) => "list",
            Value::Record(_) => "record",
            Value::Function(_) => "function",
            Value::Builtin(_) => "function",
            Value::Module(_) => "module",
        }
    }

    /// Truthiness: `nil`, `false`, `0`, and empty collections/strings are
    /// falsy; everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Nil => false,
            Value::Number(n) => *n != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Record(fields) => !fields.is_empty(),
            Value::Function(_) | Value::Builtin(_) | Value::Module(_) => true,
        }
    }

    /// Convert to the display string (for `print`, `str(x)`, and the
    /// notebook's auto-print fallback).
    ///
    /// Integral floats print without a decimal point: `15`, not `15.0`.
    pub fn display_string(&self) -> String {
        match self {
            Value::Number(n) => {
                // i64 range check so huge integral floats don't saturate
                if n.fract() == 0.0 && n.is_finite() && n.abs() < 9.2e18 {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
            Value::Str(s) => s.clone(),
            Value::Bool(b) => if *b { "true" } else { "false" }.to_string(),
            Value::Nil => "nil".to_string(),
            Value::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.display_string()).collect();
                format!("[{}]", parts.join(", "))
            }
            Value::Record(fields) => {
                let parts: Vec<String> = fields
                    .iter()
                    .map(|(k, v)| format!("{k}: {}", v.display_string()))
                    .collect();
                format!("{{ {} }}", parts.join(", "))
            }
            Value::Function(f) => format!("<fn({})>", f.params.join(", ")),
            Value::Builtin(b) => format!("<builtin {}>", b.name()),
            Value::Module(m) => format!("<module {}>", m.name()),
        }
    }

    /// Deep structural equality. NaN != NaN. Functions never equal.
    pub fn structural_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(x), Value::Number(y)) => {
                // NaN != NaN
                if x.is_nan() || y.is_nan() {
                    false
                } else {
                    x == y
                }
            }
            (Value::Str(x), Value::Str(y)) => x == y,
            (Value::Bool(x), Value::Bool(y)) => x == y,
            (Value::Nil, Value::Nil) => true,
            (Value::List(x), Value::List(y)) => {
                x.len() == y.len() && x.iter().zip(y.iter()).all(|(a, b)| a.structural_eq(b))
            }
            (Value::Record(fa), Value::Record(fb)) => {
                fa.len() == fb.len()
                    && fa
                        .iter()
                        .all(|(k, v)| fb.get(k).is_some_and(|v2| v.structural_eq(v2)))
            }
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            (Value::Module(a), Value::Module(b)) => a == b,
            // User functions never equal
            (Value::Function(_), _) | (_, Value::Function(_)) => false,
            _ => false,
        }
    }
}
