//! Scoped variable environment for the slate evaluator.
//!
//! One [`Environment`] is the shared, persistent bindings table of a
//! notebook session: the global scope holds everything cells define, plus
//! the prelude bindings installed at session start. Nested scopes exist
//! only for the duration of function bodies and loop bodies.

use crate::value::{Builtin, Module, Value};
use std::collections::BTreeMap;

/// A single scope level.
#[derive(Debug, Clone)]
struct Scope {
    bindings: BTreeMap<String, Value>,
}

impl Scope {
    fn new() -> Self {
        Self {
            bindings: BTreeMap::new(),
        }
    }
}

/// Scoped variable environment with push/pop semantics.
///
/// Variables are looked up from innermost scope outward.
/// `define` creates or overwrites in the current (innermost) scope.
/// `assign` updates the first scope where the variable exists, falling
/// back to defining in the innermost scope (last write wins).
#[derive(Debug, Clone)]
pub struct Environment {
    scopes: Vec<Scope>,
}

impl Environment {
    /// Create a new environment with one empty global scope.
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new()],
        }
    }

    /// Create an environment pre-populated with the prelude bindings.
    ///
    /// This is the notebook's default Execution Environment: the module
    /// library, the global builtins, and the guarded `input` binding.
    /// Cells may shadow any of these; a session reset restores them.
    pub fn with_prelude() -> Self {
        let mut env = Self::new();
        for module in [
            Module::Num,
            Module::Table,
            Module::Plot,
            Module::Charts,
            Module::Re,
            Module::Db,
            Module::Time,
        ] {
            env.define(module.name(), Value::Module(module));
        }
        for builtin in [
            Builtin::Print,
            Builtin::Len,
            Builtin::Str,
            Builtin::Type,
            Builtin::Input,
        ] {
            env.define(builtin.name(), Value::Builtin(builtin));
        }
        env
    }

    /// Push a new scope (for function bodies, loop bodies).
    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::new());
    }

    /// Pop the innermost scope.
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Define a variable in the current (innermost) scope.
    pub fn define(&mut self, name: &str, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.bindings.insert(name.to_string(), value);
        }
    }

    /// Look up a variable, searching from innermost to outermost scope.
    pub fn get(&self, name: &str) -> Option<&Value> {
        for scope in self.scopes.iter().rev() {
            if let Some(v) = scope.bindings.get(name) {
                return Some(v);
            }
        }
        None
    }

    /// Assign a variable: update it in the first scope where it exists,
    /// or define it in the innermost scope if it does not exist anywhere.
    pub fn assign(&mut self, name: &str, value: Value) {
        for scope in self.scopes.iter_mut().rev() {
            if scope.bindings.contains_key(name) {
                scope.bindings.insert(name.to_string(), value);
                return;
            }
        }
        self.define(name, value);
    }

    /// Get all bindings in the global (outermost) scope.
    pub fn global_bindings(&self) -> &BTreeMap<String, Value> {
        &self.scopes[0].bindings
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
