//! Core expression and statement evaluator.
//!
//! The evaluator borrows the session's [`Environment`] mutably: top-level
//! bindings a cell creates persist in the environment after the call
//! returns, including bindings made before a later statement faults.

use crate::env::Environment;
use crate::error::{EvalError, EvalResult};
use crate::modules::{self, expect_number, expect_string, one_arg, two_args};
use crate::value::{Builtin, FunctionValue, Value};
use slate_types::ast::*;
use slate_types::Span;
use std::collections::BTreeMap;
use std::sync::Arc;

/// The core evaluator — walks AST nodes and produces Values.
pub struct Evaluator<'env> {
    /// Shared variable environment, mutated in place.
    env: &'env mut Environment,
    /// Captured `print` output lines.
    pub output: Vec<String>,
    /// Span of the node currently being evaluated (for fault traces).
    current_span: Span,
}

impl<'env> Evaluator<'env> {
    /// Create an evaluator over the given environment.
    pub fn new(env: &'env mut Environment) -> Self {
        Self {
            env,
            output: Vec::new(),
            current_span: Span::point(1, 1),
        }
    }

    /// The span of the most recently entered AST node.
    ///
    /// After a fault this is (approximately) where the fault was raised.
    pub fn fault_span(&self) -> Span {
        self.current_span
    }

    /// The captured print output joined into one text block.
    pub fn captured_output(&self) -> String {
        self.output.join("\n")
    }

    // ══════════════════════════════════════════════════════════════════════
    // Program & statement execution
    // ══════════════════════════════════════════════════════════════════════

    /// Execute a whole cell program. Returns the value of the last
    /// statement, or Nil for an empty program.
    pub fn eval_program(&mut self, program: &Program) -> EvalResult<Value> {
        let mut last = Value::Nil;
        for stmt in &program.stmts {
            last = match self.eval_stmt(stmt) {
                Err(EvalError::Return(_)) => return Err(EvalError::ReturnOutsideFunction),
                other => other?,
            };
        }
        Ok(last)
    }

    /// Execute a block of statements. Returns the value of the last
    /// statement, or Nil.
    fn eval_block(&mut self, block: &Block) -> EvalResult<Value> {
        let mut last = Value::Nil;
        for stmt in &block.stmts {
            last = self.eval_stmt(stmt)?;
        }
        Ok(last)
    }

    /// Execute a single statement.
    fn eval_stmt(&mut self, stmt: &Stmt) -> EvalResult<Value> {
        self.current_span = stmt.span();
        match stmt {
            Stmt::Assign(assign) => {
                let value = self.eval_expr(&assign.value)?;
                self.env.assign(&assign.target.name, value);
                Ok(Value::Nil)
            }
            Stmt::If(if_stmt) => self.eval_if(if_stmt),
            Stmt::While(while_stmt) => self.eval_while(while_stmt),
            Stmt::For(for_stmt) => self.eval_for(for_stmt),
            Stmt::Return(ret) => {
                let value = match &ret.value {
                    Some(expr) => self.eval_expr(expr)?,
                    None => Value::Nil,
                };
                Err(EvalError::Return(value))
            }
            Stmt::Expr(expr_stmt) => self.eval_expr(&expr_stmt.expr),
        }
    }

    fn eval_if(&mut self, if_stmt: &IfStmt) -> EvalResult<Value> {
        let cond = self.eval_expr(&if_stmt.condition)?;
        if cond.is_truthy() {
            self.eval_block(&if_stmt.then_block)
        } else if let Some(else_branch) = &if_stmt.else_branch {
            match else_branch {
                ElseBranch::ElseIf(elif) => self.eval_if(elif),
                ElseBranch::Block(block) => self.eval_block(block),
            }
        } else {
            Ok(Value::Nil)
        }
    }

    fn eval_while(&mut self, while_stmt: &WhileStmt) -> EvalResult<Value> {
        // No iteration cap: a non-terminating loop blocks the session,
        // which is the engine's documented resource model.
        let mut last = Value::Nil;
        loop {
            let cond = self.eval_expr(&while_stmt.condition)?;
            if !cond.is_truthy() {
                break;
            }
            last = self.eval_block(&while_stmt.body)?;
        }
        Ok(last)
    }

    fn eval_for(&mut self, for_stmt: &ForStmt) -> EvalResult<Value> {
        let iterable = self.eval_expr(&for_stmt.iterable)?;
        let items = match iterable {
            Value::List(items) => items,
            other => {
                return Err(EvalError::TypeMismatch(format!(
                    "for loop requires list, got {}",
                    other.type_name()
                )));
            }
        };

        self.env.push_scope();
        let mut last = Value::Nil;
        for item in items {
            self.env.define(&for_stmt.item.name, item);
            match self.eval_block(&for_stmt.body) {
                Ok(v) => last = v,
                Err(e) => {
                    self.env.pop_scope();
                    return Err(e);
                }
            }
        }
        self.env.pop_scope();
        Ok(last)
    }

    // ══════════════════════════════════════════════════════════════════════
    // Expression evaluation
    // ══════════════════════════════════════════════════════════════════════

    /// Evaluate an expression to a Value.
    pub fn eval_expr(&mut self, expr: &Expr) -> EvalResult<Value> {
        self.current_span = expr.span;
        match &expr.kind {
            ExprKind::NumberLit(n) => Ok(Value::Number(*n)),
            ExprKind::StringLit(s) => Ok(Value::Str(s.clone())),
            ExprKind::BoolLit(b) => Ok(Value::Bool(*b)),
            ExprKind::NilLit => Ok(Value::Nil),

            ExprKind::ListLit(elems) => {
                let mut values = Vec::with_capacity(elems.len());
                for elem in elems {
                    values.push(self.eval_expr(elem)?);
                }
                Ok(Value::List(values))
            }
            ExprKind::RecordLit(entries) => {
                let mut fields = BTreeMap::new();
                for entry in entries {
                    let val = self.eval_expr(&entry.value)?;
                    fields.insert(entry.name.name.clone(), val);
                }
                Ok(Value::Record(fields))
            }

            ExprKind::Identifier(name) => self
                .env
                .get(name)
                .cloned()
                .ok_or_else(|| EvalError::UndefinedVariable(name.clone())),

            ExprKind::Call { name, args } => self.eval_call(&name.name, args),
            ExprKind::FieldAccess { object, field } => self.eval_field_access(object, &field.name),
            ExprKind::MethodCall {
                object,
                method,
                args,
            } => self.eval_method_call(object, &method.name, args),

            ExprKind::Binary { left, op, right } => self.eval_binary(left, *op, right),
            ExprKind::Unary { op, operand } => self.eval_unary(*op, operand),
            ExprKind::Lambda(lambda) => self.eval_lambda(lambda),
            ExprKind::Paren(inner) => self.eval_expr(inner),
        }
    }

    // ── Calls ────────────────────────────────────────────────────────────

    /// Evaluate an unqualified call: `func(args)`.
    fn eval_call(&mut self, name: &str, args: &[Expr]) -> EvalResult<Value> {
        let callee = match self.env.get(name).cloned() {
            Some(v) => v,
            None => return Err(EvalError::UnknownFunction(name.to_string())),
        };
        let mut arg_vals = Vec::with_capacity(args.len());
        for arg in args {
            arg_vals.push(self.eval_expr(arg)?);
        }
        match callee {
            Value::Function(f) => self.call_function(&f, arg_vals),
            Value::Builtin(b) => self.call_builtin(b, arg_vals),
            other => Err(EvalError::TypeMismatch(format!(
                "'{name}' is not callable (type {})",
                other.type_name()
            ))),
        }
    }

    /// Call a user-defined function with already-evaluated arguments.
    fn call_function(&mut self, f: &Arc<FunctionValue>, args: Vec<Value>) -> EvalResult<Value> {
        if args.len() != f.params.len() {
            return Err(EvalError::TypeMismatch(format!(
                "function expects {} argument(s), got {}",
                f.params.len(),
                args.len()
            )));
        }

        // Run the body over the captured environment snapshot; print output
        // still goes to this evaluator's capture buffer.
        let mut local = f.captured.clone();
        local.push_scope();
        for (param, arg) in f.params.iter().zip(args) {
            local.define(param, arg);
        }

        std::mem::swap(&mut *self.env, &mut local);
        let result = self.eval_block(&f.body);
        std::mem::swap(&mut *self.env, &mut local);

        match result {
            Ok(value) => Ok(value),
            Err(EvalError::Return(value)) => Ok(value),
            Err(e) => Err(e),
        }
    }

    /// Call a prelude builtin.
    fn call_builtin(&mut self, builtin: Builtin, args: Vec<Value>) -> EvalResult<Value> {
        match builtin {
            Builtin::Print => {
                let line: Vec<String> = args.iter().map(|v| v.display_string()).collect();
                self.output.push(line.join(" "));
                Ok(Value::Nil)
            }
            Builtin::Len => {
                let [arg] = one_arg("len", args)?;
                let n = match &arg {
                    Value::List(items) => items.len(),
                    Value::Str(s) => s.chars().count(),
                    Value::Record(fields) => fields.len(),
                    other => {
                        return Err(EvalError::TypeMismatch(format!(
                            "len() requires list, string, or record, got {}",
                            other.type_name()
                        )));
                    }
                };
                Ok(Value::Number(n as f64))
            }
            Builtin::Str => {
                let [arg] = one_arg("str", args)?;
                Ok(Value::Str(arg.display_string()))
            }
            Builtin::Type => {
                let [arg] = one_arg("type", args)?;
                Ok(Value::Str(arg.type_name().to_string()))
            }
            Builtin::Input => {
                let prompt = args
                    .first()
                    .map(|v| v.display_string())
                    .unwrap_or_default();
                Err(EvalError::InputRejected(prompt))
            }
        }
    }

    // ── Field access & method calls ──────────────────────────────────────

    fn eval_field_access(&mut self, object: &Expr, field: &str) -> EvalResult<Value> {
        let obj = self.eval_expr(object)?;
        match &obj {
            Value::Record(fields) => fields
                .get(field)
                .cloned()
                .ok_or_else(|| EvalError::Runtime(format!("record has no field '{field}'"))),
            Value::Nil => Err(EvalError::NilAccess(format!(
                "cannot access field '{field}' on nil"
            ))),
            Value::Module(m) => Err(EvalError::ModuleError(format!(
                "module '{}' has no field '{field}'; call {}.{field}(...)",
                m.name(),
                m.name()
            ))),
            other => Err(EvalError::TypeMismatch(format!(
                "cannot access field '{field}' on {}",
                other.type_name()
            ))),
        }
    }

    fn eval_method_call(
        &mut self,
        object: &Expr,
        method: &str,
        args: &[Expr],
    ) -> EvalResult<Value> {
        let obj = self.eval_expr(object)?;
        let mut arg_vals = Vec::with_capacity(args.len());
        for arg in args {
            arg_vals.push(self.eval_expr(arg)?);
        }
        match obj {
            Value::Module(module) => modules::call(module, method, arg_vals),
            Value::List(items) => self.call_list_method(items, method, arg_vals),
            Value::Str(s) => self.call_string_method(&s, method, arg_vals),
            Value::Record(fields) => self.call_record_method(&fields, method, arg_vals),
            Value::Nil => Err(EvalError::NilAccess(format!(
                "cannot call method '{method}' on nil"
            ))),
            other => Err(EvalError::TypeMismatch(format!(
                "cannot call method '{method}' on {}",
                other.type_name()
            ))),
        }
    }

    /// Methods on list values.
    fn call_list_method(
        &mut self,
        items: Vec<Value>,
        method: &str,
        args: Vec<Value>,
    ) -> EvalResult<Value> {
        match method {
            "length" => Ok(Value::Number(items.len() as f64)),
            "get" => {
                let [idx] = one_arg("get", args)?;
                let idx = expect_number("get", &idx)?;
                let i = idx as usize;
                if idx < 0.0 || idx.fract() != 0.0 || i >= items.len() {
                    return Err(EvalError::Runtime(format!(
                        "list index {} out of range (length {})",
                        idx,
                        items.len()
                    )));
                }
                Ok(items[i].clone())
            }
            "append" => {
                let [value] = one_arg("append", args)?;
                let mut next = items;
                next.push(value);
                Ok(Value::List(next))
            }
            "contains" => {
                let [value] = one_arg("contains", args)?;
                Ok(Value::Bool(items.iter().any(|v| v.structural_eq(&value))))
            }
            "join" => {
                let [sep] = one_arg("join", args)?;
                let sep = expect_string("join", &sep)?;
                let parts: Vec<String> = items.iter().map(|v| v.display_string()).collect();
                Ok(Value::Str(parts.join(&sep)))
            }
            "map" => {
                let [func] = one_arg("map", args)?;
                let f = match func {
                    Value::Function(f) => f,
                    other => {
                        return Err(EvalError::TypeMismatch(format!(
                            "map() requires function, got {}",
                            other.type_name()
                        )));
                    }
                };
                let mut mapped = Vec::with_capacity(items.len());
                for item in items {
                    mapped.push(self.call_function(&f, vec![item])?);
                }
                Ok(Value::List(mapped))
            }
            "filter" => {
                let [func] = one_arg("filter", args)?;
                let f = match func {
                    Value::Function(f) => f,
                    other => {
                        return Err(EvalError::TypeMismatch(format!(
                            "filter() requires function, got {}",
                            other.type_name()
                        )));
                    }
                };
                let mut kept = Vec::new();
                for item in items {
                    if self.call_function(&f, vec![item.clone()])?.is_truthy() {
                        kept.push(item);
                    }
                }
                Ok(Value::List(kept))
            }
            _ => Err(EvalError::Runtime(format!(
                "list has no method '{method}'"
            ))),
        }
    }

    /// Methods on string values.
    fn call_string_method(
        &mut self,
        s: &str,
        method: &str,
        args: Vec<Value>,
    ) -> EvalResult<Value> {
        match method {
            "length" => Ok(Value::Number(s.chars().count() as f64)),
            "upper" => Ok(Value::Str(s.to_uppercase())),
            "lower" => Ok(Value::Str(s.to_lowercase())),
            "trim" => Ok(Value::Str(s.trim().to_string())),
            "contains" => {
                let [needle] = one_arg("contains", args)?;
                let needle = expect_string("contains", &needle)?;
                Ok(Value::Bool(s.contains(&needle)))
            }
            "split" => {
                let [sep] = one_arg("split", args)?;
                let sep = expect_string("split", &sep)?;
                let parts = s
                    .split(&sep as &str)
                    .map(|p| Value::Str(p.to_string()))
                    .collect();
                Ok(Value::List(parts))
            }
            "replace" => {
                let [from, to] = two_args("replace", args)?;
                let from = expect_string("replace", &from)?;
                let to = expect_string("replace", &to)?;
                Ok(Value::Str(s.replace(&from, &to)))
            }
            _ => Err(EvalError::Runtime(format!(
                "string has no method '{method}'"
            ))),
        }
    }

    /// Methods on record values.
    fn call_record_method(
        &mut self,
        fields: &BTreeMap<String, Value>,
        method: &str,
        args: Vec<Value>,
    ) -> EvalResult<Value> {
        match method {
            "keys" => Ok(Value::List(
                fields.keys().map(|k| Value::Str(k.clone())).collect(),
            )),
            "has" => {
                let [key] = one_arg("has", args)?;
                let key = expect_string("has", &key)?;
                Ok(Value::Bool(fields.contains_key(&key)))
            }
            "get" => {
                let [key] = one_arg("get", args)?;
                let key = expect_string("get", &key)?;
                Ok(fields.get(&key).cloned().unwrap_or(Value::Nil))
            }
            _ => Err(EvalError::Runtime(format!(
                "record has no method '{method}'"
            ))),
        }
    }

    // ── Operators ────────────────────────────────────────────────────────

    fn eval_binary(&mut self, left: &Expr, op: BinOp, right: &Expr) -> EvalResult<Value> {
        // Short-circuit for logical operators
        if op == BinOp::And {
            let lv = self.eval_expr(left)?;
            return if !lv.is_truthy() {
                Ok(Value::Bool(false))
            } else {
                let rv = self.eval_expr(right)?;
                Ok(Value::Bool(rv.is_truthy()))
            };
        }
        if op == BinOp::Or {
            let lv = self.eval_expr(left)?;
            return if lv.is_truthy() {
                Ok(Value::Bool(true))
            } else {
                let rv = self.eval_expr(right)?;
                Ok(Value::Bool(rv.is_truthy()))
            };
        }

        let lv = self.eval_expr(left)?;
        let rv = self.eval_expr(right)?;

        match op {
            BinOp::Add => eval_add(&lv, &rv),
            BinOp::Sub => eval_arith(&lv, &rv, |a, b| a - b, "-"),
            BinOp::Mul => eval_arith(&lv, &rv, |a, b| a * b, "*"),
            BinOp::Div => {
                if let (Value::Number(a), Value::Number(b)) = (&lv, &rv) {
                    if *b == 0.0 {
                        return Err(EvalError::ArithmeticTrap("division by zero".into()));
                    }
                    let result = a / b;
                    if result.is_nan() || result.is_infinite() {
                        return Err(EvalError::ArithmeticTrap(
                            "division produced NaN/Infinity".into(),
                        ));
                    }
                    Ok(Value::Number(result))
                } else {
                    Err(EvalError::TypeMismatch(format!(
                        "cannot divide {} by {}",
                        lv.type_name(),
                        rv.type_name()
                    )))
                }
            }
            BinOp::Mod => {
                if let (Value::Number(a), Value::Number(b)) = (&lv, &rv) {
                    if *b == 0.0 {
                        return Err(EvalError::ArithmeticTrap("modulo by zero".into()));
                    }
                    Ok(Value::Number(a % b))
                } else {
                    Err(EvalError::TypeMismatch(format!(
                        "cannot modulo {} by {}",
                        lv.type_name(),
                        rv.type_name()
                    )))
                }
            }
            BinOp::Eq => Ok(Value::Bool(lv.structural_eq(&rv))),
            BinOp::NotEq => Ok(Value::Bool(!lv.structural_eq(&rv))),
            BinOp::Less => eval_comparison(&lv, &rv, |o| o.is_lt()),
            BinOp::Greater => eval_comparison(&lv, &rv, |o| o.is_gt()),
            BinOp::LessEq => eval_comparison(&lv, &rv, |o| o.is_le()),
            BinOp::GreaterEq => eval_comparison(&lv, &rv, |o| o.is_ge()),
            BinOp::And | BinOp::Or => unreachable!("handled above"),
        }
    }

    fn eval_unary(&mut self, op: UnaryOp, operand: &Expr) -> EvalResult<Value> {
        let val = self.eval_expr(operand)?;
        match op {
            UnaryOp::Neg => {
                if let Value::Number(n) = val {
                    Ok(Value::Number(-n))
                } else {
                    Err(EvalError::TypeMismatch(format!(
                        "cannot negate {}",
                        val.type_name()
                    )))
                }
            }
            UnaryOp::Not => Ok(Value::Bool(!val.is_truthy())),
        }
    }

    fn eval_lambda(&mut self, lambda: &LambdaExpr) -> EvalResult<Value> {
        // Capture the current environment snapshot for the closure
        let captured = self.env.clone();
        let params: Vec<String> = lambda.params.iter().map(|p| p.name.clone()).collect();
        Ok(Value::Function(Arc::new(FunctionValue {
            params,
            body: lambda.body.clone(),
            captured,
        })))
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Operator helpers
// ══════════════════════════════════════════════════════════════════════════

fn eval_add(lv: &Value, rv: &Value) -> EvalResult<Value> {
    match (lv, rv) {
        (Value::Number(a), Value::Number(b)) => {
            let result = a + b;
            if result.is_nan() || result.is_infinite() {
                Err(EvalError::ArithmeticTrap(
                    "addition produced NaN/Infinity".into(),
                ))
            } else {
                Ok(Value::Number(result))
            }
        }
        (Value::Str(a), Value::Str(b)) => Ok(Value::Str(format!("{a}{b}"))),
        (Value::List(a), Value::List(b)) => {
            let mut joined = a.clone();
            joined.extend(b.iter().cloned());
            Ok(Value::List(joined))
        }
        _ => Err(EvalError::TypeMismatch(format!(
            "cannot add {} and {}",
            lv.type_name(),
            rv.type_name()
        ))),
    }
}

fn eval_arith(lv: &Value, rv: &Value, op: fn(f64, f64) -> f64, symbol: &str) -> EvalResult<Value> {
    if let (Value::Number(a), Value::Number(b)) = (lv, rv) {
        let result = op(*a, *b);
        if result.is_nan() || result.is_infinite() {
            Err(EvalError::ArithmeticTrap(format!(
                "{symbol} produced NaN/Infinity"
            )))
        } else {
            Ok(Value::Number(result))
        }
    } else {
        Err(EvalError::TypeMismatch(format!(
            "cannot apply '{symbol}' to {} and {}",
            lv.type_name(),
            rv.type_name()
        )))
    }
}

fn eval_comparison(
    lv: &Value,
    rv: &Value,
    accept: fn(std::cmp::Ordering) -> bool,
) -> EvalResult<Value> {
    match (lv, rv) {
        (Value::Number(a), Value::Number(b)) => {
            let ord = a.partial_cmp(b).ok_or_else(|| {
                EvalError::ArithmeticTrap("cannot compare NaN".into())
            })?;
            Ok(Value::Bool(accept(ord)))
        }
        (Value::Str(a), Value::Str(b)) => Ok(Value::Bool(accept(a.cmp(b)))),
        _ => Err(EvalError::TypeMismatch(format!(
            "cannot compare {} and {}",
            lv.type_name(),
            rv.type_name()
        ))),
    }
}

