//! `table` module: small column-aware datasets built from record lists.
//!
//! A table is an ordinary record with two fields, `columns` (list of
//! column names in first-seen order) and `rows` (list of records), so the
//! result prints and serializes like any other value.

use super::{expect_list, expect_number, expect_string, one_arg, two_args, unknown_function};
use crate::error::{EvalError, EvalResult};
use crate::value::{Module, Value};
use std::collections::BTreeMap;

pub fn call(function: &str, args: Vec<Value>) -> EvalResult<Value> {
    match function {
        "from_records" => {
            let [records] = one_arg("from_records", args)?;
            from_records(&records)
        }
        "columns" => {
            let [t] = one_arg("columns", args)?;
            let (columns, _) = unpack("columns", &t)?;
            Ok(Value::List(columns))
        }
        "row_count" => {
            let [t] = one_arg("row_count", args)?;
            let (_, rows) = unpack("row_count", &t)?;
            Ok(Value::Number(rows.len() as f64))
        }
        "head" => {
            let [t, n] = two_args("head", args)?;
            let (columns, rows) = unpack("head", &t)?;
            let n = expect_number("head", &n)?;
            if n < 0.0 || n.fract() != 0.0 {
                return Err(EvalError::ModuleError(
                    "head() count must be a non-negative integer".into(),
                ));
            }
            let kept = rows.into_iter().take(n as usize).collect();
            Ok(make_table(columns, kept))
        }
        "select" => {
            let [t, names] = two_args("select", args)?;
            select(&t, &names)
        }
        "col" => {
            let [t, name] = two_args("col", args)?;
            let (_, rows) = unpack("col", &t)?;
            let name = expect_string("col", &name)?;
            let mut values = Vec::with_capacity(rows.len());
            for row in &rows {
                values.push(field_of(row, &name));
            }
            Ok(Value::List(values))
        }
        _ => Err(unknown_function(Module::Table, function)),
    }
}

fn from_records(records: &Value) -> EvalResult<Value> {
    let items = expect_list("from_records", records)?;
    let mut columns: Vec<String> = Vec::new();
    for item in &items {
        let fields = match item {
            Value::Record(fields) => fields,
            other => {
                return Err(EvalError::TypeMismatch(format!(
                    "from_records() requires a list of records, got {} element",
                    other.type_name()
                )));
            }
        };
        for key in fields.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }
    let columns = columns.into_iter().map(Value::Str).collect();
    Ok(make_table(columns, items))
}

fn select(t: &Value, names: &Value) -> EvalResult<Value> {
    let (columns, rows) = unpack("select", t)?;
    let wanted = expect_list("select", names)?;
    let mut keep: Vec<String> = Vec::with_capacity(wanted.len());
    for name in &wanted {
        let name = expect_string("select", name)?;
        if !columns.iter().any(|c| matches!(c, Value::Str(s) if *s == name)) {
            return Err(EvalError::ModuleError(format!(
                "select(): table has no column '{name}'"
            )));
        }
        keep.push(name);
    }

    let mut out_rows = Vec::with_capacity(rows.len());
    for row in &rows {
        let mut fields = BTreeMap::new();
        for name in &keep {
            fields.insert(name.clone(), field_of(row, name));
        }
        out_rows.push(Value::Record(fields));
    }
    let out_columns = keep.into_iter().map(Value::Str).collect();
    Ok(make_table(out_columns, out_rows))
}

fn make_table(columns: Vec<Value>, rows: Vec<Value>) -> Value {
    let mut fields = BTreeMap::new();
    fields.insert("columns".to_string(), Value::List(columns));
    fields.insert("rows".to_string(), Value::List(rows));
    Value::Record(fields)
}

/// Pull `columns` and `rows` out of a table record.
fn unpack(name: &str, t: &Value) -> EvalResult<(Vec<Value>, Vec<Value>)> {
    let fields = match t {
        Value::Record(fields) => fields,
        other => {
            return Err(EvalError::TypeMismatch(format!(
                "{name}() requires a table, got {}",
                other.type_name()
            )));
        }
    };
    let columns = match fields.get("columns") {
        Some(Value::List(cols)) => cols.clone(),
        _ => {
            return Err(EvalError::ModuleError(format!(
                "{name}() requires a table built by table.from_records()"
            )));
        }
    };
    let rows = match fields.get("rows") {
        Some(Value::List(rows)) => rows.clone(),
        _ => {
            return Err(EvalError::ModuleError(format!(
                "{name}() requires a table built by table.from_records()"
            )));
        }
    };
    Ok((columns, rows))
}

fn field_of(row: &Value, name: &str) -> Value {
    match row {
        Value::Record(fields) => fields.get(name).cloned().unwrap_or(Value::Nil),
        _ => Value::Nil,
    }
}
