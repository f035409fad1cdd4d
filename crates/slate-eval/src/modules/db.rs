//! `db` module: an in-value record store.
//!
//! The store is an ordinary record threaded through the program by value;
//! `insert` returns a new store rather than mutating its argument, so a
//! store survives in the environment like any other binding.

use super::{expect_string, no_args, two_args, unknown_function};
use crate::error::{EvalError, EvalResult};
use crate::value::{Module, Value};
use std::collections::BTreeMap;

pub fn call(function: &str, args: Vec<Value>) -> EvalResult<Value> {
    match function {
        "open" => {
            no_args("open", args)?;
            let mut fields = BTreeMap::new();
            fields.insert("tables".to_string(), Value::Record(BTreeMap::new()));
            Ok(Value::Record(fields))
        }
        "insert" => {
            if args.len() != 3 {
                return Err(EvalError::TypeMismatch(format!(
                    "insert() expects 3 arguments, got {}",
                    args.len()
                )));
            }
            let mut args = args.into_iter();
            let store = args.next().unwrap();
            let name = expect_string("insert", &args.next().unwrap())?;
            let row = args.next().unwrap();
            insert(store, &name, row)
        }
        "all" => {
            let [store, name] = two_args("all", args)?;
            let name = expect_string("all", &name)?;
            Ok(Value::List(rows_of(&store, &name, "all")?))
        }
        "count" => {
            let [store, name] = two_args("count", args)?;
            let name = expect_string("count", &name)?;
            let rows = rows_of(&store, &name, "count")?;
            Ok(Value::Number(rows.len() as f64))
        }
        "find" => {
            if args.len() != 4 {
                return Err(EvalError::TypeMismatch(format!(
                    "find() expects 4 arguments, got {}",
                    args.len()
                )));
            }
            let mut args = args.into_iter();
            let store = args.next().unwrap();
            let name = expect_string("find", &args.next().unwrap())?;
            let key = expect_string("find", &args.next().unwrap())?;
            let wanted = args.next().unwrap();
            let rows = rows_of(&store, &name, "find")?;
            let matched = rows
                .into_iter()
                .filter(|row| match row {
                    Value::Record(fields) => fields
                        .get(&key)
                        .map(|v| v.structural_eq(&wanted))
                        .unwrap_or(false),
                    _ => false,
                })
                .collect();
            Ok(Value::List(matched))
        }
        _ => Err(unknown_function(Module::Db, function)),
    }
}

fn insert(store: Value, name: &str, row: Value) -> EvalResult<Value> {
    if !matches!(row, Value::Record(_)) {
        return Err(EvalError::TypeMismatch(format!(
            "insert() requires a record row, got {}",
            row.type_name()
        )));
    }
    let mut fields = match store {
        Value::Record(fields) => fields,
        other => {
            return Err(EvalError::TypeMismatch(format!(
                "insert() requires a store from db.open(), got {}",
                other.type_name()
            )));
        }
    };
    let mut tables = match fields.remove("tables") {
        Some(Value::Record(tables)) => tables,
        _ => {
            return Err(EvalError::ModuleError(
                "insert() requires a store from db.open()".into(),
            ));
        }
    };
    let mut rows = match tables.remove(name) {
        Some(Value::List(rows)) => rows,
        _ => Vec::new(),
    };
    rows.push(row);
    tables.insert(name.to_string(), Value::List(rows));
    fields.insert("tables".to_string(), Value::Record(tables));
    Ok(Value::Record(fields))
}

fn rows_of(store: &Value, name: &str, func: &str) -> EvalResult<Vec<Value>> {
    let fields = match store {
        Value::Record(fields) => fields,
        other => {
            return Err(EvalError::TypeMismatch(format!(
                "{func}() requires a store from db.open(), got {}",
                other.type_name()
            )));
        }
    };
    let tables = match fields.get("tables") {
        Some(Value::Record(tables)) => tables,
        _ => {
            return Err(EvalError::ModuleError(format!(
                "{func}() requires a store from db.open()"
            )));
        }
    };
    Ok(match tables.get(name) {
        Some(Value::List(rows)) => rows.clone(),
        _ => Vec::new(),
    })
}
