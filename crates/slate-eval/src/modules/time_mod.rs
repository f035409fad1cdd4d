//! `time` module: wall-clock reads.

use super::{no_args, unknown_function};
use crate::error::{EvalError, EvalResult};
use crate::value::{Module, Value};
use std::time::{SystemTime, UNIX_EPOCH};

pub fn call(function: &str, args: Vec<Value>) -> EvalResult<Value> {
    match function {
        "now" => {
            no_args("now", args)?;
            Ok(Value::Number(epoch()?.as_secs_f64()))
        }
        "millis" => {
            no_args("millis", args)?;
            Ok(Value::Number(epoch()?.as_millis() as f64))
        }
        _ => Err(unknown_function(Module::Time, function)),
    }
}

fn epoch() -> EvalResult<std::time::Duration> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|_| EvalError::ModuleError("system clock is before the epoch".into()))
}
