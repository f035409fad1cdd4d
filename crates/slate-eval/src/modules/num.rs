//! `num` module: scalar math and numeric sequences.

use super::{expect_number, expect_numbers, one_arg, three_args, unknown_function};
use crate::error::{EvalError, EvalResult};
use crate::value::{Module, Value};

/// Upper bound on generated sequence lengths. `range` and `linspace`
/// take user-supplied sizes that drive allocations, so oversized
/// requests fault instead of attempting the build.
const MAX_SEQUENCE_LEN: usize = 1_000_000;

pub fn call(function: &str, args: Vec<Value>) -> EvalResult<Value> {
    match function {
        "abs" => map_scalar("abs", args, f64::abs),
        "floor" => map_scalar("floor", args, f64::floor),
        "ceil" => map_scalar("ceil", args, f64::ceil),
        "round" => map_scalar("round", args, f64::round),
        "sqrt" => {
            let [v] = one_arg("sqrt", args)?;
            let n = expect_number("sqrt", &v)?;
            if n < 0.0 {
                return Err(EvalError::ArithmeticTrap(format!(
                    "sqrt of negative number {}",
                    Value::Number(n).display_string()
                )));
            }
            Ok(Value::Number(n.sqrt()))
        }
        "min" => reduce("min", args, |acc, n| acc.min(n)),
        "max" => reduce("max", args, |acc, n| acc.max(n)),
        "sum" => {
            let [v] = one_arg("sum", args)?;
            let nums = expect_numbers("sum", &v)?;
            finite("sum", nums.iter().sum())
        }
        "mean" => {
            let [v] = one_arg("mean", args)?;
            let nums = expect_numbers("mean", &v)?;
            if nums.is_empty() {
                return Err(EvalError::ArithmeticTrap("mean of empty list".into()));
            }
            finite("mean", nums.iter().sum::<f64>() / nums.len() as f64)
        }
        "range" => range(args),
        "linspace" => {
            let [start, stop, count] = three_args("linspace", args)?;
            let start = expect_number("linspace", &start)?;
            let stop = expect_number("linspace", &stop)?;
            let count = expect_number("linspace", &count)?;
            if count < 2.0 || count.fract() != 0.0 || count > MAX_SEQUENCE_LEN as f64 {
                return Err(EvalError::ModuleError(format!(
                    "linspace() count must be an integer between 2 and {MAX_SEQUENCE_LEN}"
                )));
            }
            let count = count as usize;
            let step = (stop - start) / (count - 1) as f64;
            let points = (0..count)
                .map(|i| Value::Number(start + step * i as f64))
                .collect();
            Ok(Value::List(points))
        }
        _ => Err(unknown_function(Module::Num, function)),
    }
}

fn map_scalar(name: &str, args: Vec<Value>, op: fn(f64) -> f64) -> EvalResult<Value> {
    let [v] = one_arg(name, args)?;
    let n = expect_number(name, &v)?;
    finite(name, op(n))
}

fn reduce(name: &str, args: Vec<Value>, op: fn(f64, f64) -> f64) -> EvalResult<Value> {
    let [v] = one_arg(name, args)?;
    let nums = expect_numbers(name, &v)?;
    let mut iter = nums.into_iter();
    let first = iter.next().ok_or_else(|| {
        EvalError::ArithmeticTrap(format!("{name} of empty list"))
    })?;
    Ok(Value::Number(iter.fold(first, op)))
}

/// `range(stop)` or `range(start, stop)`, step 1, stop exclusive.
fn range(args: Vec<Value>) -> EvalResult<Value> {
    let (start, stop) = match args.len() {
        1 => (0.0, expect_number("range", &args[0])?),
        2 => (
            expect_number("range", &args[0])?,
            expect_number("range", &args[1])?,
        ),
        n => {
            return Err(EvalError::TypeMismatch(format!(
                "range() expects 1 or 2 arguments, got {n}"
            )));
        }
    };
    if start.fract() != 0.0 || stop.fract() != 0.0 {
        return Err(EvalError::ModuleError("range() bounds must be integers".into()));
    }
    if stop - start > MAX_SEQUENCE_LEN as f64 {
        return Err(EvalError::ModuleError(format!(
            "range() span must not exceed {MAX_SEQUENCE_LEN}"
        )));
    }
    let mut items = Vec::new();
    let mut i = start;
    while i < stop {
        items.push(Value::Number(i));
        i += 1.0;
    }
    Ok(Value::List(items))
}

fn finite(name: &str, n: f64) -> EvalResult<Value> {
    if n.is_nan() || n.is_infinite() {
        Err(EvalError::ArithmeticTrap(format!(
            "{name} produced NaN/Infinity"
        )))
    } else {
        Ok(Value::Number(n))
    }
}
