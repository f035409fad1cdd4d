//! `charts` module: statistical summaries and histograms over number lists.

use super::{expect_number, expect_numbers, one_arg, two_args, unknown_function};
use crate::error::{EvalError, EvalResult};
use crate::value::{Module, Value};
use std::collections::BTreeMap;

const HIST_WIDTH: usize = 30;
/// Upper bound on bucket counts; `bins` is user input and sizes an
/// allocation, so it must be rejected before the `Vec` is built.
const MAX_BINS: usize = 10_000;

pub fn call(function: &str, args: Vec<Value>) -> EvalResult<Value> {
    match function {
        "hist" => {
            let [values, bins] = two_args("hist", args)?;
            hist(&values, &bins)
        }
        "summary" => {
            let [values] = one_arg("summary", args)?;
            summary(&values)
        }
        _ => Err(unknown_function(Module::Charts, function)),
    }
}

/// Text histogram with `bins` equal-width buckets over [min, max].
fn hist(values: &Value, bins: &Value) -> EvalResult<Value> {
    let values = expect_numbers("hist", values)?;
    let bins = expect_number("hist", bins)?;
    if values.is_empty() {
        return Err(EvalError::ModuleError("hist(): values must be non-empty".into()));
    }
    if bins < 1.0 || bins.fract() != 0.0 || bins > MAX_BINS as f64 {
        return Err(EvalError::ModuleError(format!(
            "hist(): bins must be an integer between 1 and {MAX_BINS}"
        )));
    }
    let bins = bins as usize;

    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;

    let mut counts = vec![0_usize; bins];
    for v in &values {
        let idx = if span == 0.0 {
            0
        } else {
            (((v - min) / span) * bins as f64).floor() as usize
        };
        counts[idx.min(bins - 1)] += 1;
    }

    let peak = counts.iter().copied().max().unwrap_or(1).max(1);
    let width = span / bins as f64;
    let mut out = String::new();
    for (i, count) in counts.iter().enumerate() {
        let lo = min + width * i as f64;
        let hi = min + width * (i + 1) as f64;
        let bar_len = if *count == 0 {
            0
        } else {
            ((count * HIST_WIDTH) / peak).max(1)
        };
        let bar = "#".repeat(bar_len);
        out.push_str(&format!(
            "[{}, {}) {} {}\n",
            Value::Number(lo).display_string(),
            Value::Number(hi).display_string(),
            bar,
            count
        ));
    }
    Ok(Value::Str(out.trim_end().to_string()))
}

/// Descriptive statistics record: count, min, max, mean, median.
fn summary(values: &Value) -> EvalResult<Value> {
    let values = expect_numbers("summary", values)?;
    if values.is_empty() {
        return Err(EvalError::ModuleError("summary(): values must be non-empty".into()));
    }

    let count = values.len();
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let mean = values.iter().sum::<f64>() / count as f64;

    let mut sorted = values;
    sorted.sort_by(|a, b| a.total_cmp(b));
    let median = if count % 2 == 1 {
        sorted[count / 2]
    } else {
        (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
    };

    let mut fields = BTreeMap::new();
    fields.insert("count".to_string(), Value::Number(count as f64));
    fields.insert("min".to_string(), Value::Number(min));
    fields.insert("max".to_string(), Value::Number(max));
    fields.insert("mean".to_string(), Value::Number(mean));
    fields.insert("median".to_string(), Value::Number(median));
    Ok(Value::Record(fields))
}
