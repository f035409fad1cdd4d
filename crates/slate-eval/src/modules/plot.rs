//! `plot` module: text renderings of simple charts.
//!
//! Output is plain multi-line text, so a chart shows up in a cell's
//! output the same way `print` text does.

use super::{expect_list, expect_numbers, expect_string, one_arg, two_args, unknown_function};
use crate::error::{EvalError, EvalResult};
use crate::value::{Module, Value};

const BAR_WIDTH: usize = 40;
const LINE_HEIGHT: usize = 8;

pub fn call(function: &str, args: Vec<Value>) -> EvalResult<Value> {
    match function {
        "bar" => {
            let [labels, values] = two_args("bar", args)?;
            bar(&labels, &values)
        }
        "line" => {
            let [values] = one_arg("line", args)?;
            line(&values)
        }
        _ => Err(unknown_function(Module::Plot, function)),
    }
}

/// Horizontal bar chart, one row per label, widths scaled to the maximum.
fn bar(labels: &Value, values: &Value) -> EvalResult<Value> {
    let labels = expect_list("bar", labels)?;
    let values = expect_numbers("bar", values)?;
    if labels.len() != values.len() {
        return Err(EvalError::ModuleError(format!(
            "bar(): {} labels but {} values",
            labels.len(),
            values.len()
        )));
    }
    if values.iter().any(|v| *v < 0.0) {
        return Err(EvalError::ModuleError("bar(): values must be non-negative".into()));
    }

    let labels: Vec<String> = labels
        .iter()
        .map(|l| expect_string("bar", l))
        .collect::<EvalResult<_>>()?;
    let label_width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let max = values.iter().cloned().fold(0.0_f64, f64::max);

    let mut out = String::new();
    for (label, value) in labels.iter().zip(&values) {
        let width = if max > 0.0 {
            ((value / max) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        out.push_str(&format!(
            "{label:<label_width$} | {} {}\n",
            "#".repeat(width),
            Value::Number(*value).display_string()
        ));
    }
    Ok(Value::Str(out.trim_end().to_string()))
}

/// Line chart on a fixed-height character grid, one column per point.
fn line(values: &Value) -> EvalResult<Value> {
    let values = expect_numbers("line", values)?;
    if values.is_empty() {
        return Err(EvalError::ModuleError("line(): values must be non-empty".into()));
    }

    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;

    // Row index (0 = top) for each point
    let levels: Vec<usize> = values
        .iter()
        .map(|v| {
            if span == 0.0 {
                LINE_HEIGHT / 2
            } else {
                let t = (v - min) / span;
                LINE_HEIGHT - 1 - ((t * (LINE_HEIGHT - 1) as f64).round() as usize)
            }
        })
        .collect();

    let mut out = String::new();
    for row in 0..LINE_HEIGHT {
        for level in &levels {
            out.push(if *level == row { '*' } else { ' ' });
        }
        out.push('\n');
    }
    out.push_str(&format!(
        "min {}  max {}",
        Value::Number(min).display_string(),
        Value::Number(max).display_string()
    ));
    Ok(Value::Str(out))
}
