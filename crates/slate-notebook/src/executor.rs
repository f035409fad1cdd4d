//! Cell execution: lex, parse, and evaluate one cell's source against the
//! session's shared environment.
//!
//! A fault is fatal to the cell, not the session: the environment keeps
//! whatever bindings the cell applied before the fault, and the fault is
//! returned as formatted trace text rather than propagated.

use serde::Serialize;
use slate_eval::{Environment, EvalError, Evaluator, Value};
use slate_lexer::Lexer;
use slate_parser::Parser;
use slate_types::{SourceFile, Span, SyntaxErrors};
use std::time::Instant;

/// Name used for cell source units in diagnostics.
const CELL_UNIT: &str = "cell";

/// Outcome classification of one cell run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Success,
    Error,
}

/// The result of executing one cell.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    /// Captured print output, the auto-printed final expression, or the
    /// formatted fault trace.
    pub output: String,
    /// Elapsed wall clock on success; 0.0 on error.
    pub duration_secs: f64,
    pub status: RunStatus,
}

/// Execute `source` as a full program against `env`.
///
/// Top-level bindings the program creates persist in `env` after the call,
/// including bindings applied before a mid-program fault. Callers are
/// expected to skip whitespace-only sources.
pub fn run(source: &str, env: &mut Environment) -> ExecutionResult {
    let file = SourceFile::new(CELL_UNIT, source);
    let started = Instant::now();

    let lexed = Lexer::new(&file).lex();
    if lexed.errors.has_errors() {
        return syntax_failure(&lexed.errors);
    }
    let parsed = Parser::new(lexed.tokens, &file).parse();
    if parsed.errors.has_errors() {
        return syntax_failure(&parsed.errors);
    }
    let Some(program) = parsed.program else {
        return ExecutionResult {
            output: String::new(),
            duration_secs: started.elapsed().as_secs_f64(),
            status: RunStatus::Success,
        };
    };

    let mut evaluator = Evaluator::new(env);
    match evaluator.eval_program(&program) {
        Ok(_) => {
            let duration_secs = started.elapsed().as_secs_f64();
            let mut output = evaluator.captured_output();
            if output.is_empty() {
                // Borrow of env through the evaluator ends here
                output = auto_print_last_expression(source, env);
            }
            ExecutionResult {
                output,
                duration_secs,
                status: RunStatus::Success,
            }
        }
        Err(fault) => ExecutionResult {
            output: format_trace(&fault, evaluator.fault_span(), &file),
            duration_secs: 0.0,
            status: RunStatus::Error,
        },
    }
}

/// Best-effort auto-print: evaluate the last non-empty source line as a
/// standalone expression and return its display form.
///
/// This path never surfaces an error. Any failure (the line is not an
/// expression, evaluation faults, the value is nil) yields empty output.
fn auto_print_last_expression(source: &str, env: &mut Environment) -> String {
    try_auto_print(source, env).unwrap_or_default()
}

fn try_auto_print(source: &str, env: &mut Environment) -> Option<String> {
    let last_line = source.lines().rev().find(|line| !line.trim().is_empty())?;

    let file = SourceFile::new(CELL_UNIT, last_line);
    let lexed = Lexer::new(&file).lex();
    if lexed.errors.has_errors() {
        return None;
    }
    let parsed = Parser::new(lexed.tokens, &file).parse_single_expression();
    if parsed.errors.has_errors() {
        return None;
    }
    let program = parsed.program?;

    let mut evaluator = Evaluator::new(env);
    match evaluator.eval_program(&program) {
        Ok(Value::Nil) | Err(_) => None,
        Ok(value) => Some(value.display_string()),
    }
}

/// Format collected syntax diagnostics as a cell fault.
fn syntax_failure(errors: &SyntaxErrors) -> ExecutionResult {
    let mut output = String::new();
    for error in &errors.errors {
        if !output.is_empty() {
            output.push('\n');
        }
        output.push_str(&error.to_string());
        if !error.source_line.is_empty() {
            output.push_str("\n  | ");
            output.push_str(&error.source_line);
        }
    }
    if errors.total_errors > errors.errors.len() {
        output.push_str(&format!(
            "\n... and {} more",
            errors.total_errors - errors.errors.len()
        ));
    }
    ExecutionResult {
        output,
        duration_secs: 0.0,
        status: RunStatus::Error,
    }
}

/// Format a runtime fault as a trace naming the fault and where it was
/// raised.
fn format_trace(fault: &EvalError, span: Span, file: &SourceFile) -> String {
    let mut trace = format!(
        "fault: {fault}\n  at line {}, col {}",
        span.start_line, span.start_col
    );
    if let Some(line) = file.line(span.start_line) {
        let line = line.trim_end();
        if !line.is_empty() {
            trace.push_str("\n  | ");
            trace.push_str(line);
        }
    }
    trace
}
