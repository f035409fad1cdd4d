//! End-to-end evaluator tests: lex, parse, and evaluate cell source
//! against a prelude environment.

use slate_eval::{Environment, EvalError, Evaluator, Value};
use slate_lexer::Lexer;
use slate_parser::Parser;
use slate_types::SourceFile;

/// Evaluate source in a fresh prelude environment, returning the last
/// statement's value.
fn eval(source: &str) -> Value {
    let mut env = Environment::with_prelude();
    eval_in(source, &mut env)
}

/// Evaluate source in the given environment, panicking on any fault.
fn eval_in(source: &str, env: &mut Environment) -> Value {
    match try_eval_in(source, env) {
        Ok(v) => v,
        Err(e) => panic!("unexpected fault for {source:?}: {e}"),
    }
}

fn try_eval(source: &str) -> Result<Value, EvalError> {
    let mut env = Environment::with_prelude();
    try_eval_in(source, &mut env)
}

fn try_eval_in(source: &str, env: &mut Environment) -> Result<Value, EvalError> {
    let file = SourceFile::new("cell", source);
    let lexed = Lexer::new(&file).lex();
    assert!(
        !lexed.errors.has_errors(),
        "lex errors for {source:?}: {:?}",
        lexed.errors
    );
    let parsed = Parser::new(lexed.tokens, &file).parse();
    assert!(
        !parsed.errors.has_errors(),
        "parse errors for {source:?}: {:?}",
        parsed.errors
    );
    let program = parsed.program.expect("program");
    let mut evaluator = Evaluator::new(env);
    evaluator.eval_program(&program)
}

/// Evaluate and return the captured print output.
fn output_of(source: &str) -> String {
    let file = SourceFile::new("cell", source);
    let lexed = Lexer::new(&file).lex();
    let parsed = Parser::new(lexed.tokens, &file).parse();
    let program = parsed.program.expect("program");
    let mut env = Environment::with_prelude();
    let mut evaluator = Evaluator::new(&mut env);
    evaluator
        .eval_program(&program)
        .unwrap_or_else(|e| panic!("unexpected fault: {e}"));
    evaluator.captured_output()
}

fn assert_number(value: &Value, expected: f64) {
    match value {
        Value::Number(n) => assert_eq!(*n, expected),
        other => panic!("expected number {expected}, got {other:?}"),
    }
}

fn assert_string(value: &Value, expected: &str) {
    match value {
        Value::Str(s) => assert_eq!(s, expected),
        other => panic!("expected string {expected:?}, got {other:?}"),
    }
}

// ── Literals and operators ──────────────────────────────────────────────

#[test]
fn test_arithmetic() {
    assert_number(&eval("2 + 3 * 4"), 14.0);
    assert_number(&eval("(2 + 3) * 4"), 20.0);
    assert_number(&eval("10 / 4"), 2.5);
    assert_number(&eval("10 % 3"), 1.0);
    assert_number(&eval("-5 + 2"), -3.0);
}

#[test]
fn test_string_concat() {
    assert_string(&eval(r#""foo" + "bar""#), "foobar");
}

#[test]
fn test_list_concat() {
    let v = eval("[1, 2] + [3]");
    match v {
        Value::List(items) => assert_eq!(items.len(), 3),
        other => panic!("expected list, got {other:?}"),
    }
}

#[test]
fn test_comparison_and_logic() {
    assert!(matches!(eval("3 < 4"), Value::Bool(true)));
    assert!(matches!(eval("3 >= 4"), Value::Bool(false)));
    assert!(matches!(eval(r#""abc" < "abd""#), Value::Bool(true)));
    assert!(matches!(eval("true and false"), Value::Bool(false)));
    assert!(matches!(eval("false or true"), Value::Bool(true)));
    assert!(matches!(eval("not nil"), Value::Bool(true)));
}

#[test]
fn test_short_circuit_skips_right_side() {
    // The right operand would fault if evaluated
    assert!(matches!(eval("false and missing_var"), Value::Bool(false)));
    assert!(matches!(eval("true or missing_var"), Value::Bool(true)));
}

#[test]
fn test_equality_is_structural() {
    assert!(matches!(eval("[1, 2] == [1, 2]"), Value::Bool(true)));
    assert!(matches!(
        eval("{a: 1, b: 2} == {b: 2, a: 1}"),
        Value::Bool(true)
    ));
    assert!(matches!(eval("[1, 2] == [1, 3]"), Value::Bool(false)));
    assert!(matches!(eval("1 == \"1\""), Value::Bool(false)));
}

// ── Arithmetic traps ────────────────────────────────────────────────────

#[test]
fn test_division_by_zero_traps() {
    assert!(matches!(
        try_eval("1 / 0"),
        Err(EvalError::ArithmeticTrap(_))
    ));
    assert!(matches!(
        try_eval("1 % 0"),
        Err(EvalError::ArithmeticTrap(_))
    ));
}

#[test]
fn test_overflow_to_infinity_traps() {
    // repeated squaring exceeds f64 range, which must trap instead of
    // silently producing Infinity
    let src = "x = 9999999\ni = 0\nwhile i < 10 {\n  x = x * x\n  i = i + 1\n}";
    assert!(matches!(
        try_eval(src),
        Err(EvalError::ArithmeticTrap(_))
    ));
}

// ── Variables and environment ───────────────────────────────────────────

#[test]
fn test_assignment_and_lookup() {
    let mut env = Environment::with_prelude();
    eval_in("x = 10", &mut env);
    assert_number(&eval_in("x + 5", &mut env), 15.0);
}

#[test]
fn test_last_write_wins() {
    let mut env = Environment::with_prelude();
    eval_in("x = 1\nx = 2", &mut env);
    assert_number(&eval_in("x", &mut env), 2.0);
}

#[test]
fn test_undefined_variable_faults() {
    assert!(matches!(
        try_eval("nope"),
        Err(EvalError::UndefinedVariable(_))
    ));
}

#[test]
fn test_bindings_survive_fault_in_later_statement() {
    let mut env = Environment::with_prelude();
    let result = try_eval_in("a = 1\nb = 2\n1 / 0", &mut env);
    assert!(result.is_err());
    assert_number(&eval_in("a + b", &mut env), 3.0);
}

// ── Control flow ────────────────────────────────────────────────────────

#[test]
fn test_if_else() {
    assert_number(&eval("if 3 > 2 { x = 1 } else { x = 2 }\nx"), 1.0);
    assert_number(
        &eval("n = 15\nif n < 10 { r = \"low\" } else if n < 20 { r = \"mid\" } else { r = \"high\" }\nn"),
        15.0,
    );
}

#[test]
fn test_while_loop() {
    let src = "total = 0\ni = 0\nwhile i < 5 {\n  total = total + i\n  i = i + 1\n}\ntotal";
    assert_number(&eval(src), 10.0);
}

#[test]
fn test_for_loop() {
    let src = "total = 0\nfor x in [1, 2, 3] {\n  total = total + x\n}\ntotal";
    assert_number(&eval(src), 6.0);
}

#[test]
fn test_for_over_non_list_faults() {
    assert!(matches!(
        try_eval("for x in 5 { print(x) }"),
        Err(EvalError::TypeMismatch(_))
    ));
}

#[test]
fn test_return_outside_function_faults() {
    assert!(matches!(
        try_eval("return 1"),
        Err(EvalError::ReturnOutsideFunction)
    ));
}

// ── Functions ───────────────────────────────────────────────────────────

#[test]
fn test_lambda_call_and_return() {
    let src = "double = fn(x) { return x * 2 }\ndouble(21)";
    assert_number(&eval(src), 42.0);
}

#[test]
fn test_lambda_implicit_last_value() {
    let src = "add = fn(a, b) { a + b }\nadd(2, 3)";
    assert_number(&eval(src), 5.0);
}

#[test]
fn test_closure_captures_definition_environment() {
    let src = "base = 100\nadd_base = fn(x) { return x + base }\nbase = 0\nadd_base(1)";
    // captured snapshot: base was 100 at definition time
    assert_number(&eval(src), 101.0);
}

#[test]
fn test_wrong_arity_faults() {
    let src = "f = fn(a) { a }\nf(1, 2)";
    assert!(matches!(try_eval(src), Err(EvalError::TypeMismatch(_))));
}

#[test]
fn test_print_inside_function_is_captured() {
    let src = "shout = fn(s) { print(s) }\nshout(\"hey\")";
    assert_eq!(output_of(src), "hey");
}

// ── Builtins ────────────────────────────────────────────────────────────

#[test]
fn test_print_output_capture() {
    assert_eq!(output_of("print(1)\nprint(\"two\", 3)"), "1\ntwo 3");
}

#[test]
fn test_integral_numbers_print_without_decimal_point() {
    assert_eq!(output_of("print(15.0)\nprint(2.5)"), "15\n2.5");
}

#[test]
fn test_len() {
    assert_number(&eval("len([1, 2, 3])"), 3.0);
    assert_number(&eval("len(\"abcd\")"), 4.0);
    assert_number(&eval("len({a: 1})"), 1.0);
    assert!(matches!(try_eval("len(5)"), Err(EvalError::TypeMismatch(_))));
}

#[test]
fn test_str_and_type() {
    assert_string(&eval("str(3.5)"), "3.5");
    assert_string(&eval("type([1])"), "list");
    assert_string(&eval("type(nil)"), "nil");
}

#[test]
fn test_input_always_faults_with_guidance() {
    let err = try_eval("input(\"enter a number\")").unwrap_err();
    match err {
        EvalError::InputRejected(prompt) => assert_eq!(prompt, "enter a number"),
        other => panic!("expected InputRejected, got {other:?}"),
    }
    // message tells the user to hardcode values instead
    let msg = try_eval("input()").unwrap_err().to_string();
    assert!(msg.contains("hardcode"));
}

// ── Methods and field access ────────────────────────────────────────────

#[test]
fn test_list_methods() {
    assert_number(&eval("[1, 2, 3].length()"), 3.0);
    assert_number(&eval("[10, 20].get(1)"), 20.0);
    assert_number(&eval("[1].append(9).length()"), 2.0);
    assert!(matches!(eval("[1, 2].contains(2)"), Value::Bool(true)));
    assert_string(&eval("[\"a\", \"b\"].join(\"-\")"), "a-b");
}

#[test]
fn test_list_map_and_filter() {
    assert_number(&eval("[1, 2, 3].map(fn(x) { x * 2 }).get(2)"), 6.0);
    assert_number(&eval("[1, 2, 3, 4].filter(fn(x) { x % 2 == 0 }).length()"), 2.0);
}

#[test]
fn test_list_index_out_of_range_faults() {
    assert!(matches!(
        try_eval("[1].get(5)"),
        Err(EvalError::Runtime(_))
    ));
}

#[test]
fn test_string_methods() {
    assert_string(&eval("\"Hey\".upper()"), "HEY");
    assert_string(&eval("\" pad \".trim()"), "pad");
    assert_number(&eval("\"a,b,c\".split(\",\").length()"), 3.0);
    assert_string(&eval("\"aXa\".replace(\"X\", \"-\")"), "a-a");
}

#[test]
fn test_record_field_access() {
    assert_number(&eval("r = {x: 1, y: 2}\nr.y"), 2.0);
    assert!(matches!(
        try_eval("{x: 1}.z"),
        Err(EvalError::Runtime(_))
    ));
}

#[test]
fn test_nil_access_faults() {
    assert!(matches!(try_eval("nil.field"), Err(EvalError::NilAccess(_))));
    assert!(matches!(
        try_eval("nil.method()"),
        Err(EvalError::NilAccess(_))
    ));
}

// ── Prelude modules ─────────────────────────────────────────────────────

#[test]
fn test_num_module() {
    assert_number(&eval("num.sqrt(9)"), 3.0);
    assert_number(&eval("num.abs(-4)"), 4.0);
    assert_number(&eval("num.sum([1, 2, 3])"), 6.0);
    assert_number(&eval("num.mean([2, 4])"), 3.0);
    assert_number(&eval("num.max([3, 9, 1])"), 9.0);
    assert_number(&eval("num.range(2, 5).length()"), 3.0);
    assert_number(&eval("num.linspace(0, 1, 5).get(2)"), 0.5);
}

#[test]
fn test_num_sqrt_negative_traps() {
    assert!(matches!(
        try_eval("num.sqrt(-1)"),
        Err(EvalError::ArithmeticTrap(_))
    ));
}

#[test]
fn test_oversized_sequence_requests_fault() {
    // sizes drive allocations, so absurd counts must fault, not abort
    assert!(matches!(
        try_eval("num.linspace(0, 1, 3000000000000000000)"),
        Err(EvalError::ModuleError(_))
    ));
    assert!(matches!(
        try_eval("num.range(0, 3000000000000000000)"),
        Err(EvalError::ModuleError(_))
    ));
}

#[test]
fn test_table_module() {
    let src = "t = table.from_records([{name: \"ada\", age: 36}, {name: \"lin\", age: 29}])\n\
               table.row_count(t)";
    assert_number(&eval(src), 2.0);

    let src = "t = table.from_records([{a: 1, b: 2}])\ntable.columns(t).length()";
    assert_number(&eval(src), 2.0);

    let src = "t = table.from_records([{a: 1, b: 2}, {a: 3, b: 4}])\n\
               table.col(table.select(t, [\"a\"]), \"a\").get(1)";
    assert_number(&eval(src), 3.0);
}

#[test]
fn test_table_select_unknown_column_faults() {
    let src = "t = table.from_records([{a: 1}])\ntable.select(t, [\"zz\"])";
    assert!(matches!(try_eval(src), Err(EvalError::ModuleError(_))));
}

#[test]
fn test_plot_module_renders_text() {
    let v = eval("plot.bar([\"a\", \"bb\"], [1, 2])");
    match v {
        Value::Str(s) => {
            assert!(s.contains('#'));
            assert!(s.lines().count() == 2);
        }
        other => panic!("expected string chart, got {other:?}"),
    }
    assert!(matches!(eval("plot.line([1, 5, 2])"), Value::Str(_)));
}

#[test]
fn test_charts_summary() {
    let v = eval("charts.summary([1, 2, 3, 4])");
    match v {
        Value::Record(fields) => {
            assert!(matches!(fields.get("count"), Some(Value::Number(n)) if *n == 4.0));
            assert!(matches!(fields.get("mean"), Some(Value::Number(n)) if *n == 2.5));
            assert!(matches!(fields.get("median"), Some(Value::Number(n)) if *n == 2.5));
        }
        other => panic!("expected summary record, got {other:?}"),
    }
}

#[test]
fn test_hist_rejects_oversized_bin_count() {
    assert!(matches!(
        try_eval("charts.hist([1, 2], 3000000000000000000)"),
        Err(EvalError::ModuleError(_))
    ));
}

#[test]
fn test_re_module() {
    assert!(matches!(
        eval("re.test(\"[0-9]+\", \"abc123\")"),
        Value::Bool(true)
    ));
    assert_string(&eval("re.find(\"[0-9]+\", \"abc123def\")"), "123");
    assert!(matches!(eval("re.find(\"z\", \"abc\")"), Value::Nil));
    assert_number(&eval("re.find_all(\"[0-9]+\", \"1 a 22 b 333\").length()"), 3.0);
    assert_string(&eval("re.replace(\"[0-9]\", \"a1b2\", \"_\")"), "a_b_");
}

#[test]
fn test_re_invalid_pattern_faults() {
    assert!(matches!(
        try_eval("re.test(\"[\", \"x\")"),
        Err(EvalError::ModuleError(_))
    ));
}

#[test]
fn test_db_module() {
    let src = "store = db.open()\n\
               store = db.insert(store, \"users\", {name: \"ada\"})\n\
               store = db.insert(store, \"users\", {name: \"lin\"})\n\
               db.count(store, \"users\")";
    assert_number(&eval(src), 2.0);

    let src = "store = db.insert(db.open(), \"users\", {name: \"ada\", age: 36})\n\
               db.find(store, \"users\", \"name\", \"ada\").length()";
    assert_number(&eval(src), 1.0);
}

#[test]
fn test_time_module() {
    match eval("time.now()") {
        Value::Number(n) => assert!(n > 0.0),
        other => panic!("expected number, got {other:?}"),
    }
}

#[test]
fn test_module_unknown_function_faults() {
    assert!(matches!(
        try_eval("num.bogus(1)"),
        Err(EvalError::ModuleError(_))
    ));
}
