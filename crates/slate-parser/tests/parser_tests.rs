//! Parser tests for the slate cell language.
//!
//! Covers: assignments, control flow, expressions with precedence,
//! collections, lambdas, method calls, and error recovery.

use slate_lexer::Lexer;
use slate_parser::Parser;
use slate_types::ast::*;
use slate_types::{SourceFile, SyntaxErrors};

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

/// Parse source into a Program (panics on parse errors).
fn parse(source: &str) -> Program {
    let sf = SourceFile::new("cell", source);
    let lex = Lexer::new(&sf).lex();
    assert!(!lex.errors.has_errors(), "lex errors in {source:?}");
    let result = Parser::new(lex.tokens, &sf).parse();
    if result.errors.has_errors() {
        panic!(
            "parse errors:\n{}",
            result
                .errors
                .errors
                .iter()
                .map(|e| format!("  [{}] {}", e.code, e.message))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }
    result.program.expect("no program after successful parse")
}

/// Parse and return the collected errors.
fn parse_errors(source: &str) -> SyntaxErrors {
    let sf = SourceFile::new("cell", source);
    let lex = Lexer::new(&sf).lex();
    let mut errors = lex.errors;
    let result = Parser::new(lex.tokens, &sf).parse();
    errors.extend(result.errors);
    errors
}

/// Parse a single statement and return it.
fn stmt(source: &str) -> Stmt {
    let mut program = parse(source);
    assert_eq!(program.stmts.len(), 1, "expected one statement");
    program.stmts.remove(0)
}

/// Parse a single expression statement and return the expression.
fn expr(source: &str) -> Expr {
    match stmt(source) {
        Stmt::Expr(e) => e.expr,
        other => panic!("expected expression statement, got {other:?}"),
    }
}

// ─────────────────────────────────────────────────────────────────────
// Statements
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_assignment() {
    match stmt("x = 10") {
        Stmt::Assign(a) => {
            assert_eq!(a.target.name, "x");
            assert_eq!(a.value.kind, ExprKind::NumberLit(10.0));
        }
        other => panic!("expected assignment, got {other:?}"),
    }
}

#[test]
fn test_assignment_rebinding_same_name() {
    let program = parse("x = 1\nx = 2");
    assert_eq!(program.stmts.len(), 2);
}

#[test]
fn test_expression_statement() {
    assert_eq!(expr("42").kind, ExprKind::NumberLit(42.0));
}

#[test]
fn test_if_else() {
    match stmt("if x > 0 { y = 1 } else { y = 2 }") {
        Stmt::If(ifs) => {
            assert_eq!(ifs.then_block.stmts.len(), 1);
            assert!(matches!(ifs.else_branch, Some(ElseBranch::Block(_))));
        }
        other => panic!("expected if, got {other:?}"),
    }
}

#[test]
fn test_else_if_chain() {
    let src = "if a { x = 1 } else if b { x = 2 } else { x = 3 }";
    match stmt(src) {
        Stmt::If(ifs) => match ifs.else_branch {
            Some(ElseBranch::ElseIf(inner)) => {
                assert!(matches!(inner.else_branch, Some(ElseBranch::Block(_))));
            }
            other => panic!("expected else-if, got {other:?}"),
        },
        other => panic!("expected if, got {other:?}"),
    }
}

#[test]
fn test_else_if_followed_by_statement() {
    // Trailing-newline handling after a nested if must not eat into the
    // next statement.
    let program = parse("if a { x = 1 } else if b { x = 2 }\ny = 3");
    assert_eq!(program.stmts.len(), 2);
}

#[test]
fn test_while() {
    match stmt("while i < 10 { i = i + 1 }") {
        Stmt::While(w) => assert_eq!(w.body.stmts.len(), 1),
        other => panic!("expected while, got {other:?}"),
    }
}

#[test]
fn test_for_in() {
    match stmt("for item in items { print(item) }") {
        Stmt::For(f) => {
            assert_eq!(f.item.name, "item");
            assert_eq!(f.body.stmts.len(), 1);
        }
        other => panic!("expected for, got {other:?}"),
    }
}

#[test]
fn test_return_with_value() {
    match stmt("return 5") {
        Stmt::Return(r) => assert!(r.value.is_some()),
        other => panic!("expected return, got {other:?}"),
    }
}

#[test]
fn test_bare_return() {
    match stmt("return") {
        Stmt::Return(r) => assert!(r.value.is_none()),
        other => panic!("expected return, got {other:?}"),
    }
}

#[test]
fn test_multi_statement_program() {
    let program = parse("x = 10\ny = 20\nx + y");
    assert_eq!(program.stmts.len(), 3);
}

#[test]
fn test_blank_lines_and_comments_ignored() {
    let program = parse("\n\n// setup\nx = 1\n\n// use\nx\n");
    assert_eq!(program.stmts.len(), 2);
}

// ─────────────────────────────────────────────────────────────────────
// Expressions & precedence
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_mul_binds_tighter_than_add() {
    // 1 + 2 * 3 → Add(1, Mul(2, 3))
    match expr("1 + 2 * 3").kind {
        ExprKind::Binary { op, right, .. } => {
            assert_eq!(op, BinOp::Add);
            assert!(matches!(
                right.kind,
                ExprKind::Binary {
                    op: BinOp::Mul,
                    ..
                }
            ));
        }
        other => panic!("expected binary, got {other:?}"),
    }
}

#[test]
fn test_comparison_binds_looser_than_add() {
    match expr("a + 1 < b").kind {
        ExprKind::Binary { op, .. } => assert_eq!(op, BinOp::Less),
        other => panic!("expected binary, got {other:?}"),
    }
}

#[test]
fn test_and_or_precedence() {
    // a or b and c → Or(a, And(b, c))
    match expr("a or b and c").kind {
        ExprKind::Binary { op, right, .. } => {
            assert_eq!(op, BinOp::Or);
            assert!(matches!(
                right.kind,
                ExprKind::Binary {
                    op: BinOp::And,
                    ..
                }
            ));
        }
        other => panic!("expected binary, got {other:?}"),
    }
}

#[test]
fn test_comparison_chaining_rejected() {
    assert!(parse_errors("a < b < c").has_errors());
}

#[test]
fn test_unary_minus() {
    match expr("-x").kind {
        ExprKind::Unary { op, .. } => assert_eq!(op, UnaryOp::Neg),
        other => panic!("expected unary, got {other:?}"),
    }
}

#[test]
fn test_parenthesized() {
    match expr("(1 + 2) * 3").kind {
        ExprKind::Binary { op, left, .. } => {
            assert_eq!(op, BinOp::Mul);
            assert!(matches!(left.kind, ExprKind::Paren(_)));
        }
        other => panic!("expected binary, got {other:?}"),
    }
}

#[test]
fn test_list_literal() {
    match expr("[1, 2, 3]").kind {
        ExprKind::ListLit(elems) => assert_eq!(elems.len(), 3),
        other => panic!("expected list, got {other:?}"),
    }
}

#[test]
fn test_list_trailing_comma() {
    match expr("[1, 2,]").kind {
        ExprKind::ListLit(elems) => assert_eq!(elems.len(), 2),
        other => panic!("expected list, got {other:?}"),
    }
}

#[test]
fn test_record_literal() {
    match expr(r#"{name: "ada", age: 36}"#).kind {
        ExprKind::RecordLit(fields) => {
            assert_eq!(fields.len(), 2);
            assert_eq!(fields[0].name.name, "name");
        }
        other => panic!("expected record, got {other:?}"),
    }
}

#[test]
fn test_call() {
    match expr("print(1, 2)").kind {
        ExprKind::Call { name, args } => {
            assert_eq!(name.name, "print");
            assert_eq!(args.len(), 2);
        }
        other => panic!("expected call, got {other:?}"),
    }
}

#[test]
fn test_call_no_args() {
    match expr("now()").kind {
        ExprKind::Call { args, .. } => assert!(args.is_empty()),
        other => panic!("expected call, got {other:?}"),
    }
}

#[test]
fn test_method_call() {
    match expr(r#"re.find("a.", s)"#).kind {
        ExprKind::MethodCall {
            object,
            method,
            args,
        } => {
            assert!(matches!(object.kind, ExprKind::Identifier(ref n) if n == "re"));
            assert_eq!(method.name, "find");
            assert_eq!(args.len(), 2);
        }
        other => panic!("expected method call, got {other:?}"),
    }
}

#[test]
fn test_field_access() {
    match expr("row.name").kind {
        ExprKind::FieldAccess { field, .. } => assert_eq!(field.name, "name"),
        other => panic!("expected field access, got {other:?}"),
    }
}

#[test]
fn test_chained_postfix() {
    // record field, then method on the field value
    match expr("r.items.length()").kind {
        ExprKind::MethodCall { object, method, .. } => {
            assert_eq!(method.name, "length");
            assert!(matches!(object.kind, ExprKind::FieldAccess { .. }));
        }
        other => panic!("expected method call, got {other:?}"),
    }
}

#[test]
fn test_lambda() {
    match expr("fn(a, b) { return a + b }").kind {
        ExprKind::Lambda(l) => {
            assert_eq!(l.params.len(), 2);
            assert_eq!(l.body.stmts.len(), 1);
        }
        other => panic!("expected lambda, got {other:?}"),
    }
}

#[test]
fn test_multiline_call_args() {
    let program = parse("plot.bar(\n  [1, 2],\n  [3, 4]\n)");
    assert_eq!(program.stmts.len(), 1);
}

// ─────────────────────────────────────────────────────────────────────
// Errors & recovery
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_unclosed_paren_is_error() {
    assert!(parse_errors("print(x").has_errors());
}

#[test]
fn test_invalid_assign_target() {
    assert!(parse_errors("1 = x").has_errors());
}

#[test]
fn test_unexpected_token_reports_line() {
    let errors = parse_errors("x = ]");
    assert!(errors.has_errors());
    assert_eq!(errors.errors[0].source_line, "x = ]");
}

#[test]
fn test_recovery_continues_to_next_statement() {
    // First line is broken; second should still parse
    let sf = SourceFile::new("cell", "x = \ny = 2");
    let lex = Lexer::new(&sf).lex();
    let result = Parser::new(lex.tokens, &sf).parse();
    assert!(result.errors.has_errors());
    let program = result.program.unwrap();
    assert!(program
        .stmts
        .iter()
        .any(|s| matches!(s, Stmt::Assign(a) if a.target.name == "y")));
}

#[test]
fn test_empty_program() {
    let program = parse("");
    assert!(program.stmts.is_empty());
}
