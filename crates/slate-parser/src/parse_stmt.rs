//! Statement and program parsing.

use crate::parser::Parser;
use slate_lexer::token::TokenKind;
use slate_types::ast::*;
use slate_types::ErrorCode;

impl<'src> Parser<'src> {
    /// Parse a whole program: statements until end of input.
    pub(crate) fn parse_program(&mut self) -> Option<Program> {
        let start = self.current_span();
        let mut stmts = Vec::new();

        while !self.at_end() {
            if self.too_many_errors() {
                break;
            }
            if let Some(stmt) = self.parse_statement() {
                stmts.push(stmt);
            } else if !self.at_end() {
                self.synchronize();
            }
            self.skip_newlines();
        }

        let span = if stmts.is_empty() {
            start
        } else {
            start.merge(self.previous_span())
        };
        Some(Program { stmts, span })
    }

    /// Parse a block of statements: `{ stmts... }`
    pub(crate) fn parse_block(&mut self) -> Option<Block> {
        self.block_depth += 1;
        if self.block_depth > 16 {
            self.error_at_current(
                ErrorCode::NESTING_LIMIT_EXCEEDED,
                "maximum block nesting depth is 16",
            );
            self.block_depth -= 1;
            return None;
        }

        let start = self.current_span();
        let result = (|| {
            self.expect(&TokenKind::LBrace)?;
            self.skip_newlines();
            let mut stmts = Vec::new();
            while !self.check_exact(&TokenKind::RBrace) && !self.at_end() {
                if self.too_many_errors() {
                    break;
                }
                if let Some(stmt) = self.parse_statement() {
                    stmts.push(stmt);
                } else {
                    self.synchronize();
                }
                self.skip_newlines();
            }
            self.expect(&TokenKind::RBrace)?;
            let span = start.merge(self.previous_span());
            Some(Block { stmts, span })
        })();
        self.block_depth -= 1;
        result
    }

    /// Parse a single statement.
    pub(crate) fn parse_statement(&mut self) -> Option<Stmt> {
        self.skip_newlines();
        if self.at_end() || self.check_exact(&TokenKind::RBrace) {
            return None;
        }
        match self.peek_kind() {
            TokenKind::If => {
                let stmt = self.parse_if_stmt()?;
                self.expect_newline_or_eof();
                Some(Stmt::If(stmt))
            }
            TokenKind::While => self.parse_while_stmt(),
            TokenKind::For => self.parse_for_stmt(),
            TokenKind::Return => self.parse_return_stmt(),
            // `name = expr` is an assignment; anything else is an expression
            TokenKind::Identifier(_) if self.look_ahead(1) == &TokenKind::Eq => {
                self.parse_assign_stmt()
            }
            _ => {
                let expr = self.parse_expression()?;
                let span = expr.span;
                // `1 = x` and similar: catch an `=` after a non-identifier
                if self.check_exact(&TokenKind::Eq) {
                    self.error_at_current(
                        ErrorCode::INVALID_ASSIGN_TARGET,
                        "assignment target must be a plain name",
                    );
                    return None;
                }
                self.expect_newline_or_eof();
                Some(Stmt::Expr(ExprStmt { expr, span }))
            }
        }
    }

    /// `name = expr`
    fn parse_assign_stmt(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        let target = self.expect_identifier()?;
        self.expect(&TokenKind::Eq)?;
        let value = self.parse_expression()?;
        let span = start.merge(self.previous_span());
        self.expect_newline_or_eof();
        Some(Stmt::Assign(AssignStmt {
            target,
            value,
            span,
        }))
    }

    /// `if cond { ... } [else if ... | else { ... }]`
    pub(crate) fn parse_if_stmt(&mut self) -> Option<IfStmt> {
        let start = self.current_span();
        self.advance(); // eat `if`
        let condition = self.parse_expression()?;
        let then_block = self.parse_block()?;

        let else_branch = if self.eat(&TokenKind::Else) {
            if self.check_exact(&TokenKind::If) {
                let elif = self.parse_if_stmt()?;
                Some(ElseBranch::ElseIf(Box::new(elif)))
            } else {
                let block = self.parse_block()?;
                Some(ElseBranch::Block(block))
            }
        } else {
            None
        };

        let span = start.merge(self.previous_span());
        Some(IfStmt {
            condition,
            then_block,
            else_branch,
            span,
        })
    }

    /// `while cond { ... }`
    fn parse_while_stmt(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        self.advance(); // eat `while`
        let condition = self.parse_expression()?;
        let body = self.parse_block()?;
        let span = start.merge(self.previous_span());
        self.expect_newline_or_eof();
        Some(Stmt::While(WhileStmt {
            condition,
            body,
            span,
        }))
    }

    /// `for item in iterable { ... }`
    fn parse_for_stmt(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        self.advance(); // eat `for`
        let item = self.expect_identifier()?;
        self.expect(&TokenKind::In)?;
        let iterable = self.parse_expression()?;
        let body = self.parse_block()?;
        let span = start.merge(self.previous_span());
        self.expect_newline_or_eof();
        Some(Stmt::For(ForStmt {
            item,
            iterable,
            body,
            span,
        }))
    }

    /// `return` or `return expr`
    fn parse_return_stmt(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        self.advance(); // eat `return`
        let value = if self.check_exact(&TokenKind::Newline)
            || self.check_exact(&TokenKind::RBrace)
            || self.at_end()
        {
            None
        } else {
            Some(self.parse_expression()?)
        };
        let span = start.merge(self.previous_span());
        self.expect_newline_or_eof();
        Some(Stmt::Return(ReturnStmt { value, span }))
    }
}
