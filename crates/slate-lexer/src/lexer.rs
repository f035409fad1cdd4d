//! Core slate lexer — converts cell source text to a token stream.
//!
//! Features:
//! - All slate tokens (13 reserved words, operators, punctuation, literals)
//! - Single-line comments stripped (`//`)
//! - Error recovery: collects up to 20 errors instead of stopping at the first
//! - Newline-separated statements (no semicolons)

use slate_types::{ErrorCode, SourceFile, Span, SyntaxError, SyntaxErrors};

use crate::token::{Token, TokenKind};

/// The slate lexer.
///
/// Converts source text into a vector of [`Token`]s, collecting up to
/// [`slate_types::MAX_ERRORS`] errors along the way.
pub struct Lexer<'src> {
    /// The full source text as bytes.
    source: &'src [u8],
    /// Source file for error reporting.
    source_file: &'src SourceFile,
    /// File name (for errors).
    file_name: &'src str,
    /// Current byte offset into `source`.
    pos: usize,
    /// Byte offset where the current token started.
    token_start: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based).
    col: u32,
    /// Collected errors.
    errors: SyntaxErrors,
}

/// Result of lexing: tokens + any errors collected.
pub struct LexResult {
    /// The token stream (always ends with [`TokenKind::Eof`]).
    pub tokens: Vec<Token>,
    /// Errors encountered during lexing.
    pub errors: SyntaxErrors,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source file.
    pub fn new(source_file: &'src SourceFile) -> Self {
        Self {
            source: source_file.source.as_bytes(),
            source_file,
            file_name: &source_file.name,
            pos: 0,
            token_start: 0,
            line: 1,
            col: 1,
            errors: SyntaxErrors::empty(),
        }
    }

    /// Lex the entire source into a token stream.
    pub fn lex(mut self) -> LexResult {
        let mut tokens = Vec::new();

        loop {
            if self.at_error_cap() {
                break;
            }

            let token = self.scan_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);

            if is_eof {
                break;
            }
        }

        // Ensure token stream always ends with Eof
        if tokens.last().is_none_or(|t| t.kind != TokenKind::Eof) {
            tokens.push(Token::new(TokenKind::Eof, self.current_span()));
        }

        LexResult {
            tokens,
            errors: self.errors,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Character-level helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.source.get(self.pos).copied()?;
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn at_error_cap(&self) -> bool {
        self.errors.total_errors >= slate_types::MAX_ERRORS
    }

    fn current_span(&self) -> Span {
        Span::point(self.line, self.col)
    }

    fn span_from(&self, start_line: u32, start_col: u32) -> Span {
        Span::new(
            start_line,
            start_col,
            self.line,
            self.col.saturating_sub(1).max(1),
        )
    }

    /// The lexeme text from the token start to the current position.
    fn lexeme(&self) -> &str {
        std::str::from_utf8(&self.source[self.token_start..self.pos]).unwrap_or("")
    }

    fn emit_error(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let source_line = self
            .source_file
            .line(span.start_line)
            .unwrap_or("")
            .to_string();
        let err = SyntaxError::new(self.file_name, code, message, span, source_line);
        self.errors.push(err);
    }

    // ─────────────────────────────────────────────────────────────
    // Whitespace & comments
    // ─────────────────────────────────────────────────────────────

    /// Skip spaces and tabs (NOT newlines — those are tokens).
    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == b' ' || ch == b'\t' || ch == b'\r' {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Skip a single-line comment (`// ...`).
    /// Returns `true` if a comment was consumed.
    fn skip_comment(&mut self) -> bool {
        if self.peek() == Some(b'/') && self.peek_at(1) == Some(b'/') {
            // Consume everything until end-of-line (but not the newline itself)
            while let Some(ch) = self.peek() {
                if ch == b'\n' {
                    break;
                }
                self.advance();
            }
            true
        } else {
            false
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Token scanning
    // ─────────────────────────────────────────────────────────────

    /// Scan one token.
    ///
    /// Invalid characters are reported and skipped, then scanning resumes
    /// in place. The retry is a loop, not recursion, so an arbitrarily
    /// long run of garbage (pasted binary, emoji) cannot exhaust the
    /// stack; at the error cap the rest of the input is dropped.
    fn scan_token(&mut self) -> Token {
        loop {
            self.skip_whitespace();
            while self.skip_comment() {
                self.skip_whitespace();
            }

            if self.at_end() {
                return Token::new(TokenKind::Eof, self.current_span());
            }

            let start_line = self.line;
            let start_col = self.col;
            self.token_start = self.pos;
            let ch = match self.advance() {
                Some(ch) => ch,
                None => return Token::new(TokenKind::Eof, self.current_span()),
            };

            return match ch {
                // ── Newline ──
                b'\n' => Token::new(TokenKind::Newline, self.span_from(start_line, start_col)),

                // ── String literal ──
                b'"' => self.scan_string(start_line, start_col),

                // ── Number literal ──
                b'0'..=b'9' => self.scan_number(start_line, start_col),

                // ── Identifiers & keywords ──
                b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.scan_identifier(start_line, start_col),

                // ── Operators & punctuation ──
                b'+' => Token::new(TokenKind::Plus, self.span_from(start_line, start_col)),
                b'-' => Token::new(TokenKind::Minus, self.span_from(start_line, start_col)),
                b'*' => Token::new(TokenKind::Star, self.span_from(start_line, start_col)),
                b'%' => Token::new(TokenKind::Percent, self.span_from(start_line, start_col)),

                b'/' => {
                    // `//` comments were handled above, so bare / is division
                    Token::new(TokenKind::Slash, self.span_from(start_line, start_col))
                }

                b'=' => {
                    if self.peek() == Some(b'=') {
                        self.advance();
                        Token::new(TokenKind::EqEq, self.span_from(start_line, start_col))
                    } else {
                        Token::new(TokenKind::Eq, self.span_from(start_line, start_col))
                    }
                }

                b'!' => {
                    if self.peek() == Some(b'=') {
                        self.advance();
                        Token::new(TokenKind::BangEq, self.span_from(start_line, start_col))
                    } else {
                        let span = self.span_from(start_line, start_col);
                        self.emit_error(
                            ErrorCode::UNEXPECTED_CHAR,
                            "unexpected character '!' (use 'not' for negation, '!=' for inequality)",
                            span,
                        );
                        if self.at_error_cap() {
                            return Token::new(TokenKind::Eof, self.current_span());
                        }
                        continue;
                    }
                }

                b'<' => {
                    if self.peek() == Some(b'=') {
                        self.advance();
                        Token::new(TokenKind::LessEq, self.span_from(start_line, start_col))
                    } else {
                        Token::new(TokenKind::Less, self.span_from(start_line, start_col))
                    }
                }

                b'>' => {
                    if self.peek() == Some(b'=') {
                        self.advance();
                        Token::new(TokenKind::GreaterEq, self.span_from(start_line, start_col))
                    } else {
                        Token::new(TokenKind::Greater, self.span_from(start_line, start_col))
                    }
                }

                b'(' => Token::new(TokenKind::LParen, self.span_from(start_line, start_col)),
                b')' => Token::new(TokenKind::RParen, self.span_from(start_line, start_col)),
                b'[' => Token::new(TokenKind::LBracket, self.span_from(start_line, start_col)),
                b']' => Token::new(TokenKind::RBracket, self.span_from(start_line, start_col)),
                b'{' => Token::new(TokenKind::LBrace, self.span_from(start_line, start_col)),
                b'}' => Token::new(TokenKind::RBrace, self.span_from(start_line, start_col)),
                b',' => Token::new(TokenKind::Comma, self.span_from(start_line, start_col)),
                b':' => Token::new(TokenKind::Colon, self.span_from(start_line, start_col)),
                b'.' => Token::new(TokenKind::Dot, self.span_from(start_line, start_col)),

                _ => {
                    let span = self.span_from(start_line, start_col);
                    self.emit_error(
                        ErrorCode::UNEXPECTED_CHAR,
                        format!("unexpected character '{}'", ch as char),
                        span,
                    );
                    if self.at_error_cap() {
                        return Token::new(TokenKind::Eof, self.current_span());
                    }
                    continue;
                }
            };
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Number literals
    // ─────────────────────────────────────────────────────────────

    fn scan_number(&mut self, start_line: u32, start_col: u32) -> Token {
        // We already consumed the first digit
        while let Some(b'0'..=b'9') = self.peek() {
            self.advance();
        }

        // Check for decimal point followed by a digit
        if self.peek() == Some(b'.') && matches!(self.peek_at(1), Some(b'0'..=b'9')) {
            self.advance(); // consume '.'
            while let Some(b'0'..=b'9') = self.peek() {
                self.advance();
            }
        }

        let span = self.span_from(start_line, start_col);
        let value: f64 = match self.lexeme().parse() {
            Ok(v) => v,
            Err(_) => {
                self.emit_error(
                    ErrorCode::INVALID_NUMBER,
                    format!("invalid number literal '{}'", self.lexeme()),
                    span,
                );
                0.0
            }
        };

        Token::new(TokenKind::NumberLit(value), span)
    }

    // ─────────────────────────────────────────────────────────────
    // Identifiers & keywords
    // ─────────────────────────────────────────────────────────────

    fn scan_identifier(&mut self, start_line: u32, start_col: u32) -> Token {
        // First character was already consumed (letter or `_`)
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == b'_' {
                self.advance();
            } else {
                break;
            }
        }

        let span = self.span_from(start_line, start_col);
        let text = self.lexeme();
        let kind = TokenKind::from_keyword(text)
            .unwrap_or_else(|| TokenKind::Identifier(text.to_string()));

        Token::new(kind, span)
    }

    // ─────────────────────────────────────────────────────────────
    // String literals
    // ─────────────────────────────────────────────────────────────

    /// Scan a string literal starting after the opening `"`.
    fn scan_string(&mut self, start_line: u32, start_col: u32) -> Token {
        let mut buf = String::new();

        loop {
            match self.peek() {
                None | Some(b'\n') => {
                    // Unterminated string
                    let span = self.span_from(start_line, start_col);
                    self.emit_error(
                        ErrorCode::UNTERMINATED_STRING,
                        "unterminated string literal",
                        span,
                    );
                    return Token::new(
                        TokenKind::StringLiteral(buf),
                        self.span_from(start_line, start_col),
                    );
                }
                Some(b'"') => {
                    // End of string
                    self.advance();
                    return Token::new(
                        TokenKind::StringLiteral(buf),
                        self.span_from(start_line, start_col),
                    );
                }
                Some(b'\\') => {
                    if let Some(escaped) = self.scan_escape_sequence() {
                        buf.push(escaped);
                    }
                }
                Some(_) => {
                    // Strings may contain multi-byte UTF-8; collect the whole
                    // code point, not just the lead byte.
                    let cp_start = self.pos;
                    self.advance();
                    while let Some(b) = self.peek() {
                        if b & 0b1100_0000 == 0b1000_0000 {
                            self.advance();
                        } else {
                            break;
                        }
                    }
                    if let Ok(s) = std::str::from_utf8(&self.source[cp_start..self.pos]) {
                        buf.push_str(s);
                    }
                }
            }
        }
    }

    /// Scan an escape sequence after the `\`.
    /// Returns the unescaped character, or `None` if invalid (error emitted).
    fn scan_escape_sequence(&mut self) -> Option<char> {
        let start_line = self.line;
        let start_col = self.col;
        self.advance(); // consume the '\'

        match self.advance() {
            Some(b'"') => Some('"'),
            Some(b'\\') => Some('\\'),
            Some(b'n') => Some('\n'),
            Some(b't') => Some('\t'),
            Some(b'r') => Some('\r'),
            Some(ch) => {
                let span = self.span_from(start_line, start_col);
                self.emit_error(
                    ErrorCode::INVALID_ESCAPE,
                    format!("invalid escape sequence '\\{}'", ch as char),
                    span,
                );
                Some(ch as char) // error recovery: emit the char as-is
            }
            None => {
                let span = self.span_from(start_line, start_col);
                self.emit_error(
                    ErrorCode::UNTERMINATED_STRING,
                    "unexpected end of input in escape sequence",
                    span,
                );
                None
            }
        }
    }
}
