//! The `Lexer`: dispatches on the current character and produces one token
//! at a time until the cursor runs dry.

use crate::cursor::Cursor;
use crate::{keyword_kind, Token, TokenKind};
use quillc_util::Span;

pub struct Lexer<'a> {
    cursor: Cursor<'a>,
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            cursor: Cursor::new(source),
        }
    }

    /// Runs the lexer to completion, producing the full token stream.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            self.skip_horizontal_whitespace_and_comments();
            if self.cursor.is_at_end() {
                break;
            }
            tokens.push(self.next_token());
        }
        tokens
    }

    /// Skips spaces/tabs/carriage-returns and `//`/`/* */` comments, but
    /// leaves `\n` alone — newlines are tokens, not whitespace, per the
    /// base spec.
    fn skip_horizontal_whitespace_and_comments(&mut self) {
        loop {
            match self.cursor.current_char() {
                ' ' | '\t' | '\r' => {
                    self.cursor.advance();
                }
                '/' if self.cursor.peek_char(1) == '/' => {
                    while !self.cursor.is_at_end() && self.cursor.current_char() != '\n' {
                        self.cursor.advance();
                    }
                }
                '/' if self.cursor.peek_char(1) == '*' => {
                    self.cursor.advance();
                    self.cursor.advance();
                    while !self.cursor.is_at_end()
                        && !(self.cursor.current_char() == '*' && self.cursor.peek_char(1) == '/')
                    {
                        self.cursor.advance();
                    }
                    if !self.cursor.is_at_end() {
                        self.cursor.advance();
                        self.cursor.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn span_from(&self, start: usize, start_line: u32, start_col: u32) -> Span {
        Span::new(
            start,
            self.cursor.position(),
            start_line,
            start_col,
        )
    }

    fn next_token(&mut self) -> Token {
        let start = self.cursor.position();
        let start_line = self.cursor.line();
        let start_col = self.cursor.column();
        let c = self.cursor.current_char();

        if c == '\n' {
            self.cursor.advance();
            return Token::new("\n", TokenKind::Newline, self.span_from(start, start_line, start_col));
        }
        if is_ident_start(c) {
            return self.lex_identifier(start, start_line, start_col);
        }
        if c.is_ascii_digit() {
            return self.lex_number(start, start_line, start_col);
        }
        if c == '"' {
            return self.lex_string(start, start_line, start_col);
        }
        if c == '=' && self.cursor.peek_char(1) == '=' {
            self.cursor.advance();
            self.cursor.advance();
            return Token::new("==", TokenKind::EqEq, self.span_from(start, start_line, start_col));
        }
        if c == '.' {
            self.cursor.advance();
            return Token::new(".", TokenKind::Accessor, self.span_from(start, start_line, start_col));
        }

        // Every other non-whitespace character lexes as a lone "unknown"
        // punctuation token; the parser decides what (if anything) it means.
        self.cursor.advance();
        Token::new(
            c.to_string(),
            TokenKind::Unknown,
            self.span_from(start, start_line, start_col),
        )
    }

    fn lex_identifier(&mut self, start: usize, start_line: u32, start_col: u32) -> Token {
        while is_ident_continue(self.cursor.current_char()) {
            self.cursor.advance();
        }
        let text = self.cursor.slice_from(start);
        let span = self.span_from(start, start_line, start_col);
        match keyword_kind(text) {
            Some(kind) => Token::new(text, kind, span),
            None => Token::new(text, TokenKind::Ident, span),
        }
    }

    /// `[0-9]+ ('.' [0-9]+)?` — at most one decimal point, which must be
    /// preceded by at least one digit (so a bare leading `.` is never
    /// folded into a number literal).
    fn lex_number(&mut self, start: usize, start_line: u32, start_col: u32) -> Token {
        while self.cursor.current_char().is_ascii_digit() {
            self.cursor.advance();
        }
        if self.cursor.current_char() == '.' && self.cursor.peek_char(1).is_ascii_digit() {
            self.cursor.advance();
            while self.cursor.current_char().is_ascii_digit() {
                self.cursor.advance();
            }
        }
        let text = self.cursor.slice_from(start);
        Token::new(text, TokenKind::NumberLit, self.span_from(start, start_line, start_col))
    }

    /// `"..."` with raw backslash passthrough: `\X` consumes the backslash
    /// and whatever follows it verbatim, with no escape-sequence
    /// interpretation (matches the base spec's lexer, which never fails —
    /// an unterminated string simply runs to end of input).
    fn lex_string(&mut self, start: usize, start_line: u32, start_col: u32) -> Token {
        self.cursor.advance(); // opening quote
        let content_start = self.cursor.position();
        loop {
            if self.cursor.is_at_end() {
                break;
            }
            match self.cursor.current_char() {
                '"' => break,
                '\\' => {
                    self.cursor.advance();
                    if !self.cursor.is_at_end() {
                        self.cursor.advance();
                    }
                }
                _ => self.cursor.advance(),
            }
        }
        let content = self.cursor.slice_from(content_start).to_string();
        if !self.cursor.is_at_end() {
            self.cursor.advance(); // closing quote
        }
        Token::new(content, TokenKind::StringLit, self.span_from(start, start_line, start_col))
    }
}
