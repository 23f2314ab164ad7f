//! quillc-par - the Quill parser.
//!
//! A single-cursor recursive-descent parser over the flat [`quillc_lex::Token`]
//! stream. There is no separate tokenizing pass beyond what `quillc-lex`
//! already produced, and no backtracking beyond the bounded lookahead each
//! production documents for itself.
//!
//! Error recovery is local: a production that cannot find what it expects
//! reports one diagnostic through the [`Handler`](quillc_util::Handler),
//! substitutes a zero-literal node in the failing position, and the caller
//! keeps going. The `Handler` accumulates every diagnostic emitted during a
//! parse; [`Handler::has_errors`] is the latch `quillc-drv` checks before it
//! hands the tree to `quillc-gen`.

pub mod ast;
mod expr;
mod items;
mod stmt;
mod types;

pub use ast::{Ast, Node};

use ast::NumberLit;
use quillc_lex::{Token, TokenKind};
use quillc_util::{Handler, Span};

/// What ends the statement list currently being parsed. Threaded through
/// `If`/`Loop` parsing so a control-flow node's continuation block stops at
/// the same boundary its enclosing block would have stopped at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StopAt {
    /// Top level of a file: stop at end of input.
    Eof,
    /// Inside `{ ... }`: stop at the closing brace.
    CloseBrace,
}

/// Recursive-descent parser over a token stream borrowed from the caller.
pub struct Parser<'h> {
    tokens: Vec<Token>,
    pos: usize,
    handler: &'h Handler,
}

/// Parses a complete token stream into a [`Node`] forest, reporting any
/// syntax errors to `handler`. Returns the partial tree even when errors
/// were recorded — the caller decides, via `handler.has_errors()`, whether
/// to proceed to code generation.
pub fn parse(tokens: Vec<Token>, handler: &Handler) -> Ast {
    Parser::new(tokens, handler).parse_program()
}

impl<'h> Parser<'h> {
    pub fn new(tokens: Vec<Token>, handler: &'h Handler) -> Self {
        let mut p = Self {
            tokens,
            pos: 0,
            handler,
        };
        p.skip_leading_newlines();
        p
    }

    pub fn parse_program(&mut self) -> Ast {
        self.parse_block(StopAt::Eof)
    }

    fn skip_leading_newlines(&mut self) {
        while self.cur().kind == TokenKind::Newline {
            self.pos += 1;
        }
    }

    /// Current token. Once the stream is exhausted this keeps returning the
    /// last token forever (an `Unknown` sentinel if the stream was empty),
    /// so callers never need to special-case "ran off the end" themselves.
    pub(crate) fn cur(&self) -> &Token {
        static EOF_SENTINEL: once_token::OnceToken = once_token::OnceToken::new();
        if self.pos < self.tokens.len() {
            &self.tokens[self.pos]
        } else if let Some(last) = self.tokens.last() {
            last
        } else {
            EOF_SENTINEL.get()
        }
    }

    pub(crate) fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn current_span(&self) -> Span {
        self.cur().span
    }

    /// Advances past the current token, then silently skips over any run
    /// of newline tokens that follows. This is the parser's one and only
    /// place that ever looks at `TokenKind::Newline` when it isn't
    /// explicitly checking for a statement terminator.
    pub(crate) fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        while self.cur().kind == TokenKind::Newline && self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.cur().kind == kind
    }

    pub(crate) fn at_unknown(&self, text: &str) -> bool {
        self.cur().kind == TokenKind::Unknown && self.cur().value == text
    }

    /// Two-token lookahead for the operator-assign forms (`+=`, `-=`, ...),
    /// which the lexer hands back as two adjacent `Unknown` tokens.
    pub(crate) fn at_unknown_pair(&self, first: &str, second: &str) -> bool {
        if !self.at_unknown(first) {
            return false;
        }
        self.pos + 1 < self.tokens.len()
            && self.tokens[self.pos + 1].kind == TokenKind::Unknown
            && self.tokens[self.pos + 1].value == second
    }

    pub(crate) fn expect_unknown(&mut self, text: &str) -> bool {
        if self.at_unknown(text) {
            self.advance();
            true
        } else {
            self.error_here(&format!("expected '{}'", text));
            false
        }
    }

    /// Records a single diagnostic pointing at the current token and
    /// latches `handler.has_errors()`. Always advances at least one token,
    /// guaranteeing the caller makes progress even when recovery leaves the
    /// grammar in a state no production expects.
    pub(crate) fn error_here(&mut self, message: &str) {
        let span = self.current_span();
        self.handler.build_error(span, message.to_string()).emit(self.handler);
        if !self.at_end() {
            self.advance();
        }
    }

    /// Builds the zero-literal substitute node used by every recovery path,
    /// per the base spec's "substitute a zero literal" recovery rule.
    pub(crate) fn zero_literal(&self) -> Node {
        Node::NumberLit(NumberLit {
            value: 0.0,
            span: self.current_span(),
        })
    }

    /// Consumes a single statement terminator if one is present: either an
    /// `Unknown(";")` token or a newline (the latter already having been
    /// folded away by the previous `advance()` in the common case, so this
    /// mostly matters right after a token that `advance()` didn't itself
    /// consume, e.g. a closing `}`). Terminators are optional — a statement
    /// immediately followed by a block-closing `}` needs none.
    pub(crate) fn skip_terminator(&mut self) {
        if self.at_unknown(";") {
            self.advance();
        }
    }

    fn at_stop(&self, until: StopAt) -> bool {
        match until {
            StopAt::Eof => self.at_end(),
            StopAt::CloseBrace => self.at_unknown("}") || self.at_end(),
        }
    }

    /// Parses statements until `until`'s boundary. An `If` or `Loop`
    /// encountered along the way swallows the remainder of the block into
    /// its own `continuation` field (see `stmt.rs`), so once one is parsed
    /// this loop has nothing left to do.
    pub(crate) fn parse_block(&mut self, until: StopAt) -> Vec<Node> {
        let mut stmts = Vec::new();
        while !self.at_stop(until) {
            let stmt = self.parse_statement(until);
            let absorbs_rest = matches!(stmt, Node::If(_) | Node::Loop(_));
            stmts.push(stmt);
            if absorbs_rest {
                break;
            }
        }
        stmts
    }

    /// Parses a `{ ... }` block, consuming both braces.
    pub(crate) fn parse_braced_block(&mut self) -> Vec<Node> {
        self.expect_unknown("{");
        let body = self.parse_block(StopAt::CloseBrace);
        self.expect_unknown("}");
        body
    }
}

/// A thread-safe once-initialised fallback token so `Parser::cur()` never
/// needs to return an `Option` — every production can unconditionally read
/// `.kind`/`.value` off whatever `cur()` hands back.
mod once_token {
    use quillc_lex::{Token, TokenKind};
    use quillc_util::Span;
    use std::sync::OnceLock;

    pub(crate) struct OnceToken(OnceLock<Token>);

    impl OnceToken {
        pub(crate) const fn new() -> Self {
            Self(OnceLock::new())
        }

        pub(crate) fn get(&self) -> &Token {
            self.0
                .get_or_init(|| Token::new("", TokenKind::Unknown, Span::DUMMY))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quillc_lex::lex;

    fn parse_src(src: &str) -> (Ast, Handler) {
        let handler = Handler::new();
        let tokens = lex(src);
        let ast = Parser::new(tokens, &handler).parse_program();
        (ast, handler)
    }

    #[test]
    fn empty_input_parses_to_empty_program() {
        let (ast, handler) = parse_src("");
        assert!(ast.is_empty());
        assert!(!handler.has_errors());
    }

    /// Property 10 from the base spec: a malformed construct latches the
    /// error flag rather than panicking, and parsing continues to the end
    /// of input.
    #[test]
    fn malformed_input_latches_error_and_recovers() {
        let (ast, handler) = parse_src("let x : number = \nlet y : number = 2");
        assert!(handler.has_errors());
        assert_eq!(ast.len(), 2);
    }

    #[test]
    fn newlines_between_statements_are_invisible_to_the_parser() {
        let (ast, handler) = parse_src("let x : number = 1\n\n\nlet y : number = 2");
        assert!(!handler.has_errors());
        assert_eq!(ast.len(), 2);
    }
}
