//! quillc-lex - the Quill lexer.
//!
//! Turns source text into a flat [`Token`] stream. The lexer is a pure
//! function of its input: it never fails, never shares state across calls,
//! and never consults anything outside the source string it was given — a
//! malformed character just becomes a [`TokenKind::Unknown`] token rather
//! than an error. Recovery from malformed input is entirely the parser's
//! problem (see `quillc-par`).

pub mod cursor;
mod lexer;

pub use cursor::Cursor;
pub use lexer::Lexer;

use quillc_util::Span;

/// The kind of lexeme a [`Token`] represents.
///
/// Mirrors the base language's token categories one for one: the thirteen
/// keywords, identifiers, the two literal forms, the newline marker the
/// parser uses to track source lines, the `.` accessor, `==`, and a
/// catch-all `Unknown` for any other single punctuation character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Let,
    Fn,
    Number,
    StringKw,
    Void,
    Return,
    If,
    Else,
    Loop,
    New,
    Object,
    And,
    Or,

    Ident,
    NumberLit,
    StringLit,

    Newline,
    Accessor,
    EqEq,
    Unknown,
}

/// A single lexical token: its raw source text plus its category.
///
/// `value` is kept around (rather than discarded once `kind` is known)
/// because the parser's recovery path echoes the offending lexeme verbatim
/// in diagnostics, and because `Unknown` tokens carry no other way to tell
/// `+` apart from `;`.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub value: String,
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(value: impl Into<String>, kind: TokenKind, span: Span) -> Self {
        Self {
            value: value.into(),
            kind,
            span,
        }
    }

    pub fn is_kind(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

const KEYWORDS: &[(&str, TokenKind)] = &[
    ("let", TokenKind::Let),
    ("fn", TokenKind::Fn),
    ("number", TokenKind::Number),
    ("string", TokenKind::StringKw),
    ("void", TokenKind::Void),
    ("return", TokenKind::Return),
    ("if", TokenKind::If),
    ("else", TokenKind::Else),
    ("loop", TokenKind::Loop),
    ("new", TokenKind::New),
    ("object", TokenKind::Object),
    ("and", TokenKind::And),
    ("or", TokenKind::Or),
];

/// Looks up `text` in the fixed keyword table, returning its kind if it is
/// a reserved word.
pub fn keyword_kind(text: &str) -> Option<TokenKind> {
    KEYWORDS
        .iter()
        .find(|(kw, _)| *kw == text)
        .map(|(_, kind)| *kind)
}

/// Lexes `source` into a flat token stream. This is the crate's sole entry
/// point: one call, one fresh [`Lexer`], no state retained afterwards.
pub fn lex(source: &str) -> Vec<Token> {
    Lexer::new(source).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        lex(src).into_iter().map(|t| t.kind).collect()
    }

    /// Property 1 from the base spec: lexing is insensitive to leading and
    /// trailing horizontal whitespace.
    #[test]
    fn idempotent_on_trivial_whitespace() {
        let s = "let x : number = 1";
        assert_eq!(kinds(s), kinds(&format!(" {} ", s)));
    }

    #[test]
    fn keywords_are_rekinded_from_identifiers() {
        let ks = kinds("let fn number string void return if else loop new object and or");
        assert_eq!(
            ks,
            vec![
                TokenKind::Let,
                TokenKind::Fn,
                TokenKind::Number,
                TokenKind::StringKw,
                TokenKind::Void,
                TokenKind::Return,
                TokenKind::If,
                TokenKind::Else,
                TokenKind::Loop,
                TokenKind::New,
                TokenKind::Object,
                TokenKind::And,
                TokenKind::Or,
            ]
        );
    }

    #[test]
    fn unknown_keyword_lookalike_stays_an_identifier() {
        assert_eq!(kinds("letters"), vec![TokenKind::Ident]);
    }

    #[test]
    fn unknown_single_characters_fall_through() {
        assert_eq!(
            kinds("+-*/%(){}[],:;!<>="),
            vec![TokenKind::Unknown; "+-*/%(){}[],:;!<>=".chars().count()]
        );
    }

    #[test]
    fn equality_is_two_characters_wide() {
        assert_eq!(kinds("=="), vec![TokenKind::EqEq]);
        assert_eq!(kinds("="), vec![TokenKind::Unknown]);
    }

    #[test]
    fn accessor_is_its_own_kind() {
        assert_eq!(kinds("a.b"), vec![TokenKind::Ident, TokenKind::Accessor, TokenKind::Ident]);
    }

    #[test]
    fn newlines_are_preserved_one_per_line_break() {
        assert_eq!(
            kinds("a\n\nb"),
            vec![
                TokenKind::Ident,
                TokenKind::Newline,
                TokenKind::Newline,
                TokenKind::Ident
            ]
        );
    }

    #[test]
    fn lexer_never_fails_on_garbage() {
        let toks = lex("@#$%^&~`\0");
        assert!(toks.iter().all(|t| t.kind == TokenKind::Unknown));
    }
}
