//! Type annotation parsing: `number`, `string`, `void`, a named object type,
//! or any of those with one or more trailing `[]` suffixes.

use crate::ast::Type;
use crate::Parser;
use quillc_lex::TokenKind;
use quillc_util::Symbol;

impl<'h> Parser<'h> {
    /// Parses a single type annotation, including any array-depth suffix.
    /// Leaves the cursor on the token after the last `]`.
    pub(crate) fn parse_type(&mut self) -> Type {
        let mut ty = match self.cur().kind {
            TokenKind::Number => {
                self.advance();
                Type::Number
            }
            TokenKind::StringKw => {
                self.advance();
                Type::String
            }
            TokenKind::Void => {
                self.advance();
                Type::Void
            }
            TokenKind::Ident => {
                let name = Symbol::intern(&self.cur().value);
                self.advance();
                Type::Named(name)
            }
            _ => {
                self.error_here("expected a type name");
                Type::Number
            }
        };
        while self.at_unknown("[") {
            self.advance();
            self.expect_unknown("]");
            ty = Type::Array(Box::new(ty));
        }
        ty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quillc_lex::lex;
    use quillc_util::Handler;

    fn parse_type_src(src: &str) -> Type {
        let handler = Handler::new();
        let tokens = lex(src);
        Parser::new(tokens, &handler).parse_type()
    }

    #[test]
    fn parses_primitive_types() {
        assert_eq!(parse_type_src("number"), Type::Number);
        assert_eq!(parse_type_src("string"), Type::String);
        assert_eq!(parse_type_src("void"), Type::Void);
    }

    #[test]
    fn parses_named_type() {
        assert_eq!(
            parse_type_src("Point"),
            Type::Named(Symbol::intern("Point"))
        );
    }

    #[test]
    fn array_depth_matches_bracket_suffix_count() {
        let ty = parse_type_src("number[][]");
        assert_eq!(ty.array_depth(), 2);
        assert_eq!(ty.element_type(), &Type::Number);
    }
}
