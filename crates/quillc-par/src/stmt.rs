//! Statement parsing: the dispatcher that decides what kind of statement
//! starts at the cursor, plus `let`, `if`/`else if`/`else`, `loop`, and
//! `return`.

use crate::ast::*;
use crate::{Parser, StopAt};
use quillc_lex::TokenKind;
use quillc_util::Symbol;

impl<'h> Parser<'h> {
    /// Parses one statement, leaving the cursor positioned for the next
    /// call to `parse_block`. `until` is forwarded to any `If`/`Loop`
    /// parsed here so their continuation block stops at the same boundary
    /// the caller would have stopped at.
    pub(crate) fn parse_statement(&mut self, until: StopAt) -> Node {
        match self.cur().kind {
            TokenKind::Let => self.parse_let(),
            TokenKind::Return => self.parse_return(),
            TokenKind::If => self.parse_if(until),
            TokenKind::Loop => self.parse_loop(until),
            TokenKind::Fn => self.parse_function_decl(),
            TokenKind::Object => self.parse_object_decl(),
            _ => {
                let expr = self.parse_expr();
                self.skip_terminator();
                expr
            }
        }
    }

    /// `let name : type (= init)?`. A `number`/`string` declaration with no
    /// initializer defaults to `0`/`""` respectively — the base spec never
    /// leaves a declared local uninitialized.
    fn parse_let(&mut self) -> Node {
        let span = self.cur().span;
        self.advance(); // 'let'
        let name = if self.at(TokenKind::Ident) {
            let n = Symbol::intern(&self.cur().value);
            self.advance();
            n
        } else {
            self.error_here("expected a variable name after 'let'");
            Symbol::intern("<error>")
        };
        self.expect_unknown(":");
        let ty = self.parse_type();

        let init = if self.at_unknown("=") {
            self.advance();
            Some(Box::new(self.parse_expr()))
        } else {
            match &ty {
                Type::Number => Some(Box::new(Node::NumberLit(NumberLit { value: 0.0, span }))),
                Type::String => Some(Box::new(Node::StringLit(StringLit {
                    value: String::new(),
                    span,
                }))),
                _ => None,
            }
        };

        self.skip_terminator();
        Node::VarDeclOrAssign(VarDeclOrAssign {
            name,
            kind: VarDeclKind::Declared(ty),
            init,
            span,
        })
    }

    fn parse_return(&mut self) -> Node {
        let span = self.cur().span;
        self.advance(); // 'return'
        let value = if self.at_unknown(";") || self.at_stop_for_return() {
            None
        } else {
            Some(Box::new(self.parse_expr()))
        };
        self.skip_terminator();
        Node::Return(Return { value, span })
    }

    /// A bare `return` at the end of a block has nothing to its right but
    /// the closing brace or end of input — distinguished here since
    /// `advance()` has already folded away any newline that would
    /// otherwise have marked the boundary.
    fn at_stop_for_return(&self) -> bool {
        self.at_unknown("}") || self.at_end()
    }

    /// `if (cond) { ... } (else if (cond) { ... })* (else { ... })?`,
    /// followed by the rest of the enclosing block captured as
    /// `continuation`.
    fn parse_if(&mut self, until: StopAt) -> Node {
        let span = self.cur().span;
        self.advance(); // 'if'
        let cond = Box::new(self.parse_condition());
        let then_block = self.parse_braced_block();

        let mut else_ifs = Vec::new();
        let mut else_block = None;
        while self.at(TokenKind::Else) {
            self.advance();
            if self.at(TokenKind::If) {
                self.advance();
                let cond = Box::new(self.parse_condition());
                let body = self.parse_braced_block();
                else_ifs.push(ElseIf { cond, body });
            } else {
                else_block = Some(self.parse_braced_block());
                break;
            }
        }

        let continuation = self.parse_block(until);
        Node::If(If {
            cond,
            then_block,
            else_ifs,
            else_block,
            continuation,
            span,
        })
    }

    /// `loop (cond) { ... }`, followed by the rest of the enclosing block.
    /// Lowered as a do-while by `quillc-gen`: the body always runs once
    /// before `cond` is first tested (see DESIGN.md).
    fn parse_loop(&mut self, until: StopAt) -> Node {
        let span = self.cur().span;
        self.advance(); // 'loop'
        let cond = Box::new(self.parse_condition());
        let body = self.parse_braced_block();
        let continuation = self.parse_block(until);
        Node::Loop(Loop {
            cond,
            body,
            continuation,
            span,
        })
    }

    fn parse_condition(&mut self) -> Node {
        self.expect_unknown("(");
        let cond = self.parse_expr();
        self.expect_unknown(")");
        cond
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Ast;
    use quillc_lex::lex;
    use quillc_util::Handler;

    fn parse_src(src: &str) -> (Ast, Handler) {
        let handler = Handler::new();
        let tokens = lex(src);
        let ast = crate::parse(tokens, &handler);
        (ast, handler)
    }

    #[test]
    fn let_without_initializer_defaults_number_to_zero() {
        let (ast, handler) = parse_src("let x : number");
        assert!(!handler.has_errors());
        match &ast[0] {
            Node::VarDeclOrAssign(v) => {
                assert!(matches!(v.init.as_deref(), Some(Node::NumberLit(NumberLit{value, ..})) if *value == 0.0));
            }
            other => panic!("expected var decl, got {:?}", other),
        }
    }

    #[test]
    fn let_without_initializer_defaults_string_to_empty() {
        let (ast, handler) = parse_src("let s : string");
        assert!(!handler.has_errors());
        match &ast[0] {
            Node::VarDeclOrAssign(v) => {
                assert!(matches!(v.init.as_deref(), Some(Node::StringLit(StringLit{value, ..})) if value.is_empty()));
            }
            other => panic!("expected var decl, got {:?}", other),
        }
    }

    #[test]
    fn if_absorbs_following_statements_into_continuation() {
        let (ast, handler) = parse_src("if (x) { } let y : number = 1");
        assert!(!handler.has_errors());
        assert_eq!(ast.len(), 1);
        match &ast[0] {
            Node::If(i) => assert_eq!(i.continuation.len(), 1),
            other => panic!("expected if, got {:?}", other),
        }
    }

    #[test]
    fn else_if_chain_is_captured_in_order() {
        let (ast, handler) = parse_src("if (a) { } else if (b) { } else { }");
        assert!(!handler.has_errors());
        match &ast[0] {
            Node::If(i) => {
                assert_eq!(i.else_ifs.len(), 1);
                assert!(i.else_block.is_some());
            }
            other => panic!("expected if, got {:?}", other),
        }
    }

    #[test]
    fn bare_return_has_no_value() {
        let (ast, handler) = parse_src("fn f() : void { return }");
        assert!(!handler.has_errors());
        match &ast[0] {
            Node::Function(f) => match &f.body[0] {
                Node::Return(r) => assert!(r.value.is_none()),
                other => panic!("expected return, got {:?}", other),
            },
            other => panic!("expected function, got {:?}", other),
        }
    }
}
