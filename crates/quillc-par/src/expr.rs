//! Expression parsing: precedence-climbing binary operators over a primary
//! production that dispatches on the lookahead token.
//!
//! # Operator precedence (lowest to highest)
//!
//! | Precedence | Operators   |
//! |------------|-------------|
//! | 5          | `and`, `or` |
//! | 10         | `==`, `<`, `>` |
//! | 20         | `+`, `-`    |
//! | 40         | `*`         |
//! | 50         | `/`, `%`    |
//!
//! Unary `+`/`-` is not a distinct production: `-x` is parsed as the binary
//! expression `0 - x`, a synthetic zero literal standing in for the base
//! spec's "synthetic `0` token" trick (testable property 3).

use crate::ast::*;
use crate::Parser;
use quillc_lex::TokenKind;
use quillc_util::Symbol;

impl<'h> Parser<'h> {
    /// Entry point for any expression context (call arguments, array
    /// indices, initializers, conditions).
    pub(crate) fn parse_expr(&mut self) -> Node {
        self.parse_binary(0)
    }

    fn parse_binary(&mut self, min_prec: u8) -> Node {
        let mut lhs = self.parse_unary_or_primary();
        while let Some((op, prec)) = self.peek_binop() {
            if prec < min_prec {
                break;
            }
            let span = lhs.span();
            self.advance();
            let rhs = self.parse_binary(prec + 1);
            lhs = Node::Binary(Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span,
            });
        }
        lhs
    }

    fn peek_binop(&self) -> Option<(String, u8)> {
        match self.cur().kind {
            TokenKind::And => Some(("and".to_string(), 5)),
            TokenKind::Or => Some(("or".to_string(), 5)),
            TokenKind::EqEq => Some(("==".to_string(), 10)),
            TokenKind::Unknown => match self.cur().value.as_str() {
                "<" => Some(("<".to_string(), 10)),
                ">" => Some((">".to_string(), 10)),
                "+" => Some(("+".to_string(), 20)),
                "-" => Some(("-".to_string(), 20)),
                "*" => Some(("*".to_string(), 40)),
                "/" => Some(("/".to_string(), 50)),
                "%" => Some(("%".to_string(), 50)),
                _ => None,
            },
            _ => None,
        }
    }

    fn parse_unary_or_primary(&mut self) -> Node {
        if self.at_unknown("+") || self.at_unknown("-") {
            let op = self.cur().value.clone();
            let span = self.cur().span;
            self.advance();
            let operand = self.parse_unary_or_primary();
            let zero = Node::NumberLit(NumberLit { value: 0.0, span });
            return Node::Binary(Binary {
                op,
                lhs: Box::new(zero),
                rhs: Box::new(operand),
                span,
            });
        }
        self.parse_primary_expr()
    }

    fn parse_primary_expr(&mut self) -> Node {
        if self.at(TokenKind::NumberLit) {
            let span = self.cur().span;
            let value: f64 = self.cur().value.parse().unwrap_or(0.0);
            self.advance();
            return Node::NumberLit(NumberLit { value, span });
        }
        if self.at(TokenKind::StringLit) {
            let span = self.cur().span;
            let value = self.cur().value.clone();
            self.advance();
            return Node::StringLit(StringLit { value, span });
        }
        if self.at(TokenKind::New) {
            return self.parse_new_expr();
        }
        if self.at(TokenKind::Ident) {
            return self.parse_identifier_led();
        }
        if self.at_unknown("[") {
            return self.parse_array_literal();
        }
        if self.at_unknown("(") {
            self.advance();
            let inner = self.parse_expr();
            self.expect_unknown(")");
            return inner;
        }
        self.error_here("expected an expression");
        self.zero_literal()
    }

    fn parse_new_expr(&mut self) -> Node {
        let span = self.cur().span;
        self.advance(); // 'new'
        if self.at(TokenKind::Ident) {
            let type_name = Symbol::intern(&self.cur().value);
            self.advance();
            Node::New(NewExpr { type_name, span })
        } else {
            self.error_here("expected a type name after 'new'");
            self.zero_literal()
        }
    }

    /// An identifier can lead any of: a plain reference, a call, a
    /// compound/simple assignment, an array-access chain, or an
    /// object-access chain. A call immediately followed by `.` (`foo().bar`)
    /// becomes the base of an object-access chain rather than a standalone
    /// expression.
    fn parse_identifier_led(&mut self) -> Node {
        let span = self.cur().span;
        let name = Symbol::intern(&self.cur().value);
        self.advance();

        if self.at_unknown("(") {
            self.advance();
            let args = self.parse_call_args();
            let call = Node::Call(Call {
                callee: name,
                args,
                span,
            });
            if self.at(TokenKind::Accessor) {
                return self.parse_object_access_chain(call);
            }
            return call;
        }

        if self.at_unknown("[") {
            return self.parse_array_access_chain(name, span);
        }

        if self.at(TokenKind::Accessor) {
            let base = Node::VarRef(VarRef { name, span });
            return self.parse_object_access_chain(base);
        }

        for op in ["+", "-", "*", "/"] {
            if self.at_unknown_pair(op, "=") {
                self.advance();
                self.advance();
                let rhs = self.parse_expr();
                let lhs = Node::VarRef(VarRef { name, span });
                let combined = Node::Binary(Binary {
                    op: op.to_string(),
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                    span,
                });
                return Node::VarDeclOrAssign(VarDeclOrAssign {
                    name,
                    kind: VarDeclKind::Reassignment,
                    init: Some(Box::new(combined)),
                    span,
                });
            }
        }

        if self.at_unknown("=") {
            self.advance();
            let rhs = self.parse_expr();
            return Node::VarDeclOrAssign(VarDeclOrAssign {
                name,
                kind: VarDeclKind::Reassignment,
                init: Some(Box::new(rhs)),
                span,
            });
        }

        Node::VarRef(VarRef { name, span })
    }

    pub(crate) fn parse_call_args(&mut self) -> Vec<Node> {
        let mut args = Vec::new();
        if self.at_unknown(")") {
            self.advance();
            return args;
        }
        loop {
            args.push(self.parse_expr());
            if self.at_unknown(",") {
                self.advance();
                continue;
            }
            break;
        }
        self.expect_unknown(")");
        args
    }

    /// `name[i]`, `name[i][j]`, ..., optionally terminated by `= value`.
    /// Only the final index in the chain may carry a `store_value`.
    fn parse_array_access_chain(&mut self, name: Symbol, span: quillc_util::Span) -> Node {
        let mut node = Node::VarRef(VarRef { name, span });
        loop {
            if !self.at_unknown("[") {
                break;
            }
            self.advance();
            let index = self.parse_expr();
            self.expect_unknown("]");
            let store_value = if self.at_unknown("=") {
                self.advance();
                Some(Box::new(self.parse_expr()))
            } else {
                None
            };
            let terminal = store_value.is_some();
            node = Node::ArrayAccess(ArrayAccess {
                lhs: Box::new(node),
                index: Box::new(index),
                store_value,
                span,
            });
            if terminal {
                break;
            }
        }
        node
    }

    /// `lhs.seg.seg...`. Each segment is a field read (`IdHolder`), a field
    /// store (`VarDeclOrAssign`, which ends the chain), or a method call
    /// (`Call`, which may itself continue the chain).
    fn parse_object_access_chain(&mut self, base: Node) -> Node {
        let mut lhs = base;
        while self.at(TokenKind::Accessor) {
            self.advance();
            let span = self.cur().span;
            if !self.at(TokenKind::Ident) {
                self.error_here("expected a field or method name after '.'");
                lhs = Node::ObjectAccess(ObjectAccess {
                    lhs: Box::new(lhs),
                    rhs: Box::new(self.zero_literal()),
                    span,
                });
                break;
            }
            let name = Symbol::intern(&self.cur().value);
            self.advance();

            if self.at_unknown("(") {
                self.advance();
                let args = self.parse_call_args();
                let call = Node::Call(Call {
                    callee: name,
                    args,
                    span,
                });
                lhs = Node::ObjectAccess(ObjectAccess {
                    lhs: Box::new(lhs),
                    rhs: Box::new(call),
                    span,
                });
            } else if self.at_unknown("=") {
                self.advance();
                let rhs = self.parse_expr();
                let assign = Node::VarDeclOrAssign(VarDeclOrAssign {
                    name,
                    kind: VarDeclKind::Reassignment,
                    init: Some(Box::new(rhs)),
                    span,
                });
                lhs = Node::ObjectAccess(ObjectAccess {
                    lhs: Box::new(lhs),
                    rhs: Box::new(assign),
                    span,
                });
                break;
            } else {
                let id = Node::IdHolder(IdHolder { name, span });
                lhs = Node::ObjectAccess(ObjectAccess {
                    lhs: Box::new(lhs),
                    rhs: Box::new(id),
                    span,
                });
            }
        }
        lhs
    }

    fn parse_array_literal(&mut self) -> Node {
        let span = self.cur().span;
        self.advance(); // '['
        let mut elements = Vec::new();
        if !self.at_unknown("]") {
            loop {
                elements.push(self.parse_expr());
                if self.at_unknown(",") {
                    self.advance();
                    continue;
                }
                break;
            }
        }
        self.expect_unknown("]");
        Node::ArrayLit(ArrayLit { elements, span })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quillc_lex::lex;
    use quillc_util::Handler;

    fn parse_expr_src(src: &str) -> Node {
        let handler = Handler::new();
        let tokens = lex(src);
        let mut p = Parser::new(tokens, &handler);
        let node = p.parse_expr();
        assert!(!handler.has_errors(), "unexpected diagnostics for {:?}", src);
        node
    }

    /// Property 2: `*` binds tighter than `+`.
    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let node = parse_expr_src("a + b * c");
        match node {
            Node::Binary(Binary { op, rhs, .. }) => {
                assert_eq!(op, "+");
                assert!(matches!(*rhs, Node::Binary(Binary { op, .. }) if op == "*"));
            }
            other => panic!("expected top-level '+', got {:?}", other),
        }
    }

    /// Property 4: comparisons bind tighter than `and`/`or`.
    #[test]
    fn equality_binds_tighter_than_and() {
        let node = parse_expr_src("a == b and c");
        match node {
            Node::Binary(Binary { op, lhs, .. }) => {
                assert_eq!(op, "and");
                assert!(matches!(*lhs, Node::Binary(Binary { op, .. }) if op == "=="));
            }
            other => panic!("expected top-level 'and', got {:?}", other),
        }
    }

    #[test]
    fn addition_is_left_associative() {
        let node = parse_expr_src("a - b - c");
        match node {
            Node::Binary(Binary { op, lhs, .. }) => {
                assert_eq!(op, "-");
                assert!(matches!(*lhs, Node::Binary(Binary { op, .. }) if op == "-"));
            }
            other => panic!("expected top-level '-', got {:?}", other),
        }
    }

    /// Property 3: unary minus injects a synthetic zero-literal lhs.
    #[test]
    fn unary_minus_injects_zero_literal() {
        let node = parse_expr_src("-x");
        match node {
            Node::Binary(Binary { op, lhs, rhs, .. }) => {
                assert_eq!(op, "-");
                assert!(matches!(*lhs, Node::NumberLit(NumberLit { value, .. }) if value == 0.0));
                assert!(matches!(*rhs, Node::VarRef(_)));
            }
            other => panic!("expected injected '0 - x', got {:?}", other),
        }
    }

    #[test]
    fn call_followed_by_accessor_becomes_object_access() {
        let node = parse_expr_src("make().x");
        assert!(matches!(node, Node::ObjectAccess(_)));
    }

    #[test]
    fn multi_dimensional_array_access_nests_left() {
        let node = parse_expr_src("grid[0][1]");
        match node {
            Node::ArrayAccess(ArrayAccess { lhs, .. }) => {
                assert!(matches!(*lhs, Node::ArrayAccess(_)));
            }
            other => panic!("expected nested array access, got {:?}", other),
        }
    }
}
