//! Item parsing: function declarations and `object` declarations.
//!
//! Nested function declarations are left exactly where the parser found
//! them inside a body; hoisting them out to lower first is `quillc-gen`'s
//! job (see DESIGN.md), not the parser's.

use crate::ast::*;
use crate::Parser;
use quillc_lex::TokenKind;
use quillc_util::Symbol;

impl<'h> Parser<'h> {
    /// `fn name ( param : type , ... ) : rettype { body }`
    pub(crate) fn parse_function_decl(&mut self) -> Node {
        let proto = self.parse_proto();
        let body = self.parse_braced_block();
        let span = proto.span;
        Node::Function(Function { proto, body, span })
    }

    fn parse_proto(&mut self) -> Proto {
        let span = self.cur().span;
        self.advance(); // 'fn'
        let name = if self.at(TokenKind::Ident) {
            let n = Symbol::intern(&self.cur().value);
            self.advance();
            n
        } else {
            self.error_here("expected a function name after 'fn'");
            Symbol::intern("<error>")
        };

        self.expect_unknown("(");
        let params = self.parse_params();
        self.expect_unknown(")");

        let ret = if self.at_unknown(":") {
            self.advance();
            self.parse_type()
        } else {
            Type::Void
        };

        Proto {
            name,
            params,
            ret,
            span,
        }
    }

    fn parse_params(&mut self) -> Vec<Param> {
        let mut params = Vec::new();
        if self.at_unknown(")") {
            return params;
        }
        loop {
            if !self.at(TokenKind::Ident) {
                self.error_here("expected a parameter name");
                break;
            }
            let name = Symbol::intern(&self.cur().value);
            self.advance();
            self.expect_unknown(":");
            let ty = self.parse_type();
            params.push(Param { name, ty });
            if self.at_unknown(",") {
                self.advance();
                continue;
            }
            break;
        }
        params
    }

    /// `object Name { field : type , ... (fn method ...)* }`. Each method's
    /// own name is prefixed with `Name.` right here, before `quillc-gen`
    /// ever sees it — the base spec's receiver-injection scheme keys method
    /// dispatch off the mangled name (see SPEC_FULL.md §4.2, "Object
    /// declaration").
    pub(crate) fn parse_object_decl(&mut self) -> Node {
        let span = self.cur().span;
        self.advance(); // 'object'
        let name = if self.at(TokenKind::Ident) {
            let n = Symbol::intern(&self.cur().value);
            self.advance();
            n
        } else {
            self.error_here("expected an object name after 'object'");
            Symbol::intern("<error>")
        };
        self.expect_unknown("{");

        let mut fields = Vec::new();
        while self.at(TokenKind::Ident) {
            let fname = Symbol::intern(&self.cur().value);
            self.advance();
            self.expect_unknown(":");
            let ty = self.parse_type();
            fields.push(Param { name: fname, ty });
            if self.at_unknown(",") {
                self.advance();
            } else {
                self.skip_terminator();
            }
        }

        let mut methods = Vec::new();
        while self.at(TokenKind::Fn) {
            if let Node::Function(mut f) = self.parse_function_decl() {
                let mangled = format!("{}.{}", name.as_str(), f.proto.name.as_str());
                f.proto.name = Symbol::intern(&mangled);
                methods.push(f);
            }
        }

        self.expect_unknown("}");
        Node::ObjectDecl(ObjectDecl {
            name,
            fields,
            methods,
            span,
        })
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
    fn function_decl_has_params_and_return_type() {
        let (ast, handler) = parse_src("fn add(a : number, b : number) : number { return a + b }");
        assert!(!handler.has_errors());
        match &ast[0] {
            Node::Function(f) => {
                assert_eq!(f.proto.name.as_str(), "add");
                assert_eq!(f.proto.params.len(), 2);
                assert_eq!(f.proto.ret, Type::Number);
            }
            other => panic!("expected function, got {:?}", other),
        }
    }

    #[test]
    fn function_decl_defaults_to_void_return() {
        let (ast, handler) = parse_src("fn noop() { }");
        assert!(!handler.has_errors());
        match &ast[0] {
            Node::Function(f) => assert_eq!(f.proto.ret, Type::Void),
            other => panic!("expected function, got {:?}", other),
        }
    }

    #[test]
    fn object_method_names_are_mangled_with_the_object_name() {
        let (ast, handler) =
            parse_src("object Point { x : number, y : number fn sum() : number { return x } }");
        assert!(!handler.has_errors());
        match &ast[0] {
            Node::ObjectDecl(o) => {
                assert_eq!(o.fields.len(), 2);
                assert_eq!(o.methods[0].proto.name.as_str(), "Point.sum");
            }
            other => panic!("expected object decl, got {:?}", other),
        }
    }
}
