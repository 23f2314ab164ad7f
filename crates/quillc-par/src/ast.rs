//! AST node definitions shared between the parser and the IR generator.
//!
//! One Rust struct per node kind named in the base spec's data model table,
//! gathered under a single tagged `Node` enum matched exhaustively by the
//! lowering pass in `quillc-gen` — the redesign flag in spec §9 replacing
//! the original's virtual `getType()` + `dynamic_cast` dispatch.
//!
//! Ownership is straightforward: the parser builds owned trees, moves them
//! into `Vec<Node>`s, and the IR generator either consumes them by value or
//! borrows immutably; nothing here is a raw pointer into another node.

use quillc_util::{Span, Symbol};

/// A declared type. Array depth is encoded by nesting: `number[][]` is
/// `Array(Array(Number))`.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Number,
    String,
    Void,
    /// Reference to a user-declared `object` type.
    Named(Symbol),
    Array(Box<Type>),
}

impl Type {
    /// Number of `[]` suffixes at the head of this type, i.e. its array
    /// nesting depth (0 for a non-array type).
    pub fn array_depth(&self) -> usize {
        match self {
            Type::Array(inner) => 1 + inner.array_depth(),
            _ => 0,
        }
    }

    /// The element type underneath all array layers.
    pub fn element_type(&self) -> &Type {
        match self {
            Type::Array(inner) => inner.element_type(),
            other => other,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: Symbol,
    pub ty: Type,
}

#[derive(Debug, Clone)]
pub struct NumberLit {
    pub value: f64,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct StringLit {
    pub value: String,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct VarRef {
    pub name: Symbol,
    pub span: Span,
}

/// Either a fresh declaration (`let name : type = init?`) or a reassignment
/// of an existing name (`name = init`) — the base spec's "reassignment"
/// sentinel, modelled here as a variant with no payload rather than a
/// magic type name.
#[derive(Debug, Clone)]
pub enum VarDeclKind {
    Declared(Type),
    Reassignment,
}

#[derive(Debug, Clone)]
pub struct VarDeclOrAssign {
    pub name: Symbol,
    pub kind: VarDeclKind,
    pub init: Option<Box<Node>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Binary {
    pub op: String,
    pub lhs: Box<Node>,
    pub rhs: Box<Node>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Call {
    pub callee: Symbol,
    pub args: Vec<Node>,
    pub span: Span,
}

/// `new TypeName` — allocates a zero-initialised instance of the named
/// aggregate. Resolved from `original_source`; see SPEC_FULL.md §3.
#[derive(Debug, Clone)]
pub struct NewExpr {
    pub type_name: Symbol,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Proto {
    pub name: Symbol,
    pub params: Vec<Param>,
    pub ret: Type,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Function {
    pub proto: Proto,
    pub body: Vec<Node>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Return {
    pub value: Option<Box<Node>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ElseIf {
    pub cond: Box<Node>,
    pub body: Vec<Node>,
}

#[derive(Debug, Clone)]
pub struct If {
    pub cond: Box<Node>,
    pub then_block: Vec<Node>,
    pub else_ifs: Vec<ElseIf>,
    pub else_block: Option<Vec<Node>>,
    /// Statements textually following the `if`, preserved here because the
    /// parser binds them to this node and the IR generator emits them
    /// after the merge block (base spec §3, "continuation-block").
    pub continuation: Vec<Node>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Loop {
    pub cond: Box<Node>,
    pub body: Vec<Node>,
    pub continuation: Vec<Node>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ObjectDecl {
    pub name: Symbol,
    pub fields: Vec<Param>,
    pub methods: Vec<Function>,
    pub span: Span,
}

/// A bare identifier appearing as a non-leading segment of an object-access
/// chain, e.g. the `y` in `p.y`.
#[derive(Debug, Clone)]
pub struct IdHolder {
    pub name: Symbol,
    pub span: Span,
}

/// `lhs.rhs`. `lhs` is the already-parsed left side of the chain (a
/// `VarRef`/`Call`/nested `ObjectAccess`); `rhs` is one of:
/// - `IdHolder` — read the named field,
/// - `VarDeclOrAssign` (always `Reassignment` kind) — store into the named
///   field, with `init` holding the value expression,
/// - `Call` — invoke a method on the chain's receiver,
/// - nested `ObjectAccess` — continue the chain one more segment.
#[derive(Debug, Clone)]
pub struct ObjectAccess {
    pub lhs: Box<Node>,
    pub rhs: Box<Node>,
    pub span: Span,
}

/// `lhs[index]`, optionally with `store_value` set when this is the target
/// of an assignment (`lhs[index] = store_value`). `lhs` may itself be a
/// nested `ArrayAccess` for multi-dimensional indexing.
#[derive(Debug, Clone)]
pub struct ArrayAccess {
    pub lhs: Box<Node>,
    pub index: Box<Node>,
    pub store_value: Option<Box<Node>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ArrayLit {
    pub elements: Vec<Node>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Node {
    NumberLit(NumberLit),
    StringLit(StringLit),
    VarRef(VarRef),
    VarDeclOrAssign(VarDeclOrAssign),
    Binary(Binary),
    Call(Call),
    New(NewExpr),
    Proto(Proto),
    Function(Function),
    Return(Return),
    If(If),
    Loop(Loop),
    ObjectDecl(ObjectDecl),
    IdHolder(IdHolder),
    ObjectAccess(ObjectAccess),
    ArrayAccess(ArrayAccess),
    ArrayLit(ArrayLit),
}

impl Node {
    pub fn span(&self) -> Span {
        match self {
            Node::NumberLit(n) => n.span,
            Node::StringLit(n) => n.span,
            Node::VarRef(n) => n.span,
            Node::VarDeclOrAssign(n) => n.span,
            Node::Binary(n) => n.span,
            Node::Call(n) => n.span,
            Node::New(n) => n.span,
            Node::Proto(n) => n.span,
            Node::Function(n) => n.span,
            Node::Return(n) => n.span,
            Node::If(n) => n.span,
            Node::Loop(n) => n.span,
            Node::ObjectDecl(n) => n.span,
            Node::IdHolder(n) => n.span,
            Node::ObjectAccess(n) => n.span,
            Node::ArrayAccess(n) => n.span,
            Node::ArrayLit(n) => n.span,
        }
    }
}

/// A parsed source file: a flat forest of top-level nodes (functions,
/// object declarations, variable declarations, and bare expressions).
pub type Ast = Vec<Node>;
