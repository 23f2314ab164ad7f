//! quillc-util - shared infrastructure for the Quill compiler.
//!
//! Every other crate in the workspace (`quillc-lex`, `quillc-par`, `quillc-gen`,
//! `quillc-drv`) depends on this crate for the three things a small compiler
//! needs everywhere: interned identifiers ([`symbol::Symbol`]), source
//! locations ([`span::Span`], [`span::SourceMap`]), and diagnostic reporting
//! ([`diagnostic::Handler`]).
//!
//! None of these types encode anything about Quill's grammar or semantics —
//! that lives in the phase crates. This crate only provides the plumbing.

pub mod diagnostic;
pub mod error;
pub mod span;
pub mod symbol;

pub use diagnostic::{Diagnostic, Handler, Level};
pub use span::{FileId, SourceMap, Span};
pub use symbol::Symbol;

pub use rustc_hash::{FxHashMap, FxHashSet};
