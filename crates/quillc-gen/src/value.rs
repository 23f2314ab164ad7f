//! The result of lowering any expression: its LLVM value plus its declared
//! Quill type. The type half is carried alongside the value everywhere
//! (rather than left to be recovered from the LLVM value itself) because
//! LLVM's opaque pointers make every `string`, aggregate instance, and
//! array buffer the exact same `ptr` type at the IR level — the base
//! spec's method-dispatch "recover the type name from the receiver's LLIR
//! type" step has to be done against this Rust-level type tag instead (see
//! DESIGN.md).

use inkwell::values::BasicValueEnum;
use quillc_par::ast::Type;

#[derive(Clone)]
pub struct Lowered<'ctx> {
    pub value: BasicValueEnum<'ctx>,
    pub ty: Type,
}

impl<'ctx> Lowered<'ctx> {
    pub fn new(value: impl Into<BasicValueEnum<'ctx>>, ty: Type) -> Self {
        Self {
            value: value.into(),
            ty,
        }
    }
}
