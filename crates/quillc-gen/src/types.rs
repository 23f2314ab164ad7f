//! Maps Quill's declared types (`quillc_par::ast::Type`) onto the handful of
//! LLVM types the generator actually needs.
//!
//! Every Quill value lowers to one of two LLVM shapes: `f64` for `number`,
//! or an opaque `ptr` for everything else (`string`, an aggregate instance,
//! or an array buffer — the base spec's data model already describes all
//! three as "pointer to ...", so under LLVM's opaque-pointer model they
//! share one `PointerType`). `void` has no value representation; it is only
//! ever seen as a function return type.

use inkwell::context::Context;
use inkwell::types::{BasicTypeEnum, FloatType, PointerType};
use inkwell::AddressSpace;

use quillc_par::ast::Type;

use crate::error::{CodeGenError, Result};
use crate::object::AggregateRegistry;

pub struct TypeMapper<'ctx> {
    context: &'ctx Context,
}

impl<'ctx> TypeMapper<'ctx> {
    pub fn new(context: &'ctx Context) -> Self {
        Self { context }
    }

    pub fn f64_type(&self) -> FloatType<'ctx> {
        self.context.f64_type()
    }

    pub fn ptr_type(&self) -> PointerType<'ctx> {
        self.context.ptr_type(AddressSpace::default())
    }

    /// The LLVM representation of a Quill value of type `ty`. `void` is
    /// rejected — callers needing a return type check for `Type::Void`
    /// themselves before reaching here.
    pub fn basic_type(&self, ty: &Type, registry: &AggregateRegistry<'ctx>) -> Result<BasicTypeEnum<'ctx>> {
        match ty {
            Type::Number => Ok(self.f64_type().into()),
            Type::String => Ok(self.ptr_type().into()),
            Type::Array(_) => Ok(self.ptr_type().into()),
            Type::Named(name) => {
                if registry.layouts.contains_key(name) {
                    Ok(self.ptr_type().into())
                } else {
                    Err(CodeGenError::UnknownType(*name))
                }
            }
            Type::Void => Err(CodeGenError::Internal(
                "void has no value representation".into(),
            )),
        }
    }

    /// The LLVM element type one array level down from `ty` (itself always
    /// `ptr` per `basic_type`, except the innermost element of a `number[]`,
    /// which is `f64` — array buffers are typed by their *element*, not by
    /// the uniform "everything else is a pointer" rule that applies to
    /// standalone values).
    pub fn array_element_type(
        &self,
        element_ty: &Type,
        registry: &AggregateRegistry<'ctx>,
    ) -> Result<BasicTypeEnum<'ctx>> {
        match element_ty {
            Type::Number => Ok(self.f64_type().into()),
            _ => self.basic_type(element_ty, registry),
        }
    }
}
