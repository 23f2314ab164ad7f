//! Declares the eight-entry runtime support library ABI (base spec §6).
//!
//! The runtime itself — string concatenation, modulus, I/O — is out of
//! core scope; the generator only needs every symbol declared with
//! external linkage before any user code is lowered, exactly as the base
//! spec requires. All eight take a variadic trailing `...` in their C
//! signature (the original runtime is a C library built with a varargs
//! prototype for every entry point, recovered from
//! `original_source/pekodir/stdlib/stdlib.c`), so each is declared here as
//! a variadic function.

use inkwell::module::Linkage;

use quillc_par::ast::Type;
use quillc_util::Symbol;

use crate::context::{FunctionSig, Generator};

impl<'ctx> Generator<'ctx> {
    pub fn declare_runtime(&mut self) {
        let f64_ty = self.context.f64_type();
        let ptr_ty = self.types.ptr_type();

        let mut declare = |gen: &mut Self,
                            name: &str,
                            ret_is_ptr: bool,
                            params: &[inkwell::types::BasicMetadataTypeEnum<'ctx>],
                            sig_params: Vec<Type>| {
            let fn_ty = if ret_is_ptr {
                ptr_ty.fn_type(params, true)
            } else {
                f64_ty.fn_type(params, true)
            };
            gen.module.add_function(name, fn_ty, Some(Linkage::External));
            let ret = if ret_is_ptr { Type::String } else { Type::Number };
            gen.signatures.insert(
                Symbol::intern(name),
                FunctionSig {
                    params: sig_params,
                    ret,
                },
            );
        };

        declare(self, "printnum", false, &[f64_ty.into()], vec![Type::Number]);
        declare(self, "printstr", false, &[ptr_ty.into()], vec![Type::String]);
        declare(self, "input", true, &[ptr_ty.into()], vec![Type::String]);
        declare(self, "inputnum", false, &[ptr_ty.into()], vec![Type::String]);
        declare(
            self,
            "addstr",
            true,
            &[ptr_ty.into(), ptr_ty.into()],
            vec![Type::String, Type::String],
        );
        declare(
            self,
            "mulstr",
            true,
            &[ptr_ty.into(), f64_ty.into()],
            vec![Type::String, Type::Number],
        );
        declare(
            self,
            "cmpstr",
            false,
            &[ptr_ty.into(), ptr_ty.into()],
            vec![Type::String, Type::String],
        );
        declare(
            self,
            "modnum",
            false,
            &[f64_ty.into(), f64_ty.into()],
            vec![Type::Number, Type::Number],
        );

        // malloc is not part of the language's runtime ABI table but is
        // relied on by every object/array allocation the generator emits;
        // declaring it here keeps all external-linkage declarations
        // together, ahead of any user code, as base spec §6 requires.
        let i64_ty = self.context.i64_type();
        self.module.add_function(
            "malloc",
            ptr_ty.fn_type(&[i64_ty.into()], false),
            Some(Linkage::External),
        );
    }

    pub fn runtime_fn(&self, name: &str) -> crate::error::Result<inkwell::values::FunctionValue<'ctx>> {
        self.module
            .get_function(name)
            .ok_or_else(|| crate::error::CodeGenError::Internal(format!("runtime symbol '{name}' not declared")))
    }
}
