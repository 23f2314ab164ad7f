//! Function and method body lowering shared by top-level `fn` declarations,
//! nested (hoisted) functions, and object methods (base spec §4.3 "Return
//! handling", §4.4 "Hoisting and shadowing").

use inkwell::types::BasicMetadataTypeEnum;
use inkwell::values::FunctionValue;

use quillc_par::ast::{Function, Node, Param, Type};
use quillc_util::Symbol;

use crate::context::{FunctionSig, Generator, VarSlot};
use crate::error::Result;

impl<'ctx> Generator<'ctx> {
    /// Returns the `FunctionValue` for `name`, declaring it (and recording
    /// its signature) on first use. Top-level functions are declared ahead
    /// of time by the forward-declaration pass in `lib.rs`; nested
    /// functions and methods reach this the first time they're lowered.
    fn declare_function_value(&mut self, name: Symbol, params: &[Param], ret: &Type) -> Result<FunctionValue<'ctx>> {
        if let Some(existing) = self.module.get_function(name.as_str()) {
            return Ok(existing);
        }

        let param_tys = params
            .iter()
            .map(|p| -> Result<BasicMetadataTypeEnum<'ctx>> {
                Ok(self.types.basic_type(&p.ty, &self.registry)?.into())
            })
            .collect::<Result<Vec<_>>>()?;

        let fn_ty = if matches!(ret, Type::Void) {
            self.context.void_type().fn_type(&param_tys, false)
        } else {
            self.types.basic_type(ret, &self.registry)?.fn_type(&param_tys, false)
        };

        let function = self.module.add_function(name.as_str(), fn_ty, None);
        self.signatures.insert(
            name,
            FunctionSig {
                params: params.iter().map(|p| p.ty.clone()).collect(),
                ret: ret.clone(),
            },
        );
        Ok(function)
    }

    /// Pre-declares every top-level function's signature before any body is
    /// lowered, so forward references between top-level functions resolve
    /// (base spec's pipeline lowers in source order but a call may precede
    /// its callee's declaration).
    pub fn forward_declare_function(&mut self, function: &Function) -> Result<()> {
        self.declare_function_value(function.proto.name, &function.proto.params, &function.proto.ret)?;
        Ok(())
    }

    /// Opens `name`'s entry block, binds its parameters as locals, and
    /// leaves the builder positioned there. Paired with
    /// [`Generator::finish_function`].
    pub(crate) fn begin_function(&mut self, name: Symbol, params: &[Param], ret: &Type) -> Result<FunctionValue<'ctx>> {
        let function = self.declare_function_value(name, params, ret)?;
        let entry = self.context.append_basic_block(function, "entry");
        self.builder.position_at_end(entry);
        self.scopes.enter_function();

        for (i, param) in params.iter().enumerate() {
            let llvm_param = function
                .get_nth_param(i as u32)
                .expect("parameter count matches declared signature");
            let llvm_ty = self.types.basic_type(&param.ty, &self.registry)?;
            let ptr = self.builder.build_alloca(llvm_ty, param.name.as_str())?;
            self.builder.build_store(ptr, llvm_param)?;
            self.scopes.declare(param.name, VarSlot { ptr, ty: param.ty.clone() });
            if param.ty.array_depth() > 0 {
                self.arrays.declare(param.name, param.ty.array_depth());
            }
        }

        Ok(function)
    }

    /// Synthesises a `ret void` if the body fell through without one (base
    /// spec: "Functions declared `void` receive a synthesised `ret` at the
    /// end of lowering if the body does not already terminate"). A typed
    /// function that falls through has no well-defined value to return —
    /// the base spec explicitly performs no check here, but LLVM still
    /// requires every block to end in a terminator, so a typed function
    /// that falls through gets `build_unreachable` instead of a fabricated
    /// value (see DESIGN.md).
    pub(crate) fn finish_function(&mut self, ret: &Type) -> Result<()> {
        let needs_terminator = self
            .builder
            .get_insert_block()
            .map(|bb| bb.get_terminator().is_none())
            .unwrap_or(false);

        if needs_terminator {
            if matches!(ret, Type::Void) {
                self.builder.build_return(None)?;
            } else {
                self.builder.build_unreachable()?;
            }
        }

        self.scopes.exit_function();
        Ok(())
    }

    /// Lowers one function body: hoists nested `fn` declarations and lowers
    /// them first (base spec §4.4), then lowers the remaining statements in
    /// source order. Shared by top-level functions, nested functions, and
    /// object methods (the latter via [`crate::object::Generator::lower_method`]-style
    /// callers that append the trailing `this` parameter before calling in).
    pub fn lower_function_with_params(
        &mut self,
        name: Symbol,
        params: &[Param],
        ret: &Type,
        body: &[Node],
    ) -> Result<()> {
        self.begin_function(name, params, ret)?;
        self.lower_body_statements(body)?;
        self.finish_function(ret)
    }

    /// `main` is lowered like any other function except its entry block
    /// drains the deferred-globals lists before its own statements (base
    /// spec "Global-initialisation order").
    pub fn lower_main(&mut self, main_fn: &Function, top_level: &[Node]) -> Result<()> {
        self.begin_function(main_fn.proto.name, &main_fn.proto.params, &main_fn.proto.ret)?;
        self.emit_deferred_globals(top_level)?;
        self.lower_body_statements(&main_fn.body)?;
        self.finish_function(&main_fn.proto.ret)
    }

    /// A `fn` declaration reached directly through [`crate::stmt::lower_stmt`]
    /// rather than through [`Generator::lower_body_statements`]'s hoisting
    /// pre-pass — a nested function declared inside an `if`/`loop` body
    /// (those are lowered through [`crate::stmt::lower_block`], which has no
    /// hoisting pass of its own). Lowering a function repositions the
    /// builder into its own entry block, so the enclosing block's insertion
    /// point is saved and restored around the call.
    pub(crate) fn lower_nested_function(&mut self, function: &Function) -> Result<()> {
        let resume_bb = self.builder.get_insert_block();
        self.lower_function_with_params(
            function.proto.name,
            &function.proto.params,
            &function.proto.ret,
            &function.body,
        )?;
        if let Some(bb) = resume_bb {
            self.builder.position_at_end(bb);
        }
        Ok(())
    }

    /// Hoists and lowers nested `fn` declarations first, then lowers the
    /// remaining statements in source order (base spec §4.4).
    fn lower_body_statements(&mut self, body: &[Node]) -> Result<()> {
        let resume_bb = self.builder.get_insert_block();
        for stmt in body {
            if let Node::Function(nested) = stmt {
                self.lower_function_with_params(nested.proto.name, &nested.proto.params, &nested.proto.ret, &nested.body)?;
            }
        }
        if let Some(bb) = resume_bb {
            self.builder.position_at_end(bb);
        }

        for stmt in body {
            if matches!(stmt, Node::Function(_)) {
                continue;
            }
            self.lower_stmt(stmt)?;
        }
        Ok(())
    }

    /// Drains the "global vars" list (deferred `let` stores) then the
    /// "global expressions" list (deferred bare top-level statements), in
    /// that order, exactly as base spec §4.3 "Global-initialisation order"
    /// specifies. Each list is taken rather than borrowed so nothing here
    /// re-enters if a deferred expression itself somehow referenced `main`.
    fn emit_deferred_globals(&mut self, top_level: &[Node]) -> Result<()> {
        let var_decls = std::mem::take(&mut self.deferred.var_decls);
        for idx in &var_decls {
            if let Node::VarDeclOrAssign(decl) = &top_level[*idx] {
                let slot = self.scopes.lookup(decl.name)?;
                if let Some(init) = &decl.init {
                    let ty = slot.ty.clone();
                    self.store_init(decl.name, &ty, slot.ptr, init)?;
                }
            }
        }
        self.deferred.var_decls = var_decls;

        let bare_exprs = std::mem::take(&mut self.deferred.bare_exprs);
        for idx in &bare_exprs {
            self.lower_stmt(&top_level[*idx])?;
        }
        self.deferred.bare_exprs = bare_exprs;
        Ok(())
    }
}
