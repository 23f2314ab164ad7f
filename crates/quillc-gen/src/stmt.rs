//! Statement-level lowering: `let`/reassignment, `return`, and the generic
//! statement dispatcher used for both function bodies and `if`/`loop`
//! blocks (base spec §4.3).

use quillc_par::ast::{Node, Return, Type, VarDeclKind, VarDeclOrAssign};

use crate::context::{Generator, VarSlot};
use crate::error::Result;

impl<'ctx> Generator<'ctx> {
    pub fn lower_block(&mut self, stmts: &[Node]) -> Result<()> {
        for stmt in stmts {
            self.lower_stmt(stmt)?;
        }
        Ok(())
    }

    /// Dispatches a statement-position node. Anything not recognised here
    /// as a statement form is lowered as a bare expression and discarded —
    /// the base spec's "global expressions" and any call used purely for
    /// its side effect (`printnum(x)`) take this path.
    pub fn lower_stmt(&mut self, node: &Node) -> Result<()> {
        match node {
            Node::VarDeclOrAssign(decl) => self.lower_var_decl_or_assign(decl),
            Node::Return(ret) => self.lower_return(ret),
            Node::If(if_node) => self.lower_if(if_node),
            Node::Loop(loop_node) => self.lower_loop(loop_node),
            Node::Function(func) => self.lower_nested_function(func),
            other => {
                self.lower_expr(other)?;
                Ok(())
            }
        }
    }

    pub fn lower_var_decl_or_assign(&mut self, decl: &VarDeclOrAssign) -> Result<()> {
        match &decl.kind {
            VarDeclKind::Declared(ty) => {
                if ty.array_depth() > 0 {
                    self.arrays.declare(decl.name, ty.array_depth());
                }
                let llvm_ty = self.types.basic_type(ty, &self.registry)?;
                let ptr = self.builder.build_alloca(llvm_ty, decl.name.as_str())?;
                self.scopes.declare(decl.name, VarSlot { ptr, ty: ty.clone() });
                if let Some(init) = &decl.init {
                    self.store_init(decl.name, ty, ptr, init)?;
                }
                Ok(())
            }
            VarDeclKind::Reassignment => {
                let slot = self.scopes.lookup(decl.name)?;
                if let Some(init) = &decl.init {
                    let ty = slot.ty.clone();
                    self.store_init(decl.name, &ty, slot.ptr, init)?;
                }
                Ok(())
            }
        }
    }

    /// Stores `init`'s value into `ptr`. An array-typed binding assigned a
    /// literal goes through [`Generator::lower_array_literal`] so the
    /// registry records its length; everything else is a plain
    /// `lower_expr` + store.
    pub(crate) fn store_init(
        &mut self,
        name: quillc_util::Symbol,
        ty: &Type,
        ptr: inkwell::values::PointerValue<'ctx>,
        init: &Node,
    ) -> Result<()> {
        let value = match (ty, init) {
            (Type::Array(_), Node::ArrayLit(lit)) => self.lower_array_literal(lit, ty, name, 0)?,
            _ => self.lower_expr(init)?,
        };
        self.builder.build_store(ptr, value.value)?;
        Ok(())
    }

    /// Creates module-level storage for a top-level `let`, zero-initialised
    /// (the real value is stored later, when `main`'s entry drains the
    /// deferred-globals lists — base spec "Global-initialisation order").
    /// Reassignment-kind top-level statements go through the bare-expression
    /// deferred list instead and never reach here.
    pub fn declare_global_var(&mut self, decl: &VarDeclOrAssign) -> Result<()> {
        let ty = match &decl.kind {
            VarDeclKind::Declared(ty) => ty.clone(),
            VarDeclKind::Reassignment => return Ok(()),
        };
        if ty.array_depth() > 0 {
            self.arrays.declare(decl.name, ty.array_depth());
        }
        let llvm_ty = self.types.basic_type(&ty, &self.registry)?;
        let global = self.module.add_global(llvm_ty, None, decl.name.as_str());
        let zero = self.zero_value_for(&ty)?;
        global.set_initializer(&zero);
        self.scopes.declare_global(decl.name, VarSlot { ptr: global.as_pointer_value(), ty });
        Ok(())
    }

    fn lower_return(&mut self, ret: &Return) -> Result<()> {
        match &ret.value {
            Some(value) => {
                let lowered = self.lower_expr(value)?;
                self.builder.build_return(Some(&lowered.value))?;
            }
            None => {
                self.builder.build_return(None)?;
            }
        }
        Ok(())
    }
}
