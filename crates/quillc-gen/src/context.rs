//! The explicit lowering context threaded through `quillc-gen`.
//!
//! The base spec's original implementation kept the current basic block,
//! the named-value environment, the object-layout registry, the array-size
//! registry, and the global-deferred lists as process-wide mutable state
//! (see base spec §5 and SPEC_FULL.md §5's REDESIGN FLAG). Here all of that
//! lives on one `Generator`, owned by the single call to [`crate::generate`]
//! — nothing is a singleton or `static`.

use inkwell::builder::Builder;
use inkwell::context::Context;
use inkwell::module::Module;
use inkwell::values::PointerValue;

use quillc_par::ast::Type;
use quillc_util::{FxHashMap, Symbol};

use crate::array::ArraySizeRegistry;
use crate::error::{CodeGenError, Result};
use crate::object::AggregateRegistry;
use crate::types::TypeMapper;

/// A named value's storage slot: the `alloca`/global pointer backing it,
/// plus its declared Quill type (needed at every subsequent use site, since
/// LLVM's opaque pointers erase the distinction between a `string`, an
/// aggregate instance, and an array buffer at the IR level).
#[derive(Clone)]
pub struct VarSlot<'ctx> {
    pub ptr: PointerValue<'ctx>,
    pub ty: Type,
}

/// The named-value environment. Globals are visible from every function;
/// entering a function clears the locals and lets lookups fall back to
/// globals, which realizes the base spec's "on entering a function, the
/// local table is cleared and reseeded with the globals" without literally
/// copying every global entry into the local map on every call.
#[derive(Default)]
pub struct SymbolTable<'ctx> {
    pub globals: FxHashMap<Symbol, VarSlot<'ctx>>,
    pub locals: FxHashMap<Symbol, VarSlot<'ctx>>,
    in_function: bool,
}

impl<'ctx> SymbolTable<'ctx> {
    pub fn enter_function(&mut self) {
        self.locals.clear();
        self.in_function = true;
    }

    pub fn exit_function(&mut self) {
        self.locals.clear();
        self.in_function = false;
    }

    /// Declares `name` in whichever table is currently active: locals while
    /// lowering a function body, globals at the top level.
    pub fn declare(&mut self, name: Symbol, slot: VarSlot<'ctx>) {
        if self.in_function {
            self.locals.insert(name, slot);
        } else {
            self.globals.insert(name, slot);
        }
    }

    pub fn declare_global(&mut self, name: Symbol, slot: VarSlot<'ctx>) {
        self.globals.insert(name, slot);
    }

    /// Parameters shadow globals by living only in `locals`, which is
    /// always consulted first.
    pub fn lookup(&self, name: Symbol) -> Result<VarSlot<'ctx>> {
        self.locals
            .get(&name)
            .or_else(|| self.globals.get(&name))
            .cloned()
            .ok_or(CodeGenError::UndefinedName(name))
    }
}

/// A function's declared signature, recorded so call sites (including
/// forward references and method-chain continuations) know a callee's
/// parameter/return types without re-parsing its `Proto`.
#[derive(Clone)]
pub struct FunctionSig {
    pub params: Vec<Type>,
    pub ret: Type,
}

/// Indices into the top-level AST slice that must run, in order, at the
/// start of `main` — the base spec's "global expressions" / "global vars"
/// deferred lists. Stored as indices rather than cloned nodes so the
/// generator never needs to own a second copy of the tree (REDESIGN FLAG 1:
/// AST ownership stays with the caller's `Ast`).
#[derive(Default)]
pub struct DeferredGlobals {
    pub var_decls: Vec<usize>,
    pub bare_exprs: Vec<usize>,
}

/// Everything one call to [`crate::generate`] threads through the AST walk.
pub struct Generator<'ctx> {
    pub context: &'ctx Context,
    pub module: Module<'ctx>,
    pub builder: Builder<'ctx>,
    pub types: TypeMapper<'ctx>,
    pub registry: AggregateRegistry<'ctx>,
    pub scopes: SymbolTable<'ctx>,
    pub arrays: ArraySizeRegistry,
    pub deferred: DeferredGlobals,
    pub signatures: FxHashMap<Symbol, FunctionSig>,
    /// The aggregate type a bare `this`-less method body's implicit
    /// receiver parameter resolves to while its body is being lowered
    /// (`None` outside a method).
    pub current_receiver_ty: Option<Symbol>,
}

impl<'ctx> Generator<'ctx> {
    pub fn new(context: &'ctx Context, module_name: &str, target_triple: &str) -> Self {
        let module = context.create_module(module_name);
        let triple = inkwell::targets::TargetTriple::create(target_triple);
        module.set_triple(&triple);

        Self {
            context,
            module,
            builder: context.create_builder(),
            types: TypeMapper::new(context),
            registry: AggregateRegistry::default(),
            scopes: SymbolTable::default(),
            arrays: ArraySizeRegistry::default(),
            deferred: DeferredGlobals::default(),
            signatures: FxHashMap::default(),
            current_receiver_ty: None,
        }
    }
}
