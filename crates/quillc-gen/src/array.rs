//! Array allocation, literal lowering, and indexed access (base spec §4.3
//! "Array lowering").
//!
//! Every array level is one heap-allocated buffer reached through a
//! pointer; `number[][]` is a pointer to a buffer of pointers, each in turn
//! pointing to a buffer of `f64`. Growth always reallocates a fresh buffer
//! and copies element-wise rather than extending in place, and the
//! previous buffer is never freed — base spec §9 open question (c),
//! preserved here exactly as the base spec asks (the language has no
//! garbage collector and this core doesn't add one).

use inkwell::values::PointerValue;
use inkwell::AddressSpace;

use quillc_par::ast::{ArrayAccess, ArrayLit, Node, Type};
use quillc_util::{FxHashMap, Symbol};

use crate::context::Generator;
use crate::error::{CodeGenError, Result};
use crate::value::Lowered;

/// Records each array variable's current length at each nesting level —
/// compile-time bookkeeping the generator consults when lowering a literal
/// assignment, never an LLVM value itself. Testable property 5: declaring
/// `let a: number[][]` populates levels `0` and `1`, both starting at zero.
#[derive(Default)]
pub struct ArraySizeRegistry {
    sizes: FxHashMap<(Symbol, usize), u64>,
}

impl ArraySizeRegistry {
    pub fn declare(&mut self, name: Symbol, depth: usize) {
        for level in 0..depth {
            self.sizes.entry((name, level)).or_insert(0);
        }
    }

    pub fn set(&mut self, name: Symbol, level: usize, len: u64) {
        self.sizes.insert((name, level), len);
    }

    pub fn get(&self, name: Symbol, level: usize) -> u64 {
        self.sizes.get(&(name, level)).copied().unwrap_or(0)
    }

    /// Number of levels currently tracked for `name` — used only by tests
    /// to check property 5 directly.
    pub fn level_count(&self, name: Symbol) -> usize {
        self.sizes.keys().filter(|(n, _)| *n == name).count()
    }
}

/// Threaded through the recursive descent into a nested `ArrayAccess`
/// chain so each level knows how deep it is into the chain without
/// recomputing it — the array-access analogue of `ObjectAccessWalker`
/// (SPEC_FULL.md §9 REDESIGN FLAG 2).
struct ArrayAccessWalker {
    level: usize,
}

impl<'ctx> Generator<'ctx> {
    /// Allocates a fresh heap buffer for `lit` and stores each element,
    /// recursing one level for every nested array literal. `var_name` is
    /// purely bookkeeping (which registry entry to update); the buffer
    /// itself has no notion of which variable it's bound to.
    pub fn lower_array_literal(
        &mut self,
        lit: &ArrayLit,
        array_ty: &Type,
        var_name: Symbol,
        level: usize,
    ) -> Result<Lowered<'ctx>> {
        let elem_ty = match array_ty {
            Type::Array(inner) => (**inner).clone(),
            other => {
                return Err(CodeGenError::Internal(format!(
                    "array literal used at non-array type {other:?}"
                )))
            }
        };

        let len = lit.elements.len() as u64;
        let llvm_elem_ty = self.types.array_element_type(&elem_ty, &self.registry)?;
        let elem_size: u64 = 8; // every element is f64 or a pointer; both 8 bytes on a 64-bit target.
        let byte_len = self.context.i64_type().const_int(len.max(1) * elem_size, false);

        let malloc_fn = self.runtime_fn("malloc")?;
        let call = self
            .builder
            .build_call(malloc_fn, &[byte_len.into()], "arr.malloc")?;
        let buffer = call
            .try_as_basic_value()
            .left()
            .ok_or_else(|| CodeGenError::Internal("malloc returned no value".into()))?
            .into_pointer_value();

        for (i, element) in lit.elements.iter().enumerate() {
            let elem_value = if let (Type::Array(_), Node::ArrayLit(inner_lit)) = (&elem_ty, element) {
                self.lower_array_literal(inner_lit, &elem_ty, var_name, level + 1)?
            } else {
                self.lower_expr(element)?
            };
            let index = self.context.i64_type().const_int(i as u64, false);
            let gep = unsafe {
                self.builder
                    .build_gep(llvm_elem_ty, buffer, &[index], "arr.lit.elem")?
            };
            self.builder.build_store(gep, elem_value.value)?;
        }

        self.arrays.set(var_name, level, len);
        Ok(Lowered::new(buffer, array_ty.clone()))
    }

    /// `lhs[index]`, optionally a store when `store_value` is set. `lhs`
    /// may itself be a nested `ArrayAccess` for multi-dimensional indexing;
    /// each level is resolved independently via recursion, mirroring the
    /// base spec's "array access mirrors object access" description.
    pub fn lower_array_access(&mut self, access: &ArrayAccess) -> Result<Lowered<'ctx>> {
        let mut walker = ArrayAccessWalker { level: 0 };
        self.lower_array_access_inner(access, &mut walker)
    }

    fn lower_array_access_inner(
        &mut self,
        access: &ArrayAccess,
        walker: &mut ArrayAccessWalker,
    ) -> Result<Lowered<'ctx>> {
        let base = match access.lhs.as_ref() {
            Node::ArrayAccess(nested) => {
                walker.level += 1;
                self.lower_array_access_inner(nested, walker)?
            }
            other => self.lower_expr(other)?,
        };

        let elem_ty = match &base.ty {
            Type::Array(inner) => (**inner).clone(),
            other => {
                return Err(CodeGenError::Internal(format!(
                    "indexed into non-array value of type {other:?}"
                )))
            }
        };

        let index_val = self.lower_expr(&access.index)?;
        let index_i64 = self.builder.build_float_to_signed_int(
            index_val.value.into_float_value(),
            self.context.i64_type(),
            "arr.idx",
        )?;

        let llvm_elem_ty = self.types.array_element_type(&elem_ty, &self.registry)?;
        let buffer: PointerValue<'ctx> = base.value.into_pointer_value();
        let gep = unsafe {
            self.builder
                .build_gep(llvm_elem_ty, buffer, &[index_i64], "arr.elem")?
        };

        if let Some(store_value) = &access.store_value {
            let value = self.lower_expr(store_value)?;
            self.builder.build_store(gep, value.value)?;
            Ok(Lowered::new(value.value, elem_ty))
        } else {
            let loaded = self.builder.build_load(llvm_elem_ty, gep, "arr.load")?;
            Ok(Lowered::new(loaded, elem_ty))
        }
    }

    /// The address-space-generic pointer type used for every array buffer,
    /// exposed for callers (e.g. `new`) that need to null-initialise an
    /// array-typed field without going through a literal.
    pub fn array_ptr_default_address_space() -> AddressSpace {
        AddressSpace::default()
    }
}
