//! The generic expression dispatcher and its two leaf-heavy cases: literals
//! and binary operators (base spec §4.3 "Expression lowering",
//! `BinaryExpAST::irgen`'s per-operator table, recovered from `asts.h` and
//! reproduced in SPEC_FULL.md §4.3).

use inkwell::values::BasicValueEnum;
use inkwell::FloatPredicate;

use quillc_par::ast::{Binary, Node, Type, VarRef};
use quillc_util::Symbol;

use crate::context::Generator;
use crate::error::{CodeGenError, Result};
use crate::value::Lowered;

impl<'ctx> Generator<'ctx> {
    /// Dispatches on the node kind; every lowering helper elsewhere in the
    /// crate funnels leaf sub-expressions back through here rather than
    /// matching `Node` a second time.
    pub fn lower_expr(&mut self, node: &Node) -> Result<Lowered<'ctx>> {
        match node {
            Node::NumberLit(lit) => Ok(Lowered::new(
                self.types.f64_type().const_float(lit.value),
                Type::Number,
            )),
            Node::StringLit(lit) => self.lower_string_lit(&lit.value),
            Node::VarRef(var_ref) => self.lower_var_ref(var_ref),
            Node::Binary(binary) => self.lower_binary(binary),
            Node::Call(call) => self.lower_call_with_receiver(call.callee, &call.args, None),
            Node::New(new_expr) => self.lower_new_expr(new_expr),
            Node::ObjectAccess(access) => self.lower_object_access(access),
            Node::ArrayAccess(access) => self.lower_array_access(access),
            Node::ArrayLit(_) => Err(CodeGenError::Internal(
                "array literal lowered outside a declared array binding".into(),
            )),
            other => Err(CodeGenError::Internal(format!(
                "node kind not valid in expression position: {other:?}"
            ))),
        }
    }

    /// String literals become a `printstr`-global: a file-scoped `[N x i8]`
    /// constant plus a pointer to its first byte, the standard `inkwell`
    /// idiom for a C string constant (`build_global_string_ptr`).
    fn lower_string_lit(&mut self, text: &str) -> Result<Lowered<'ctx>> {
        let global = self.builder.build_global_string_ptr(text, "str")?;
        Ok(Lowered::new(global.as_pointer_value(), Type::String))
    }

    /// A bare identifier. If it isn't a local or global, and we're
    /// currently lowering a method body, it's treated as an implicit
    /// `this.<name>` field access — `object Point { x:number fn sum():
    /// number { return x } }` binds `x` to the receiver's field with no
    /// explicit qualifier (SPEC_FULL.md §4.3 SUPPLEMENT, grounded in
    /// quillc-par's own method-body test fixtures).
    fn lower_var_ref(&mut self, var_ref: &VarRef) -> Result<Lowered<'ctx>> {
        match self.scopes.lookup(var_ref.name) {
            Ok(slot) => {
                let llvm_ty = self.types.basic_type(&slot.ty, &self.registry)?;
                let loaded = self.builder.build_load(llvm_ty, slot.ptr, "load")?;
                Ok(Lowered::new(loaded, slot.ty))
            }
            Err(err) => {
                if let Some(receiver_ty) = self.current_receiver_ty {
                    if self
                        .registry
                        .layouts
                        .get(&receiver_ty)
                        .and_then(|layout| layout.field(var_ref.name))
                        .is_some()
                    {
                        return self.lower_implicit_field_ref(receiver_ty, var_ref.name);
                    }
                }
                Err(err)
            }
        }
    }

    fn lower_implicit_field_ref(&mut self, receiver_ty: Symbol, field: Symbol) -> Result<Lowered<'ctx>> {
        let this_slot = self.scopes.lookup(Symbol::intern("this"))?;
        let layout = self
            .registry
            .layouts
            .get(&receiver_ty)
            .cloned()
            .ok_or(CodeGenError::NotAnObject(receiver_ty))?;
        let (index, field_ty) = layout
            .field(field)
            .ok_or(CodeGenError::UnknownField { object: receiver_ty, field })?;
        let field_ty = field_ty.clone();
        let gep = self
            .builder
            .build_struct_gep(layout.struct_ty, this_slot.ptr, index as u32, "this.field.gep")?;
        let llvm_ty = self.types.basic_type(&field_ty, &self.registry)?;
        let loaded = self.builder.build_load(llvm_ty, gep, "this.field.load")?;
        Ok(Lowered::new(loaded, field_ty))
    }

    fn lower_binary(&mut self, binary: &Binary) -> Result<Lowered<'ctx>> {
        let lhs = self.lower_expr(&binary.lhs)?;
        let rhs = self.lower_expr(&binary.rhs)?;

        match binary.op.as_str() {
            "+" if lhs.ty == Type::String || rhs.ty == Type::String => {
                self.call_runtime_binop("addstr", lhs.value, rhs.value, Type::String)
            }
            "*" if lhs.ty == Type::String => {
                self.call_runtime_binop("mulstr", lhs.value, rhs.value, Type::String)
            }
            "%" => self.call_runtime_binop("modnum", lhs.value, rhs.value, Type::Number),
            "==" if lhs.ty == Type::String && rhs.ty == Type::String => {
                self.call_runtime_binop("cmpstr", lhs.value, rhs.value, Type::Number)
            }
            "+" => self.float_arith(lhs, rhs, |b, l, r| b.build_float_add(l, r, "add")),
            "-" => self.float_arith(lhs, rhs, |b, l, r| b.build_float_sub(l, r, "sub")),
            "*" => self.float_arith(lhs, rhs, |b, l, r| b.build_float_mul(l, r, "mul")),
            "/" => self.float_arith(lhs, rhs, |b, l, r| b.build_float_div(l, r, "div")),
            "==" => self.float_compare(lhs, rhs, FloatPredicate::OEQ),
            "<" => self.float_compare(lhs, rhs, FloatPredicate::OLT),
            ">" => self.float_compare(lhs, rhs, FloatPredicate::OGT),
            "and" => self.bitwise_logical(lhs, rhs, |b, l, r| b.build_and(l, r, "and")),
            "or" => self.bitwise_logical(lhs, rhs, |b, l, r| b.build_or(l, r, "or")),
            other => Err(CodeGenError::Internal(format!("unknown binary operator '{other}'"))),
        }
    }

    fn call_runtime_binop(
        &mut self,
        name: &str,
        lhs: BasicValueEnum<'ctx>,
        rhs: BasicValueEnum<'ctx>,
        result_ty: Type,
    ) -> Result<Lowered<'ctx>> {
        let callee = self.runtime_fn(name)?;
        let call = self
            .builder
            .build_call(callee, &[lhs.into(), rhs.into()], &format!("{name}.call"))?;
        let value = call
            .try_as_basic_value()
            .left()
            .ok_or_else(|| CodeGenError::Internal(format!("{name} returned no value")))?;
        Ok(Lowered::new(value, result_ty))
    }

    fn float_arith(
        &mut self,
        lhs: Lowered<'ctx>,
        rhs: Lowered<'ctx>,
        op: impl FnOnce(
            &inkwell::builder::Builder<'ctx>,
            inkwell::values::FloatValue<'ctx>,
            inkwell::values::FloatValue<'ctx>,
        ) -> std::result::Result<inkwell::values::FloatValue<'ctx>, inkwell::builder::BuilderError>,
    ) -> Result<Lowered<'ctx>> {
        let result = op(&self.builder, lhs.value.into_float_value(), rhs.value.into_float_value())?;
        Ok(Lowered::new(result, Type::Number))
    }

    fn float_compare(
        &mut self,
        lhs: Lowered<'ctx>,
        rhs: Lowered<'ctx>,
        predicate: FloatPredicate,
    ) -> Result<Lowered<'ctx>> {
        let cmp = self.builder.build_float_compare(
            predicate,
            lhs.value.into_float_value(),
            rhs.value.into_float_value(),
            "cmp",
        )?;
        let widened = self
            .builder
            .build_unsigned_int_to_float(cmp, self.types.f64_type(), "cmp.widen")?;
        Ok(Lowered::new(widened, Type::Number))
    }

    /// `and`/`or` are bitwise, not short-circuiting — both operands are
    /// always evaluated and cast through an unsigned integer (base spec's
    /// always-true `iscomp` dead branch, §9 item (b)).
    fn bitwise_logical(
        &mut self,
        lhs: Lowered<'ctx>,
        rhs: Lowered<'ctx>,
        op: impl FnOnce(
            &inkwell::builder::Builder<'ctx>,
            inkwell::values::IntValue<'ctx>,
            inkwell::values::IntValue<'ctx>,
        ) -> std::result::Result<inkwell::values::IntValue<'ctx>, inkwell::builder::BuilderError>,
    ) -> Result<Lowered<'ctx>> {
        let i64_ty = self.context.i64_type();
        let l = self
            .builder
            .build_float_to_unsigned_int(lhs.value.into_float_value(), i64_ty, "logical.lhs")?;
        let r = self
            .builder
            .build_float_to_unsigned_int(rhs.value.into_float_value(), i64_ty, "logical.rhs")?;
        let result = op(&self.builder, l, r)?;
        let widened = self
            .builder
            .build_unsigned_int_to_float(result, self.types.f64_type(), "logical.widen")?;
        Ok(Lowered::new(widened, Type::Number))
    }

    /// Shared by plain calls (`receiver` is `None`) and method dispatch
    /// (`receiver` is the trailing hidden argument appended after the
    /// source-level arguments, base spec "Method dispatch").
    pub fn lower_call_with_receiver(
        &mut self,
        callee: Symbol,
        args: &[Node],
        receiver: Option<inkwell::values::PointerValue<'ctx>>,
    ) -> Result<Lowered<'ctx>> {
        let sig = self
            .signatures
            .get(&callee)
            .cloned()
            .ok_or(CodeGenError::UnknownFunction(callee))?;

        let expected = sig.params.len() - receiver.is_some() as usize;
        if args.len() != expected {
            return Err(CodeGenError::ArityMismatch {
                callee,
                expected,
                found: args.len(),
            });
        }

        let mut llvm_args = Vec::with_capacity(args.len() + 1);
        for arg in args {
            llvm_args.push(self.lower_expr(arg)?.value.into());
        }
        if let Some(receiver_ptr) = receiver {
            llvm_args.push(receiver_ptr.into());
        }

        let function = self
            .module
            .get_function(callee.as_str())
            .ok_or(CodeGenError::UnknownFunction(callee))?;
        let call = self.builder.build_call(function, &llvm_args, "call")?;

        match call.try_as_basic_value().left() {
            Some(value) => Ok(Lowered::new(value, sig.ret)),
            None => Ok(Lowered::new(self.types.f64_type().const_zero(), Type::Void)),
        }
    }
}
