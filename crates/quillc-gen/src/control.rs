//! `if`/`else if`/`else` and `loop` lowering (base spec §4.3 "Conditional
//! lowering", "Loop lowering").

use inkwell::basic_block::BasicBlock;
use inkwell::FloatPredicate;

use quillc_par::ast::{If, Loop};

use crate::context::Generator;
use crate::error::Result;
use crate::value::Lowered;

impl<'ctx> Generator<'ctx> {
    /// A Quill condition is a `number`; non-zero is true. Every comparison
    /// operator already produces a widened 0.0/1.0 `number`
    /// (`crate::expr::lower_binary`), so this cast is the single place that
    /// turns that convention into an `i1` for a branch.
    fn cond_to_bool(&mut self, cond: Lowered<'ctx>) -> Result<inkwell::values::IntValue<'ctx>> {
        let zero = self.types.f64_type().const_zero();
        Ok(self.builder.build_float_compare(
            FloatPredicate::ONE,
            cond.value.into_float_value(),
            zero,
            "tobool",
        )?)
    }

    fn current_block_terminated(&self) -> bool {
        self.builder
            .get_insert_block()
            .and_then(|bb| bb.get_terminator())
            .is_some()
    }

    /// `If`: the body, each `else if`, and the `else` each get their own
    /// block and end with an unconditional branch to a shared `merge`
    /// block; the `else if` chain is threaded as a sequence of
    /// condition-check blocks, each falling through to the next on a false
    /// test. A single scratch `i128` alloca is emitted at the original
    /// insertion point — the base spec calls out this placeholder
    /// explicitly and asks that it be preserved for compatibility, though
    /// nothing downstream of this lowering pass reads it.
    pub fn lower_if(&mut self, if_node: &If) -> Result<()> {
        let function = self
            .builder
            .get_insert_block()
            .and_then(|bb| bb.get_parent())
            .expect("lower_if called outside a function body");

        self.builder.build_alloca(self.context.i128_type(), "if.scratch")?;

        let body_bb = self.context.append_basic_block(function, "if.then");
        let merge_bb = self.context.append_basic_block(function, "if.merge");

        let check_bbs: Vec<BasicBlock<'ctx>> = if_node
            .else_ifs
            .iter()
            .map(|_| self.context.append_basic_block(function, "if.elseif.check"))
            .collect();
        let else_bb = if if_node.else_block.is_some() {
            Some(self.context.append_basic_block(function, "if.else"))
        } else {
            None
        };

        let cond = self.lower_expr(&if_node.cond)?;
        let cond_bool = self.cond_to_bool(cond)?;
        let false_dest = check_bbs.first().copied().or(else_bb).unwrap_or(merge_bb);
        self.builder.build_conditional_branch(cond_bool, body_bb, false_dest)?;

        self.builder.position_at_end(body_bb);
        self.lower_block(&if_node.then_block)?;
        if !self.current_block_terminated() {
            self.builder.build_unconditional_branch(merge_bb)?;
        }

        for (i, else_if) in if_node.else_ifs.iter().enumerate() {
            self.builder.position_at_end(check_bbs[i]);
            let cond = self.lower_expr(&else_if.cond)?;
            let cond_bool = self.cond_to_bool(cond)?;
            let ei_body_bb = self.context.append_basic_block(function, "if.elseif.then");
            let next_false_dest = check_bbs.get(i + 1).copied().or(else_bb).unwrap_or(merge_bb);
            self.builder
                .build_conditional_branch(cond_bool, ei_body_bb, next_false_dest)?;

            self.builder.position_at_end(ei_body_bb);
            self.lower_block(&else_if.body)?;
            if !self.current_block_terminated() {
                self.builder.build_unconditional_branch(merge_bb)?;
            }
        }

        if let Some(else_body) = &if_node.else_block {
            self.builder.position_at_end(else_bb.unwrap());
            self.lower_block(else_body)?;
            if !self.current_block_terminated() {
                self.builder.build_unconditional_branch(merge_bb)?;
            }
        }

        self.builder.position_at_end(merge_bb);
        self.lower_block(&if_node.continuation)
    }

    /// `Loop`: post-test (do-while) regardless of the source spelling — the
    /// condition is evaluated at the end of the body, not before it. This
    /// is base spec §9 open question (b)'s sibling quirk and is preserved
    /// deliberately, not corrected (see DESIGN.md).
    pub fn lower_loop(&mut self, loop_node: &Loop) -> Result<()> {
        let function = self
            .builder
            .get_insert_block()
            .and_then(|bb| bb.get_parent())
            .expect("lower_loop called outside a function body");

        let loop_bb = self.context.append_basic_block(function, "loop.body");
        let after_bb = self.context.append_basic_block(function, "loop.after");

        self.builder.build_unconditional_branch(loop_bb)?;
        self.builder.position_at_end(loop_bb);
        self.lower_block(&loop_node.body)?;

        if !self.current_block_terminated() {
            let cond = self.lower_expr(&loop_node.cond)?;
            let cond_bool = self.cond_to_bool(cond)?;
            self.builder.build_conditional_branch(cond_bool, loop_bb, after_bb)?;
        }

        self.builder.position_at_end(after_bb);
        self.lower_block(&loop_node.continuation)
    }
}
