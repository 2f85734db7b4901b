//! Semantic checks
//!
//! [`check`] runs the global semantic pass over a parsed program:
//!
//! - policy uniqueness (a policy is identified by `name ++ version`)
//! - `USE` resolution, with forward references allowed — a declaration
//!   pre-pass enters every top-level policy id into the global scope before
//!   the traversal starts
//! - syscall-filter uniqueness within an action block
//! - parameter scopes: duplicate names, and a warning for each parameter in
//!   the *trailing* run of unused parameters (the scan walks backwards from
//!   the last parameter and stops at the first used one)
//! - reference counting for identifiers inside filter conditions
//! - a warning for division by a literal zero
//!
//! Scopes are pushed for every policy, every action block, and every filter
//! with at least one parameter, and popped on leave; see [`context`].
//!
//! Per-syscall rule passes live in [`syscalls`] and run after this pass,
//! re-entering recorded scopes through the node→scope index.

pub mod context;
pub mod scope;
pub mod syscalls;

use rustc_hash::FxHashSet;

use crate::diagnostics::{range_from_name, Diagnostics};
use crate::parser::ast::{
    ActionBlock, IntExpr, IntOp, Policy, ProgramStatement, SyscallFilter, UseStatement,
};
use crate::visitor::{traverse, Visitor};
use context::Context;
use scope::Symbol;

/// Runs the global semantic pass.
pub fn check(context: &mut Context, diagnostics: &mut Diagnostics, program: &[ProgramStatement]) {
    declare_policies(context, program);
    let mut checker = Checker {
        context,
        diagnostics,
        seen_policies: FxHashSet::default(),
    };
    traverse(&mut checker, program);
}

/// Declaration pre-pass: enters every top-level policy id into the global
/// scope so `USE` can resolve forward references.
fn declare_policies(context: &mut Context, program: &[ProgramStatement]) {
    let global = context.global_scope();
    for stmt in program {
        if let ProgramStatement::Policy(policy) = stmt {
            global.declare_symbol(Symbol::new(policy.id()));
        }
    }
}

struct Checker<'a> {
    context: &'a mut Context,
    diagnostics: &'a mut Diagnostics,
    seen_policies: FxHashSet<String>,
}

impl Visitor for Checker<'_> {
    fn visit_policy(&mut self, policy: &Policy) -> bool {
        let id = policy.id();
        if !self.seen_policies.insert(id.clone()) {
            let range = range_from_name(policy.pos, &policy.name);
            self.diagnostics
                .error(format!("policy {} already declared", id), range);
        }
        self.context.push_scope(policy.node_id);
        true
    }

    fn leave_policy(&mut self, _policy: &Policy) {
        self.context.pop_scope();
    }

    fn visit_use(&mut self, stmt: &UseStatement) {
        if !self.context.has_symbol(&stmt.id()) {
            let range = range_from_name(stmt.pos, &stmt.policy);
            self.diagnostics
                .error(format!("Policy {} doesn't exist", stmt.id()), range);
        }
    }

    fn visit_action_block(&mut self, block: &ActionBlock) -> bool {
        self.context.push_scope(block.node_id);
        true
    }

    fn leave_action_block(&mut self, _block: &ActionBlock) {
        self.context.pop_scope();
    }

    fn visit_filter(&mut self, filter: &SyscallFilter) -> bool {
        let scope = self.context.peek_scope();
        if scope.has_symbol(&filter.syscall) {
            let range = range_from_name(filter.pos, &filter.syscall);
            self.diagnostics.error(
                format!(
                    "Syscall filter `{}` already declared in this scope",
                    filter.syscall
                ),
                range,
            );
        }
        scope.declare_symbol(Symbol::new(filter.syscall.clone()));

        if !filter.params.is_empty() {
            self.context.push_scope(filter.node_id);
            for param in &filter.params {
                let scope = self.context.peek_scope();
                if scope.has_symbol(&param.name) {
                    let range = range_from_name(param.pos, &param.name);
                    self.diagnostics.error(
                        format!("syscall parameter {} already declared", param.name),
                        range,
                    );
                    continue;
                }
                scope.declare_symbol(Symbol::new(param.name.clone()));
            }
        }
        true
    }

    fn leave_filter(&mut self, filter: &SyscallFilter) {
        if filter.params.is_empty() {
            return;
        }
        let scope = self.context.peek_scope();
        let mut unused = Vec::new();
        for param in filter.params.iter().rev() {
            if scope.get_symbol(&param.name).references == 0 {
                unused.push((param.name.clone(), param.pos));
            } else {
                break;
            }
        }
        for (name, pos) in unused {
            let range = range_from_name(pos, &name);
            self.diagnostics
                .warning(format!("Parameter {} unused", name), range);
        }
        self.context.pop_scope();
    }

    fn visit_int_expr(&mut self, expr: &IntExpr) -> bool {
        match expr {
            IntExpr::Identifier { name, .. } => {
                self.context.increase_reference(name);
            }
            IntExpr::Binary {
                op: IntOp::Div,
                right,
                pos,
                ..
            } => {
                if matches!(**right, IntExpr::IntLit { value: 0, .. }) {
                    let range = range_from_name(*pos, "/");
                    self.diagnostics.warning("Division by zero", range);
                }
            }
            _ => {}
        }
        true
    }
}
