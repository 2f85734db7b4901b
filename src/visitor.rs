//! Generic AST traversal
//!
//! [`Visitor`] exposes a pair of hooks per node kind: a `visit_*` hook called
//! before the node's children and a `leave_*` hook called after them. Enter
//! hooks on interior nodes return `bool`; returning `false` skips the
//! subtree *and* its leave hook. Passes that want post-order behaviour work
//! entirely in the leave hooks.
//!
//! [`traverse`] owns the walk order: program statements in order, a policy's
//! body, an action block's filters, then each filter's boolean conditions
//! down through the expression trees (left child first).

use crate::parser::ast::{
    ActionBlock, BoolExpr, DefaultAction, IntExpr, Policy, PolicyStatement, ProgramStatement,
    SyscallFilter, UseStatement,
};

#[allow(unused_variables)]
pub trait Visitor {
    fn visit_policy(&mut self, policy: &Policy) -> bool {
        true
    }
    fn leave_policy(&mut self, policy: &Policy) {}

    fn visit_use(&mut self, stmt: &UseStatement) {}

    fn visit_default_action(&mut self, stmt: &DefaultAction) {}

    fn visit_action_block(&mut self, block: &ActionBlock) -> bool {
        true
    }
    fn leave_action_block(&mut self, block: &ActionBlock) {}

    fn visit_filter(&mut self, filter: &SyscallFilter) -> bool {
        true
    }
    fn leave_filter(&mut self, filter: &SyscallFilter) {}

    fn visit_bool_expr(&mut self, expr: &BoolExpr) -> bool {
        true
    }
    fn leave_bool_expr(&mut self, expr: &BoolExpr) {}

    fn visit_int_expr(&mut self, expr: &IntExpr) -> bool {
        true
    }
    fn leave_int_expr(&mut self, expr: &IntExpr) {}
}

/// Walks a whole program.
pub fn traverse<V: Visitor + ?Sized>(visitor: &mut V, program: &[ProgramStatement]) {
    for stmt in program {
        match stmt {
            ProgramStatement::Policy(policy) => traverse_policy(visitor, policy),
            ProgramStatement::Default(stmt) => visitor.visit_default_action(stmt),
            ProgramStatement::Use(stmt) => visitor.visit_use(stmt),
            ProgramStatement::Block(block) => traverse_block(visitor, block),
        }
    }
}

fn traverse_policy<V: Visitor + ?Sized>(visitor: &mut V, policy: &Policy) {
    if !visitor.visit_policy(policy) {
        return;
    }
    for stmt in &policy.body {
        match stmt {
            PolicyStatement::Use(stmt) => visitor.visit_use(stmt),
            PolicyStatement::Block(block) => traverse_block(visitor, block),
        }
    }
    visitor.leave_policy(policy);
}

fn traverse_block<V: Visitor + ?Sized>(visitor: &mut V, block: &ActionBlock) {
    if !visitor.visit_action_block(block) {
        return;
    }
    for filter in &block.filters {
        traverse_filter(visitor, filter);
    }
    visitor.leave_action_block(block);
}

fn traverse_filter<V: Visitor + ?Sized>(visitor: &mut V, filter: &SyscallFilter) {
    if !visitor.visit_filter(filter) {
        return;
    }
    for expr in &filter.body {
        traverse_bool_expr(visitor, expr);
    }
    visitor.leave_filter(filter);
}

fn traverse_bool_expr<V: Visitor + ?Sized>(visitor: &mut V, expr: &BoolExpr) {
    if !visitor.visit_bool_expr(expr) {
        return;
    }
    match expr {
        BoolExpr::Compare { left, right, .. } => {
            traverse_int_expr(visitor, left);
            traverse_int_expr(visitor, right);
        }
        BoolExpr::Neg { inner, .. } => traverse_bool_expr(visitor, inner),
        BoolExpr::Logical { left, right, .. } => {
            traverse_bool_expr(visitor, left);
            traverse_bool_expr(visitor, right);
        }
    }
    visitor.leave_bool_expr(expr);
}

fn traverse_int_expr<V: Visitor + ?Sized>(visitor: &mut V, expr: &IntExpr) {
    if !visitor.visit_int_expr(expr) {
        return;
    }
    if let IntExpr::Binary { left, right, .. } = expr {
        traverse_int_expr(visitor, left);
        traverse_int_expr(visitor, right);
    }
    visitor.leave_int_expr(expr);
}
