//! Per-syscall rule passes
//!
//! Each rule is a second traversal specialised by syscall name. Rules reuse
//! the generic [`Visitor`](crate::visitor::Visitor) skeleton, re-enter the
//! scopes recorded by the global pass through the node→scope index, attach
//! their vocabulary with `declare_inherit_symbol`, and inspect
//! identifier-vs-parameter operands. New rules plug in by following the
//! shape of [`open`] and getting called from [`check`].

pub mod open;

use crate::checker::context::Context;
use crate::diagnostics::Diagnostics;
use crate::parser::ast::ProgramStatement;

/// Runs every registered per-syscall rule. Must run after
/// [`crate::checker::check`], which records the filter scopes these passes
/// re-enter.
pub fn check(context: &mut Context, diagnostics: &mut Diagnostics, program: &[ProgramStatement]) {
    open::check(context, diagnostics, program);
}
