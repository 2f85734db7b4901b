//! Flag validation for `open` and `openat`
//!
//! The flags argument is the second parameter of `open` and the third of
//! `openat`. This pass injects the known `O_*` names into each matching
//! filter's scope as inherited symbols, then checks every binary integer
//! node and every comparison: when one operand is a bare identifier bound to
//! the flags parameter (by position in the filter's parameter list) and the
//! other operand is also a bare identifier, that identifier must be one of
//! the known flags.

use crate::checker::context::Context;
use crate::checker::scope::Symbol;
use crate::diagnostics::{range_from_name, Diagnostics};
use crate::parser::ast::{BoolExpr, IntExpr, NodeId, ProgramStatement, SyscallFilter};
use crate::visitor::{traverse, Visitor};

/// The accepted flag vocabulary.
pub const OFLAGS: [&str; 20] = [
    "O_ASYNC",
    "O_DIRECT",
    "O_DSYNC",
    "O_LARGEFILE",
    "O_NOATIME",
    "O_NOCTTY",
    "O_PATH",
    "O_SYNC",
    "O_TMPFILE",
    "O_RDONLY",
    "O_WRONLY",
    "O_RDWR",
    "O_NONBLOCK",
    "O_APPEND",
    "O_CREAT",
    "O_TRUNC",
    "O_EXCL",
    "O_DIRECTORY",
    "O_NOFOLLOW",
    "O_CLOEXEC",
];

const SYSCALLS: [&str; 2] = ["open", "openat"];

/// Runs the open/openat flag rule over a checked program.
pub fn check(context: &mut Context, diagnostics: &mut Diagnostics, program: &[ProgramStatement]) {
    let mut rule = SyscallOpen {
        context,
        diagnostics,
        filter_scope: None,
        oflag_index: 1,
    };
    traverse(&mut rule, program);
}

struct SyscallOpen<'a> {
    context: &'a mut Context,
    diagnostics: &'a mut Diagnostics,
    filter_scope: Option<NodeId>,
    oflag_index: usize,
}

impl SyscallOpen<'_> {
    fn check_operands(&mut self, left: &IntExpr, right: &IntExpr) {
        if let IntExpr::Identifier { name, .. } = left {
            self.check_flag_operand(name, right);
        }
        if let IntExpr::Identifier { name, .. } = right {
            self.check_flag_operand(name, left);
        }
    }

    /// If `ident` is the flags parameter, the opposing operand — when it is
    /// a bare identifier — must be a known flag.
    fn check_flag_operand(&mut self, ident: &str, other: &IntExpr) {
        let Some(node) = self.filter_scope else {
            return;
        };
        let scope = self.context.get_scope_by_node(node);
        if scope.num_symbols() <= 1 {
            return;
        }
        match scope.symbol_position(ident) {
            Some(position) if position == self.oflag_index => {}
            _ => return,
        }
        if let IntExpr::Identifier { name, pos } = other {
            if !scope.has_symbol(name) {
                let range = range_from_name(*pos, name);
                self.diagnostics
                    .error(format!("Invalid oflag {}", name), range);
            }
        }
    }
}

impl Visitor for SyscallOpen<'_> {
    fn visit_filter(&mut self, filter: &SyscallFilter) -> bool {
        if !SYSCALLS.contains(&filter.syscall.as_str()) || filter.params.len() < 2 {
            return false;
        }
        // openat's oflag is the third parameter.
        self.oflag_index = if filter.syscall == "openat" { 2 } else { 1 };

        let scope = self.context.get_scope_by_node(filter.node_id);
        for flag in OFLAGS {
            scope.declare_inherit_symbol(Symbol::new(flag));
        }
        self.filter_scope = Some(filter.node_id);
        true
    }

    fn leave_filter(&mut self, _filter: &SyscallFilter) {
        self.filter_scope = None;
    }

    fn visit_int_expr(&mut self, expr: &IntExpr) -> bool {
        if let IntExpr::Binary { left, right, .. } = expr {
            self.check_operands(left, right);
        }
        true
    }

    fn visit_bool_expr(&mut self, expr: &BoolExpr) -> bool {
        if let BoolExpr::Compare { left, right, .. } = expr {
            self.check_operands(left, right);
        }
        true
    }
}
