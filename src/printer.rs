//! AST printers
//!
//! Two renderings of a parsed program:
//!
//! - [`dump`]: the human-readable indented tree printed by the CLI. Integer
//!   operators use Lisp-like parenthesised forms (`(+ …)`, `(== …)`),
//!   short-circuit operators use `AndExpr{…}`/`OrExpr{…}` blocks, integer
//!   literals print in decimal.
//! - [`source`]: policy source text that reparses to a structurally equal
//!   program; the round-trip tests live on this.

use std::rc::Rc;

use crate::parser::ast::{
    Action, ActionBlock, BoolExpr, DefaultAction, IntExpr, IntOp, LogicOp, Policy,
    PolicyStatement, ProgramStatement, SyscallFilter, UseStatement,
};
use crate::visitor::{traverse, Visitor};

/// Renders the indented AST dump.
pub fn dump(program: &[ProgramStatement]) -> String {
    let mut printer = Printer {
        out: String::new(),
        level: 1,
    };
    printer.writeln("Program {\n");
    traverse(&mut printer, program);
    printer.writeln("}\n");
    printer.out
}

struct Printer {
    out: String,
    level: usize,
}

impl Printer {
    fn writeln(&mut self, text: impl AsRef<str>) {
        for _ in 0..self.level.saturating_sub(1) {
            self.out.push_str("  ");
        }
        self.out.push_str(text.as_ref());
    }

    fn write(&mut self, text: impl AsRef<str>) {
        self.out.push_str(text.as_ref());
    }
}

impl Visitor for Printer {
    fn visit_policy(&mut self, policy: &Policy) -> bool {
        self.level += 1;
        self.writeln(format!("Policy {} {{\n", policy.id()));
        true
    }

    fn leave_policy(&mut self, _policy: &Policy) {
        self.writeln("},\n");
        self.level -= 1;
    }

    fn visit_use(&mut self, stmt: &UseStatement) {
        self.level += 1;
        self.writeln(format!("UseStatement{{{}}}\n", stmt.id()));
        self.level -= 1;
    }

    fn visit_default_action(&mut self, stmt: &DefaultAction) {
        self.level += 1;
        self.writeln(format!("DefaultAction{{{}}}\n", stmt.action.label()));
        self.level -= 1;
    }

    fn visit_action_block(&mut self, block: &ActionBlock) -> bool {
        self.level += 1;
        self.writeln(format!("{} {{\n", block.action.label()));
        true
    }

    fn leave_action_block(&mut self, _block: &ActionBlock) {
        self.writeln("},\n");
        self.level -= 1;
    }

    fn visit_filter(&mut self, filter: &SyscallFilter) -> bool {
        self.level += 1;
        self.writeln(&filter.syscall);
        if !filter.body.is_empty() {
            let params: Vec<&str> = filter.params.iter().map(|p| p.name.as_str()).collect();
            self.write(format!("({}) {{\n", params.join(", ")));
        } else {
            self.write(",\n");
            self.level -= 1;
        }
        true
    }

    fn leave_filter(&mut self, filter: &SyscallFilter) {
        if !filter.body.is_empty() {
            self.writeln("},\n");
            self.level -= 1;
        }
    }

    fn visit_bool_expr(&mut self, expr: &BoolExpr) -> bool {
        self.level += 1;
        match expr {
            BoolExpr::Compare { op, .. } => self.writeln(format!("({}\n", op.token())),
            BoolExpr::Neg { .. } => self.writeln("!(\n"),
            BoolExpr::Logical {
                op: LogicOp::And, ..
            } => self.writeln("AndExpr{\n"),
            BoolExpr::Logical { op: LogicOp::Or, .. } => self.writeln("OrExpr{\n"),
        }
        self.level += 1;
        true
    }

    fn leave_bool_expr(&mut self, expr: &BoolExpr) {
        self.level -= 1;
        match expr {
            BoolExpr::Logical { .. } => self.writeln("},\n"),
            _ => self.writeln("),\n"),
        }
        self.level -= 1;
    }

    fn visit_int_expr(&mut self, expr: &IntExpr) -> bool {
        match expr {
            IntExpr::IntLit { value, .. } => self.writeln(format!("{}\n", value)),
            IntExpr::Identifier { name, .. } => self.writeln(format!("{}\n", name)),
            IntExpr::Binary { op, .. } => {
                self.level += 1;
                self.writeln(format!("({}\n", op.token()));
                self.level += 1;
            }
        }
        true
    }

    fn leave_int_expr(&mut self, expr: &IntExpr) {
        if let IntExpr::Binary { .. } = expr {
            self.level -= 1;
            self.writeln("),\n");
            self.level -= 1;
        }
    }
}

/// Renders a program back to parseable policy source.
pub fn source(program: &[ProgramStatement]) -> String {
    let mut out = String::new();
    for stmt in program {
        match stmt {
            ProgramStatement::Policy(policy) => write_policy(&mut out, policy),
            ProgramStatement::Default(stmt) => {
                out.push_str(&format!("DEFAULT {}\n", action_source(&stmt.action)));
            }
            ProgramStatement::Use(stmt) => {
                out.push_str(&format!("USE {} {}\n", stmt.policy, stmt.version));
            }
            ProgramStatement::Block(block) => write_block(&mut out, block, 0),
        }
    }
    out
}

fn indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str("  ");
    }
}

fn write_policy(out: &mut String, policy: &Policy) {
    out.push_str(&format!("POLICY {} {} {{\n", policy.name, policy.version));
    for stmt in &policy.body {
        match stmt {
            PolicyStatement::Use(stmt) => {
                indent(out, 1);
                out.push_str(&format!("USE {} {}\n", stmt.policy, stmt.version));
            }
            PolicyStatement::Block(block) => write_block(out, block, 1),
        }
    }
    out.push_str("}\n");
}

fn write_block(out: &mut String, block: &ActionBlock, level: usize) {
    indent(out, level);
    out.push_str(&format!("{} {{\n", action_source(&block.action)));
    for filter in &block.filters {
        write_filter(out, filter, level + 1);
    }
    indent(out, level);
    out.push_str("}\n");
}

fn write_filter(out: &mut String, filter: &SyscallFilter, level: usize) {
    indent(out, level);
    out.push_str(&filter.syscall);
    if filter.params.is_empty() && filter.body.is_empty() {
        out.push_str(",\n");
        return;
    }
    let params: Vec<&str> = filter.params.iter().map(|p| p.name.as_str()).collect();
    out.push_str(&format!("({}) {{\n", params.join(", ")));
    for expr in &filter.body {
        indent(out, level + 1);
        out.push_str(&bool_source(expr));
        out.push_str(",\n");
    }
    indent(out, level);
    out.push_str("},\n");
}

fn action_source(action: &Action) -> String {
    match action {
        Action::Allow => "ALLOW".into(),
        Action::Log => "LOG".into(),
        Action::KillProcess => "KILL_PROCESS".into(),
        Action::KillThread => "KILL_THREAD".into(),
        Action::UserNotif => "USER_NOTIF".into(),
        Action::Errno(n) => format!("ERRNO({})", n),
        Action::Trap(n) => format!("TRAP({})", n),
        Action::Trace(n) => format!("TRACE({})", n),
    }
}

// Binding strength of boolean forms; higher binds tighter.
fn bool_level(expr: &BoolExpr) -> u8 {
    match expr {
        BoolExpr::Logical { op: LogicOp::Or, .. } => 1,
        BoolExpr::Logical {
            op: LogicOp::And, ..
        } => 2,
        BoolExpr::Compare { .. } | BoolExpr::Neg { .. } => 3,
    }
}

/// Renders a boolean expression. Operands are parenthesised exactly where
/// the grammar demands it, so a left-associative chain reparses to the same
/// tree.
pub fn bool_source(expr: &BoolExpr) -> String {
    match expr {
        BoolExpr::Compare {
            op, left, right, ..
        } => format!(
            "{} {} {}",
            int_source(left),
            op.token(),
            int_source(right)
        ),
        BoolExpr::Neg { inner, .. } => format!("!({})", bool_source(inner)),
        BoolExpr::Logical {
            op, left, right, ..
        } => {
            let level = bool_level(expr);
            let op = match op {
                LogicOp::And => "&&",
                LogicOp::Or => "||",
            };
            format!(
                "{} {} {}",
                bool_operand(left, level, false),
                op,
                bool_operand(right, level, true)
            )
        }
    }
}

fn bool_operand(expr: &Rc<BoolExpr>, parent: u8, is_right: bool) -> String {
    let child = bool_level(expr);
    let needs_parens = if is_right {
        child <= parent
    } else {
        child < parent
    };
    if needs_parens {
        format!("({})", bool_source(expr))
    } else {
        bool_source(expr)
    }
}

fn int_level(expr: &IntExpr) -> u8 {
    match expr {
        IntExpr::Binary { op, .. } => match op {
            IntOp::BitOr => 1,
            IntOp::BitXor => 2,
            IntOp::BitAnd => 3,
            IntOp::Lshift | IntOp::Rshift => 4,
            IntOp::Sum | IntOp::Subtract => 5,
            IntOp::Mul | IntOp::Div => 6,
        },
        IntExpr::IntLit { .. } | IntExpr::Identifier { .. } => 7,
    }
}

/// Renders an integer expression, parenthesising operands as needed.
pub fn int_source(expr: &IntExpr) -> String {
    match expr {
        IntExpr::IntLit { value, .. } => value.to_string(),
        IntExpr::Identifier { name, .. } => name.clone(),
        IntExpr::Binary {
            op, left, right, ..
        } => {
            let level = int_level(expr);
            format!(
                "{} {} {}",
                int_operand(left, level, false),
                op.token(),
                int_operand(right, level, true)
            )
        }
    }
}

fn int_operand(expr: &Rc<IntExpr>, parent: u8, is_right: bool) -> String {
    let child = int_level(expr);
    let needs_parens = if is_right {
        child <= parent
    } else {
        child < parent
    };
    if needs_parens {
        format!("({})", int_source(expr))
    } else {
        int_source(expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn dump_shape_matches_the_contract() {
        let program = parse(
            b"POLICY Aio 0 { USE Base 0 ALLOW { io_cancel, personality(persona) { persona == 0 } } } POLICY Base 0 {}",
        )
        .unwrap();
        let expected = "\
Program {
  Policy Aio0 {
    UseStatement{Base0}
    ALLOW {
      io_cancel,
      personality(persona) {
        (==
          persona
          0
        ),
      },
    },
  },
  Policy Base0 {
  },
}
";
        assert_eq!(dump(&program), expected);
    }

    #[test]
    fn dump_uses_block_form_for_short_circuit_operators() {
        let program =
            parse(b"ALLOW { f(a) { a == 1 || a == 2 } }").unwrap();
        let text = dump(&program);
        assert!(text.contains("OrExpr{\n"), "got:\n{}", text);
        assert!(text.contains("(==\n"), "got:\n{}", text);
    }

    #[test]
    fn dump_prints_literals_in_decimal() {
        let program = parse(b"ALLOW { f(a) { a == 0x10 } }").unwrap();
        assert!(dump(&program).contains("16\n"));
    }

    #[test]
    fn dump_parenthesises_nested_integer_operators() {
        let program = parse(b"ALLOW { f(a) { a + 1 == 2 } }").unwrap();
        let text = dump(&program);
        assert!(text.contains("(+\n"), "got:\n{}", text);
        assert!(text.contains("),\n"), "got:\n{}", text);
    }

    #[test]
    fn source_round_trips_a_program() {
        let input: &[u8] = b"DEFAULT LOG\n\
            POLICY Aio 0 { ALLOW { io_cancel, f(a,b) { a == 1 && b == 2, a / 2 == 0 } } }\n\
            POLICY BasicIo 0 { USE Aio 0 }\n";
        let program = parse(input).unwrap();
        let reparsed = parse(source(&program).as_bytes()).unwrap();
        assert_eq!(program, reparsed);
    }

    #[test]
    fn source_keeps_association_through_parens() {
        let program = parse(b"ALLOW { f(a) { a == 1 || (a == 2 || a == 3) } }").unwrap();
        let reparsed = parse(source(&program).as_bytes()).unwrap();
        assert_eq!(program, reparsed);
    }

    #[test]
    fn source_round_trips_erroneous_actions() {
        let program = parse(b"ERRNO(5) { close } TRAP(1) {} TRACE(2) {}").unwrap();
        let reparsed = parse(source(&program).as_bytes()).unwrap();
        assert_eq!(program, reparsed);
    }
}
