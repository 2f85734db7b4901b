//! AST node definitions for the policy language
//!
//! Expressions form two sum types: integer expressions ([`IntExpr`]) and
//! boolean expressions ([`BoolExpr`]). Child edges are `Rc` because the
//! memoizing parser may hand the same subtree out twice; the tree is
//! immutable once built, so sharing is safe.
//!
//! Every node records the [`SourcePos`] of its operator or name token.
//! Positions (and [`NodeId`]s) are metadata: the hand-written `PartialEq`
//! impls compare structure only, which is what the round-trip tests rely on.

use std::rc::Rc;

/// Unique identifier for scope-opening AST nodes, assigned by the parser.
/// The checker keys its node→scope index on this.
pub type NodeId = usize;

/// Source position of a token: 1-based line, 0-based column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourcePos {
    pub line: u32,
    pub column: u32,
}

impl SourcePos {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// Binary operators over integer expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntOp {
    Sum,
    Subtract,
    Mul,
    Div,
    Lshift,
    Rshift,
    BitAnd,
    BitXor,
    BitOr,
}

impl IntOp {
    /// Operator spelling in source and in the printed Lisp form.
    pub fn token(self) -> &'static str {
        match self {
            IntOp::Sum => "+",
            IntOp::Subtract => "-",
            IntOp::Mul => "*",
            IntOp::Div => "/",
            IntOp::Lshift => "<<",
            IntOp::Rshift => ">>",
            IntOp::BitAnd => "&",
            IntOp::BitXor => "^",
            IntOp::BitOr => "|",
        }
    }
}

/// Comparison operators joining two integer expressions into a boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Neq,
    Lt,
    Gt,
    Lte,
    Gte,
}

impl CmpOp {
    pub fn token(self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::Neq => "!=",
            CmpOp::Lt => "<",
            CmpOp::Gt => ">",
            CmpOp::Lte => "<=",
            CmpOp::Gte => ">=",
        }
    }
}

/// Short-circuit boolean connectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicOp {
    And,
    Or,
}

/// Integer-valued expression.
#[derive(Debug, Clone)]
pub enum IntExpr {
    IntLit {
        value: i64,
        pos: SourcePos,
    },
    Identifier {
        name: String,
        pos: SourcePos,
    },
    Binary {
        op: IntOp,
        left: Rc<IntExpr>,
        right: Rc<IntExpr>,
        pos: SourcePos,
    },
}

impl IntExpr {
    pub fn lit(value: i64, pos: SourcePos) -> Rc<Self> {
        Rc::new(IntExpr::IntLit { value, pos })
    }

    pub fn ident(name: impl Into<String>, pos: SourcePos) -> Rc<Self> {
        Rc::new(IntExpr::Identifier {
            name: name.into(),
            pos,
        })
    }

    pub fn binary(op: IntOp, left: Rc<IntExpr>, right: Rc<IntExpr>, pos: SourcePos) -> Rc<Self> {
        Rc::new(IntExpr::Binary {
            op,
            left,
            right,
            pos,
        })
    }

    pub fn pos(&self) -> SourcePos {
        match self {
            IntExpr::IntLit { pos, .. }
            | IntExpr::Identifier { pos, .. }
            | IntExpr::Binary { pos, .. } => *pos,
        }
    }
}

impl PartialEq for IntExpr {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (IntExpr::IntLit { value: a, .. }, IntExpr::IntLit { value: b, .. }) => a == b,
            (IntExpr::Identifier { name: a, .. }, IntExpr::Identifier { name: b, .. }) => a == b,
            (
                IntExpr::Binary {
                    op: ao,
                    left: al,
                    right: ar,
                    ..
                },
                IntExpr::Binary {
                    op: bo,
                    left: bl,
                    right: br,
                    ..
                },
            ) => ao == bo && al == bl && ar == br,
            _ => false,
        }
    }
}

impl Eq for IntExpr {}

/// Boolean-valued expression.
#[derive(Debug, Clone)]
pub enum BoolExpr {
    Compare {
        op: CmpOp,
        left: Rc<IntExpr>,
        right: Rc<IntExpr>,
        pos: SourcePos,
    },
    Neg {
        inner: Rc<BoolExpr>,
        pos: SourcePos,
    },
    Logical {
        op: LogicOp,
        left: Rc<BoolExpr>,
        right: Rc<BoolExpr>,
        pos: SourcePos,
    },
}

impl BoolExpr {
    pub fn compare(op: CmpOp, left: Rc<IntExpr>, right: Rc<IntExpr>, pos: SourcePos) -> Rc<Self> {
        Rc::new(BoolExpr::Compare {
            op,
            left,
            right,
            pos,
        })
    }

    pub fn neg(inner: Rc<BoolExpr>, pos: SourcePos) -> Rc<Self> {
        Rc::new(BoolExpr::Neg { inner, pos })
    }

    pub fn logical(
        op: LogicOp,
        left: Rc<BoolExpr>,
        right: Rc<BoolExpr>,
        pos: SourcePos,
    ) -> Rc<Self> {
        Rc::new(BoolExpr::Logical {
            op,
            left,
            right,
            pos,
        })
    }

    pub fn pos(&self) -> SourcePos {
        match self {
            BoolExpr::Compare { pos, .. }
            | BoolExpr::Neg { pos, .. }
            | BoolExpr::Logical { pos, .. } => *pos,
        }
    }
}

impl PartialEq for BoolExpr {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                BoolExpr::Compare {
                    op: ao,
                    left: al,
                    right: ar,
                    ..
                },
                BoolExpr::Compare {
                    op: bo,
                    left: bl,
                    right: br,
                    ..
                },
            ) => ao == bo && al == bl && ar == br,
            (BoolExpr::Neg { inner: a, .. }, BoolExpr::Neg { inner: b, .. }) => a == b,
            (
                BoolExpr::Logical {
                    op: ao,
                    left: al,
                    right: ar,
                    ..
                },
                BoolExpr::Logical {
                    op: bo,
                    left: bl,
                    right: br,
                    ..
                },
            ) => ao == bo && al == bl && ar == br,
            _ => false,
        }
    }
}

impl Eq for BoolExpr {}

/// A named occurrence of an identifier (filter parameters), with position.
#[derive(Debug, Clone)]
pub struct Ident {
    pub name: String,
    pub pos: SourcePos,
}

impl Ident {
    pub fn new(name: impl Into<String>, pos: SourcePos) -> Self {
        Self {
            name: name.into(),
            pos,
        }
    }
}

impl PartialEq for Ident {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Ident {}

/// Filter action attached to an [`ActionBlock`] or `DEFAULT` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Allow,
    Log,
    KillProcess,
    KillThread,
    UserNotif,
    Errno(i32),
    Trap(i64),
    Trace(i64),
}

impl Action {
    /// Label used by the AST dump, e.g. `ALLOW` or `ERRNO{5}`.
    pub fn label(&self) -> String {
        match self {
            Action::Allow => "ALLOW".into(),
            Action::Log => "LOG".into(),
            Action::KillProcess => "KILL_PROCESS".into(),
            Action::KillThread => "KILL_THREAD".into(),
            Action::UserNotif => "USER_NOTIF".into(),
            Action::Errno(n) => format!("ERRNO{{{}}}", n),
            Action::Trap(n) => format!("TRAP{{{}}}", n),
            Action::Trace(n) => format!("TRACE{{{}}}", n),
        }
    }
}

/// A syscall filter: name, optional parameters, optional conditions.
/// An empty body means any call to the syscall matches.
#[derive(Debug, Clone)]
pub struct SyscallFilter {
    pub node_id: NodeId,
    pub syscall: String,
    pub params: Vec<Ident>,
    pub body: Vec<Rc<BoolExpr>>,
    pub pos: SourcePos,
}

impl PartialEq for SyscallFilter {
    fn eq(&self, other: &Self) -> bool {
        self.syscall == other.syscall && self.params == other.params && self.body == other.body
    }
}

impl Eq for SyscallFilter {}

/// An action paired with the filters that trigger it.
#[derive(Debug, Clone)]
pub struct ActionBlock {
    pub node_id: NodeId,
    pub action: Action,
    pub filters: Vec<SyscallFilter>,
    pub pos: SourcePos,
}

impl PartialEq for ActionBlock {
    fn eq(&self, other: &Self) -> bool {
        self.action == other.action && self.filters == other.filters
    }
}

impl Eq for ActionBlock {}

/// Reference to another policy by name and version.
#[derive(Debug, Clone)]
pub struct UseStatement {
    pub policy: String,
    pub version: String,
    pub pos: SourcePos,
}

impl UseStatement {
    /// Identity of the referenced policy: name and version concatenated.
    pub fn id(&self) -> String {
        format!("{}{}", self.policy, self.version)
    }
}

impl PartialEq for UseStatement {
    fn eq(&self, other: &Self) -> bool {
        self.policy == other.policy && self.version == other.version
    }
}

impl Eq for UseStatement {}

/// Statement allowed inside a policy body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyStatement {
    Use(UseStatement),
    Block(ActionBlock),
}

/// A named, versioned collection of use statements and action blocks.
#[derive(Debug, Clone)]
pub struct Policy {
    pub node_id: NodeId,
    pub name: String,
    pub version: String,
    pub body: Vec<PolicyStatement>,
    pub pos: SourcePos,
}

impl Policy {
    /// Identity of the policy: name and version concatenated.
    pub fn id(&self) -> String {
        format!("{}{}", self.name, self.version)
    }
}

impl PartialEq for Policy {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.version == other.version && self.body == other.body
    }
}

impl Eq for Policy {}

/// Top-level `DEFAULT <action>` directive.
#[derive(Debug, Clone)]
pub struct DefaultAction {
    pub action: Action,
    pub pos: SourcePos,
}

impl PartialEq for DefaultAction {
    fn eq(&self, other: &Self) -> bool {
        self.action == other.action
    }
}

impl Eq for DefaultAction {}

/// Top-level program statement. A program is an ordered sequence of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgramStatement {
    Policy(Policy),
    Default(DefaultAction),
    Use(UseStatement),
    Block(ActionBlock),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_positions() {
        let a = IntExpr::binary(
            IntOp::Sum,
            IntExpr::lit(1, SourcePos::new(1, 0)),
            IntExpr::lit(2, SourcePos::new(1, 4)),
            SourcePos::new(1, 2),
        );
        let b = IntExpr::binary(
            IntOp::Sum,
            IntExpr::lit(1, SourcePos::default()),
            IntExpr::lit(2, SourcePos::default()),
            SourcePos::default(),
        );
        assert_eq!(a, b);
    }

    #[test]
    fn equality_observes_structure() {
        let p = SourcePos::default();
        let left_assoc = IntExpr::binary(
            IntOp::Subtract,
            IntExpr::binary(
                IntOp::Subtract,
                IntExpr::ident("a", p),
                IntExpr::ident("b", p),
                p,
            ),
            IntExpr::ident("c", p),
            p,
        );
        let right_assoc = IntExpr::binary(
            IntOp::Subtract,
            IntExpr::ident("a", p),
            IntExpr::binary(
                IntOp::Subtract,
                IntExpr::ident("b", p),
                IntExpr::ident("c", p),
                p,
            ),
            p,
        );
        assert_ne!(left_assoc, right_assoc);
    }

    #[test]
    fn action_labels() {
        assert_eq!(Action::Allow.label(), "ALLOW");
        assert_eq!(Action::Errno(5).label(), "ERRNO{5}");
        assert_eq!(Action::Trace(2).label(), "TRACE{2}");
    }

    #[test]
    fn policy_identity_concatenates_name_and_version() {
        let p = Policy {
            node_id: 0,
            name: "Aio".into(),
            version: "0".into(),
            body: Vec::new(),
            pos: SourcePos::default(),
        };
        assert_eq!(p.id(), "Aio0");
    }
}
