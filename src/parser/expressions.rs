//! Expression rules of the PEG grammar
//!
//! Ten rules, from lowest to highest precedence:
//!
//! ```text
//! OrExpr   ← OrExpr '||' AndExpr / AndExpr
//! AndExpr  ← AndExpr '&&' RelOp  / RelOp
//! RelOp    ← BitOr ('=='|'!='|'<'|'>'|'<='|'>=') BitOr / '!'? '(' OrExpr ')'
//! BitOr    ← BitOr '|' BitXor / BitXor
//! BitXor   ← BitXor '^' BitAnd / BitAnd
//! BitAnd   ← BitAnd '&' BitShift / BitShift
//! BitShift ← BitShift ('<<'|'>>') Sum / Sum
//! Sum      ← Sum ('+'|'-') Mul / Mul
//! Mul      ← Mul ('*'|'/') Term / Term
//! Term     ← INT / IDENT / '(' BitOr ')'
//! ```
//!
//! The left-recursive rules are entered through
//! [`RecursionContext::enter_int`]/[`enter_bool`](RecursionContext::enter_bool);
//! their right operands re-enter the *same* rule through `right1`, which
//! disables left recursion so exactly one higher-precedence operand is
//! consumed and the outer seed-and-grow loop assembles the chain
//! left-associatively.
//!
//! Every rule is called with the reader on its first token and returns with
//! the reader on its last consumed token; on failure the reader is restored.
//!
//! `Term`'s grouped form re-enters `BitOr` rather than `OrExpr`: parentheses
//! in integer context may not contain boolean subexpressions. `RelOp`'s
//! grouped form re-enters `OrExpr` because negation composes over booleans.

use std::rc::Rc;

use super::ast::{BoolExpr, CmpOp, IntExpr, IntOp, LogicOp, SourcePos};
use super::peg::{choice, ParseSession, RecursionContext, Rule};
use super::reader::Reader;
use super::token::Symbol;

/// Parses one boolean condition (an `OrExpr`) starting a fresh recursion
/// context at the reader's position.
pub(crate) fn bool_expr<'a>(session: &ParseSession<'a>, r: &mut Reader<'a>) -> Option<Rc<BoolExpr>> {
    let ctx = RecursionContext::new(session, *r);
    ctx.enter_bool(Rule::OrExpr, or_expr, r)
}

fn or_expr<'a, 's>(ctx: &RecursionContext<'a, 's>, r: &mut Reader<'a>) -> Option<Rc<BoolExpr>> {
    choice!(
        r,
        |r: &mut Reader<'a>| {
            let left = ctx.enter_bool(Rule::OrExpr, or_expr, r)?;
            let mut probe = *r;
            if !probe.next() || probe.symbol() != Symbol::OpOr {
                return None;
            }
            let pos = SourcePos::new(probe.line(), probe.column());
            if !probe.next() {
                return None;
            }
            *r = probe;
            let right = ctx.right1_bool(Rule::OrExpr, or_expr, r)?;
            Some(BoolExpr::logical(LogicOp::Or, left, right, pos))
        },
        |r: &mut Reader<'a>| ctx.enter_bool(Rule::AndExpr, and_expr, r),
    )
}

fn and_expr<'a, 's>(ctx: &RecursionContext<'a, 's>, r: &mut Reader<'a>) -> Option<Rc<BoolExpr>> {
    choice!(
        r,
        |r: &mut Reader<'a>| {
            let left = ctx.enter_bool(Rule::AndExpr, and_expr, r)?;
            let mut probe = *r;
            if !probe.next() || probe.symbol() != Symbol::OpAnd {
                return None;
            }
            let pos = SourcePos::new(probe.line(), probe.column());
            if !probe.next() {
                return None;
            }
            *r = probe;
            let right = ctx.right1_bool(Rule::AndExpr, and_expr, r)?;
            Some(BoolExpr::logical(LogicOp::And, left, right, pos))
        },
        |r: &mut Reader<'a>| ctx.enter_bool(Rule::RelOp, rel_op, r),
    )
}

fn rel_op<'a, 's>(ctx: &RecursionContext<'a, 's>, r: &mut Reader<'a>) -> Option<Rc<BoolExpr>> {
    choice!(
        r,
        |r: &mut Reader<'a>| {
            let left = ctx.enter_int(Rule::BitOr, bit_or, r)?;
            let mut probe = *r;
            if !probe.next() {
                return None;
            }
            let op = match probe.symbol() {
                Symbol::OpEq => CmpOp::Eq,
                Symbol::OpNe => CmpOp::Neq,
                Symbol::OpLt => CmpOp::Lt,
                Symbol::OpGt => CmpOp::Gt,
                Symbol::OpLte => CmpOp::Lte,
                Symbol::OpGte => CmpOp::Gte,
                _ => return None,
            };
            let pos = SourcePos::new(probe.line(), probe.column());
            if !probe.next() {
                return None;
            }
            *r = probe;
            let right = ctx.enter_int(Rule::BitOr, bit_or, r)?;
            Some(BoolExpr::compare(op, left, right, pos))
        },
        |r: &mut Reader<'a>| {
            let neg_pos = if r.symbol() == Symbol::OpNeg {
                let pos = SourcePos::new(r.line(), r.column());
                if !r.next() {
                    return None;
                }
                Some(pos)
            } else {
                None
            };
            if r.symbol() != Symbol::LParen {
                return None;
            }
            if !r.next() {
                return None;
            }
            let inner = ctx.enter_bool(Rule::OrExpr, or_expr, r)?;
            let mut probe = *r;
            if !probe.next() || probe.symbol() != Symbol::RParen {
                return None;
            }
            *r = probe;
            Some(match neg_pos {
                Some(pos) => BoolExpr::neg(inner, pos),
                None => inner,
            })
        },
    )
}

fn bit_or<'a, 's>(ctx: &RecursionContext<'a, 's>, r: &mut Reader<'a>) -> Option<Rc<IntExpr>> {
    choice!(
        r,
        |r: &mut Reader<'a>| {
            let left = ctx.enter_int(Rule::BitOr, bit_or, r)?;
            let mut probe = *r;
            if !probe.next() || probe.symbol() != Symbol::OpBor {
                return None;
            }
            let pos = SourcePos::new(probe.line(), probe.column());
            if !probe.next() {
                return None;
            }
            *r = probe;
            let right = ctx.right1_int(Rule::BitOr, bit_or, r)?;
            Some(IntExpr::binary(IntOp::BitOr, left, right, pos))
        },
        |r: &mut Reader<'a>| ctx.enter_int(Rule::BitXor, bit_xor, r),
    )
}

fn bit_xor<'a, 's>(ctx: &RecursionContext<'a, 's>, r: &mut Reader<'a>) -> Option<Rc<IntExpr>> {
    choice!(
        r,
        |r: &mut Reader<'a>| {
            let left = ctx.enter_int(Rule::BitXor, bit_xor, r)?;
            let mut probe = *r;
            if !probe.next() || probe.symbol() != Symbol::OpBxor {
                return None;
            }
            let pos = SourcePos::new(probe.line(), probe.column());
            if !probe.next() {
                return None;
            }
            *r = probe;
            let right = ctx.right1_int(Rule::BitXor, bit_xor, r)?;
            Some(IntExpr::binary(IntOp::BitXor, left, right, pos))
        },
        |r: &mut Reader<'a>| ctx.enter_int(Rule::BitAnd, bit_and, r),
    )
}

fn bit_and<'a, 's>(ctx: &RecursionContext<'a, 's>, r: &mut Reader<'a>) -> Option<Rc<IntExpr>> {
    choice!(
        r,
        |r: &mut Reader<'a>| {
            let left = ctx.enter_int(Rule::BitAnd, bit_and, r)?;
            let mut probe = *r;
            if !probe.next() || probe.symbol() != Symbol::OpBand {
                return None;
            }
            let pos = SourcePos::new(probe.line(), probe.column());
            if !probe.next() {
                return None;
            }
            *r = probe;
            let right = ctx.right1_int(Rule::BitAnd, bit_and, r)?;
            Some(IntExpr::binary(IntOp::BitAnd, left, right, pos))
        },
        |r: &mut Reader<'a>| ctx.enter_int(Rule::BitShift, bit_shift, r),
    )
}

fn bit_shift<'a, 's>(ctx: &RecursionContext<'a, 's>, r: &mut Reader<'a>) -> Option<Rc<IntExpr>> {
    choice!(
        r,
        |r: &mut Reader<'a>| {
            let left = ctx.enter_int(Rule::BitShift, bit_shift, r)?;
            let mut probe = *r;
            if !probe.next() {
                return None;
            }
            let op = match probe.symbol() {
                Symbol::OpLshift => IntOp::Lshift,
                Symbol::OpRshift => IntOp::Rshift,
                _ => return None,
            };
            let pos = SourcePos::new(probe.line(), probe.column());
            if !probe.next() {
                return None;
            }
            *r = probe;
            let right = ctx.right1_int(Rule::BitShift, bit_shift, r)?;
            Some(IntExpr::binary(op, left, right, pos))
        },
        |r: &mut Reader<'a>| ctx.enter_int(Rule::Sum, sum, r),
    )
}

fn sum<'a, 's>(ctx: &RecursionContext<'a, 's>, r: &mut Reader<'a>) -> Option<Rc<IntExpr>> {
    choice!(
        r,
        |r: &mut Reader<'a>| {
            let left = ctx.enter_int(Rule::Sum, sum, r)?;
            let mut probe = *r;
            if !probe.next() {
                return None;
            }
            let op = match probe.symbol() {
                Symbol::OpPlus => IntOp::Sum,
                Symbol::OpMinus => IntOp::Subtract,
                _ => return None,
            };
            let pos = SourcePos::new(probe.line(), probe.column());
            if !probe.next() {
                return None;
            }
            *r = probe;
            let right = ctx.right1_int(Rule::Sum, sum, r)?;
            Some(IntExpr::binary(op, left, right, pos))
        },
        |r: &mut Reader<'a>| ctx.enter_int(Rule::Mul, mul, r),
    )
}

fn mul<'a, 's>(ctx: &RecursionContext<'a, 's>, r: &mut Reader<'a>) -> Option<Rc<IntExpr>> {
    choice!(
        r,
        |r: &mut Reader<'a>| {
            let left = ctx.enter_int(Rule::Mul, mul, r)?;
            let mut probe = *r;
            if !probe.next() {
                return None;
            }
            let op = match probe.symbol() {
                Symbol::OpMul => IntOp::Mul,
                Symbol::OpDiv => IntOp::Div,
                _ => return None,
            };
            let pos = SourcePos::new(probe.line(), probe.column());
            if !probe.next() {
                return None;
            }
            *r = probe;
            let right = ctx.right1_int(Rule::Mul, mul, r)?;
            Some(IntExpr::binary(op, left, right, pos))
        },
        |r: &mut Reader<'a>| ctx.enter_int(Rule::Term, term, r),
    )
}

fn term<'a, 's>(ctx: &RecursionContext<'a, 's>, r: &mut Reader<'a>) -> Option<Rc<IntExpr>> {
    choice!(
        r,
        |r: &mut Reader<'a>| {
            if !r.symbol().is_int_literal() {
                return None;
            }
            Some(IntExpr::lit(
                r.int_value(),
                SourcePos::new(r.line(), r.column()),
            ))
        },
        |r: &mut Reader<'a>| {
            if r.symbol() != Symbol::Identifier {
                return None;
            }
            Some(IntExpr::ident(
                r.ident_value(),
                SourcePos::new(r.line(), r.column()),
            ))
        },
        |r: &mut Reader<'a>| {
            if r.symbol() != Symbol::LParen {
                return None;
            }
            if !r.next() {
                return None;
            }
            let inner = ctx.enter_int(Rule::BitOr, bit_or, r)?;
            let mut probe = *r;
            if !probe.next() || probe.symbol() != Symbol::RParen {
                return None;
            }
            *r = probe;
            Some(inner)
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_bool(input: &str) -> Option<Rc<BoolExpr>> {
        let session = ParseSession::new();
        let mut r = Reader::new(input.as_bytes());
        if !r.next() {
            return None;
        }
        let expr = bool_expr(&session, &mut r)?;
        // The whole input must be consumed.
        if r.next() {
            return None;
        }
        Some(expr)
    }

    fn parse_int(input: &str) -> Option<Rc<IntExpr>> {
        let session = ParseSession::new();
        let mut r = Reader::new(input.as_bytes());
        if !r.next() {
            return None;
        }
        let ctx = RecursionContext::new(&session, r);
        let expr = ctx.enter_int(Rule::BitOr, bit_or, &mut r)?;
        if r.next() {
            return None;
        }
        Some(expr)
    }

    fn lit(v: i64) -> Rc<IntExpr> {
        IntExpr::lit(v, SourcePos::default())
    }

    fn ident(name: &str) -> Rc<IntExpr> {
        IntExpr::ident(name, SourcePos::default())
    }

    fn bin(op: IntOp, l: Rc<IntExpr>, r: Rc<IntExpr>) -> Rc<IntExpr> {
        IntExpr::binary(op, l, r, SourcePos::default())
    }

    #[test]
    fn subtraction_is_left_associative() {
        let got = parse_int("a - b - c").unwrap();
        let want = bin(
            IntOp::Subtract,
            bin(IntOp::Subtract, ident("a"), ident("b")),
            ident("c"),
        );
        assert_eq!(got, want);
    }

    #[test]
    fn mul_binds_tighter_than_sum() {
        let got = parse_int("1 + 2 * 3").unwrap();
        let want = bin(IntOp::Sum, lit(1), bin(IntOp::Mul, lit(2), lit(3)));
        assert_eq!(got, want);
    }

    #[test]
    fn parentheses_override_precedence() {
        let got = parse_int("(1 + 2) * 3").unwrap();
        let want = bin(IntOp::Mul, bin(IntOp::Sum, lit(1), lit(2)), lit(3));
        assert_eq!(got, want);
    }

    #[test]
    fn full_integer_precedence_ladder() {
        // a | b ^ c & d << e + f * g nests one operator per level.
        let got = parse_int("a | b ^ c & d << e + f * g").unwrap();
        let want = bin(
            IntOp::BitOr,
            ident("a"),
            bin(
                IntOp::BitXor,
                ident("b"),
                bin(
                    IntOp::BitAnd,
                    ident("c"),
                    bin(
                        IntOp::Lshift,
                        ident("d"),
                        bin(
                            IntOp::Sum,
                            ident("e"),
                            bin(IntOp::Mul, ident("f"), ident("g")),
                        ),
                    ),
                ),
            ),
        );
        assert_eq!(got, want);
    }

    #[test]
    fn shift_chains_stay_left_nested() {
        let got = parse_int("a << b >> c").unwrap();
        let want = bin(
            IntOp::Rshift,
            bin(IntOp::Lshift, ident("a"), ident("b")),
            ident("c"),
        );
        assert_eq!(got, want);
    }

    #[test]
    fn or_chain_is_left_associative() {
        let got = parse_bool("persona == 0 || persona == 8 || persona == 16").unwrap();
        let eq = |v| {
            BoolExpr::compare(CmpOp::Eq, ident("persona"), lit(v), SourcePos::default())
        };
        let want = BoolExpr::logical(
            LogicOp::Or,
            BoolExpr::logical(LogicOp::Or, eq(0), eq(8), SourcePos::default()),
            eq(16),
            SourcePos::default(),
        );
        assert_eq!(got, want);
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let got = parse_bool("a == 1 && b == 2 || c == 3").unwrap();
        let eq = |n: &str, v| {
            BoolExpr::compare(CmpOp::Eq, ident(n), lit(v), SourcePos::default())
        };
        let want = BoolExpr::logical(
            LogicOp::Or,
            BoolExpr::logical(LogicOp::And, eq("a", 1), eq("b", 2), SourcePos::default()),
            eq("c", 3),
            SourcePos::default(),
        );
        assert_eq!(got, want);
    }

    #[test]
    fn negation_wraps_grouped_booleans() {
        let got = parse_bool("!(a == 1)").unwrap();
        let want = BoolExpr::neg(
            BoolExpr::compare(CmpOp::Eq, ident("a"), lit(1), SourcePos::default()),
            SourcePos::default(),
        );
        assert_eq!(got, want);
    }

    #[test]
    fn grouped_boolean_is_transparent() {
        let got = parse_bool("(a == 1) && (b == 2)").unwrap();
        let want = BoolExpr::logical(
            LogicOp::And,
            BoolExpr::compare(CmpOp::Eq, ident("a"), lit(1), SourcePos::default()),
            BoolExpr::compare(CmpOp::Eq, ident("b"), lit(2), SourcePos::default()),
            SourcePos::default(),
        );
        assert_eq!(got, want);
    }

    #[test]
    fn comparison_operators_all_parse() {
        for (src, op) in [
            ("a == 1", CmpOp::Eq),
            ("a != 1", CmpOp::Neq),
            ("a < 1", CmpOp::Lt),
            ("a > 1", CmpOp::Gt),
            ("a <= 1", CmpOp::Lte),
            ("a >= 1", CmpOp::Gte),
        ] {
            let got = parse_bool(src).unwrap();
            let want = BoolExpr::compare(op, ident("a"), lit(1), SourcePos::default());
            assert_eq!(got, want, "source {:?}", src);
        }
    }

    #[test]
    fn bitwise_or_allowed_in_comparison_operand() {
        let got = parse_bool("flags == O_RDONLY | O_CLOEXEC").unwrap();
        let want = BoolExpr::compare(
            CmpOp::Eq,
            ident("flags"),
            bin(IntOp::BitOr, ident("O_RDONLY"), ident("O_CLOEXEC")),
            SourcePos::default(),
        );
        assert_eq!(got, want);
    }

    #[test]
    fn operator_position_is_recorded() {
        let session = ParseSession::new();
        let mut r = Reader::new(b"a + b");
        assert!(r.next());
        let ctx = RecursionContext::new(&session, r);
        let expr = ctx.enter_int(Rule::Sum, sum, &mut r).unwrap();
        match &*expr {
            IntExpr::Binary { pos, .. } => assert_eq!(*pos, SourcePos::new(1, 2)),
            other => panic!("expected binary node, got {:?}", other),
        }
    }

    #[test]
    fn boolean_in_integer_parentheses_is_rejected() {
        assert!(parse_bool("(a == 1 || b == 2) == 3").is_none());
        assert!(parse_int("(a == 1)").is_none());
    }

    #[test]
    fn failure_restores_reader() {
        let session = ParseSession::new();
        let mut r = Reader::new(b"== 1");
        assert!(r.next());
        let before = r;
        assert!(bool_expr(&session, &mut r).is_none());
        assert_eq!(r, before);
    }
}
