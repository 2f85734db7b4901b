//! Left-recursion and memoization machinery for the PEG parser
//!
//! Implements the bounded-recursion algorithm from Medeiros et al., *Left
//! recursion in Parsing Expression Grammars* (2012):
//!
//! 1. Limit recursion to some bound.
//! 2. Try again with a greater bound.
//! 3. If nothing changes (the amount of consumed input is the same), stop.
//! 4. Otherwise, repeat from step 2.
//!
//! Each left-recursive rule entered at a fresh position runs this
//! seed-and-grow loop; a re-entry at the *same* position is a left-recursive
//! call and consumes one unit of the inherited budget instead. Results are
//! memoized per `(rule, byte offset)` with one entry per grow iteration, so
//! both repeated seeds and limited re-entries short-circuit. Memoization
//! lives behind the `memo` cargo feature; disabling it only costs time.

use std::cell::Cell;
#[cfg(feature = "memo")]
use std::cell::RefCell;
use std::rc::Rc;

#[cfg(feature = "memo")]
use rustc_hash::FxHashMap;

use super::ast::{BoolExpr, IntExpr, NodeId};
use super::reader::Reader;

/// Grammar rules that take part in recursion bounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Rule {
    OrExpr,
    AndExpr,
    RelOp,
    BitOr,
    BitXor,
    BitAnd,
    BitShift,
    Sum,
    Mul,
    Term,
}

const RULE_COUNT: usize = 10;

impl Rule {
    fn index(self) -> usize {
        self as usize
    }
}

/// Remaining recursion budget per rule. `None` means the rule is not being
/// bounded on this path.
#[derive(Debug, Clone, Copy, Default)]
struct Limits([Option<u32>; RULE_COUNT]);

impl Limits {
    fn get(&self, rule: Rule) -> Option<u32> {
        self.0[rule.index()]
    }

    fn set(&mut self, rule: Rule, value: u32) {
        self.0[rule.index()] = Some(value);
    }
}

#[cfg(feature = "memo")]
type Memo<'a, T> = FxHashMap<(Rule, usize), Vec<(Option<T>, Reader<'a>)>>;

/// Per-parse shared state: memo caches and the node-id counter.
pub(crate) struct ParseSession<'a> {
    next_id: Cell<NodeId>,
    #[cfg(feature = "memo")]
    int_memo: RefCell<Memo<'a, Rc<IntExpr>>>,
    #[cfg(feature = "memo")]
    bool_memo: RefCell<Memo<'a, Rc<BoolExpr>>>,
    #[cfg(not(feature = "memo"))]
    _input: std::marker::PhantomData<&'a [u8]>,
}

impl<'a> ParseSession<'a> {
    pub(crate) fn new() -> Self {
        Self {
            next_id: Cell::new(0),
            #[cfg(feature = "memo")]
            int_memo: RefCell::new(FxHashMap::default()),
            #[cfg(feature = "memo")]
            bool_memo: RefCell::new(FxHashMap::default()),
            #[cfg(not(feature = "memo"))]
            _input: std::marker::PhantomData,
        }
    }

    /// Hands out the next scope-opening node id.
    pub(crate) fn next_node_id(&self) -> NodeId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }
}

/// One recursion frame. A fresh context is created for every rule entry; a
/// context remembers the reader position it was entered at so re-entry at
/// the same position is recognised as left recursion.
pub(crate) struct RecursionContext<'a, 's> {
    session: &'s ParseSession<'a>,
    reader: Reader<'a>,
    limits: Limits,
}

macro_rules! impl_enter {
    ($enter:ident, $right1:ident, $ty:ty, $memo:ident) => {
        pub(crate) fn $enter(
            &self,
            rule: Rule,
            f: fn(&RecursionContext<'a, 's>, &mut Reader<'a>) -> Option<$ty>,
            reader: &mut Reader<'a>,
        ) -> Option<$ty> {
            let mut inner = RecursionContext {
                session: self.session,
                reader: *reader,
                limits: Limits::default(),
            };

            if self.reader == *reader {
                // Re-entry at the caller's own position: left recursion.
                // Inherit the caller's budgets and spend one unit.
                inner.limits = self.limits;
                if let Some(lim) = inner.limits.get(rule) {
                    if lim == 0 {
                        return None;
                    }
                    let lim = lim - 1;
                    inner.limits.set(rule, lim);

                    #[cfg(feature = "memo")]
                    {
                        let memo = self.session.$memo.borrow();
                        if let Some(entries) = memo.get(&(rule, reader.offset())) {
                            if let Some((res, after)) = entries.get(lim as usize) {
                                *reader = *after;
                                return res.clone();
                            }
                        }
                    }

                    return f(&inner, &mut *reader);
                }
            } else {
                debug_assert!(self.reader < *reader);
            }

            #[cfg(feature = "memo")]
            {
                let memo = self.session.$memo.borrow();
                if let Some(entries) = memo.get(&(rule, reader.offset())) {
                    if let Some((res, after)) = entries.last() {
                        *reader = *after;
                        return res.clone();
                    }
                }
            }

            // Seed: parse once with the budget exhausted, so every
            // left-recursive alternative fails and only the base
            // alternatives can match.
            inner.limits.set(rule, 0);
            let backup = *reader;
            let mut best = f(&inner, &mut *reader);

            #[cfg(feature = "memo")]
            self.session
                .$memo
                .borrow_mut()
                .entry((rule, backup.offset()))
                .or_default()
                .push((best.clone(), *reader));

            if best.is_none() {
                *reader = backup;
                return None;
            }

            // Grow: retry with budgets 1, 2, … from the same position and
            // keep the result only while it consumes strictly more input.
            let mut lim = 1u32;
            loop {
                inner.limits.set(rule, lim);
                let mut probe = backup;
                let res = f(&inner, &mut probe);
                debug_assert!(res.is_some());
                if *reader < probe {
                    best = res;
                    *reader = probe;
                    #[cfg(feature = "memo")]
                    self.session
                        .$memo
                        .borrow_mut()
                        .entry((rule, backup.offset()))
                        .or_default()
                        .push((best.clone(), *reader));
                } else {
                    break;
                }
                lim += 1;
            }

            best
        }

        /// Parses a single right operand of a left-recursive rule: enters
        /// `rule` with its budget forced to zero, so only the rule's base
        /// alternatives can match and the caller's seed loop keeps the
        /// operator chain left-associative.
        pub(crate) fn $right1(
            &self,
            rule: Rule,
            f: fn(&RecursionContext<'a, 's>, &mut Reader<'a>) -> Option<$ty>,
            reader: &mut Reader<'a>,
        ) -> Option<$ty> {
            debug_assert!(self.reader < *reader);
            let mut inner = RecursionContext {
                session: self.session,
                reader: *reader,
                limits: Limits::default(),
            };
            inner.limits.set(rule, 0);
            f(&inner, &mut *reader)
        }
    };
}

impl<'a, 's> RecursionContext<'a, 's> {
    pub(crate) fn new(session: &'s ParseSession<'a>, reader: Reader<'a>) -> Self {
        Self {
            session,
            reader,
            limits: Limits::default(),
        }
    }

    impl_enter!(enter_int, right1_int, Rc<IntExpr>, int_memo);
    impl_enter!(enter_bool, right1_bool, Rc<BoolExpr>, bool_memo);
}

/// Ordered choice: tries each alternative from the same reader position and
/// commits to the first that matches. The reader is restored before every
/// attempt and after a total failure.
macro_rules! choice {
    ($reader:expr, $($alt:expr),+ $(,)?) => {{
        let backup = *$reader;
        let mut result = None;
        $(
            if result.is_none() {
                *$reader = backup;
                result = $alt(&mut *$reader);
            }
        )+
        if result.is_none() {
            *$reader = backup;
        }
        result
    }};
}

pub(crate) use choice;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::{IntOp, SourcePos};
    use crate::parser::token::Symbol;

    // A miniature grammar exercising the machinery directly:
    //   Chain ← Chain '-' Chain₀ / Num
    fn num<'a, 's>(
        _ctx: &RecursionContext<'a, 's>,
        r: &mut Reader<'a>,
    ) -> Option<Rc<IntExpr>> {
        if r.symbol().is_int_literal() {
            Some(IntExpr::lit(
                r.int_value(),
                SourcePos::new(r.line(), r.column()),
            ))
        } else {
            None
        }
    }

    fn chain<'a, 's>(
        ctx: &RecursionContext<'a, 's>,
        r: &mut Reader<'a>,
    ) -> Option<Rc<IntExpr>> {
        choice!(
            r,
            |r: &mut Reader<'a>| {
                let left = ctx.enter_int(Rule::Sum, chain, r)?;
                let mut probe = *r;
                if !probe.next() || probe.symbol() != Symbol::OpMinus {
                    return None;
                }
                let pos = SourcePos::new(probe.line(), probe.column());
                if !probe.next() {
                    return None;
                }
                *r = probe;
                let right = ctx.right1_int(Rule::Sum, chain, r)?;
                Some(IntExpr::binary(IntOp::Subtract, left, right, pos))
            },
            |r: &mut Reader<'a>| ctx.enter_int(Rule::Term, num, r),
        )
    }

    fn parse_chain(input: &str) -> Option<Rc<IntExpr>> {
        let session = ParseSession::new();
        let mut reader = Reader::new(input.as_bytes());
        if !reader.next() {
            return None;
        }
        let ctx = RecursionContext::new(&session, reader);
        ctx.enter_int(Rule::Sum, chain, &mut reader)
    }

    #[test]
    fn seed_and_grow_is_left_associative() {
        let p = SourcePos::default();
        let got = parse_chain("1 - 2 - 3").unwrap();
        let want = IntExpr::binary(
            IntOp::Subtract,
            IntExpr::binary(IntOp::Subtract, IntExpr::lit(1, p), IntExpr::lit(2, p), p),
            IntExpr::lit(3, p),
            p,
        );
        assert_eq!(got, want);
    }

    #[test]
    fn single_operand_needs_no_growing() {
        let got = parse_chain("7").unwrap();
        assert_eq!(got, IntExpr::lit(7, SourcePos::default()));
    }

    #[test]
    fn failure_restores_nothing_consumed() {
        assert!(parse_chain("- 1").is_none());
    }

    #[test]
    fn long_chains_stay_left_nested() {
        let got = parse_chain("1 - 2 - 3 - 4 - 5").unwrap();
        // The leftmost leaf sits at depth four.
        let mut node = got;
        let mut depth = 0;
        while let IntExpr::Binary { left, .. } = &*node {
            node = Rc::clone(left);
            depth += 1;
        }
        assert_eq!(depth, 4);
        assert_eq!(node, IntExpr::lit(1, SourcePos::default()));
    }
}
