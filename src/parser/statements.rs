//! Statement rules of the PEG grammar
//!
//! ```text
//! ProgramStmt   ← Policy / UseStatement / ActionBlock / 'DEFAULT' Action
//! Policy        ← 'POLICY' IDENT Version '{' PolicyStmt* '}'
//! PolicyStmt    ← UseStatement / ActionBlock
//! UseStatement  ← 'USE' IDENT Version
//! ActionBlock   ← Action '{' (SyscallFilter (',' SyscallFilter)*)? ','? '}'
//! Action        ← 'ALLOW' / 'LOG' / 'KILL_PROCESS' / 'KILL_THREAD' /
//!                 'USER_NOTIF' / 'ERRNO' '(' INT ')' /
//!                 'TRAP' '(' INT ')' / 'TRACE' '(' INT ')'
//! SyscallFilter ← IDENT ( '(' (IDENT (',' IDENT)*)? ')'
//!                           '{' (OrExpr (',' OrExpr)*)? ','? '}' )?
//! ```
//!
//! `Version` accepts an identifier or any integer literal; the raw lexeme
//! becomes the version string (`POLICY Aio 0` has version `"0"`).
//!
//! Statement rules follow the same calling convention as the expression
//! rules: entered with the reader on their first token, returning with the
//! reader on their last consumed token.

use super::ast::{
    Action, ActionBlock, DefaultAction, Ident, Policy, PolicyStatement, ProgramStatement,
    SourcePos, SyscallFilter, UseStatement,
};
use super::expressions;
use super::peg::{choice, ParseSession};
use super::reader::Reader;
use super::token::Symbol;

pub(crate) fn program_stmt<'a>(
    s: &ParseSession<'a>,
    r: &mut Reader<'a>,
) -> Option<ProgramStatement> {
    choice!(
        r,
        |r: &mut Reader<'a>| policy(s, r).map(ProgramStatement::Policy),
        |r: &mut Reader<'a>| use_statement(r).map(ProgramStatement::Use),
        |r: &mut Reader<'a>| action_block(s, r).map(ProgramStatement::Block),
        |r: &mut Reader<'a>| default_action(r).map(ProgramStatement::Default),
    )
}

fn policy<'a>(s: &ParseSession<'a>, r: &mut Reader<'a>) -> Option<Policy> {
    if r.symbol() != Symbol::KwPolicy {
        return None;
    }
    let mut probe = *r;
    if !probe.next() || probe.symbol() != Symbol::Identifier {
        return None;
    }
    let name = probe.ident_value();
    let pos = SourcePos::new(probe.line(), probe.column());
    if !probe.next() {
        return None;
    }
    let version = version_text(&probe)?;
    if !probe.next() || probe.symbol() != Symbol::LBrace {
        return None;
    }
    *r = probe;

    let mut body = Vec::new();
    loop {
        let mut ahead = *r;
        if !ahead.next() {
            return None;
        }
        if ahead.symbol() == Symbol::RBrace {
            *r = ahead;
            break;
        }
        *r = ahead;
        body.push(policy_stmt(s, r)?);
    }

    Some(Policy {
        node_id: s.next_node_id(),
        name,
        version,
        body,
        pos,
    })
}

fn policy_stmt<'a>(s: &ParseSession<'a>, r: &mut Reader<'a>) -> Option<PolicyStatement> {
    choice!(
        r,
        |r: &mut Reader<'a>| use_statement(r).map(PolicyStatement::Use),
        |r: &mut Reader<'a>| action_block(s, r).map(PolicyStatement::Block),
    )
}

fn use_statement(r: &mut Reader<'_>) -> Option<UseStatement> {
    if r.symbol() != Symbol::KwUse {
        return None;
    }
    let mut probe = *r;
    if !probe.next() || probe.symbol() != Symbol::Identifier {
        return None;
    }
    let policy = probe.ident_value();
    let pos = SourcePos::new(probe.line(), probe.column());
    if !probe.next() {
        return None;
    }
    let version = version_text(&probe)?;
    *r = probe;
    Some(UseStatement {
        policy,
        version,
        pos,
    })
}

fn default_action(r: &mut Reader<'_>) -> Option<DefaultAction> {
    if r.symbol() != Symbol::KwDefault {
        return None;
    }
    let pos = SourcePos::new(r.line(), r.column());
    let mut probe = *r;
    if !probe.next() {
        return None;
    }
    *r = probe;
    let action = action(r)?;
    Some(DefaultAction { action, pos })
}

/// The action keyword, with the parenthesised payload for `ERRNO`, `TRAP`
/// and `TRACE`.
fn action(r: &mut Reader<'_>) -> Option<Action> {
    match r.symbol() {
        Symbol::KwAllow => Some(Action::Allow),
        Symbol::KwLog => Some(Action::Log),
        Symbol::KwKillProcess => Some(Action::KillProcess),
        Symbol::KwKillThread => Some(Action::KillThread),
        Symbol::KwUserNotif => Some(Action::UserNotif),
        kw @ (Symbol::KwErrno | Symbol::KwTrap | Symbol::KwTrace) => {
            let mut probe = *r;
            if !probe.next() || probe.symbol() != Symbol::LParen {
                return None;
            }
            if !probe.next() || !probe.symbol().is_int_literal() {
                return None;
            }
            let value = probe.int_value();
            if !probe.next() || probe.symbol() != Symbol::RParen {
                return None;
            }
            *r = probe;
            Some(match kw {
                Symbol::KwErrno => Action::Errno(value as i32),
                Symbol::KwTrap => Action::Trap(value),
                _ => Action::Trace(value),
            })
        }
        _ => None,
    }
}

fn action_block<'a>(s: &ParseSession<'a>, r: &mut Reader<'a>) -> Option<ActionBlock> {
    let pos = SourcePos::new(r.line(), r.column());
    let action = action(r)?;
    let mut probe = *r;
    if !probe.next() || probe.symbol() != Symbol::LBrace {
        return None;
    }
    *r = probe;

    let mut filters = Vec::new();
    loop {
        let mut ahead = *r;
        if !ahead.next() {
            return None;
        }
        match ahead.symbol() {
            Symbol::RBrace => {
                *r = ahead;
                break;
            }
            // `{ , }`: empty filter list with the optional trailing comma.
            Symbol::Comma if filters.is_empty() => {
                *r = ahead;
                let mut close = *r;
                if !close.next() || close.symbol() != Symbol::RBrace {
                    return None;
                }
                *r = close;
                break;
            }
            _ => {}
        }
        *r = ahead;
        filters.push(syscall_filter(s, r)?);

        let mut sep = *r;
        if !sep.next() {
            return None;
        }
        match sep.symbol() {
            Symbol::Comma => *r = sep,
            Symbol::RBrace => {
                *r = sep;
                break;
            }
            _ => return None,
        }
    }

    Some(ActionBlock {
        node_id: s.next_node_id(),
        action,
        filters,
        pos,
    })
}

fn syscall_filter<'a>(s: &ParseSession<'a>, r: &mut Reader<'a>) -> Option<SyscallFilter> {
    if r.symbol() != Symbol::Identifier {
        return None;
    }
    let syscall = r.ident_value();
    let pos = SourcePos::new(r.line(), r.column());
    let mut params = Vec::new();
    let mut body = Vec::new();

    let mut ahead = *r;
    if ahead.next() && ahead.symbol() == Symbol::LParen {
        *r = ahead;

        // Parameter list; no trailing comma here.
        loop {
            let mut p = *r;
            if !p.next() {
                return None;
            }
            match p.symbol() {
                Symbol::RParen if params.is_empty() => {
                    *r = p;
                    break;
                }
                Symbol::Identifier => {
                    params.push(Ident::new(
                        p.ident_value(),
                        SourcePos::new(p.line(), p.column()),
                    ));
                    *r = p;
                    let mut sep = *r;
                    if !sep.next() {
                        return None;
                    }
                    match sep.symbol() {
                        Symbol::Comma => *r = sep,
                        Symbol::RParen => {
                            *r = sep;
                            break;
                        }
                        _ => return None,
                    }
                }
                _ => return None,
            }
        }

        let mut brace = *r;
        if !brace.next() || brace.symbol() != Symbol::LBrace {
            return None;
        }
        *r = brace;

        // Condition list; commas separate, one trailing comma allowed.
        loop {
            let mut ahead = *r;
            if !ahead.next() {
                return None;
            }
            match ahead.symbol() {
                Symbol::RBrace => {
                    *r = ahead;
                    break;
                }
                Symbol::Comma if body.is_empty() => {
                    *r = ahead;
                    let mut close = *r;
                    if !close.next() || close.symbol() != Symbol::RBrace {
                        return None;
                    }
                    *r = close;
                    break;
                }
                _ => {}
            }
            *r = ahead;
            body.push(expressions::bool_expr(s, r)?);

            let mut sep = *r;
            if !sep.next() {
                return None;
            }
            match sep.symbol() {
                Symbol::Comma => *r = sep,
                Symbol::RBrace => {
                    *r = sep;
                    break;
                }
                _ => return None,
            }
        }
    }

    Some(SyscallFilter {
        node_id: s.next_node_id(),
        syscall,
        params,
        body,
        pos,
    })
}

fn version_text(r: &Reader<'_>) -> Option<String> {
    match r.symbol() {
        Symbol::Identifier => Some(r.ident_value()),
        sym if sym.is_int_literal() => Some(r.literal_text()),
        _ => None,
    }
}
