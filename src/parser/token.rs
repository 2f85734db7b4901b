//! Terminal symbols of the policy language
//!
//! The lexer classifies every token with a [`Symbol`]. Payloads (identifier
//! text, decoded integer values) are not stored here; they are decoded on
//! demand from the token's byte span by [`Reader`](super::reader::Reader).

use std::fmt;

/// All token kinds produced by the lexer.
///
/// The four integer-literal variants are distinguished so diagnostics and
/// printers can tell `0x10` from `16`; the parser treats them uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    // Punctuation
    LParen,   // (
    RParen,   // )
    LBrack,   // [
    RBrack,   // ]
    LBrace,   // {
    RBrace,   // }
    Comma,    // ,
    At,       // @

    // Operators
    OpNeg,    // !
    OpAnd,    // &&
    OpOr,     // ||
    OpPlus,   // +
    OpMinus,  // -
    OpMul,    // *
    OpDiv,    // /
    OpLshift, // <<
    OpRshift, // >>
    OpBand,   // &
    OpBor,    // |
    OpBxor,   // ^
    OpEq,     // ==
    OpNe,     // !=
    OpLt,     // <
    OpLte,    // <=
    OpGt,     // >
    OpGte,    // >=

    // Integer literals, by base
    LitBin,
    LitOct,
    LitDec,
    LitHex,

    // Keywords
    KwUse,
    KwPolicy,
    KwDefault,
    KwAllow,
    KwLog,
    KwKillProcess,
    KwKillThread,
    KwUserNotif,
    KwErrno,
    KwTrap,
    KwTrace,

    Identifier,

    /// An unrecognised byte. Only visible on the raw token stream; the
    /// cooked stream skips these so parsing can recover.
    Unknown,

    /// End-of-input sentinel.
    End,
}

impl Symbol {
    /// True for any of the four integer-literal variants.
    pub fn is_int_literal(self) -> bool {
        matches!(
            self,
            Symbol::LitBin | Symbol::LitOct | Symbol::LitDec | Symbol::LitHex
        )
    }

    /// Maps a keyword lexeme to its symbol, or `None` for plain identifiers.
    pub(crate) fn keyword(lexeme: &[u8]) -> Option<Symbol> {
        let sym = match lexeme {
            b"USE" => Symbol::KwUse,
            b"POLICY" => Symbol::KwPolicy,
            b"DEFAULT" => Symbol::KwDefault,
            b"ALLOW" => Symbol::KwAllow,
            b"LOG" => Symbol::KwLog,
            b"KILL_PROCESS" => Symbol::KwKillProcess,
            b"KILL_THREAD" => Symbol::KwKillThread,
            b"USER_NOTIF" => Symbol::KwUserNotif,
            b"ERRNO" => Symbol::KwErrno,
            b"TRAP" => Symbol::KwTrap,
            b"TRACE" => Symbol::KwTrace,
            _ => return None,
        };
        Some(sym)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Symbol::LParen => "'('",
            Symbol::RParen => "')'",
            Symbol::LBrack => "'['",
            Symbol::RBrack => "']'",
            Symbol::LBrace => "'{'",
            Symbol::RBrace => "'}'",
            Symbol::Comma => "','",
            Symbol::At => "'@'",
            Symbol::OpNeg => "'!'",
            Symbol::OpAnd => "'&&'",
            Symbol::OpOr => "'||'",
            Symbol::OpPlus => "'+'",
            Symbol::OpMinus => "'-'",
            Symbol::OpMul => "'*'",
            Symbol::OpDiv => "'/'",
            Symbol::OpLshift => "'<<'",
            Symbol::OpRshift => "'>>'",
            Symbol::OpBand => "'&'",
            Symbol::OpBor => "'|'",
            Symbol::OpBxor => "'^'",
            Symbol::OpEq => "'=='",
            Symbol::OpNe => "'!='",
            Symbol::OpLt => "'<'",
            Symbol::OpLte => "'<='",
            Symbol::OpGt => "'>'",
            Symbol::OpGte => "'>='",
            Symbol::LitBin => "binary literal",
            Symbol::LitOct => "octal literal",
            Symbol::LitDec => "decimal literal",
            Symbol::LitHex => "hex literal",
            Symbol::KwUse => "'USE'",
            Symbol::KwPolicy => "'POLICY'",
            Symbol::KwDefault => "'DEFAULT'",
            Symbol::KwAllow => "'ALLOW'",
            Symbol::KwLog => "'LOG'",
            Symbol::KwKillProcess => "'KILL_PROCESS'",
            Symbol::KwKillThread => "'KILL_THREAD'",
            Symbol::KwUserNotif => "'USER_NOTIF'",
            Symbol::KwErrno => "'ERRNO'",
            Symbol::KwTrap => "'TRAP'",
            Symbol::KwTrace => "'TRACE'",
            Symbol::Identifier => "identifier",
            Symbol::Unknown => "unrecognised byte",
            Symbol::End => "end of input",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_case_sensitive() {
        assert_eq!(Symbol::keyword(b"POLICY"), Some(Symbol::KwPolicy));
        assert_eq!(Symbol::keyword(b"policy"), None);
        assert_eq!(Symbol::keyword(b"Policy"), None);
        assert_eq!(Symbol::keyword(b"io_setup"), None);
    }

    #[test]
    fn literal_classification() {
        assert!(Symbol::LitHex.is_int_literal());
        assert!(!Symbol::Identifier.is_int_literal());
        assert!(!Symbol::End.is_int_literal());
    }
}
