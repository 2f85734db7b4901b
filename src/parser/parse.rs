//! Parse entry point
//!
//! [`parse`] drives the PEG over a complete source buffer and produces the
//! ordered list of top-level [`ProgramStatement`]s. Recoverable problems are
//! not reported here — lexically bad bytes are skipped by the reader and a
//! statement that fails to match simply ends the parse — so the only error
//! is the fatal "no match": input remains but no `ProgramStmt` alternative
//! accepts it.

use thiserror::Error;

use super::ast::ProgramStatement;
use super::peg::ParseSession;
use super::reader::Reader;
use super::statements;

/// Fatal parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("no match at line {line}, column {column}")]
    NoMatch { line: u32, column: u32 },
}

/// Parses a complete source buffer into a program.
///
/// An empty (or all-whitespace) buffer is a valid empty program.
pub fn parse(input: &[u8]) -> Result<Vec<ProgramStatement>, ParseError> {
    let session = ParseSession::new();
    let mut reader = Reader::new(input);
    let mut program = Vec::new();

    if !reader.next() {
        return Ok(program);
    }
    loop {
        match statements::program_stmt(&session, &mut reader) {
            Some(stmt) => program.push(stmt),
            None => {
                return Err(ParseError::NoMatch {
                    line: reader.line(),
                    column: reader.column(),
                })
            }
        }
        if !reader.next() {
            return Ok(program);
        }
    }
}
