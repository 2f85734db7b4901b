//! Compilation pipeline facade
//!
//! [`Compiler`] owns the [`Context`] and [`Diagnostics`] for one compilation
//! and wires the passes together: lexical error scan → parse → semantic
//! checks → per-syscall rules. Only a parse failure aborts the pipeline;
//! everything else accumulates in the diagnostic log.

use tracing::debug;

use crate::checker::{self, context::Context, syscalls};
use crate::diagnostics::{range_from_name, Diagnostics};
use crate::parser::ast::{ProgramStatement, SourcePos};
use crate::parser::reader::Reader;
use crate::parser::token::Symbol;
use crate::parser::{parse, ParseError};

pub struct Compiler {
    context: Context,
    diagnostics: Diagnostics,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler {
    pub fn new() -> Self {
        Self {
            context: Context::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn with_colors(colors: bool) -> Self {
        Self {
            context: Context::new(),
            diagnostics: Diagnostics::with_colors(colors),
        }
    }

    /// Clears all state so the compiler can be reused for another source.
    pub fn reset(&mut self) {
        self.context.reset();
        self.diagnostics.reset();
    }

    /// Runs the full pipeline over a source buffer.
    pub fn compile(&mut self, source: &[u8]) -> Result<Vec<ProgramStatement>, ParseError> {
        self.scan_lexical_errors(source);
        let ast = parse(source)?;
        debug!(statements = ast.len(), "parsed program");

        checker::check(&mut self.context, &mut self.diagnostics, &ast);
        syscalls::check(&mut self.context, &mut self.diagnostics, &ast);
        debug!(
            errors = self.diagnostics.error_count(),
            warnings = self.diagnostics.warning_count(),
            "semantic checks finished"
        );
        Ok(ast)
    }

    /// Reports every unrecognised byte with its position. The parser skips
    /// these tokens, so this scan is what surfaces them to the user.
    fn scan_lexical_errors(&mut self, source: &[u8]) {
        let mut reader = Reader::new(source);
        while reader.next_raw() {
            if reader.symbol() != Symbol::Unknown {
                continue;
            }
            let shown = match reader.literal() {
                [b] if b.is_ascii_graphic() || *b == b' ' => (*b as char).to_string(),
                [b] => format!("\\x{:02x}", b),
                other => String::from_utf8_lossy(other).into_owned(),
            };
            let pos = SourcePos::new(reader.line(), reader.column());
            let range = range_from_name(pos, &shown);
            self.diagnostics
                .error(format!("Unexpected character `{}`", shown), range);
        }
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Prints the diagnostic log to standard error.
    pub fn print_diagnostics(&self) {
        self.diagnostics.print();
    }
}
