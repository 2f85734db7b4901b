//! Diagnostic log
//!
//! The checker, rule passes and lexical scan all report through
//! [`Diagnostics`]. Nothing here stops the pipeline: entries accumulate in
//! emission order so the user sees as many problems as possible at once.
//! [`Diagnostics::print`] re-orders on output — all warnings, then all
//! errors, each group truncated at its configured maximum.

use std::io::{self, Write};

use crate::parser::ast::SourcePos;

pub const DEFAULT_MAX_ERRORS: usize = 100;
pub const DEFAULT_MAX_WARNINGS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error = 1,
    Warning = 2,
    Information = 3,
    Hint = 4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

/// Half-open span over the source, in line/column coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

#[derive(Debug, Clone)]
pub struct Log {
    pub severity: Severity,
    pub message: String,
    pub range: Range,
}

/// Range covering `name` starting at a node's position.
pub fn range_from_name(pos: SourcePos, name: &str) -> Range {
    Range {
        start: Position {
            line: pos.line,
            column: pos.column,
        },
        end: Position {
            line: pos.line,
            column: pos.column + name.len() as u32,
        },
    }
}

#[derive(Debug)]
pub struct Diagnostics {
    pub logs: Vec<Log>,
    colors: bool,
    max_errors: usize,
    max_warnings: usize,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl Diagnostics {
    pub fn new() -> Self {
        Self {
            logs: Vec::new(),
            colors: false,
            max_errors: DEFAULT_MAX_ERRORS,
            max_warnings: DEFAULT_MAX_WARNINGS,
        }
    }

    pub fn with_colors(colors: bool) -> Self {
        Self {
            colors,
            ..Self::new()
        }
    }

    pub fn with_limits(max_errors: usize, max_warnings: usize) -> Self {
        Self {
            max_errors,
            max_warnings,
            ..Self::new()
        }
    }

    pub fn reset(&mut self) {
        self.logs.clear();
    }

    pub fn error(&mut self, message: impl Into<String>, range: Range) {
        self.logs.push(Log {
            severity: Severity::Error,
            message: message.into(),
            range,
        });
    }

    pub fn warning(&mut self, message: impl Into<String>, range: Range) {
        self.logs.push(Log {
            severity: Severity::Warning,
            message: message.into(),
            range,
        });
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    fn count(&self, severity: Severity) -> usize {
        self.logs.iter().filter(|l| l.severity == severity).count()
    }

    /// Renders to standard error: warnings first, then errors.
    pub fn print(&self) {
        let mut stderr = io::stderr();
        // A failed write to stderr leaves nowhere to report to.
        let _ = self.render(&mut stderr);
    }

    /// Writes the console form of the log to `out`.
    pub fn render(&self, out: &mut impl Write) -> io::Result<()> {
        let warning_prefix = if self.colors {
            "\x1b[33mWarning:\x1b[0m "
        } else {
            "Warning: "
        };
        let error_prefix = if self.colors {
            "\x1b[31mError:\x1b[0m "
        } else {
            "Error: "
        };

        for log in self
            .logs
            .iter()
            .filter(|l| l.severity == Severity::Warning)
            .take(self.max_warnings)
        {
            writeln!(out, "{}{}", warning_prefix, log.message)?;
        }
        for log in self
            .logs
            .iter()
            .filter(|l| l.severity == Severity::Error)
            .take(self.max_errors)
        {
            writeln!(out, "{}{}", error_prefix, log.message)?;
        }
        Ok(())
    }
}
