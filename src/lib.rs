//! # Introduction
//!
//! Fekal is the compiler front-end for a small declarative policy language
//! describing system-call filters grouped under named policies. The runtime
//! target is a seccomp-style allow/deny engine; this crate stops at a
//! validated AST plus a diagnostic log — no code generation.
//!
//! ## Compilation pipeline
//!
//! ```text
//! Bytes → Reader → Parser (PEG + packrat) → AST → Checker → Diagnostics
//! ```
//!
//! 1. [`parser`] — pull lexer, left-recursion-capable PEG with per-rule
//!    memoization, and the AST types.
//! 2. [`checker`] — lexical scopes, symbol resolution, and the semantic
//!    rules (policy uniqueness, `USE` resolution, parameter hygiene), plus
//!    per-syscall rule passes such as the `open`/`openat` flag vocabulary.
//! 3. [`diagnostics`] — the ordered error/warning log with source ranges.
//! 4. [`printer`] — human-readable AST dump and a source re-printer.
//! 5. [`compiler`] — the facade tying the passes together; what the CLI
//!    drives.
//!
//! Everything is synchronous and single-threaded: one compilation owns its
//! [`checker::context::Context`] and [`diagnostics::Diagnostics`] and
//! returns when done.

pub mod checker;
pub mod compiler;
pub mod diagnostics;
pub mod parser;
pub mod printer;
pub mod visitor;
