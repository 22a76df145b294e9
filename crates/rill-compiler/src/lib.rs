//! Rill compiler front end.
//!
//! This crate provides the compilation pipeline for Rill programs:
//! - `source` - source text with offset-to-line mapping
//! - `parser` - lexer, lossless CST, and typed AST construction
//! - `binder` - name resolution, type checking, and the bound tree
//! - `lower` - reduction of structured control flow to labels and gotos
//! - `cfg` - basic-block control-flow graph and reachability analysis
//! - `diagnostics` - error collection and reporting
//! - `compilation` - high-level facade tying the stages together

pub mod binder;
pub mod cfg;
pub mod compilation;
pub mod diagnostics;
pub mod lower;
pub mod parser;
pub mod source;
pub mod symbols;

pub use compilation::{Compilation, Error};
pub use diagnostics::{Diagnostic, Diagnostics, DiagnosticsPrinter, Severity};
pub use source::SourceText;

/// Result type for compilation-facade operations.
pub type Result<T> = std::result::Result<T, Error>;
