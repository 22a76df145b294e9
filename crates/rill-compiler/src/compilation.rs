//! Compilation facade tying the pipeline stages together.
//!
//! A `Compilation` owns one parsed submission and its bound global scope.
//! REPL sessions chain compilations through the previous global scope so
//! earlier declarations stay visible; script runs use a single compilation.

use std::sync::Arc;

use crate::binder::bound::BoundProgram;
use crate::binder::{self, BoundGlobalScope};
use crate::diagnostics::Diagnostics;
use crate::parser::{self, ParseResult};
use crate::source::SourceText;

/// Errors produced by [`Compilation::check`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("parsing failed with {} error(s)", .0.error_count())]
    ParseError(Diagnostics),

    #[error("analysis failed with {} error(s)", .0.error_count())]
    AnalyzeError(Diagnostics),
}

impl Error {
    pub fn diagnostics(&self) -> &Diagnostics {
        match self {
            Error::ParseError(diagnostics) | Error::AnalyzeError(diagnostics) => diagnostics,
        }
    }
}

pub struct Compilation {
    source: SourceText,
    parse: ParseResult,
    global_scope: Arc<BoundGlobalScope>,
}

impl Compilation {
    /// Parses and binds a standalone submission.
    pub fn new(source: SourceText) -> Self {
        Self::bind(source, None)
    }

    /// Parses and binds a submission on top of an earlier one.
    pub fn with_previous(previous: Arc<BoundGlobalScope>, source: SourceText) -> Self {
        Self::bind(source, Some(previous))
    }

    fn bind(source: SourceText, previous: Option<Arc<BoundGlobalScope>>) -> Self {
        let parse = parser::parse(&source);
        let global_scope = Arc::new(binder::bind_global_scope(previous, &parse.root));
        Self {
            source,
            parse,
            global_scope,
        }
    }

    pub fn source(&self) -> &SourceText {
        &self.source
    }

    pub fn syntax_root(&self) -> &parser::ast::CompilationUnit {
        &self.parse.root
    }

    pub fn parse_diagnostics(&self) -> &Diagnostics {
        &self.parse.diagnostics
    }

    pub fn global_scope(&self) -> &Arc<BoundGlobalScope> {
        &self.global_scope
    }

    /// Binds function bodies and lowers everything. Callable regardless of
    /// diagnostics; evaluation clients should go through [`check`].
    ///
    /// [`check`]: Compilation::check
    pub fn bind_program(&self) -> BoundProgram {
        binder::bind_program(&self.global_scope)
    }

    /// All diagnostics from every stage, in pipeline order.
    pub fn diagnostics(&self) -> Diagnostics {
        let mut diagnostics = self.parse.diagnostics.clone();
        diagnostics.extend(self.global_scope.diagnostics.clone());
        diagnostics.extend(self.bind_program().diagnostics);
        diagnostics
    }

    /// Gate before evaluation: returns the bound program only when no stage
    /// reported a diagnostic.
    pub fn check(&self) -> Result<BoundProgram, Error> {
        if !self.parse.diagnostics.is_empty() {
            let mut diagnostics = self.parse.diagnostics.clone();
            diagnostics.extend(self.global_scope.diagnostics.clone());
            return Err(Error::ParseError(diagnostics));
        }

        let program = self.bind_program();
        let mut diagnostics = self.global_scope.diagnostics.clone();
        diagnostics.extend(program.diagnostics.clone());
        if !diagnostics.is_empty() {
            return Err(Error::AnalyzeError(diagnostics));
        }

        Ok(program)
    }
}

#[cfg(test)]
mod compilation_tests {
    use super::*;

    fn check_err(source: &str) -> Diagnostics {
        match Compilation::new(SourceText::new(source)).check() {
            Ok(_) => panic!("expected diagnostics for {source:?}"),
            Err(error) => error.diagnostics().clone(),
        }
    }

    #[test]
    fn clean_program_checks() {
        let compilation = Compilation::new(SourceText::new("var a = 10 a * a"));
        let program = compilation.check().expect("program should be clean");
        assert!(!program.statements.is_empty());
    }

    #[test]
    fn read_only_assignment_is_rejected() {
        let diagnostics = check_err("let x = 3 x = 4");
        assert!(
            diagnostics
                .iter()
                .any(|d| d.message.contains("read-only") || d.message.contains("cannot assign"))
        );
    }

    #[test]
    fn missing_return_path_is_rejected() {
        let diagnostics = check_err("function bad(n: int): int { if n > 0 { return 1 } }");
        assert!(
            diagnostics
                .iter()
                .any(|d| d.message.contains("all code paths must return"))
        );
    }

    #[test]
    fn binder_diagnostics_are_stable_across_reruns() {
        let source = "var a = b + 1 let c = 2 c = 3";
        let first = check_err(source);
        let second = check_err(source);
        assert_eq!(first, second);
    }

    #[test]
    fn repl_chaining_sees_previous_declarations() {
        let first = Compilation::new(SourceText::new("var shared = 41"));
        assert!(first.check().is_ok());

        let second = Compilation::with_previous(
            first.global_scope().clone(),
            SourceText::new("shared + 1"),
        );
        assert!(second.check().is_ok());
    }

    #[test]
    fn repl_redeclaration_shadows_previous_submission() {
        let first = Compilation::new(SourceText::new("var x = 1"));
        assert!(first.check().is_ok());

        // A fresh submission may redeclare a name from an earlier one.
        let second =
            Compilation::with_previous(first.global_scope().clone(), SourceText::new("var x = 2"));
        assert!(second.check().is_ok());
    }

    #[test]
    fn parse_errors_refuse_evaluation() {
        let compilation = Compilation::new(SourceText::new("var = "));
        assert!(matches!(compilation.check(), Err(Error::ParseError(_))));
    }
}
