//! Compiler diagnostics.
//!
//! Every stage of the pipeline appends to a [`Diagnostics`] collection
//! instead of aborting; clients decide how to render or serialize them.
//! The `report_*` constructors own the message wording so it stays
//! consistent between the lexer, parser, and binder.

mod printer;


use rowan::TextRange;
use serde::Serialize;

use crate::source::SourceText;

pub use printer::DiagnosticsPrinter;

/// Severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A single message anchored to a span of the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub range: TextRange,
    pub message: String,
}

impl Diagnostic {
    pub fn error(range: TextRange, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            range,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Resolves the span against `source` into a serializable record.
    pub fn to_record(&self, source: &SourceText) -> DiagnosticRecord {
        let (line, column) = source.line_column(self.range.start());
        DiagnosticRecord {
            severity: self.severity,
            message: self.message.clone(),
            line,
            column,
            start: self.range.start().into(),
            length: self.range.len().into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at {}..{}: {}",
            self.severity,
            u32::from(self.range.start()),
            u32::from(self.range.end()),
            self.message
        )
    }
}

/// Location-resolved diagnostic, 1-based line and column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticRecord {
    pub severity: Severity,
    pub message: String,
    pub line: usize,
    pub column: usize,
    pub start: u32,
    pub length: u32,
}

/// Append-only collection of diagnostics from lexing, parsing, and binding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    pub fn has_errors(&self) -> bool {
        self.0.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.0.iter().filter(|d| d.is_error()).count()
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.0.extend(other.0);
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.0
    }

    pub fn printer<'d, 's>(&'d self) -> DiagnosticsPrinter<'d, 's> {
        DiagnosticsPrinter::new(self)
    }

    pub fn to_records(&self, source: &SourceText) -> Vec<DiagnosticRecord> {
        self.0.iter().map(|d| d.to_record(source)).collect()
    }

    fn error(&mut self, range: TextRange, message: impl Into<String>) {
        self.0.push(Diagnostic::error(range, message));
    }

    // --- lexer ---

    pub fn report_bad_character(&mut self, range: TextRange, character: char) {
        self.error(range, format!("bad character in input: '{character}'"));
    }

    pub fn report_unterminated_string(&mut self, range: TextRange) {
        self.error(range, "unterminated string literal");
    }

    pub fn report_unterminated_comment(&mut self, range: TextRange) {
        self.error(range, "unterminated block comment");
    }

    pub fn report_invalid_number(&mut self, range: TextRange, text: &str, ty: &str) {
        self.error(range, format!("the number '{text}' is not a valid {ty}"));
    }

    pub fn report_invalid_escape(&mut self, range: TextRange) {
        self.error(range, "invalid escape sequence in string literal");
    }

    // --- parser ---

    pub fn report_unexpected_token(&mut self, range: TextRange, found: &str, expected: &str) {
        self.error(range, format!("unexpected {found}, expected {expected}"));
    }

    pub fn report_expression_too_deep(&mut self, range: TextRange) {
        self.error(range, "expression nesting is too deep");
    }

    // --- binder ---

    pub fn report_undefined_name(&mut self, range: TextRange, name: &str) {
        self.error(range, format!("undefined name '{name}'"));
    }

    pub fn report_undefined_type(&mut self, range: TextRange, name: &str) {
        self.error(range, format!("type '{name}' does not exist"));
    }

    pub fn report_undefined_function(&mut self, range: TextRange, name: &str) {
        self.error(range, format!("undefined function '{name}'"));
    }

    pub fn report_undefined_unary_operator(&mut self, range: TextRange, op: &str, operand: &str) {
        self.error(
            range,
            format!("unary operator '{op}' is not defined for type {operand}"),
        );
    }

    pub fn report_undefined_binary_operator(
        &mut self,
        range: TextRange,
        op: &str,
        left: &str,
        right: &str,
    ) {
        self.error(
            range,
            format!("binary operator '{op}' is not defined for types {left} and {right}"),
        );
    }

    pub fn report_symbol_already_declared(&mut self, range: TextRange, name: &str) {
        self.error(range, format!("'{name}' is already declared in this scope"));
    }

    pub fn report_parameter_already_declared(&mut self, range: TextRange, name: &str) {
        self.error(range, format!("parameter '{name}' is already declared"));
    }

    pub fn report_cannot_convert(&mut self, range: TextRange, from: &str, to: &str) {
        self.error(range, format!("cannot convert type {from} to {to}"));
    }

    pub fn report_cannot_convert_implicitly(&mut self, range: TextRange, from: &str, to: &str) {
        self.error(
            range,
            format!(
                "cannot convert type {from} to {to} implicitly (an explicit conversion exists)"
            ),
        );
    }

    pub fn report_cannot_assign(&mut self, range: TextRange, name: &str) {
        self.error(
            range,
            format!("variable '{name}' is read-only and cannot be assigned to"),
        );
    }

    pub fn report_wrong_argument_count(
        &mut self,
        range: TextRange,
        name: &str,
        expected: usize,
        actual: usize,
    ) {
        self.error(
            range,
            format!("function '{name}' expects {expected} argument(s) but was given {actual}"),
        );
    }

    pub fn report_expression_must_have_value(&mut self, range: TextRange) {
        self.error(range, "expression must have a value");
    }

    pub fn report_invalid_break_or_continue(&mut self, range: TextRange, keyword: &str) {
        self.error(
            range,
            format!("'{keyword}' can only be used inside of a loop"),
        );
    }

    pub fn report_invalid_return(&mut self, range: TextRange) {
        self.error(range, "'return' can only be used inside of a function");
    }

    pub fn report_invalid_return_expression(&mut self, range: TextRange, function: &str) {
        self.error(
            range,
            format!("function '{function}' does not return a value"),
        );
    }

    pub fn report_missing_return_expression(&mut self, range: TextRange, ty: &str) {
        self.error(range, format!("an expression of type {ty} is expected"));
    }

    pub fn report_all_paths_must_return(&mut self, range: TextRange) {
        self.error(range, "all code paths must return a value");
    }

    pub fn report_invalid_array_access(&mut self, range: TextRange) {
        self.error(range, "only arrays and strings can be indexed");
    }

    pub fn report_invalid_array_index(&mut self, range: TextRange) {
        self.error(range, "array index must be an int");
    }

    pub fn report_invalid_array_size(&mut self, range: TextRange) {
        self.error(range, "array size must be an integer literal");
    }

    pub fn report_array_size_mismatch(&mut self, range: TextRange, actual: usize, expected: i64) {
        self.error(
            range,
            format!("array initializer has {actual} element(s) but the declared size is {expected}"),
        );
    }

    pub fn report_array_size_not_specified(&mut self, range: TextRange) {
        self.error(
            range,
            "array declaration needs a size or an initializer",
        );
    }

    pub fn report_invalid_array_initializer(&mut self, range: TextRange) {
        self.error(
            range,
            "array initializers are only allowed in variable declarations",
        );
    }

    pub fn report_type_mismatch(&mut self, range: TextRange, expected: &str, actual: &str) {
        self.error(
            range,
            format!("expected a value of type {expected} but found {actual}"),
        );
    }

    pub fn report_invalid_assignment_target(&mut self, range: TextRange) {
        self.error(range, "only variables can be assigned through an index");
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
