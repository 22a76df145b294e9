//! Parser state machine and low-level operations.
//!
//! The parser is resilient - it always produces a tree. Unknown tokens get
//! wrapped in `SyntaxKind::Error` nodes and consumed; missing expected
//! tokens emit a diagnostic but don't consume, so the parent production can
//! recover at its own synchronization points.

use rowan::{Checkpoint, GreenNodeBuilder, TextRange, TextSize};

use super::ast::CompilationUnit;
use super::cst::{SyntaxKind, SyntaxNode, TokenSet};
use super::lexer::{Token, lex, token_text};
use crate::diagnostics::Diagnostics;
use crate::source::SourceText;

/// Nested expressions and statements deeper than this are cut off with a
/// diagnostic instead of blowing the stack.
const MAX_DEPTH: u32 = 256;

#[derive(Debug)]
pub struct ParseResult {
    pub root: CompilationUnit,
    pub diagnostics: Diagnostics,
}

/// Parses a source text into a lossless syntax tree plus diagnostics.
pub fn parse(source: &SourceText) -> ParseResult {
    let (tokens, lex_diagnostics) = lex(source.as_str());
    let mut parser = Parser::new(source.as_str(), tokens, lex_diagnostics);
    parser.parse_compilation_unit();
    parser.finish()
}

/// Trivia tokens (whitespace, comments) are buffered and flushed as leading
/// trivia when starting a new node. This gives predictable trivia attachment
/// without backtracking.
pub struct Parser<'src> {
    pub(super) source: &'src str,
    pub(super) tokens: Vec<Token>,
    pub(super) pos: usize,
    trivia_buffer: Vec<Token>,
    builder: GreenNodeBuilder<'static>,
    pub(super) diagnostics: Diagnostics,
    depth: u32,
    depth_reported: bool,
    last_diagnostic_pos: Option<TextSize>,
}

impl<'src> Parser<'src> {
    pub(super) fn new(source: &'src str, tokens: Vec<Token>, diagnostics: Diagnostics) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
            trivia_buffer: Vec::with_capacity(4),
            builder: GreenNodeBuilder::new(),
            diagnostics,
            depth: 0,
            depth_reported: false,
            last_diagnostic_pos: None,
        }
    }

    pub(super) fn finish(mut self) -> ParseResult {
        self.drain_trivia();
        let green = self.builder.finish();
        let root = CompilationUnit::cast(SyntaxNode::new_root(green))
            .expect("parser always produces a CompilationUnit");
        ParseResult {
            root,
            diagnostics: self.diagnostics,
        }
    }

    /// Returns `Error` at EOF (acts as sentinel).
    pub(super) fn current(&self) -> SyntaxKind {
        self.tokens
            .get(self.pos)
            .map_or(SyntaxKind::Error, |t| t.kind)
    }

    pub(super) fn current_span(&self) -> TextRange {
        self.tokens
            .get(self.pos)
            .map_or_else(|| TextRange::empty(self.eof_offset()), |t| t.span)
    }

    fn eof_offset(&self) -> TextSize {
        TextSize::from(self.source.len() as u32)
    }

    pub(super) fn eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Current non-trivia kind; buffers any skipped trivia.
    pub(super) fn peek(&mut self) -> SyntaxKind {
        self.skip_trivia_to_buffer();
        self.current()
    }

    /// LL(k) lookahead past trivia.
    pub(super) fn peek_nth(&mut self, n: usize) -> SyntaxKind {
        self.skip_trivia_to_buffer();
        let mut count = 0;
        let mut pos = self.pos;
        while pos < self.tokens.len() {
            let kind = self.tokens[pos].kind;
            if !kind.is_trivia() {
                if count == n {
                    return kind;
                }
                count += 1;
            }
            pos += 1;
        }
        SyntaxKind::Error
    }

    pub(super) fn at_set(&mut self, set: TokenSet) -> bool {
        set.contains(self.peek())
    }

    fn skip_trivia_to_buffer(&mut self) {
        while self.pos < self.tokens.len() && self.tokens[self.pos].kind.is_trivia() {
            self.trivia_buffer.push(self.tokens[self.pos]);
            self.pos += 1;
        }
    }

    fn drain_trivia(&mut self) {
        for token in self.trivia_buffer.drain(..) {
            let text = token_text(self.source, &token);
            self.builder.token(token.kind.into(), text);
        }
    }

    pub(super) fn eat_trivia(&mut self) {
        self.skip_trivia_to_buffer();
        self.drain_trivia();
    }

    pub(super) fn start_node(&mut self, kind: SyntaxKind) {
        self.drain_trivia();
        self.builder.start_node(kind.into());
    }

    /// Wrap previously-parsed content using checkpoint.
    pub(super) fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        self.builder.start_node_at(checkpoint, kind.into());
    }

    pub(super) fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    pub(super) fn checkpoint(&mut self) -> Checkpoint {
        self.drain_trivia();
        self.builder.checkpoint()
    }

    pub(super) fn bump(&mut self) {
        assert!(!self.eof(), "bump called at EOF");
        self.drain_trivia();
        let token = self.tokens[self.pos];
        let text = token_text(self.source, &token);
        self.builder.token(token.kind.into(), text);
        self.pos += 1;
    }

    pub(super) fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.peek() == kind {
            self.bump();
            true
        } else {
            false
        }
    }

    /// On mismatch: emit diagnostic but don't consume (allows parent recovery).
    pub(super) fn expect(&mut self, kind: SyntaxKind, what: &str) -> bool {
        if self.eat(kind) {
            return true;
        }
        self.error_expected(what);
        false
    }

    pub(super) fn error_expected(&mut self, expected: &str) {
        let found = self.current().describe();
        let range = self.current_span();
        let pos = range.start();
        if self.last_diagnostic_pos == Some(pos) {
            return;
        }
        self.last_diagnostic_pos = Some(pos);
        self.diagnostics
            .report_unexpected_token(range, found, expected);
    }

    /// Report and consume the offending token into an `Error` node.
    pub(super) fn error_and_bump(&mut self, expected: &str) {
        self.error_expected(expected);
        if !self.eof() {
            self.start_node(SyntaxKind::Error);
            self.bump();
            self.finish_node();
        }
    }

    /// Consume an already-diagnosed malformed token without a new message.
    pub(super) fn bump_error_token(&mut self) {
        if self.eof() {
            return;
        }
        self.start_node(SyntaxKind::Error);
        self.bump();
        self.finish_node();
    }

    /// Skip forward to a token in `recovery`, wrapping the skipped run in an
    /// `Error` node. Returns whether anything was consumed.
    pub(super) fn synchronize(&mut self, recovery: TokenSet) -> bool {
        if self.eof() || self.at_set(recovery) {
            return false;
        }
        self.start_node(SyntaxKind::Error);
        while !self.eof() && !self.at_set(recovery) {
            self.bump();
        }
        self.finish_node();
        true
    }

    pub(super) fn enter_recursion(&mut self) -> bool {
        if self.depth >= MAX_DEPTH {
            if !self.depth_reported {
                self.depth_reported = true;
                let range = self.current_span();
                self.diagnostics.report_expression_too_deep(range);
            }
            return false;
        }
        self.depth += 1;
        true
    }

    pub(super) fn exit_recursion(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// End offset of the last consumed non-trivia token.
    pub(super) fn last_non_trivia_end(&self) -> Option<TextSize> {
        for i in (0..self.pos).rev() {
            if !self.tokens[i].kind.is_trivia() {
                return Some(self.tokens[i].span.end());
            }
        }
        None
    }

    /// Whether no line break separates `from` and the current token.
    pub(super) fn on_same_line(&mut self, from: TextSize) -> bool {
        self.skip_trivia_to_buffer();
        let to = self.current_span().start();
        let gap = &self.source[usize::from(from)..usize::from(to)];
        !gap.contains('\n')
    }
}
