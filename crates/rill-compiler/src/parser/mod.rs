//! Parser infrastructure for the Rill language.
//!
//! # Architecture
//!
//! The parser produces a lossless concrete syntax tree (CST) via Rowan's
//! green tree builder:
//!
//! - Zero-copy lexing: tokens carry spans, text is sliced only when building
//!   tree nodes
//! - Trivia buffering: whitespace/comments are collected, then attached as
//!   leading trivia of the next node
//! - Checkpoint-based wrapping: binary operands, index expressions, and
//!   index assignments wrap already-parsed nodes retroactively
//! - The parser always produces a tree; malformed input lands in
//!   `SyntaxKind::Error` nodes alongside diagnostics

pub mod ast;
mod core;
mod cst;
mod grammar;
mod lexer;

#[cfg(test)]
mod ast_tests;
#[cfg(test)]
mod grammar_tests;
#[cfg(test)]
mod lexer_tests;

pub use core::{ParseResult, parse};
pub use cst::{RillLang, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken, TokenSet};
pub use lexer::{Token, lex, token_text};

/// Renders a syntax tree as an indented list of node kinds and tokens.
/// Trivia is omitted. Used by tests and the REPL's `#showTree`.
pub fn dump_tree(node: &SyntaxNode) -> String {
    let mut out = String::new();
    dump_node(node, 0, &mut out);
    out
}

fn dump_node(node: &SyntaxNode, depth: usize, out: &mut String) {
    use std::fmt::Write;

    writeln!(out, "{}{:?}", "  ".repeat(depth), node.kind()).unwrap();
    for child in node.children_with_tokens() {
        match child {
            SyntaxElement::Node(child) => dump_node(&child, depth + 1, out),
            SyntaxElement::Token(token) => {
                if !token.kind().is_trivia() {
                    writeln!(
                        out,
                        "{}{:?} {:?}",
                        "  ".repeat(depth + 1),
                        token.kind(),
                        token.text()
                    )
                    .unwrap();
                }
            }
        }
    }
}
