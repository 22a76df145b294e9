//! Lexer for the Rill language.
//!
//! Produces span-based tokens without storing text - text is sliced from
//! source only when needed.
//!
//! ## Error handling
//!
//! Consecutive unrecognized characters coalesce into single `Garbage`
//! tokens rather than one error per character. Malformed tokens the lexer
//! can classify (`BadNumber`, `UnterminatedString`, `UnterminatedComment`)
//! are diagnosed here with their full span; the parser treats them as
//! already-reported and does not diagnose them again.

use logos::Logos;
use rowan::TextRange;
use std::ops::Range;

use super::cst::SyntaxKind;
use crate::diagnostics::Diagnostics;

/// Zero-copy token: kind + span, text retrieved via [`token_text`] when needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub span: TextRange,
}

impl Token {
    #[inline]
    pub fn new(kind: SyntaxKind, span: TextRange) -> Self {
        Self { kind, span }
    }
}

fn range_to_text_range(range: Range<usize>) -> TextRange {
    TextRange::new((range.start as u32).into(), (range.end as u32).into())
}

/// Tokenizes source into a vector of span-based tokens plus diagnostics.
pub fn lex(source: &str) -> (Vec<Token>, Diagnostics) {
    let mut tokens = Vec::new();
    let mut diagnostics = Diagnostics::new();
    let mut lexer = SyntaxKind::lexer(source);
    let mut error_start: Option<usize> = None;

    let flush_garbage = |start: usize, end: usize, tokens: &mut Vec<Token>, diagnostics: &mut Diagnostics| {
        let range = range_to_text_range(start..end);
        let first = source[start..].chars().next().unwrap_or('\u{fffd}');
        diagnostics.report_bad_character(range, first);
        tokens.push(Token::new(SyntaxKind::Garbage, range));
    };

    loop {
        match lexer.next() {
            Some(Ok(kind)) => {
                if let Some(start) = error_start.take() {
                    flush_garbage(start, lexer.span().start, &mut tokens, &mut diagnostics);
                }

                let span = range_to_text_range(lexer.span());
                match kind {
                    SyntaxKind::BadNumber => {
                        diagnostics.report_invalid_number(span, lexer.slice(), "int");
                    }
                    SyntaxKind::UnterminatedString => {
                        diagnostics.report_unterminated_string(span);
                    }
                    SyntaxKind::UnterminatedComment => {
                        diagnostics.report_unterminated_comment(span);
                    }
                    _ => {}
                }
                tokens.push(Token::new(kind, span));
            }
            Some(Err(())) => {
                if error_start.is_none() {
                    error_start = Some(lexer.span().start);
                }
            }
            None => {
                if let Some(start) = error_start.take() {
                    flush_garbage(start, source.len(), &mut tokens, &mut diagnostics);
                }
                break;
            }
        }
    }

    (tokens, diagnostics)
}

/// Retrieves the text slice for a token. O(1) slice into source.
#[inline]
pub fn token_text<'s>(source: &'s str, token: &Token) -> &'s str {
    &source[std::ops::Range::<usize>::from(token.span)]
}
