//! Pratt expression parsing.
//!
//! Binary expressions use a precedence-climbing loop over a checkpoint so
//! the left operand is wrapped retroactively; the same checkpoint trick
//! turns `name[index]` followed by `=` into an index-assignment without
//! backtracking.

use super::super::core::Parser;
use super::super::cst::SyntaxKind;

/// Binding power of a prefix operator; unary operators outrank all binary
/// operators.
fn unary_precedence(kind: SyntaxKind) -> u8 {
    match kind {
        SyntaxKind::Plus | SyntaxKind::Minus | SyntaxKind::Bang | SyntaxKind::Tilde => 8,
        _ => 0,
    }
}

/// Binding power of an infix operator, high to low:
/// `* /`; `+ -`; `== !=`; `< <= > >=`; `&& &`; `|| |`; `^`.
fn binary_precedence(kind: SyntaxKind) -> u8 {
    match kind {
        SyntaxKind::Star | SyntaxKind::Slash => 7,
        SyntaxKind::Plus | SyntaxKind::Minus => 6,
        SyntaxKind::EqualsEquals | SyntaxKind::BangEquals => 5,
        SyntaxKind::Less
        | SyntaxKind::LessEquals
        | SyntaxKind::Greater
        | SyntaxKind::GreaterEquals => 4,
        SyntaxKind::AmpAmp | SyntaxKind::Amp => 3,
        SyntaxKind::PipePipe | SyntaxKind::Pipe => 2,
        SyntaxKind::Caret => 1,
        _ => 0,
    }
}

impl Parser<'_> {
    pub(in super::super) fn parse_expr(&mut self) {
        self.parse_assignment();
    }

    /// `name = expr` is detected with two tokens of lookahead; `a[i] = expr`
    /// by wrapping a parsed index expression when `=` follows.
    fn parse_assignment(&mut self) -> SyntaxKind {
        if self.peek() == SyntaxKind::Identifier && self.peek_nth(1) == SyntaxKind::Equals {
            self.start_node(SyntaxKind::AssignExpr);
            self.bump(); // name
            self.peek();
            self.bump(); // '='
            self.parse_assignment();
            self.finish_node();
            return SyntaxKind::AssignExpr;
        }

        let checkpoint = self.checkpoint();
        let kind = self.parse_binary_expr(0);
        if kind == SyntaxKind::IndexExpr && self.peek() == SyntaxKind::Equals {
            self.start_node_at(checkpoint, SyntaxKind::IndexAssignExpr);
            self.bump(); // '='
            self.parse_assignment();
            self.finish_node();
            return SyntaxKind::IndexAssignExpr;
        }
        kind
    }

    fn parse_binary_expr(&mut self, parent_precedence: u8) -> SyntaxKind {
        if !self.enter_recursion() {
            self.bump_error_token();
            return SyntaxKind::Error;
        }

        let checkpoint = self.checkpoint();
        let mut kind;

        let unary = unary_precedence(self.peek());
        if unary > 0 && unary >= parent_precedence {
            self.start_node(SyntaxKind::UnaryExpr);
            self.bump(); // operator
            self.parse_binary_expr(unary);
            self.finish_node();
            kind = SyntaxKind::UnaryExpr;
        } else {
            kind = self.parse_primary();
        }

        loop {
            let precedence = binary_precedence(self.peek());
            if precedence == 0 || precedence <= parent_precedence {
                break;
            }
            self.start_node_at(checkpoint, SyntaxKind::BinaryExpr);
            self.bump(); // operator
            self.parse_binary_expr(precedence);
            self.finish_node();
            kind = SyntaxKind::BinaryExpr;
        }

        self.exit_recursion();
        kind
    }

    fn parse_primary(&mut self) -> SyntaxKind {
        let checkpoint = self.checkpoint();

        let mut kind = match self.peek() {
            SyntaxKind::IntNumber
            | SyntaxKind::FloatNumber
            | SyntaxKind::String
            | SyntaxKind::KwTrue
            | SyntaxKind::KwFalse => {
                self.start_node(SyntaxKind::LiteralExpr);
                self.bump();
                self.finish_node();
                SyntaxKind::LiteralExpr
            }
            SyntaxKind::ParenOpen => {
                self.start_node(SyntaxKind::ParenExpr);
                self.bump();
                self.parse_expr();
                self.peek();
                self.expect(SyntaxKind::ParenClose, "')'");
                self.finish_node();
                SyntaxKind::ParenExpr
            }
            SyntaxKind::BracketOpen => self.parse_array_literal(),
            SyntaxKind::Identifier => {
                if self.peek_nth(1) == SyntaxKind::ParenOpen {
                    self.parse_call()
                } else {
                    self.start_node(SyntaxKind::NameExpr);
                    self.bump();
                    self.finish_node();
                    SyntaxKind::NameExpr
                }
            }
            kind if kind.is_error_token() && !self.eof() => {
                // The lexer already diagnosed this token.
                self.bump_error_token();
                SyntaxKind::Error
            }
            _ => {
                self.error_and_bump("an expression");
                SyntaxKind::Error
            }
        };

        while self.peek() == SyntaxKind::BracketOpen && kind != SyntaxKind::Error {
            self.start_node_at(checkpoint, SyntaxKind::IndexExpr);
            self.bump(); // '['
            self.parse_expr();
            self.peek();
            self.expect(SyntaxKind::BracketClose, "']'");
            self.finish_node();
            kind = SyntaxKind::IndexExpr;
        }

        kind
    }

    /// `[expr, expr, ...]`
    fn parse_array_literal(&mut self) -> SyntaxKind {
        self.start_node(SyntaxKind::ArrayLiteralExpr);
        self.bump(); // '['

        while self.peek() != SyntaxKind::BracketClose && !self.eof() {
            self.parse_expr();
            if self.peek() == SyntaxKind::BracketClose || self.eof() {
                break;
            }
            if !self.eat(SyntaxKind::Comma) {
                self.error_expected("','");
                break;
            }
        }

        self.peek();
        self.expect(SyntaxKind::BracketClose, "']'");
        self.finish_node();
        SyntaxKind::ArrayLiteralExpr
    }

    /// `name(arg, arg, ...)` - the argument list is a separate node so the
    /// binder can blame the separator that introduces an excess argument.
    fn parse_call(&mut self) -> SyntaxKind {
        self.start_node(SyntaxKind::CallExpr);
        self.bump(); // name

        self.peek();
        self.start_node(SyntaxKind::ArgList);
        self.bump(); // '('

        while self.peek() != SyntaxKind::ParenClose && !self.eof() {
            self.parse_expr();
            if self.peek() == SyntaxKind::ParenClose || self.eof() {
                break;
            }
            if !self.eat(SyntaxKind::Comma) {
                self.error_expected("','");
                break;
            }
        }

        self.peek();
        self.expect(SyntaxKind::ParenClose, "')'");
        self.finish_node(); // ArgList
        self.finish_node(); // CallExpr
        SyntaxKind::CallExpr
    }
}
