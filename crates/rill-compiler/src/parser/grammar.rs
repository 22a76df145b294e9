//! Grammar productions for members and statements.
//!
//! This module implements the `parse_*` methods as an extension of
//! `Parser`. A compilation unit is a sequence of function declarations and
//! global statements; statements follow the block-structured grammar from
//! the language reference, with no statement terminators.

mod expressions;

use super::core::Parser;
use super::cst::token_sets::{EXPR_FIRST, STMT_FIRST, STMT_RECOVERY};
use super::cst::{SyntaxKind, TokenSet};

impl Parser<'_> {
    pub(super) fn parse_compilation_unit(&mut self) {
        self.start_node(SyntaxKind::CompilationUnit);

        while !self.eof() {
            match self.peek() {
                SyntaxKind::KwFunction => self.parse_function_item(),
                kind if STMT_FIRST.contains(kind) || kind.is_error_token() => {
                    if self.eof() {
                        break;
                    }
                    self.parse_statement();
                }
                _ => {
                    self.error_and_bump("a statement or function declaration");
                }
            }
        }

        self.eat_trivia();
        self.finish_node();
    }

    /// `function name(param: type, ...) : type { ... }`
    fn parse_function_item(&mut self) {
        self.start_node(SyntaxKind::FunctionItem);
        self.bump(); // 'function'

        self.peek();
        self.expect(SyntaxKind::Identifier, "a function name");
        self.parse_param_list();

        if self.peek() == SyntaxKind::Colon {
            self.parse_type_clause();
        }

        if self.peek() == SyntaxKind::BraceOpen {
            self.parse_block();
        } else {
            self.error_expected("a function body");
            self.synchronize(STMT_RECOVERY);
        }

        self.finish_node();
    }

    fn parse_param_list(&mut self) {
        self.peek();
        self.start_node(SyntaxKind::ParamList);
        if !self.expect(SyntaxKind::ParenOpen, "'('") {
            self.finish_node();
            return;
        }

        while self.peek() != SyntaxKind::ParenClose && !self.eof() {
            if self.peek() == SyntaxKind::Identifier {
                self.parse_param();
            } else {
                self.error_and_bump("a parameter name");
                continue;
            }

            if self.peek() == SyntaxKind::ParenClose || self.eof() {
                break;
            }
            if !self.eat(SyntaxKind::Comma) {
                self.error_expected("','");
                break;
            }
        }

        self.expect(SyntaxKind::ParenClose, "')'");
        self.finish_node();
    }

    /// `name: type` - the type clause is mandatory for parameters.
    fn parse_param(&mut self) {
        self.start_node(SyntaxKind::Param);
        self.bump(); // identifier
        if self.peek() == SyntaxKind::Colon {
            self.parse_type_clause();
        } else {
            self.error_expected("':' and a parameter type");
        }
        self.finish_node();
    }

    /// `: type`, `: type[]`, or `: type[size]`
    fn parse_type_clause(&mut self) {
        self.peek();
        self.start_node(SyntaxKind::TypeClause);
        self.bump(); // ':'
        self.peek();
        self.expect(SyntaxKind::Identifier, "a type name");

        if self.peek() == SyntaxKind::BracketOpen {
            self.bump();
            if self.peek() != SyntaxKind::BracketClose && self.at_set(EXPR_FIRST) {
                self.parse_expr();
            }
            self.peek();
            self.expect(SyntaxKind::BracketClose, "']'");
        }

        self.finish_node();
    }

    pub(super) fn parse_statement(&mut self) {
        match self.peek() {
            SyntaxKind::BraceOpen => self.parse_block(),
            SyntaxKind::KwVar | SyntaxKind::KwLet => self.parse_variable_declaration(),
            SyntaxKind::KwIf => self.parse_if_statement(),
            SyntaxKind::KwWhile => self.parse_while_statement(),
            SyntaxKind::KwFor => self.parse_for_statement(),
            SyntaxKind::KwBreak => self.parse_keyword_statement(SyntaxKind::BreakStmt),
            SyntaxKind::KwContinue => self.parse_keyword_statement(SyntaxKind::ContinueStmt),
            SyntaxKind::KwReturn => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_block(&mut self) {
        self.start_node(SyntaxKind::BlockStmt);
        self.bump(); // '{'

        if self.enter_recursion() {
            while self.peek() != SyntaxKind::BraceClose && !self.eof() {
                if self.at_set(STMT_FIRST) || self.peek().is_error_token() {
                    self.parse_statement();
                } else {
                    self.error_and_bump("a statement");
                }
            }
            self.exit_recursion();
        } else {
            self.synchronize(TokenSet::new(&[SyntaxKind::BraceClose]));
        }

        self.peek();
        self.expect(SyntaxKind::BraceClose, "'}'");
        self.finish_node();
    }

    /// `var name = expr`, `let name: type = expr`, `var name: int[3]`
    fn parse_variable_declaration(&mut self) {
        self.start_node(SyntaxKind::VarDeclStmt);
        self.bump(); // 'var' | 'let' | 'const'

        self.peek();
        self.expect(SyntaxKind::Identifier, "a variable name");

        if self.peek() == SyntaxKind::Colon {
            self.parse_type_clause();
        }

        if self.eat(SyntaxKind::Equals) {
            self.parse_expr();
        }

        self.finish_node();
    }

    fn parse_if_statement(&mut self) {
        self.start_node(SyntaxKind::IfStmt);
        self.bump(); // 'if'
        self.parse_expr();
        self.parse_nested_statement();

        if self.peek() == SyntaxKind::KwElse {
            self.start_node(SyntaxKind::ElseClause);
            self.bump();
            self.parse_nested_statement();
            self.finish_node();
        }

        self.finish_node();
    }

    fn parse_while_statement(&mut self) {
        self.start_node(SyntaxKind::WhileStmt);
        self.bump(); // 'while'
        self.parse_expr();
        self.parse_nested_statement();
        self.finish_node();
    }

    /// `for i = lo to hi { ... }`
    fn parse_for_statement(&mut self) {
        self.start_node(SyntaxKind::ForStmt);
        self.bump(); // 'for'

        self.peek();
        self.expect(SyntaxKind::Identifier, "a loop variable");
        self.peek();
        self.expect(SyntaxKind::Equals, "'='");
        self.parse_expr();
        self.peek();
        self.expect(SyntaxKind::KwTo, "'to'");
        self.parse_expr();
        self.parse_nested_statement();

        self.finish_node();
    }

    fn parse_keyword_statement(&mut self, kind: SyntaxKind) {
        self.start_node(kind);
        self.bump();
        self.finish_node();
    }

    /// `return` takes an expression only when one starts on the same line.
    fn parse_return_statement(&mut self) {
        self.start_node(SyntaxKind::ReturnStmt);
        self.bump(); // 'return'
        let keyword_end = self
            .last_non_trivia_end()
            .expect("just consumed the return keyword");

        if self.at_set(EXPR_FIRST) && self.on_same_line(keyword_end) {
            self.parse_expr();
        }

        self.finish_node();
    }

    fn parse_expression_statement(&mut self) {
        if self.at_set(EXPR_FIRST) || self.peek().is_error_token() {
            self.start_node(SyntaxKind::ExprStmt);
            self.parse_expr();
            self.finish_node();
        } else {
            self.error_and_bump("a statement");
        }
    }

    /// Loop and conditional bodies; recursion-guarded because nesting is
    /// driven by user input.
    fn parse_nested_statement(&mut self) {
        if !self.enter_recursion() {
            self.synchronize(TokenSet::new(&[SyntaxKind::BraceClose]));
            return;
        }
        if self.at_set(STMT_FIRST) || self.peek().is_error_token() {
            self.parse_statement();
        } else {
            self.error_expected("a statement");
        }
        self.exit_recursion();
    }
}
