//! Lowering: structured control flow to labels and gotos.
//!
//! The rewriter eliminates `if`/`while`/`for` (and with them the binder's
//! `break`/`continue` gotos already point at loop labels), then flattens
//! nested blocks into a single statement list. The evaluator and the
//! control-flow graph only ever see flattened bodies.

#[cfg(test)]
mod lower_tests;

use crate::binder::bound::{BoundExpr, BoundStmt, Label};
use crate::binder::operators;
use crate::parser::SyntaxKind;
use crate::symbols::{SymbolId, Type, VariableKind, VariableSymbol};

/// Lowers a bound statement into a flat statement list. Fresh symbols for
/// hidden loop bounds draw ids from `next_symbol_id`.
pub fn lower(statement: BoundStmt, next_symbol_id: &mut u32) -> Vec<BoundStmt> {
    let mut lowerer = Lowerer {
        label_count: 0,
        next_symbol_id,
    };
    let rewritten = lowerer.rewrite_statement(statement);
    flatten(rewritten)
}

struct Lowerer<'a> {
    label_count: u32,
    next_symbol_id: &'a mut u32,
}

impl Lowerer<'_> {
    fn generate_label(&mut self) -> Label {
        self.label_count += 1;
        Label::new(format!("Label{}", self.label_count))
    }

    fn fresh_symbol_id(&mut self) -> SymbolId {
        let id = SymbolId(*self.next_symbol_id);
        *self.next_symbol_id += 1;
        id
    }

    fn rewrite_statement(&mut self, statement: BoundStmt) -> BoundStmt {
        match statement {
            BoundStmt::Block(statements) => BoundStmt::Block(
                statements
                    .into_iter()
                    .map(|s| self.rewrite_statement(s))
                    .collect(),
            ),
            BoundStmt::If {
                condition,
                then_branch,
                else_branch,
            } => self.rewrite_if(condition, *then_branch, else_branch.map(|b| *b)),
            BoundStmt::While {
                condition,
                body,
                break_label,
                continue_label,
            } => self.rewrite_while(condition, *body, break_label, continue_label),
            BoundStmt::For {
                variable,
                lower_bound,
                upper_bound,
                body,
                break_label,
                continue_label,
            } => self.rewrite_for(
                variable,
                lower_bound,
                upper_bound,
                *body,
                break_label,
                continue_label,
            ),
            other => other,
        }
    }

    /// ```text
    /// if <cond> T            goto end unless <cond>; T; end:
    /// if <cond> T else E     goto else unless <cond>; T; goto end; else:; E; end:
    /// ```
    fn rewrite_if(
        &mut self,
        condition: BoundExpr,
        then_branch: BoundStmt,
        else_branch: Option<BoundStmt>,
    ) -> BoundStmt {
        let then_branch = self.rewrite_statement(then_branch);
        match else_branch {
            None => {
                let end_label = self.generate_label();
                BoundStmt::Block(vec![
                    BoundStmt::ConditionalGoto {
                        label: end_label.clone(),
                        condition,
                        jump_if_true: false,
                    },
                    then_branch,
                    BoundStmt::Label(end_label),
                ])
            }
            Some(else_branch) => {
                let else_branch = self.rewrite_statement(else_branch);
                let else_label = self.generate_label();
                let end_label = self.generate_label();
                BoundStmt::Block(vec![
                    BoundStmt::ConditionalGoto {
                        label: else_label.clone(),
                        condition,
                        jump_if_true: false,
                    },
                    then_branch,
                    BoundStmt::Goto(end_label.clone()),
                    BoundStmt::Label(else_label),
                    else_branch,
                    BoundStmt::Label(end_label),
                ])
            }
        }
    }

    /// ```text
    /// goto continue; body:; <body>; continue:; goto body if <cond>; break:
    /// ```
    fn rewrite_while(
        &mut self,
        condition: BoundExpr,
        body: BoundStmt,
        break_label: Label,
        continue_label: Label,
    ) -> BoundStmt {
        let body = self.rewrite_statement(body);
        let body_label = self.generate_label();
        BoundStmt::Block(vec![
            BoundStmt::Goto(continue_label.clone()),
            BoundStmt::Label(body_label.clone()),
            body,
            BoundStmt::Label(continue_label),
            BoundStmt::ConditionalGoto {
                label: body_label,
                condition,
                jump_if_true: true,
            },
            BoundStmt::Label(break_label),
        ])
    }

    /// `for v = lo to hi` becomes a while over `v <= upperBound` with a
    /// hidden read-only bound and the increment placed after the loop's
    /// continue label.
    fn rewrite_for(
        &mut self,
        variable: VariableSymbol,
        lower_bound: BoundExpr,
        upper_bound: BoundExpr,
        body: BoundStmt,
        break_label: Label,
        continue_label: Label,
    ) -> BoundStmt {
        let variable_decl = BoundStmt::VarDecl {
            variable: variable.clone(),
            initializer: lower_bound,
        };

        let upper_symbol = VariableSymbol::new(
            self.fresh_symbol_id(),
            "upperBound",
            VariableKind::Local,
            true,
            Type::Int,
        );
        let upper_decl = BoundStmt::VarDecl {
            variable: upper_symbol.clone(),
            initializer: upper_bound,
        };

        let less_or_equals = operators::bind_binary(SyntaxKind::LessEquals, Type::Int, Type::Int)
            .expect("int comparison is in the operator table");
        let condition = BoundExpr::Binary {
            left: Box::new(BoundExpr::Variable(variable.clone())),
            op: less_or_equals,
            right: Box::new(BoundExpr::Variable(upper_symbol)),
        };

        let plus = operators::bind_binary(SyntaxKind::Plus, Type::Int, Type::Int)
            .expect("int addition is in the operator table");
        let increment = BoundStmt::Expr(BoundExpr::Assignment {
            variable: variable.clone(),
            value: Box::new(BoundExpr::Binary {
                left: Box::new(BoundExpr::Variable(variable)),
                op: plus,
                right: Box::new(BoundExpr::int(1)),
            }),
        });

        let while_body = BoundStmt::Block(vec![body, BoundStmt::Label(continue_label), increment]);
        let while_stmt = BoundStmt::While {
            condition,
            body: Box::new(while_body),
            break_label,
            continue_label: self.generate_label(),
        };

        let result = BoundStmt::Block(vec![variable_decl, upper_decl, while_stmt]);
        self.rewrite_statement(result)
    }
}

/// Pre-order stack traversal that concatenates every non-block statement
/// into a single list, preserving order.
fn flatten(statement: BoundStmt) -> Vec<BoundStmt> {
    let mut statements = Vec::new();
    let mut stack = vec![statement];

    while let Some(current) = stack.pop() {
        match current {
            BoundStmt::Block(children) => {
                for child in children.into_iter().rev() {
                    stack.push(child);
                }
            }
            other => statements.push(other),
        }
    }

    statements
}
