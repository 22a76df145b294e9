//! Basic-block control-flow graph over lowered statement lists.
//!
//! Blocks and branches live in flat arenas and reference each other by
//! index. The graph answers the all-paths-return question for non-void
//! functions and renders itself as Graphviz DOT for inspection.

#[cfg(test)]
mod cfg_tests;

use std::collections::HashMap;

use crate::binder::bound::{BoundExpr, BoundStmt, Label};
use crate::binder::operators;
use crate::parser::SyntaxKind;
use crate::symbols::Type;

pub type BlockId = usize;
pub type BranchId = usize;

#[derive(Debug)]
pub struct BasicBlock {
    pub statements: Vec<BoundStmt>,
    pub is_start: bool,
    pub is_end: bool,
    pub incoming: Vec<BranchId>,
    pub outgoing: Vec<BranchId>,
    removed: bool,
}

impl BasicBlock {
    fn new() -> Self {
        Self {
            statements: Vec::new(),
            is_start: false,
            is_end: false,
            incoming: Vec::new(),
            outgoing: Vec::new(),
            removed: false,
        }
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    fn display(&self) -> String {
        if self.is_start {
            return "<start>".to_string();
        }
        if self.is_end {
            return "<end>".to_string();
        }
        let mut out = String::new();
        crate::binder::bound::dump_statements(&self.statements, 0, &mut out);
        out
    }
}

#[derive(Debug)]
pub struct Branch {
    pub from: BlockId,
    pub to: BlockId,
    /// `None` is an unconditional edge.
    pub condition: Option<BoundExpr>,
    removed: bool,
}

#[derive(Debug)]
pub struct ControlFlowGraph {
    pub blocks: Vec<BasicBlock>,
    pub branches: Vec<Branch>,
    pub start: BlockId,
    pub end: BlockId,
}

impl ControlFlowGraph {
    /// Splits a flattened body into basic blocks and connects them.
    pub fn build(body: &[BoundStmt]) -> Self {
        let mut builder = GraphBuilder::new();
        builder.build(split_into_blocks(body));
        builder.prune();
        builder.finish()
    }

    /// True iff every path from start reaches a `return` before `<end>`.
    pub fn all_paths_return(body: &[BoundStmt]) -> bool {
        let graph = Self::build(body);
        graph.blocks[graph.end]
            .incoming
            .iter()
            .filter(|&&branch| !graph.branches[branch].removed)
            .all(|&branch| {
                let from = &graph.blocks[graph.branches[branch].from];
                matches!(from.statements.last(), Some(BoundStmt::Return(_)))
            })
    }

    /// Renders the graph in Graphviz DOT format.
    pub fn write_dot(&self, w: &mut impl std::io::Write) -> std::io::Result<()> {
        writeln!(w, "digraph G {{")?;

        let mut names = HashMap::new();
        let mut next = 0usize;
        for (id, block) in self.blocks.iter().enumerate() {
            if block.removed {
                continue;
            }
            names.insert(id, format!("N{next}"));
            next += 1;
        }

        for (id, block) in self.blocks.iter().enumerate() {
            if block.removed {
                continue;
            }
            let label = quote_dot(block.display().trim_end());
            writeln!(w, "    {} [label = {label} shape = box]", names[&id])?;
        }

        for branch in &self.branches {
            if branch.removed {
                continue;
            }
            let label = match &branch.condition {
                Some(condition) => quote_dot(&condition.to_string()),
                None => "\"\"".to_string(),
            };
            writeln!(
                w,
                "    {} -> {} [label = {label}]",
                names[&branch.from], names[&branch.to]
            )?;
        }

        writeln!(w, "}}")
    }
}

fn quote_dot(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Splits the statement list on labels (which start a block) and on jumps
/// and returns (which end one).
fn split_into_blocks(body: &[BoundStmt]) -> Vec<Vec<BoundStmt>> {
    let mut blocks = Vec::new();
    let mut current: Vec<BoundStmt> = Vec::new();

    for statement in body {
        match statement {
            BoundStmt::Label(_) => {
                if !current.is_empty() {
                    blocks.push(std::mem::take(&mut current));
                }
                current.push(statement.clone());
            }
            BoundStmt::Goto(_) | BoundStmt::ConditionalGoto { .. } | BoundStmt::Return(_) => {
                current.push(statement.clone());
                blocks.push(std::mem::take(&mut current));
            }
            BoundStmt::VarDecl { .. } | BoundStmt::Expr(_) => {
                current.push(statement.clone());
            }
            BoundStmt::Block(_)
            | BoundStmt::If { .. }
            | BoundStmt::While { .. }
            | BoundStmt::For { .. } => {
                unreachable!("structured statement survived lowering")
            }
        }
    }

    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

struct GraphBuilder {
    blocks: Vec<BasicBlock>,
    branches: Vec<Branch>,
    start: BlockId,
    end: BlockId,
}

impl GraphBuilder {
    fn new() -> Self {
        let mut start = BasicBlock::new();
        start.is_start = true;
        Self {
            blocks: vec![start],
            branches: Vec::new(),
            start: 0,
            end: 0,
        }
    }

    fn build(&mut self, block_statements: Vec<Vec<BoundStmt>>) {
        let first_body_block = self.blocks.len();
        for statements in block_statements {
            let mut block = BasicBlock::new();
            block.statements = statements;
            self.blocks.push(block);
        }
        let mut end = BasicBlock::new();
        end.is_end = true;
        self.blocks.push(end);
        self.end = self.blocks.len() - 1;

        let mut block_from_label: HashMap<Label, BlockId> = HashMap::new();
        for id in first_body_block..self.end {
            for statement in &self.blocks[id].statements {
                if let BoundStmt::Label(label) = statement {
                    block_from_label.insert(label.clone(), id);
                }
            }
        }

        if first_body_block == self.end {
            self.connect(self.start, self.end, None);
        } else {
            self.connect(self.start, first_body_block, None);
        }

        for id in first_body_block..self.end {
            let next = if id + 1 == self.end { self.end } else { id + 1 };
            let last = self.blocks[id]
                .statements
                .last()
                .cloned()
                .expect("basic blocks are never empty");

            match last {
                BoundStmt::Goto(label) => {
                    let to = block_from_label[&label];
                    self.connect(id, to, None);
                }
                BoundStmt::ConditionalGoto {
                    label,
                    condition,
                    jump_if_true,
                } => {
                    let to = block_from_label[&label];
                    let negated = negate(&condition);
                    let (then_condition, else_condition) = if jump_if_true {
                        (condition, negated)
                    } else {
                        (negated, condition)
                    };
                    self.connect(id, to, Some(then_condition));
                    self.connect(id, next, Some(else_condition));
                }
                BoundStmt::Return(_) => {
                    self.connect(id, self.end, None);
                }
                _ => {
                    self.connect(id, next, None);
                }
            }
        }
    }

    /// A literal `true` condition becomes an unconditional edge; a literal
    /// `false` drops the edge entirely.
    fn connect(&mut self, from: BlockId, to: BlockId, condition: Option<BoundExpr>) {
        let condition = match condition {
            Some(expr) => match expr.as_bool_literal() {
                Some(true) => None,
                Some(false) => return,
                None => Some(expr),
            },
            None => None,
        };

        let branch = self.branches.len();
        self.branches.push(Branch {
            from,
            to,
            condition,
            removed: false,
        });
        self.blocks[from].outgoing.push(branch);
        self.blocks[to].incoming.push(branch);
    }

    /// Repeatedly removes blocks no live edge reaches.
    fn prune(&mut self) {
        loop {
            let mut changed = false;
            for id in 0..self.blocks.len() {
                let block = &self.blocks[id];
                if block.is_start || block.is_end || block.removed {
                    continue;
                }
                let has_live_incoming = block
                    .incoming
                    .iter()
                    .any(|&branch| !self.branches[branch].removed);
                if has_live_incoming {
                    continue;
                }

                self.blocks[id].removed = true;
                let dead: Vec<BranchId> = self.blocks[id]
                    .incoming
                    .iter()
                    .chain(&self.blocks[id].outgoing)
                    .copied()
                    .collect();
                for branch in dead {
                    self.branches[branch].removed = true;
                }
                changed = true;
            }
            if !changed {
                break;
            }
        }
    }

    fn finish(self) -> ControlFlowGraph {
        ControlFlowGraph {
            blocks: self.blocks,
            branches: self.branches,
            start: self.start,
            end: self.end,
        }
    }
}

/// Negates a branch condition, folding literal booleans.
fn negate(condition: &BoundExpr) -> BoundExpr {
    if let Some(value) = condition.as_bool_literal() {
        return BoundExpr::Literal {
            value: crate::binder::bound::Const::Bool(!value),
            ty: Type::Bool,
        };
    }
    let not = operators::bind_unary(SyntaxKind::Bang, Type::Bool)
        .expect("boolean negation is in the operator table");
    BoundExpr::Unary {
        op: not,
        operand: Box::new(condition.clone()),
    }
}
