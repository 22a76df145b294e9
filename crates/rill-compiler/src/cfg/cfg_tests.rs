use super::ControlFlowGraph;
use crate::binder::bound::BoundStmt;
use crate::compilation::Compilation;
use crate::source::SourceText;

/// Binds and lowers a single-function program, returning the function body.
fn function_body(source: &str) -> Vec<BoundStmt> {
    let compilation = Compilation::new(SourceText::new(source));
    let program = compilation.bind_program();
    let function = program
        .functions
        .values()
        .next()
        .expect("expected one function");
    function.body.clone()
}

#[test]
fn straight_line_return_covers_all_paths() {
    let body = function_body("function f(): int { return 1 }");
    assert!(ControlFlowGraph::all_paths_return(&body));
}

#[test]
fn missing_else_return_leaves_a_fallthrough_path() {
    let body = function_body("function f(n: int): int { if n > 0 { return 1 } }");
    assert!(!ControlFlowGraph::all_paths_return(&body));
}

#[test]
fn both_branches_returning_cover_all_paths() {
    let body = function_body(
        "function f(n: int): int { if n > 0 { return 1 } else { return 2 } }",
    );
    assert!(ControlFlowGraph::all_paths_return(&body));
}

#[test]
fn code_after_while_true_is_unreachable_and_pruned() {
    // `while true` never falls through, so the missing return after the
    // loop is not a reachable path.
    let body = function_body("function f(): int { while true { return 1 } }");
    assert!(ControlFlowGraph::all_paths_return(&body));
}

#[test]
fn empty_body_never_returns() {
    let body = function_body("function f(): int { }");
    assert!(!ControlFlowGraph::all_paths_return(&body));
}

#[test]
fn recursive_function_with_tail_return() {
    let body = function_body(
        "function fac(n: int): int { if n <= 1 { return 1 } return n * fac(n - 1) }",
    );
    assert!(ControlFlowGraph::all_paths_return(&body));
}

#[test]
fn graph_has_start_and_end_sentinels() {
    let body = function_body("function f(): int { return 1 }");
    let graph = ControlFlowGraph::build(&body);
    assert!(graph.blocks[graph.start].is_start);
    assert!(graph.blocks[graph.end].is_end);
    assert!(!graph.blocks[graph.start].is_removed());
}

#[test]
fn literal_false_condition_drops_the_edge() {
    // The loop back-edge is `goto body if true`... with a literal false
    // condition the body becomes unreachable and is pruned.
    let body = function_body("function f(): int { while false { } return 1 }");
    let graph = ControlFlowGraph::build(&body);
    assert!(graph.blocks.iter().any(|block| block.is_removed()));
    assert!(ControlFlowGraph::all_paths_return(&body));
}

#[test]
fn dot_output_lists_blocks_and_edges() {
    let body = function_body("function f(n: int): int { if n > 0 { return 1 } return 2 }");
    let graph = ControlFlowGraph::build(&body);
    let mut out = Vec::new();
    graph.write_dot(&mut out).unwrap();
    let dot = String::from_utf8(out).unwrap();

    assert!(dot.starts_with("digraph G {"));
    assert!(dot.trim_end().ends_with('}'));
    assert!(dot.contains("<start>"));
    assert!(dot.contains("<end>"));
    assert!(dot.contains("->"));
    assert!(dot.contains("(n > 0)"));
}
