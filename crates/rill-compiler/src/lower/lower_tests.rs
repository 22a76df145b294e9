use indoc::indoc;

use crate::binder::bound::{BoundProgram, BoundStmt};
use crate::compilation::Compilation;
use crate::source::SourceText;

fn lowered(source: &str) -> BoundProgram {
    let compilation = Compilation::new(SourceText::new(source));
    compilation.check().unwrap_or_else(|error| {
        panic!(
            "expected a clean program, got: {}",
            error.diagnostics().printer().render()
        )
    })
}

fn assert_flat(statements: &[BoundStmt]) {
    for statement in statements {
        assert!(
            !matches!(
                statement,
                BoundStmt::Block(_)
                    | BoundStmt::If { .. }
                    | BoundStmt::While { .. }
                    | BoundStmt::For { .. }
            ),
            "structured statement survived lowering: {statement:?}"
        );
    }
}

#[test]
fn no_structured_control_flow_survives() {
    let program = lowered(indoc! {"
        function f(n: int): int {
            var acc = 0
            for i = 1 to n {
                if i > 2 { acc = acc + i } else { acc = acc - 1 }
            }
            while acc > 100 {
                acc = acc / 2
                break
            }
            return acc
        }
        f(5)
    "});
    for function in program.functions.values() {
        assert_flat(&function.body);
    }
    assert_flat(&program.statements);
}

#[test]
fn if_without_else_jumps_past_the_branch() {
    let program = lowered("var a = 1 if a == 1 { a = 2 }");
    let kinds: Vec<&BoundStmt> = program.statements.iter().collect();

    // decl, goto-unless, assignment, end label
    assert_eq!(kinds.len(), 4);
    assert!(matches!(kinds[0], BoundStmt::VarDecl { .. }));
    assert!(matches!(
        kinds[1],
        BoundStmt::ConditionalGoto {
            jump_if_true: false,
            ..
        }
    ));
    assert!(matches!(kinds[2], BoundStmt::Expr(_)));
    assert!(matches!(kinds[3], BoundStmt::Label(_)));
}

#[test]
fn if_else_has_two_labels_and_an_unconditional_jump() {
    let program = lowered("var a = 1 if a == 1 { a = 2 } else { a = 3 }");
    let dump = program.dump();
    assert_eq!(dump.matches("goto Label1 unless").count(), 1);
    assert_eq!(dump.matches("goto Label2\n").count(), 1);
    assert_eq!(dump.matches("Label1:").count(), 1);
    assert_eq!(dump.matches("Label2:").count(), 1);
}

#[test]
fn while_checks_the_condition_at_the_bottom() {
    let program = lowered("var a = 0 while a < 3 { a = a + 1 }");
    let statements = &program.statements;

    // decl, goto continue, body label, body, continue label, cgoto, break label
    assert_eq!(statements.len(), 7);
    let BoundStmt::Goto(entry) = &statements[1] else {
        panic!("expected the entry goto, got {:?}", statements[1]);
    };
    let BoundStmt::Label(continue_label) = &statements[4] else {
        panic!("expected the continue label, got {:?}", statements[4]);
    };
    assert_eq!(entry, continue_label);

    let BoundStmt::ConditionalGoto {
        label,
        jump_if_true,
        ..
    } = &statements[5]
    else {
        panic!("expected the back edge, got {:?}", statements[5]);
    };
    let BoundStmt::Label(body_label) = &statements[2] else {
        panic!("expected the body label, got {:?}", statements[2]);
    };
    assert_eq!(label, body_label);
    assert!(jump_if_true);
}

#[test]
fn for_declares_a_hidden_upper_bound() {
    let program = lowered("var a = 0 for i = 1 to 5 { a = a + i }");
    let dump = program.dump();
    assert!(dump.contains("let upperBound = 5"));
    assert!(dump.contains("(i <= upperBound)"));
    assert!(dump.contains("i = (i + 1)"));
    assert_flat(&program.statements);
}

#[test]
fn break_and_continue_become_gotos_to_the_loop_labels() {
    let program = lowered("while true { if false { break } continue }");
    let dump = program.dump();
    assert!(dump.contains("goto break1"));
    assert!(dump.contains("goto continue1"));
    assert!(dump.contains("break1:"));
    assert!(dump.contains("continue1:"));
}

#[test]
fn nested_loops_get_distinct_labels() {
    let program = lowered(indoc! {"
        var a = 0
        for i = 1 to 2 {
            for j = 1 to 2 { a = a + i * j }
        }
    "});
    let dump = program.dump();
    assert!(dump.contains("break1:"));
    assert!(dump.contains("break2:"));
    assert!(dump.contains("continue1:"));
    assert!(dump.contains("continue2:"));
    assert_flat(&program.statements);
}
