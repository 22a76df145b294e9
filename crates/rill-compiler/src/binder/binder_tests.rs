use super::bound::{BoundExpr, BoundStmt};
use super::{BoundGlobalScope, bind_global_scope};
use crate::compilation::Compilation;
use crate::parser;
use crate::source::SourceText;
use crate::symbols::Type;

/// All diagnostic messages for a source, across every stage.
fn messages(source: &str) -> Vec<String> {
    Compilation::new(SourceText::new(source))
        .diagnostics()
        .iter()
        .map(|d| d.message.clone())
        .collect()
}

fn assert_clean(source: &str) {
    let messages = messages(source);
    assert!(messages.is_empty(), "expected no diagnostics, got {messages:?}");
}

fn assert_message(source: &str, needle: &str) {
    let messages = messages(source);
    assert!(
        messages.iter().any(|m| m.contains(needle)),
        "expected a diagnostic containing {needle:?}, got {messages:?}"
    );
}

fn clean_global_scope(source: &str) -> BoundGlobalScope {
    let parse = parser::parse(&SourceText::new(source));
    assert!(parse.diagnostics.is_empty());
    let scope = bind_global_scope(None, &parse.root);
    assert!(
        scope.diagnostics.is_empty(),
        "unexpected diagnostics: {:?}",
        scope.diagnostics
    );
    scope
}

#[test]
fn undefined_name() {
    assert_message("missing + 1", "undefined name 'missing'");
}

#[test]
fn undefined_operators() {
    assert_message("1 + true", "binary operator '+' is not defined for types int and bool");
    assert_message("!1", "unary operator '!' is not defined for type int");
    assert_message("\"a\" - \"b\"", "binary operator '-' is not defined");
}

#[test]
fn error_operands_do_not_cascade() {
    // One undefined name, no follow-on operator diagnostics.
    let messages = messages("missing * 2 + 1");
    assert_eq!(messages.len(), 1, "got {messages:?}");
}

#[test]
fn implicit_conversion_rules() {
    assert_clean("var x: any = 5");
    assert_clean("var x: float = 5");
    assert_clean("var total: any = [1, 2]");
    assert_message("var x: int = \"42\"", "implicitly");
    assert_message("var x: int = 1.5", "implicitly");
    assert_message("var x: bool = 1", "cannot convert type int to bool");
}

#[test]
fn explicit_conversions_use_type_calls() {
    assert_clean("var x = int(\"42\")");
    assert_clean("var s = string(42)");
    assert_clean("var f = float(\"1.5\")");
    assert_clean("var n = int(1.5)");
}

#[test]
fn read_only_variables_cannot_be_assigned() {
    assert_message("let x = 3 x = 4", "read-only");
    assert_message("const x = 3 x = 4", "read-only");
    assert_clean("var x = 3 x = 4");
}

#[test]
fn duplicate_declarations() {
    assert_message("var x = 1 var x = 2", "already declared");
    assert_message(
        "function f() { } function f() { }",
        "already declared",
    );
    assert_message("function f(a: int, a: int) { }", "parameter 'a' is already declared");
}

#[test]
fn break_and_continue_require_a_loop() {
    assert_message("break", "'break' can only be used inside of a loop");
    assert_message("continue", "'continue' can only be used inside of a loop");
    assert_clean("while true { break }");
    assert_clean("for i = 1 to 3 { continue }");
}

#[test]
fn return_rules() {
    assert_message("return", "'return' can only be used inside of a function");
    assert_message(
        "function f() { return 1 }",
        "function 'f' does not return a value",
    );
    assert_message(
        "function f(): int { return }",
        "an expression of type int is expected",
    );
    assert_clean("function f(): int { return 1 }");
    assert_clean("function f() { return }");
}

#[test]
fn return_expression_converts_to_the_return_type() {
    assert_clean("function f(): float { return 1 }");
    assert_message("function f(): int { return \"no\" }", "implicitly");
}

#[test]
fn call_diagnostics() {
    assert_message("nope()", "undefined function 'nope'");
    assert_message("print(\"a\", \"b\")", "expects 1 argument(s) but was given 2");
    assert_message("print()", "expects 1 argument(s) but was given 0");
    assert_message("print(1)", "implicitly");
}

#[test]
fn excess_argument_blames_the_first_extra_separator() {
    let compilation = Compilation::new(SourceText::new("print(\"a\", \"b\")"));
    let diagnostics = compilation.diagnostics();
    let diagnostic = diagnostics
        .iter()
        .find(|d| d.message.contains("expects 1 argument"))
        .expect("expected an argument-count diagnostic");
    // The span runs from the comma that introduces the excess argument
    // through the closing parenthesis.
    assert_eq!(u32::from(diagnostic.range.start()), 9);
    assert_eq!(
        u32::from(diagnostic.range.end()),
        "print(\"a\", \"b\")".len() as u32
    );
}

#[test]
fn void_calls_cannot_be_used_as_values() {
    assert_message("var x = print(\"a\")", "expression must have a value");
}

#[test]
fn array_diagnostics() {
    assert_message("var x = 1 x[0]", "only arrays and strings can be indexed");
    assert_message("var a = [1] a[true]", "array index must be an int");
    assert_message("var a: int[2] = [1]", "declared size is 2");
    assert_message("var a: int[]", "needs a size or an initializer");
    assert_message("var a: int[x]", "array size must be an integer literal");
    assert_message("[1, 2]", "only allowed in variable declarations");
    assert_message("var a = [1] a[0] = true", "expected a value of type int");
    assert_message("var a = [1] f()[0] = 1", "only variables can be assigned through an index");
}

#[test]
fn array_declarations_bind() {
    assert_clean("var a: int[3]");
    assert_clean("var a: int[2] = [1, 2]");
    assert_clean("var a = [1, 2, 3] a[0] = 9");
    assert_clean("var s = \"abc\" var c = s[1]");
    assert_clean("function sum(xs: int[]): int { return size(xs) }");
}

#[test]
fn string_index_yields_a_string() {
    let scope = clean_global_scope("var s = \"abc\" var c = s[0]");
    let BoundStmt::VarDecl { variable, .. } = &scope.statements[1] else {
        panic!("expected a declaration");
    };
    assert_eq!(variable.ty, Type::String);
}

#[test]
fn shadowing_resolves_to_the_innermost_declaration() {
    let scope = clean_global_scope("{ var x = 10 { var x = true x } }");
    let BoundStmt::Block(outer) = &scope.statements[0] else {
        panic!("expected a block");
    };
    let BoundStmt::VarDecl { variable: outer_x, .. } = &outer[0] else {
        panic!("expected outer declaration");
    };
    let BoundStmt::Block(inner) = &outer[1] else {
        panic!("expected inner block");
    };
    let BoundStmt::VarDecl { variable: inner_x, .. } = &inner[0] else {
        panic!("expected inner declaration");
    };
    let BoundStmt::Expr(BoundExpr::Variable(read)) = &inner[1] else {
        panic!("expected a variable read");
    };

    assert_eq!(outer_x.ty, Type::Int);
    assert_eq!(inner_x.ty, Type::Bool);
    assert_ne!(outer_x.id, inner_x.id);
    assert_eq!(read.id, inner_x.id);
}

#[test]
fn sibling_scopes_resolve_to_the_outer_declaration() {
    let scope = clean_global_scope("{ var x = 10 { var x = true } x }");
    let BoundStmt::Block(outer) = &scope.statements[0] else {
        panic!("expected a block");
    };
    let BoundStmt::VarDecl { variable: outer_x, .. } = &outer[0] else {
        panic!("expected outer declaration");
    };
    let BoundStmt::Expr(BoundExpr::Variable(read)) = &outer[2] else {
        panic!("expected a variable read");
    };
    assert_eq!(read.id, outer_x.id);
}

#[test]
fn for_variable_is_scoped_to_the_loop() {
    assert_message("for i = 1 to 3 { } i", "undefined name 'i'");
}

#[test]
fn functions_are_visible_before_their_declaration() {
    assert_clean("var x = twice(2) function twice(n: int): int { return n * 2 }");
}

#[test]
fn conditions_must_be_boolean() {
    assert_message("if 1 { }", "cannot convert type int to bool");
    assert_message("while \"s\" { }", "cannot convert type string to bool");
    assert_clean("if true { } else { }");
}
