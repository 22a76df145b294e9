use super::ast::{self, Expr, Member, Stmt};
use super::parse;
use crate::source::SourceText;

fn root(input: &str) -> ast::CompilationUnit {
    let result = parse(&SourceText::new(input));
    assert!(result.diagnostics.is_empty());
    result.root
}

#[test]
fn members_split_functions_and_statements() {
    let unit = root("function f() { } var a = 1 f()");
    let members: Vec<_> = unit.members().collect();
    assert_eq!(members.len(), 3);
    assert!(matches!(members[0], Member::Function(_)));
    assert!(matches!(members[1], Member::GlobalStatement(Stmt::VarDecl(_))));
    assert!(matches!(members[2], Member::GlobalStatement(Stmt::Expr(_))));
}

#[test]
fn function_accessors() {
    let unit = root("function add(a: int, b: string[]): int { return 0 }");
    let function = unit.functions().next().unwrap();
    assert_eq!(function.name().unwrap().text(), "add");

    let params: Vec<_> = function.params().collect();
    assert_eq!(params.len(), 2);
    assert_eq!(params[0].name().unwrap().text(), "a");
    assert!(!params[0].type_clause().unwrap().is_array());
    assert_eq!(params[1].name().unwrap().text(), "b");
    assert!(params[1].type_clause().unwrap().is_array());

    let return_type = function.return_type().unwrap();
    assert_eq!(return_type.type_name().unwrap().text(), "int");
    assert!(!return_type.is_array());
    assert!(function.body().is_some());
}

#[test]
fn variable_declaration_accessors() {
    let unit = root("let total: int[2] = [1, 2]");
    let Some(Member::GlobalStatement(Stmt::VarDecl(decl))) = unit.members().next() else {
        panic!("expected a variable declaration");
    };
    assert!(decl.is_read_only());
    assert_eq!(decl.name().unwrap().text(), "total");

    let clause = decl.type_clause().unwrap();
    assert!(clause.is_array());
    assert!(clause.size().is_some());

    let Some(Expr::ArrayLiteral(init)) = decl.initializer() else {
        panic!("expected an array literal initializer");
    };
    assert_eq!(init.elements().count(), 2);
}

#[test]
fn const_marks_read_only() {
    let unit = root("const x = 1");
    let Some(Member::GlobalStatement(Stmt::VarDecl(decl))) = unit.members().next() else {
        panic!("expected a variable declaration");
    };
    assert!(decl.is_read_only());
    assert_eq!(decl.keyword().unwrap().text(), "const");
}

#[test]
fn if_accessors_distinguish_branches() {
    let unit = root("if x { 1 } else { 2 }");
    let Some(Member::GlobalStatement(Stmt::If(node))) = unit.members().next() else {
        panic!("expected an if statement");
    };
    assert!(matches!(node.condition(), Some(Expr::Name(_))));
    assert!(matches!(node.then_branch(), Some(Stmt::Block(_))));
    assert!(node.else_clause().unwrap().statement().is_some());
}

#[test]
fn for_bounds_are_ordered() {
    let unit = root("for i = 1 to 9 { }");
    let Some(Member::GlobalStatement(Stmt::For(node))) = unit.members().next() else {
        panic!("expected a for statement");
    };
    assert_eq!(node.variable().unwrap().text(), "i");
    assert_eq!(node.lower_bound().unwrap().as_cst().text().to_string(), "1");
    assert_eq!(node.upper_bound().unwrap().as_cst().text().to_string(), "9");
}

#[test]
fn call_argument_separators() {
    let unit = root("f(1, 2, 3)");
    let Some(Member::GlobalStatement(Stmt::Expr(stmt))) = unit.members().next() else {
        panic!("expected an expression statement");
    };
    let Some(Expr::Call(call)) = stmt.expression() else {
        panic!("expected a call");
    };
    let args = call.arg_list().unwrap();
    assert_eq!(args.args().count(), 3);
    assert_eq!(args.separators().count(), 2);
    assert!(args.close_paren().is_some());
}

#[test]
fn index_assignment_accessors() {
    let unit = root("a[1] = 2");
    let Some(Member::GlobalStatement(Stmt::Expr(stmt))) = unit.members().next() else {
        panic!("expected an expression statement");
    };
    let Some(Expr::IndexAssign(assign)) = stmt.expression() else {
        panic!("expected an index assignment");
    };
    let target = assign.target().unwrap();
    assert!(matches!(target.base(), Some(Expr::Name(_))));
    assert!(matches!(target.index(), Some(Expr::Literal(_))));
    assert!(matches!(assign.value(), Some(Expr::Literal(_))));
}

#[test]
fn string_decoding() {
    let (decoded, bad) = ast::decode_string_literal(r#""a\nb\t\"q\"""#);
    assert_eq!(decoded, "a\nb\t\"q\"");
    assert!(bad.is_empty());

    let (decoded, bad) = ast::decode_string_literal(r#""a\qb""#);
    assert_eq!(decoded, "aqb");
    assert_eq!(bad.len(), 1);
}
