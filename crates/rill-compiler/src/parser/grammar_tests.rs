use super::{dump_tree, parse};
use crate::source::SourceText;

/// Parses `input`, asserting it is syntactically clean, and dumps the CST.
fn check(input: &str) -> String {
    let result = parse(&SourceText::new(input));
    assert!(
        result.diagnostics.is_empty(),
        "unexpected diagnostics for {input:?}: {}",
        result.diagnostics.printer().render()
    );
    dump_tree(result.root.as_cst())
}

fn check_with_errors(input: &str) -> (String, Vec<String>) {
    let result = parse(&SourceText::new(input));
    let messages = result
        .diagnostics
        .iter()
        .map(|d| d.message.clone())
        .collect();
    (dump_tree(result.root.as_cst()), messages)
}

#[test]
fn variable_declaration() {
    insta::assert_snapshot!(check("var a = 10"), @r#"
    CompilationUnit
      VarDeclStmt
        KwVar "var"
        Identifier "a"
        Equals "="
        LiteralExpr
          IntNumber "10"
    "#);
}

#[test]
fn read_only_declaration_with_type() {
    insta::assert_snapshot!(check("let x: string = \"s\""), @r#"
    CompilationUnit
      VarDeclStmt
        KwLet "let"
        Identifier "x"
        TypeClause
          Colon ":"
          Identifier "string"
        Equals "="
        LiteralExpr
          String "\"s\""
    "#);
}

#[test]
fn array_declaration_with_size() {
    insta::assert_snapshot!(check("var a: int[3]"), @r#"
    CompilationUnit
      VarDeclStmt
        KwVar "var"
        Identifier "a"
        TypeClause
          Colon ":"
          Identifier "int"
          BracketOpen "["
          LiteralExpr
            IntNumber "3"
          BracketClose "]"
    "#);
}

#[test]
fn array_literal_initializer() {
    insta::assert_snapshot!(check("var a = [1, 2]"), @r#"
    CompilationUnit
      VarDeclStmt
        KwVar "var"
        Identifier "a"
        Equals "="
        ArrayLiteralExpr
          BracketOpen "["
          LiteralExpr
            IntNumber "1"
          Comma ","
          LiteralExpr
            IntNumber "2"
          BracketClose "]"
    "#);
}

#[test]
fn precedence_multiplication_binds_tighter() {
    insta::assert_snapshot!(check("1 + 2 * 3"), @r#"
    CompilationUnit
      ExprStmt
        BinaryExpr
          LiteralExpr
            IntNumber "1"
          Plus "+"
          BinaryExpr
            LiteralExpr
              IntNumber "2"
            Star "*"
            LiteralExpr
              IntNumber "3"
    "#);
}

#[test]
fn addition_is_left_associative() {
    insta::assert_snapshot!(check("1 + 2 + 3"), @r#"
    CompilationUnit
      ExprStmt
        BinaryExpr
          BinaryExpr
            LiteralExpr
              IntNumber "1"
            Plus "+"
            LiteralExpr
              IntNumber "2"
          Plus "+"
          LiteralExpr
            IntNumber "3"
    "#);
}

#[test]
fn unary_and_parenthesized() {
    insta::assert_snapshot!(check("-(1 + 2)"), @r#"
    CompilationUnit
      ExprStmt
        UnaryExpr
          Minus "-"
          ParenExpr
            ParenOpen "("
            BinaryExpr
              LiteralExpr
                IntNumber "1"
              Plus "+"
              LiteralExpr
                IntNumber "2"
            ParenClose ")"
    "#);
}

#[test]
fn assignment_is_right_associative() {
    insta::assert_snapshot!(check("a = b = 1"), @r#"
    CompilationUnit
      ExprStmt
        AssignExpr
          Identifier "a"
          Equals "="
          AssignExpr
            Identifier "b"
            Equals "="
            LiteralExpr
              IntNumber "1"
    "#);
}

#[test]
fn index_assignment_wraps_the_index_expression() {
    insta::assert_snapshot!(check("a[0] = 1"), @r#"
    CompilationUnit
      ExprStmt
        IndexAssignExpr
          IndexExpr
            NameExpr
              Identifier "a"
            BracketOpen "["
            LiteralExpr
              IntNumber "0"
            BracketClose "]"
          Equals "="
          LiteralExpr
            IntNumber "1"
    "#);
}

#[test]
fn call_with_arguments() {
    insta::assert_snapshot!(check("add(1, 2)"), @r#"
    CompilationUnit
      ExprStmt
        CallExpr
          Identifier "add"
          ArgList
            ParenOpen "("
            LiteralExpr
              IntNumber "1"
            Comma ","
            LiteralExpr
              IntNumber "2"
            ParenClose ")"
    "#);
}

#[test]
fn if_with_else() {
    insta::assert_snapshot!(check("if true { 1 } else { 2 }"), @r#"
    CompilationUnit
      IfStmt
        KwIf "if"
        LiteralExpr
          KwTrue "true"
        BlockStmt
          BraceOpen "{"
          ExprStmt
            LiteralExpr
              IntNumber "1"
          BraceClose "}"
        ElseClause
          KwElse "else"
          BlockStmt
            BraceOpen "{"
            ExprStmt
              LiteralExpr
                IntNumber "2"
            BraceClose "}"
    "#);
}

#[test]
fn while_loop() {
    insta::assert_snapshot!(check("while x < 3 { break }"), @r#"
    CompilationUnit
      WhileStmt
        KwWhile "while"
        BinaryExpr
          NameExpr
            Identifier "x"
          Less "<"
          LiteralExpr
            IntNumber "3"
        BlockStmt
          BraceOpen "{"
          BreakStmt
            KwBreak "break"
          BraceClose "}"
    "#);
}

#[test]
fn for_loop() {
    insta::assert_snapshot!(check("for i = 1 to 3 { continue }"), @r#"
    CompilationUnit
      ForStmt
        KwFor "for"
        Identifier "i"
        Equals "="
        LiteralExpr
          IntNumber "1"
        KwTo "to"
        LiteralExpr
          IntNumber "3"
        BlockStmt
          BraceOpen "{"
          ContinueStmt
            KwContinue "continue"
          BraceClose "}"
    "#);
}

#[test]
fn function_declaration() {
    insta::assert_snapshot!(check("function add(a: int, b: int): int { return a + b }"), @r#"
    CompilationUnit
      FunctionItem
        KwFunction "function"
        Identifier "add"
        ParamList
          ParenOpen "("
          Param
            Identifier "a"
            TypeClause
              Colon ":"
              Identifier "int"
          Comma ","
          Param
            Identifier "b"
            TypeClause
              Colon ":"
              Identifier "int"
          ParenClose ")"
        TypeClause
          Colon ":"
          Identifier "int"
        BlockStmt
          BraceOpen "{"
          ReturnStmt
            KwReturn "return"
            BinaryExpr
              NameExpr
                Identifier "a"
              Plus "+"
              NameExpr
                Identifier "b"
          BraceClose "}"
    "#);
}

#[test]
fn return_expression_must_start_on_the_same_line() {
    insta::assert_snapshot!(check("function f(): int { return 1 }"), @r#"
    CompilationUnit
      FunctionItem
        KwFunction "function"
        Identifier "f"
        ParamList
          ParenOpen "("
          ParenClose ")"
        TypeClause
          Colon ":"
          Identifier "int"
        BlockStmt
          BraceOpen "{"
          ReturnStmt
            KwReturn "return"
            LiteralExpr
              IntNumber "1"
          BraceClose "}"
    "#);

    // With a line break, the value belongs to the next statement.
    insta::assert_snapshot!(check("function f() { return\n1 }"), @r#"
    CompilationUnit
      FunctionItem
        KwFunction "function"
        Identifier "f"
        ParamList
          ParenOpen "("
          ParenClose ")"
        BlockStmt
          BraceOpen "{"
          ReturnStmt
            KwReturn "return"
          ExprStmt
            LiteralExpr
              IntNumber "1"
          BraceClose "}"
    "#);
}

#[test]
fn missing_variable_name_recovers() {
    let (tree, messages) = check_with_errors("var = 1");
    assert!(messages.iter().any(|m| m.contains("expected a variable name")));
    assert!(tree.contains("VarDeclStmt"));
    assert!(tree.contains("IntNumber \"1\""));
}

#[test]
fn missing_closing_paren_recovers() {
    let (tree, messages) = check_with_errors("print(1");
    assert!(messages.iter().any(|m| m.contains("expected ')'")));
    assert!(tree.contains("CallExpr"));
}

#[test]
fn parser_is_total_on_garbage() {
    for input in ["@@@", "function } ) 1 +", "{{{{", "= = =", "\"", "1 +"] {
        let result = parse(&SourceText::new(input));
        assert_eq!(result.root.as_cst().kind(), super::SyntaxKind::CompilationUnit);
        assert!(!result.diagnostics.is_empty(), "expected diagnostics for {input:?}");
    }
}

#[test]
fn lossless_tree_reconstructs_source() {
    let input = "var a = 1 // trailing\nif a == 1 { print(\"one\") }";
    let result = parse(&SourceText::new(input));
    assert_eq!(result.root.as_cst().text().to_string(), input);
}
