use super::lexer::{lex, token_text};

/// Format tokens without trivia (default for most tests)
fn snapshot(input: &str) -> String {
    format_tokens(input, false)
}

/// Format tokens with trivia included
fn snapshot_raw(input: &str) -> String {
    format_tokens(input, true)
}

fn format_tokens(input: &str, include_trivia: bool) -> String {
    let (tokens, _) = lex(input);
    let mut out = String::new();
    for token in tokens {
        if include_trivia || !token.kind.is_trivia() {
            out.push_str(&format!(
                "{:?} {:?}\n",
                token.kind,
                token_text(input, &token)
            ));
        }
    }
    out
}

fn messages(input: &str) -> Vec<String> {
    let (_, diagnostics) = lex(input);
    diagnostics.iter().map(|d| d.message.clone()).collect()
}

#[test]
fn punctuation() {
    insta::assert_snapshot!(snapshot("( ) { } [ ] , : ;"), @r#"
    ParenOpen "("
    ParenClose ")"
    BraceOpen "{"
    BraceClose "}"
    BracketOpen "["
    BracketClose "]"
    Comma ","
    Colon ":"
    Semicolon ";"
    "#);
}

#[test]
fn operators() {
    insta::assert_snapshot!(snapshot("+ - * / ~ ^ ! = < > & |"), @r#"
    Plus "+"
    Minus "-"
    Star "*"
    Slash "/"
    Tilde "~"
    Caret "^"
    Bang "!"
    Equals "="
    Less "<"
    Greater ">"
    Amp "&"
    Pipe "|"
    "#);
}

#[test]
fn digraphs_take_precedence() {
    insta::assert_snapshot!(snapshot("== != <= >= && ||"), @r#"
    EqualsEquals "=="
    BangEquals "!="
    LessEquals "<="
    GreaterEquals ">="
    AmpAmp "&&"
    PipePipe "||"
    "#);
}

#[test]
fn adjacent_digraphs() {
    insta::assert_snapshot!(snapshot("a==b"), @r#"
    Identifier "a"
    EqualsEquals "=="
    Identifier "b"
    "#);
}

#[test]
fn keywords() {
    insta::assert_snapshot!(snapshot("var let if else while for to function break continue return"), @r#"
    KwVar "var"
    KwLet "let"
    KwIf "if"
    KwElse "else"
    KwWhile "while"
    KwFor "for"
    KwTo "to"
    KwFunction "function"
    KwBreak "break"
    KwContinue "continue"
    KwReturn "return"
    "#);
}

#[test]
fn const_is_a_read_only_keyword() {
    insta::assert_snapshot!(snapshot("const true false"), @r#"
    KwLet "const"
    KwTrue "true"
    KwFalse "false"
    "#);
}

#[test]
fn identifiers() {
    insta::assert_snapshot!(snapshot("foo Bar truthy f1"), @r#"
    Identifier "foo"
    Identifier "Bar"
    Identifier "truthy"
    Identifier "f1"
    "#);
}

#[test]
fn numbers() {
    insta::assert_snapshot!(snapshot("0 42 3.14"), @r#"
    IntNumber "0"
    IntNumber "42"
    FloatNumber "3.14"
    "#);
}

#[test]
fn number_followed_by_letters_is_malformed() {
    insta::assert_snapshot!(snapshot("123abc"), @r#"
    BadNumber "123abc"
    "#);
    let messages = messages("123abc");
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("not a valid int"));
}

#[test]
fn string_literals() {
    insta::assert_snapshot!(snapshot(r#""hi" "a\"b""#), @r#"
    String "\"hi\""
    String "\"a\\\"b\""
    "#);
}

#[test]
fn unterminated_string_stops_at_newline() {
    insta::assert_snapshot!(snapshot("\"abc\nx"), @r#"
    UnterminatedString "\"abc"
    Identifier "x"
    "#);
    assert!(messages("\"abc\nx")[0].contains("unterminated string"));
}

#[test]
fn unterminated_string_at_end_of_input() {
    assert!(messages("\"abc").iter().any(|m| m.contains("unterminated string")));
}

#[test]
fn comments_are_trivia() {
    insta::assert_snapshot!(snapshot_raw("1 // rest\n2"), @r#"
    IntNumber "1"
    Whitespace " "
    LineComment "// rest"
    Whitespace "\n"
    IntNumber "2"
    "#);
}

#[test]
fn block_comments() {
    insta::assert_snapshot!(snapshot_raw("1/* x */2"), @r#"
    IntNumber "1"
    BlockComment "/* x */"
    IntNumber "2"
    "#);
}

#[test]
fn block_comment_with_stars() {
    insta::assert_snapshot!(snapshot_raw("/*a**/"), @r#"
    BlockComment "/*a**/"
    "#);
}

#[test]
fn unterminated_block_comment() {
    insta::assert_snapshot!(snapshot_raw("/* open"), @r#"
    UnterminatedComment "/* open"
    "#);
    assert!(messages("/* open")[0].contains("unterminated block comment"));
}

#[test]
fn bad_characters_coalesce() {
    insta::assert_snapshot!(snapshot("a @# b"), @r#"
    Identifier "a"
    Garbage "@#"
    Identifier "b"
    "#);
    let messages = messages("a @# b");
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("bad character"));
}

#[test]
fn empty_input() {
    let (tokens, diagnostics) = lex("");
    assert!(tokens.is_empty());
    assert!(diagnostics.is_empty());
}

#[test]
fn spans_cover_the_source() {
    let (tokens, _) = lex("var x = 1");
    let reconstructed: String = tokens.iter().map(|t| token_text("var x = 1", t)).collect();
    assert_eq!(reconstructed, "var x = 1");
}
