//! Syntax kinds for the Rill language.
//!
//! `SyntaxKind` serves dual roles: token kinds (from the lexer) and node
//! kinds (from the parser). Logos derives token recognition; node kinds lack
//! token/regex attributes. `RillLang` implements Rowan's `Language` trait
//! for tree construction.

use logos::Logos;
use rowan::Language;

/// All token and node kinds. Tokens first, then nodes, then `__LAST`
/// sentinel. `#[repr(u16)]` enables safe transmute in `kind_from_raw`.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum SyntaxKind {
    #[token("(")]
    ParenOpen = 0,

    #[token(")")]
    ParenClose,

    #[token("{")]
    BraceOpen,

    #[token("}")]
    BraceClose,

    #[token("[")]
    BracketOpen,

    #[token("]")]
    BracketClose,

    #[token(",")]
    Comma,

    #[token(":")]
    Colon,

    #[token(";")]
    Semicolon,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("~")]
    Tilde,

    #[token("^")]
    Caret,

    /// `&&` defined before `&` for correct digraph precedence.
    #[token("&&")]
    AmpAmp,

    #[token("&")]
    Amp,

    #[token("||")]
    PipePipe,

    #[token("|")]
    Pipe,

    #[token("!=")]
    BangEquals,

    #[token("!")]
    Bang,

    #[token("==")]
    EqualsEquals,

    #[token("=")]
    Equals,

    #[token("<=")]
    LessEquals,

    #[token("<")]
    Less,

    #[token(">=")]
    GreaterEquals,

    #[token(">")]
    Greater,

    #[regex("[0-9]+")]
    IntNumber,

    #[regex(r"[0-9]+\.[0-9]+")]
    FloatNumber,

    /// Digits immediately followed by letters, e.g. `123abc`.
    #[regex("[0-9]+[A-Za-z][A-Za-z0-9]*")]
    BadNumber,

    #[regex(r#""(?:[^"\\\n\r]|\\[^\n\r])*""#)]
    String,

    /// A string literal cut off by a newline or end of input.
    #[regex(r#""(?:[^"\\\n\r]|\\[^\n\r])*"#)]
    UnterminatedString,

    #[token("true")]
    KwTrue,

    #[token("false")]
    KwFalse,

    #[token("var")]
    KwVar,

    /// `let` and `const` both declare read-only variables.
    #[token("let")]
    #[token("const")]
    KwLet,

    #[token("if")]
    KwIf,

    #[token("else")]
    KwElse,

    #[token("while")]
    KwWhile,

    #[token("for")]
    KwFor,

    #[token("to")]
    KwTo,

    #[token("function")]
    KwFunction,

    #[token("break")]
    KwBreak,

    #[token("continue")]
    KwContinue,

    #[token("return")]
    KwReturn,

    /// Defined after keywords so they take precedence.
    #[regex("[A-Za-z][A-Za-z0-9]*")]
    Identifier,

    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,

    #[regex("//[^\n]*", allow_greedy = true)]
    LineComment,

    #[regex(r"/\*(?:[^*]|\*+[^*/])*\*+/")]
    BlockComment,

    /// A block comment cut off by end of input.
    #[regex(r"/\*(?:[^*]|\*+[^*/])*\*?")]
    UnterminatedComment,

    /// Coalesced unrecognized characters.
    Garbage,
    Error,

    // --- Node kinds (non-terminals) ---
    CompilationUnit,
    FunctionItem,
    ParamList,
    Param,
    TypeClause,
    BlockStmt,
    VarDeclStmt,
    IfStmt,
    ElseClause,
    WhileStmt,
    ForStmt,
    BreakStmt,
    ContinueStmt,
    ReturnStmt,
    ExprStmt,
    LiteralExpr,
    NameExpr,
    ParenExpr,
    UnaryExpr,
    BinaryExpr,
    AssignExpr,
    CallExpr,
    ArgList,
    IndexExpr,
    IndexAssignExpr,
    ArrayLiteralExpr,

    // Must be last - used for bounds checking in `kind_from_raw`
    #[doc(hidden)]
    __LAST,
}

use SyntaxKind::*;

impl SyntaxKind {
    #[inline]
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            Whitespace | LineComment | BlockComment | UnterminatedComment
        )
    }

    /// Malformed tokens the lexer has already diagnosed.
    #[inline]
    pub fn is_error_token(self) -> bool {
        matches!(self, Garbage | BadNumber | UnterminatedString | Error)
    }

    /// Human-readable description used in parser diagnostics.
    pub fn describe(self) -> &'static str {
        match self {
            ParenOpen => "'('",
            ParenClose => "')'",
            BraceOpen => "'{'",
            BraceClose => "'}'",
            BracketOpen => "'['",
            BracketClose => "']'",
            Comma => "','",
            Colon => "':'",
            Semicolon => "';'",
            Plus => "'+'",
            Minus => "'-'",
            Star => "'*'",
            Slash => "'/'",
            Tilde => "'~'",
            Caret => "'^'",
            AmpAmp => "'&&'",
            Amp => "'&'",
            PipePipe => "'||'",
            Pipe => "'|'",
            BangEquals => "'!='",
            Bang => "'!'",
            EqualsEquals => "'=='",
            Equals => "'='",
            LessEquals => "'<='",
            Less => "'<'",
            GreaterEquals => "'>='",
            Greater => "'>'",
            IntNumber => "number",
            FloatNumber => "number",
            BadNumber => "malformed number",
            String => "string",
            UnterminatedString => "unterminated string",
            KwTrue => "'true'",
            KwFalse => "'false'",
            KwVar => "'var'",
            KwLet => "'let'",
            KwIf => "'if'",
            KwElse => "'else'",
            KwWhile => "'while'",
            KwFor => "'for'",
            KwTo => "'to'",
            KwFunction => "'function'",
            KwBreak => "'break'",
            KwContinue => "'continue'",
            KwReturn => "'return'",
            Identifier => "identifier",
            Garbage => "bad input",
            Error => "end of file",
            _ => "syntax node",
        }
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    #[inline]
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

/// Language tag for Rowan's tree types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RillLang {}

impl Language for RillLang {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 < __LAST as u16);
        // SAFETY: We've verified the value is in bounds, and SyntaxKind is repr(u16)
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type aliases for Rowan types parameterized by our language.
pub type SyntaxNode = rowan::SyntaxNode<RillLang>;
pub type SyntaxToken = rowan::SyntaxToken<RillLang>;
pub type SyntaxElement = rowan::NodeOrToken<SyntaxNode, SyntaxToken>;

/// 64-bit bitset of `SyntaxKind`s for O(1) membership testing.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TokenSet(u64);

impl TokenSet {
    /// Panics at compile time if any kind's discriminant >= 64.
    #[inline]
    pub const fn new(kinds: &[SyntaxKind]) -> Self {
        let mut bits = 0u64;
        let mut i = 0;
        while i < kinds.len() {
            let kind = kinds[i] as u16;
            assert!(kind < 64, "SyntaxKind value exceeds TokenSet capacity");
            bits |= 1 << kind;
            i += 1;
        }
        TokenSet(bits)
    }

    #[inline]
    pub const fn contains(&self, kind: SyntaxKind) -> bool {
        let kind = kind as u16;
        if kind >= 64 {
            return false;
        }
        self.0 & (1 << kind) != 0
    }

    #[inline]
    pub const fn union(self, other: TokenSet) -> TokenSet {
        TokenSet(self.0 | other.0)
    }
}

/// Pre-defined token sets for the parser.
pub mod token_sets {
    use super::*;

    /// FIRST set of expressions, including unary operator prefixes.
    pub const EXPR_FIRST: TokenSet = TokenSet::new(&[
        ParenOpen,
        BracketOpen,
        IntNumber,
        FloatNumber,
        String,
        Identifier,
        KwTrue,
        KwFalse,
        Plus,
        Minus,
        Bang,
        Tilde,
    ]);

    /// Keywords that can only begin a statement.
    pub const STMT_KEYWORDS: TokenSet = TokenSet::new(&[
        BraceOpen,
        KwVar,
        KwLet,
        KwIf,
        KwWhile,
        KwFor,
        KwBreak,
        KwContinue,
        KwReturn,
    ]);

    /// FIRST set of statements.
    pub const STMT_FIRST: TokenSet = EXPR_FIRST.union(STMT_KEYWORDS);

    /// Synchronization points after a malformed statement.
    pub const STMT_RECOVERY: TokenSet = STMT_KEYWORDS.union(TokenSet::new(&[
        BraceClose,
        KwFunction,
    ]));
}
