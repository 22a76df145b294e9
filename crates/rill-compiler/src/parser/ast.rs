//! Typed AST wrappers over CST nodes.
//!
//! Each struct wraps a `SyntaxNode` and provides typed accessors.
//! Cast is infallible for correct `SyntaxKind` - validation happens in the
//! binder.

use rowan::TextRange;

use super::cst::{SyntaxKind, SyntaxNode, SyntaxToken};

macro_rules! ast_node {
    ($name:ident, $kind:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(SyntaxNode);

        impl $name {
            pub fn cast(node: SyntaxNode) -> Option<Self> {
                (node.kind() == SyntaxKind::$kind).then(|| Self(node))
            }

            pub fn as_cst(&self) -> &SyntaxNode {
                &self.0
            }

            pub fn text_range(&self) -> TextRange {
                self.0.text_range()
            }
        }
    };
}

ast_node!(CompilationUnit, CompilationUnit);
ast_node!(FunctionItem, FunctionItem);
ast_node!(ParamList, ParamList);
ast_node!(Param, Param);
ast_node!(TypeClause, TypeClause);
ast_node!(BlockStmt, BlockStmt);
ast_node!(VarDeclStmt, VarDeclStmt);
ast_node!(IfStmt, IfStmt);
ast_node!(ElseClause, ElseClause);
ast_node!(WhileStmt, WhileStmt);
ast_node!(ForStmt, ForStmt);
ast_node!(BreakStmt, BreakStmt);
ast_node!(ContinueStmt, ContinueStmt);
ast_node!(ReturnStmt, ReturnStmt);
ast_node!(ExprStmt, ExprStmt);
ast_node!(LiteralExpr, LiteralExpr);
ast_node!(NameExpr, NameExpr);
ast_node!(ParenExpr, ParenExpr);
ast_node!(UnaryExpr, UnaryExpr);
ast_node!(BinaryExpr, BinaryExpr);
ast_node!(AssignExpr, AssignExpr);
ast_node!(CallExpr, CallExpr);
ast_node!(ArgList, ArgList);
ast_node!(IndexExpr, IndexExpr);
ast_node!(IndexAssignExpr, IndexAssignExpr);
ast_node!(ArrayLiteralExpr, ArrayLiteralExpr);

fn first_token(node: &SyntaxNode, predicate: impl Fn(SyntaxKind) -> bool) -> Option<SyntaxToken> {
    node.children_with_tokens()
        .filter_map(|it| it.into_token())
        .find(|t| predicate(t.kind()))
}

fn identifier(node: &SyntaxNode) -> Option<SyntaxToken> {
    first_token(node, |k| k == SyntaxKind::Identifier)
}

/// Top-level member: a function declaration or a global statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Member {
    Function(FunctionItem),
    GlobalStatement(Stmt),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Stmt {
    Block(BlockStmt),
    VarDecl(VarDeclStmt),
    If(IfStmt),
    While(WhileStmt),
    For(ForStmt),
    Break(BreakStmt),
    Continue(ContinueStmt),
    Return(ReturnStmt),
    Expr(ExprStmt),
}

impl Stmt {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::BlockStmt => BlockStmt::cast(node).map(Stmt::Block),
            SyntaxKind::VarDeclStmt => VarDeclStmt::cast(node).map(Stmt::VarDecl),
            SyntaxKind::IfStmt => IfStmt::cast(node).map(Stmt::If),
            SyntaxKind::WhileStmt => WhileStmt::cast(node).map(Stmt::While),
            SyntaxKind::ForStmt => ForStmt::cast(node).map(Stmt::For),
            SyntaxKind::BreakStmt => BreakStmt::cast(node).map(Stmt::Break),
            SyntaxKind::ContinueStmt => ContinueStmt::cast(node).map(Stmt::Continue),
            SyntaxKind::ReturnStmt => ReturnStmt::cast(node).map(Stmt::Return),
            SyntaxKind::ExprStmt => ExprStmt::cast(node).map(Stmt::Expr),
            _ => None,
        }
    }

    pub fn as_cst(&self) -> &SyntaxNode {
        match self {
            Stmt::Block(n) => n.as_cst(),
            Stmt::VarDecl(n) => n.as_cst(),
            Stmt::If(n) => n.as_cst(),
            Stmt::While(n) => n.as_cst(),
            Stmt::For(n) => n.as_cst(),
            Stmt::Break(n) => n.as_cst(),
            Stmt::Continue(n) => n.as_cst(),
            Stmt::Return(n) => n.as_cst(),
            Stmt::Expr(n) => n.as_cst(),
        }
    }

    pub fn text_range(&self) -> TextRange {
        self.as_cst().text_range()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Literal(LiteralExpr),
    Name(NameExpr),
    Paren(ParenExpr),
    Unary(UnaryExpr),
    Binary(BinaryExpr),
    Assign(AssignExpr),
    Call(CallExpr),
    Index(IndexExpr),
    IndexAssign(IndexAssignExpr),
    ArrayLiteral(ArrayLiteralExpr),
}

impl Expr {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::LiteralExpr => LiteralExpr::cast(node).map(Expr::Literal),
            SyntaxKind::NameExpr => NameExpr::cast(node).map(Expr::Name),
            SyntaxKind::ParenExpr => ParenExpr::cast(node).map(Expr::Paren),
            SyntaxKind::UnaryExpr => UnaryExpr::cast(node).map(Expr::Unary),
            SyntaxKind::BinaryExpr => BinaryExpr::cast(node).map(Expr::Binary),
            SyntaxKind::AssignExpr => AssignExpr::cast(node).map(Expr::Assign),
            SyntaxKind::CallExpr => CallExpr::cast(node).map(Expr::Call),
            SyntaxKind::IndexExpr => IndexExpr::cast(node).map(Expr::Index),
            SyntaxKind::IndexAssignExpr => IndexAssignExpr::cast(node).map(Expr::IndexAssign),
            SyntaxKind::ArrayLiteralExpr => ArrayLiteralExpr::cast(node).map(Expr::ArrayLiteral),
            _ => None,
        }
    }

    pub fn as_cst(&self) -> &SyntaxNode {
        match self {
            Expr::Literal(n) => n.as_cst(),
            Expr::Name(n) => n.as_cst(),
            Expr::Paren(n) => n.as_cst(),
            Expr::Unary(n) => n.as_cst(),
            Expr::Binary(n) => n.as_cst(),
            Expr::Assign(n) => n.as_cst(),
            Expr::Call(n) => n.as_cst(),
            Expr::Index(n) => n.as_cst(),
            Expr::IndexAssign(n) => n.as_cst(),
            Expr::ArrayLiteral(n) => n.as_cst(),
        }
    }

    pub fn text_range(&self) -> TextRange {
        self.as_cst().text_range()
    }
}

impl CompilationUnit {
    pub fn members(&self) -> impl Iterator<Item = Member> + '_ {
        self.0.children().filter_map(|node| {
            if node.kind() == SyntaxKind::FunctionItem {
                FunctionItem::cast(node).map(Member::Function)
            } else {
                Stmt::cast(node).map(Member::GlobalStatement)
            }
        })
    }

    pub fn functions(&self) -> impl Iterator<Item = FunctionItem> + '_ {
        self.0.children().filter_map(FunctionItem::cast)
    }

    pub fn global_statements(&self) -> impl Iterator<Item = Stmt> + '_ {
        self.0.children().filter_map(Stmt::cast)
    }
}

impl FunctionItem {
    pub fn name(&self) -> Option<SyntaxToken> {
        identifier(&self.0)
    }

    pub fn params(&self) -> impl Iterator<Item = Param> + '_ {
        self.0
            .children()
            .filter_map(ParamList::cast)
            .flat_map(|list| list.0.children().filter_map(Param::cast).collect::<Vec<_>>())
    }

    /// The return-type clause; parameter clauses live inside `Param` nodes.
    pub fn return_type(&self) -> Option<TypeClause> {
        self.0.children().find_map(TypeClause::cast)
    }

    pub fn body(&self) -> Option<BlockStmt> {
        self.0.children().find_map(BlockStmt::cast)
    }
}

impl Param {
    pub fn name(&self) -> Option<SyntaxToken> {
        identifier(&self.0)
    }

    pub fn type_clause(&self) -> Option<TypeClause> {
        self.0.children().find_map(TypeClause::cast)
    }
}

impl TypeClause {
    pub fn type_name(&self) -> Option<SyntaxToken> {
        identifier(&self.0)
    }

    /// `true` for `: int[]` and `: int[3]`.
    pub fn is_array(&self) -> bool {
        first_token(&self.0, |k| k == SyntaxKind::BracketOpen).is_some()
    }

    pub fn size(&self) -> Option<Expr> {
        self.0.children().find_map(Expr::cast)
    }
}

impl BlockStmt {
    pub fn statements(&self) -> impl Iterator<Item = Stmt> + '_ {
        self.0.children().filter_map(Stmt::cast)
    }
}

impl VarDeclStmt {
    /// `var`, `let`, or `const`.
    pub fn keyword(&self) -> Option<SyntaxToken> {
        first_token(&self.0, |k| matches!(k, SyntaxKind::KwVar | SyntaxKind::KwLet))
    }

    pub fn is_read_only(&self) -> bool {
        self.keyword().is_some_and(|t| t.kind() == SyntaxKind::KwLet)
    }

    pub fn name(&self) -> Option<SyntaxToken> {
        identifier(&self.0)
    }

    pub fn type_clause(&self) -> Option<TypeClause> {
        self.0.children().find_map(TypeClause::cast)
    }

    /// The initializer is the only expression that is a direct child; a size
    /// expression sits inside the `TypeClause` node.
    pub fn initializer(&self) -> Option<Expr> {
        self.0.children().find_map(Expr::cast)
    }
}

impl IfStmt {
    pub fn condition(&self) -> Option<Expr> {
        self.0.children().find_map(Expr::cast)
    }

    pub fn then_branch(&self) -> Option<Stmt> {
        self.0.children().find_map(Stmt::cast)
    }

    pub fn else_clause(&self) -> Option<ElseClause> {
        self.0.children().find_map(ElseClause::cast)
    }
}

impl ElseClause {
    pub fn statement(&self) -> Option<Stmt> {
        self.0.children().find_map(Stmt::cast)
    }
}

impl WhileStmt {
    pub fn condition(&self) -> Option<Expr> {
        self.0.children().find_map(Expr::cast)
    }

    pub fn body(&self) -> Option<Stmt> {
        self.0.children().find_map(Stmt::cast)
    }
}

impl ForStmt {
    pub fn variable(&self) -> Option<SyntaxToken> {
        identifier(&self.0)
    }

    pub fn lower_bound(&self) -> Option<Expr> {
        self.0.children().filter_map(Expr::cast).next()
    }

    pub fn upper_bound(&self) -> Option<Expr> {
        self.0.children().filter_map(Expr::cast).nth(1)
    }

    pub fn body(&self) -> Option<Stmt> {
        self.0.children().find_map(Stmt::cast)
    }
}

impl BreakStmt {
    pub fn keyword(&self) -> Option<SyntaxToken> {
        first_token(&self.0, |k| k == SyntaxKind::KwBreak)
    }
}

impl ContinueStmt {
    pub fn keyword(&self) -> Option<SyntaxToken> {
        first_token(&self.0, |k| k == SyntaxKind::KwContinue)
    }
}

impl ReturnStmt {
    pub fn keyword(&self) -> Option<SyntaxToken> {
        first_token(&self.0, |k| k == SyntaxKind::KwReturn)
    }

    pub fn expression(&self) -> Option<Expr> {
        self.0.children().find_map(Expr::cast)
    }
}

impl ExprStmt {
    pub fn expression(&self) -> Option<Expr> {
        self.0.children().find_map(Expr::cast)
    }
}

impl LiteralExpr {
    pub fn token(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| !t.kind().is_trivia())
    }
}

impl NameExpr {
    pub fn name(&self) -> Option<SyntaxToken> {
        identifier(&self.0)
    }
}

impl ParenExpr {
    pub fn expression(&self) -> Option<Expr> {
        self.0.children().find_map(Expr::cast)
    }
}

impl UnaryExpr {
    pub fn operator(&self) -> Option<SyntaxToken> {
        first_token(&self.0, |k| {
            matches!(
                k,
                SyntaxKind::Plus | SyntaxKind::Minus | SyntaxKind::Bang | SyntaxKind::Tilde
            )
        })
    }

    pub fn operand(&self) -> Option<Expr> {
        self.0.children().find_map(Expr::cast)
    }
}

impl BinaryExpr {
    pub fn operator(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| !t.kind().is_trivia())
    }

    pub fn lhs(&self) -> Option<Expr> {
        self.0.children().filter_map(Expr::cast).next()
    }

    pub fn rhs(&self) -> Option<Expr> {
        self.0.children().filter_map(Expr::cast).nth(1)
    }
}

impl AssignExpr {
    pub fn name(&self) -> Option<SyntaxToken> {
        identifier(&self.0)
    }

    pub fn value(&self) -> Option<Expr> {
        self.0.children().find_map(Expr::cast)
    }
}

impl CallExpr {
    pub fn name(&self) -> Option<SyntaxToken> {
        identifier(&self.0)
    }

    pub fn arg_list(&self) -> Option<ArgList> {
        self.0.children().find_map(ArgList::cast)
    }
}

impl ArgList {
    pub fn args(&self) -> impl Iterator<Item = Expr> + '_ {
        self.0.children().filter_map(Expr::cast)
    }

    /// Comma tokens between arguments, in order.
    pub fn separators(&self) -> impl Iterator<Item = SyntaxToken> + '_ {
        self.0
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .filter(|t| t.kind() == SyntaxKind::Comma)
    }

    pub fn close_paren(&self) -> Option<SyntaxToken> {
        first_token(&self.0, |k| k == SyntaxKind::ParenClose)
    }
}

impl IndexExpr {
    pub fn base(&self) -> Option<Expr> {
        self.0.children().filter_map(Expr::cast).next()
    }

    pub fn index(&self) -> Option<Expr> {
        self.0.children().filter_map(Expr::cast).nth(1)
    }
}

impl IndexAssignExpr {
    /// The `a[i]` part.
    pub fn target(&self) -> Option<IndexExpr> {
        self.0.children().find_map(IndexExpr::cast)
    }

    pub fn value(&self) -> Option<Expr> {
        self.0.children().filter_map(Expr::cast).nth(1)
    }
}

impl ArrayLiteralExpr {
    pub fn elements(&self) -> impl Iterator<Item = Expr> + '_ {
        self.0.children().filter_map(Expr::cast)
    }
}

/// Decodes the content of a string-literal token. Returns the decoded text
/// plus the byte offsets (relative to `raw`) of invalid escape sequences.
pub fn decode_string_literal(raw: &str) -> (String, Vec<usize>) {
    let stripped = raw.strip_prefix('"').unwrap_or(raw);
    let content = stripped.strip_suffix('"').unwrap_or(stripped);
    let base = if raw.starts_with('"') { 1 } else { 0 };

    let mut decoded = String::with_capacity(content.len());
    let mut bad_escapes = Vec::new();
    let mut chars = content.char_indices();

    while let Some((offset, ch)) = chars.next() {
        if ch != '\\' {
            decoded.push(ch);
            continue;
        }
        match chars.next() {
            Some((_, 'n')) => decoded.push('\n'),
            Some((_, 't')) => decoded.push('\t'),
            Some((_, 'r')) => decoded.push('\r'),
            Some((_, '\\')) => decoded.push('\\'),
            Some((_, '"')) => decoded.push('"'),
            Some((_, other)) => {
                bad_escapes.push(base + offset);
                decoded.push(other);
            }
            None => bad_escapes.push(base + offset),
        }
    }

    (decoded, bad_escapes)
}
