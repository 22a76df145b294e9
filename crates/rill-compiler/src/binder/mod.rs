//! Name resolution and type checking.
//!
//! Binding is best-effort: failures yield `error`-typed bound expressions
//! so that one mistake does not cascade into a trail of follow-on
//! diagnostics. Global binding runs in two phases - function declarations
//! first, then global statements - so functions can be called before their
//! declaration in source order.

pub mod bound;
pub mod conversion;
pub mod operators;
mod scope;

#[cfg(test)]
mod binder_tests;

use std::sync::Arc;

use indexmap::IndexMap;
use rowan::TextRange;

use crate::cfg::ControlFlowGraph;
use crate::diagnostics::Diagnostics;
use crate::lower;
use crate::parser::ast::{self, Expr, Member, Stmt};
use crate::parser::{SyntaxKind, SyntaxToken};
use crate::symbols::{
    FIRST_USER_SYMBOL_ID, FunctionSymbol, SymbolId, Type, VariableKind, VariableSymbol,
};

use bound::{BoundExpr, BoundFunction, BoundProgram, BoundStmt, Const, Label};
use conversion::Conversion;
use scope::ScopeStack;

/// The result of binding one submission, chained to its predecessor so a
/// REPL session accumulates declarations.
#[derive(Debug)]
pub struct BoundGlobalScope {
    pub previous: Option<Arc<BoundGlobalScope>>,
    pub diagnostics: Diagnostics,
    pub variables: Vec<VariableSymbol>,
    pub functions: Vec<FunctionSymbol>,
    pub statements: Vec<BoundStmt>,
    next_symbol_id: u32,
}

/// Binds one compilation unit against the chain of earlier submissions.
pub fn bind_global_scope(
    previous: Option<Arc<BoundGlobalScope>>,
    unit: &ast::CompilationUnit,
) -> BoundGlobalScope {
    let next_symbol_id = previous
        .as_deref()
        .map_or(FIRST_USER_SYMBOL_ID, |p| p.next_symbol_id);
    let mut binder = Binder::new(create_parent_scope(previous.as_deref()), next_symbol_id);
    binder.scope.push();

    // Phase 1: declare every function so bodies and globals can call them
    // regardless of declaration order.
    for member in unit.members() {
        if let Member::Function(item) = member {
            binder.bind_function_declaration(&item);
        }
    }

    // Phase 2: bind the global statements.
    let mut statements = Vec::new();
    for member in unit.members() {
        if let Member::GlobalStatement(stmt) = member {
            statements.push(binder.bind_statement(&stmt));
        }
    }

    let variables = binder.scope.declared_variables();
    let functions = binder.scope.declared_functions();

    let mut diagnostics = previous
        .as_deref()
        .map(|p| p.diagnostics.clone())
        .unwrap_or_default();
    diagnostics.extend(binder.diagnostics);

    BoundGlobalScope {
        previous,
        diagnostics,
        variables,
        functions,
        statements,
        next_symbol_id: binder.next_symbol_id,
    }
}

/// Binds every function body across the submission chain, lowers them and
/// the top-level statements, and verifies all-paths-return.
pub fn bind_program(global_scope: &BoundGlobalScope) -> BoundProgram {
    let mut diagnostics = Diagnostics::new();
    let mut functions = IndexMap::new();
    let mut next_symbol_id = global_scope.next_symbol_id;

    let mut link = Some(global_scope);
    while let Some(scope) = link {
        for function in &scope.functions {
            let Some(declaration) = function.declaration.clone() else {
                continue;
            };

            let mut binder = Binder::for_function(
                create_parent_scope(Some(global_scope)),
                function.clone(),
                next_symbol_id,
            );

            let body = match declaration.body() {
                Some(block) => binder.bind_statement(&Stmt::Block(block)),
                None => BoundStmt::Block(Vec::new()),
            };
            let lowered = lower::lower(body, &mut binder.next_symbol_id);

            if function.return_type != Type::Void
                && !function.return_type.is_error()
                && !ControlFlowGraph::all_paths_return(&lowered)
            {
                let range = declaration
                    .name()
                    .map_or_else(|| declaration.text_range(), |t| t.text_range());
                binder.diagnostics.report_all_paths_must_return(range);
            }

            next_symbol_id = binder.next_symbol_id;
            diagnostics.extend(binder.diagnostics);
            functions.insert(
                function.id,
                BoundFunction {
                    symbol: function.clone(),
                    body: lowered,
                },
            );
        }
        link = scope.previous.as_deref();
    }

    let statements = lower::lower(
        BoundStmt::Block(global_scope.statements.clone()),
        &mut next_symbol_id,
    );

    BoundProgram {
        diagnostics,
        functions,
        statements,
    }
}

/// Rebuilds the scope chain for a submission: built-ins at the root, then
/// one frame per earlier submission, oldest first, so newer declarations
/// shadow older ones.
fn create_parent_scope(head: Option<&BoundGlobalScope>) -> ScopeStack {
    let mut chain = Vec::new();
    let mut link = head;
    while let Some(scope) = link {
        chain.push(scope);
        link = scope.previous.as_deref();
    }

    let mut stack = ScopeStack::with_builtins();
    for scope in chain.into_iter().rev() {
        stack.push();
        for function in &scope.functions {
            stack.try_declare_function(function.clone());
        }
        for variable in &scope.variables {
            stack.try_declare_variable(variable.clone());
        }
    }
    stack
}

struct Binder {
    scope: ScopeStack,
    diagnostics: Diagnostics,
    function: Option<FunctionSymbol>,
    loop_stack: Vec<(Label, Label)>,
    loop_counter: u32,
    next_symbol_id: u32,
}

impl Binder {
    fn new(scope: ScopeStack, next_symbol_id: u32) -> Self {
        Self {
            scope,
            diagnostics: Diagnostics::new(),
            function: None,
            loop_stack: Vec::new(),
            loop_counter: 0,
            next_symbol_id,
        }
    }

    /// A binder for a function body; parameters live in the outermost frame.
    fn for_function(scope: ScopeStack, function: FunctionSymbol, next_symbol_id: u32) -> Self {
        let mut binder = Self::new(scope, next_symbol_id);
        binder.scope.push();
        for parameter in &function.parameters {
            binder.scope.try_declare_variable(parameter.clone());
        }
        binder.function = Some(function);
        binder
    }

    fn fresh_id(&mut self) -> SymbolId {
        let id = SymbolId(self.next_symbol_id);
        self.next_symbol_id += 1;
        id
    }

    // --- declarations ---

    fn bind_function_declaration(&mut self, item: &ast::FunctionItem) {
        let mut parameters: Vec<VariableSymbol> = Vec::new();

        for param in item.params() {
            let Some(name_token) = param.name() else {
                continue;
            };
            let name = name_token.text().to_string();
            let ty = param
                .type_clause()
                .map_or(Type::Error, |clause| self.bind_type_clause(&clause));

            if parameters.iter().any(|p| p.name == name) {
                self.diagnostics
                    .report_parameter_already_declared(name_token.text_range(), &name);
            } else {
                let id = self.fresh_id();
                parameters.push(VariableSymbol::new(
                    id,
                    name,
                    VariableKind::Parameter,
                    true,
                    ty,
                ));
            }
        }

        let return_type = item
            .return_type()
            .map_or(Type::Void, |clause| self.bind_type_clause(&clause));

        let Some(name_token) = item.name() else {
            return;
        };
        let function = FunctionSymbol {
            id: self.fresh_id(),
            name: name_token.text().to_string(),
            parameters,
            return_type,
            declaration: Some(item.clone()),
        };

        if !self.scope.try_declare_function(function) {
            self.diagnostics
                .report_symbol_already_declared(name_token.text_range(), name_token.text());
        }
    }

    fn bind_type_clause(&mut self, clause: &ast::TypeClause) -> Type {
        let Some(name_token) = clause.type_name() else {
            return Type::Error;
        };
        let Some(base) = Type::from_name(name_token.text()) else {
            self.diagnostics
                .report_undefined_type(name_token.text_range(), name_token.text());
            return Type::Error;
        };
        if clause.is_array() {
            base.array_of().unwrap_or(Type::Error)
        } else {
            base
        }
    }

    fn declare_variable(
        &mut self,
        name_token: Option<SyntaxToken>,
        read_only: bool,
        ty: Type,
    ) -> VariableSymbol {
        let kind = if self.function.is_some() {
            VariableKind::Local
        } else {
            VariableKind::Global
        };
        let name = name_token
            .as_ref()
            .map_or(String::new(), |t| t.text().to_string());
        let symbol = VariableSymbol::new(self.fresh_id(), name.clone(), kind, read_only, ty);

        if let Some(token) = name_token
            && !self.scope.try_declare_variable(symbol.clone())
        {
            self.diagnostics
                .report_symbol_already_declared(token.text_range(), &name);
        }
        symbol
    }

    // --- statements ---

    fn bind_statement(&mut self, stmt: &Stmt) -> BoundStmt {
        match stmt {
            Stmt::Block(node) => self.bind_block_statement(node),
            Stmt::VarDecl(node) => self.bind_variable_declaration(node),
            Stmt::If(node) => self.bind_if_statement(node),
            Stmt::While(node) => self.bind_while_statement(node),
            Stmt::For(node) => self.bind_for_statement(node),
            Stmt::Break(node) => self.bind_break_statement(node),
            Stmt::Continue(node) => self.bind_continue_statement(node),
            Stmt::Return(node) => self.bind_return_statement(node),
            Stmt::Expr(node) => self.bind_expression_statement(node),
        }
    }

    fn error_statement() -> BoundStmt {
        BoundStmt::Expr(BoundExpr::Error)
    }

    fn bind_block_statement(&mut self, node: &ast::BlockStmt) -> BoundStmt {
        self.scope.push();
        let statements = node
            .statements()
            .map(|stmt| self.bind_statement(&stmt))
            .collect();
        self.scope.pop();
        BoundStmt::Block(statements)
    }

    fn bind_variable_declaration(&mut self, node: &ast::VarDeclStmt) -> BoundStmt {
        let read_only = node.is_read_only();
        if let Some(clause) = node.type_clause()
            && clause.is_array()
        {
            return self.bind_array_declaration(node, &clause, read_only);
        }

        let declared_ty = node.type_clause().map(|c| self.bind_type_clause(&c));

        let (initializer, initializer_range) = match node.initializer() {
            Some(Expr::ArrayLiteral(literal)) => {
                let range = literal.text_range();
                (self.bind_array_literal(&literal, None), range)
            }
            Some(expr) => {
                let range = expr.text_range();
                (self.bind_expression(&expr), range)
            }
            None => {
                let range = node.text_range();
                (self.default_value(declared_ty.unwrap_or(Type::Any), 0), range)
            }
        };

        let variable_ty = declared_ty.unwrap_or_else(|| initializer.ty());
        let variable = self.declare_variable(node.name(), read_only, variable_ty);
        let converted = self.convert(initializer, variable_ty, initializer_range, false);

        BoundStmt::VarDecl {
            variable,
            initializer: converted,
        }
    }

    fn bind_array_declaration(
        &mut self,
        node: &ast::VarDeclStmt,
        clause: &ast::TypeClause,
        read_only: bool,
    ) -> BoundStmt {
        let array_ty = self.bind_type_clause(clause);
        let element_ty = array_ty.element_type().unwrap_or(Type::Error);

        // The declared size must be an integer literal; anything else cannot
        // be checked against the initializer at compile time.
        let size = match clause.size() {
            Some(Expr::Literal(literal))
                if literal
                    .token()
                    .is_some_and(|t| t.kind() == SyntaxKind::IntNumber) =>
            {
                let token = literal.token().expect("checked above");
                match token.text().parse::<i64>() {
                    Ok(value) if value >= 0 => Some(value),
                    _ => {
                        self.diagnostics.report_invalid_array_size(literal.text_range());
                        None
                    }
                }
            }
            Some(expr) => {
                self.diagnostics.report_invalid_array_size(expr.text_range());
                None
            }
            None => None,
        };

        let (initializer, initializer_range) = match node.initializer() {
            Some(Expr::ArrayLiteral(literal)) => {
                let range = literal.text_range();
                let bound = self.bind_array_literal(&literal, Some(element_ty));
                let mismatch = match (&bound, size) {
                    (BoundExpr::ArrayLiteral { elements, .. }, Some(size))
                        if elements.len() as i64 != size =>
                    {
                        Some((elements.len(), size))
                    }
                    _ => None,
                };
                let bound = match mismatch {
                    Some((actual, expected)) => {
                        self.diagnostics
                            .report_array_size_mismatch(range, actual, expected);
                        BoundExpr::Error
                    }
                    None => bound,
                };
                (bound, range)
            }
            Some(expr) => {
                let range = expr.text_range();
                (self.bind_expression(&expr), range)
            }
            None => {
                let range = node.text_range();
                let bound = match size {
                    Some(size) => self.default_value(array_ty, size as usize),
                    None => {
                        let blame = node
                            .name()
                            .map_or_else(|| node.text_range(), |t| t.text_range());
                        self.diagnostics.report_array_size_not_specified(blame);
                        BoundExpr::Error
                    }
                };
                (bound, range)
            }
        };

        let variable = self.declare_variable(node.name(), read_only, array_ty);
        let converted = self.convert(initializer, array_ty, initializer_range, false);

        BoundStmt::VarDecl {
            variable,
            initializer: converted,
        }
    }

    /// Binds `[e1, e2, ...]`. With no declared element type, it is inferred
    /// from the first element; an empty untyped literal becomes `any[]`.
    fn bind_array_literal(
        &mut self,
        node: &ast::ArrayLiteralExpr,
        element_ty: Option<Type>,
    ) -> BoundExpr {
        let elements: Vec<(BoundExpr, TextRange)> = node
            .elements()
            .map(|expr| {
                let range = expr.text_range();
                (self.bind_expression(&expr), range)
            })
            .collect();

        let element_ty = element_ty
            .or_else(|| elements.first().map(|(e, _)| e.ty()))
            .unwrap_or(Type::Any);
        let Some(array_ty) = element_ty.array_of() else {
            return BoundExpr::Error;
        };

        let converted = elements
            .into_iter()
            .map(|(element, range)| self.convert(element, element_ty, range, false))
            .collect();

        BoundExpr::ArrayLiteral {
            elements: converted,
            ty: array_ty,
        }
    }

    fn bind_if_statement(&mut self, node: &ast::IfStmt) -> BoundStmt {
        let condition = self.bind_converted_expression(node.condition(), Type::Bool);
        let then_branch = match node.then_branch() {
            Some(stmt) => self.bind_statement(&stmt),
            None => Self::error_statement(),
        };
        let else_branch = node
            .else_clause()
            .and_then(|clause| clause.statement())
            .map(|stmt| Box::new(self.bind_statement(&stmt)));

        BoundStmt::If {
            condition,
            then_branch: Box::new(then_branch),
            else_branch,
        }
    }

    fn bind_while_statement(&mut self, node: &ast::WhileStmt) -> BoundStmt {
        let condition = self.bind_converted_expression(node.condition(), Type::Bool);
        let (body, break_label, continue_label) = self.bind_loop_body(node.body());
        BoundStmt::While {
            condition,
            body: Box::new(body),
            break_label,
            continue_label,
        }
    }

    fn bind_for_statement(&mut self, node: &ast::ForStmt) -> BoundStmt {
        let lower_bound = self.bind_converted_expression(node.lower_bound(), Type::Int);
        let upper_bound = self.bind_converted_expression(node.upper_bound(), Type::Int);

        self.scope.push();
        let variable = self.declare_variable(node.variable(), false, Type::Int);
        let (body, break_label, continue_label) = self.bind_loop_body(node.body());
        self.scope.pop();

        BoundStmt::For {
            variable,
            lower_bound,
            upper_bound,
            body: Box::new(body),
            break_label,
            continue_label,
        }
    }

    fn bind_loop_body(&mut self, body: Option<Stmt>) -> (BoundStmt, Label, Label) {
        self.loop_counter += 1;
        let break_label = Label::new(format!("break{}", self.loop_counter));
        let continue_label = Label::new(format!("continue{}", self.loop_counter));

        self.loop_stack
            .push((break_label.clone(), continue_label.clone()));
        let bound = match body {
            Some(stmt) => self.bind_statement(&stmt),
            None => Self::error_statement(),
        };
        self.loop_stack.pop();

        (bound, break_label, continue_label)
    }

    fn bind_break_statement(&mut self, node: &ast::BreakStmt) -> BoundStmt {
        match self.loop_stack.last() {
            Some((break_label, _)) => BoundStmt::Goto(break_label.clone()),
            None => {
                let range = node
                    .keyword()
                    .map_or_else(|| node.text_range(), |t| t.text_range());
                self.diagnostics.report_invalid_break_or_continue(range, "break");
                Self::error_statement()
            }
        }
    }

    fn bind_continue_statement(&mut self, node: &ast::ContinueStmt) -> BoundStmt {
        match self.loop_stack.last() {
            Some((_, continue_label)) => BoundStmt::Goto(continue_label.clone()),
            None => {
                let range = node
                    .keyword()
                    .map_or_else(|| node.text_range(), |t| t.text_range());
                self.diagnostics
                    .report_invalid_break_or_continue(range, "continue");
                Self::error_statement()
            }
        }
    }

    fn bind_return_statement(&mut self, node: &ast::ReturnStmt) -> BoundStmt {
        let keyword_range = node
            .keyword()
            .map_or_else(|| node.text_range(), |t| t.text_range());
        let expression = node.expression();

        let bound = match self.function.clone() {
            None => {
                self.diagnostics.report_invalid_return(keyword_range);
                expression.map(|expr| self.bind_expression(&expr))
            }
            Some(function) => {
                if function.return_type == Type::Void {
                    if let Some(expr) = expression {
                        self.diagnostics
                            .report_invalid_return_expression(keyword_range, &function.name);
                        Some(self.bind_expression(&expr))
                    } else {
                        None
                    }
                } else {
                    match expression {
                        None => {
                            self.diagnostics.report_missing_return_expression(
                                keyword_range,
                                function.return_type.name(),
                            );
                            None
                        }
                        Some(expr) => {
                            let range = expr.text_range();
                            let bound = self.bind_expression(&expr);
                            Some(self.convert(bound, function.return_type, range, false))
                        }
                    }
                }
            }
        };

        BoundStmt::Return(bound)
    }

    fn bind_expression_statement(&mut self, node: &ast::ExprStmt) -> BoundStmt {
        let bound = match node.expression() {
            Some(expr) => self.bind_expression_internal(&expr),
            None => BoundExpr::Error,
        };
        BoundStmt::Expr(bound)
    }

    // --- expressions ---

    /// Binds an expression that must produce a value.
    fn bind_expression(&mut self, node: &Expr) -> BoundExpr {
        let bound = self.bind_expression_internal(node);
        if bound.ty() == Type::Void {
            self.diagnostics
                .report_expression_must_have_value(node.text_range());
            return BoundExpr::Error;
        }
        bound
    }

    fn bind_expression_internal(&mut self, node: &Expr) -> BoundExpr {
        match node {
            Expr::Literal(node) => self.bind_literal_expression(node),
            Expr::Name(node) => self.bind_name_expression(node),
            Expr::Paren(node) => match node.expression() {
                Some(inner) => self.bind_expression_internal(&inner),
                None => BoundExpr::Error,
            },
            Expr::Unary(node) => self.bind_unary_expression(node),
            Expr::Binary(node) => self.bind_binary_expression(node),
            Expr::Assign(node) => self.bind_assignment_expression(node),
            Expr::Call(node) => self.bind_call_expression(node),
            Expr::Index(node) => self.bind_index_expression(node),
            Expr::IndexAssign(node) => self.bind_index_assignment_expression(node),
            Expr::ArrayLiteral(node) => {
                self.diagnostics
                    .report_invalid_array_initializer(node.text_range());
                BoundExpr::Error
            }
        }
    }

    fn bind_literal_expression(&mut self, node: &ast::LiteralExpr) -> BoundExpr {
        let Some(token) = node.token() else {
            return BoundExpr::Error;
        };
        match token.kind() {
            SyntaxKind::IntNumber => match token.text().parse::<i64>() {
                Ok(value) => BoundExpr::int(value),
                Err(_) => {
                    self.diagnostics.report_invalid_number(
                        token.text_range(),
                        token.text(),
                        "int",
                    );
                    BoundExpr::Error
                }
            },
            SyntaxKind::FloatNumber => match token.text().parse::<f64>() {
                Ok(value) => BoundExpr::Literal {
                    value: Const::Float(value),
                    ty: Type::Float,
                },
                Err(_) => {
                    self.diagnostics.report_invalid_number(
                        token.text_range(),
                        token.text(),
                        "float",
                    );
                    BoundExpr::Error
                }
            },
            SyntaxKind::KwTrue | SyntaxKind::KwFalse => BoundExpr::Literal {
                value: Const::Bool(token.kind() == SyntaxKind::KwTrue),
                ty: Type::Bool,
            },
            SyntaxKind::String => {
                let (decoded, bad_escapes) = ast::decode_string_literal(token.text());
                let start = token.text_range().start();
                for offset in bad_escapes {
                    let at = start + rowan::TextSize::from(offset as u32);
                    self.diagnostics
                        .report_invalid_escape(TextRange::at(at, rowan::TextSize::from(2)));
                }
                BoundExpr::Literal {
                    value: Const::Str(decoded),
                    ty: Type::String,
                }
            }
            _ => BoundExpr::Error,
        }
    }

    fn bind_name_expression(&mut self, node: &ast::NameExpr) -> BoundExpr {
        let Some(token) = node.name() else {
            return BoundExpr::Error;
        };
        match self.scope.lookup_variable(token.text()) {
            Some(variable) => BoundExpr::Variable(variable.clone()),
            None => {
                self.diagnostics
                    .report_undefined_name(token.text_range(), token.text());
                BoundExpr::Error
            }
        }
    }

    fn bind_assignment_expression(&mut self, node: &ast::AssignExpr) -> BoundExpr {
        let Some(token) = node.name() else {
            return BoundExpr::Error;
        };
        let (value, value_range) = match node.value() {
            Some(expr) => {
                let range = expr.text_range();
                (self.bind_expression(&expr), range)
            }
            None => (BoundExpr::Error, node.text_range()),
        };

        let Some(variable) = self.scope.lookup_variable(token.text()).cloned() else {
            self.diagnostics
                .report_undefined_name(token.text_range(), token.text());
            return value;
        };

        if variable.read_only {
            self.diagnostics
                .report_cannot_assign(token.text_range(), token.text());
        }

        let converted = self.convert(value, variable.ty, value_range, false);
        BoundExpr::Assignment {
            variable,
            value: Box::new(converted),
        }
    }

    fn bind_unary_expression(&mut self, node: &ast::UnaryExpr) -> BoundExpr {
        let operand = match node.operand() {
            Some(expr) => self.bind_expression(&expr),
            None => BoundExpr::Error,
        };
        if operand.ty().is_error() {
            return BoundExpr::Error;
        }
        let Some(token) = node.operator() else {
            return BoundExpr::Error;
        };
        let Some(op) = operators::bind_unary(token.kind(), operand.ty()) else {
            self.diagnostics.report_undefined_unary_operator(
                token.text_range(),
                token.text(),
                operand.ty().name(),
            );
            return BoundExpr::Error;
        };
        BoundExpr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    fn bind_binary_expression(&mut self, node: &ast::BinaryExpr) -> BoundExpr {
        let left = match node.lhs() {
            Some(expr) => self.bind_expression(&expr),
            None => BoundExpr::Error,
        };
        let right = match node.rhs() {
            Some(expr) => self.bind_expression(&expr),
            None => BoundExpr::Error,
        };
        if left.ty().is_error() || right.ty().is_error() {
            return BoundExpr::Error;
        }
        let Some(token) = node.operator() else {
            return BoundExpr::Error;
        };
        let Some(op) = operators::bind_binary(token.kind(), left.ty(), right.ty()) else {
            self.diagnostics.report_undefined_binary_operator(
                token.text_range(),
                token.text(),
                left.ty().name(),
                right.ty().name(),
            );
            return BoundExpr::Error;
        };
        BoundExpr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    fn bind_call_expression(&mut self, node: &ast::CallExpr) -> BoundExpr {
        let Some(name_token) = node.name() else {
            return BoundExpr::Error;
        };
        let Some(arg_list) = node.arg_list() else {
            return BoundExpr::Error;
        };
        let args: Vec<Expr> = arg_list.args().collect();

        // `int(x)`, `string(x)`, ... are explicit conversions, not calls.
        if args.len() == 1
            && let Some(target) = Type::from_name(name_token.text())
        {
            let range = args[0].text_range();
            let bound = self.bind_expression(&args[0]);
            return self.convert(bound, target, range, true);
        }

        let bound_args: Vec<(BoundExpr, TextRange)> = args
            .iter()
            .map(|arg| (self.bind_expression(arg), arg.text_range()))
            .collect();

        let Some(function) = self.scope.lookup_function(name_token.text()).cloned() else {
            self.diagnostics
                .report_undefined_function(name_token.text_range(), name_token.text());
            return BoundExpr::Error;
        };

        if args.len() != function.parameters.len() {
            let range = self.argument_count_blame(node, &arg_list, &args, function.parameters.len());
            self.diagnostics.report_wrong_argument_count(
                range,
                &function.name,
                function.parameters.len(),
                args.len(),
            );
            return BoundExpr::Error;
        }

        let arguments = bound_args
            .into_iter()
            .zip(&function.parameters)
            .map(|((bound, range), parameter)| self.convert(bound, parameter.ty, range, false))
            .collect();

        BoundExpr::Call {
            function,
            arguments,
        }
    }

    /// The span blamed for an argument-count mismatch: the separator that
    /// introduces the first excess argument through the closing parenthesis,
    /// or just the closing parenthesis when arguments are missing.
    fn argument_count_blame(
        &self,
        node: &ast::CallExpr,
        arg_list: &ast::ArgList,
        args: &[Expr],
        expected: usize,
    ) -> TextRange {
        let close = arg_list.close_paren().map(|t| t.text_range());
        if args.len() > expected {
            let start = if expected > 0 {
                arg_list
                    .separators()
                    .nth(expected - 1)
                    .map(|t| t.text_range().start())
            } else {
                args.first().map(|a| a.text_range().start())
            };
            if let Some(start) = start {
                let end = close.map_or_else(|| node.text_range().end(), |r| r.end());
                return TextRange::new(start, end);
            }
        }
        close.unwrap_or_else(|| node.text_range())
    }

    fn bind_index_expression(&mut self, node: &ast::IndexExpr) -> BoundExpr {
        let receiver = match node.base() {
            Some(expr) => self.bind_expression(&expr),
            None => BoundExpr::Error,
        };
        if receiver.ty().is_error() {
            return BoundExpr::Error;
        }
        if !receiver.ty().is_array() && receiver.ty() != Type::String {
            self.diagnostics.report_invalid_array_access(node.text_range());
            return BoundExpr::Error;
        }

        let Some(index) = self.bind_index_operand(node.index()) else {
            return BoundExpr::Error;
        };

        let element_ty = self.element_type_of(receiver.ty());
        BoundExpr::Index {
            receiver: Box::new(receiver),
            index: Box::new(index),
            ty: element_ty,
        }
    }

    fn bind_index_assignment_expression(&mut self, node: &ast::IndexAssignExpr) -> BoundExpr {
        let Some(target) = node.target() else {
            return BoundExpr::Error;
        };

        // Only a plain variable can be written through an index.
        let Some(Expr::Name(name_expr)) = target.base() else {
            self.diagnostics
                .report_invalid_assignment_target(target.text_range());
            return BoundExpr::Error;
        };
        let Some(name_token) = name_expr.name() else {
            return BoundExpr::Error;
        };
        let Some(variable) = self.scope.lookup_variable(name_token.text()).cloned() else {
            self.diagnostics
                .report_undefined_name(name_token.text_range(), name_token.text());
            return BoundExpr::Error;
        };

        if !variable.ty.is_array() && variable.ty != Type::String {
            self.diagnostics
                .report_invalid_array_access(target.text_range());
            return BoundExpr::Error;
        }

        let Some(index) = self.bind_index_operand(target.index()) else {
            return BoundExpr::Error;
        };

        let element_ty = self.element_type_of(variable.ty);
        let (value, value_range) = match node.value() {
            Some(expr) => {
                let range = expr.text_range();
                (self.bind_expression(&expr), range)
            }
            None => (BoundExpr::Error, node.text_range()),
        };

        if value.ty().is_error() {
            return BoundExpr::Error;
        }
        if value.ty() != element_ty {
            self.diagnostics.report_type_mismatch(
                value_range,
                element_ty.name(),
                value.ty().name(),
            );
            return BoundExpr::Error;
        }

        BoundExpr::IndexAssignment {
            variable,
            index: Box::new(index),
            value: Box::new(value),
            ty: element_ty,
        }
    }

    /// Binds an index operand and requires it to be an `int`.
    fn bind_index_operand(&mut self, index: Option<Expr>) -> Option<BoundExpr> {
        let (bound, range) = match index {
            Some(expr) => {
                let range = expr.text_range();
                (self.bind_expression(&expr), range)
            }
            None => return None,
        };
        if bound.ty().is_error() {
            return None;
        }
        if bound.ty() != Type::Int {
            self.diagnostics.report_invalid_array_index(range);
            return None;
        }
        Some(bound)
    }

    fn element_type_of(&self, receiver_ty: Type) -> Type {
        if receiver_ty == Type::String {
            Type::String
        } else {
            receiver_ty.element_type().unwrap_or(Type::Error)
        }
    }

    // --- conversions ---

    fn bind_converted_expression(&mut self, node: Option<Expr>, ty: Type) -> BoundExpr {
        let (bound, range) = match node {
            Some(expr) => {
                let range = expr.text_range();
                (self.bind_expression(&expr), range)
            }
            None => return BoundExpr::Error,
        };
        self.convert(bound, ty, range, false)
    }

    fn convert(
        &mut self,
        expr: BoundExpr,
        ty: Type,
        range: TextRange,
        allow_explicit: bool,
    ) -> BoundExpr {
        let conversion = Conversion::classify(expr.ty(), ty);

        if !conversion.exists() {
            if !expr.ty().is_error() && !ty.is_error() {
                self.diagnostics
                    .report_cannot_convert(range, expr.ty().name(), ty.name());
            }
            return BoundExpr::Error;
        }

        if !allow_explicit && conversion.is_explicit() {
            self.diagnostics
                .report_cannot_convert_implicitly(range, expr.ty().name(), ty.name());
        }

        if conversion.is_identity() {
            return expr;
        }

        BoundExpr::Conversion {
            ty,
            operand: Box::new(expr),
        }
    }

    fn default_value(&mut self, ty: Type, size: usize) -> BoundExpr {
        match ty {
            Type::Int => BoundExpr::int(0),
            Type::Float => BoundExpr::Literal {
                value: Const::Float(0.0),
                ty: Type::Float,
            },
            Type::Bool => BoundExpr::Literal {
                value: Const::Bool(false),
                ty: Type::Bool,
            },
            Type::String => BoundExpr::Literal {
                value: Const::Str(String::new()),
                ty: Type::String,
            },
            Type::Any => BoundExpr::Literal {
                value: Const::Int(0),
                ty: Type::Any,
            },
            Type::Array(elem) => {
                let elements = (0..size)
                    .map(|_| self.default_value(elem.to_type(), 0))
                    .collect();
                BoundExpr::ArrayLiteral { elements, ty }
            }
            Type::Void | Type::Error => BoundExpr::Error,
        }
    }
}
