//! Scope chain for name resolution.
//!
//! Scopes form a stack of frames: the root frame pre-declares built-ins,
//! one frame per earlier REPL submission follows, and the binder pushes a
//! fresh frame per block. Lookup walks top-down, which is what makes inner
//! declarations shadow outer ones.

use indexmap::IndexMap;

use crate::symbols::{FunctionSymbol, VariableSymbol, builtins};

#[derive(Debug, Default)]
struct Frame {
    variables: IndexMap<String, VariableSymbol>,
    functions: IndexMap<String, FunctionSymbol>,
}

#[derive(Debug)]
pub struct ScopeStack {
    frames: Vec<Frame>,
}

impl ScopeStack {
    /// A scope chain whose root frame holds the built-in functions.
    pub fn with_builtins() -> Self {
        let mut root = Frame::default();
        for function in builtins::all() {
            root.functions.insert(function.name.clone(), function);
        }
        Self { frames: vec![root] }
    }

    pub fn push(&mut self) {
        self.frames.push(Frame::default());
    }

    pub fn pop(&mut self) {
        assert!(self.frames.len() > 1, "cannot pop the root scope");
        self.frames.pop();
    }

    /// Declares a variable in the innermost frame. Fails when the name is
    /// already taken in that frame.
    pub fn try_declare_variable(&mut self, symbol: VariableSymbol) -> bool {
        let frame = self.frames.last_mut().expect("scope stack is never empty");
        if frame.variables.contains_key(&symbol.name) {
            return false;
        }
        frame.variables.insert(symbol.name.clone(), symbol);
        true
    }

    pub fn try_declare_function(&mut self, symbol: FunctionSymbol) -> bool {
        let frame = self.frames.last_mut().expect("scope stack is never empty");
        if frame.functions.contains_key(&symbol.name) {
            return false;
        }
        frame.functions.insert(symbol.name.clone(), symbol);
        true
    }

    /// Innermost declaration wins.
    pub fn lookup_variable(&self, name: &str) -> Option<&VariableSymbol> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.variables.get(name))
    }

    pub fn lookup_function(&self, name: &str) -> Option<&FunctionSymbol> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.functions.get(name))
    }

    /// Variables declared in the innermost frame, in declaration order.
    pub fn declared_variables(&self) -> Vec<VariableSymbol> {
        self.frames
            .last()
            .expect("scope stack is never empty")
            .variables
            .values()
            .cloned()
            .collect()
    }

    pub fn declared_functions(&self) -> Vec<FunctionSymbol> {
        self.frames
            .last()
            .expect("scope stack is never empty")
            .functions
            .values()
            .cloned()
            .collect()
    }
}
