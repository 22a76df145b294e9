//! Types and symbols.
//!
//! The type set is closed: the five scalar types, element-typed arrays, and
//! the `error` sentinel that suppresses diagnostic cascades. Symbols carry
//! arena-style ids unique within a compilation chain; the evaluator keys its
//! environments by id, which is what lets shadowed variables coexist after
//! lowering flattens block structure away.

use serde::Serialize;

use crate::parser::ast::FunctionItem;

/// Element type of an array. `array<void>` and nested arrays do not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElemType {
    Int,
    Float,
    Bool,
    String,
    Any,
}

impl ElemType {
    pub fn to_type(self) -> Type {
        match self {
            ElemType::Int => Type::Int,
            ElemType::Float => Type::Float,
            ElemType::Bool => Type::Bool,
            ElemType::String => Type::String,
            ElemType::Any => Type::Any,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Type {
    Int,
    Float,
    Bool,
    String,
    Void,
    Any,
    Array(ElemType),
    /// Sentinel for failed binding; compares equal to itself only so error
    /// expressions keep flowing without new diagnostics.
    Error,
}

impl Type {
    /// Resolves a type name as written in source. Array types are spelled
    /// with a `[]` suffix handled by the type-clause binder, not by name.
    pub fn from_name(name: &str) -> Option<Type> {
        match name {
            "int" => Some(Type::Int),
            "float" => Some(Type::Float),
            "bool" => Some(Type::Bool),
            "string" => Some(Type::String),
            "any" => Some(Type::Any),
            _ => None,
        }
    }

    pub fn is_array(self) -> bool {
        matches!(self, Type::Array(_))
    }

    pub fn element_type(self) -> Option<Type> {
        match self {
            Type::Array(elem) => Some(elem.to_type()),
            _ => None,
        }
    }

    /// The array type with `self` as element, if such a type exists.
    pub fn array_of(self) -> Option<Type> {
        let elem = match self {
            Type::Int => ElemType::Int,
            Type::Float => ElemType::Float,
            Type::Bool => ElemType::Bool,
            Type::String => ElemType::String,
            Type::Any => ElemType::Any,
            _ => return None,
        };
        Some(Type::Array(elem))
    }

    pub fn is_error(self) -> bool {
        self == Type::Error
    }

    pub fn name(self) -> &'static str {
        match self {
            Type::Int => "int",
            Type::Float => "float",
            Type::Bool => "bool",
            Type::String => "string",
            Type::Void => "void",
            Type::Any => "any",
            Type::Array(ElemType::Int) => "int[]",
            Type::Array(ElemType::Float) => "float[]",
            Type::Array(ElemType::Bool) => "bool[]",
            Type::Array(ElemType::String) => "string[]",
            Type::Array(ElemType::Any) => "any[]",
            Type::Error => "?",
        }
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Identity of a symbol within a compilation chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SymbolId(pub u32);

/// Ids below this are reserved for built-in functions and their parameters.
pub const FIRST_USER_SYMBOL_ID: u32 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    Global,
    Local,
    Parameter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableSymbol {
    pub id: SymbolId,
    pub name: String,
    pub kind: VariableKind,
    pub read_only: bool,
    pub ty: Type,
}

impl VariableSymbol {
    pub fn new(
        id: SymbolId,
        name: impl Into<String>,
        kind: VariableKind,
        read_only: bool,
        ty: Type,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            read_only,
            ty,
        }
    }
}

impl std::fmt::Display for VariableSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.ty)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSymbol {
    pub id: SymbolId,
    pub name: String,
    /// Parameters are variable symbols of kind `Parameter`; call evaluation
    /// seeds the callee frame with their ids.
    pub parameters: Vec<VariableSymbol>,
    pub return_type: Type,
    /// `None` for built-ins, which the evaluator dispatches by name.
    pub declaration: Option<FunctionItem>,
}

impl FunctionSymbol {
    pub fn is_builtin(&self) -> bool {
        self.declaration.is_none()
    }
}

impl std::fmt::Display for FunctionSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "function {}(", self.name)?;
        for (i, parameter) in self.parameters.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{parameter}")?;
        }
        write!(f, "): {}", self.return_type)
    }
}

/// Built-in functions pre-declared in the root scope.
pub mod builtins {
    use super::*;

    pub const PRINT: &str = "print";
    pub const INPUT: &str = "input";
    pub const RANDOM: &str = "random";
    pub const ARRAY_SIZE: &str = "size";
    pub const STRING_LEN: &str = "len";

    fn builtin(
        id: u32,
        name: &str,
        parameters: Vec<(u32, &str, Type)>,
        return_type: Type,
    ) -> FunctionSymbol {
        FunctionSymbol {
            id: SymbolId(id),
            name: name.to_string(),
            parameters: parameters
                .into_iter()
                .map(|(pid, pname, ty)| {
                    VariableSymbol::new(SymbolId(pid), pname, VariableKind::Parameter, true, ty)
                })
                .collect(),
            return_type,
            declaration: None,
        }
    }

    /// All built-ins, with ids below [`FIRST_USER_SYMBOL_ID`].
    pub fn all() -> Vec<FunctionSymbol> {
        vec![
            builtin(0, PRINT, vec![(1, "text", Type::String)], Type::Void),
            builtin(2, INPUT, vec![], Type::String),
            builtin(3, RANDOM, vec![(4, "max", Type::Int)], Type::Int),
            builtin(
                5,
                ARRAY_SIZE,
                vec![(6, "array", Type::Array(ElemType::Any))],
                Type::Int,
            ),
            builtin(7, STRING_LEN, vec![(8, "text", Type::String)], Type::Int),
        ]
    }
}

#[cfg(test)]
mod symbols_tests {
    use super::*;

    #[test]
    fn type_names_round_trip() {
        for ty in [Type::Int, Type::Float, Type::Bool, Type::String, Type::Any] {
            assert_eq!(Type::from_name(ty.name()), Some(ty));
        }
        assert_eq!(Type::from_name("void"), None);
        assert_eq!(Type::from_name("unknown"), None);
    }

    #[test]
    fn array_element_round_trip() {
        let array = Type::Int.array_of().unwrap();
        assert!(array.is_array());
        assert_eq!(array.element_type(), Some(Type::Int));
        assert_eq!(array.name(), "int[]");
        assert_eq!(Type::Void.array_of(), None);
        assert_eq!(Type::Error.array_of(), None);
    }

    #[test]
    fn builtins_stay_below_user_ids() {
        for function in builtins::all() {
            assert!(function.id.0 < FIRST_USER_SYMBOL_ID);
            assert!(function.is_builtin());
            for parameter in &function.parameters {
                assert!(parameter.id.0 < FIRST_USER_SYMBOL_ID);
            }
        }
    }
}
