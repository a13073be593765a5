//! Type tags in the AST

use crate::lexer::TokenKind;

/// CH type tag
///
/// `Str` is never written in source; it only arises from literal inference
/// during semantic analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    Int,
    Float,
    Void,
    Double,
    Char,
    Str,
}

impl Type {
    /// Map a type keyword token to its type tag
    pub fn from_keyword(kind: &TokenKind) -> Option<Type> {
        match kind {
            TokenKind::Int => Some(Type::Int),
            TokenKind::Float => Some(Type::Float),
            TokenKind::Void => Some(Type::Void),
            TokenKind::Double => Some(Type::Double),
            TokenKind::Char => Some(Type::Char),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Type::Int => "int",
            Type::Float => "float",
            Type::Void => "void",
            Type::Double => "double",
            Type::Char => "char",
            Type::Str => "string",
        }
    }

    /// Check if this type participates in arithmetic
    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Int | Type::Float)
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
