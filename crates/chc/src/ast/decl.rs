//! Function and parameter AST nodes

use super::{Stmt, Type};
use crate::common::Span;

/// Function definition
#[derive(Debug, Clone)]
pub struct Function {
    pub name: String,
    pub return_type: Type,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

impl Function {
    pub fn new(
        name: String,
        return_type: Type,
        params: Vec<Param>,
        body: Vec<Stmt>,
        span: Span,
    ) -> Self {
        Self {
            name,
            return_type,
            params,
            body,
            span,
        }
    }
}

/// Function parameter
#[derive(Debug, Clone)]
pub struct Param {
    pub ty: Type,
    pub name: String,
    pub span: Span,
}

impl Param {
    pub fn new(ty: Type, name: String, span: Span) -> Self {
        Self { ty, name, span }
    }
}
