//! Statement AST nodes

use super::{Expr, Type};
use crate::common::Span;

/// Statement node
#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Statement kinds
#[derive(Debug, Clone)]
pub enum StmtKind {
    /// Variable declaration: int a, b = 1, 2;
    ///
    /// One type, one or more names, and an optional initializer list
    /// attached to the whole declaration, matched to names positionally.
    VarDecl {
        ty: Type,
        names: Vec<String>,
        inits: Vec<Expr>,
    },

    /// Assignment to a previously declared name: x = 5;
    Assign { target: String, value: Expr },

    /// Return statement: return [expr];
    Return(Option<Expr>),

    /// If statement; the else branch is empty when absent
    If {
        condition: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Vec<Stmt>,
    },

    /// While loop: while (cond) { ... }
    While { condition: Expr, body: Vec<Stmt> },

    /// For loop: for (init; cond; update) { ... }
    ///
    /// `init` is a declaration or assignment, `update` an assignment.
    For {
        init: Box<Stmt>,
        condition: Expr,
        update: Box<Stmt>,
        body: Vec<Stmt>,
    },

    /// Print statement: print(expr, ...);
    Print(Vec<Expr>),

    /// Statement sequence analyzed in the current scope
    Block(Vec<Stmt>),

    /// Function call used as a statement: foo(a, b);
    Call { name: String, args: Vec<Expr> },
}
