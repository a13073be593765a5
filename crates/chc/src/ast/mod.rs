//! Abstract Syntax Tree definitions

mod decl;
mod expr;
mod stmt;
mod types;

pub use decl::*;
pub use expr::*;
pub use stmt::*;
pub use types::*;

/// A complete CH program
///
/// Functions are kept in declaration order; the parser guarantees a `main`
/// function exists and is declared last.
#[derive(Debug, Clone)]
pub struct Program {
    pub functions: Vec<Function>,
}

impl Program {
    pub fn new(functions: Vec<Function>) -> Self {
        Self { functions }
    }
}
