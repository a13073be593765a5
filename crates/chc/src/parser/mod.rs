//! Recursive descent parser producing a CH program AST

mod parser;

pub use parser::Parser;
