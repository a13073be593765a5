//! Semantic analysis: scope resolution and type checking

mod analyzer;
mod scope;

pub use analyzer::SemanticAnalyzer;
pub use scope::{Scope, Symbol, SymbolKind};
