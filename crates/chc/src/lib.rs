//! CH Compiler - front end for the CH language
//!
//! CH is a small C-like language produced by flowchart editors. This library
//! tokenizes, parses and type-checks CH source; the validated AST is the
//! hand-off artifact for downstream consumers.
//!
//! ## Architecture
//!
//! The front end is organized into:
//! - **Lexer** (`lexer/`): tokenizer built on a derived state machine
//! - **Parser** (`parser/`): recursive descent parser producing the AST
//! - **Sema** (`sema/`): scope-aware semantic analysis and type checking
//! - **Driver** (`driver/`): pipeline orchestration
//! - **Common** (`common/`): shared infrastructure (errors, spans)

pub mod ast;
pub mod common;
pub mod driver;
pub mod lexer;
pub mod parser;
pub mod sema;

// Re-exports for convenience
pub use common::{CompileError, CompileResult, DiagnosticReporter, Span};
pub use driver::{CompileOptions, compile};
