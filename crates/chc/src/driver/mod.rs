//! Compilation driver and pipeline orchestration

use crate::ast::Program;
use crate::common::CompileResult;
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::sema::SemanticAnalyzer;

/// Options controlling the compilation pipeline
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Dump the token stream to stderr
    pub dump_tokens: bool,
    /// Dump the AST to stderr after parsing
    pub dump_ast: bool,
    /// Report pipeline phases on stderr
    pub verbose: bool,
}

/// Run the pipeline over source text: tokenize, parse, analyze
///
/// Returns the validated AST. The first error at any stage aborts the run;
/// later stages never see invalid input.
pub fn compile(source: &str, options: &CompileOptions) -> CompileResult<Program> {
    if options.verbose {
        eprintln!("Phase 1: Lexical analysis");
    }
    let tokens = Lexer::new(source).tokenize_all()?;

    if options.dump_tokens {
        eprintln!("=== Tokens ===");
        for token in &tokens {
            eprintln!(
                "{:?} @ {}..{}",
                token.kind, token.span.start, token.span.end
            );
        }
        eprintln!("=== End Tokens ===\n");
    }

    if options.verbose {
        eprintln!("Phase 2: Parsing");
    }
    let program = Parser::new(tokens).parse()?;

    if options.dump_ast {
        eprintln!("=== AST ===");
        eprintln!("{:#?}", program);
        eprintln!("=== End AST ===\n");
    }

    if options.verbose {
        eprintln!("Phase 3: Semantic analysis");
    }
    SemanticAnalyzer::new().analyze(&program)?;

    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::CompileError;

    #[test]
    fn test_pipeline_accepts_valid_program() {
        let source = "int cuadrado(int n) { return n * n; }\n\
                      int main() {\n\
                          int x = cuadrado(4);\n\
                          if (x > 10) { print(\"grande\", x); }\n\
                          return 0;\n\
                      }";
        let program = compile(source, &CompileOptions::default()).unwrap();
        assert_eq!(program.functions.len(), 2);
    }

    #[test]
    fn test_pipeline_stops_at_first_failing_stage() {
        // Lexes and parses, fails in semantic analysis
        let source = "int main() { return x; }";
        let err = compile(source, &CompileOptions::default()).unwrap_err();
        assert!(matches!(err, CompileError::Semantic { .. }));

        // Fails before semantic analysis ever runs
        let source = "int main() { return 0 }";
        let err = compile(source, &CompileOptions::default()).unwrap_err();
        assert!(matches!(err, CompileError::Parser { .. }));

        let source = "int main() { int x = 1 @ 2; return x; }";
        let err = compile(source, &CompileOptions::default()).unwrap_err();
        assert!(matches!(err, CompileError::Lexer { .. }));
    }
}
