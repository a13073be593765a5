//! Semantic analyzer - type checking and validation

use super::scope::{Scope, Symbol, SymbolKind};
use crate::ast::*;
use crate::common::{CompileError, CompileResult, Span};

/// Semantic analyzer for scope resolution and type checking
///
/// The AST is not mutated; expression analysis returns the inferred type,
/// where `None` is the indeterminate type that suppresses further checks
/// at the consuming node.
pub struct SemanticAnalyzer {
    scope: Scope,
    current_function: Option<CurrentFunction>,
}

struct CurrentFunction {
    name: String,
    return_type: Type,
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        Self {
            scope: Scope::new(),
            current_function: None,
        }
    }

    /// Analyze a complete program
    pub fn analyze(&mut self, program: &Program) -> CompileResult<()> {
        for function in &program.functions {
            self.analyze_function(function)?;
        }
        Ok(())
    }

    fn analyze_function(&mut self, function: &Function) -> CompileResult<()> {
        if self.scope.lookup_local(&function.name).is_some() {
            return Err(CompileError::semantic(
                format!("function '{}' already declared", function.name),
                function.span,
            ));
        }

        let signature = Symbol {
            name: function.name.clone(),
            kind: SymbolKind::Function {
                params: function.params.iter().map(|p| p.ty).collect(),
            },
            ty: function.return_type,
        };
        self.scope
            .define(signature)
            .map_err(|e| CompileError::semantic(e, function.span))?;

        self.scope.push_child();
        for param in &function.params {
            let symbol = Symbol {
                name: param.name.clone(),
                kind: SymbolKind::Parameter,
                ty: param.ty,
            };
            self.scope
                .define(symbol)
                .map_err(|e| CompileError::semantic(e, param.span))?;
        }

        self.current_function = Some(CurrentFunction {
            name: function.name.clone(),
            return_type: function.return_type,
        });

        let result = self.analyze_body(&function.body);

        self.current_function = None;
        self.scope.pop_to_parent();

        result
    }

    fn analyze_body(&mut self, body: &[Stmt]) -> CompileResult<()> {
        for stmt in body {
            self.analyze_statement(stmt)?;
        }
        Ok(())
    }

    fn analyze_statement(&mut self, stmt: &Stmt) -> CompileResult<()> {
        match &stmt.kind {
            StmtKind::VarDecl { ty, names, inits } => {
                self.analyze_var_decl(*ty, names, inits, stmt)
            }
            StmtKind::Assign { target, value } => self.analyze_assignment(target, value, stmt),
            StmtKind::Return(value) => self.analyze_return(value.as_ref(), stmt),
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.check_condition(condition, "if")?;
                self.analyze_body(then_branch)?;
                self.analyze_body(else_branch)
            }
            StmtKind::While { condition, body } => {
                self.check_condition(condition, "while")?;
                self.analyze_body(body)
            }
            StmtKind::For {
                init,
                condition,
                update,
                body,
            } => {
                // The loop header and body share one child scope, so a name
                // declared in the init clause is visible in the body and
                // shadows an outer declaration.
                self.scope.push_child();
                let result = self.analyze_for(init, condition, update, body);
                self.scope.pop_to_parent();
                result
            }
            StmtKind::Print(args) => {
                for arg in args {
                    self.analyze_expr(arg)?;
                }
                Ok(())
            }
            StmtKind::Block(body) => self.analyze_body(body),
            StmtKind::Call { name, args } => {
                self.analyze_call(name, args, stmt.span)?;
                Ok(())
            }
        }
    }

    fn analyze_var_decl(
        &mut self,
        ty: Type,
        names: &[String],
        inits: &[Expr],
        stmt: &Stmt,
    ) -> CompileResult<()> {
        for (i, name) in names.iter().enumerate() {
            if self.scope.lookup_local(name).is_some() {
                return Err(CompileError::semantic(
                    format!("variable '{}' already declared in this scope", name),
                    stmt.span,
                ));
            }

            let symbol = Symbol {
                name: name.clone(),
                kind: SymbolKind::Variable,
                ty,
            };
            self.scope
                .define(symbol)
                .map_err(|e| CompileError::semantic(e, stmt.span))?;

            // Initializers are matched to names positionally; trailing names
            // stay uninitialized
            if let Some(init) = inits.get(i) {
                if let Some(value_ty) = self.analyze_expr(init)? {
                    if value_ty != ty {
                        return Err(CompileError::type_error(
                            format!(
                                "cannot assign a value of type '{}' to a variable of type '{}'",
                                value_ty, ty
                            ),
                            init.span,
                        ));
                    }
                }
            }
        }

        Ok(())
    }

    fn analyze_assignment(&mut self, target: &str, value: &Expr, stmt: &Stmt) -> CompileResult<()> {
        let target_ty = match self.scope.lookup(target) {
            Some(symbol) => match symbol.kind {
                SymbolKind::Variable | SymbolKind::Parameter => symbol.ty,
                SymbolKind::Function { .. } => {
                    return Err(CompileError::semantic(
                        format!("'{}' is a function, not a variable", target),
                        stmt.span,
                    ));
                }
            },
            None => {
                return Err(CompileError::semantic(
                    format!("variable '{}' is not declared", target),
                    stmt.span,
                ));
            }
        };

        if let Some(value_ty) = self.analyze_expr(value)? {
            if value_ty != target_ty {
                return Err(CompileError::type_error(
                    format!(
                        "cannot assign a value of type '{}' to a variable of type '{}'",
                        value_ty, target_ty
                    ),
                    value.span,
                ));
            }
        }

        Ok(())
    }

    fn analyze_return(&mut self, value: Option<&Expr>, stmt: &Stmt) -> CompileResult<()> {
        let (name, expected) = match &self.current_function {
            Some(current) => (current.name.clone(), current.return_type),
            None => {
                return Err(CompileError::semantic(
                    "'return' outside of a function",
                    stmt.span,
                ));
            }
        };

        match value {
            None => {
                if expected != Type::Void {
                    return Err(CompileError::type_error(
                        format!(
                            "function '{}' must return a value of type '{}'",
                            name, expected
                        ),
                        stmt.span,
                    ));
                }
                Ok(())
            }
            Some(expr) => {
                if expected == Type::Void {
                    return Err(CompileError::type_error(
                        format!("function '{}' returns 'void' and cannot return a value", name),
                        expr.span,
                    ));
                }
                if let Some(value_ty) = self.analyze_expr(expr)? {
                    if value_ty != expected {
                        return Err(CompileError::type_error(
                            format!(
                                "function '{}' must return '{}', found '{}'",
                                name, expected, value_ty
                            ),
                            expr.span,
                        ));
                    }
                }
                Ok(())
            }
        }
    }

    fn analyze_for(
        &mut self,
        init: &Stmt,
        condition: &Expr,
        update: &Stmt,
        body: &[Stmt],
    ) -> CompileResult<()> {
        self.analyze_statement(init)?;
        self.check_condition(condition, "for")?;
        self.analyze_statement(update)?;
        self.analyze_body(body)
    }

    /// Conditions must be exactly `int`; an indeterminate type skips the check
    fn check_condition(&mut self, condition: &Expr, construct: &str) -> CompileResult<()> {
        if let Some(ty) = self.analyze_expr(condition)? {
            if ty != Type::Int {
                return Err(CompileError::type_error(
                    format!(
                        "'{}' condition must be of type 'int', found '{}'",
                        construct, ty
                    ),
                    condition.span,
                ));
            }
        }
        Ok(())
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn analyze_expr(&mut self, expr: &Expr) -> CompileResult<Option<Type>> {
        match &expr.kind {
            ExprKind::Number(text) => {
                if text.contains('.') {
                    Ok(Some(Type::Float))
                } else {
                    Ok(Some(Type::Int))
                }
            }

            // The raw literal keeps its quotes; a single character between
            // them is a char
            ExprKind::Str(text) => {
                let content = &text[1..text.len() - 1];
                if content.chars().count() == 1 {
                    Ok(Some(Type::Char))
                } else {
                    Ok(Some(Type::Str))
                }
            }

            ExprKind::Identifier(name) => match self.scope.lookup(name) {
                Some(symbol) => match symbol.kind {
                    SymbolKind::Variable | SymbolKind::Parameter => Ok(Some(symbol.ty)),
                    SymbolKind::Function { .. } => Err(CompileError::semantic(
                        format!("'{}' is a function, not a variable", name),
                        expr.span,
                    )),
                },
                None => Err(CompileError::semantic(
                    format!("variable '{}' is not declared", name),
                    expr.span,
                )),
            },

            ExprKind::Call { name, args } => self.analyze_call(name, args, expr.span),

            ExprKind::Binary { op, left, right } => {
                let left_ty = self.analyze_expr(left)?;
                let right_ty = self.analyze_expr(right)?;

                let (Some(left_ty), Some(right_ty)) = (left_ty, right_ty) else {
                    return Ok(None);
                };

                if op.is_arithmetic() {
                    if !left_ty.is_numeric() || !right_ty.is_numeric() {
                        return Err(CompileError::type_error(
                            format!(
                                "operator '{}' not applicable to types '{}' and '{}'",
                                op, left_ty, right_ty
                            ),
                            expr.span,
                        ));
                    }
                    if left_ty == Type::Float || right_ty == Type::Float {
                        Ok(Some(Type::Float))
                    } else {
                        Ok(Some(Type::Int))
                    }
                } else if op.is_comparison() {
                    if left_ty != right_ty {
                        return Err(CompileError::type_error(
                            format!(
                                "cannot compare values of different types '{}' and '{}'",
                                left_ty, right_ty
                            ),
                            expr.span,
                        ));
                    }
                    Ok(Some(Type::Int))
                } else if op.is_logical() {
                    if left_ty != Type::Int || right_ty != Type::Int {
                        return Err(CompileError::type_error(
                            format!("operator '{}' requires 'int' operands", op),
                            expr.span,
                        ));
                    }
                    Ok(Some(Type::Int))
                } else {
                    // '=' and '!' survive the flat expression grammar but
                    // have no value; the type stays indeterminate
                    Ok(None)
                }
            }
        }
    }

    fn analyze_call(
        &mut self,
        name: &str,
        args: &[Expr],
        span: Span,
    ) -> CompileResult<Option<Type>> {
        let (params, return_type) = self.lookup_function(name, span)?;
        self.check_call_args(name, args, &params, span)?;
        Ok(Some(return_type))
    }

    fn lookup_function(
        &self,
        name: &str,
        span: Span,
    ) -> CompileResult<(Vec<Type>, Type)> {
        match self.scope.lookup(name) {
            Some(symbol) => match &symbol.kind {
                SymbolKind::Function { params } => Ok((params.clone(), symbol.ty)),
                _ => Err(CompileError::semantic(
                    format!("'{}' is not a function", name),
                    span,
                )),
            },
            None => Err(CompileError::semantic(
                format!("function '{}' is not declared", name),
                span,
            )),
        }
    }

    fn check_call_args(
        &mut self,
        name: &str,
        args: &[Expr],
        params: &[Type],
        span: Span,
    ) -> CompileResult<()> {
        if args.len() != params.len() {
            return Err(CompileError::semantic(
                format!(
                    "function '{}' expects {} arguments, found {}",
                    name,
                    params.len(),
                    args.len()
                ),
                span,
            ));
        }

        for (i, (arg, expected)) in args.iter().zip(params).enumerate() {
            if let Some(arg_ty) = self.analyze_expr(arg)? {
                if arg_ty != *expected {
                    return Err(CompileError::type_error(
                        format!(
                            "argument {} of '{}' must be of type '{}', found '{}'",
                            i + 1,
                            name,
                            expected,
                            arg_ty
                        ),
                        arg.span,
                    ));
                }
            }
        }

        Ok(())
    }
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Span;
    use crate::parser::Parser;

    fn analyze_source(source: &str) -> CompileResult<()> {
        let program = Parser::from_source(source)?.parse()?;
        SemanticAnalyzer::new().analyze(&program)
    }

    #[test]
    fn test_valid_program_passes() {
        let source = "int suma(int a, int b) { return a + b; }\n\
                      int main() {\n\
                          int s = 0;\n\
                          for (int i = 0; i < 10; i = i + 1) { s = s + i; }\n\
                          print(\"total\", s);\n\
                          return suma(s, 1);\n\
                      }";
        analyze_source(source).unwrap();
    }

    #[test]
    fn test_duplicate_declaration_fails() {
        let err = analyze_source("int main() { int x = 1; int x = 2; return x; }").unwrap_err();
        assert!(matches!(err, CompileError::Semantic { .. }));
    }

    #[test]
    fn test_undeclared_variable_fails() {
        let err = analyze_source("int main() { x = 1; return 0; }").unwrap_err();

        match err {
            CompileError::Semantic { message, .. } => {
                assert!(message.contains("not declared"));
            }
            other => panic!("expected semantic error, got {:?}", other),
        }
    }

    #[test]
    fn test_undeclared_in_expression_fails() {
        let err = analyze_source("int main() { int x = y + 1; return x; }").unwrap_err();
        assert!(matches!(err, CompileError::Semantic { .. }));
    }

    #[test]
    fn test_literal_classification() {
        // 3.5 is float, 'a' with one character is char, longer text is string
        analyze_source("int main() { float f = 3.5; char c = \"a\"; return 0; }").unwrap();

        let err = analyze_source("int main() { char c = \"ab\"; return 0; }").unwrap_err();
        assert!(matches!(err, CompileError::Type { .. }));
    }

    #[test]
    fn test_float_contagion() {
        analyze_source("int main() { float f = 1 + 2.5; return 0; }").unwrap();

        let err = analyze_source("int main() { int x = 1 + 2.5; return x; }").unwrap_err();
        assert!(matches!(err, CompileError::Type { .. }));
    }

    #[test]
    fn test_arithmetic_rejects_non_numeric() {
        let err =
            analyze_source("int main() { char c = \"a\"; int x = c + 1; return x; }").unwrap_err();

        match err {
            CompileError::Type { message, .. } => {
                assert!(message.contains("not applicable"));
            }
            other => panic!("expected type error, got {:?}", other),
        }
    }

    #[test]
    fn test_comparison_requires_identical_types() {
        analyze_source("int main() { int x = 1; if (x == 2) { x = 3; } return x; }").unwrap();

        let err = analyze_source(
            "int main() { int x = 1; if (x == 2.5) { x = 3; } return x; }",
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::Type { .. }));
    }

    #[test]
    fn test_condition_must_be_int() {
        let err = analyze_source(
            "int main() { float f = 1.5; while (f) { f = 2.5; } return 0; }",
        )
        .unwrap_err();

        match err {
            CompileError::Type { message, .. } => {
                assert!(message.contains("condition"));
            }
            other => panic!("expected type error, got {:?}", other),
        }
    }

    #[test]
    fn test_logical_requires_int_operands() {
        let mut analyzer = SemanticAnalyzer::new();

        let int_lit = |text: &str| Expr::new(ExprKind::Number(text.to_string()), Span::default());
        let both_int = Expr::new(
            ExprKind::Binary {
                op: BinOp::And,
                left: Box::new(int_lit("1")),
                right: Box::new(int_lit("2")),
            },
            Span::default(),
        );
        assert_eq!(analyzer.analyze_expr(&both_int).unwrap(), Some(Type::Int));

        let mixed = Expr::new(
            ExprKind::Binary {
                op: BinOp::Or,
                left: Box::new(int_lit("1")),
                right: Box::new(int_lit("2.5")),
            },
            Span::default(),
        );
        assert!(matches!(
            analyzer.analyze_expr(&mixed),
            Err(CompileError::Type { .. })
        ));
    }

    #[test]
    fn test_for_scope_is_child_of_function_scope() {
        // The loop body sees function locals, and the loop counter shadows
        // an outer name without a duplicate error
        let source = "int main() {\n\
                          int s = 0;\n\
                          int i = 100;\n\
                          for (int i = 0; i < 3; i = i + 1) { s = s + i; }\n\
                          return s + i;\n\
                      }";
        analyze_source(source).unwrap();
    }

    #[test]
    fn test_for_counter_not_visible_after_loop() {
        let source = "int main() {\n\
                          for (int i = 0; i < 3; i = i + 1) { print(i); }\n\
                          return i;\n\
                      }";
        let err = analyze_source(source).unwrap_err();
        assert!(matches!(err, CompileError::Semantic { .. }));
    }

    #[test]
    fn test_duplicate_function_fails() {
        let source = "int f() { return 1; }\n\
                      int f() { return 2; }\n\
                      int main() { return f(); }";
        let err = analyze_source(source).unwrap_err();

        match err {
            CompileError::Semantic { message, .. } => {
                assert!(message.contains("already declared"));
            }
            other => panic!("expected semantic error, got {:?}", other),
        }
    }

    #[test]
    fn test_call_checks_declaration_and_arity() {
        let err = analyze_source("int main() { return f(); }").unwrap_err();
        assert!(matches!(err, CompileError::Semantic { .. }));

        let source = "int suma(int a, int b) { return a + b; }\n\
                      int main() { return suma(1); }";
        let err = analyze_source(source).unwrap_err();

        match err {
            CompileError::Semantic { message, .. } => {
                assert!(message.contains("expects 2 arguments"));
            }
            other => panic!("expected semantic error, got {:?}", other),
        }
    }

    #[test]
    fn test_call_checks_argument_types() {
        let source = "int suma(int a, int b) { return a + b; }\n\
                      int main() { return suma(1, 2.5); }";
        let err = analyze_source(source).unwrap_err();

        match err {
            CompileError::Type { message, .. } => {
                assert!(message.contains("argument 2"));
            }
            other => panic!("expected type error, got {:?}", other),
        }
    }

    #[test]
    fn test_call_has_declared_return_type() {
        let source = "float media(int a, int b) { return a / 2.0 + b / 2.0; }\n\
                      int main() { float m = media(1, 2); return 0; }";
        analyze_source(source).unwrap();

        let bad = "float media(int a, int b) { return a / 2.0 + b / 2.0; }\n\
                   int main() { int m = media(1, 2); return m; }";
        let err = analyze_source(bad).unwrap_err();
        assert!(matches!(err, CompileError::Type { .. }));
    }

    #[test]
    fn test_return_outside_function_fails() {
        let mut analyzer = SemanticAnalyzer::new();
        let stmt = Stmt::new(StmtKind::Return(None), Span::default());

        let err = analyzer.analyze_statement(&stmt).unwrap_err();
        match err {
            CompileError::Semantic { message, .. } => {
                assert!(message.contains("outside of a function"));
            }
            other => panic!("expected semantic error, got {:?}", other),
        }
    }

    #[test]
    fn test_void_return_rules() {
        analyze_source("void f() { return; }\nint main() { f(); return 0; }").unwrap();

        let err =
            analyze_source("void f() { return 1; }\nint main() { return 0; }").unwrap_err();
        assert!(matches!(err, CompileError::Type { .. }));

        let err = analyze_source("int f() { return; }\nint main() { return f(); }").unwrap_err();
        assert!(matches!(err, CompileError::Type { .. }));
    }

    #[test]
    fn test_return_type_must_match() {
        let err = analyze_source("int main() { return 2.5; }").unwrap_err();

        match err {
            CompileError::Type { message, .. } => {
                assert!(message.contains("must return 'int'"));
            }
            other => panic!("expected type error, got {:?}", other),
        }
    }

    #[test]
    fn test_function_name_is_not_a_variable() {
        let source = "int f() { return 1; }\n\
                      int main() { int x = f + 1; return x; }";
        let err = analyze_source(source).unwrap_err();

        match err {
            CompileError::Semantic { message, .. } => {
                assert!(message.contains("is a function"));
            }
            other => panic!("expected semantic error, got {:?}", other),
        }
    }

    #[test]
    fn test_indeterminate_type_suppresses_checks() {
        // 'a = 2' in value position has no type, so the declaration check
        // is skipped instead of reporting a second error
        let source = "int main() { int a = 1; float x = a = 2; return 0; }";
        analyze_source(source).unwrap();
    }

    #[test]
    fn test_parameters_are_in_scope() {
        let source = "int doble(int n) { return n + n; }\n\
                      int main() { return doble(21); }";
        analyze_source(source).unwrap();
    }

    #[test]
    fn test_duplicate_parameter_fails() {
        let source = "int f(int a, int a) { return a; }\nint main() { return f(1, 2); }";
        let err = analyze_source(source).unwrap_err();
        assert!(matches!(err, CompileError::Semantic { .. }));
    }
}
