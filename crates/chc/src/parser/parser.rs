//! Recursive descent parser for CH

use crate::ast::*;
use crate::common::{CompileError, CompileResult, Span};
use crate::lexer::{Lexer, Token, TokenKind};

/// Recursive descent parser over a token sequence
///
/// The first structural mismatch aborts the parse with a single diagnostic;
/// there is no error recovery and no partial AST.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Create a parser for the given token sequence
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !matches!(tokens.last().map(|t| &t.kind), Some(TokenKind::Eof)) {
            let end = tokens.last().map_or(0, |t| t.span.end);
            tokens.push(Token::new(TokenKind::Eof, Span::new(end, end)));
        }
        Self { tokens, pos: 0 }
    }

    /// Create a parser directly from source text
    pub fn from_source(source: &str) -> CompileResult<Self> {
        Ok(Self::new(Lexer::new(source).tokenize_all()?))
    }

    /// Parse a complete program
    ///
    /// Post-conditions: a function named `main` exists and is the last one
    /// declared; either violation is a syntax error.
    pub fn parse(&mut self) -> CompileResult<Program> {
        let mut functions = Vec::new();

        while !self.at_end() {
            functions.push(self.parse_function()?);
        }

        let last_span = functions.last().map_or_else(Span::default, |f| f.span);
        if !functions.iter().any(|f| f.name == "main") {
            return Err(CompileError::parser(
                "a 'main' function must be defined",
                last_span,
            ));
        }
        if functions.last().map(|f| f.name.as_str()) != Some("main") {
            return Err(CompileError::parser(
                "the 'main' function must be declared last",
                last_span,
            ));
        }

        Ok(Program::new(functions))
    }

    // =========================================================================
    // Helper methods
    // =========================================================================

    fn at_end(&self) -> bool {
        matches!(self.current().kind, TokenKind::Eof)
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_next(&self) -> Option<&Token> {
        self.tokens.get(self.pos + 1)
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if !matches!(token.kind, TokenKind::Eof) {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current().kind) == std::mem::discriminant(kind)
    }

    fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> CompileResult<Token> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            Err(CompileError::parser(
                format!("expected {}, found {}", kind, self.current().kind),
                self.current().span,
            ))
        }
    }

    fn expect_identifier(&mut self) -> CompileResult<(String, Span)> {
        if let TokenKind::Identifier(name) = &self.current().kind {
            let name = name.clone();
            let span = self.current().span;
            self.advance();
            Ok((name, span))
        } else {
            Err(CompileError::parser(
                format!("expected identifier, found {}", self.current().kind),
                self.current().span,
            ))
        }
    }

    fn parse_type(&mut self) -> CompileResult<Type> {
        if let Some(ty) = Type::from_keyword(&self.current().kind) {
            self.advance();
            Ok(ty)
        } else {
            Err(CompileError::parser(
                format!("expected type, found {}", self.current().kind),
                self.current().span,
            ))
        }
    }

    // =========================================================================
    // Functions
    // =========================================================================

    fn parse_function(&mut self) -> CompileResult<Function> {
        let start_span = self.current().span;
        let return_type = self.parse_type()?;
        let (name, _) = self.expect_identifier()?;

        self.expect(TokenKind::LParen)?;
        let params = self.parse_params()?;
        self.expect(TokenKind::RParen)?;

        self.expect(TokenKind::LBrace)?;
        let body = self.parse_body()?;
        let rbrace = self.expect(TokenKind::RBrace)?;

        Ok(Function::new(
            name,
            return_type,
            params,
            body,
            start_span.merge(rbrace.span),
        ))
    }

    fn parse_params(&mut self) -> CompileResult<Vec<Param>> {
        let mut params = Vec::new();

        if self.current().kind.is_type_keyword() {
            loop {
                let start_span = self.current().span;
                let ty = self.parse_type()?;
                let (name, name_span) = self.expect_identifier()?;
                params.push(Param::new(ty, name, start_span.merge(name_span)));

                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
        }

        Ok(params)
    }

    // =========================================================================
    // Statements
    // =========================================================================

    /// Parse statements until the closing `}` of the enclosing body
    fn parse_body(&mut self) -> CompileResult<Vec<Stmt>> {
        let mut statements = Vec::new();

        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            // Stray semicolons are skipped
            if self.match_token(&TokenKind::Semi) {
                continue;
            }
            statements.push(self.parse_statement()?);
        }

        Ok(statements)
    }

    fn parse_statement(&mut self) -> CompileResult<Stmt> {
        match &self.current().kind {
            TokenKind::If => self.parse_if_statement(),
            TokenKind::While => self.parse_while_statement(),
            TokenKind::For => self.parse_for_statement(),
            TokenKind::Print => self.parse_print_statement(),
            TokenKind::Return => self.parse_return_statement(),

            kind if kind.is_type_keyword() => self.parse_var_decl(),

            TokenKind::Identifier(_) => {
                if matches!(
                    self.peek_next().map(|t| &t.kind),
                    Some(TokenKind::LParen)
                ) {
                    self.parse_call_statement()
                } else {
                    self.parse_assignment()
                }
            }

            other => Err(CompileError::parser(
                format!("expected statement, found {}", other),
                self.current().span,
            )),
        }
    }

    /// Declaration, optionally combined with initialization:
    /// `int a, b = 1, 2;`
    fn parse_var_decl(&mut self) -> CompileResult<Stmt> {
        let start_span = self.current().span;
        let ty = self.parse_type()?;

        let (first, _) = self.expect_identifier()?;
        let mut names = vec![first];
        while self.match_token(&TokenKind::Comma) {
            let (name, _) = self.expect_identifier()?;
            names.push(name);
        }

        let mut inits = Vec::new();
        if self.match_token(&TokenKind::Eq) {
            inits.push(self.parse_expression()?);
            while self.match_token(&TokenKind::Comma) {
                inits.push(self.parse_expression()?);
            }
        }

        if inits.len() > names.len() {
            return Err(CompileError::parser(
                format!(
                    "declaration has {} initializers for {} names",
                    inits.len(),
                    names.len()
                ),
                start_span.merge(self.current().span),
            ));
        }

        let semi = self.expect(TokenKind::Semi)?;
        Ok(Stmt::new(
            StmtKind::VarDecl { ty, names, inits },
            start_span.merge(semi.span),
        ))
    }

    fn parse_assignment(&mut self) -> CompileResult<Stmt> {
        let (target, start_span) = self.expect_identifier()?;
        self.expect(TokenKind::Eq)?;
        let value = self.parse_expression()?;
        let semi = self.expect(TokenKind::Semi)?;

        Ok(Stmt::new(
            StmtKind::Assign { target, value },
            start_span.merge(semi.span),
        ))
    }

    /// Assignment without a trailing `;`, as the update clause of a `for`
    fn parse_update(&mut self) -> CompileResult<Stmt> {
        let (target, start_span) = self.expect_identifier()?;
        self.expect(TokenKind::Eq)?;
        let value = self.parse_expression()?;
        let span = start_span.merge(value.span);

        Ok(Stmt::new(StmtKind::Assign { target, value }, span))
    }

    fn parse_if_statement(&mut self) -> CompileResult<Stmt> {
        let start_span = self.current().span;
        self.expect(TokenKind::If)?;
        self.expect(TokenKind::LParen)?;
        let condition = self.parse_logical_expression()?;
        self.expect(TokenKind::RParen)?;

        self.expect(TokenKind::LBrace)?;
        let then_branch = self.parse_body()?;
        let mut end = self.expect(TokenKind::RBrace)?;

        let else_branch = if self.match_token(&TokenKind::Else) {
            self.expect(TokenKind::LBrace)?;
            let body = self.parse_body()?;
            end = self.expect(TokenKind::RBrace)?;
            body
        } else {
            Vec::new()
        };

        Ok(Stmt::new(
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            },
            start_span.merge(end.span),
        ))
    }

    fn parse_while_statement(&mut self) -> CompileResult<Stmt> {
        let start_span = self.current().span;
        self.expect(TokenKind::While)?;
        self.expect(TokenKind::LParen)?;
        let condition = self.parse_logical_expression()?;
        self.expect(TokenKind::RParen)?;

        self.expect(TokenKind::LBrace)?;
        let body = self.parse_body()?;
        let rbrace = self.expect(TokenKind::RBrace)?;

        Ok(Stmt::new(
            StmtKind::While { condition, body },
            start_span.merge(rbrace.span),
        ))
    }

    fn parse_for_statement(&mut self) -> CompileResult<Stmt> {
        let start_span = self.current().span;
        self.expect(TokenKind::For)?;
        self.expect(TokenKind::LParen)?;

        // Init clause: declaration or assignment, both consume their ';'
        let init = if self.current().kind.is_type_keyword() {
            self.parse_var_decl()?
        } else {
            self.parse_assignment()?
        };

        let condition = self.parse_logical_expression()?;
        self.expect(TokenKind::Semi)?;

        let update = self.parse_update()?;
        self.expect(TokenKind::RParen)?;

        self.expect(TokenKind::LBrace)?;
        let body = self.parse_body()?;
        let rbrace = self.expect(TokenKind::RBrace)?;

        Ok(Stmt::new(
            StmtKind::For {
                init: Box::new(init),
                condition,
                update: Box::new(update),
                body,
            },
            start_span.merge(rbrace.span),
        ))
    }

    fn parse_print_statement(&mut self) -> CompileResult<Stmt> {
        let start_span = self.current().span;
        self.expect(TokenKind::Print)?;
        self.expect(TokenKind::LParen)?;
        let args = self.parse_args()?;
        self.expect(TokenKind::RParen)?;
        let semi = self.expect(TokenKind::Semi)?;

        Ok(Stmt::new(
            StmtKind::Print(args),
            start_span.merge(semi.span),
        ))
    }

    fn parse_return_statement(&mut self) -> CompileResult<Stmt> {
        let start_span = self.current().span;
        self.expect(TokenKind::Return)?;

        let value = if self.check(&TokenKind::Semi) {
            None
        } else {
            Some(self.parse_expression()?)
        };

        let semi = self.expect(TokenKind::Semi)?;
        Ok(Stmt::new(
            StmtKind::Return(value),
            start_span.merge(semi.span),
        ))
    }

    fn parse_call_statement(&mut self) -> CompileResult<Stmt> {
        let (name, start_span) = self.expect_identifier()?;
        self.expect(TokenKind::LParen)?;
        let args = self.parse_args()?;
        self.expect(TokenKind::RParen)?;
        let semi = self.expect(TokenKind::Semi)?;

        Ok(Stmt::new(
            StmtKind::Call { name, args },
            start_span.merge(semi.span),
        ))
    }

    fn parse_args(&mut self) -> CompileResult<Vec<Expr>> {
        let mut args = Vec::new();

        if !self.check(&TokenKind::RParen) {
            loop {
                args.push(self.parse_expression()?);
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
        }

        Ok(args)
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    /// Flat left-associative expression over all operators at a single
    /// precedence level: `expr := term (OP term)*`
    ///
    /// CH has no `*`/`+` precedence distinction; `1 + 2 * 3` is `(1 + 2) * 3`.
    fn parse_expression(&mut self) -> CompileResult<Expr> {
        let mut left = self.parse_term()?;

        while let Some(op) = BinOp::from_token(&self.current().kind) {
            self.advance();
            let right = self.parse_term()?;
            let span = left.span.merge(right.span);
            left = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }

        Ok(left)
    }

    /// Condition expression: `term (logop term)?`
    ///
    /// A leading `=`, `!`, `<` or `>` operator token followed by a `=` token
    /// merges into the two-character comparison operator.
    fn parse_logical_expression(&mut self) -> CompileResult<Expr> {
        let left = self.parse_term()?;

        let Some(first) = BinOp::from_token(&self.current().kind) else {
            return Ok(left);
        };
        self.advance();

        let op = if self.check(&TokenKind::Eq) {
            match first {
                BinOp::Assign => {
                    self.advance();
                    BinOp::Eq
                }
                BinOp::Not => {
                    self.advance();
                    BinOp::Ne
                }
                BinOp::Lt => {
                    self.advance();
                    BinOp::Le
                }
                BinOp::Gt => {
                    self.advance();
                    BinOp::Ge
                }
                other => other,
            }
        } else {
            first
        };

        let right = self.parse_term()?;
        let span = left.span.merge(right.span);

        Ok(Expr::new(
            ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            span,
        ))
    }

    fn parse_term(&mut self) -> CompileResult<Expr> {
        let token = self.current().clone();

        match token.kind {
            TokenKind::Number(text) => {
                self.advance();
                Ok(Expr::new(ExprKind::Number(text), token.span))
            }
            TokenKind::Str(text) => {
                self.advance();
                Ok(Expr::new(ExprKind::Str(text), token.span))
            }
            TokenKind::Identifier(name) => {
                if matches!(
                    self.peek_next().map(|t| &t.kind),
                    Some(TokenKind::LParen)
                ) {
                    self.parse_call_expression()
                } else {
                    self.advance();
                    Ok(Expr::new(ExprKind::Identifier(name), token.span))
                }
            }
            other => Err(CompileError::parser(
                format!("expected expression, found {}", other),
                token.span,
            )),
        }
    }

    fn parse_call_expression(&mut self) -> CompileResult<Expr> {
        let (name, start_span) = self.expect_identifier()?;
        self.expect(TokenKind::LParen)?;
        let args = self.parse_args()?;
        let rparen = self.expect(TokenKind::RParen)?;

        Ok(Expr::new(
            ExprKind::Call { name, args },
            start_span.merge(rparen.span),
        ))
    }
}
