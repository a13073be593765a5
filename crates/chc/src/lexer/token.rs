//! Token definitions for the CH lexer

use crate::common::Span;
use logos::Logos;

/// Token with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// All token kinds in CH
///
/// Keywords are listed as fixed tokens so they always win over the
/// identifier pattern. Operators are single characters only; the parser
/// combines adjacent operator tokens where the grammar needs `==`, `!=`,
/// `<=` or `>=`.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r\f]+")] // Skip whitespace
pub enum TokenKind {
    // === Keywords ===
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("switch")]
    Switch,
    #[token("case")]
    Case,
    #[token("return")]
    Return,
    #[token("print")]
    Print,
    #[token("break")]
    Break,
    #[token("for")]
    For,
    #[token("int")]
    Int,
    #[token("float")]
    Float,
    #[token("void")]
    Void,
    #[token("double")]
    Double,
    #[token("char")]
    Char,

    // === Identifiers ===
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    // === Literals ===
    // Integer or decimal number, kept as raw text and classified during
    // semantic analysis
    #[regex(r"[0-9]+(\.[0-9]+)?", |lex| lex.slice().to_string())]
    Number(String),

    // String literal, kept with its quotes
    #[regex(r#""[^"]*""#, |lex| lex.slice().to_string())]
    Str(String),

    // === Operators (single characters only) ===
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("=")]
    Eq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("!")]
    Bang,

    // === Delimiters ===
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,

    // Special
    Eof,
}

impl TokenKind {
    /// Check if this token is a type keyword
    pub fn is_type_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Int
                | TokenKind::Float
                | TokenKind::Void
                | TokenKind::Double
                | TokenKind::Char
        )
    }

    /// Check if this token belongs to the operator class
    pub fn is_operator(&self) -> bool {
        matches!(
            self,
            TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Star
                | TokenKind::Slash
                | TokenKind::Eq
                | TokenKind::Lt
                | TokenKind::Gt
                | TokenKind::Bang
        )
    }

    /// The exact source text of this token
    pub fn lexeme(&self) -> &str {
        match self {
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::While => "while",
            TokenKind::Switch => "switch",
            TokenKind::Case => "case",
            TokenKind::Return => "return",
            TokenKind::Print => "print",
            TokenKind::Break => "break",
            TokenKind::For => "for",
            TokenKind::Int => "int",
            TokenKind::Float => "float",
            TokenKind::Void => "void",
            TokenKind::Double => "double",
            TokenKind::Char => "char",
            TokenKind::Identifier(s) | TokenKind::Number(s) | TokenKind::Str(s) => s,
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Eq => "=",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::Bang => "!",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Comma => ",",
            TokenKind::Semi => ";",
            TokenKind::Eof => "",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Identifier(s) => write!(f, "identifier '{}'", s),
            TokenKind::Number(s) => write!(f, "number '{}'", s),
            TokenKind::Str(s) => write!(f, "string {}", s),
            TokenKind::Eof => write!(f, "end of file"),
            other => write!(f, "'{}'", other.lexeme()),
        }
    }
}
