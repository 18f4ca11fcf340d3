//! Inspector Lexer - Tokenization using logos
//!
//! Tokenizes the full text of a synthesized unit, including the
//! user-supplied query embedded in it. Unrecognized characters become
//! [`TokenKind::Error`] tokens; the parser reports them.

mod token;

pub use token::*;

use inspector_ast::Span;
use logos::Logos;

/// Tokenize a source string into a vector of tokens
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(source);

    while let Some(result) = lexer.next() {
        let span = Span::new(lexer.span().start, lexer.span().end);
        let kind = result.unwrap_or(TokenKind::Error);
        tokens.push(Token { kind, span });
    }

    let end = source.len();
    tokens.push(Token {
        kind: TokenKind::Eof,
        span: Span::new(end, end),
    });

    tokens
}

/// A token with its span
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.span.start..self.span.end]
    }
}
