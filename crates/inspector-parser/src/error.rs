use inspector_ast::Span;
use thiserror::Error;

/// Errors produced while parsing unit source text
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("expected {expected}, found {found}")]
    Unexpected {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("invalid token `{text}`")]
    InvalidToken { text: String, span: Span },

    #[error("integer literal `{text}` is out of range")]
    IntegerOverflow { text: String, span: Span },

    #[error("invalid escape sequence `\\{ch}` in string literal")]
    InvalidEscape { ch: char, span: Span },

    #[error("expression nests too deeply")]
    TooDeep { span: Span },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::Unexpected { span, .. }
            | ParseError::InvalidToken { span, .. }
            | ParseError::IntegerOverflow { span, .. }
            | ParseError::InvalidEscape { span, .. }
            | ParseError::TooDeep { span } => *span,
        }
    }
}
