use inspector_ast::Span;
use inspector_parser::ParseError;
use inspector_runtime::RuntimeError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Diagnostics produced while compiling a unit
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("library `{name}` is not available")]
    UnknownLibrary { name: String },

    #[error("namespace `{name}` is not provided by any referenced library")]
    UnknownNamespace { name: String, span: Span },

    #[error("cannot find `{name}` in this scope")]
    UnresolvedIdentifier { name: String, span: Span },

    #[error("cannot find type `{name}`")]
    UnresolvedType { name: String, span: Span },

    #[error("`{name}` is a type, not a value")]
    TypeUsedAsValue { name: String, span: Span },

    #[error("`{name}` expects {expected} argument(s), got {got}")]
    ArityMismatch {
        name: String,
        expected: String,
        got: usize,
        span: Span,
    },

    #[error("`{name}` is not a function")]
    NotCallable { name: String, span: Span },

    #[error("`{name}` is declared more than once in this scope")]
    DuplicateParameter { name: String, span: Span },

    #[error("no type named `{name}` in the compiled unit")]
    MissingType { name: String },

    #[error("type `{type_name}` has no method `{method}`")]
    MissingMethod { type_name: String, method: String },

    #[error("`{method}` expects {expected} argument(s), got {got}")]
    SignatureMismatch {
        method: String,
        expected: usize,
        got: usize,
    },
}

impl CompileError {
    /// Location in the unit source, where one exists
    pub fn span(&self) -> Option<Span> {
        match self {
            CompileError::Parse(err) => Some(err.span()),
            CompileError::UnknownNamespace { span, .. }
            | CompileError::UnresolvedIdentifier { span, .. }
            | CompileError::UnresolvedType { span, .. }
            | CompileError::TypeUsedAsValue { span, .. }
            | CompileError::ArityMismatch { span, .. }
            | CompileError::NotCallable { span, .. }
            | CompileError::DuplicateParameter { span, .. } => Some(*span),
            CompileError::UnknownLibrary { .. }
            | CompileError::MissingType { .. }
            | CompileError::MissingMethod { .. }
            | CompileError::SignatureMismatch { .. } => None,
        }
    }
}

/// Which stage an evaluation failed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Compile,
    Runtime,
}

/// Failure of a single evaluation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("compile error: {0}")]
    Compile(#[from] CompileError),

    #[error("runtime error: {error}")]
    Runtime { error: RuntimeError, span: Span },
}

impl EvalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EvalError::Compile(_) => ErrorKind::Compile,
            EvalError::Runtime { .. } => ErrorKind::Runtime,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            EvalError::Compile(err) => err.span(),
            EvalError::Runtime { span, .. } => Some(*span),
        }
    }

    /// The message without the `compile error:` / `runtime error:` prefix
    pub fn message(&self) -> String {
        match self {
            EvalError::Compile(err) => err.to_string(),
            EvalError::Runtime { error, .. } => error.to_string(),
        }
    }
}
