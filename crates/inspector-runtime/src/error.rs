use thiserror::Error;

/// Errors raised while a compiled unit is running
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("attempted to divide by zero")]
    DivisionByZero,

    #[error("arithmetic overflow in `{op}`")]
    Overflow { op: String },

    #[error("index {index} is out of range for length {len}")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("key `{key}` was not present in the map")]
    KeyNotFound { key: String },

    #[error("sequence contains no elements")]
    EmptySequence,

    #[error("cannot access `{member}` on null")]
    NullReference { member: String },

    #[error("`{type_name}` has no member `{member}`")]
    UnknownMember { type_name: String, member: String },

    #[error("`{type_name}` has no method `{method}`")]
    UnknownMethod { type_name: String, method: String },

    #[error("operator `{op}` cannot be applied to {left} and {right}")]
    InvalidOperands {
        op: String,
        left: String,
        right: String,
    },

    #[error("operator `{op}` cannot be applied to {operand}")]
    InvalidOperand { op: String, operand: String },

    #[error("expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("`{name}` expects {expected} argument(s), got {got}")]
    ArityMismatch {
        name: String,
        expected: String,
        got: usize,
    },

    #[error("value of type `{type_name}` is not callable")]
    NotCallable { type_name: String },

    #[error("invalid argument to `{function}`: {message}")]
    InvalidArgument { function: String, message: String },

    /// Raised by the live object itself
    #[error("{0}")]
    Domain(String),
}

impl RuntimeError {
    pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        RuntimeError::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn invalid_argument(function: impl Into<String>, message: impl Into<String>) -> Self {
        RuntimeError::InvalidArgument {
            function: function.into(),
            message: message.into(),
        }
    }

    pub fn domain(message: impl Into<String>) -> Self {
        RuntimeError::Domain(message.into())
    }
}
