//! Result Envelope

use inspector_ast::Span;
use inspector_eval::EvalError;
use inspector_runtime::Value;
use inspector_synth::SynthesizedUnit;
use serde::{Deserialize, Serialize};

pub use inspector_eval::ErrorKind;

/// Structured failure description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    #[serde(rename = "error_kind")]
    pub kind: ErrorKind,
    pub message: String,
    /// Location within the query text, when the failure points into it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

impl ErrorReport {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            span: None,
        }
    }

    /// Describe `error`, rebasing its span onto the query inside `unit`
    pub fn from_eval(error: &EvalError, unit: &SynthesizedUnit) -> Self {
        Self {
            kind: error.kind(),
            message: error.message(),
            span: error.span().and_then(|span| unit.to_query_span(span)),
        }
    }
}

/// What a result carries: the evaluated value or a failure
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Payload {
    Value { value: Value },
    Error(ErrorReport),
}

impl Payload {
    pub fn value(&self) -> Option<&Value> {
        match self {
            Payload::Value { value } => Some(value),
            Payload::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorReport> {
        match self {
            Payload::Value { .. } => None,
            Payload::Error(report) => Some(report),
        }
    }
}

/// The response to one command
///
/// Built once per invocation and never modified; the payload is carried
/// as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandResult<C> {
    command: C,
    success: bool,
    payload: Payload,
}

impl<C> CommandResult<C> {
    fn new(command: C, payload: Payload) -> Self {
        Self {
            command,
            success: payload.error().is_none(),
            payload,
        }
    }

    /// Create a successful result
    pub fn ok(command: C, value: Value) -> Self {
        Self::new(command, Payload::Value { value })
    }

    /// Create a failed result
    pub fn err(command: C, report: ErrorReport) -> Self {
        Self::new(command, Payload::Error(report))
    }

    pub fn command(&self) -> &C {
        &self.command
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }
}

impl<C: Serialize> CommandResult<C> {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
