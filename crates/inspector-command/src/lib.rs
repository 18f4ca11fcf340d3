//! inspector-command: remote command handling
//!
//! An external dispatcher deserializes an [`InspectorCommand`], runs it with
//! a [`CommandContext`] and sends the returned [`CommandResult`] back over
//! the same transport. Every outcome of an evaluation, including compile
//! and runtime failures, is reduced to a result; nothing propagates to the
//! dispatcher as an error.

mod envelope;

pub use envelope::{CommandResult, ErrorKind, ErrorReport, Payload};

use inspector_capabilities::{resolve, Platform};
use inspector_eval::Evaluator;
use inspector_runtime::ObjectRef;
use inspector_synth::synthesize;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// A command the dispatcher can run
pub trait Command: Sized {
    /// Name used in logs and by the transport
    fn name(&self) -> &'static str;

    fn run(&self, ctx: &CommandContext) -> CommandResult<Self>;
}

/// What a command runs against
#[derive(Clone)]
pub struct CommandContext {
    pub evaluator: Evaluator,
    pub platform: Platform,
    /// The live algorithm, if one is attached
    pub live: Option<ObjectRef>,
}

impl CommandContext {
    pub fn new(evaluator: Evaluator, platform: Platform) -> Self {
        Self {
            evaluator,
            platform,
            live: None,
        }
    }

    pub fn with_live_object(mut self, live: ObjectRef) -> Self {
        self.live = Some(live);
        self
    }
}

impl std::fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandContext")
            .field("platform", &self.platform)
            .field("live", &self.live.as_ref().map(|obj| obj.type_name().to_string()))
            .finish_non_exhaustive()
    }
}

/// Evaluate one query against the live algorithm
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectorCommand {
    pub query: String,
}

impl InspectorCommand {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }

    /// Decode `{"query": "..."}`
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl Command for InspectorCommand {
    fn name(&self) -> &'static str {
        "inspector"
    }

    fn run(&self, ctx: &CommandContext) -> CommandResult<Self> {
        let capabilities = resolve(ctx.live.is_some(), ctx.platform);
        let unit = synthesize(&self.query, &capabilities);

        match ctx.evaluator.evaluate(&unit, &capabilities, ctx.live.clone()) {
            Ok(value) => {
                info!(command = self.name(), unit = %unit.type_name, "query evaluated");
                CommandResult::ok(self.clone(), value)
            }
            Err(error) => {
                let report = ErrorReport::from_eval(&error, &unit);
                warn!(
                    command = self.name(),
                    kind = ?report.kind,
                    message = %report.message,
                    "query failed"
                );
                CommandResult::err(self.clone(), report)
            }
        }
    }
}
