//! inspector: on-demand expression evaluation against a live object
//!
//! A query such as `algorithm.Portfolio.Cash` is wrapped in a synthesized
//! unit, compiled against a capability set and invoked with the live
//! algorithm. The outcome is always a [`CommandResult`].
//!
//! ```text
//! query ─▶ synthesize ─▶ compile ─▶ instantiate ─▶ invoke ─▶ CommandResult
//!              ▲            ▲
//!         capability    library
//!            set        catalog
//! ```

pub use inspector_capabilities::{resolve, CapabilitySet, CapabilityVariant, Platform};
pub use inspector_command::{
    Command, CommandContext, CommandResult, ErrorKind, ErrorReport, InspectorCommand, Payload,
};
pub use inspector_eval::{CompileError, EvalError, Evaluator};
pub use inspector_runtime::{LibraryCatalog, LiveObject, ObjectRef, RuntimeError, Value};
pub use inspector_synth::{synthesize, SynthesizedUnit};

/// Evaluate `query` once, with `live` attached when given
pub fn inspect(query: &str, platform: Platform, live: Option<ObjectRef>) -> CommandResult<InspectorCommand> {
    let mut ctx = CommandContext::new(Evaluator::default(), platform);
    ctx.live = live;
    InspectorCommand::new(query).run(&ctx)
}
