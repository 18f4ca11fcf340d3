use crate::bind::Binder;
use crate::{CompileError, CompiledUnit, EvalError};
use inspector_capabilities::CapabilitySet;
use inspector_parser::parse;
use inspector_runtime::{LibraryCatalog, ObjectRef, Value};
use inspector_synth::SynthesizedUnit;
use std::sync::Arc;
use tracing::{debug, error, instrument};

/// Compiles synthesized units and runs their entry point
///
/// Holds no per-evaluation state; share one across threads freely.
#[derive(Debug, Clone)]
pub struct Evaluator {
    catalog: Arc<LibraryCatalog>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(Arc::new(LibraryCatalog::standard()))
    }
}

impl Evaluator {
    pub fn new(catalog: Arc<LibraryCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &LibraryCatalog {
        &self.catalog
    }

    /// Every diagnostic for `unit`; empty when it compiles
    pub fn diagnostics(&self, unit: &SynthesizedUnit, capabilities: &CapabilitySet) -> Vec<CompileError> {
        match self.compile_all(unit, capabilities) {
            Ok(_) => Vec::new(),
            Err(errors) => errors,
        }
    }

    /// Compile `unit` in library mode, failing with the first diagnostic
    #[instrument(level = "debug", skip_all, fields(unit = %unit.type_name))]
    pub fn compile(
        &self,
        unit: &SynthesizedUnit,
        capabilities: &CapabilitySet,
    ) -> Result<CompiledUnit, CompileError> {
        // A failed bind always reports at least one diagnostic
        self.compile_all(unit, capabilities)
            .map_err(|mut errors| errors.swap_remove(0))
    }

    fn compile_all(
        &self,
        unit: &SynthesizedUnit,
        capabilities: &CapabilitySet,
    ) -> Result<CompiledUnit, Vec<CompileError>> {
        let file = parse(&unit.source).map_err(|e| vec![CompileError::Parse(e)])?;
        let compiled = Binder::new(&self.catalog, capabilities).bind(&file)?;
        debug!(types = compiled.type_names().count(), "compiled unit");
        Ok(compiled)
    }

    /// Compile `unit`, instantiate its type and invoke its entry point
    ///
    /// `live` is passed as the single argument when present. Its presence
    /// must agree with the generated signature.
    #[instrument(level = "debug", skip_all, fields(unit = %unit.type_name))]
    pub fn evaluate(
        &self,
        unit: &SynthesizedUnit,
        capabilities: &CapabilitySet,
        live: Option<ObjectRef>,
    ) -> Result<Value, EvalError> {
        let result = self.run(unit, capabilities, live);
        match &result {
            Ok(value) => debug!(result = %value.type_name(), "evaluation succeeded"),
            Err(err @ EvalError::Compile(_)) => {
                error!(query = unit.query(), error = %err, "failed to compile query")
            }
            Err(err @ EvalError::Runtime { .. }) => {
                error!(query = unit.query(), error = %err, "query failed while running")
            }
        }
        result
    }

    fn run(
        &self,
        unit: &SynthesizedUnit,
        capabilities: &CapabilitySet,
        live: Option<ObjectRef>,
    ) -> Result<Value, EvalError> {
        let compiled = self.compile(unit, capabilities)?;
        let instance = compiled.instantiate(&unit.qualified_type_name())?;
        let method = instance.method(&unit.method)?;
        let args: Vec<Value> = live.map(Value::Object).into_iter().collect();
        method.invoke(args)
    }
}
