//! Compiled units: types keyed by qualified name, never run on their own

use crate::interp::{self, Fault};
use crate::ir::Node;
use crate::{CompileError, EvalError};
use inspector_runtime::Value;
use std::collections::HashMap;

/// Output of a successful compilation
#[derive(Debug)]
pub struct CompiledUnit {
    types: HashMap<String, UnitType>,
}

#[derive(Debug)]
pub struct UnitType {
    pub(crate) name: String,
    pub(crate) methods: Vec<CompiledMethod>,
}

#[derive(Debug)]
pub struct CompiledMethod {
    pub(crate) name: String,
    pub(crate) params: Vec<String>,
    pub(crate) body: Node,
}

impl CompiledUnit {
    pub(crate) fn new(types: HashMap<String, UnitType>) -> Self {
        Self { types }
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Instantiate the type named `qualified_name`, e.g. `inspector.Inspector3`
    pub fn instantiate(&self, qualified_name: &str) -> Result<Instance<'_>, CompileError> {
        self.types
            .get(qualified_name)
            .map(|ty| Instance { ty })
            .ok_or_else(|| CompileError::MissingType {
                name: qualified_name.to_string(),
            })
    }
}

#[cfg(test)]
impl std::ops::Index<&str> for CompiledUnit {
    type Output = UnitType;

    fn index(&self, name: &str) -> &UnitType {
        &self.types[name]
    }
}

/// An instance of a compiled unit type
///
/// Unit types carry no fields, so an instance is only a handle onto its
/// methods.
#[derive(Debug, Clone, Copy)]
pub struct Instance<'a> {
    ty: &'a UnitType,
}

impl<'a> Instance<'a> {
    pub fn type_name(&self) -> &'a str {
        &self.ty.name
    }

    pub fn method(&self, name: &str) -> Result<&'a CompiledMethod, CompileError> {
        self.ty
            .methods
            .iter()
            .find(|m| m.name == name)
            .ok_or_else(|| CompileError::MissingMethod {
                type_name: self.ty.name.clone(),
                method: name.to_string(),
            })
    }
}

impl CompiledMethod {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Invoke with arguments matching the signature exactly
    pub fn invoke(&self, args: Vec<Value>) -> Result<Value, EvalError> {
        if args.len() != self.params.len() {
            return Err(CompileError::SignatureMismatch {
                method: self.name.clone(),
                expected: self.params.len(),
                got: args.len(),
            }
            .into());
        }
        interp::eval(&self.body, &args).map_err(|Fault { error, span }| EvalError::Runtime { error, span })
    }
}
