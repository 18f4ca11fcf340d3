//! Live objects and callables

use crate::{RuntimeError, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Shared reference to a live object
pub type ObjectRef = Arc<dyn LiveObject>;

/// A long-lived object that queries can read from and call into
///
/// Implementors expose members by name. The inspector imposes no locking
/// of its own; an implementation that mutates shared state from `call`
/// must synchronize as its owner requires.
pub trait LiveObject: Send + Sync {
    /// Abstract type name, e.g. `Algorithm`
    fn type_name(&self) -> &str;

    /// Read a member
    fn get(&self, member: &str) -> Result<Value, RuntimeError> {
        Err(RuntimeError::UnknownMember {
            type_name: self.type_name().to_string(),
            member: member.to_string(),
        })
    }

    /// Invoke a method
    ///
    /// Returning [`RuntimeError::UnknownMethod`] lets the evaluator fall
    /// back to an imported extension function of the same name.
    fn call(&self, method: &str, args: &[Value]) -> Result<Value, RuntimeError> {
        let _ = args;
        Err(RuntimeError::UnknownMethod {
            type_name: self.type_name().to_string(),
            method: method.to_string(),
        })
    }

    /// Member names, used for display and serialization
    fn members(&self) -> Vec<String> {
        Vec::new()
    }

    /// Plain-data view of this object
    ///
    /// The default lists every readable member one level deep; nested
    /// objects are represented by their type name. Must not return an
    /// `Object` value.
    fn snapshot(&self) -> Value {
        let mut map = BTreeMap::new();
        map.insert("$type".to_string(), Value::from(self.type_name()));
        for member in self.members() {
            let value = match self.get(&member) {
                Ok(Value::Object(obj)) => Value::from(obj.type_name()),
                Ok(Value::Function(_)) => continue,
                Ok(value) => value,
                Err(_) => continue,
            };
            map.insert(member, value);
        }
        Value::Map(map)
    }
}

/// A function value
pub trait Callable: Send + Sync {
    fn arity(&self) -> usize;

    fn call(&self, args: Vec<Value>) -> Result<Value, RuntimeError>;
}

/// Call `callable` with `args`, checking arity first
pub fn invoke(callable: &Arc<dyn Callable>, args: Vec<Value>) -> Result<Value, RuntimeError> {
    if args.len() != callable.arity() {
        return Err(RuntimeError::ArityMismatch {
            name: "lambda".into(),
            expected: callable.arity().to_string(),
            got: args.len(),
        });
    }
    callable.call(args)
}
