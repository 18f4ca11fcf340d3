//! Built-in libraries
//!
//! Every library named by the capability resolver is defined here. The two
//! query-operator libraries share one table so the platform choice never
//! changes what a query can do.

mod base;
mod data;
mod query;
pub(crate) mod trading;
mod xml;

use crate::{Library, RuntimeError, Value};
use inspector_capabilities::{libraries, namespaces};

/// Every built-in library
pub fn all() -> Vec<Library> {
    vec![
        Library::new(libraries::CORE)
            .with_namespace(base::core())
            .with_namespace(base::collections())
            .with_namespace(base::text()),
        Library::new(libraries::QUERY).with_namespace(query::operators(namespaces::QUERY)),
        Library::new(libraries::LINQ).with_namespace(query::operators(namespaces::QUERY)),
        Library::new(libraries::XML).with_namespace(xml::namespace()),
        Library::new(libraries::DATA).with_namespace(data::namespace()),
        trading::common(),
        trading::algorithm(),
        trading::indicators(),
    ]
}

// ============================================================================
// Argument helpers
// ============================================================================

fn arg<'a>(args: &'a [Value], index: usize) -> &'a Value {
    static NULL: Value = Value::Null;
    args.get(index).unwrap_or(&NULL)
}

fn number(function: &str, value: &Value) -> Result<f64, RuntimeError> {
    value
        .as_number()
        .map_err(|_| RuntimeError::invalid_argument(function, format!("expected number, found {}", value.type_name())))
}

fn int(function: &str, value: &Value) -> Result<i64, RuntimeError> {
    value
        .as_int()
        .map_err(|_| RuntimeError::invalid_argument(function, format!("expected int, found {}", value.type_name())))
}

fn string<'a>(function: &str, value: &'a Value) -> Result<&'a str, RuntimeError> {
    value
        .as_str()
        .map_err(|_| RuntimeError::invalid_argument(function, format!("expected string, found {}", value.type_name())))
}

fn sequence(function: &str, value: &Value) -> Result<Vec<Value>, RuntimeError> {
    value
        .to_sequence()
        .map_err(|_| RuntimeError::invalid_argument(function, format!("expected sequence, found {}", value.type_name())))
}

/// Non-negative count argument
fn count(function: &str, value: &Value) -> Result<usize, RuntimeError> {
    let n = int(function, value)?;
    usize::try_from(n).map_err(|_| RuntimeError::invalid_argument(function, format!("count must be non-negative, got {}", n)))
}

/// Enum-like constant: a map from each variant name to itself
fn variants(names: &[&str]) -> Value {
    Value::Map(
        names
            .iter()
            .map(|name| (name.to_string(), Value::from(*name)))
            .collect(),
    )
}
