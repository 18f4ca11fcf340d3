//! `std.data`: tabular views over lists of rows

use super::{arg, sequence, string};
use crate::{Arity, Namespace, RuntimeError, Value};
use inspector_capabilities::namespaces;
use std::collections::BTreeMap;

pub fn namespace() -> Namespace {
    Namespace::new(namespaces::DATA)
        .function("table", Arity::Exact(1), table)
        .function("column", Arity::Exact(2), column)
        .function("row_count", Arity::Exact(1), row_count)
}

fn rows(function: &str, value: &Value) -> Result<Vec<BTreeMap<String, Value>>, RuntimeError> {
    sequence(function, value)?
        .into_iter()
        .map(|row| match row {
            Value::Map(map) => Ok(map),
            Value::Object(obj) => match obj.snapshot() {
                Value::Map(map) => Ok(map),
                other => Err(RuntimeError::invalid_argument(function, format!("row must be a map, found {}", other.type_name()))),
            },
            other => Err(RuntimeError::invalid_argument(function, format!("row must be a map, found {}", other.type_name()))),
        })
        .collect()
}

/// `{ columns: [...], rows: [[...], ...] }` with columns in first-seen order
fn table(args: &[Value]) -> Result<Value, RuntimeError> {
    let rows = rows("table", arg(args, 0))?;

    let mut columns: Vec<String> = Vec::new();
    for row in &rows {
        for key in row.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let cells: Vec<Value> = rows
        .iter()
        .map(|row| {
            Value::List(
                columns
                    .iter()
                    .map(|col| row.get(col).cloned().unwrap_or(Value::Null))
                    .collect(),
            )
        })
        .collect();

    let mut out = BTreeMap::new();
    out.insert(
        "columns".to_string(),
        Value::List(columns.into_iter().map(Value::Str).collect()),
    );
    out.insert("rows".to_string(), Value::List(cells));
    Ok(Value::Map(out))
}

fn column(args: &[Value]) -> Result<Value, RuntimeError> {
    let rows = rows("column", arg(args, 0))?;
    let name = string("column", arg(args, 1))?;
    Ok(Value::List(
        rows.iter()
            .map(|row| row.get(name).cloned().unwrap_or(Value::Null))
            .collect(),
    ))
}

fn row_count(args: &[Value]) -> Result<Value, RuntimeError> {
    match arg(args, 0) {
        Value::Map(table) => match table.get("rows") {
            Some(Value::List(rows)) => Ok(Value::Int(rows.len() as i64)),
            _ => Err(RuntimeError::invalid_argument("row_count", "expected a table")),
        },
        other => Ok(Value::Int(sequence("row_count", other)?.len() as i64)),
    }
}
