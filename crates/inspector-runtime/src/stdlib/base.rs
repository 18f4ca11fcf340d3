//! `std.core`: math, conversions, collections and text

use super::{arg, int, number, string};
use crate::{Arity, Namespace, RuntimeError, Value};
use inspector_capabilities::namespaces;
use std::collections::BTreeMap;

pub fn core() -> Namespace {
    Namespace::new(namespaces::CORE)
        .constant("PI", std::f64::consts::PI)
        .constant("E", std::f64::consts::E)
        .constant("MAX_INT", i64::MAX)
        .constant("MIN_INT", i64::MIN)
        .function("abs", Arity::Exact(1), abs)
        .function("round", Arity::Range(1, 2), round)
        .function("floor", Arity::Exact(1), |args| Ok(Value::Float(number("floor", arg(args, 0))?.floor())))
        .function("ceiling", Arity::Exact(1), |args| Ok(Value::Float(number("ceiling", arg(args, 0))?.ceil())))
        .function("sqrt", Arity::Exact(1), sqrt)
        .function("pow", Arity::Exact(2), |args| {
            Ok(Value::Float(number("pow", arg(args, 0))?.powf(number("pow", arg(args, 1))?)))
        })
        .function("len", Arity::Exact(1), len)
        .function("type_of", Arity::Exact(1), |args| Ok(Value::Str(arg(args, 0).type_name())))
        .function("is_null", Arity::Exact(1), |args| Ok(Value::Bool(arg(args, 0).is_null())))
        .function("to_string", Arity::Exact(1), |args| Ok(Value::Str(arg(args, 0).to_string())))
        .function("to_int", Arity::Exact(1), to_int)
        .function("to_float", Arity::Exact(1), to_float)
}

pub fn collections() -> Namespace {
    Namespace::new(namespaces::CORE_COLLECTIONS)
        .function("range", Arity::Range(1, 2), range)
        .function("keys", Arity::Exact(1), keys)
        .function("values", Arity::Exact(1), values)
        .function("contains_key", Arity::Exact(2), contains_key)
        .function("get_or", Arity::Exact(3), get_or)
}

pub fn text() -> Namespace {
    Namespace::new(namespaces::CORE_TEXT)
        .function("upper", Arity::Exact(1), |args| Ok(Value::Str(string("upper", arg(args, 0))?.to_uppercase())))
        .function("lower", Arity::Exact(1), |args| Ok(Value::Str(string("lower", arg(args, 0))?.to_lowercase())))
        .function("trim", Arity::Exact(1), |args| Ok(Value::from(string("trim", arg(args, 0))?.trim())))
        .function("starts_with", Arity::Exact(2), |args| {
            Ok(Value::Bool(string("starts_with", arg(args, 0))?.starts_with(string("starts_with", arg(args, 1))?)))
        })
        .function("ends_with", Arity::Exact(2), |args| {
            Ok(Value::Bool(string("ends_with", arg(args, 0))?.ends_with(string("ends_with", arg(args, 1))?)))
        })
        .function("split", Arity::Exact(2), split)
        .function("join", Arity::Exact(2), join)
        .function("replace", Arity::Exact(3), |args| {
            let s = string("replace", arg(args, 0))?;
            Ok(Value::Str(s.replace(string("replace", arg(args, 1))?, string("replace", arg(args, 2))?)))
        })
        .function("substring", Arity::Range(2, 3), substring)
}

fn abs(args: &[Value]) -> Result<Value, RuntimeError> {
    match arg(args, 0) {
        Value::Int(i) => i
            .checked_abs()
            .map(Value::Int)
            .ok_or_else(|| RuntimeError::Overflow { op: "abs".into() }),
        other => Ok(Value::Float(number("abs", other)?.abs())),
    }
}

fn round(args: &[Value]) -> Result<Value, RuntimeError> {
    let x = number("round", arg(args, 0))?;
    let digits = match args.get(1) {
        Some(d) => int("round", d)?,
        None => 0,
    };
    let digits = i32::try_from(digits)
        .ok()
        .filter(|d| (0..=15).contains(d))
        .ok_or_else(|| RuntimeError::invalid_argument("round", "digits must be between 0 and 15"))?;
    let factor = 10f64.powi(digits);
    Ok(Value::Float((x * factor).round() / factor))
}

fn sqrt(args: &[Value]) -> Result<Value, RuntimeError> {
    let x = number("sqrt", arg(args, 0))?;
    if x < 0.0 {
        return Err(RuntimeError::invalid_argument("sqrt", "argument must be non-negative"));
    }
    Ok(Value::Float(x.sqrt()))
}

fn len(args: &[Value]) -> Result<Value, RuntimeError> {
    let n = match arg(args, 0) {
        Value::Str(s) => s.chars().count(),
        Value::List(items) => items.len(),
        Value::Map(map) => map.len(),
        other => {
            return Err(RuntimeError::invalid_argument(
                "len",
                format!("{} has no length", other.type_name()),
            ))
        }
    };
    Ok(Value::Int(n as i64))
}

fn to_int(args: &[Value]) -> Result<Value, RuntimeError> {
    match arg(args, 0) {
        Value::Int(i) => Ok(Value::Int(*i)),
        Value::Float(x) if x.is_finite() && *x >= i64::MIN as f64 && *x <= i64::MAX as f64 => {
            Ok(Value::Int(x.trunc() as i64))
        }
        Value::Float(_) => Err(RuntimeError::Overflow { op: "to_int".into() }),
        Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
        Value::Str(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| RuntimeError::invalid_argument("to_int", format!("`{}` is not an integer", s))),
        other => Err(RuntimeError::invalid_argument(
            "to_int",
            format!("cannot convert {}", other.type_name()),
        )),
    }
}

fn to_float(args: &[Value]) -> Result<Value, RuntimeError> {
    match arg(args, 0) {
        Value::Str(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| RuntimeError::invalid_argument("to_float", format!("`{}` is not a number", s))),
        other => Ok(Value::Float(number("to_float", other)?)),
    }
}

/// Longest list `range` will build
const MAX_RANGE_LEN: i64 = 1_000_000;

fn range(args: &[Value]) -> Result<Value, RuntimeError> {
    let (start, end) = match args {
        [end] => (0, int("range", end)?),
        [start, end, ..] => (int("range", start)?, int("range", end)?),
        [] => (0, 0),
    };
    if end.saturating_sub(start) > MAX_RANGE_LEN {
        return Err(RuntimeError::invalid_argument(
            "range",
            format!("ranges are limited to {} elements", MAX_RANGE_LEN),
        ));
    }
    Ok(Value::List((start..end).map(Value::Int).collect()))
}

fn map_arg<'a>(function: &str, value: &'a Value) -> Result<&'a BTreeMap<String, Value>, RuntimeError> {
    match value {
        Value::Map(map) => Ok(map),
        other => Err(RuntimeError::invalid_argument(
            function,
            format!("expected map, found {}", other.type_name()),
        )),
    }
}

fn keys(args: &[Value]) -> Result<Value, RuntimeError> {
    let map = map_arg("keys", arg(args, 0))?;
    Ok(Value::List(map.keys().map(|k| Value::from(k.as_str())).collect()))
}

fn values(args: &[Value]) -> Result<Value, RuntimeError> {
    let map = map_arg("values", arg(args, 0))?;
    Ok(Value::List(map.values().cloned().collect()))
}

fn contains_key(args: &[Value]) -> Result<Value, RuntimeError> {
    let map = map_arg("contains_key", arg(args, 0))?;
    Ok(Value::Bool(map.contains_key(&arg(args, 1).to_key())))
}

fn get_or(args: &[Value]) -> Result<Value, RuntimeError> {
    let map = map_arg("get_or", arg(args, 0))?;
    Ok(map
        .get(&arg(args, 1).to_key())
        .cloned()
        .unwrap_or_else(|| arg(args, 2).clone()))
}

fn split(args: &[Value]) -> Result<Value, RuntimeError> {
    let s = string("split", arg(args, 0))?;
    let sep = string("split", arg(args, 1))?;
    if sep.is_empty() {
        return Err(RuntimeError::invalid_argument("split", "separator must not be empty"));
    }
    Ok(Value::List(s.split(sep).map(Value::from).collect()))
}

fn join(args: &[Value]) -> Result<Value, RuntimeError> {
    let items = super::sequence("join", arg(args, 0))?;
    let sep = string("join", arg(args, 1))?;
    let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
    Ok(Value::Str(parts.join(sep)))
}

fn substring(args: &[Value]) -> Result<Value, RuntimeError> {
    let s = string("substring", arg(args, 0))?;
    let chars: Vec<char> = s.chars().collect();
    let start = super::count("substring", arg(args, 1))?;
    if start > chars.len() {
        return Err(RuntimeError::IndexOutOfRange {
            index: start as i64,
            len: chars.len(),
        });
    }
    let length = match args.get(2) {
        Some(n) => super::count("substring", n)?,
        None => chars.len() - start,
    };
    let end = start
        .checked_add(length)
        .filter(|end| *end <= chars.len())
        .ok_or(RuntimeError::IndexOutOfRange {
            index: (start + length.min(chars.len())) as i64,
            len: chars.len(),
        })?;
    Ok(Value::Str(chars[start..end].iter().collect()))
}
