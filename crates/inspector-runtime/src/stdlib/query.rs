//! Query operators over sequences
//!
//! Shared by `std.query` and `std.linq`. Every operator takes the sequence
//! as its first argument, so each can also be called as an extension
//! method: `xs.where(x => x > 1).count()`.

use super::{arg, count, sequence};
use crate::object::invoke;
use crate::{Arity, Namespace, RuntimeError, Value};
use std::cmp::Ordering;
use std::collections::BTreeMap;

pub fn operators(name: &str) -> Namespace {
    Namespace::new(name)
        .function("count", Arity::Range(1, 2), count_op)
        .function("any", Arity::Range(1, 2), any)
        .function("all", Arity::Exact(2), all)
        .function("contains", Arity::Exact(2), contains)
        .function("where", Arity::Exact(2), filter)
        .function("select", Arity::Exact(2), select)
        .function("first", Arity::Range(1, 2), first)
        .function("first_or_default", Arity::Range(1, 2), first_or_default)
        .function("last", Arity::Exact(1), last)
        .function("last_or_default", Arity::Exact(1), |args| {
            Ok(sequence("last_or_default", arg(args, 0))?.pop().unwrap_or(Value::Null))
        })
        .function("element_at", Arity::Exact(2), element_at)
        .function("take", Arity::Exact(2), take)
        .function("skip", Arity::Exact(2), skip)
        .function("reverse", Arity::Exact(1), |args| {
            let mut items = sequence("reverse", arg(args, 0))?;
            items.reverse();
            Ok(Value::List(items))
        })
        .function("distinct", Arity::Exact(1), distinct)
        .function("order_by", Arity::Range(1, 2), |args| order(args, "order_by", false))
        .function("order_by_descending", Arity::Range(1, 2), |args| {
            order(args, "order_by_descending", true)
        })
        .function("group_by", Arity::Exact(2), group_by)
        .function("sum", Arity::Range(1, 2), sum)
        .function("average", Arity::Range(1, 2), average)
        .function("min", Arity::Range(1, 2), |args| extreme(args, "min", Ordering::Less))
        .function("max", Arity::Range(1, 2), |args| extreme(args, "max", Ordering::Greater))
        .function("to_list", Arity::Exact(1), |args| Ok(Value::List(sequence("to_list", arg(args, 0))?)))
}

/// Apply an optional projection/predicate argument to each item
fn project(args: &[Value], index: usize, items: Vec<Value>) -> Result<Vec<Value>, RuntimeError> {
    match args.get(index) {
        None => Ok(items),
        Some(f) => {
            let f = f.as_callable()?;
            items.into_iter().map(|item| invoke(f, vec![item])).collect()
        }
    }
}

/// Items of `args[0]` matching the predicate in `args[index]`, if any
fn matching(args: &[Value], function: &str, index: usize) -> Result<Vec<Value>, RuntimeError> {
    let items = sequence(function, arg(args, 0))?;
    let Some(pred) = args.get(index) else {
        return Ok(items);
    };
    let pred = pred.as_callable()?;
    let mut out = Vec::new();
    for item in items {
        if invoke(pred, vec![item.clone()])?.as_bool()? {
            out.push(item);
        }
    }
    Ok(out)
}

fn count_op(args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Int(matching(args, "count", 1)?.len() as i64))
}

fn any(args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Bool(!matching(args, "any", 1)?.is_empty()))
}

fn all(args: &[Value]) -> Result<Value, RuntimeError> {
    let items = sequence("all", arg(args, 0))?;
    let pred = arg(args, 1).as_callable()?;
    for item in items {
        if !invoke(pred, vec![item])?.as_bool()? {
            return Ok(Value::Bool(false));
        }
    }
    Ok(Value::Bool(true))
}

fn contains(args: &[Value]) -> Result<Value, RuntimeError> {
    let needle = arg(args, 1);
    match (arg(args, 0), needle) {
        (Value::Str(haystack), Value::Str(needle)) => Ok(Value::Bool(haystack.contains(needle.as_str()))),
        (haystack, _) => {
            let items = sequence("contains", haystack)?;
            Ok(Value::Bool(items.iter().any(|item| item.loose_eq(needle))))
        }
    }
}

fn filter(args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::List(matching(args, "where", 1)?))
}

fn select(args: &[Value]) -> Result<Value, RuntimeError> {
    let items = sequence("select", arg(args, 0))?;
    Ok(Value::List(project(args, 1, items)?))
}

fn first(args: &[Value]) -> Result<Value, RuntimeError> {
    matching(args, "first", 1)?
        .into_iter()
        .next()
        .ok_or(RuntimeError::EmptySequence)
}

fn first_or_default(args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(matching(args, "first_or_default", 1)?
        .into_iter()
        .next()
        .unwrap_or(Value::Null))
}

fn last(args: &[Value]) -> Result<Value, RuntimeError> {
    sequence("last", arg(args, 0))?
        .pop()
        .ok_or(RuntimeError::EmptySequence)
}

fn element_at(args: &[Value]) -> Result<Value, RuntimeError> {
    let items = sequence("element_at", arg(args, 0))?;
    let index = arg(args, 1).as_int()?;
    usize::try_from(index)
        .ok()
        .and_then(|i| items.get(i).cloned())
        .ok_or(RuntimeError::IndexOutOfRange {
            index,
            len: items.len(),
        })
}

fn take(args: &[Value]) -> Result<Value, RuntimeError> {
    let items = sequence("take", arg(args, 0))?;
    let n = count("take", arg(args, 1))?;
    Ok(Value::List(items.into_iter().take(n).collect()))
}

fn skip(args: &[Value]) -> Result<Value, RuntimeError> {
    let items = sequence("skip", arg(args, 0))?;
    let n = count("skip", arg(args, 1))?;
    Ok(Value::List(items.into_iter().skip(n).collect()))
}

fn distinct(args: &[Value]) -> Result<Value, RuntimeError> {
    let items = sequence("distinct", arg(args, 0))?;
    let mut out: Vec<Value> = Vec::new();
    for item in items {
        if !out.iter().any(|seen| seen.loose_eq(&item)) {
            out.push(item);
        }
    }
    Ok(Value::List(out))
}

fn order(args: &[Value], function: &str, descending: bool) -> Result<Value, RuntimeError> {
    let items = sequence(function, arg(args, 0))?;
    let keys = project(args, 1, items.clone())?;

    // Validate comparability up front so the sort itself cannot fail
    for pair in keys.windows(2) {
        pair[0].compare(&pair[1])?;
    }

    let mut keyed: Vec<(Value, Value)> = keys.into_iter().zip(items).collect();
    keyed.sort_by(|(a, _), (b, _)| {
        let ord = a.compare(b).unwrap_or(Ordering::Equal);
        if descending {
            ord.reverse()
        } else {
            ord
        }
    });
    Ok(Value::List(keyed.into_iter().map(|(_, item)| item).collect()))
}

fn group_by(args: &[Value]) -> Result<Value, RuntimeError> {
    let items = sequence("group_by", arg(args, 0))?;
    let keys = project(args, 1, items.clone())?;
    let mut groups: BTreeMap<String, Value> = BTreeMap::new();
    for (key, item) in keys.into_iter().zip(items) {
        let group = groups
            .entry(key.to_key())
            .or_insert_with(|| Value::List(Vec::new()));
        if let Value::List(members) = group {
            members.push(item);
        }
    }
    Ok(Value::Map(groups))
}

fn sum(args: &[Value]) -> Result<Value, RuntimeError> {
    let items = sequence("sum", arg(args, 0))?;
    let items = project(args, 1, items)?;

    let mut int_total: i64 = 0;
    let mut float_total: Option<f64> = None;
    for item in &items {
        match (item, float_total) {
            (Value::Int(i), None) => {
                int_total = int_total
                    .checked_add(*i)
                    .ok_or_else(|| RuntimeError::Overflow { op: "sum".into() })?;
            }
            (other, None) => float_total = Some(int_total as f64 + super::number("sum", other)?),
            (other, Some(total)) => float_total = Some(total + super::number("sum", other)?),
        }
    }

    Ok(match float_total {
        Some(total) => Value::Float(total),
        None => Value::Int(int_total),
    })
}

fn average(args: &[Value]) -> Result<Value, RuntimeError> {
    let items = sequence("average", arg(args, 0))?;
    let items = project(args, 1, items)?;
    if items.is_empty() {
        return Err(RuntimeError::EmptySequence);
    }
    let mut total = 0.0;
    for item in &items {
        total += super::number("average", item)?;
    }
    Ok(Value::Float(total / items.len() as f64))
}

/// `min`/`max`: the item whose key is most `wanted`
fn extreme(args: &[Value], function: &str, wanted: Ordering) -> Result<Value, RuntimeError> {
    let items = sequence(function, arg(args, 0))?;
    let keys = project(args, 1, items)?;
    let mut best: Option<Value> = None;
    for key in keys {
        best = match best {
            Some(current) if key.compare(&current)? != wanted => Some(current),
            _ => Some(key),
        };
    }
    best.ok_or(RuntimeError::EmptySequence)
}
