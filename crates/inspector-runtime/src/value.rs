//! Runtime values
//!
//! A [`Value`] is a tagged union over everything an expression can produce.
//! Live objects and functions are carried by reference; everything else is
//! plain data.

use crate::object::{Callable, ObjectRef};
use crate::RuntimeError;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    /// Reference to a live object
    Object(ObjectRef),
    /// A lambda or other callable
    Function(Arc<dyn Callable>),
}

impl Value {
    /// Type name used in diagnostics
    pub fn type_name(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(_) => "bool".to_string(),
            Value::Int(_) => "int".to_string(),
            Value::Float(_) => "float".to_string(),
            Value::Str(_) => "string".to_string(),
            Value::List(_) => "list".to_string(),
            Value::Map(_) => "map".to_string(),
            Value::Object(obj) => obj.type_name().to_string(),
            Value::Function(_) => "function".to_string(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Result<bool, RuntimeError> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(RuntimeError::type_mismatch("bool", other.type_name())),
        }
    }

    pub fn as_int(&self) -> Result<i64, RuntimeError> {
        match self {
            Value::Int(i) => Ok(*i),
            other => Err(RuntimeError::type_mismatch("int", other.type_name())),
        }
    }

    /// Numeric view; ints widen to float
    pub fn as_number(&self) -> Result<f64, RuntimeError> {
        match self {
            Value::Int(i) => Ok(*i as f64),
            Value::Float(f) => Ok(*f),
            other => Err(RuntimeError::type_mismatch("number", other.type_name())),
        }
    }

    pub fn as_str(&self) -> Result<&str, RuntimeError> {
        match self {
            Value::Str(s) => Ok(s),
            other => Err(RuntimeError::type_mismatch("string", other.type_name())),
        }
    }

    pub fn as_callable(&self) -> Result<&Arc<dyn Callable>, RuntimeError> {
        match self {
            Value::Function(f) => Ok(f),
            other => Err(RuntimeError::NotCallable {
                type_name: other.type_name(),
            }),
        }
    }

    /// Elements of a sequence: list items, or map values in key order
    pub fn to_sequence(&self) -> Result<Vec<Value>, RuntimeError> {
        match self {
            Value::List(items) => Ok(items.clone()),
            Value::Map(map) => Ok(map.values().cloned().collect()),
            other => Err(RuntimeError::type_mismatch("sequence", other.type_name())),
        }
    }

    /// Total order over comparable values
    ///
    /// Numbers compare across int and float, strings lexicographically,
    /// bools with `false < true`. Anything else is a type error.
    pub fn compare(&self, other: &Value) -> Result<Ordering, RuntimeError> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Ok(a.cmp(b)),
            (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
                let (a, b) = (self.as_number()?, other.as_number()?);
                a.partial_cmp(&b).ok_or_else(|| RuntimeError::InvalidOperands {
                    op: "compare".into(),
                    left: format!("{}", a),
                    right: format!("{}", b),
                })
            }
            (Value::Str(a), Value::Str(b)) => Ok(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Ok(a.cmp(b)),
            _ => Err(RuntimeError::InvalidOperands {
                op: "compare".into(),
                left: self.type_name(),
                right: other.type_name(),
            }),
        }
    }

    /// Equality as seen by `==`: ints and floats compare numerically
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => (*a as f64) == *b,
            _ => self == other,
        }
    }

    /// Key form used when a value indexes a map or groups a sequence
    pub fn to_key(&self) -> String {
        match self {
            Value::Str(s) => s.clone(),
            other => other.to_string(),
        }
    }

    fn fmt_nested(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{:?}", s),
            other => write!(f, "{}", other),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => {
                Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
            }
            (Value::Function(a), Value::Function(b)) => {
                Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Int(i) => write!(f, "Int({})", i),
            Value::Float(x) => write!(f, "Float({})", x),
            Value::Str(s) => write!(f, "Str({:?})", s),
            Value::List(items) => f.debug_tuple("List").field(items).finish(),
            Value::Map(map) => f.debug_tuple("Map").field(map).finish(),
            Value::Object(obj) => write!(f, "Object({})", obj.type_name()),
            Value::Function(func) => write!(f, "Function(arity {})", func.arity()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{:.1}", x),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    item.fmt_nested(f)?;
                }
                write!(f, "]")
            }
            Value::Map(map) => {
                write!(f, "{{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: ", key)?;
                    value.fmt_nested(f)?;
                }
                write!(f, "}}")
            }
            Value::Object(obj) => match obj.snapshot() {
                Value::Object(_) => write!(f, "<{}>", obj.type_name()),
                snapshot => write!(f, "{}", snapshot),
            },
            Value::Function(func) => write!(f, "<function/{}>", func.arity()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(x) if x.is_finite() => serializer.serialize_f64(*x),
            // JSON has no non-finite numbers
            Value::Float(x) if x.is_nan() => serializer.serialize_str("NaN"),
            Value::Float(x) if *x > 0.0 => serializer.serialize_str("Infinity"),
            Value::Float(_) => serializer.serialize_str("-Infinity"),
            Value::Str(s) => serializer.serialize_str(s),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
            Value::Object(obj) => match obj.snapshot() {
                Value::Object(_) => serializer.serialize_str(obj.type_name()),
                snapshot => snapshot.serialize(serializer),
            },
            Value::Function(func) => serializer.serialize_str(&format!("<function/{}>", func.arity())),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Value::Map(map)
    }
}

impl From<ObjectRef> for Value {
    fn from(obj: ObjectRef) -> Self {
        Value::Object(obj)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Value::Int(2).to_string(), "2");
        assert_eq!(Value::Float(2.0).to_string(), "2.0");
        assert_eq!(Value::Float(0.25).to_string(), "0.25");
        assert_eq!(Value::Null.to_string(), "null");
        let list = Value::List(vec![Value::Int(1), Value::from("a")]);
        assert_eq!(list.to_string(), r#"[1, "a"]"#);
    }

    #[test]
    fn test_compare_mixed_numbers() {
        assert_eq!(Value::Int(1).compare(&Value::Float(1.5)).unwrap(), Ordering::Less);
        assert_eq!(Value::from("b").compare(&Value::from("a")).unwrap(), Ordering::Greater);
        assert!(Value::Int(1).compare(&Value::from("a")).is_err());
    }

    #[test]
    fn test_loose_equality() {
        assert!(Value::Int(2).loose_eq(&Value::Float(2.0)));
        assert_ne!(Value::Int(2), Value::Float(2.0));
        assert!(!Value::Int(2).loose_eq(&Value::from("2")));
    }

    #[test]
    fn test_sequence_of_map_is_values() {
        let mut map = BTreeMap::new();
        map.insert("b".to_string(), Value::Int(2));
        map.insert("a".to_string(), Value::Int(1));
        let seq = Value::Map(map).to_sequence().unwrap();
        assert_eq!(seq, vec![Value::Int(1), Value::Int(2)]);
        assert!(Value::Int(3).to_sequence().is_err());
    }

    #[test]
    fn test_serialize_json() {
        let mut map = BTreeMap::new();
        map.insert("cash".to_string(), Value::Float(100.5));
        map.insert("symbols".to_string(), Value::List(vec![Value::from("SPY")]));
        let json = serde_json::to_value(Value::Map(map)).unwrap();
        assert_eq!(json, serde_json::json!({"cash": 100.5, "symbols": ["SPY"]}));
        assert_eq!(serde_json::to_value(Value::Null).unwrap(), serde_json::Value::Null);

        let non_finite = Value::List(vec![
            Value::Float(f64::INFINITY),
            Value::Float(f64::NEG_INFINITY),
            Value::Float(f64::NAN),
        ]);
        assert_eq!(
            serde_json::to_value(non_finite).unwrap(),
            serde_json::json!(["Infinity", "-Infinity", "NaN"])
        );
    }
}
