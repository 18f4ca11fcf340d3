//! `std.xml`: escaping and value-to-XML rendering

use super::{arg, string};
use crate::{Arity, Namespace, RuntimeError, Value};
use inspector_capabilities::namespaces;

pub fn namespace() -> Namespace {
    Namespace::new(namespaces::XML)
        .function("escape", Arity::Exact(1), |args| Ok(Value::Str(escape(string("escape", arg(args, 0))?))))
        .function("element", Arity::Exact(2), element)
        .function("to_xml", Arity::Range(1, 2), to_xml)
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

fn valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

fn checked_name(name: &str) -> Result<&str, RuntimeError> {
    if valid_name(name) {
        Ok(name)
    } else {
        Err(RuntimeError::invalid_argument("xml", format!("`{}` is not a valid element name", name)))
    }
}

fn element(args: &[Value]) -> Result<Value, RuntimeError> {
    let name = checked_name(string("element", arg(args, 0))?)?;
    let content = escape(&arg(args, 1).to_string());
    Ok(Value::Str(format!("<{name}>{content}</{name}>")))
}

fn to_xml(args: &[Value]) -> Result<Value, RuntimeError> {
    let root = match args.get(1) {
        Some(name) => checked_name(string("to_xml", name)?)?.to_string(),
        None => "value".to_string(),
    };
    let mut out = String::new();
    render(&root, arg(args, 0), &mut out)?;
    Ok(Value::Str(out))
}

fn render(name: &str, value: &Value, out: &mut String) -> Result<(), RuntimeError> {
    match value {
        Value::Null => out.push_str(&format!("<{name}/>")),
        Value::List(items) => {
            out.push_str(&format!("<{name}>"));
            for item in items {
                render("item", item, out)?;
            }
            out.push_str(&format!("</{name}>"));
        }
        Value::Map(map) => {
            out.push_str(&format!("<{name}>"));
            for (key, item) in map {
                let child = if valid_name(key) { key.as_str() } else { "entry" };
                render(child, item, out)?;
            }
            out.push_str(&format!("</{name}>"));
        }
        Value::Object(obj) => match obj.snapshot() {
            Value::Object(_) => out.push_str(&format!("<{name}>{}</{name}>", escape(obj.type_name()))),
            snapshot => render(name, &snapshot, out)?,
        },
        scalar => out.push_str(&format!("<{name}>{}</{name}>", escape(&scalar.to_string()))),
    }
    Ok(())
}
