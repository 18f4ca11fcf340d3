//! Tree-walking interpreter over bound nodes

use crate::ir::{LambdaBody, Node, NodeKind};
use inspector_ast::{BinaryOp, Span, UnaryOp};
use inspector_runtime::{invoke, Callable, NativeFunction, RuntimeError, Value};
use std::sync::Arc;

/// A runtime error and the node it was raised at
#[derive(Debug, Clone, PartialEq)]
pub struct Fault {
    pub error: RuntimeError,
    pub span: Span,
}

trait At<T> {
    fn at(self, span: Span) -> Result<T, Fault>;
}

impl<T> At<T> for Result<T, RuntimeError> {
    fn at(self, span: Span) -> Result<T, Fault> {
        self.map_err(|error| Fault { error, span })
    }
}

/// Evaluate `node` in `frame`
pub fn eval(node: &Node, frame: &[Value]) -> Result<Value, Fault> {
    let span = node.span;
    match &node.kind {
        NodeKind::Const(value) => Ok(value.clone()),
        NodeKind::List(items) => Ok(Value::List(eval_all(items, frame)?)),
        NodeKind::Local(slot) => Ok(frame.get(*slot).cloned().unwrap_or_default()),
        NodeKind::Unary { op, operand } => {
            let value = eval(operand, frame)?;
            unary(*op, value).at(span)
        }
        NodeKind::Binary { op, left, right } => binary(*op, left, right, frame).at_node(span),
        NodeKind::Conditional {
            cond,
            then,
            otherwise,
        } => {
            let test = eval(cond, frame)?;
            if test.as_bool().at(cond.span)? {
                eval(then, frame)
            } else {
                eval(otherwise, frame)
            }
        }
        NodeKind::Member { target, name } => {
            let value = eval(target, frame)?;
            member(&value, name).at(span)
        }
        NodeKind::Index { target, index } => {
            let value = eval(target, frame)?;
            let key = eval(index, frame)?;
            self::index(&value, &key).at(span)
        }
        NodeKind::CallNative { function, args } => {
            let args = eval_all(args, frame)?;
            function.invoke(&args).at(span)
        }
        NodeKind::CallValue { callee, args } => {
            let callee = eval(callee, frame)?;
            let args = eval_all(args, frame)?;
            let callable = callee.as_callable().at(span)?;
            invoke(callable, args).at(span)
        }
        NodeKind::MethodCall {
            receiver,
            name,
            args,
            extension,
        } => {
            let receiver = eval(receiver, frame)?;
            let args = eval_all(args, frame)?;
            method_call(receiver, name, args, extension.as_ref()).at(span)
        }
        NodeKind::Lambda(lambda) => {
            let captured = lambda
                .captures
                .iter()
                .map(|slot| frame.get(*slot).cloned().unwrap_or_default())
                .collect();
            Ok(Value::Function(Arc::new(Closure {
                lambda: Arc::clone(lambda),
                captured,
            })))
        }
    }
}

fn eval_all(nodes: &[Node], frame: &[Value]) -> Result<Vec<Value>, Fault> {
    nodes.iter().map(|n| eval(n, frame)).collect()
}

/// Faults from operands keep their own span; operator errors get `span`
trait AtNode<T> {
    fn at_node(self, span: Span) -> Result<T, Fault>;
}

impl<T> AtNode<T> for Result<T, Located> {
    fn at_node(self, span: Span) -> Result<T, Fault> {
        self.map_err(|e| match e {
            Located::Operand(fault) => fault,
            Located::Operator(error) => Fault { error, span },
        })
    }
}

enum Located {
    Operand(Fault),
    Operator(RuntimeError),
}

impl From<Fault> for Located {
    fn from(fault: Fault) -> Self {
        Located::Operand(fault)
    }
}

impl From<RuntimeError> for Located {
    fn from(error: RuntimeError) -> Self {
        Located::Operator(error)
    }
}

// ============================================================================
// Operators
// ============================================================================

fn unary(op: UnaryOp, value: Value) -> Result<Value, RuntimeError> {
    match (op, value) {
        (UnaryOp::Neg, Value::Int(i)) => i
            .checked_neg()
            .map(Value::Int)
            .ok_or_else(|| RuntimeError::Overflow { op: "-".into() }),
        (UnaryOp::Neg, Value::Float(f)) => Ok(Value::Float(-f)),
        (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (op, other) => Err(RuntimeError::InvalidOperand {
            op: op.symbol().into(),
            operand: other.type_name(),
        }),
    }
}

fn binary(op: BinaryOp, left: &Node, right: &Node, frame: &[Value]) -> Result<Value, Located> {
    // Short-circuiting operators evaluate `right` lazily
    match op {
        BinaryOp::And | BinaryOp::Or => {
            let lhs = eval(left, frame)?;
            let lhs = lhs.as_bool().at(left.span)?;
            if lhs == (op == BinaryOp::Or) {
                return Ok(Value::Bool(lhs));
            }
            let rhs = eval(right, frame)?;
            return Ok(Value::Bool(rhs.as_bool().at(right.span)?));
        }
        BinaryOp::Coalesce => {
            let lhs = eval(left, frame)?;
            if !lhs.is_null() {
                return Ok(lhs);
            }
            return Ok(eval(right, frame)?);
        }
        _ => {}
    }

    let lhs = eval(left, frame)?;
    let rhs = eval(right, frame)?;
    Ok(apply(op, lhs, rhs)?)
}

/// Strict binary operators on evaluated operands
pub fn apply(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
    use std::cmp::Ordering;

    match op {
        BinaryOp::Eq => Ok(Value::Bool(lhs.loose_eq(&rhs))),
        BinaryOp::Ne => Ok(Value::Bool(!lhs.loose_eq(&rhs))),
        BinaryOp::Lt => Ok(Value::Bool(lhs.compare(&rhs)? == Ordering::Less)),
        BinaryOp::Le => Ok(Value::Bool(lhs.compare(&rhs)? != Ordering::Greater)),
        BinaryOp::Gt => Ok(Value::Bool(lhs.compare(&rhs)? == Ordering::Greater)),
        BinaryOp::Ge => Ok(Value::Bool(lhs.compare(&rhs)? != Ordering::Less)),
        BinaryOp::Add => add(lhs, rhs),
        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => arithmetic(op, lhs, rhs),
        BinaryOp::And => Ok(Value::Bool(lhs.as_bool()? && rhs.as_bool()?)),
        BinaryOp::Or => Ok(Value::Bool(lhs.as_bool()? || rhs.as_bool()?)),
        BinaryOp::Coalesce => Ok(if lhs.is_null() { rhs } else { lhs }),
    }
}

fn add(lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
    match (lhs, rhs) {
        (Value::Str(mut a), b) => {
            a.push_str(&b.to_string());
            Ok(Value::Str(a))
        }
        (a, Value::Str(b)) => Ok(Value::Str(format!("{}{}", a, b))),
        (Value::List(mut a), Value::List(b)) => {
            a.extend(b);
            Ok(Value::List(a))
        }
        (a, b) => arithmetic(BinaryOp::Add, a, b),
    }
}

fn arithmetic(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
    let overflow = || RuntimeError::Overflow {
        op: op.symbol().into(),
    };
    match (&lhs, &rhs) {
        (Value::Int(a), Value::Int(b)) => {
            let (a, b) = (*a, *b);
            let result = match op {
                BinaryOp::Add => a.checked_add(b),
                BinaryOp::Sub => a.checked_sub(b),
                BinaryOp::Mul => a.checked_mul(b),
                BinaryOp::Div | BinaryOp::Rem if b == 0 => return Err(RuntimeError::DivisionByZero),
                BinaryOp::Div => a.checked_div(b),
                _ => a.checked_rem(b),
            };
            result.map(Value::Int).ok_or_else(overflow)
        }
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            let (a, b) = (lhs.as_number()?, rhs.as_number()?);
            Ok(Value::Float(match op {
                BinaryOp::Add => a + b,
                BinaryOp::Sub => a - b,
                BinaryOp::Mul => a * b,
                BinaryOp::Div => a / b,
                _ => a % b,
            }))
        }
        _ => Err(RuntimeError::InvalidOperands {
            op: op.symbol().into(),
            left: lhs.type_name(),
            right: rhs.type_name(),
        }),
    }
}

// ============================================================================
// Member access
// ============================================================================

fn member(target: &Value, name: &str) -> Result<Value, RuntimeError> {
    match target {
        Value::Null => Err(RuntimeError::NullReference {
            member: name.to_string(),
        }),
        Value::Object(obj) => obj.get(name),
        Value::Map(map) => match map.get(name) {
            Some(value) => Ok(value.clone()),
            None if name == "Count" => Ok(Value::Int(map.len() as i64)),
            None => Err(RuntimeError::KeyNotFound {
                key: name.to_string(),
            }),
        },
        Value::List(items) if name == "Count" || name == "Length" => Ok(Value::Int(items.len() as i64)),
        Value::Str(s) if name == "Length" => Ok(Value::Int(s.chars().count() as i64)),
        other => Err(RuntimeError::UnknownMember {
            type_name: other.type_name(),
            member: name.to_string(),
        }),
    }
}

fn index(target: &Value, key: &Value) -> Result<Value, RuntimeError> {
    match (target, key) {
        (Value::Null, _) => Err(RuntimeError::NullReference {
            member: format!("[{}]", key),
        }),
        (Value::List(items), Value::Int(i)) => usize::try_from(*i)
            .ok()
            .and_then(|at| items.get(at))
            .cloned()
            .ok_or(RuntimeError::IndexOutOfRange {
                index: *i,
                len: items.len(),
            }),
        (Value::Str(s), Value::Int(i)) => usize::try_from(*i)
            .ok()
            .and_then(|at| s.chars().nth(at))
            .map(|c| Value::Str(c.to_string()))
            .ok_or(RuntimeError::IndexOutOfRange {
                index: *i,
                len: s.chars().count(),
            }),
        (Value::Map(map), Value::Str(k)) => {
            map.get(k).cloned().ok_or_else(|| RuntimeError::KeyNotFound { key: k.clone() })
        }
        (Value::Object(obj), Value::Str(k)) => obj.get(k),
        (Value::List(_) | Value::Str(_), other) => Err(RuntimeError::type_mismatch("int index", other.type_name())),
        (Value::Map(_) | Value::Object(_), other) => {
            Err(RuntimeError::type_mismatch("string key", other.type_name()))
        }
        (other, _) => Err(RuntimeError::InvalidOperand {
            op: "[]".into(),
            operand: other.type_name(),
        }),
    }
}

fn method_call(
    receiver: Value,
    name: &str,
    args: Vec<Value>,
    extension: Option<&NativeFunction>,
) -> Result<Value, RuntimeError> {
    if let Value::Object(obj) = &receiver {
        match obj.call(name, &args) {
            Err(RuntimeError::UnknownMethod { .. }) if extension.is_some() => {}
            result => return result,
        }
    }

    match extension {
        Some(function) => {
            let mut full = Vec::with_capacity(args.len() + 1);
            full.push(receiver);
            full.extend(args);
            function.invoke(&full)
        }
        None if receiver.is_null() => Err(RuntimeError::NullReference {
            member: name.to_string(),
        }),
        None => Err(RuntimeError::UnknownMethod {
            type_name: receiver.type_name(),
            method: name.to_string(),
        }),
    }
}

// ============================================================================
// Function values
// ============================================================================

/// A lambda value with its captured environment
pub struct Closure {
    lambda: Arc<LambdaBody>,
    captured: Vec<Value>,
}

impl Callable for Closure {
    fn arity(&self) -> usize {
        self.lambda.arity
    }

    fn call(&self, args: Vec<Value>) -> Result<Value, RuntimeError> {
        let mut frame = args;
        frame.extend(self.captured.iter().cloned());
        eval(&self.lambda.body, &frame).map_err(|fault| fault.error)
    }
}

/// An imported function used as a value, e.g. `values.select(abs)`
pub struct NativeCallable {
    function: NativeFunction,
}

impl NativeCallable {
    pub fn new(function: NativeFunction) -> Self {
        Self { function }
    }
}

impl Callable for NativeCallable {
    fn arity(&self) -> usize {
        match self.function.arity {
            inspector_runtime::Arity::Exact(n) | inspector_runtime::Arity::Range(n, _) => n,
        }
    }

    fn call(&self, args: Vec<Value>) -> Result<Value, RuntimeError> {
        self.function.invoke(&args)
    }
}
