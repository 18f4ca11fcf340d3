//! Bound expression tree
//!
//! The binder resolves every identifier ahead of time: locals become frame
//! slots, imported symbols become constants or native function references.
//! Nothing in this tree is looked up by name at run time except members and
//! methods of runtime values.

use inspector_ast::{BinaryOp, Span, UnaryOp};
use inspector_runtime::{NativeFunction, Value};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
}

impl Node {
    pub fn new(kind: NodeKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Const(Value),
    List(Vec<Node>),
    /// Slot in the current frame
    Local(usize),
    Unary {
        op: UnaryOp,
        operand: Box<Node>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    Conditional {
        cond: Box<Node>,
        then: Box<Node>,
        otherwise: Box<Node>,
    },
    Member {
        target: Box<Node>,
        name: String,
    },
    Index {
        target: Box<Node>,
        index: Box<Node>,
    },
    /// Call of an imported function, arity checked at bind time
    CallNative {
        function: NativeFunction,
        args: Vec<Node>,
    },
    /// Call of a function value
    CallValue {
        callee: Box<Node>,
        args: Vec<Node>,
    },
    /// `receiver.name(args)`: live object method, else `extension`
    MethodCall {
        receiver: Box<Node>,
        name: String,
        args: Vec<Node>,
        extension: Option<NativeFunction>,
    },
    Lambda(Arc<LambdaBody>),
}

/// A lambda's code and the enclosing slots it captures
///
/// A lambda frame holds its parameters first, then captured values in
/// `captures` order.
#[derive(Debug)]
pub struct LambdaBody {
    pub arity: usize,
    pub captures: Vec<usize>,
    pub body: Node,
}
