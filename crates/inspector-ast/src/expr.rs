//! Expression syntax

use crate::Span;

/// An expression with its source span
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
    height: usize,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        let height = 1 + kind.children().map(Expr::height).max().unwrap_or(0);
        Self { kind, span, height }
    }

    /// Nodes on the longest path from this expression down to a leaf
    pub fn height(&self) -> usize {
        self.height
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Literal(Literal),

    /// `[a, b, c]`
    List(Vec<Expr>),

    /// A bare name: parameter, lambda parameter or imported symbol
    Ident(String),

    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },

    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// `cond ? then : otherwise`
    Conditional {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },

    /// `target.name`
    Member {
        target: Box<Expr>,
        name: String,
        name_span: Span,
    },

    /// `target[index]`
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
    },

    /// `callee(args)` where callee is not a member access
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },

    /// `receiver.name(args)`
    MethodCall {
        receiver: Box<Expr>,
        name: String,
        name_span: Span,
        args: Vec<Expr>,
    },

    /// `x => body` or `(x, y) => body`
    Lambda {
        params: Vec<String>,
        body: Box<Expr>,
    },
}

impl ExprKind {
    /// Direct subexpressions in source order
    pub fn children(&self) -> impl Iterator<Item = &Expr> {
        let (boxed, rest): (Vec<&Expr>, &[Expr]) = match self {
            ExprKind::Literal(_) | ExprKind::Ident(_) => (Vec::new(), &[]),
            ExprKind::List(items) => (Vec::new(), items.as_slice()),
            ExprKind::Unary { operand, .. } => (vec![&**operand], &[]),
            ExprKind::Binary { left, right, .. } => (vec![&**left, &**right], &[]),
            ExprKind::Conditional {
                cond,
                then,
                otherwise,
            } => (vec![&**cond, &**then, &**otherwise], &[]),
            ExprKind::Member { target, .. } => (vec![&**target], &[]),
            ExprKind::Index { target, index } => (vec![&**target, &**index], &[]),
            ExprKind::Call { callee, args } => (vec![&**callee], args.as_slice()),
            ExprKind::MethodCall { receiver, args, .. } => (vec![&**receiver], args.as_slice()),
            ExprKind::Lambda { body, .. } => (vec![&**body], &[]),
        };
        boxed.into_iter().chain(rest.iter())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Coalesce,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Coalesce => "??",
        }
    }
}

impl UnaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(value: i64) -> Expr {
        Expr::new(ExprKind::Literal(Literal::Int(value)), Span::default())
    }

    #[test]
    fn test_height_follows_deepest_child() {
        let leaf = int(1);
        assert_eq!(leaf.height(), 1);

        let sum = Expr::new(
            ExprKind::Binary {
                op: BinaryOp::Add,
                left: Box::new(int(1)),
                right: Box::new(int(2)),
            },
            Span::default(),
        );
        assert_eq!(sum.height(), 2);

        let call = Expr::new(
            ExprKind::Call {
                callee: Box::new(Expr::new(ExprKind::Ident("f".into()), Span::default())),
                args: vec![int(0), sum],
            },
            Span::default(),
        );
        assert_eq!(call.height(), 3);
        assert_eq!(call.kind.children().count(), 3);
    }
}
