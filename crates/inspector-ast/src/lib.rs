//! Inspector AST - Syntax tree for synthesized units
//!
//! A synthesized unit is a tiny compilation unit wrapping one expression:
//!
//! ```text
//! use core;
//! use query;
//! namespace inspector {
//! unit Inspector7 {
//! fn evaluate(algorithm: Algorithm) -> any {
//! return <query>;
//! }
//! }
//! }
//! ```
//!
//! The unit declarations live in [`UnitFile`]; the expression grammar lives
//! in [`Expr`].

mod expr;
mod span;

pub use expr::*;
pub use span::Span;

/// A parsed unit source file
#[derive(Debug, Clone, PartialEq)]
pub struct UnitFile {
    /// `use` declarations, in source order
    pub imports: Vec<Import>,
    /// The single enclosing namespace
    pub namespace: NamespaceDecl,
    pub span: Span,
}

/// `use a.b.c;`
#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub path: Path,
    pub span: Span,
}

/// A dotted name such as `trading.data.market`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    pub segments: Vec<String>,
    pub span: Span,
}

impl Path {
    pub fn new(segments: Vec<String>, span: Span) -> Self {
        Self { segments, span }
    }

    /// Dotted form, e.g. `trading.orders`
    pub fn dotted(&self) -> String {
        self.segments.join(".")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceDecl {
    pub name: Path,
    pub units: Vec<UnitDecl>,
    pub span: Span,
}

/// `unit Name { ... }` - the throwaway type holding the entry point
#[derive(Debug, Clone, PartialEq)]
pub struct UnitDecl {
    pub name: String,
    pub methods: Vec<MethodDecl>,
    pub span: Span,
}

/// `fn name(params) -> type { return expr; }`
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub ret: TypeRef,
    /// The expression after `return`
    pub body: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: TypeRef,
    pub span: Span,
}

/// A type annotation
#[derive(Debug, Clone, PartialEq)]
pub enum TypeRef {
    /// `any` - the untyped supertype of every value
    Any,
    /// A named type that must be exported by an imported namespace
    Named(Path),
}

impl TypeRef {
    pub fn display(&self) -> String {
        match self {
            TypeRef::Any => "any".to_string(),
            TypeRef::Named(path) => path.dotted(),
        }
    }
}
