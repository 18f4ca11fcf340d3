//! Binder: resolves a parsed unit against its capability set
//!
//! Checks, in order:
//! 1. every library the capability set references exists in the catalog
//! 2. every `use` names a namespace of one of those libraries
//! 3. parameter and return types name an imported type
//! 4. every identifier is a local, lambda parameter or imported symbol
//! 5. direct calls of imported functions pass an accepted argument count
//!
//! All diagnostics are collected; compilation fails if there is any.

use crate::compiled::{CompiledMethod, CompiledUnit, UnitType};
use crate::interp::NativeCallable;
use crate::ir::{LambdaBody, Node, NodeKind};
use crate::CompileError;
use inspector_ast::{Expr, ExprKind, Literal, MethodDecl, Span, TypeRef, UnitFile};
use inspector_capabilities::CapabilitySet;
use inspector_runtime::{Export, Library, LibraryCatalog, NativeFunction, Value};
use std::collections::HashMap;
use std::sync::Arc;

pub struct Binder<'a> {
    catalog: &'a LibraryCatalog,
    capabilities: &'a CapabilitySet,
    /// Imported symbols; the first import exporting a name wins
    symbols: HashMap<String, Export>,
    scopes: Vec<Scope>,
    errors: Vec<CompileError>,
}

/// Frame layout of one method or lambda
#[derive(Default)]
struct Scope {
    /// Slot names: parameters, then captures as they are discovered
    slots: Vec<String>,
    /// For each capture, its slot in the enclosing frame
    captures: Vec<usize>,
}

impl<'a> Binder<'a> {
    pub fn new(catalog: &'a LibraryCatalog, capabilities: &'a CapabilitySet) -> Self {
        Self {
            catalog,
            capabilities,
            symbols: HashMap::new(),
            scopes: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Bind a unit file; on failure returns every diagnostic, in source order
    pub fn bind(mut self, file: &UnitFile) -> Result<CompiledUnit, Vec<CompileError>> {
        let libraries = self.load_libraries();
        self.import_namespaces(file, &libraries);

        let namespace = file.namespace.name.dotted();
        let mut types = HashMap::new();
        for unit in &file.namespace.units {
            let methods = unit.methods.iter().map(|m| self.bind_method(m)).collect();
            let qualified = format!("{}.{}", namespace, unit.name);
            types.insert(
                qualified.clone(),
                UnitType {
                    name: qualified,
                    methods,
                },
            );
        }

        if self.errors.is_empty() {
            Ok(CompiledUnit::new(types))
        } else {
            Err(self.errors)
        }
    }

    // ===== Libraries and imports =====

    fn load_libraries(&mut self) -> Vec<Arc<Library>> {
        let capabilities = self.capabilities;
        let mut loaded = Vec::new();
        for name in capabilities.libraries() {
            match self.catalog.get(name) {
                Some(library) => loaded.push(Arc::clone(library)),
                None => self.errors.push(CompileError::UnknownLibrary {
                    name: name.to_string(),
                }),
            }
        }
        loaded
    }

    fn import_namespaces(&mut self, file: &UnitFile, libraries: &[Arc<Library>]) {
        for import in &file.imports {
            let name = import.path.dotted();
            let namespace = libraries.iter().find_map(|lib| lib.namespace(&name));
            match namespace {
                Some(namespace) => {
                    for (symbol, export) in namespace.exports() {
                        self.symbols
                            .entry(symbol.to_string())
                            .or_insert_with(|| export.clone());
                    }
                }
                None => self.errors.push(CompileError::UnknownNamespace {
                    name,
                    span: import.span,
                }),
            }
        }
    }

    // ===== Methods =====

    fn bind_method(&mut self, method: &MethodDecl) -> CompiledMethod {
        let mut scope = Scope::default();
        for param in &method.params {
            self.check_type(&param.ty);
            if scope.slots.contains(&param.name) {
                self.errors.push(CompileError::DuplicateParameter {
                    name: param.name.clone(),
                    span: param.span,
                });
            }
            scope.slots.push(param.name.clone());
        }
        self.check_type(&method.ret);

        self.scopes.push(scope);
        let body = self.bind_expr(&method.body);
        self.scopes.pop();

        CompiledMethod {
            name: method.name.clone(),
            params: method.params.iter().map(|p| p.name.clone()).collect(),
            body,
        }
    }

    fn check_type(&mut self, ty: &TypeRef) {
        if let TypeRef::Named(path) = ty {
            let name = path.dotted();
            if !matches!(self.symbols.get(&name), Some(Export::Type)) {
                self.errors.push(CompileError::UnresolvedType {
                    name,
                    span: path.span,
                });
            }
        }
    }

    // ===== Expressions =====

    fn bind_expr(&mut self, expr: &Expr) -> Node {
        let kind = match &expr.kind {
            ExprKind::Literal(lit) => NodeKind::Const(literal(lit)),
            ExprKind::List(items) => NodeKind::List(self.bind_all(items)),
            ExprKind::Ident(name) => self.bind_ident(name, expr.span),
            ExprKind::Unary { op, operand } => NodeKind::Unary {
                op: *op,
                operand: Box::new(self.bind_expr(operand)),
            },
            ExprKind::Binary { op, left, right } => NodeKind::Binary {
                op: *op,
                left: Box::new(self.bind_expr(left)),
                right: Box::new(self.bind_expr(right)),
            },
            ExprKind::Conditional {
                cond,
                then,
                otherwise,
            } => NodeKind::Conditional {
                cond: Box::new(self.bind_expr(cond)),
                then: Box::new(self.bind_expr(then)),
                otherwise: Box::new(self.bind_expr(otherwise)),
            },
            ExprKind::Member { target, name, .. } => NodeKind::Member {
                target: Box::new(self.bind_expr(target)),
                name: name.clone(),
            },
            ExprKind::Index { target, index } => NodeKind::Index {
                target: Box::new(self.bind_expr(target)),
                index: Box::new(self.bind_expr(index)),
            },
            ExprKind::Call { callee, args } => self.bind_call(callee, args),
            ExprKind::MethodCall {
                receiver,
                name,
                args,
                ..
            } => NodeKind::MethodCall {
                receiver: Box::new(self.bind_expr(receiver)),
                name: name.clone(),
                args: self.bind_all(args),
                extension: self.imported_function(name),
            },
            ExprKind::Lambda { params, body } => self.bind_lambda(params, body, expr.span),
        };
        Node::new(kind, expr.span)
    }

    fn bind_all(&mut self, exprs: &[Expr]) -> Vec<Node> {
        exprs.iter().map(|e| self.bind_expr(e)).collect()
    }

    fn bind_ident(&mut self, name: &str, span: Span) -> NodeKind {
        if let Some(slot) = self.lookup_local(name) {
            return NodeKind::Local(slot);
        }
        match self.symbols.get(name) {
            Some(Export::Constant(value)) => NodeKind::Const(value.clone()),
            Some(Export::Function(function)) => {
                NodeKind::Const(Value::Function(Arc::new(NativeCallable::new(*function))))
            }
            Some(Export::Type) => {
                self.errors.push(CompileError::TypeUsedAsValue {
                    name: name.to_string(),
                    span,
                });
                NodeKind::Const(Value::Null)
            }
            None => {
                self.errors.push(CompileError::UnresolvedIdentifier {
                    name: name.to_string(),
                    span,
                });
                NodeKind::Const(Value::Null)
            }
        }
    }

    fn bind_call(&mut self, callee: &Expr, args: &[Expr]) -> NodeKind {
        if let ExprKind::Ident(name) = &callee.kind {
            if self.lookup_local(name).is_none() {
                match self.symbols.get(name) {
                    Some(Export::Function(function)) => {
                        let function = *function;
                        if !function.arity.accepts(args.len()) {
                            self.errors.push(CompileError::ArityMismatch {
                                name: name.clone(),
                                expected: function.arity.to_string(),
                                got: args.len(),
                                span: callee.span,
                            });
                        }
                        return NodeKind::CallNative {
                            function,
                            args: self.bind_all(args),
                        };
                    }
                    Some(Export::Constant(Value::Function(_))) | None => {}
                    Some(_) => {
                        self.errors.push(CompileError::NotCallable {
                            name: name.clone(),
                            span: callee.span,
                        });
                        return NodeKind::Const(Value::Null);
                    }
                }
            }
        }
        NodeKind::CallValue {
            callee: Box::new(self.bind_expr(callee)),
            args: self.bind_all(args),
        }
    }

    fn bind_lambda(&mut self, params: &[String], body: &Expr, span: Span) -> NodeKind {
        let mut scope = Scope::default();
        for param in params {
            if scope.slots.contains(param) {
                self.errors.push(CompileError::DuplicateParameter {
                    name: param.clone(),
                    span,
                });
            }
            scope.slots.push(param.clone());
        }

        self.scopes.push(scope);
        let body = self.bind_expr(body);
        let scope = self.scopes.pop().unwrap_or_default();

        NodeKind::Lambda(Arc::new(LambdaBody {
            arity: params.len(),
            captures: scope.captures,
            body,
        }))
    }

    fn imported_function(&self, name: &str) -> Option<NativeFunction> {
        match self.symbols.get(name) {
            Some(Export::Function(function)) => Some(*function),
            _ => None,
        }
    }

    // ===== Scopes =====

    fn lookup_local(&mut self, name: &str) -> Option<usize> {
        let innermost = self.scopes.len().checked_sub(1)?;
        self.resolve_in(innermost, name)
    }

    /// Slot of `name` in scope `level`, capturing it from enclosing scopes
    /// if needed
    fn resolve_in(&mut self, level: usize, name: &str) -> Option<usize> {
        if let Some(slot) = self.scopes[level].slots.iter().position(|s| s == name) {
            return Some(slot);
        }
        if level == 0 {
            return None;
        }
        let outer = self.resolve_in(level - 1, name)?;
        let scope = &mut self.scopes[level];
        scope.slots.push(name.to_string());
        scope.captures.push(outer);
        Some(scope.slots.len() - 1)
    }
}

fn literal(lit: &Literal) -> Value {
    match lit {
        Literal::Null => Value::Null,
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Int(i) => Value::Int(*i),
        Literal::Float(f) => Value::Float(*f),
        Literal::String(s) => Value::Str(s.clone()),
    }
}
