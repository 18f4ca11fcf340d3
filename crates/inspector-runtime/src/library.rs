//! Libraries, namespaces and the catalog they are loaded from

use crate::{RuntimeError, Value};
use inspector_capabilities::LibraryRef;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// Native function body
pub type NativeFn = fn(&[Value]) -> Result<Value, RuntimeError>;

/// Accepted argument counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    /// Inclusive range
    Range(usize, usize),
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Arity::Exact(n) => count == n,
            Arity::Range(min, max) => (min..=max).contains(&count),
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{}", n),
            Arity::Range(min, max) => write!(f, "{} to {}", min, max),
        }
    }
}

#[derive(Clone, Copy)]
pub struct NativeFunction {
    pub name: &'static str,
    pub arity: Arity,
    pub func: NativeFn,
}

impl NativeFunction {
    pub fn invoke(&self, args: &[Value]) -> Result<Value, RuntimeError> {
        if !self.arity.accepts(args.len()) {
            return Err(RuntimeError::ArityMismatch {
                name: self.name.to_string(),
                expected: self.arity.to_string(),
                got: args.len(),
            });
        }
        (self.func)(args)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFunction({}/{})", self.name, self.arity)
    }
}

/// Something a namespace makes visible to an importing unit
#[derive(Debug, Clone)]
pub enum Export {
    Function(NativeFunction),
    Constant(Value),
    /// A type name usable in signatures
    Type,
}

#[derive(Debug, Clone)]
pub struct Namespace {
    name: String,
    exports: BTreeMap<String, Export>,
}

impl Namespace {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            exports: BTreeMap::new(),
        }
    }

    pub fn function(mut self, name: &'static str, arity: Arity, func: NativeFn) -> Self {
        self.exports
            .insert(name.to_string(), Export::Function(NativeFunction { name, arity, func }));
        self
    }

    pub fn constant(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.exports.insert(name.into(), Export::Constant(value.into()));
        self
    }

    pub fn type_name(mut self, name: impl Into<String>) -> Self {
        self.exports.insert(name.into(), Export::Type);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, symbol: &str) -> Option<&Export> {
        self.exports.get(symbol)
    }

    pub fn exports(&self) -> impl Iterator<Item = (&str, &Export)> {
        self.exports.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[derive(Debug, Clone)]
pub struct Library {
    name: LibraryRef,
    namespaces: Vec<Namespace>,
}

impl Library {
    pub fn new(name: impl Into<LibraryRef>) -> Self {
        Self {
            name: name.into(),
            namespaces: Vec::new(),
        }
    }

    pub fn with_namespace(mut self, namespace: Namespace) -> Self {
        self.namespaces.push(namespace);
        self
    }

    pub fn name(&self) -> &LibraryRef {
        &self.name
    }

    pub fn namespace(&self, name: &str) -> Option<&Namespace> {
        self.namespaces.iter().find(|ns| ns.name == name)
    }

    pub fn namespaces(&self) -> &[Namespace] {
        &self.namespaces
    }
}

/// Libraries available for loading, keyed by reference
#[derive(Debug, Clone, Default)]
pub struct LibraryCatalog {
    libraries: HashMap<LibraryRef, Arc<Library>>,
}

impl LibraryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with every built-in library
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        for library in crate::stdlib::all() {
            catalog.register(library);
        }
        catalog
    }

    /// Add or replace a library
    pub fn register(&mut self, library: Library) {
        self.libraries.insert(library.name.clone(), Arc::new(library));
    }

    pub fn get(&self, name: &LibraryRef) -> Option<&Arc<Library>> {
        self.libraries.get(name)
    }

    pub fn len(&self) -> usize {
        self.libraries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(_: &[Value]) -> Result<Value, RuntimeError> {
        Ok(Value::Int(42))
    }

    #[test]
    fn test_arity() {
        assert!(Arity::Exact(1).accepts(1));
        assert!(!Arity::Exact(1).accepts(2));
        assert!(Arity::Range(1, 2).accepts(2));
        assert!(!Arity::Range(1, 2).accepts(0));
    }

    #[test]
    fn test_native_arity_check() {
        let f = NativeFunction {
            name: "answer",
            arity: Arity::Exact(0),
            func: answer,
        };
        assert_eq!(f.invoke(&[]).unwrap(), Value::Int(42));
        assert!(matches!(
            f.invoke(&[Value::Null]),
            Err(RuntimeError::ArityMismatch { got: 1, .. })
        ));
    }

    #[test]
    fn test_catalog_lookup() {
        let mut catalog = LibraryCatalog::new();
        catalog.register(
            Library::new("test.lib").with_namespace(
                Namespace::new("test")
                    .function("answer", Arity::Exact(0), answer)
                    .constant("LIMIT", 10i64)
                    .type_name("Thing"),
            ),
        );

        let library = catalog.get(&LibraryRef::new("test.lib")).unwrap();
        let ns = library.namespace("test").unwrap();
        assert!(matches!(ns.get("answer"), Some(Export::Function(_))));
        assert!(matches!(ns.get("LIMIT"), Some(Export::Constant(Value::Int(10)))));
        assert!(matches!(ns.get("Thing"), Some(Export::Type)));
        assert!(catalog.get(&LibraryRef::new("missing")).is_none());
    }

    #[test]
    fn test_standard_catalog_covers_resolved_sets() {
        use inspector_capabilities::{resolve, Platform};

        let catalog = LibraryCatalog::standard();
        for (live, platform) in [
            (true, Platform::Windows),
            (true, Platform::Unix),
            (false, Platform::Unix),
        ] {
            let set = resolve(live, platform);
            for entry in set.entries() {
                let library = catalog
                    .get(&entry.library)
                    .unwrap_or_else(|| panic!("missing library {}", entry.library));
                assert!(
                    library.namespace(&entry.namespace).is_some(),
                    "{} does not provide {}",
                    entry.library,
                    entry.namespace
                );
            }
        }
    }
}
