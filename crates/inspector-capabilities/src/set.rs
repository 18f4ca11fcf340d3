//! Capability set values

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a loadable library
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LibraryRef(String);

impl LibraryRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LibraryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LibraryRef {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// One `(library, namespace)` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    /// Library that must be loaded
    pub library: LibraryRef,
    /// Namespace imported from it
    pub namespace: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityVariant {
    /// A live object is attached
    Rich,
    /// No live object
    Minimal,
}

/// The entry-point parameter assumed by a set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveParameter {
    /// Identifier the query uses to reach the live object
    pub name: String,
    /// Abstract type name; must be exported by an imported namespace
    pub type_name: String,
}

/// Ordered capability set
///
/// The live parameter is part of the set so that the synthesized wrapper
/// signature and the imports can never disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet {
    variant: CapabilityVariant,
    entries: Vec<Capability>,
    live_parameter: Option<LiveParameter>,
}

impl CapabilitySet {
    pub fn builder(variant: CapabilityVariant) -> CapabilitySetBuilder {
        CapabilitySetBuilder {
            variant,
            entries: Vec::new(),
            live_parameter: None,
        }
    }

    pub fn variant(&self) -> CapabilityVariant {
        self.variant
    }

    pub fn entries(&self) -> &[Capability] {
        &self.entries
    }

    pub fn live_parameter(&self) -> Option<&LiveParameter> {
        self.live_parameter.as_ref()
    }

    /// Distinct libraries in first-seen order
    pub fn libraries(&self) -> Vec<&LibraryRef> {
        let mut seen: Vec<&LibraryRef> = Vec::new();
        for entry in &self.entries {
            if !seen.contains(&&entry.library) {
                seen.push(&entry.library);
            }
        }
        seen
    }

    /// Namespace imports in order
    pub fn namespaces(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.namespace.as_str()).collect()
    }

    /// Library that provides `namespace`, if any
    pub fn library_for(&self, namespace: &str) -> Option<&LibraryRef> {
        self.entries
            .iter()
            .find(|e| e.namespace == namespace)
            .map(|e| &e.library)
    }
}

pub struct CapabilitySetBuilder {
    variant: CapabilityVariant,
    entries: Vec<Capability>,
    live_parameter: Option<LiveParameter>,
}

impl CapabilitySetBuilder {
    /// Reference `library` and import `namespace` from it
    ///
    /// Repeated namespaces are ignored so imports stay unique.
    pub fn import(mut self, library: impl Into<LibraryRef>, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        if !self.entries.iter().any(|e| e.namespace == namespace) {
            self.entries.push(Capability {
                library: library.into(),
                namespace,
            });
        }
        self
    }

    pub fn live_parameter(mut self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.live_parameter = Some(LiveParameter {
            name: name.into(),
            type_name: type_name.into(),
        });
        self
    }

    pub fn build(self) -> CapabilitySet {
        CapabilitySet {
            variant: self.variant,
            entries: self.entries,
            live_parameter: self.live_parameter,
        }
    }
}
