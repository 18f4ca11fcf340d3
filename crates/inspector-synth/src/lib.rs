//! inspector-synth: Snippet Synthesizer
//!
//! Wraps a raw query expression in a complete unit source:
//!
//! ```text
//! use core;
//! ...
//! namespace inspector {
//! unit Inspector12 {
//! fn evaluate(algorithm: Algorithm) -> any {
//! return <query>;
//! }
//! }
//! }
//! ```
//!
//! The query is inserted verbatim. Nothing is escaped or validated here; a
//! malformed query surfaces as a compile error when the unit is compiled.

use inspector_ast::Span;
use inspector_capabilities::CapabilitySet;
use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Namespace every synthesized unit is declared in
pub const UNIT_NAMESPACE: &str = "inspector";

/// Prefix of generated unit type names
pub const UNIT_TYPE_PREFIX: &str = "Inspector";

/// Name of the generated entry point
pub const ENTRY_METHOD: &str = "evaluate";

/// Process-wide counter for unique unit names
static NEXT_UNIT: AtomicU64 = AtomicU64::new(1);

/// A complete unit source plus the names needed to run it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedUnit {
    pub source: String,
    pub namespace: String,
    pub type_name: String,
    pub method: String,
    /// Whether the entry point takes the live object as its parameter
    pub takes_live_object: bool,
    /// Byte offset of the query inside `source`
    pub query_offset: usize,
    /// Byte length of the query
    pub query_len: usize,
}

impl SynthesizedUnit {
    /// `namespace.TypeName`, the key the compiled unit is instantiated by
    pub fn qualified_type_name(&self) -> String {
        format!("{}.{}", self.namespace, self.type_name)
    }

    /// Range of `source` holding the query text
    pub fn query_span(&self) -> Span {
        Span::new(self.query_offset, self.query_offset + self.query_len)
    }

    /// Rebase a unit span onto the query text
    ///
    /// Spans starting outside the query map to `None`; a span running past
    /// the query end is clipped, so an error on the token right after the
    /// query lands at its end.
    pub fn to_query_span(&self, span: Span) -> Option<Span> {
        let end = self.query_offset + self.query_len;
        if span.start < self.query_offset || span.start > end {
            return None;
        }
        Some(Span::new(span.start, span.end.min(end)).relative_to(self.query_offset))
    }

    /// The query text as embedded
    pub fn query(&self) -> &str {
        &self.source[self.query_offset..self.query_offset + self.query_len]
    }
}

/// Build the unit source for `query` under `capabilities`
pub fn synthesize(query: &str, capabilities: &CapabilitySet) -> SynthesizedUnit {
    let id = NEXT_UNIT.fetch_add(1, Ordering::Relaxed);
    let type_name = format!("{}{}", UNIT_TYPE_PREFIX, id);

    let mut source = String::new();
    for namespace in capabilities.namespaces() {
        // Writing to a String cannot fail
        let _ = writeln!(source, "use {};", namespace);
    }
    let _ = writeln!(source, "namespace {} {{", UNIT_NAMESPACE);
    let _ = writeln!(source, "unit {} {{", type_name);
    match capabilities.live_parameter() {
        Some(param) => {
            let _ = writeln!(
                source,
                "fn {}({}: {}) -> any {{",
                ENTRY_METHOD, param.name, param.type_name
            );
        }
        None => {
            let _ = writeln!(source, "fn {}() -> any {{", ENTRY_METHOD);
        }
    }
    source.push_str("return ");
    let query_offset = source.len();
    source.push_str(query);
    source.push_str(";\n}\n}\n}\n");

    debug!(
        unit = %type_name,
        imports = capabilities.namespaces().len(),
        query_len = query.len(),
        "synthesized unit"
    );

    SynthesizedUnit {
        source,
        namespace: UNIT_NAMESPACE.to_string(),
        type_name,
        method: ENTRY_METHOD.to_string(),
        takes_live_object: capabilities.live_parameter().is_some(),
        query_offset,
        query_len: query.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inspector_capabilities::{resolve, CapabilityVariant, Platform};

    #[test]
    fn test_rich_unit_layout() {
        let set = resolve(true, Platform::Unix);
        let unit = synthesize("algorithm.Portfolio.Cash", &set);

        let lines: Vec<&str> = unit.source.lines().collect();
        let imports = set.namespaces().len();
        assert_eq!(lines[0], "use core;");
        assert_eq!(lines[imports], "namespace inspector {");
        assert_eq!(lines[imports + 1], format!("unit {} {{", unit.type_name));
        assert_eq!(lines[imports + 2], "fn evaluate(algorithm: Algorithm) -> any {");
        assert_eq!(lines[imports + 3], "return algorithm.Portfolio.Cash;");
        assert_eq!(&lines[imports + 4..], &["}", "}", "}"]);
        assert!(unit.takes_live_object);
    }

    #[test]
    fn test_minimal_unit_takes_no_parameter() {
        let set = resolve(false, Platform::Unix);
        assert_eq!(set.variant(), CapabilityVariant::Minimal);
        let unit = synthesize("1 + 1", &set);
        assert!(unit.source.contains("fn evaluate() -> any {"));
        assert!(!unit.takes_live_object);
    }

    #[test]
    fn test_imports_follow_set_order() {
        let set = resolve(true, Platform::Windows);
        let unit = synthesize("1", &set);
        let uses: Vec<&str> = unit
            .source
            .lines()
            .filter_map(|l| l.strip_prefix("use "))
            .map(|l| l.trim_end_matches(';'))
            .collect();
        assert_eq!(uses, set.namespaces());
    }

    #[test]
    fn test_query_inserted_verbatim() {
        let set = resolve(false, Platform::Unix);
        let query = "\"a\\\"b\" + `weird` }";
        let unit = synthesize(query, &set);
        assert_eq!(unit.query(), query);
        assert_eq!(&unit.source[unit.query_span().start..unit.query_span().end], query);
    }

    #[test]
    fn test_to_query_span() {
        let set = resolve(false, Platform::Unix);
        let unit = synthesize("1 + x", &set);
        let x = Span::new(unit.query_offset + 4, unit.query_offset + 5);
        assert_eq!(unit.to_query_span(x), Some(Span::new(4, 5)));

        // The `;` after the query
        let semi = Span::new(unit.query_offset + 5, unit.query_offset + 6);
        assert_eq!(unit.to_query_span(semi), Some(Span::new(5, 5)));

        assert_eq!(unit.to_query_span(Span::new(0, 3)), None);
    }

    #[test]
    fn test_unique_type_names() {
        let set = resolve(false, Platform::Unix);
        let a = synthesize("1", &set);
        let b = synthesize("1", &set);
        assert_ne!(a.type_name, b.type_name);
        assert_eq!(a.qualified_type_name(), format!("inspector.{}", a.type_name));
    }

    #[test]
    fn test_synthesized_unit_parses() {
        for live in [true, false] {
            let set = resolve(live, Platform::current());
            let unit = synthesize("[1, 2].count()", &set);
            let parsed = inspector_parser::parse(&unit.source);
            assert!(parsed.is_ok(), "Failed to parse: {:?}\n{}", parsed.err(), unit.source);
            let file = parsed.unwrap();
            assert_eq!(file.namespace.units[0].name, unit.type_name);
            assert_eq!(file.namespace.units[0].methods[0].body.span, unit.query_span());
        }
    }
}
