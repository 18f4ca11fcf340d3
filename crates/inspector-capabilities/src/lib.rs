//! inspector-capabilities: Capability Set Resolver
//!
//! A capability set is the ordered list of `(library, namespace)` pairs a
//! synthesized unit may use. The resolver picks one of two variants:
//!
//! - **Rich**: a live algorithm is attached. General-purpose libraries,
//!   the platform's query-operator library and every trading domain
//!   library, with a broad set of namespace imports. The generated entry
//!   point takes the algorithm as its single parameter.
//! - **Minimal**: no live object. Core runtime, XML and tabular data only.
//!
//! Sets are plain values: callers may build their own with
//! [`CapabilitySet::builder`] and inject them into the evaluator.

mod names;
mod platform;
mod set;

pub use names::{libraries, namespaces};
pub use platform::Platform;
pub use set::{
    Capability, CapabilitySet, CapabilitySetBuilder, CapabilityVariant, LibraryRef, LiveParameter,
};

use tracing::debug;

/// Name the live object is bound to inside a rich unit
pub const LIVE_PARAMETER_NAME: &str = "algorithm";

/// Abstract type of the live object, exported by `trading.interfaces`
pub const LIVE_PARAMETER_TYPE: &str = "Algorithm";

/// Resolve the capability set for a unit
///
/// Deterministic for a fixed `(live_object, platform)` pair; nothing is cached.
pub fn resolve(live_object: bool, platform: Platform) -> CapabilitySet {
    let set = if live_object {
        rich(platform)
    } else {
        minimal()
    };
    debug!(
        variant = ?set.variant(),
        %platform,
        libraries = set.libraries().len(),
        namespaces = set.namespaces().len(),
        "resolved capability set"
    );
    set
}

fn rich(platform: Platform) -> CapabilitySet {
    // Both libraries provide the same operators under `query`
    let query_library = if platform.is_windows() {
        libraries::LINQ
    } else {
        libraries::QUERY
    };

    CapabilitySet::builder(CapabilityVariant::Rich)
        .import(libraries::CORE, namespaces::CORE)
        .import(libraries::CORE, namespaces::CORE_COLLECTIONS)
        .import(libraries::CORE, namespaces::CORE_TEXT)
        .import(query_library, namespaces::QUERY)
        .import(libraries::TRADING_COMMON, namespaces::TRADING)
        .import(libraries::TRADING_COMMON, namespaces::TRADING_INTERFACES)
        .import(libraries::TRADING_COMMON, namespaces::TRADING_DATA)
        .import(libraries::TRADING_COMMON, namespaces::TRADING_DATA_MARKET)
        .import(libraries::TRADING_COMMON, namespaces::TRADING_ORDERS)
        .import(libraries::TRADING_COMMON, namespaces::TRADING_SECURITIES)
        .import(libraries::TRADING_COMMON, namespaces::TRADING_SCHEDULING)
        .import(libraries::TRADING_ALGORITHM, namespaces::TRADING_ALGORITHM)
        .import(libraries::TRADING_INDICATORS, namespaces::TRADING_INDICATORS)
        .live_parameter(LIVE_PARAMETER_NAME, LIVE_PARAMETER_TYPE)
        .build()
}

fn minimal() -> CapabilitySet {
    CapabilitySet::builder(CapabilityVariant::Minimal)
        .import(libraries::CORE, namespaces::CORE)
        .import(libraries::XML, namespaces::XML)
        .import(libraries::DATA, namespaces::DATA)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_set() {
        let set = resolve(false, Platform::Unix);
        assert_eq!(set.variant(), CapabilityVariant::Minimal);
        assert!(set.live_parameter().is_none());
        assert_eq!(
            set.libraries().iter().map(|l| l.as_str()).collect::<Vec<_>>(),
            vec!["std.core", "std.xml", "std.data"]
        );
        assert_eq!(set.namespaces(), vec!["core", "xml", "data"]);
    }

    #[test]
    fn test_minimal_set_ignores_platform() {
        assert_eq!(resolve(false, Platform::Windows), resolve(false, Platform::Unix));
    }

    #[test]
    fn test_rich_set_spans_domain_libraries() {
        let set = resolve(true, Platform::Unix);
        assert_eq!(set.variant(), CapabilityVariant::Rich);

        let libraries: Vec<_> = set.libraries().iter().map(|l| l.as_str().to_string()).collect();
        for expected in [
            libraries::CORE,
            libraries::TRADING_COMMON,
            libraries::TRADING_ALGORITHM,
            libraries::TRADING_INDICATORS,
        ] {
            assert!(libraries.contains(&expected.to_string()), "missing {}", expected);
        }
        assert!(set.namespaces().contains(&namespaces::TRADING_ORDERS));
        assert!(set.namespaces().contains(&namespaces::TRADING_SECURITIES));

        let param = set.live_parameter().unwrap();
        assert_eq!(param.name, LIVE_PARAMETER_NAME);
        assert_eq!(param.type_name, LIVE_PARAMETER_TYPE);
    }

    #[test]
    fn test_platform_selects_query_library() {
        let windows = resolve(true, Platform::Windows);
        let unix = resolve(true, Platform::Unix);

        let has = |set: &CapabilitySet, name: &str| set.libraries().iter().any(|l| l.as_str() == name);

        assert!(has(&windows, libraries::LINQ));
        assert!(!has(&windows, libraries::QUERY));
        assert!(has(&unix, libraries::QUERY));
        assert!(!has(&unix, libraries::LINQ));

        // Same namespace surface either way
        assert_eq!(windows.namespaces(), unix.namespaces());
    }

    #[test]
    fn test_resolution_is_deterministic() {
        assert_eq!(resolve(true, Platform::Unix), resolve(true, Platform::Unix));
    }
}
