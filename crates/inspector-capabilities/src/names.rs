//! Well-known library and namespace names

/// Library references
pub mod libraries {
    /// Core runtime: math, conversions, collections, text
    pub const CORE: &str = "std.core";
    /// Query operators, non-Windows build
    pub const QUERY: &str = "std.query";
    /// Query operators, Windows build
    pub const LINQ: &str = "std.linq";
    pub const XML: &str = "std.xml";
    /// Tabular data
    pub const DATA: &str = "std.data";
    pub const TRADING_COMMON: &str = "trading.common";
    pub const TRADING_ALGORITHM: &str = "trading.algorithm";
    pub const TRADING_INDICATORS: &str = "trading.indicators";
}

/// Importable namespaces
pub mod namespaces {
    pub const CORE: &str = "core";
    pub const CORE_COLLECTIONS: &str = "core.collections";
    pub const CORE_TEXT: &str = "core.text";
    pub const QUERY: &str = "query";
    pub const XML: &str = "xml";
    pub const DATA: &str = "data";
    pub const TRADING: &str = "trading";
    pub const TRADING_INTERFACES: &str = "trading.interfaces";
    pub const TRADING_DATA: &str = "trading.data";
    pub const TRADING_DATA_MARKET: &str = "trading.data.market";
    pub const TRADING_ORDERS: &str = "trading.orders";
    pub const TRADING_SECURITIES: &str = "trading.securities";
    pub const TRADING_SCHEDULING: &str = "trading.scheduling";
    pub const TRADING_ALGORITHM: &str = "trading.algorithm";
    pub const TRADING_INDICATORS: &str = "trading.indicators";
}
