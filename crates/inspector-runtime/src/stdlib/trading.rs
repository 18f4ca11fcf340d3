//! Trading-domain libraries
//!
//! `trading.common` carries the shared enums and the `Algorithm` interface
//! type the live parameter is declared with. Indicators operate on plain
//! number sequences and return null until enough data is present.

use super::{arg, count, number, sequence, variants};
use crate::{Arity, Library, Namespace, RuntimeError, Value};
use inspector_capabilities::{libraries, namespaces, LIVE_PARAMETER_TYPE};

pub const DEFAULT_BENCHMARK: &str = "SPY";

pub fn common() -> Library {
    Library::new(libraries::TRADING_COMMON)
        .with_namespace(
            Namespace::new(namespaces::TRADING)
                .function("percent_change", Arity::Exact(2), percent_change)
                .function("round_lot", Arity::Exact(2), round_lot),
        )
        .with_namespace(Namespace::new(namespaces::TRADING_INTERFACES).type_name(LIVE_PARAMETER_TYPE))
        .with_namespace(
            Namespace::new(namespaces::TRADING_DATA).constant(
                "Resolution",
                variants(&["Tick", "Second", "Minute", "Hour", "Daily"]),
            ),
        )
        .with_namespace(
            Namespace::new(namespaces::TRADING_DATA_MARKET)
                .function("mid_price", Arity::Exact(2), mid_price)
                .function("spread", Arity::Exact(2), spread),
        )
        .with_namespace(
            Namespace::new(namespaces::TRADING_ORDERS)
                .constant(
                    "OrderType",
                    variants(&["Market", "Limit", "StopMarket", "StopLimit", "MarketOnOpen", "MarketOnClose"]),
                )
                .constant(
                    "OrderStatus",
                    variants(&["New", "Submitted", "PartiallyFilled", "Filled", "Canceled", "Invalid"]),
                )
                .constant("OrderDirection", variants(&["Buy", "Sell", "Hold"])),
        )
        .with_namespace(Namespace::new(namespaces::TRADING_SECURITIES).constant(
            "SecurityType",
            variants(&["Equity", "Option", "Forex", "Future", "Crypto", "Cfd", "Index"]),
        ))
        .with_namespace(Namespace::new(namespaces::TRADING_SCHEDULING).constant(
            "DayOfWeek",
            variants(&["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"]),
        ))
}

pub fn algorithm() -> Library {
    Library::new(libraries::TRADING_ALGORITHM).with_namespace(
        Namespace::new(namespaces::TRADING_ALGORITHM)
            .type_name("AlgorithmBase")
            .constant("DEFAULT_BENCHMARK", DEFAULT_BENCHMARK),
    )
}

pub fn indicators() -> Library {
    Library::new(libraries::TRADING_INDICATORS).with_namespace(
        Namespace::new(namespaces::TRADING_INDICATORS)
            .function("sma", Arity::Exact(2), sma)
            .function("ema", Arity::Exact(2), ema)
            .function("std_dev", Arity::Exact(2), std_dev)
            .function("rsi", Arity::Exact(2), rsi)
            .function("roc", Arity::Exact(2), roc),
    )
}

// ============================================================================
// trading / trading.data.market
// ============================================================================

fn percent_change(args: &[Value]) -> Result<Value, RuntimeError> {
    let from = number("percent_change", arg(args, 0))?;
    let to = number("percent_change", arg(args, 1))?;
    if from == 0.0 {
        return Err(RuntimeError::DivisionByZero);
    }
    Ok(Value::Float((to - from) / from * 100.0))
}

fn round_lot(args: &[Value]) -> Result<Value, RuntimeError> {
    let quantity = number("round_lot", arg(args, 0))?;
    let lot = number("round_lot", arg(args, 1))?;
    if lot <= 0.0 {
        return Err(RuntimeError::invalid_argument("round_lot", "lot size must be positive"));
    }
    Ok(Value::Float((quantity / lot).trunc() * lot))
}

fn mid_price(args: &[Value]) -> Result<Value, RuntimeError> {
    let bid = number("mid_price", arg(args, 0))?;
    let ask = number("mid_price", arg(args, 1))?;
    Ok(Value::Float((bid + ask) / 2.0))
}

fn spread(args: &[Value]) -> Result<Value, RuntimeError> {
    let bid = number("spread", arg(args, 0))?;
    let ask = number("spread", arg(args, 1))?;
    Ok(Value::Float(ask - bid))
}

// ============================================================================
// trading.indicators
// ============================================================================

/// Numeric series and a positive period
fn series(function: &str, args: &[Value]) -> Result<(Vec<f64>, usize), RuntimeError> {
    let values = sequence(function, arg(args, 0))?
        .iter()
        .map(|v| number(function, v))
        .collect::<Result<Vec<_>, _>>()?;
    let period = count(function, arg(args, 1))?;
    if period == 0 {
        return Err(RuntimeError::invalid_argument(function, "period must be positive"));
    }
    Ok((values, period))
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn sma(args: &[Value]) -> Result<Value, RuntimeError> {
    let (values, period) = series("sma", args)?;
    if values.len() < period {
        return Ok(Value::Null);
    }
    Ok(Value::Float(mean(&values[values.len() - period..])))
}

/// Seeded with the SMA of the first `period` values
fn ema(args: &[Value]) -> Result<Value, RuntimeError> {
    let (values, period) = series("ema", args)?;
    if values.len() < period {
        return Ok(Value::Null);
    }
    let k = 2.0 / (period as f64 + 1.0);
    let seed = mean(&values[..period]);
    let ema = values[period..].iter().fold(seed, |acc, v| v * k + acc * (1.0 - k));
    Ok(Value::Float(ema))
}

/// Population standard deviation over the last `period` values
fn std_dev(args: &[Value]) -> Result<Value, RuntimeError> {
    let (values, period) = series("std_dev", args)?;
    if values.len() < period {
        return Ok(Value::Null);
    }
    let window = &values[values.len() - period..];
    let m = mean(window);
    let variance = window.iter().map(|v| (v - m).powi(2)).sum::<f64>() / period as f64;
    Ok(Value::Float(variance.sqrt()))
}

/// Wilder's RSI; needs `period + 1` values
fn rsi(args: &[Value]) -> Result<Value, RuntimeError> {
    let (values, period) = series("rsi", args)?;
    if values.len() <= period {
        return Ok(Value::Null);
    }
    let changes: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();
    let p = period as f64;

    let mut gain = changes[..period].iter().filter(|c| **c > 0.0).sum::<f64>() / p;
    let mut loss = changes[..period].iter().filter(|c| **c < 0.0).map(|c| -c).sum::<f64>() / p;
    for change in &changes[period..] {
        gain = (gain * (p - 1.0) + change.max(0.0)) / p;
        loss = (loss * (p - 1.0) + (-change).max(0.0)) / p;
    }

    if loss == 0.0 {
        return Ok(Value::Float(100.0));
    }
    Ok(Value::Float(100.0 - 100.0 / (1.0 + gain / loss)))
}

/// Rate of change in percent against the value `period` steps back
fn roc(args: &[Value]) -> Result<Value, RuntimeError> {
    let (values, period) = series("roc", args)?;
    if values.len() <= period {
        return Ok(Value::Null);
    }
    let now = values[values.len() - 1];
    let then = values[values.len() - 1 - period];
    if then == 0.0 {
        return Err(RuntimeError::DivisionByZero);
    }
    Ok(Value::Float((now - then) / then * 100.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prices(values: &[f64]) -> Value {
        Value::List(values.iter().copied().map(Value::Float).collect())
    }

    fn float(value: Value) -> f64 {
        match value {
            Value::Float(f) => f,
            other => panic!("Expected float, got {:?}", other),
        }
    }

    // ========================================================================
    // Indicators
    // ========================================================================

    #[test]
    fn test_not_ready_is_null() {
        let short = prices(&[1.0, 2.0]);
        for f in [sma, ema, std_dev, rsi, roc] {
            assert_eq!(f(&[short.clone(), Value::Int(3)]).unwrap(), Value::Null);
        }
    }

    #[test]
    fn test_sma_uses_latest_window() {
        let out = sma(&[prices(&[1.0, 2.0, 3.0, 4.0]), Value::Int(2)]).unwrap();
        assert_eq!(float(out), 3.5);
    }

    #[test]
    fn test_ema_seeded_with_sma() {
        let out = ema(&[prices(&[2.0, 4.0, 6.0]), Value::Int(2)]).unwrap();
        // seed 3.0, k = 2/3
        assert!((float(out) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_std_dev() {
        let out = std_dev(&[prices(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]), Value::Int(8)]).unwrap();
        assert!((float(out) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_rsi_bounds() {
        let rising = rsi(&[prices(&[1.0, 2.0, 3.0, 4.0]), Value::Int(3)]).unwrap();
        assert_eq!(float(rising), 100.0);
        let mixed = float(rsi(&[prices(&[1.0, 2.0, 1.0, 2.0, 1.0]), Value::Int(2)]).unwrap());
        assert!((0.0..100.0).contains(&mixed));
    }

    #[test]
    fn test_roc() {
        let out = roc(&[prices(&[100.0, 105.0, 110.0]), Value::Int(2)]).unwrap();
        assert!((float(out) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_period_rejected() {
        assert!(sma(&[prices(&[1.0]), Value::Int(0)]).is_err());
    }

    // ========================================================================
    // Common
    // ========================================================================

    #[test]
    fn test_enum_constants() {
        let library = common();
        let orders = library.namespace(namespaces::TRADING_ORDERS).unwrap();
        let Some(crate::Export::Constant(Value::Map(direction))) = orders.get("OrderDirection") else {
            panic!("Expected OrderDirection map");
        };
        assert_eq!(direction.get("Buy"), Some(&Value::from("Buy")));
    }

    #[test]
    fn test_interface_type_exported() {
        let library = common();
        let ns = library.namespace(namespaces::TRADING_INTERFACES).unwrap();
        assert!(matches!(ns.get(LIVE_PARAMETER_TYPE), Some(crate::Export::Type)));
    }

    #[test]
    fn test_market_helpers() {
        assert_eq!(mid_price(&[Value::Float(1.0), Value::Float(2.0)]).unwrap(), Value::Float(1.5));
        assert_eq!(round_lot(&[Value::Int(250), Value::Int(100)]).unwrap(), Value::Float(200.0));
        assert_eq!(percent_change(&[Value::Int(0), Value::Int(1)]), Err(RuntimeError::DivisionByZero));
    }
}
