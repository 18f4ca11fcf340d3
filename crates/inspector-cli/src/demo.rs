//! A small in-memory trading algorithm to inspect from the command line

use inspector_runtime::{LiveObject, ObjectRef, RuntimeError, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

struct Holding {
    quantity: i64,
    average_price: f64,
}

pub struct DemoAlgorithm {
    name: String,
    time: String,
    portfolio: Arc<DemoPortfolio>,
    securities: BTreeMap<String, Arc<DemoSecurity>>,
    transactions: Arc<DemoTransactions>,
}

impl DemoAlgorithm {
    pub fn new() -> Self {
        let securities: BTreeMap<String, Arc<DemoSecurity>> = [
            ("SPY", "Equity", vec![470.2, 471.9, 469.5, 472.8, 474.1, 475.6, 473.9, 476.3]),
            ("AAPL", "Equity", vec![185.1, 186.4, 184.9, 187.3, 188.0, 186.7, 189.2, 190.5]),
            ("EURUSD", "Forex", vec![1.091, 1.094, 1.089, 1.092, 1.096, 1.095, 1.098, 1.097]),
        ]
        .into_iter()
        .map(|(symbol, kind, history)| {
            (
                symbol.to_string(),
                Arc::new(DemoSecurity {
                    symbol: symbol.to_string(),
                    kind: kind.to_string(),
                    history,
                }),
            )
        })
        .collect();

        let mut holdings = BTreeMap::new();
        holdings.insert(
            "SPY".to_string(),
            Holding {
                quantity: 50,
                average_price: 465.0,
            },
        );
        holdings.insert(
            "AAPL".to_string(),
            Holding {
                quantity: 120,
                average_price: 180.25,
            },
        );
        let prices = securities
            .iter()
            .map(|(symbol, security)| (symbol.clone(), security.price()))
            .collect();

        Self {
            name: "DemoAlgorithm".to_string(),
            time: "2024-01-02T15:30:00Z".to_string(),
            portfolio: Arc::new(DemoPortfolio {
                cash: 25_000.0,
                holdings,
                prices,
            }),
            securities,
            transactions: Arc::new(DemoTransactions),
        }
    }

    pub fn into_object(self) -> ObjectRef {
        Arc::new(self)
    }

    fn history(&self, args: &[Value]) -> Result<Value, RuntimeError> {
        let [symbol, count] = args else {
            return Err(RuntimeError::ArityMismatch {
                name: "History".into(),
                expected: "2".into(),
                got: args.len(),
            });
        };
        let symbol = symbol.as_str()?;
        let count = usize::try_from(count.as_int()?)
            .map_err(|_| RuntimeError::invalid_argument("History", "count must be non-negative"))?;
        let security = self
            .securities
            .get(symbol)
            .ok_or_else(|| RuntimeError::domain(format!("no data subscription for {}", symbol)))?;
        let start = security.history.len().saturating_sub(count);
        Ok(Value::List(
            security.history[start..].iter().copied().map(Value::Float).collect(),
        ))
    }
}

impl Default for DemoAlgorithm {
    fn default() -> Self {
        Self::new()
    }
}

fn unknown_member(type_name: &str, member: &str) -> RuntimeError {
    RuntimeError::UnknownMember {
        type_name: type_name.to_string(),
        member: member.to_string(),
    }
}

impl LiveObject for DemoAlgorithm {
    fn type_name(&self) -> &str {
        "Algorithm"
    }

    fn get(&self, member: &str) -> Result<Value, RuntimeError> {
        match member {
            "Name" => Ok(Value::from(self.name.as_str())),
            "Time" => Ok(Value::from(self.time.as_str())),
            "Portfolio" => Ok(Value::Object(self.portfolio.clone())),
            "Securities" => Ok(Value::Map(
                self.securities
                    .iter()
                    .map(|(symbol, security)| (symbol.clone(), Value::Object(security.clone())))
                    .collect(),
            )),
            "Transactions" => Ok(Value::Object(self.transactions.clone())),
            _ => Err(unknown_member("Algorithm", member)),
        }
    }

    fn call(&self, method: &str, args: &[Value]) -> Result<Value, RuntimeError> {
        match method {
            "History" => self.history(args),
            _ => Err(RuntimeError::UnknownMethod {
                type_name: "Algorithm".into(),
                method: method.into(),
            }),
        }
    }

    fn members(&self) -> Vec<String> {
        ["Name", "Time", "Portfolio", "Securities", "Transactions"]
            .into_iter()
            .map(String::from)
            .collect()
    }
}

struct DemoPortfolio {
    cash: f64,
    holdings: BTreeMap<String, Holding>,
    prices: BTreeMap<String, f64>,
}

impl DemoPortfolio {
    fn holdings_value(&self) -> f64 {
        self.holdings
            .iter()
            .map(|(symbol, h)| h.quantity as f64 * self.prices.get(symbol).copied().unwrap_or(h.average_price))
            .sum()
    }
}

impl LiveObject for DemoPortfolio {
    fn type_name(&self) -> &str {
        "Portfolio"
    }

    fn get(&self, member: &str) -> Result<Value, RuntimeError> {
        match member {
            "Cash" => Ok(Value::Float(self.cash)),
            "TotalHoldingsValue" => Ok(Value::Float(self.holdings_value())),
            "TotalPortfolioValue" => Ok(Value::Float(self.cash + self.holdings_value())),
            "Invested" => Ok(Value::Bool(self.holdings.values().any(|h| h.quantity != 0))),
            "Holdings" => Ok(Value::Map(
                self.holdings
                    .iter()
                    .map(|(symbol, h)| {
                        let mut entry = BTreeMap::new();
                        entry.insert("Symbol".to_string(), Value::from(symbol.as_str()));
                        entry.insert("Quantity".to_string(), Value::Int(h.quantity));
                        entry.insert("AveragePrice".to_string(), Value::Float(h.average_price));
                        (symbol.clone(), Value::Map(entry))
                    })
                    .collect(),
            )),
            _ => Err(unknown_member("Portfolio", member)),
        }
    }

    fn members(&self) -> Vec<String> {
        ["Cash", "TotalHoldingsValue", "TotalPortfolioValue", "Invested", "Holdings"]
            .into_iter()
            .map(String::from)
            .collect()
    }
}

struct DemoSecurity {
    symbol: String,
    kind: String,
    history: Vec<f64>,
}

impl DemoSecurity {
    fn price(&self) -> f64 {
        self.history.last().copied().unwrap_or_default()
    }
}

impl LiveObject for DemoSecurity {
    fn type_name(&self) -> &str {
        "Security"
    }

    fn get(&self, member: &str) -> Result<Value, RuntimeError> {
        match member {
            "Symbol" => Ok(Value::from(self.symbol.as_str())),
            "Price" => Ok(Value::Float(self.price())),
            "Type" => Ok(Value::from(self.kind.as_str())),
            _ => Err(unknown_member("Security", member)),
        }
    }

    fn members(&self) -> Vec<String> {
        vec!["Symbol".into(), "Price".into(), "Type".into()]
    }
}

struct DemoTransactions;

impl LiveObject for DemoTransactions {
    fn type_name(&self) -> &str {
        "TransactionManager"
    }

    fn call(&self, method: &str, args: &[Value]) -> Result<Value, RuntimeError> {
        match method {
            "GetOpenOrders" if args.is_empty() => {
                let mut order = BTreeMap::new();
                order.insert("Id".to_string(), Value::Int(17));
                order.insert("Symbol".to_string(), Value::from("AAPL"));
                order.insert("Type".to_string(), Value::from("Limit"));
                order.insert("Direction".to_string(), Value::from("Buy"));
                order.insert("Quantity".to_string(), Value::Int(10));
                order.insert("LimitPrice".to_string(), Value::Float(184.5));
                order.insert("Status".to_string(), Value::from("Submitted"));
                Ok(Value::List(vec![Value::Map(order)]))
            }
            "GetOpenOrders" => Err(RuntimeError::ArityMismatch {
                name: "GetOpenOrders".into(),
                expected: "0".into(),
                got: args.len(),
            }),
            _ => Err(RuntimeError::UnknownMethod {
                type_name: "TransactionManager".into(),
                method: method.into(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inspector_capabilities::{resolve, Platform};
    use inspector_eval::Evaluator;
    use inspector_synth::synthesize;

    fn eval(query: &str) -> Value {
        let set = resolve(true, Platform::current());
        let unit = synthesize(query, &set);
        let result = Evaluator::default().evaluate(&unit, &set, Some(DemoAlgorithm::new().into_object()));
        assert!(result.is_ok(), "Failed to evaluate `{}`: {:?}", query, result.err());
        result.unwrap()
    }

    #[test]
    fn test_portfolio_queries() {
        assert_eq!(eval("algorithm.Portfolio.Cash"), Value::Float(25_000.0));
        assert_eq!(eval("algorithm.Portfolio.Invested"), Value::Bool(true));
        assert_eq!(eval("algorithm.Portfolio.Holdings.SPY.Quantity"), Value::Int(50));
    }

    #[test]
    fn test_securities_queries() {
        assert_eq!(eval("algorithm.Securities[\"SPY\"].Price"), Value::Float(476.3));
        assert_eq!(
            eval("algorithm.Securities.where(s => s.Type == SecurityType.Equity).count()"),
            Value::Int(2)
        );
    }

    #[test]
    fn test_open_orders() {
        assert_eq!(
            eval("algorithm.Transactions.GetOpenOrders().first().Direction == OrderDirection.Buy"),
            Value::Bool(true)
        );
    }

    #[test]
    fn test_history_feeds_indicators() {
        assert_eq!(eval("algorithm.History(\"SPY\", 3).count()"), Value::Int(3));
        let Value::Float(sma) = eval("sma(algorithm.History(\"AAPL\", 8), 4)") else {
            panic!("Expected float");
        };
        assert!((sma - 188.6).abs() < 1e-9);
    }
}
