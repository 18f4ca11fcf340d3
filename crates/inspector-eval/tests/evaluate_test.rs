//! End-to-end evaluation of synthesized units

use inspector_capabilities::{resolve, CapabilitySet, Platform};
use inspector_eval::{CompileError, ErrorKind, EvalError, Evaluator};
use inspector_runtime::{LiveObject, ObjectRef, RuntimeError, Value};
use inspector_synth::synthesize;
use std::collections::BTreeMap;
use std::sync::Arc;

struct Portfolio;

impl LiveObject for Portfolio {
    fn type_name(&self) -> &str {
        "Portfolio"
    }

    fn get(&self, member: &str) -> Result<Value, RuntimeError> {
        match member {
            "Cash" => Ok(Value::Float(1000.0)),
            "Invested" => Ok(Value::Bool(false)),
            _ => Err(RuntimeError::UnknownMember {
                type_name: "Portfolio".into(),
                member: member.into(),
            }),
        }
    }
}

struct TestAlgorithm;

impl LiveObject for TestAlgorithm {
    fn type_name(&self) -> &str {
        "Algorithm"
    }

    fn get(&self, member: &str) -> Result<Value, RuntimeError> {
        match member {
            "Name" => Ok(Value::from("Test")),
            "Portfolio" => Ok(Value::Object(Arc::new(Portfolio))),
            "Prices" => Ok(Value::List(vec![
                Value::Float(10.0),
                Value::Float(11.0),
                Value::Float(12.0),
            ])),
            "Securities" => {
                let mut map = BTreeMap::new();
                map.insert("SPY".to_string(), Value::Float(400.0));
                map.insert("QQQ".to_string(), Value::Float(300.0));
                Ok(Value::Map(map))
            }
            "Nothing" => Ok(Value::Null),
            _ => Err(RuntimeError::UnknownMember {
                type_name: "Algorithm".into(),
                member: member.into(),
            }),
        }
    }

    fn call(&self, method: &str, args: &[Value]) -> Result<Value, RuntimeError> {
        match method {
            "Double" => Ok(Value::Int(args[0].as_int()? * 2)),
            "Fail" => Err(RuntimeError::domain("market closed")),
            _ => Err(RuntimeError::UnknownMethod {
                type_name: "Algorithm".into(),
                method: method.into(),
            }),
        }
    }
}

fn live() -> ObjectRef {
    Arc::new(TestAlgorithm)
}

/// Evaluate against the rich set with a live algorithm
fn eval_live(query: &str) -> Result<Value, EvalError> {
    let set = resolve(true, Platform::Unix);
    eval_with(query, &set, Some(live()))
}

/// Evaluate against the minimal set with no live object
fn eval_bare(query: &str) -> Result<Value, EvalError> {
    let set = resolve(false, Platform::Unix);
    eval_with(query, &set, None)
}

fn eval_with(query: &str, set: &CapabilitySet, live: Option<ObjectRef>) -> Result<Value, EvalError> {
    let unit = synthesize(query, set);
    Evaluator::default().evaluate(&unit, set, live)
}

fn ok(query: &str) -> Value {
    let result = eval_live(query);
    assert!(result.is_ok(), "Expected `{}` to evaluate, got {:?}", query, result.err());
    result.unwrap()
}

fn runtime_error(query: &str) -> RuntimeError {
    match eval_live(query) {
        Err(EvalError::Runtime { error, .. }) => error,
        other => panic!("Expected runtime error for `{}`, got {:?}", query, other),
    }
}

// === Basics ===

#[test]
fn test_arithmetic() {
    assert_eq!(eval_bare("1 + 1").unwrap(), Value::Int(2));
    assert_eq!(ok("2 * (3 + 4) - 10 / 2"), Value::Int(9));
    assert_eq!(ok("7 % 3"), Value::Int(1));
    assert_eq!(ok("1 + 0.5"), Value::Float(1.5));
}

#[test]
fn test_null_result_is_success() {
    assert_eq!(ok("null"), Value::Null);
    assert_eq!(ok("algorithm.Nothing"), Value::Null);
}

#[test]
fn test_strings_and_lists() {
    assert_eq!(ok("\"Cash: \" + 5"), Value::from("Cash: 5"));
    assert_eq!(ok("[1, 2] + [3]"), Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]));
    assert_eq!(ok("\"abc\"[1]"), Value::from("b"));
}

#[test]
fn test_conditional_and_coalesce() {
    assert_eq!(ok("1 < 2 ? \"yes\" : \"no\""), Value::from("yes"));
    assert_eq!(ok("algorithm.Nothing ?? 42"), Value::Int(42));
    assert_eq!(ok("false && 1 / 0 == 0"), Value::Bool(false));
}

// === Live object ===

#[test]
fn test_member_chain() {
    assert_eq!(ok("algorithm.Portfolio.Cash"), Value::Float(1000.0));
    assert_eq!(ok("algorithm.Securities[\"SPY\"]"), Value::Float(400.0));
    assert_eq!(ok("algorithm.Securities.QQQ"), Value::Float(300.0));
}

#[test]
fn test_object_result_is_returned_by_reference() {
    let value = ok("algorithm");
    assert!(matches!(value, Value::Object(ref obj) if obj.type_name() == "Algorithm"));
}

#[test]
fn test_live_method_call() {
    assert_eq!(ok("algorithm.Double(21)"), Value::Int(42));
    assert_eq!(runtime_error("algorithm.Fail()"), RuntimeError::domain("market closed"));
}

#[test]
fn test_unknown_member_is_runtime_error() {
    assert!(matches!(
        runtime_error("algorithm.Missing"),
        RuntimeError::UnknownMember { ref member, .. } if member == "Missing"
    ));
}

#[test]
fn test_null_member_access() {
    assert!(matches!(
        runtime_error("algorithm.Nothing.Cash"),
        RuntimeError::NullReference { .. }
    ));
}

// === Extension methods and lambdas ===

#[test]
fn test_query_operators() {
    assert_eq!(ok("algorithm.Prices.where(p => p > 10.5).count()"), Value::Int(2));
    assert_eq!(ok("algorithm.Prices.select(p => p * 2).first()"), Value::Float(20.0));
    assert_eq!(ok("algorithm.Securities.sum()"), Value::Float(700.0));
    assert_eq!(ok("[3, 1, 2].order_by(x => x)"), Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]));
}

#[test]
fn test_extension_on_object_falls_back() {
    // `Algorithm` has no `to_string`; core's is used with the object as receiver
    assert!(matches!(ok("algorithm.to_string()"), Value::Str(_)));
}

#[test]
fn test_lambda_captures_outer_values() {
    assert_eq!(
        ok("[1, 2].select(x => [10, 20].select(y => x + y + algorithm.Double(0)))"),
        Value::List(vec![
            Value::List(vec![Value::Int(11), Value::Int(21)]),
            Value::List(vec![Value::Int(12), Value::Int(22)]),
        ])
    );
}

#[test]
fn test_indicators_and_enums() {
    assert_eq!(ok("sma(algorithm.Prices, 3)"), Value::Float(11.0));
    assert_eq!(ok("sma(algorithm.Prices, 10)"), Value::Null);
    assert_eq!(ok("OrderDirection.Buy"), Value::from("Buy"));
    assert_eq!(ok("DEFAULT_BENCHMARK"), Value::from("SPY"));
}

// === Runtime errors ===

#[test]
fn test_runtime_errors() {
    assert_eq!(runtime_error("1 / 0"), RuntimeError::DivisionByZero);
    assert_eq!(runtime_error("[].first()"), RuntimeError::EmptySequence);
    assert!(matches!(runtime_error("[1][5]"), RuntimeError::IndexOutOfRange { index: 5, len: 1 }));
    assert!(matches!(runtime_error("9223372036854775807 + 1"), RuntimeError::Overflow { .. }));
}

#[test]
fn test_runtime_error_span_points_at_failing_expression() {
    let set = resolve(false, Platform::Unix);
    let unit = synthesize("1 + 2 / 0", &set);
    let err = Evaluator::default().evaluate(&unit, &set, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Runtime);
    let span = unit.to_query_span(err.span().unwrap()).unwrap();
    assert_eq!(&unit.query()[span.start..span.end], "2 / 0");
}

// === Compile errors ===

#[test]
fn test_unbalanced_paren_is_compile_error() {
    let err = eval_bare("(1 + 1").unwrap_err();
    assert!(matches!(err, EvalError::Compile(CompileError::Parse(_))), "{:?}", err);
}

#[test]
fn test_live_reference_without_live_object() {
    let err = eval_bare("algorithm.Portfolio.Cash").unwrap_err();
    assert!(matches!(
        err,
        EvalError::Compile(CompileError::UnresolvedIdentifier { ref name, .. }) if name == "algorithm"
    ));
}

#[test]
fn test_trading_names_unavailable_in_minimal_set() {
    let err = eval_bare("OrderDirection.Buy").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Compile);
}

#[test]
fn test_injected_braces_fail_to_compile() {
    let err = eval_bare("1; } } } namespace evil { unit X { fn evaluate() -> any { return 2").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Compile);
}

#[test]
fn test_signature_mismatch() {
    let set = resolve(false, Platform::Unix);
    let err = eval_with("1", &set, Some(live())).unwrap_err();
    assert!(matches!(
        err,
        EvalError::Compile(CompileError::SignatureMismatch { expected: 0, got: 1, .. })
    ));

    let rich = resolve(true, Platform::Unix);
    let err = eval_with("1", &rich, None).unwrap_err();
    assert!(matches!(
        err,
        EvalError::Compile(CompileError::SignatureMismatch { expected: 1, got: 0, .. })
    ));
}

#[test]
fn test_missing_library_in_catalog() {
    let set = resolve(false, Platform::Unix);
    let unit = synthesize("1", &set);
    let evaluator = Evaluator::new(Arc::new(inspector_runtime::LibraryCatalog::new()));
    let err = evaluator.evaluate(&unit, &set, None).unwrap_err();
    assert!(matches!(err, EvalError::Compile(CompileError::UnknownLibrary { .. })));
}

#[test]
fn test_custom_capability_set() {
    use inspector_capabilities::{libraries, namespaces, CapabilityVariant};

    let set = CapabilitySet::builder(CapabilityVariant::Minimal)
        .import(libraries::CORE, namespaces::CORE_TEXT)
        .build();
    assert_eq!(eval_with("upper(\"spy\")", &set, None).unwrap(), Value::from("SPY"));
    assert!(eval_with("abs(-1)", &set, None).is_err());
}

#[test]
fn test_platform_query_libraries_agree() {
    let query = "[1, 2, 3].where(x => x > 1).sum()";
    for platform in [Platform::Windows, Platform::Unix] {
        let set = resolve(true, platform);
        assert_eq!(eval_with(query, &set, Some(live())).unwrap(), Value::Int(5));
    }
}
