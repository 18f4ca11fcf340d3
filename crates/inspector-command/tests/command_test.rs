//! Running inspector commands against a live object

use inspector_capabilities::Platform;
use inspector_command::{Command, CommandContext, ErrorKind, InspectorCommand, Payload};
use inspector_eval::Evaluator;
use inspector_runtime::{LiveObject, RuntimeError, Value};
use proptest::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counts reads so tests can tell whether the object was touched
#[derive(Default)]
struct Counter {
    reads: AtomicU64,
}

impl LiveObject for Counter {
    fn type_name(&self) -> &str {
        "Algorithm"
    }

    fn get(&self, member: &str) -> Result<Value, RuntimeError> {
        match member {
            "Cash" => {
                self.reads.fetch_add(1, Ordering::Relaxed);
                Ok(Value::Float(250.0))
            }
            "Symbols" => Ok(Value::List(vec![Value::from("SPY"), Value::from("AAPL")])),
            _ => Err(RuntimeError::UnknownMember {
                type_name: "Algorithm".into(),
                member: member.into(),
            }),
        }
    }

    fn members(&self) -> Vec<String> {
        vec!["Symbols".into()]
    }
}

fn live_context(live: Arc<Counter>) -> CommandContext {
    CommandContext::new(Evaluator::default(), Platform::current()).with_live_object(live)
}

// === Envelope ===

#[test]
fn test_live_query_envelope() {
    let live = Arc::new(Counter::default());
    let result = InspectorCommand::new("algorithm.Cash * 2").run(&live_context(live.clone()));
    assert!(result.success());
    assert_eq!(result.payload(), &Payload::Value { value: Value::Float(500.0) });
    assert_eq!(live.reads.load(Ordering::Relaxed), 1);
}

#[test]
fn test_object_payload_serializes_as_snapshot() {
    let live = Arc::new(Counter::default());
    let result = InspectorCommand::new("algorithm").run(&live_context(live));
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["payload"]["value"]["$type"], "Algorithm");
    assert_eq!(json["payload"]["value"]["Symbols"][1], "AAPL");
}

#[test]
fn test_non_finite_float_is_not_null_on_the_wire() {
    let ctx = CommandContext::new(Evaluator::default(), Platform::Unix);
    let result = InspectorCommand::new("1.0 / 0").run(&ctx);
    assert!(result.success());
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["payload"]["value"], "Infinity");

    let result = InspectorCommand::new("0.0 / 0").run(&ctx);
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["payload"]["value"], "NaN");
}

#[test]
fn test_missing_capability_is_compile_error() {
    let ctx = CommandContext::new(Evaluator::default(), Platform::Unix);
    let result = InspectorCommand::new("algorithm.Cash").run(&ctx);
    assert!(!result.success());
    let report = result.payload().error().unwrap();
    assert_eq!(report.kind, ErrorKind::Compile);
    assert!(report.message.contains("algorithm"), "{}", report.message);
}

#[test]
fn test_runtime_error_from_live_object() {
    let live = Arc::new(Counter::default());
    let result = InspectorCommand::new("algorithm.Missing").run(&live_context(live));
    let report = result.payload().error().unwrap();
    assert_eq!(report.kind, ErrorKind::Runtime);
    assert!(report.message.contains("Missing"));
}

#[test]
fn test_concurrent_commands() {
    let live = Arc::new(Counter::default());
    let ctx = live_context(live.clone());
    std::thread::scope(|s| {
        for i in 0..8i64 {
            let ctx = &ctx;
            s.spawn(move || {
                let result = InspectorCommand::new(format!("algorithm.Cash + {}", i)).run(ctx);
                assert_eq!(result.payload().value(), Some(&Value::Float(250.0 + i as f64)));
            });
        }
    });
    assert_eq!(live.reads.load(Ordering::Relaxed), 8);
}

// === Properties ===

proptest! {
    #[test]
    fn prop_integer_addition(a in -1_000_000i64..1_000_000, b in -1_000_000i64..1_000_000) {
        let ctx = CommandContext::new(Evaluator::default(), Platform::Unix);
        let result = InspectorCommand::new(format!("({}) + ({})", a, b)).run(&ctx);
        prop_assert!(result.success());
        prop_assert_eq!(result.payload().value(), Some(&Value::Int(a + b)));
    }

    #[test]
    fn prop_evaluation_is_idempotent(query in "[0-9+*/%() \\[\\]-]{0,16}") {
        let live = Arc::new(Counter::default());
        let ctx = live_context(live);
        let first = InspectorCommand::new(query.clone()).run(&ctx);
        let second = InspectorCommand::new(query).run(&ctx);
        prop_assert_eq!(first.success(), second.success());
        prop_assert_eq!(first.payload(), second.payload());
    }
}
