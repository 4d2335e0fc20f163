//! # Panic Paths
//!
//! Adversarial values pushed through validators and managers. Every call
//! must return an error or a value, never unwind.

use std::panic;
use std::sync::Arc;

use propkit_core::{
    apply, ArrayProcessor, BooleanProcessor, Context, FloatProcessor, IntegerProcessor, Nullable,
    OneOf, Phase, SharedUnit, StringProcessor, ValidationUnit, Value,
};
use propkit_state::{LazyPropertyManager, ManagerOptions, Mode, PropertyDef, Values};
use serde_json::json;

fn hostile_values() -> Vec<Value> {
    let mut nested = json!("leaf");
    for _ in 0..100 {
        nested = json!([nested]);
    }
    vec![
        Value::Null,
        json!(u64::MAX),
        json!(i64::MIN),
        json!(f64::MAX),
        json!(9_223_372_036_854_775_808.0_f64),
        json!(18_446_744_073_709_549_568.0_f64),
        json!(-0.0),
        json!("9223372036854775808"),
        json!("   "),
        json!("\u{0}"),
        json!({ "a": { "b": [1, 2, { "c": null }] } }),
        nested,
    ]
}

fn units() -> Vec<SharedUnit> {
    vec![
        Arc::new(IntegerProcessor),
        Arc::new(FloatProcessor),
        Arc::new(StringProcessor),
        Arc::new(BooleanProcessor),
        Arc::new(ArrayProcessor::of(Arc::new(IntegerProcessor))),
        Arc::new(Nullable::new(Arc::new(IntegerProcessor))),
        Arc::new(OneOf::new([json!(1), json!("one")])),
    ]
}

#[test]
fn builtin_units_never_panic() {
    let ctx = Context::new("p", Phase::Process);
    for unit in units() {
        for value in hostile_values() {
            for strict in [false, true] {
                let result = panic::catch_unwind(panic::AssertUnwindSafe(|| {
                    let mut v = value.clone();
                    let _ = unit.process(&mut v, &ctx, strict);
                }));
                assert!(result.is_ok(), "unit panicked on {value} (strict={strict})");
            }
        }
    }
}

#[test]
fn failed_apply_is_untouched_for_hostile_values() {
    let ctx = Context::new("p", Phase::Process);
    for unit in units() {
        for value in hostile_values() {
            let mut v = value.clone();
            if apply(&*unit, &mut v, &ctx, true).is_err() {
                assert_eq!(v, value);
            }
        }
    }
}

#[test]
fn lenient_integer_coercion_keeps_the_number() {
    let ctx = Context::new("p", Phase::Process);
    for value in hostile_values() {
        let Some(before) = value.as_f64() else {
            continue;
        };
        let mut v = value.clone();
        if apply(&IntegerProcessor, &mut v, &ctx, false).is_ok() {
            let exact = v
                .as_i64()
                .map(i128::from)
                .or_else(|| v.as_u64().map(i128::from));
            assert_eq!(exact, Some(before as i128), "{value} coerced to {v}");
        }
    }
}

#[test]
fn lazy_manager_with_hostile_names_and_values() {
    let manager = LazyPropertyManager::new("Anything", |name| {
        PropertyDef::ad_hoc(name, Arc::new(StringProcessor), None).ok()
    })
    .with_options(ManagerOptions::strict());
    manager.initialize(Values::new(), Mode::ReadWrite, None).unwrap();

    for (i, value) in hostile_values().into_iter().enumerate() {
        let name = format!("{}\u{0}{}", "x".repeat(i * 50), i);
        let result = panic::catch_unwind(panic::AssertUnwindSafe(|| {
            let _ = manager.set(&name, value.clone());
            let _ = manager.get(&name);
            let _ = manager.unset(&name);
        }));
        assert!(result.is_ok(), "manager panicked on {name:?}");
    }
    assert!(manager.get("").is_ok());
}
