//! # Built-in Type Processors
//!
//! Ready-made [`ValidationUnit`]s for the common scalar and container
//! shapes. Each processor accepts its canonical form unconditionally and,
//! when `strict` is false, coerces a small set of lossless alternatives
//! (a numeric string for an integer, `"true"` for a boolean).
//!
//! | Processor | Canonical form | Lenient coercions |
//! |-----------|----------------|-------------------|
//! | [`IntegerProcessor`] | integer | integral floats, integer strings |
//! | [`FloatProcessor`] | float | integers, numeric strings |
//! | [`StringProcessor`] | string | numbers, booleans |
//! | [`BooleanProcessor`] | bool | `1`/`0`, `"true"`/`"false"`/`"yes"`/`"no"`/`"on"`/`"off"`/`"1"`/`"0"` |
//! | [`ArrayProcessor`] | array | none; items go through the inner unit |
//! | [`Nullable`] | `null` or inner | those of the inner unit |
//! | [`OneOf`] | one of a fixed set | none |
//! | [`AnyValue`] | anything | none |

use serde_json::{Number, Value};

use crate::context::Context;
use crate::error::ValidationError;
use crate::unit::{SharedUnit, ValidationUnit};

/// Accepts integers.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerProcessor;

impl ValidationUnit for IntegerProcessor {
    fn process(
        &self,
        value: &mut Value,
        _ctx: &Context<'_>,
        strict: bool,
    ) -> Result<(), ValidationError> {
        if value.is_i64() || value.is_u64() {
            return Ok(());
        }
        if !strict {
            let coerced = match &*value {
                Value::Number(n) => n.as_f64().and_then(integral_float),
                Value::String(s) => {
                    let s = s.trim();
                    s.parse::<i64>()
                        .map(Value::from)
                        .or_else(|_| s.parse::<u64>().map(Value::from))
                        .ok()
                }
                _ => None,
            };
            if let Some(n) = coerced {
                *value = n;
                return Ok(());
            }
        }
        Err(ValidationError::new("integer", value.clone()))
    }
}

/// The exact integer equal to `f`, if `f` is integral and fits in `i64`
/// or `u64`. Both casts are exact inside the checked ranges.
fn integral_float(f: f64) -> Option<Value> {
    // 2^63 and 2^64 as exact floats.
    const I64_END: f64 = 9_223_372_036_854_775_808.0;
    const U64_END: f64 = 18_446_744_073_709_551_616.0;
    if f.fract() != 0.0 {
        return None;
    }
    if (-I64_END..I64_END).contains(&f) {
        Some(Value::from(f as i64))
    } else if (I64_END..U64_END).contains(&f) {
        Some(Value::from(f as u64))
    } else {
        None
    }
}

/// Accepts floating-point numbers.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatProcessor;

impl ValidationUnit for FloatProcessor {
    fn process(
        &self,
        value: &mut Value,
        _ctx: &Context<'_>,
        strict: bool,
    ) -> Result<(), ValidationError> {
        let parsed = match &*value {
            Value::Number(n) if n.is_f64() => return Ok(()),
            Value::Number(n) if !strict => n.as_f64(),
            Value::String(s) if !strict => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        match parsed.and_then(Number::from_f64) {
            Some(n) => {
                *value = Value::Number(n);
                Ok(())
            }
            None => Err(ValidationError::new("float", value.clone())),
        }
    }
}

/// Accepts strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringProcessor;

impl ValidationUnit for StringProcessor {
    fn process(
        &self,
        value: &mut Value,
        _ctx: &Context<'_>,
        strict: bool,
    ) -> Result<(), ValidationError> {
        let coerced = match &*value {
            Value::String(_) => return Ok(()),
            Value::Number(n) if !strict => n.to_string(),
            Value::Bool(b) if !strict => b.to_string(),
            _ => return Err(ValidationError::new("string", value.clone())),
        };
        *value = Value::String(coerced);
        Ok(())
    }
}

/// Accepts booleans.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanProcessor;

impl ValidationUnit for BooleanProcessor {
    fn process(
        &self,
        value: &mut Value,
        _ctx: &Context<'_>,
        strict: bool,
    ) -> Result<(), ValidationError> {
        if value.is_boolean() {
            return Ok(());
        }
        let coerced = if strict {
            None
        } else {
            match &*value {
                Value::Number(n) => match n.as_i64() {
                    Some(1) => Some(true),
                    Some(0) => Some(false),
                    _ => None,
                },
                Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                    "true" | "yes" | "on" | "1" => Some(true),
                    "false" | "no" | "off" | "0" => Some(false),
                    _ => None,
                },
                _ => None,
            }
        };
        match coerced {
            Some(b) => {
                *value = Value::Bool(b);
                Ok(())
            }
            None => Err(ValidationError::new("boolean", value.clone())),
        }
    }
}

/// Accepts arrays whose items all pass an inner unit.
#[derive(Clone)]
pub struct ArrayProcessor {
    items: SharedUnit,
}

impl ArrayProcessor {
    /// Array of items validated by `items`.
    pub fn of(items: SharedUnit) -> Self {
        Self { items }
    }
}

impl ValidationUnit for ArrayProcessor {
    fn process(
        &self,
        value: &mut Value,
        ctx: &Context<'_>,
        strict: bool,
    ) -> Result<(), ValidationError> {
        let Value::Array(items) = &*value else {
            return Err(ValidationError::new("array", value.clone()));
        };
        let mut out = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let mut item = item.clone();
            self.items.process(&mut item, ctx, strict).map_err(|e| {
                ValidationError::new(format!("array of {}", e.expected), value.clone())
                    .with_message(format!("item {index}: {e}"))
            })?;
            out.push(item);
        }
        *value = Value::Array(out);
        Ok(())
    }
}

impl std::fmt::Debug for ArrayProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArrayProcessor").finish_non_exhaustive()
    }
}

/// Accepts `null` or whatever the inner unit accepts.
#[derive(Clone)]
pub struct Nullable {
    inner: SharedUnit,
}

impl Nullable {
    /// Wrap `inner` so that `null` also passes.
    pub fn new(inner: SharedUnit) -> Self {
        Self { inner }
    }
}

impl ValidationUnit for Nullable {
    fn process(
        &self,
        value: &mut Value,
        ctx: &Context<'_>,
        strict: bool,
    ) -> Result<(), ValidationError> {
        if value.is_null() {
            return Ok(());
        }
        self.inner.process(value, ctx, strict)
    }
}

impl std::fmt::Debug for Nullable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Nullable").finish_non_exhaustive()
    }
}

/// Accepts exactly one of a fixed set of values.
#[derive(Debug, Clone)]
pub struct OneOf {
    allowed: Vec<Value>,
}

impl OneOf {
    /// Restrict to `allowed`.
    pub fn new(allowed: impl IntoIterator<Item = Value>) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
        }
    }
}

impl ValidationUnit for OneOf {
    fn process(
        &self,
        value: &mut Value,
        _ctx: &Context<'_>,
        _strict: bool,
    ) -> Result<(), ValidationError> {
        if self.allowed.contains(value) {
            return Ok(());
        }
        let choices: Vec<String> = self.allowed.iter().map(Value::to_string).collect();
        Err(ValidationError::new(format!("one of [{}]", choices.join(", ")), value.clone()))
    }
}

/// Accepts every value unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyValue;

impl ValidationUnit for AnyValue {
    fn process(
        &self,
        _value: &mut Value,
        _ctx: &Context<'_>,
        _strict: bool,
    ) -> Result<(), ValidationError> {
        Ok(())
    }
}
