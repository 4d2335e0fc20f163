//! # Validation Units
//!
//! The [`ValidationUnit`] trait is the single contract between the property
//! system and the logic that checks and normalizes values.
//!
//! ## Contract
//!
//! `process(value, ctx, strict)`:
//! - `Ok(())`: `value` has been coerced in place into its canonical form.
//! - `Err(e)`: `value` is unmodified and `e` describes the failure.
//!
//! `strict = true` asks the unit to refuse coercions it would otherwise
//! perform (a numeric string for an integer, for example).
//!
//! ## Flavors
//!
//! - [`Evaluator`] adapts a closure that answers yes or no. A `false` answer
//!   becomes a generic [`ValidationError`].
//! - Type processors (see [`crate::types`]) return detailed errors.
//! - [`Chain`] runs several units in order and commits only if all pass.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::context::Context;
use crate::error::ValidationError;

/// Checks and normalizes a value in place.
pub trait ValidationUnit: Send + Sync {
    /// Validate `value`, coercing it on success and leaving it untouched on
    /// failure.
    fn process(
        &self,
        value: &mut Value,
        ctx: &Context<'_>,
        strict: bool,
    ) -> Result<(), ValidationError>;
}

/// A validation unit shared between schema entries and live properties.
pub type SharedUnit = Arc<dyn ValidationUnit>;

/// Run `unit` against `value` so that a failure can never leak a partial
/// coercion.
///
/// The unit works on a copy; the copy replaces `value` only on success. The
/// property name from `ctx` is attached to the error.
pub fn apply<U>(
    unit: &U,
    value: &mut Value,
    ctx: &Context<'_>,
    strict: bool,
) -> Result<(), ValidationError>
where
    U: ValidationUnit + ?Sized,
{
    let mut candidate = value.clone();
    unit.process(&mut candidate, ctx, strict)
        .map_err(|e| e.for_property(ctx.property()))?;
    *value = candidate;
    Ok(())
}

// ─── Evaluator ───────────────────────────────────────────────────────

type EvalFn = dyn Fn(&mut Value, &Context<'_>, bool) -> bool + Send + Sync;

/// A yes/no validator built from a closure.
///
/// The closure may rewrite the value it is handed; if it then answers
/// `false`, the original value is restored before the error is returned.
pub struct Evaluator {
    expected: String,
    eval: Box<EvalFn>,
}

impl Evaluator {
    /// Evaluator with access to the context and strictness flag.
    pub fn new<F>(expected: impl Into<String>, eval: F) -> Self
    where
        F: Fn(&mut Value, &Context<'_>, bool) -> bool + Send + Sync + 'static,
    {
        Self {
            expected: expected.into(),
            eval: Box::new(eval),
        }
    }

    /// Evaluator that only looks at the value.
    pub fn from_fn<F>(expected: impl Into<String>, eval: F) -> Self
    where
        F: Fn(&mut Value) -> bool + Send + Sync + 'static,
    {
        Self::new(expected, move |value, _, _| eval(value))
    }

    /// The expected-kind label reported on rejection.
    pub fn expected(&self) -> &str {
        &self.expected
    }
}

impl ValidationUnit for Evaluator {
    fn process(
        &self,
        value: &mut Value,
        ctx: &Context<'_>,
        strict: bool,
    ) -> Result<(), ValidationError> {
        let original = value.clone();
        if (self.eval)(value, ctx, strict) {
            return Ok(());
        }
        *value = original.clone();
        let mut err = ValidationError::rejected(original);
        err.expected = self.expected.clone();
        Err(err)
    }
}

impl fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Evaluator")
            .field("expected", &self.expected)
            .finish_non_exhaustive()
    }
}

// ─── Chain ───────────────────────────────────────────────────────────

/// An ordered list of units that must all accept the value.
///
/// Each unit sees the output of the previous one. The first failure stops
/// the chain and the input value is left as it was.
#[derive(Default, Clone)]
pub struct Chain {
    units: Vec<SharedUnit>,
}

impl Chain {
    /// An empty chain accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a unit.
    pub fn then(mut self, unit: SharedUnit) -> Self {
        self.units.push(unit);
        self
    }

    /// Number of units in the chain.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether the chain has no units.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl ValidationUnit for Chain {
    fn process(
        &self,
        value: &mut Value,
        ctx: &Context<'_>,
        strict: bool,
    ) -> Result<(), ValidationError> {
        let mut candidate = value.clone();
        for unit in &self.units {
            unit.process(&mut candidate, ctx, strict)?;
        }
        *value = candidate;
        Ok(())
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain").field("len", &self.units.len()).finish()
    }
}
