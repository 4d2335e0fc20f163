//! # Error Types — Validation Failures
//!
//! A [`ValidationError`] is the structured failure descriptor returned by
//! every [`ValidationUnit`](crate::ValidationUnit). It is an ordinary value:
//! callers branch on it, store it, or wrap it into their own error enums.
//!
//! ## Design
//!
//! - The error names the expected kind and carries the offending value, so
//!   it can be rendered without access to the validator.
//! - The property name is attached by the caller that knows it, not by the
//!   validator.

use serde_json::Value;
use thiserror::Error;

/// A value failed type or shape validation.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{}", render(.property, .expected, .actual, .message))]
pub struct ValidationError {
    /// Description of the accepted kind, e.g. `"integer"`.
    pub expected: String,
    /// The value that was rejected, as it was before validation.
    pub actual: Value,
    /// Optional free-form detail.
    pub message: Option<String>,
    /// Name of the property being validated, when known.
    pub property: Option<String>,
}

/// Expected-kind label used for evaluators that only say yes or no.
pub const ACCEPTED_VALUE: &str = "accepted value";

impl ValidationError {
    /// A value did not match the expected kind.
    pub fn new(expected: impl Into<String>, actual: Value) -> Self {
        Self {
            expected: expected.into(),
            actual,
            message: None,
            property: None,
        }
    }

    /// Generic rejection with no detail, as produced by a `false` evaluator.
    pub fn rejected(actual: Value) -> Self {
        Self::new(ACCEPTED_VALUE, actual)
    }

    /// Attach a free-form message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attach the property name unless one is already present.
    ///
    /// Nested validators (arrays, chains) keep the innermost name.
    pub fn for_property(mut self, property: &str) -> Self {
        if self.property.is_none() && !property.is_empty() {
            self.property = Some(property.to_string());
        }
        self
    }

    /// Whether the error came from a plain yes/no evaluator.
    pub fn is_generic(&self) -> bool {
        self.expected == ACCEPTED_VALUE && self.message.is_none()
    }
}

fn render(
    property: &Option<String>,
    expected: &String,
    actual: &Value,
    message: &Option<String>,
) -> String {
    let mut out = match property {
        Some(name) => format!("property '{name}': expected {expected}, got {actual}"),
        None => format!("expected {expected}, got {actual}"),
    };
    if let Some(message) = message {
        out.push_str(" (");
        out.push_str(message);
        out.push(')');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_without_property() {
        let err = ValidationError::new("integer", json!(1.5));
        assert_eq!(err.to_string(), "expected integer, got 1.5");
    }

    #[test]
    fn test_display_with_property_and_message() {
        let err = ValidationError::new("string", json!(123))
            .with_message("numbers are not names")
            .for_property("title");
        assert_eq!(
            err.to_string(),
            "property 'title': expected string, got 123 (numbers are not names)"
        );
    }

    #[test]
    fn test_for_property_keeps_innermost_name() {
        let err = ValidationError::rejected(json!(null))
            .for_property("inner")
            .for_property("outer");
        assert_eq!(err.property.as_deref(), Some("inner"));
    }

    #[test]
    fn test_rejected_is_generic() {
        assert!(ValidationError::rejected(json!("x")).is_generic());
        assert!(!ValidationError::new("integer", json!("x")).is_generic());
        assert!(!ValidationError::rejected(json!("x"))
            .with_message("why")
            .is_generic());
    }
}
