//! # Error Types — Property Manager Failures
//!
//! ## Taxonomy
//!
//! | Variant | Cause | Kind |
//! |---------|-------|------|
//! | `Undefined` | name not declared and not buildable | wiring |
//! | `AlreadyInitialized` | second `initialize` | wiring |
//! | `NotInitialized` | access before `initialize` | wiring |
//! | `InvalidDefault` | ad-hoc default fails its validator | wiring |
//! | `NotAllowed` | readonly switch or access mode forbids it | caller |
//! | `Missing` | required property got no value | caller |
//! | `Unrecognized` | leftover names with no remainderer | caller |
//! | `Invalid` | value failed validation | input, recoverable |
//!
//! Wiring errors mean the schema or manager was set up incorrectly and are
//! not expected in normal control flow. `Invalid` is an ordinary outcome:
//! the prior value is untouched and the validator's error is returned for
//! inspection.

use std::fmt;

use propkit_core::{ClassId, ValidationError};
use propkit_schema::MetaError;
use thiserror::Error;

use crate::mode::Mode;

/// Why an operation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// The instance's readonly switch is enabled.
    Readonly,
    /// The mode forbids writes after initialization.
    WriteForbidden(Mode),
    /// A write-once property already holds an explicit value.
    AlreadyWritten,
    /// The mode forbids external reads.
    ReadForbidden(Mode),
    /// The mode forbids supplying a value at initialization.
    SupplyForbidden(Mode),
    /// A restriction would widen the mode or has no common lower mode.
    NoCommonRestriction(Mode, Mode),
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Readonly => write!(f, "instance is readonly"),
            Self::WriteForbidden(mode) => write!(f, "{mode} property cannot be written"),
            Self::AlreadyWritten => write!(f, "write-once property was already written"),
            Self::ReadForbidden(mode) => write!(f, "{mode} property cannot be read"),
            Self::SupplyForbidden(mode) => {
                write!(f, "{mode} property cannot be supplied at initialization")
            }
            Self::NoCommonRestriction(from, to) => {
                write!(f, "{from} property cannot be restricted to {to}")
            }
        }
    }
}

/// Errors from property managers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PropertyError {
    /// The name is not a property of this instance.
    #[error("property '{name}' is not defined on {class}")]
    Undefined {
        /// Owning class.
        class: ClassId,
        /// Property name.
        name: String,
    },

    /// `initialize` was called a second time.
    #[error("properties of {class} are already initialized")]
    AlreadyInitialized {
        /// Owning class.
        class: ClassId,
    },

    /// A property was touched before `initialize` completed.
    #[error("properties of {class} are not initialized")]
    NotInitialized {
        /// Owning class.
        class: ClassId,
    },

    /// The operation is forbidden.
    #[error("cannot modify or access property '{name}': {reason}")]
    NotAllowed {
        /// Property name, or the operation for instance-wide guards.
        name: String,
        /// Why it was refused.
        reason: Denial,
    },

    /// A required property received no value at initialization.
    #[error("missing required property '{name}' on {class}")]
    Missing {
        /// Owning class.
        class: ClassId,
        /// Property name.
        name: String,
    },

    /// Initialization received names that match no property.
    #[error("unrecognized properties on {class}: {}", .names.join(", "))]
    Unrecognized {
        /// Owning class.
        class: ClassId,
        /// Leftover names, sorted.
        names: Vec<String>,
    },

    /// A value failed validation.
    #[error("invalid value for property '{name}': {source}")]
    Invalid {
        /// Property name.
        name: String,
        /// The validator's error.
        source: ValidationError,
    },

    /// An ad-hoc property default fails its own validator.
    #[error("invalid default for property '{name}': {source}")]
    InvalidDefault {
        /// Property name.
        name: String,
        /// The validator's error.
        source: ValidationError,
    },

    /// A schema lookup failed.
    #[error(transparent)]
    Meta(#[from] MetaError),
}

impl PropertyError {
    /// Whether the error points at a wiring mistake rather than a caller or
    /// input problem.
    pub fn is_programmer_error(&self) -> bool {
        match self {
            Self::Undefined { .. }
            | Self::AlreadyInitialized { .. }
            | Self::NotInitialized { .. }
            | Self::InvalidDefault { .. } => true,
            Self::NotAllowed { .. }
            | Self::Missing { .. }
            | Self::Unrecognized { .. }
            | Self::Invalid { .. } => false,
            Self::Meta(inner) => inner.is_programmer_error(),
        }
    }

    /// The validator error, for branching on recoverable input failures.
    pub fn validation_error(&self) -> Option<&ValidationError> {
        match self {
            Self::Invalid { source, .. } | Self::InvalidDefault { source, .. } => Some(source),
            Self::Meta(inner) => inner.validation_error(),
            _ => None,
        }
    }

    /// The refusal reason of a `NotAllowed` error.
    pub fn denial(&self) -> Option<Denial> {
        match self {
            Self::NotAllowed { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}
