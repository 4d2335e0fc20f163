//! Errors raised while defining or consulting a schema.

use propkit_core::{ClassId, ValidationError};
use thiserror::Error;

/// Errors from [`Meta`](crate::Meta) and [`MetaRegistry`](crate::MetaRegistry).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetaError {
    /// The name is already registered in this schema.
    #[error("property '{name}' is already defined on {class}")]
    Defined {
        /// Owning class.
        class: ClassId,
        /// Property name.
        name: String,
    },

    /// The name is not registered in this schema.
    #[error("property '{name}' is not defined on {class}")]
    Undefined {
        /// Owning class.
        class: ClassId,
        /// Property name.
        name: String,
    },

    /// A declared default fails its own validator.
    #[error("default for property '{name}' on {class} is invalid: {source}")]
    InvalidDefault {
        /// Owning class.
        class: ClassId,
        /// Property name.
        name: String,
        /// The validator's error.
        source: ValidationError,
    },

    /// A processed value failed validation.
    #[error("invalid value for property '{name}' on {class}: {source}")]
    Invalid {
        /// Owning class.
        class: ClassId,
        /// Property name.
        name: String,
        /// The validator's error.
        source: ValidationError,
    },

    /// The registry already holds a schema for this class.
    #[error("schema for {class} is already defined")]
    ClassDefined {
        /// The class.
        class: ClassId,
    },

    /// The registry holds no schema for this class.
    #[error("no schema defined for {class}")]
    ClassUndefined {
        /// The class.
        class: ClassId,
    },
}

impl MetaError {
    /// Whether the error points at a wiring mistake rather than bad input.
    ///
    /// Only [`MetaError::Invalid`] is an ordinary, recoverable outcome.
    pub fn is_programmer_error(&self) -> bool {
        !matches!(self, Self::Invalid { .. })
    }

    /// The validator error carried by `Invalid` or `InvalidDefault`.
    pub fn validation_error(&self) -> Option<&ValidationError> {
        match self {
            Self::Invalid { source, .. } | Self::InvalidDefault { source, .. } => Some(source),
            _ => None,
        }
    }
}
