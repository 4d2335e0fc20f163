//! # Manager Options
//!
//! Coercion policy for a property manager. Both flags default to `false`,
//! meaning validators may normalize loosely typed input (`"42"` into `42`).
//!
//! Options are plain serde data so a host can keep them next to its other
//! settings:
//!
//! ```yaml
//! strict_initialization: false
//! strict_assignment: true
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading [`ManagerOptions`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The YAML document could not be parsed into options.
    #[error("invalid manager options YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The JSON value could not be converted into options.
    #[error("invalid manager options JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Validation strictness for one manager.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManagerOptions {
    /// Pass `strict = true` to validators during `initialize`.
    pub strict_initialization: bool,
    /// Pass `strict = true` to validators during `set`.
    pub strict_assignment: bool,
}

impl ManagerOptions {
    /// Strict validation everywhere.
    pub fn strict() -> Self {
        Self {
            strict_initialization: true,
            strict_assignment: true,
        }
    }

    /// Parse options from YAML. Missing keys keep their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Convert options from an already parsed JSON value.
    pub fn from_json_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        Ok(serde_json::from_value(value)?)
    }
}
