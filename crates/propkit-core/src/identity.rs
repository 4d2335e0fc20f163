//! # Class Identity
//!
//! A [`ClassId`] names the owner of a schema or a property manager. It
//! replaces "the calling class" lookups with an explicit key that is passed
//! around as an ordinary value and can index maps.

use serde::{Deserialize, Serialize};

/// Identifier of a class that owns a schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassId(String);

impl ClassId {
    /// Create an identifier from an explicit name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Create an identifier from a Rust type's name.
    ///
    /// Convenient when the host object is a concrete type; two distinct
    /// types always yield distinct identifiers.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self(std::any::type_name::<T>().to_string())
    }

    /// Access the underlying name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ClassId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClassId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ClassId {
    fn from(name: String) -> Self {
        Self(name)
    }
}
