//! # Schema Registry
//!
//! Explicit keyed storage for schemas. A host defines one [`Meta`] per
//! [`ClassId`] and derived classes inherit by cloning their base's schema
//! under their own identifier.

use std::collections::BTreeMap;

use propkit_core::ClassId;

use crate::error::MetaError;
use crate::meta::Meta;

/// Schemas keyed by owning class.
#[derive(Debug, Default)]
pub struct MetaRegistry {
    schemas: BTreeMap<ClassId, Meta>,
}

impl MetaRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty schema for `class` and return it for definition.
    ///
    /// # Errors
    ///
    /// [`MetaError::ClassDefined`] if `class` already has a schema.
    pub fn define(&mut self, class: impl Into<ClassId>) -> Result<&mut Meta, MetaError> {
        let class = class.into();
        if self.schemas.contains_key(&class) {
            return Err(MetaError::ClassDefined { class });
        }
        tracing::debug!(class = %class, "registered schema");
        Ok(self
            .schemas
            .entry(class.clone())
            .or_insert_with(|| Meta::new(class)))
    }

    /// Give `derived` a copy of `base`'s schema and return it for extension.
    ///
    /// # Errors
    ///
    /// - [`MetaError::ClassUndefined`] if `base` has no schema.
    /// - [`MetaError::ClassDefined`] if `derived` already has one.
    pub fn inherit(
        &mut self,
        base: &ClassId,
        derived: impl Into<ClassId>,
    ) -> Result<&mut Meta, MetaError> {
        let derived = derived.into();
        if self.schemas.contains_key(&derived) {
            return Err(MetaError::ClassDefined { class: derived });
        }
        let copy = self
            .schemas
            .get(base)
            .ok_or_else(|| MetaError::ClassUndefined {
                class: base.clone(),
            })?
            .clone_for(derived.clone());
        tracing::debug!(base = %base, derived = %derived, "inherited schema");
        Ok(self.schemas.entry(derived).or_insert(copy))
    }

    /// The schema of `class`.
    pub fn get(&self, class: &ClassId) -> Result<&Meta, MetaError> {
        self.schemas
            .get(class)
            .ok_or_else(|| MetaError::ClassUndefined {
                class: class.clone(),
            })
    }

    /// Mutable access to the schema of `class`, for adding names.
    pub fn get_mut(&mut self, class: &ClassId) -> Result<&mut Meta, MetaError> {
        self.schemas
            .get_mut(class)
            .ok_or_else(|| MetaError::ClassUndefined {
                class: class.clone(),
            })
    }

    /// Whether `class` has a schema.
    pub fn contains(&self, class: &ClassId) -> bool {
        self.schemas.contains_key(class)
    }

    /// Number of registered classes.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Whether no class is registered.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
