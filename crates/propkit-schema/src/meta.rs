//! # Meta — Per-Class Property Schema
//!
//! A [`Meta`] belongs to exactly one class and maps property names to
//! shared [`Entry`] records. It only grows: `set` adds a name once, nothing
//! replaces or removes it.
//!
//! ## Inheritance
//!
//! ```text
//! Meta(Base) { id, created }
//!      │
//!      └── clone_for(Derived) ──▶ Meta(Derived) { id, created }
//!                                      │
//!                                      └── set("title") ──▶ { id, created, title }
//! ```
//!
//! The derived schema shares the base entries (`Arc`) but not the map, so
//! later definitions on either side stay local to it.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use propkit_core::{apply, ClassId, Context, Phase, SharedUnit, Value};

use crate::entry::Entry;
use crate::error::MetaError;

/// The property schema of one class.
pub struct Meta {
    class: ClassId,
    entries: BTreeMap<String, Arc<Entry>>,
}

impl Meta {
    /// An empty schema owned by `class`.
    pub fn new(class: impl Into<ClassId>) -> Self {
        Self {
            class: class.into(),
            entries: BTreeMap::new(),
        }
    }

    /// The owning class.
    pub fn class(&self) -> &ClassId {
        &self.class
    }

    /// Register `name` with its validator and optional default.
    ///
    /// # Errors
    ///
    /// - [`MetaError::Defined`] if `name` is already registered.
    /// - [`MetaError::InvalidDefault`] if `default` fails `validator`
    ///   (checked with `strict = false`).
    pub fn set(
        &mut self,
        name: impl Into<String>,
        validator: SharedUnit,
        default: Option<Value>,
    ) -> Result<&mut Self, MetaError> {
        let name = name.into();
        if self.entries.contains_key(&name) {
            return Err(MetaError::Defined {
                class: self.class.clone(),
                name,
            });
        }

        let entry = Entry::define(Some(&self.class), name.clone(), validator, default).map_err(
            |source| MetaError::InvalidDefault {
                class: self.class.clone(),
                name: name.clone(),
                source,
            },
        )?;

        tracing::debug!(
            class = %self.class,
            property = %name,
            has_default = entry.has_default(),
            "defined property"
        );
        self.entries.insert(name, Arc::new(entry));
        Ok(self)
    }

    /// Look up the entry for `name`.
    pub fn get(&self, name: &str) -> Result<&Arc<Entry>, MetaError> {
        self.entries.get(name).ok_or_else(|| self.undefined(name))
    }

    /// Whether `name` is registered.
    pub fn has(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Copy this schema for `class`.
    ///
    /// The new schema starts with the same entries and is independent from
    /// then on. Defaults are not re-validated.
    pub fn clone_for(&self, class: impl Into<ClassId>) -> Meta {
        let class = class.into();
        tracing::debug!(from = %self.class, to = %class, entries = self.entries.len(), "cloned schema");
        Meta {
            class,
            entries: self.entries.clone(),
        }
    }

    /// Validate `value` against the validator registered for `name`.
    ///
    /// Uses `strict = false`. On success `value` holds the normalized form;
    /// on [`MetaError::Invalid`] it is exactly what was passed in.
    ///
    /// # Errors
    ///
    /// [`MetaError::Undefined`] if `name` is not registered.
    pub fn process(&self, name: &str, value: &mut Value) -> Result<(), MetaError> {
        let entry = self.get(name)?;
        let ctx = Context::new(name, Phase::Process).with_class(&self.class);
        apply(&**entry.validator(), value, &ctx, false).map_err(|source| MetaError::Invalid {
            class: self.class.clone(),
            name: name.to_string(),
            source,
        })
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Registered entries in name order.
    pub fn entries(&self) -> impl Iterator<Item = &Arc<Entry>> {
        self.entries.values()
    }

    /// Number of registered names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn undefined(&self, name: &str) -> MetaError {
        MetaError::Undefined {
            class: self.class.clone(),
            name: name.to_string(),
        }
    }
}

impl fmt::Debug for Meta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Meta")
            .field("class", &self.class)
            .field("names", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
