//! # Lazy Property Manager
//!
//! A [`LazyPropertyManager`] behaves like a [`PropertyManager`] whose slots
//! come into existence on first touch. A [`Builder`] answers, for a name,
//! either a [`PropertyDef`] or `None` for "no such property". Materialized
//! slots are cached for the manager's lifetime.
//!
//! Required names are tracked separately from the slots, so initialization
//! can insist on them before anything else is built.

use std::collections::BTreeSet;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use propkit_core::{ClassId, PropertyLookup, Value};
use propkit_schema::Meta;

use crate::config::ManagerOptions;
use crate::error::PropertyError;
use crate::manager::{PropertyManager, Remainderer, Values};
use crate::mode::{LoadState, Mode};
use crate::property::PropertyDef;
use crate::readonly::ReadonlyManager;

/// Builds the definition of a property on demand.
pub type Builder = Box<dyn Fn(&str) -> Option<PropertyDef>>;

/// A property manager that materializes slots on first access.
pub struct LazyPropertyManager {
    inner: PropertyManager,
    builder: Builder,
    required: BTreeSet<String>,
}

impl LazyPropertyManager {
    /// A manager for `class` whose properties come from `builder`.
    pub fn new(
        class: impl Into<ClassId>,
        builder: impl Fn(&str) -> Option<PropertyDef> + 'static,
    ) -> Self {
        Self {
            inner: PropertyManager::new(class, std::iter::empty()),
            builder: Box::new(builder),
            required: BTreeSet::new(),
        }
    }

    /// A manager building its properties from the entries of `meta`.
    pub fn from_meta(meta: Arc<Meta>) -> Self {
        let class = meta.class().clone();
        Self::new(class, move |name| PropertyDef::from_meta(&meta, name).ok())
    }

    /// Names that must hold a value once initialization completes,
    /// whatever their mode.
    pub fn with_required<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required.extend(names.into_iter().map(Into::into));
        self
    }

    /// See [`PropertyManager::with_options`].
    pub fn with_options(mut self, options: ManagerOptions) -> Self {
        self.inner = self.inner.with_options(options);
        self
    }

    /// See [`PropertyManager::with_fallback`].
    pub fn with_fallback(mut self, fallback: Weak<dyn PropertyLookup>) -> Self {
        self.inner = self.inner.with_fallback(fallback);
        self
    }

    /// See [`PropertyManager::with_readonly`].
    pub fn with_readonly(mut self, readonly: Rc<ReadonlyManager>) -> Self {
        self.inner = self.inner.with_readonly(readonly);
        self
    }

    /// Build the slot for `name` unless it exists. Returns whether a slot
    /// for `name` exists afterwards.
    fn materialize(&self, name: &str) -> bool {
        if self.inner.contains_slot(name) {
            return true;
        }
        let Some(def) = (self.builder)(name) else {
            return false;
        };
        if def.name() != name {
            tracing::warn!(
                class = %self.inner.class(),
                requested = name,
                built = def.name(),
                "builder returned a definition under another name"
            );
            return false;
        }
        tracing::debug!(class = %self.inner.class(), property = name, "materialized property");
        self.inner.adopt(def);
        true
    }

    // ── Initialization ───────────────────────────────────────────────

    /// Load the initial values.
    ///
    /// Supplied names the builder knows are materialized and validated.
    /// Every required name is materialized and must end up with a value.
    ///
    /// # Errors
    ///
    /// As [`PropertyManager::initialize`], plus
    /// [`PropertyError::Undefined`] for a required name the builder does
    /// not know.
    pub fn initialize(
        &self,
        supplied: Values,
        mode: Mode,
        remainderer: Option<Remainderer<'_>>,
    ) -> Result<(), PropertyError> {
        self.inner.ensure_uninitialized()?;
        for name in supplied.keys() {
            self.materialize(name);
        }
        for name in &self.required {
            if !self.materialize(name) {
                return Err(self.inner.undefined(name));
            }
        }
        self.inner
            .run_initialize(supplied, mode, remainderer, &self.required)
    }

    // ── Access ───────────────────────────────────────────────────────

    /// See [`PropertyManager::has`].
    pub fn has(&self, name: &str) -> bool {
        self.inner.is_initialized() && self.materialize(name)
    }

    /// See [`PropertyManager::get`].
    pub fn get(&self, name: &str) -> Result<Value, PropertyError> {
        self.inner.ensure_initialized()?;
        self.materialize(name);
        self.inner.get(name)
    }

    /// See [`PropertyManager::set`]. Validators see this manager as their
    /// peers, so sibling reads materialize too.
    pub fn set(&self, name: &str, value: Value) -> Result<&Self, PropertyError> {
        self.inner.ensure_initialized()?;
        self.materialize(name);
        self.inner.assign(name, value, self)?;
        Ok(self)
    }

    /// See [`PropertyManager::unset`].
    pub fn unset(&self, name: &str) -> Result<&Self, PropertyError> {
        self.inner.ensure_initialized()?;
        self.materialize(name);
        self.inner.unset(name)?;
        Ok(self)
    }

    /// See [`PropertyManager::isset`].
    pub fn isset(&self, name: &str) -> bool {
        self.inner.is_initialized() && self.materialize(name) && self.inner.isset(name)
    }

    /// Readable properties among those materialized so far.
    pub fn get_all(&self) -> Result<Values, PropertyError> {
        self.inner.get_all()
    }

    /// See [`PropertyManager::restrict`].
    pub fn restrict(&self, name: &str, mode: Mode) -> Result<&Self, PropertyError> {
        self.inner.ensure_initialized()?;
        self.materialize(name);
        self.inner.restrict(name, mode)?;
        Ok(self)
    }

    /// See [`PropertyManager::mode_of`].
    pub fn mode_of(&self, name: &str) -> Result<Mode, PropertyError> {
        self.inner.ensure_initialized()?;
        self.materialize(name);
        self.inner.mode_of(name)
    }

    /// See [`PropertyManager::load_state`].
    pub fn load_state(&self, name: &str) -> Result<LoadState, PropertyError> {
        self.inner.ensure_initialized()?;
        self.materialize(name);
        self.inner.load_state(name)
    }

    // ── Readonly ─────────────────────────────────────────────────────

    /// Whether the shared readonly switch is enabled.
    pub fn is_readonly(&self) -> bool {
        self.inner.is_readonly()
    }

    /// Enable the shared readonly switch. Idempotent.
    pub fn set_as_readonly(&self) {
        self.inner.set_as_readonly();
    }

    /// The shared readonly switch.
    pub fn readonly(&self) -> &Rc<ReadonlyManager> {
        self.inner.readonly()
    }

    // ── Introspection ────────────────────────────────────────────────

    /// Names materialized so far, sorted.
    pub fn names(&self) -> Vec<String> {
        self.inner.names()
    }

    /// The configured required names.
    pub fn required(&self) -> &BTreeSet<String> {
        &self.required
    }

    /// Number of slots materialized so far.
    pub fn materialized_count(&self) -> usize {
        self.inner.slot_count()
    }

    /// Whether `initialize` has completed.
    pub fn is_initialized(&self) -> bool {
        self.inner.is_initialized()
    }

    /// The owning class.
    pub fn class(&self) -> &ClassId {
        self.inner.class()
    }
}

impl PropertyLookup for LazyPropertyManager {
    fn contains(&self, name: &str) -> bool {
        self.materialize(name)
    }

    fn lookup(&self, name: &str) -> Option<Value> {
        self.get(name).ok()
    }
}

impl fmt::Debug for LazyPropertyManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyPropertyManager")
            .field("inner", &self.inner)
            .field("required", &self.required)
            .finish_non_exhaustive()
    }
}
