//! # Properties
//!
//! A [`Property`] is the live slot behind one property name on one host
//! instance. It is created from a [`PropertyDef`], which binds a schema
//! [`Entry`] to an optional pinned [`Mode`].
//!
//! ## Load States
//!
//! ```text
//!            apply_default()             store()
//!   Unset ──────────────────▶ Defaulted ─────────▶ Set
//!     │                          ▲                  │
//!     └──────── store() ─────────┼──────────────────┤
//!                                │      clear()     │
//!                                └──────────────────┘  (default exists)
//!   Unset ◀──────────────── clear() ────────────────┘  (no default)
//! ```

use std::fmt;
use std::sync::Arc;

use propkit_core::{SharedUnit, Value};
use propkit_schema::{Entry, Meta, MetaError};

use crate::error::{Denial, PropertyError};
use crate::mode::{LoadState, Mode};

// ─── Definition ──────────────────────────────────────────────────────

/// Everything needed to instantiate a [`Property`].
#[derive(Debug, Clone)]
pub struct PropertyDef {
    entry: Arc<Entry>,
    mode: Option<Mode>,
}

impl PropertyDef {
    /// A definition backed by a schema entry. The mode follows the
    /// manager's base mode unless pinned with [`PropertyDef::with_mode`].
    pub fn new(entry: Arc<Entry>) -> Self {
        Self { entry, mode: None }
    }

    /// The definition of `name` in `meta`.
    pub fn from_meta(meta: &Meta, name: &str) -> Result<Self, MetaError> {
        meta.get(name).map(|entry| Self::new(Arc::clone(entry)))
    }

    /// A definition with an ad-hoc validator, outside any schema.
    ///
    /// # Errors
    ///
    /// [`PropertyError::InvalidDefault`] if `default` fails `validator`.
    pub fn ad_hoc(
        name: impl Into<String>,
        validator: SharedUnit,
        default: Option<Value>,
    ) -> Result<Self, PropertyError> {
        let name = name.into();
        Entry::new(name.clone(), validator, default)
            .map(|entry| Self::new(Arc::new(entry)))
            .map_err(|source| PropertyError::InvalidDefault { name, source })
    }

    /// Pin the mode, overriding the manager's base mode.
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// The property name.
    pub fn name(&self) -> &str {
        self.entry.name()
    }

    /// The pinned mode, if any.
    pub fn mode(&self) -> Option<Mode> {
        self.mode
    }

    /// The backing entry.
    pub fn entry(&self) -> &Arc<Entry> {
        &self.entry
    }
}

// ─── Property ────────────────────────────────────────────────────────

/// A live property slot.
pub struct Property {
    entry: Arc<Entry>,
    mode: Mode,
    pinned: bool,
    value: Value,
    loaded: LoadState,
}

impl Property {
    /// Instantiate `def` with no value.
    ///
    /// Until the owning manager resolves it, an unpinned property reports
    /// [`Mode::ReadWrite`].
    pub fn new(def: PropertyDef) -> Self {
        Self {
            entry: def.entry,
            mode: def.mode.unwrap_or(Mode::ReadWrite),
            pinned: def.mode.is_some(),
            value: Value::Null,
            loaded: LoadState::Unset,
        }
    }

    /// The property name.
    pub fn name(&self) -> &str {
        self.entry.name()
    }

    /// The effective access mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Whether the mode was pinned by the definition.
    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    /// The current value; `Null` when unset.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Where the current value came from.
    pub fn load_state(&self) -> LoadState {
        self.loaded
    }

    /// The bound validator.
    pub fn validator(&self) -> &SharedUnit {
        self.entry.validator()
    }

    /// The normalized default, if any.
    pub fn default(&self) -> Option<&Value> {
        self.entry.default()
    }

    /// Whether the property holds a non-null loaded value.
    pub fn is_set(&self) -> bool {
        self.loaded.is_loaded() && !self.value.is_null()
    }

    /// Check that an assignment after initialization is allowed.
    pub fn check_writable(&self) -> Result<(), PropertyError> {
        if self.mode.allows_write() {
            return Ok(());
        }
        let reason = match self.mode {
            Mode::WriteOnce => Denial::AlreadyWritten,
            mode => Denial::WriteForbidden(mode),
        };
        Err(self.denied(reason))
    }

    /// Check that the value may be read from outside.
    pub fn check_readable(&self) -> Result<(), PropertyError> {
        if self.mode.is_readable() {
            Ok(())
        } else {
            Err(self.denied(Denial::ReadForbidden(self.mode)))
        }
    }

    pub(crate) fn denied(&self, reason: Denial) -> PropertyError {
        PropertyError::NotAllowed {
            name: self.name().to_string(),
            reason,
        }
    }

    pub(crate) fn resolve_mode(&mut self, base: Mode) {
        if !self.pinned {
            self.mode = base;
        }
    }

    pub(crate) fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.pinned = true;
    }

    /// Load the default if there is one. Returns whether it did.
    pub(crate) fn apply_default(&mut self) -> bool {
        match self.entry.default() {
            Some(default) => {
                self.value = default.clone();
                self.loaded = LoadState::Defaulted;
                true
            }
            None => false,
        }
    }

    pub(crate) fn load(&mut self, value: Value, state: LoadState) {
        self.value = value;
        self.loaded = state;
    }

    pub(crate) fn store(&mut self, value: Value) {
        self.load(value, LoadState::Set);
    }

    pub(crate) fn clear(&mut self) {
        if !self.apply_default() {
            self.load(Value::Null, LoadState::Unset);
        }
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name())
            .field("mode", &self.mode)
            .field("value", &self.value)
            .field("loaded", &self.loaded)
            .finish_non_exhaustive()
    }
}
