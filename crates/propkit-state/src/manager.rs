//! # Property Manager
//!
//! A [`PropertyManager`] owns the [`Property`] slots of one host instance.
//! It drives the one-time initialization, then guards every read and write
//! against the slot's [`Mode`], the shared [`ReadonlyManager`], and the
//! slot's validator.
//!
//! ## Lifecycle
//!
//! ```text
//! new / from_meta ──▶ initialize(supplied, mode, remainderer) ──▶ get / set / unset ...
//!                        │
//!                        └─ failure: manager stays uninitialized, nothing committed
//! ```
//!
//! ## Initialization
//!
//! 1. Resolve each slot's mode: a pinned mode wins, otherwise `mode`.
//! 2. Validate every supplied value that matches a slot. `StrictRead` slots
//!    refuse supplied values.
//! 3. Slots without a supplied value take their default. A slot whose mode
//!    requires an initial value and has no default is `Missing`.
//! 4. Leftover names go to the remainderer, or fail as `Unrecognized`.
//! 5. Commit all staged values at once.
//!
//! ## Reentrancy
//!
//! All methods take `&self`. Validators run with a [`Context`] whose peers
//! view is the manager itself, and no internal borrow is held while a
//! validator, remainderer, or fallback runs.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use propkit_core::{apply, ClassId, Context, Phase, PropertyLookup, Value};
use propkit_schema::Meta;

use crate::config::ManagerOptions;
use crate::error::{Denial, PropertyError};
use crate::mode::{LoadState, Mode};
use crate::property::{Property, PropertyDef};
use crate::readonly::ReadonlyManager;

/// Property values keyed by name.
pub type Values = BTreeMap<String, Value>;

/// Receives the supplied values that matched no property.
///
/// It may claim them (typically by initializing another layer) or reject
/// them with an error, which fails the whole initialization.
pub type Remainderer<'a> = Box<dyn FnOnce(Values) -> Result<(), PropertyError> + 'a>;

/// The properties of one host instance.
pub struct PropertyManager {
    class: ClassId,
    properties: RefCell<BTreeMap<String, Property>>,
    base_mode: Cell<Mode>,
    initialized: Cell<bool>,
    options: ManagerOptions,
    fallback: Option<Weak<dyn PropertyLookup>>,
    readonly: Rc<ReadonlyManager>,
}

impl PropertyManager {
    // ── Construction ─────────────────────────────────────────────────

    /// A manager for `class` with one slot per definition.
    ///
    /// A later definition with the same name replaces an earlier one.
    pub fn new(class: impl Into<ClassId>, defs: impl IntoIterator<Item = PropertyDef>) -> Self {
        let properties = defs
            .into_iter()
            .map(|def| (def.name().to_string(), Property::new(def)))
            .collect();
        Self {
            class: class.into(),
            properties: RefCell::new(properties),
            base_mode: Cell::new(Mode::ReadWrite),
            initialized: Cell::new(false),
            options: ManagerOptions::default(),
            fallback: None,
            readonly: Rc::new(ReadonlyManager::new()),
        }
    }

    /// A manager with one slot per entry of `meta`.
    pub fn from_meta(meta: &Meta) -> Self {
        Self::new(
            meta.class().clone(),
            meta.entries().map(|entry| PropertyDef::new(Arc::clone(entry))),
        )
    }

    /// Use `options` for validator strictness.
    pub fn with_options(mut self, options: ManagerOptions) -> Self {
        self.options = options;
        self
    }

    /// Consult `fallback` for names this manager does not declare.
    ///
    /// The manager never keeps the fallback alive; once it is dropped the
    /// manager behaves as if none was configured.
    pub fn with_fallback(mut self, fallback: Weak<dyn PropertyLookup>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Share `readonly` with the host and its other managers.
    pub fn with_readonly(mut self, readonly: Rc<ReadonlyManager>) -> Self {
        self.readonly = readonly;
        self
    }

    // ── Initialization ───────────────────────────────────────────────

    /// Load the initial values. Runs successfully at most once.
    ///
    /// # Errors
    ///
    /// - [`PropertyError::AlreadyInitialized`] on a second call.
    /// - [`PropertyError::NotAllowed`] if a `StrictRead` value is supplied.
    /// - [`PropertyError::Invalid`] if a supplied value fails validation.
    /// - [`PropertyError::Missing`] if a required value is absent.
    /// - [`PropertyError::Unrecognized`] for leftovers without a remainderer,
    ///   or whatever error the remainderer returns.
    ///
    /// On error nothing is committed and the manager stays uninitialized.
    pub fn initialize(
        &self,
        supplied: Values,
        mode: Mode,
        remainderer: Option<Remainderer<'_>>,
    ) -> Result<(), PropertyError> {
        self.run_initialize(supplied, mode, remainderer, &BTreeSet::new())
    }

    pub(crate) fn run_initialize(
        &self,
        mut supplied: Values,
        mode: Mode,
        remainderer: Option<Remainderer<'_>>,
        required: &BTreeSet<String>,
    ) -> Result<(), PropertyError> {
        self.ensure_uninitialized()?;

        let plan: Vec<_> = self
            .properties
            .borrow()
            .values()
            .map(|p| {
                let effective = if p.is_pinned() { p.mode() } else { mode };
                (
                    p.name().to_string(),
                    effective,
                    Arc::clone(p.validator()),
                    p.default().cloned(),
                )
            })
            .collect();

        let mut staged: BTreeMap<String, (Value, LoadState)> = BTreeMap::new();
        for (name, effective, validator, default) in plan {
            if let Some(mut value) = supplied.remove(&name) {
                if !effective.accepts_initial_value() {
                    return Err(PropertyError::NotAllowed {
                        name,
                        reason: Denial::SupplyForbidden(effective),
                    });
                }
                let ctx = Context::new(&name, Phase::Initialization).with_class(&self.class);
                apply(
                    &*validator,
                    &mut value,
                    &ctx,
                    self.options.strict_initialization,
                )
                .map_err(|source| PropertyError::Invalid {
                    name: name.clone(),
                    source,
                })?;
                staged.insert(name, (value, LoadState::Set));
            } else if let Some(default) = default {
                staged.insert(name, (default, LoadState::Defaulted));
            } else if effective.requires_initial_value() || required.contains(&name) {
                return Err(PropertyError::Missing {
                    class: self.class.clone(),
                    name,
                });
            }
        }

        match remainderer {
            Some(remainderer) => remainderer(supplied)?,
            None if !supplied.is_empty() => {
                let names: Vec<String> = supplied.into_keys().collect();
                tracing::warn!(class = %self.class, names = ?names, "unrecognized properties");
                return Err(PropertyError::Unrecognized {
                    class: self.class.clone(),
                    names,
                });
            }
            None => {}
        }

        // The remainderer may have reached back into this manager.
        self.ensure_uninitialized()?;

        let mut properties = self.properties.borrow_mut();
        for property in properties.values_mut() {
            property.resolve_mode(mode);
            match staged.remove(property.name()) {
                Some((value, state)) => property.load(value, state),
                None => property.load(Value::Null, LoadState::Unset),
            }
        }
        self.base_mode.set(mode);
        self.initialized.set(true);
        tracing::debug!(
            class = %self.class,
            mode = %mode,
            properties = properties.len(),
            "initialized properties"
        );
        Ok(())
    }

    // ── Access ───────────────────────────────────────────────────────

    /// Whether `name` is a property of this instance. `false` before
    /// initialization.
    pub fn has(&self, name: &str) -> bool {
        self.initialized.get() && self.contains_slot(name)
    }

    /// The current value of `name`, or of the fallback's `name` when this
    /// manager does not declare it.
    ///
    /// # Errors
    ///
    /// - [`PropertyError::NotInitialized`] before initialization.
    /// - [`PropertyError::NotAllowed`] for a `Write` property.
    /// - [`PropertyError::Undefined`] if neither this manager nor a live
    ///   fallback knows `name`.
    pub fn get(&self, name: &str) -> Result<Value, PropertyError> {
        self.ensure_initialized()?;
        if let Some(property) = self.properties.borrow().get(name) {
            property.check_readable()?;
            return Ok(property.value().clone());
        }
        self.fallback
            .as_ref()
            .and_then(Weak::upgrade)
            .and_then(|fallback| fallback.lookup(name))
            .ok_or_else(|| self.undefined(name))
    }

    /// Validate `value` and store it in `name`.
    ///
    /// The readonly switch and the mode are checked before the validator
    /// runs. A failed validation leaves the previous value in place.
    pub fn set(&self, name: &str, value: Value) -> Result<&Self, PropertyError> {
        self.assign(name, value, self)?;
        Ok(self)
    }

    pub(crate) fn assign(
        &self,
        name: &str,
        mut value: Value,
        peers: &dyn PropertyLookup,
    ) -> Result<(), PropertyError> {
        self.ensure_initialized()?;
        self.readonly.guard_call(name)?;
        let validator = {
            let properties = self.properties.borrow();
            let property = properties.get(name).ok_or_else(|| self.undefined(name))?;
            property.check_writable()?;
            Arc::clone(property.validator())
        };

        let ctx = Context::new(name, Phase::Assignment)
            .with_class(&self.class)
            .with_peers(peers);
        apply(&*validator, &mut value, &ctx, self.options.strict_assignment).map_err(
            |source| PropertyError::Invalid {
                name: name.to_string(),
                source,
            },
        )?;

        let mut properties = self.properties.borrow_mut();
        let property = properties.get_mut(name).ok_or_else(|| self.undefined(name))?;
        // The validator may have written this property through a peer.
        property.check_writable()?;
        tracing::trace!(class = %self.class, property = name, "assigned property");
        property.store(value);
        Ok(())
    }

    /// Reset `name` to its default, or to unset when it has none.
    ///
    /// Guarded exactly like [`PropertyManager::set`].
    pub fn unset(&self, name: &str) -> Result<&Self, PropertyError> {
        self.ensure_initialized()?;
        self.readonly.guard_call(name)?;
        let mut properties = self.properties.borrow_mut();
        let property = properties.get_mut(name).ok_or_else(|| self.undefined(name))?;
        property.check_writable()?;
        property.clear();
        tracing::trace!(class = %self.class, property = name, "unset property");
        Ok(self)
    }

    /// Whether `name` holds a non-null value. Unknown names and an
    /// uninitialized manager answer `false`.
    pub fn isset(&self, name: &str) -> bool {
        self.initialized.get()
            && self
                .properties
                .borrow()
                .get(name)
                .is_some_and(Property::is_set)
    }

    /// Every externally readable property and its value.
    pub fn get_all(&self) -> Result<Values, PropertyError> {
        self.ensure_initialized()?;
        Ok(self
            .properties
            .borrow()
            .values()
            .filter(|p| p.mode().is_readable())
            .map(|p| (p.name().to_string(), p.value().clone()))
            .collect())
    }

    /// Narrow the mode of `name` to the greatest mode below both its
    /// current mode and `mode`. A mode is never widened.
    ///
    /// # Errors
    ///
    /// [`PropertyError::NotAllowed`] when readonly, or when the two modes
    /// have no common restriction.
    pub fn restrict(&self, name: &str, mode: Mode) -> Result<&Self, PropertyError> {
        self.ensure_initialized()?;
        self.readonly.guard_call(name)?;
        let mut properties = self.properties.borrow_mut();
        let property = properties.get_mut(name).ok_or_else(|| self.undefined(name))?;
        let current = property.mode();
        let narrowed = current
            .meet(mode)
            .ok_or_else(|| property.denied(Denial::NoCommonRestriction(current, mode)))?;
        property.set_mode(narrowed);
        tracing::debug!(
            class = %self.class,
            property = name,
            from = %current,
            to = %narrowed,
            "restricted property"
        );
        Ok(self)
    }

    // ── Readonly ─────────────────────────────────────────────────────

    /// Whether the shared readonly switch is enabled.
    pub fn is_readonly(&self) -> bool {
        self.readonly.is_enabled()
    }

    /// Enable the shared readonly switch. Idempotent.
    pub fn set_as_readonly(&self) {
        self.readonly.enable();
    }

    /// The shared readonly switch.
    pub fn readonly(&self) -> &Rc<ReadonlyManager> {
        &self.readonly
    }

    // ── Introspection ────────────────────────────────────────────────

    /// The effective mode of `name`.
    pub fn mode_of(&self, name: &str) -> Result<Mode, PropertyError> {
        self.ensure_initialized()?;
        self.properties
            .borrow()
            .get(name)
            .map(Property::mode)
            .ok_or_else(|| self.undefined(name))
    }

    /// Where the value of `name` came from.
    pub fn load_state(&self, name: &str) -> Result<LoadState, PropertyError> {
        self.ensure_initialized()?;
        self.properties
            .borrow()
            .get(name)
            .map(Property::load_state)
            .ok_or_else(|| self.undefined(name))
    }

    /// Declared property names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.properties.borrow().keys().cloned().collect()
    }

    /// Whether `initialize` has completed.
    pub fn is_initialized(&self) -> bool {
        self.initialized.get()
    }

    /// The owning class.
    pub fn class(&self) -> &ClassId {
        &self.class
    }

    /// The options in effect.
    pub fn options(&self) -> ManagerOptions {
        self.options
    }

    // ── Crate internals ──────────────────────────────────────────────

    pub(crate) fn contains_slot(&self, name: &str) -> bool {
        self.properties.borrow().contains_key(name)
    }

    pub(crate) fn slot_count(&self) -> usize {
        self.properties.borrow().len()
    }

    /// Add a slot built after construction. After initialization the slot
    /// takes the base mode and its default immediately.
    pub(crate) fn adopt(&self, def: PropertyDef) {
        let mut property = Property::new(def);
        if self.initialized.get() {
            property.resolve_mode(self.base_mode.get());
            property.apply_default();
        }
        self.properties
            .borrow_mut()
            .entry(property.name().to_string())
            .or_insert(property);
    }

    pub(crate) fn ensure_initialized(&self) -> Result<(), PropertyError> {
        if self.initialized.get() {
            Ok(())
        } else {
            Err(PropertyError::NotInitialized {
                class: self.class.clone(),
            })
        }
    }

    pub(crate) fn ensure_uninitialized(&self) -> Result<(), PropertyError> {
        if self.initialized.get() {
            Err(PropertyError::AlreadyInitialized {
                class: self.class.clone(),
            })
        } else {
            Ok(())
        }
    }

    pub(crate) fn undefined(&self, name: &str) -> PropertyError {
        PropertyError::Undefined {
            class: self.class.clone(),
            name: name.to_string(),
        }
    }
}

impl PropertyLookup for PropertyManager {
    fn contains(&self, name: &str) -> bool {
        self.contains_slot(name)
    }

    fn lookup(&self, name: &str) -> Option<Value> {
        self.get(name).ok()
    }
}

impl fmt::Debug for PropertyManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyManager")
            .field("class", &self.class)
            .field("properties", &self.properties.borrow().values())
            .field("base_mode", &self.base_mode.get())
            .field("initialized", &self.initialized.get())
            .field("options", &self.options)
            .field("readonly", &self.readonly.is_enabled())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use propkit_core::{Evaluator, IntegerProcessor, StringProcessor, ValidationUnit};
    use serde_json::json;

    fn values(pairs: &[(&str, Value)]) -> Values {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn article_meta() -> Meta {
        let mut meta = Meta::new("Article");
        meta.set("id", Arc::new(IntegerProcessor), None).unwrap();
        meta.set("title", Arc::new(StringProcessor), Some(json!("untitled")))
            .unwrap();
        meta.set("views", Arc::new(IntegerProcessor), Some(json!(0)))
            .unwrap();
        meta
    }

    fn article() -> PropertyManager {
        PropertyManager::from_meta(&article_meta())
    }

    fn ready(mode: Mode) -> PropertyManager {
        let manager = article();
        manager
            .initialize(values(&[("id", json!(7))]), mode, None)
            .unwrap();
        manager
    }

    // ── Initialization ───────────────────────────────────────────────

    #[test]
    fn test_initialize_loads_supplied_and_defaults() {
        let manager = ready(Mode::ReadWrite);
        assert!(manager.is_initialized());
        assert_eq!(manager.get("id").unwrap(), json!(7));
        assert_eq!(manager.get("title").unwrap(), json!("untitled"));
        assert_eq!(manager.load_state("id").unwrap(), LoadState::Set);
        assert_eq!(manager.load_state("title").unwrap(), LoadState::Defaulted);
        assert_eq!(manager.mode_of("views").unwrap(), Mode::ReadWrite);
    }

    #[test]
    fn test_initialize_coerces_leniently_by_default() {
        let manager = article();
        manager
            .initialize(values(&[("id", json!("12"))]), Mode::ReadWrite, None)
            .unwrap();
        assert_eq!(manager.get("id").unwrap(), json!(12));
    }

    #[test]
    fn test_strict_initialization_rejects_coercible_input() {
        let manager = article().with_options(ManagerOptions {
            strict_initialization: true,
            strict_assignment: false,
        });
        let err = manager
            .initialize(values(&[("id", json!("12"))]), Mode::ReadWrite, None)
            .unwrap_err();
        assert!(matches!(err, PropertyError::Invalid { ref name, .. } if name == "id"));
        assert!(!manager.is_initialized());
    }

    #[test]
    fn test_initialize_twice_fails() {
        let manager = ready(Mode::ReadWrite);
        let err = manager
            .initialize(Values::new(), Mode::ReadWrite, None)
            .unwrap_err();
        assert!(matches!(err, PropertyError::AlreadyInitialized { .. }));
        assert!(err.is_programmer_error());
    }

    #[test]
    fn test_missing_required_value() {
        let manager = article();
        let err = manager
            .initialize(Values::new(), Mode::WriteOnce, None)
            .unwrap_err();
        assert_eq!(
            err,
            PropertyError::Missing {
                class: ClassId::new("Article"),
                name: "id".into()
            }
        );
        assert!(!manager.is_initialized());
    }

    #[test]
    fn test_read_mode_does_not_require_values() {
        let manager = article();
        manager.initialize(Values::new(), Mode::Read, None).unwrap();
        assert_eq!(manager.get("id").unwrap(), Value::Null);
        assert_eq!(manager.load_state("id").unwrap(), LoadState::Unset);
        assert!(!manager.isset("id"));
    }

    #[test]
    fn test_strict_read_refuses_supplied_value() {
        let manager = article();
        let err = manager
            .initialize(values(&[("id", json!(1))]), Mode::StrictRead, None)
            .unwrap_err();
        assert_eq!(
            err.denial(),
            Some(Denial::SupplyForbidden(Mode::StrictRead))
        );
    }

    #[test]
    fn test_unrecognized_without_remainderer() {
        let manager = article();
        let err = manager
            .initialize(
                values(&[("id", json!(1)), ("zz", json!(1)), ("aa", json!(2))]),
                Mode::ReadWrite,
                None,
            )
            .unwrap_err();
        assert_eq!(
            err,
            PropertyError::Unrecognized {
                class: ClassId::new("Article"),
                names: vec!["aa".into(), "zz".into()]
            }
        );
        assert!(!manager.is_initialized());
    }

    #[test]
    fn test_remainderer_claims_leftovers() {
        let manager = article();
        let mut claimed = Values::new();
        manager
            .initialize(
                values(&[("id", json!(1)), ("extra", json!("x"))]),
                Mode::ReadWrite,
                Some(Box::new(|rest| {
                    claimed = rest;
                    Ok(())
                })),
            )
            .unwrap();
        assert_eq!(claimed, values(&[("extra", json!("x"))]));
        assert!(!manager.has("extra"));
    }

    #[test]
    fn test_remainderer_error_aborts_initialization() {
        let manager = article();
        let err = manager
            .initialize(
                values(&[("id", json!(1)), ("extra", json!("x"))]),
                Mode::ReadWrite,
                Some(Box::new(|rest| {
                    Err(PropertyError::Unrecognized {
                        class: ClassId::new("Layer"),
                        names: rest.into_keys().collect(),
                    })
                })),
            )
            .unwrap_err();
        assert!(matches!(err, PropertyError::Unrecognized { .. }));
        assert!(!manager.is_initialized());
    }

    #[test]
    fn test_failed_initialization_can_be_retried() {
        let manager = article();
        assert!(manager
            .initialize(values(&[("id", json!("nope"))]), Mode::ReadWrite, None)
            .is_err());
        manager
            .initialize(values(&[("id", json!(3))]), Mode::ReadWrite, None)
            .unwrap();
        assert_eq!(manager.get("id").unwrap(), json!(3));
    }

    #[test]
    fn test_pinned_mode_survives_base_mode() {
        let manager = PropertyManager::new(
            "Account",
            [
                PropertyDef::ad_hoc("id", Arc::new(IntegerProcessor), Some(json!(1)))
                    .unwrap()
                    .with_mode(Mode::StrictRead),
                PropertyDef::ad_hoc("name", Arc::new(StringProcessor), Some(json!("a")))
                    .unwrap(),
            ],
        );
        manager.initialize(Values::new(), Mode::ReadWrite, None).unwrap();
        assert_eq!(manager.mode_of("id").unwrap(), Mode::StrictRead);
        assert_eq!(manager.mode_of("name").unwrap(), Mode::ReadWrite);
    }

    // ── Guards before initialization ─────────────────────────────────

    #[test]
    fn test_operations_fail_closed_before_initialize() {
        let manager = article();
        let not_init = |err: PropertyError| matches!(err, PropertyError::NotInitialized { .. });
        assert!(not_init(manager.get("id").unwrap_err()));
        assert!(not_init(manager.set("id", json!(1)).unwrap_err()));
        assert!(not_init(manager.unset("id").unwrap_err()));
        assert!(not_init(manager.get_all().unwrap_err()));
        assert!(not_init(manager.restrict("id", Mode::Read).unwrap_err()));
        assert!(!manager.has("id"));
        assert!(!manager.isset("id"));
        assert_eq!(manager.names(), vec!["id", "title", "views"]);
    }

    // ── Assignment ───────────────────────────────────────────────────

    #[test]
    fn test_set_validates_and_stores() {
        let manager = ready(Mode::ReadWrite);
        manager.set("views", json!("41")).unwrap().set("title", json!("Hi")).unwrap();
        assert_eq!(manager.get("views").unwrap(), json!(41));
        assert_eq!(manager.get("title").unwrap(), json!("Hi"));
        assert_eq!(manager.load_state("views").unwrap(), LoadState::Set);
    }

    #[test]
    fn test_failed_set_keeps_previous_value() {
        let manager = ready(Mode::ReadWrite);
        let err = manager.set("views", json!("many")).unwrap_err();
        let source = err.validation_error().unwrap();
        assert_eq!(source.property.as_deref(), Some("views"));
        assert_eq!(manager.get("views").unwrap(), json!(0));
        assert_eq!(manager.load_state("views").unwrap(), LoadState::Defaulted);
    }

    #[test]
    fn test_strict_assignment() {
        let manager = article().with_options(ManagerOptions {
            strict_initialization: false,
            strict_assignment: true,
        });
        manager
            .initialize(values(&[("id", json!("5"))]), Mode::ReadWrite, None)
            .unwrap();
        assert!(manager.set("views", json!("3")).is_err());
        assert!(manager.set("views", json!(3)).is_ok());
    }

    #[test]
    fn test_set_undefined() {
        let manager = ready(Mode::ReadWrite);
        let err = manager.set("body", json!("x")).unwrap_err();
        assert!(matches!(err, PropertyError::Undefined { ref name, .. } if name == "body"));
    }

    #[test]
    fn test_read_mode_rejects_set_before_validating() {
        let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let counting = Evaluator::from_fn("anything", move |_| {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            true
        });
        let manager = PropertyManager::new(
            "Counter",
            [PropertyDef::ad_hoc("n", Arc::new(counting), None).unwrap()],
        );
        manager.initialize(Values::new(), Mode::Read, None).unwrap();
        let err = manager.set("n", json!(1)).unwrap_err();
        assert_eq!(err.denial(), Some(Denial::WriteForbidden(Mode::Read)));
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[test]
    fn test_write_once() {
        let manager = ready(Mode::WriteOnce);
        // "views" took its default at initialization; that was its one write.
        let err = manager.set("views", json!(5)).unwrap_err();
        assert_eq!(err.denial(), Some(Denial::AlreadyWritten));
        assert_eq!(
            manager.unset("views").unwrap_err().denial(),
            Some(Denial::AlreadyWritten)
        );
        assert_eq!(manager.load_state("views").unwrap(), LoadState::Defaulted);
        // "id" was supplied at initialization.
        assert_eq!(
            manager.set("id", json!(8)).unwrap_err().denial(),
            Some(Denial::AlreadyWritten)
        );
        assert!(manager.unset("id").is_err());
        assert_eq!(manager.get("id").unwrap(), json!(7));
    }

    #[test]
    fn test_write_mode_hides_value() {
        let manager = ready(Mode::Write);
        manager.set("title", json!("secret")).unwrap();
        let err = manager.get("title").unwrap_err();
        assert_eq!(err.denial(), Some(Denial::ReadForbidden(Mode::Write)));
        assert!(manager.get_all().unwrap().is_empty());
        assert!(manager.isset("title"));
    }

    // ── Unset / isset / get_all ──────────────────────────────────────

    #[test]
    fn test_adopt_keeps_existing_slot() {
        let manager = ready(Mode::ReadWrite);
        manager.set("title", json!("kept")).unwrap();
        let def =
            PropertyDef::ad_hoc("title", Arc::new(StringProcessor), Some(json!("fresh"))).unwrap();
        manager.adopt(def);
        assert_eq!(manager.get("title").unwrap(), json!("kept"));
        assert_eq!(manager.load_state("title").unwrap(), LoadState::Set);
    }

    #[test]
    fn test_unset_restores_default_or_clears() {
        let manager = ready(Mode::ReadWrite);
        manager.set("views", json!(9)).unwrap();
        manager.unset("views").unwrap();
        assert_eq!(manager.get("views").unwrap(), json!(0));
        assert_eq!(manager.load_state("views").unwrap(), LoadState::Defaulted);

        manager.unset("id").unwrap();
        assert_eq!(manager.get("id").unwrap(), Value::Null);
        assert!(!manager.isset("id"));
        assert_eq!(manager.load_state("id").unwrap(), LoadState::Unset);
    }

    #[test]
    fn test_isset_on_null_and_unknown() {
        let manager = ready(Mode::ReadWrite);
        assert!(manager.isset("id"));
        assert!(!manager.isset("body"));
    }

    #[test]
    fn test_get_all_lists_readable() {
        let manager = ready(Mode::ReadWrite);
        assert_eq!(
            manager.get_all().unwrap(),
            values(&[
                ("id", json!(7)),
                ("title", json!("untitled")),
                ("views", json!(0))
            ])
        );
    }

    // ── Restriction ──────────────────────────────────────────────────

    #[test]
    fn test_restrict_narrows_only() {
        let manager = ready(Mode::ReadWrite);
        manager.restrict("title", Mode::Read).unwrap();
        assert_eq!(manager.mode_of("title").unwrap(), Mode::Read);
        assert!(manager.set("title", json!("x")).is_err());

        // Asking for a wider mode keeps the narrow one.
        manager.restrict("title", Mode::ReadWrite).unwrap();
        assert_eq!(manager.mode_of("title").unwrap(), Mode::Read);
    }

    #[test]
    fn test_restrict_without_common_mode() {
        let manager = ready(Mode::Write);
        let err = manager.restrict("title", Mode::Read).unwrap_err();
        assert_eq!(
            err.denial(),
            Some(Denial::NoCommonRestriction(Mode::Write, Mode::Read))
        );
        assert_eq!(manager.mode_of("title").unwrap(), Mode::Write);
    }

    // ── Readonly ─────────────────────────────────────────────────────

    #[test]
    fn test_readonly_blocks_mutation() {
        let manager = ready(Mode::ReadWrite);
        manager.set_as_readonly();
        assert!(manager.is_readonly());
        for err in [
            manager.set("views", json!(1)).unwrap_err(),
            manager.unset("views").unwrap_err(),
            manager.restrict("views", Mode::Read).unwrap_err(),
        ] {
            assert_eq!(err.denial(), Some(Denial::Readonly));
        }
        assert_eq!(manager.get("views").unwrap(), json!(0));
        manager.set_as_readonly();
    }

    #[test]
    fn test_shared_readonly_switch() {
        let switch = Rc::new(ReadonlyManager::new());
        let a = article().with_readonly(Rc::clone(&switch));
        let b = article().with_readonly(Rc::clone(&switch));
        a.initialize(values(&[("id", json!(1))]), Mode::ReadWrite, None).unwrap();
        b.initialize(values(&[("id", json!(2))]), Mode::ReadWrite, None).unwrap();
        a.set_as_readonly();
        assert!(b.is_readonly());
        assert!(b.set("views", json!(1)).is_err());
    }

    // ── Fallback ─────────────────────────────────────────────────────

    #[test]
    fn test_fallback_lookup_and_expiry() {
        let parent = Rc::new(ready(Mode::ReadWrite));
        let child_meta = {
            let mut meta = Meta::new("Comment");
            meta.set("body", Arc::new(StringProcessor), Some(json!(""))).unwrap();
            meta
        };
        let weak: Weak<dyn PropertyLookup> = {
            let as_lookup: Rc<dyn PropertyLookup> = parent.clone();
            Rc::downgrade(&as_lookup)
        };
        let child = PropertyManager::from_meta(&child_meta).with_fallback(weak);
        child.initialize(Values::new(), Mode::ReadWrite, None).unwrap();

        assert_eq!(child.get("id").unwrap(), json!(7));
        assert!(!child.has("id"));
        assert!(matches!(
            child.get("nothing").unwrap_err(),
            PropertyError::Undefined { .. }
        ));

        drop(parent);
        assert!(matches!(
            child.get("id").unwrap_err(),
            PropertyError::Undefined { .. }
        ));
    }

    // ── Reentrancy ───────────────────────────────────────────────────

    struct AtMost {
        limit: &'static str,
    }

    impl ValidationUnit for AtMost {
        fn process(
            &self,
            value: &mut Value,
            ctx: &Context<'_>,
            _strict: bool,
        ) -> Result<(), propkit_core::ValidationError> {
            let limit = ctx.peer(self.limit).and_then(|v| v.as_i64());
            match (value.as_i64(), limit) {
                (Some(v), Some(max)) if v <= max => Ok(()),
                (Some(_), None) => Ok(()),
                _ => Err(propkit_core::ValidationError::new(
                    format!("integer at most {}", self.limit),
                    value.clone(),
                )),
            }
        }
    }

    #[test]
    fn test_validator_reads_sibling_during_set() {
        let manager = PropertyManager::new(
            "Range",
            [
                PropertyDef::ad_hoc("max", Arc::new(IntegerProcessor), Some(json!(10))).unwrap(),
                PropertyDef::ad_hoc("value", Arc::new(AtMost { limit: "max" }), Some(json!(0)))
                    .unwrap(),
            ],
        );
        manager.initialize(Values::new(), Mode::ReadWrite, None).unwrap();
        manager.set("value", json!(10)).unwrap();
        assert!(manager.set("value", json!(11)).is_err());
        manager.set("max", json!(20)).unwrap();
        manager.set("value", json!(11)).unwrap();
        assert_eq!(manager.get("value").unwrap(), json!(11));
    }
}
