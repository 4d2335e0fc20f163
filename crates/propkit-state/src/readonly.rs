//! # Readonly Switch
//!
//! A [`ReadonlyManager`] is a one-way flag owned by a host object and shared
//! (via `Rc`) with its property managers. Once enabled it rejects every
//! mutation routed through [`ReadonlyManager::guard_call`]; there is no way
//! to disable it again.
//!
//! ```text
//! Writable ──enable()──▶ Readonly   (callbacks fire here, once)
//!                           │
//!                        enable()   no-op
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;

use crate::error::{Denial, PropertyError};

type Callback = Box<dyn FnOnce()>;

/// One-way readonly switch.
#[derive(Default)]
pub struct ReadonlyManager {
    enabled: Cell<bool>,
    callbacks: RefCell<Vec<Callback>>,
}

impl ReadonlyManager {
    /// A disabled switch with no callbacks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the switch is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    /// Enable the switch.
    ///
    /// On the first call, runs every registered callback once, in
    /// registration order, and returns `true`. Later calls do nothing and
    /// return `false`.
    pub fn enable(&self) -> bool {
        if self.enabled.replace(true) {
            return false;
        }
        // Callbacks may inspect the switch or register more callbacks, so
        // no borrow is held while they run.
        let callbacks = std::mem::take(&mut *self.callbacks.borrow_mut());
        tracing::info!(callbacks = callbacks.len(), "readonly enabled");
        for callback in callbacks {
            callback();
        }
        true
    }

    /// Register a callback for the enable transition.
    ///
    /// If the switch is already enabled the callback runs immediately.
    pub fn on_enable(&self, callback: impl FnOnce() + 'static) {
        if self.is_enabled() {
            callback();
        } else {
            self.callbacks.borrow_mut().push(Box::new(callback));
        }
    }

    /// Fail with `NotAllowed` if the switch is enabled.
    ///
    /// `target` names the property or operation being attempted.
    pub fn guard_call(&self, target: &str) -> Result<(), PropertyError> {
        if self.is_enabled() {
            return Err(PropertyError::NotAllowed {
                name: target.to_string(),
                reason: Denial::Readonly,
            });
        }
        Ok(())
    }
}

impl fmt::Debug for ReadonlyManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadonlyManager")
            .field("enabled", &self.enabled.get())
            .field("pending_callbacks", &self.callbacks.borrow().len())
            .finish()
    }
}
