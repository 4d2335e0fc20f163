//! # Schema Entries
//!
//! An [`Entry`] is the immutable `(validator, default)` pair registered
//! under a property name. It can only be obtained through a constructor
//! that has already validated the default, so every `Entry` in existence
//! holds a default its own validator accepts.

use std::fmt;

use propkit_core::{apply, ClassId, Context, Phase, SharedUnit, ValidationError, Value};

/// An immutable property definition.
#[derive(Clone)]
pub struct Entry {
    name: String,
    validator: SharedUnit,
    default: Option<Value>,
}

impl Entry {
    /// Build an entry outside any schema.
    ///
    /// The default, if given, is validated with `strict = false` and stored
    /// in its normalized form.
    pub fn new(
        name: impl Into<String>,
        validator: SharedUnit,
        default: Option<Value>,
    ) -> Result<Self, ValidationError> {
        Self::define(None, name.into(), validator, default)
    }

    pub(crate) fn define(
        class: Option<&ClassId>,
        name: String,
        validator: SharedUnit,
        default: Option<Value>,
    ) -> Result<Self, ValidationError> {
        let default = match default {
            Some(mut value) => {
                let mut ctx = Context::new(&name, Phase::Definition);
                if let Some(class) = class {
                    ctx = ctx.with_class(class);
                }
                apply(&*validator, &mut value, &ctx, false)?;
                Some(value)
            }
            None => None,
        };
        Ok(Self {
            name,
            validator,
            default,
        })
    }

    /// The property name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The validator bound to this property.
    pub fn validator(&self) -> &SharedUnit {
        &self.validator
    }

    /// The normalized default, if one was declared.
    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Whether a default was declared.
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("name", &self.name)
            .field("default", &self.default)
            .finish_non_exhaustive()
    }
}
