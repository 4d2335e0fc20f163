//! # Validation Context
//!
//! Every validator call receives a [`Context`] describing where the value
//! comes from: the owning class, the property name, and the lifecycle
//! [`Phase`]. During assignments the context also carries a read-only view
//! of the sibling properties, so a validator can consult other values on
//! the same instance without holding a handle to it.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identity::ClassId;

/// The lifecycle phase a value is validated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// A schema default is being checked at definition time.
    Definition,
    /// A value supplied to a manager's `initialize`.
    Initialization,
    /// A runtime assignment through a manager's `set`.
    Assignment,
    /// A direct `Meta::process` call.
    Process,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Definition => "definition",
            Self::Initialization => "initialization",
            Self::Assignment => "assignment",
            Self::Process => "process",
        };
        f.write_str(s)
    }
}

/// Read-only access to the properties of another object.
///
/// Implemented by the property managers. Used both as the sibling view a
/// validator sees during assignment and as the fallback a manager consults
/// for names it does not declare.
pub trait PropertyLookup {
    /// Whether `name` is a property of this object.
    fn contains(&self, name: &str) -> bool;

    /// The current value of `name`, if it exists and may be read.
    fn lookup(&self, name: &str) -> Option<Value>;
}

/// Where a value is being validated.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    class: Option<&'a ClassId>,
    property: &'a str,
    phase: Phase,
    peers: Option<&'a dyn PropertyLookup>,
}

impl<'a> Context<'a> {
    /// Context for `property` in `phase`, with no owning class.
    pub fn new(property: &'a str, phase: Phase) -> Self {
        Self {
            class: None,
            property,
            phase,
            peers: None,
        }
    }

    /// Attach the owning class.
    pub fn with_class(mut self, class: &'a ClassId) -> Self {
        self.class = Some(class);
        self
    }

    /// Attach a view of the sibling properties.
    pub fn with_peers(mut self, peers: &'a dyn PropertyLookup) -> Self {
        self.peers = Some(peers);
        self
    }

    /// The owning class, when known.
    pub fn class(&self) -> Option<&'a ClassId> {
        self.class
    }

    /// The property being validated.
    pub fn property(&self) -> &'a str {
        self.property
    }

    /// The lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Sibling properties, available during assignment.
    pub fn peers(&self) -> Option<&'a dyn PropertyLookup> {
        self.peers
    }

    /// Shorthand for reading one sibling value.
    pub fn peer(&self, name: &str) -> Option<Value> {
        self.peers.and_then(|peers| peers.lookup(name))
    }
}

impl fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("class", &self.class)
            .field("property", &self.property)
            .field("phase", &self.phase)
            .field("peers", &self.peers.is_some())
            .finish()
    }
}
