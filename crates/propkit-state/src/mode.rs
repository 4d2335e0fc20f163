//! # Access Modes and Load States
//!
//! A [`Mode`] says who may read a property and when it may be written.
//! A [`LoadState`] records where the current value came from.
//!
//! ## Capabilities
//!
//! | Mode | External read | Supplied at init | Written after init |
//! |------|---------------|------------------|--------------------|
//! | `StrictRead` | yes | no | never |
//! | `Read` | yes | yes | never |
//! | `WriteOnce` | yes | yes | never (its one write is at init) |
//! | `ReadWrite` | yes | yes | always |
//! | `Write` | no | yes | always |
//!
//! ## Restriction Order
//!
//! Mode `a` is a restriction of `b` when every capability of `a` is also a
//! capability of `b`:
//!
//! ```text
//!            ReadWrite
//!            /       \
//!       WriteOnce    Write
//!           |
//!         Read
//!           |
//!       StrictRead
//! ```
//!
//! [`Mode::meet`] returns the greatest common restriction of two modes, or
//! `None` when they share no mode below both (`Write` against any of the
//! read-only modes).

use serde::{Deserialize, Serialize};

/// Read/write permission class of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Readable; never written from outside, not even at initialization.
    StrictRead,
    /// Readable; may be supplied at initialization only.
    Read,
    /// Readable and writable without restriction.
    ReadWrite,
    /// Writable but not externally readable.
    Write,
    /// Readable; written exactly once, by initialization.
    WriteOnce,
}

/// When a mode allows writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Writes {
    Never,
    AtInit,
    Always,
}

impl Mode {
    /// All modes, most restrictive first.
    pub const ALL: [Mode; 5] = [
        Mode::StrictRead,
        Mode::Read,
        Mode::WriteOnce,
        Mode::Write,
        Mode::ReadWrite,
    ];

    /// Whether the value may be read from outside the host.
    pub fn is_readable(&self) -> bool {
        !matches!(self, Self::Write)
    }

    /// Whether a value may be supplied through `initialize`.
    pub fn accepts_initial_value(&self) -> bool {
        !matches!(self, Self::StrictRead)
    }

    /// Whether initialization must produce a value when there is no default.
    pub fn requires_initial_value(&self) -> bool {
        matches!(self, Self::WriteOnce | Self::ReadWrite)
    }

    /// Whether a post-initialization `set` or `unset` is allowed.
    pub fn allows_write(&self) -> bool {
        self.writes() == Writes::Always
    }

    /// Whether every capability of `self` is also a capability of `other`.
    pub fn is_restriction_of(&self, other: Mode) -> bool {
        (!self.is_readable() || other.is_readable())
            && (!self.accepts_initial_value() || other.accepts_initial_value())
            && self.writes() <= other.writes()
    }

    /// The greatest mode that restricts both `self` and `other`.
    pub fn meet(self, other: Mode) -> Option<Mode> {
        // ALL is ordered so that the first lower bound found scanning from
        // the permissive end is the greatest one.
        Self::ALL
            .iter()
            .rev()
            .copied()
            .find(|m| m.is_restriction_of(self) && m.is_restriction_of(other))
    }

    fn writes(&self) -> Writes {
        match self {
            Self::StrictRead | Self::Read => Writes::Never,
            Self::WriteOnce => Writes::AtInit,
            Self::ReadWrite | Self::Write => Writes::Always,
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::StrictRead => "strict-read",
            Self::Read => "read",
            Self::ReadWrite => "read-write",
            Self::Write => "write",
            Self::WriteOnce => "write-once",
        };
        f.write_str(s)
    }
}

/// Where a property's current value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    /// No value.
    Unset,
    /// The schema default.
    Defaulted,
    /// An explicitly supplied or assigned value.
    Set,
}

impl LoadState {
    /// Whether the property holds a value at all.
    pub fn is_loaded(&self) -> bool {
        !matches!(self, Self::Unset)
    }
}

impl std::fmt::Display for LoadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unset => "UNSET",
            Self::Defaulted => "DEFAULTED",
            Self::Set => "SET",
        };
        f.write_str(s)
    }
}
