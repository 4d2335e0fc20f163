//! # propkit-state — Property Managers
//!
//! Per-instance state for host objects: the live property slots, the
//! managers that own them, and the readonly switch a host shares with its
//! managers.
//!
//! ## Components
//!
//! - **Modes** (`mode.rs`): [`Mode`] decides who may read a property and
//!   when it may be written; [`LoadState`] records where a value came from.
//!
//! - **Properties** (`property.rs`): [`PropertyDef`] binds a schema entry to
//!   an optional pinned mode; [`Property`] is the live slot.
//!
//! - **Eager manager** (`manager.rs`): [`PropertyManager`] creates every
//!   slot up front and runs the one-time, all-or-nothing initialization.
//!
//! - **Lazy manager** (`lazy.rs`): [`LazyPropertyManager`] builds slots on
//!   first access through a [`Builder`] and enforces required names before
//!   anything is built.
//!
//! - **Readonly switch** (`readonly.rs`): [`ReadonlyManager`] is one-way and
//!   shared via `Rc`.
//!
//! - **Options** (`config.rs`): [`ManagerOptions`] selects strict or lenient
//!   coercion per phase, loadable from YAML or JSON.
//!
//! ## Threading
//!
//! Managers are single-threaded (`Cell`/`RefCell`, `!Sync`) and take `&self`
//! everywhere, so validators can read sibling properties while a write is
//! in flight. Share them with `Rc`, and point fallbacks at them with `Weak`.

pub mod config;
pub mod error;
pub mod lazy;
pub mod manager;
pub mod mode;
pub mod property;
pub mod readonly;

pub use config::{ConfigError, ManagerOptions};
pub use error::{Denial, PropertyError};
pub use lazy::{Builder, LazyPropertyManager};
pub use manager::{PropertyManager, Remainderer, Values};
pub use mode::{LoadState, Mode};
pub use property::{Property, PropertyDef};
pub use readonly::ReadonlyManager;
