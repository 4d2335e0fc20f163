//! # propkit-schema — Property Schemas
//!
//! A schema ([`Meta`]) maps property names to immutable [`Entry`] records,
//! each pairing a validator with a default value. Schemas are built once
//! per class, when the class is defined, and are shared read-only for the
//! rest of the process.
//!
//! ## Invariants
//!
//! - **Define once.** A name is registered at most once per schema;
//!   re-registration is [`MetaError::Defined`]. Entries are never replaced
//!   or removed.
//! - **Defaults validate.** A default must pass its own validator
//!   (`strict = false`) at definition time, and the normalized value is what
//!   gets stored. A bad default is [`MetaError::InvalidDefault`], reported
//!   immediately rather than on first use.
//! - **Inheritance by cloning.** [`Meta::clone_for`] copies a schema to a
//!   derived class. The copies evolve independently afterwards; entries are
//!   shared, defaults are not re-validated.
//!
//! ## Registry
//!
//! [`MetaRegistry`] stores schemas keyed by [`ClassId`](propkit_core::ClassId)
//! so that "the schema of this class" is an explicit lookup.

pub mod entry;
pub mod error;
pub mod meta;
pub mod registry;

pub use entry::Entry;
pub use error::MetaError;
pub use meta::Meta;
pub use registry::MetaRegistry;
