//! # propkit-core — Foundational Types for propkit
//!
//! This crate is the leaf of the propkit workspace. It defines the shared
//! vocabulary every other crate builds on: who owns a schema, in which phase
//! a value is being checked, and the contract a validator must honour.
//! It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Explicit class identities.** Schemas and managers are keyed by a
//!    [`ClassId`], never by runtime introspection of the calling type.
//!
//! 2. **One validation contract.** Boolean evaluators and rich type
//!    processors both implement [`ValidationUnit`]. A rejected evaluator is a
//!    [`ValidationError`] with no detail beyond the offending value.
//!
//! 3. **Values are untouched on failure.** All validation inside the
//!    workspace flows through [`apply`], which validates a copy and commits
//!    only on success.
//!
//! 4. **Dynamic values are `serde_json::Value`.** Null, booleans, integers,
//!    floats, strings, arrays and objects cover every host value shape.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `propkit-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod context;
pub mod error;
pub mod identity;
pub mod types;
pub mod unit;

// Re-export primary types for ergonomic imports.
pub use context::{Context, Phase, PropertyLookup};
pub use error::ValidationError;
pub use identity::ClassId;
pub use types::{
    AnyValue, ArrayProcessor, BooleanProcessor, FloatProcessor, IntegerProcessor, Nullable, OneOf,
    StringProcessor,
};
pub use unit::{apply, Chain, Evaluator, SharedUnit, ValidationUnit};

/// Re-exported so downstream crates name one value type.
pub use serde_json::Value;
