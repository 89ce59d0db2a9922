//! Shared type definitions for the Palimpsest versioning engine.
//!
//! This crate is the single source of truth for the records that flow
//! between the write path, the version stores and the reification core.
//!
//! # Modules
//!
//! - [`ids`] -- Typed identifiers for versions, targets and actors
//! - [`enums`] -- The [`VersionEvent`] kind of a change
//! - [`structs`] -- [`Target`], [`Actor`], [`VersionRecord`], [`NewVersion`]
//! - [`value`] -- Snapshot attribute values

pub mod enums;
pub mod ids;
pub mod structs;
pub mod value;

// Re-export all public types at crate root for convenience.
pub use enums::{UnknownEvent, VersionEvent};
pub use ids::{ActorId, TargetId, VersionId};
pub use structs::{Actor, NewVersion, Target, VersionRecord};
pub use value::{AttributeValue, Attributes};
