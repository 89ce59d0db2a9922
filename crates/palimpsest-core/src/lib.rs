//! Versioning core for Palimpsest.
//!
//! Every change to a versioned entity is logged as an immutable
//! [`VersionRecord`](palimpsest_types::VersionRecord) holding the entity's
//! state before the change. This crate turns those records back into
//! entities and navigates each entity's history.
//!
//! # Architecture
//!
//! ```text
//! change capture ──► Recorder ──► VersionStore (append-only)
//!                                      │
//!                 History ◄────────────┤  next / previous / index / queries
//!                                      │
//!                 Reifier ◄────────────┘
//!                    ├── codec      (snapshot text -> attributes)
//!                    ├── resolver   (declared type + `type` column -> descriptor)
//!                    └── EntityStore (live copy, if the entity still exists)
//! ```
//!
//! # Modules
//!
//! - [`codec`] -- Snapshot encoding and decoding
//! - [`registry`] -- Type descriptors: the assignable fields of each type
//! - [`resolver`] -- Single-table-inheritance subtype resolution
//! - [`entity`] -- Live and reified entity values
//! - [`reifier`] -- Snapshot to entity reconstruction
//! - [`navigator`] -- Ordered traversal and filtered queries
//! - [`recorder`] -- Validated write path with explicit actor context
//! - [`timeline`] -- State of a target at an instant
//! - [`store`] -- Storage traits and the composable [`VersionQuery`]
//! - [`memory`] -- In-memory store implementations
//! - [`config`] -- YAML configuration
//! - [`logging`] -- `tracing` subscriber setup
//! - [`error`] -- Error types
//!
//! # Usage
//!
//! ```
//! use palimpsest_core::{
//!     History, MemoryEntityStore, MemoryVersionStore, Recorder, Reifier, TypeDescriptor,
//!     TypeRegistry, WriteContext,
//! };
//! use palimpsest_types::{AttributeValue, Attributes, Target};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mut registry = TypeRegistry::new();
//! registry.register(TypeDescriptor::new("Article").field("title")).ok();
//!
//! let versions = MemoryVersionStore::new();
//! let entities = MemoryEntityStore::new();
//! let target = Target::new("Article", 1);
//! let ctx = WriteContext::anonymous();
//!
//! let mut before = Attributes::new();
//! before.insert("title".to_owned(), AttributeValue::from("Draft"));
//! let recorder = Recorder::new(&versions);
//! let version = recorder.record_destroy(&ctx, target.clone(), &before).await.ok();
//!
//! let reifier = Reifier::new(&registry, &entities);
//! let restored = match version {
//!     Some(v) => reifier.reify(&v).await.ok().flatten(),
//!     None => None,
//! };
//! assert_eq!(
//!     restored.and_then(|e| e.get("title").cloned()),
//!     Some(AttributeValue::from("Draft"))
//! );
//! assert_eq!(History::new(&versions).versions_of(&target).await.map(|v| v.len()), Ok(1));
//! # }
//! ```

pub mod codec;
pub mod config;
pub mod entity;
pub mod error;
pub mod logging;
pub mod memory;
pub mod navigator;
pub mod recorder;
pub mod registry;
pub mod reifier;
pub mod resolver;
pub mod store;
pub mod timeline;

// Re-export primary types at crate root.
pub use config::{ConfigError, DatabaseConfig, LogFormat, LoggingConfig, PalimpsestConfig, ReifyConfig};
pub use entity::{Entity, Provenance};
pub use error::{RecordError, RegistryError, ReifyError, SnapshotError, TimelineError, ValidationError};
pub use logging::LoggingError;
pub use memory::{MemoryEntityStore, MemoryVersionStore};
pub use navigator::History;
pub use recorder::{Recorder, VersionBuilder, WriteContext};
pub use registry::{TypeDescriptor, TypeRegistry};
pub use reifier::{ReifyOptions, Reifier};
pub use store::{EntityStore, QueryOrder, VersionQuery, VersionStore};
pub use timeline::Timeline;
