//! `PostgreSQL` persistence for Palimpsest version records.
//!
//! The core crate talks to storage through the
//! [`VersionStore`](palimpsest_core::VersionStore) trait. This crate provides
//! the `PostgreSQL` implementation of it, plus pool management and schema
//! migrations.
//!
//! # Architecture
//!
//! ```text
//! Recorder / History / Timeline (palimpsest-core)
//!     |
//!     +-- VersionStore trait
//!         |
//!         +-- PgVersionStore --> PostgreSQL `versions` table
//!                                 (PostgresPool, migrations/)
//! ```
//!
//! # Modules
//!
//! - [`postgres`] -- `PostgreSQL` connection pool and configuration
//! - [`version_store`] -- Append-only version inserts and query compilation
//! - [`error`] -- Shared error types

pub mod error;
pub mod postgres;
pub mod version_store;

// Re-export primary types for convenience.
pub use error::DbError;
pub use postgres::{PostgresConfig, PostgresPool};
pub use version_store::{PgVersionStore, VersionRow};
