//! Error types for the versioning core.
//!
//! Structural failures (a snapshot that cannot be decoded, a type name that
//! resolves to nothing) abort a single reification and surface here.
//! Per-attribute mismatches are not errors: the reifier logs and skips them.

use palimpsest_types::VersionId;

/// Errors from the snapshot codec.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The stored text is not a valid encoded attribute map.
    #[error("corrupt snapshot: {source}")]
    CorruptSnapshot {
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// The attribute map could not be encoded.
    #[error("snapshot encoding failed: {source}")]
    Encode {
        /// The underlying serialization error.
        #[source]
        source: serde_json::Error,
    },
}

/// Errors that abort a reification.
#[derive(Debug, thiserror::Error)]
pub enum ReifyError {
    /// The record's snapshot could not be decoded.
    #[error("corrupt snapshot in version {version_id}: {source}")]
    CorruptSnapshot {
        /// The version whose snapshot is unreadable.
        version_id: VersionId,
        /// The underlying codec error.
        #[source]
        source: SnapshotError,
    },

    /// Neither the declared type nor the embedded subtype is registered.
    #[error("unknown type {name:?} in version {version_id}")]
    UnknownType {
        /// The type name that failed to resolve.
        name: String,
        /// The version being reified.
        version_id: VersionId,
    },

    /// The live-entity lookup failed.
    #[error("live entity lookup failed: {0}")]
    Lookup(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A version record was rejected before reaching the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A required field was not set on the builder.
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

/// Errors on the write path.
#[derive(Debug, thiserror::Error)]
pub enum RecordError<E: std::error::Error + 'static> {
    /// The record failed validation and was not persisted.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The pre-change attributes could not be encoded.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    /// The version store rejected the insert.
    #[error("version store error: {0}")]
    Store(#[source] E),
}

/// Errors when building a [`crate::registry::TypeRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// A descriptor with this name is already registered.
    #[error("type {0:?} is already registered")]
    DuplicateType(String),

    /// A subtype names a parent that is not registered.
    #[error("type {name:?} inherits from unregistered type {base:?}")]
    UnknownBase {
        /// The subtype being registered.
        name: String,
        /// The missing parent.
        base: String,
    },
}

/// Errors from point-in-time reconstruction.
#[derive(Debug, thiserror::Error)]
pub enum TimelineError<E: std::error::Error + 'static> {
    /// Querying the version store failed.
    #[error("version store error: {0}")]
    Store(#[source] E),

    /// Reifying the selected version failed.
    #[error(transparent)]
    Reify(#[from] ReifyError),
}
