//! Core record structs: targets, actors and version records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::VersionEvent;
use crate::ids::{ActorId, TargetId, VersionId};

/// Polymorphic reference to a versioned entity.
///
/// The pair is stored verbatim on every version record rather than as a
/// foreign key, because the entity may since have been destroyed.
/// `target_type` is always the declared (base) type; a single-table
/// inheritance subtype is only visible inside the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Target {
    /// Declared type name of the entity.
    pub target_type: String,
    /// Identifier of the entity within `target_type`.
    pub target_id: TargetId,
}

impl Target {
    /// Build a target reference.
    pub fn new(target_type: impl Into<String>, target_id: impl Into<TargetId>) -> Self {
        Self {
            target_type: target_type.into(),
            target_id: target_id.into(),
        }
    }
}

impl core::fmt::Display for Target {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}#{}", self.target_type, self.target_id)
    }
}

/// Whoever is responsible for a change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Actor {
    /// A known identity; recorded in `actor_id` and `whodunnit`.
    Identified(ActorId),
    /// A free-form label such as a batch job name; recorded in `whodunnit` only.
    Named(String),
}

impl Actor {
    /// The identity reference, when the actor is a known identity.
    pub const fn actor_id(&self) -> Option<ActorId> {
        match self {
            Self::Identified(id) => Some(*id),
            Self::Named(_) => None,
        }
    }

    /// The label stored in the `whodunnit` column.
    pub fn whodunnit(&self) -> String {
        match self {
            Self::Identified(id) => id.to_string(),
            Self::Named(name) => name.clone(),
        }
    }
}

/// One immutable, persisted change to a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    /// Store-assigned, strictly increasing identifier.
    pub id: VersionId,
    /// The entity this change belongs to.
    pub target: Target,
    /// What happened.
    pub event: VersionEvent,
    /// Encoded attribute map of the state before the event. `None` for creates.
    pub snapshot: Option<String>,
    /// Identity responsible for the change, if known.
    pub actor_id: Option<ActorId>,
    /// Label of whoever made the change.
    pub whodunnit: Option<String>,
    /// When the event happened.
    pub created_at: DateTime<Utc>,
}

impl VersionRecord {
    /// Whether this record belongs to `target`.
    pub fn belongs_to(&self, target: &Target) -> bool {
        self.target == *target
    }
}

/// A validated version record awaiting insertion.
///
/// The store assigns the [`VersionId`]; everything else is fixed here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVersion {
    /// The entity this change belongs to.
    pub target: Target,
    /// What happened.
    pub event: VersionEvent,
    /// Encoded pre-change attribute map.
    pub snapshot: Option<String>,
    /// Identity responsible for the change.
    pub actor_id: Option<ActorId>,
    /// Label of whoever made the change.
    pub whodunnit: Option<String>,
    /// When the event happened.
    pub created_at: DateTime<Utc>,
}

impl NewVersion {
    /// Attach the store-assigned identifier.
    pub fn into_record(self, id: VersionId) -> VersionRecord {
        VersionRecord {
            id,
            target: self.target,
            event: self.event,
            snapshot: self.snapshot,
            actor_id: self.actor_id,
            whodunnit: self.whodunnit,
            created_at: self.created_at,
        }
    }
}
