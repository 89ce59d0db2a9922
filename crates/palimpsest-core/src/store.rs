//! Storage seams: the version store and the live entity store.
//!
//! The core never talks to a database directly. A [`VersionStore`] persists
//! and queries version records; an [`EntityStore`] answers "what does this
//! target look like right now". [`VersionQuery`] is the composable filter
//! both the navigator and callers use; each store evaluates it natively.

use std::collections::BTreeSet;
use std::future::Future;

use chrono::{DateTime, Utc};
use palimpsest_types::{NewVersion, Target, VersionId, VersionRecord};

use crate::entity::Entity;

/// Result ordering for a [`VersionQuery`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryOrder {
    /// Store order; no guarantee.
    #[default]
    Unordered,
    /// Ascending by id.
    IdAscending,
    /// Descending by id.
    IdDescending,
    /// Ascending by `created_at`, ties broken by ascending id.
    CreatedAtAscending,
}

/// A composable filter over version records.
///
/// All set filters are combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionQuery {
    /// Only records of this target.
    pub target: Option<Target>,
    /// Only records whose `target_type` is one of these.
    pub item_types: Option<BTreeSet<String>>,
    /// Only records created strictly after this instant.
    pub created_after: Option<DateTime<Utc>>,
    /// Only records with an id strictly greater than this.
    pub id_above: Option<VersionId>,
    /// Only records with an id strictly less than this.
    pub id_below: Option<VersionId>,
    /// Result ordering.
    pub order: QueryOrder,
    /// Maximum number of records returned.
    pub limit: Option<usize>,
}

impl VersionQuery {
    /// A query matching every record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to one target.
    #[must_use]
    pub fn target(mut self, target: &Target) -> Self {
        self.target = Some(target.clone());
        self
    }

    /// Restrict to a set of target types.
    #[must_use]
    pub fn item_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.item_types = Some(types.into_iter().map(Into::into).collect());
        self
    }

    /// Restrict to records created strictly after `at`.
    #[must_use]
    pub const fn created_after(mut self, at: DateTime<Utc>) -> Self {
        self.created_after = Some(at);
        self
    }

    /// Restrict to ids strictly greater than `id`.
    #[must_use]
    pub const fn id_above(mut self, id: VersionId) -> Self {
        self.id_above = Some(id);
        self
    }

    /// Restrict to ids strictly less than `id`.
    #[must_use]
    pub const fn id_below(mut self, id: VersionId) -> Self {
        self.id_below = Some(id);
        self
    }

    /// Set the ordering.
    #[must_use]
    pub const fn order(mut self, order: QueryOrder) -> Self {
        self.order = order;
        self
    }

    /// Cap the number of results.
    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether `record` passes every filter. Ordering and limit are not
    /// considered.
    pub fn matches(&self, record: &VersionRecord) -> bool {
        self.target.as_ref().is_none_or(|t| record.belongs_to(t))
            && self
                .item_types
                .as_ref()
                .is_none_or(|types| types.contains(&record.target.target_type))
            && self.created_after.is_none_or(|at| record.created_at > at)
            && self.id_above.is_none_or(|id| record.id > id)
            && self.id_below.is_none_or(|id| record.id < id)
    }
}

/// Append-only persistence for version records.
pub trait VersionStore: Send + Sync {
    /// Failure type of the underlying store, passed through to callers.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Insert a record, assigning the next id.
    fn insert(
        &self,
        version: NewVersion,
    ) -> impl Future<Output = Result<VersionRecord, Self::Error>> + Send;

    /// Fetch the records matching `query`.
    fn fetch(
        &self,
        query: &VersionQuery,
    ) -> impl Future<Output = Result<Vec<VersionRecord>, Self::Error>> + Send;
}

/// Read access to the current state of versioned entities.
pub trait EntityStore: Send + Sync {
    /// Failure type of the underlying store.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the live entity behind `target`, or `None` if it no longer exists.
    ///
    /// The returned value is owned by the caller; mutating it must not
    /// affect the store.
    fn find(
        &self,
        target: &Target,
    ) -> impl Future<Output = Result<Option<Entity>, Self::Error>> + Send;
}

#[cfg(test)]
mod tests {
    use palimpsest_types::VersionEvent;

    use super::*;

    fn record(id: i64, target_type: &str, target_id: i64, secs: i64) -> VersionRecord {
        VersionRecord {
            id: VersionId(id),
            target: Target::new(target_type, target_id),
            event: VersionEvent::Update,
            snapshot: None,
            actor_id: None,
            whodunnit: None,
            created_at: DateTime::from_timestamp(secs, 0).unwrap_or_default(),
        }
    }

    #[test]
    fn empty_query_matches_everything() {
        assert!(VersionQuery::new().matches(&record(1, "Article", 1, 0)));
    }

    #[test]
    fn filters_combine_with_and() {
        let query = VersionQuery::new()
            .item_types(["Article"])
            .created_after(DateTime::from_timestamp(100, 0).unwrap_or_default());

        assert!(query.matches(&record(1, "Article", 1, 101)));
        assert!(!query.matches(&record(2, "Article", 1, 100)));
        assert!(!query.matches(&record(3, "Comment", 1, 200)));
    }

    #[test]
    fn id_bounds_are_strict() {
        let query = VersionQuery::new().id_above(VersionId(10)).id_below(VersionId(12));
        assert!(!query.matches(&record(10, "Article", 1, 0)));
        assert!(query.matches(&record(11, "Article", 1, 0)));
        assert!(!query.matches(&record(12, "Article", 1, 0)));
    }

    #[test]
    fn target_filter_needs_type_and_id() {
        let query = VersionQuery::new().target(&Target::new("Article", 1));
        assert!(query.matches(&record(1, "Article", 1, 0)));
        assert!(!query.matches(&record(2, "Article", 2, 0)));
        assert!(!query.matches(&record(3, "Comment", 1, 0)));
    }
}
