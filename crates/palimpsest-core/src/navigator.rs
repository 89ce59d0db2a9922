//! History navigation over version records.
//!
//! Each target's versions form an append-only log ordered by id. The
//! navigator walks that log (`next`, `previous`, `index`) and exposes the
//! cross-target queries (`for_item_types`, `created_after`,
//! `ordered_ascending`). Every method is a read; store errors are returned
//! as-is.

use chrono::{DateTime, Utc};
use palimpsest_types::{Target, VersionRecord};

use crate::store::{QueryOrder, VersionQuery, VersionStore};

/// Read-only navigation over a [`VersionStore`].
pub struct History<'a, S> {
    store: &'a S,
}

impl<'a, S: VersionStore> History<'a, S> {
    /// Create a navigator bound to a store.
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// The version of the same target with the smallest id greater than
    /// `version.id`.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the query fails.
    pub async fn next(&self, version: &VersionRecord) -> Result<Option<VersionRecord>, S::Error> {
        let query = VersionQuery::new()
            .target(&version.target)
            .id_above(version.id)
            .order(QueryOrder::IdAscending)
            .limit(1);
        Ok(self.store.fetch(&query).await?.into_iter().next())
    }

    /// The version of the same target with the largest id less than
    /// `version.id`.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the query fails.
    pub async fn previous(
        &self,
        version: &VersionRecord,
    ) -> Result<Option<VersionRecord>, S::Error> {
        let query = VersionQuery::new()
            .target(&version.target)
            .id_below(version.id)
            .order(QueryOrder::IdDescending)
            .limit(1);
        Ok(self.store.fetch(&query).await?.into_iter().next())
    }

    /// Zero-based position of `version` in its target's id-ordered log, or
    /// `None` if the log does not contain it.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the query fails.
    pub async fn index(&self, version: &VersionRecord) -> Result<Option<usize>, S::Error> {
        let log = self.versions_of(&version.target).await?;
        Ok(log.iter().position(|r| r.id == version.id))
    }

    /// Every version of `target`, ascending by id.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the query fails.
    pub async fn versions_of(&self, target: &Target) -> Result<Vec<VersionRecord>, S::Error> {
        let query = VersionQuery::new()
            .target(target)
            .order(QueryOrder::IdAscending);
        self.store.fetch(&query).await
    }

    /// The earliest version of `target` created strictly after `at`, ties
    /// broken by id.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the query fails.
    pub async fn first_after(
        &self,
        target: &Target,
        at: DateTime<Utc>,
    ) -> Result<Option<VersionRecord>, S::Error> {
        let query = VersionQuery::new()
            .target(target)
            .created_after(at)
            .order(QueryOrder::CreatedAtAscending)
            .limit(1);
        Ok(self.store.fetch(&query).await?.into_iter().next())
    }

    /// All versions whose target type is in `types`. Order is unspecified.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the query fails.
    pub async fn for_item_types<I, T>(&self, types: I) -> Result<Vec<VersionRecord>, S::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.store.fetch(&VersionQuery::new().item_types(types)).await
    }

    /// All versions created strictly after `at`. Order is unspecified.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the query fails.
    pub async fn created_after(&self, at: DateTime<Utc>) -> Result<Vec<VersionRecord>, S::Error> {
        self.store.fetch(&VersionQuery::new().created_after(at)).await
    }

    /// All versions ordered by `created_at`, then id.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the query fails.
    pub async fn ordered_ascending(&self) -> Result<Vec<VersionRecord>, S::Error> {
        let query = VersionQuery::new().order(QueryOrder::CreatedAtAscending);
        self.store.fetch(&query).await
    }

    /// Run an arbitrary composed query.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the query fails.
    pub async fn query(&self, query: &VersionQuery) -> Result<Vec<VersionRecord>, S::Error> {
        self.store.fetch(query).await
    }
}

#[cfg(test)]
mod tests {
    use palimpsest_types::{NewVersion, VersionEvent, VersionId};

    use super::*;
    use crate::memory::MemoryVersionStore;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap_or_default()
    }

    async fn insert(store: &MemoryVersionStore, target: &Target, secs: i64) -> VersionRecord {
        let new = NewVersion {
            target: target.clone(),
            event: VersionEvent::Update,
            snapshot: Some("{}".to_owned()),
            actor_id: None,
            whodunnit: None,
            created_at: at(secs),
        };
        match store.insert(new).await {
            Ok(record) => record,
            Err(never) => match never {},
        }
    }

    #[tokio::test]
    async fn walks_only_its_own_target() {
        let store = MemoryVersionStore::new();
        let article = Target::new("Article", 1);
        let other = Target::new("Article", 2);

        let first = insert(&store, &article, 1).await;
        let _noise = insert(&store, &other, 2).await;
        let second = insert(&store, &article, 3).await;

        let history = History::new(&store);
        assert_eq!(history.next(&first).await, Ok(Some(second.clone())));
        assert_eq!(history.previous(&second).await, Ok(Some(first.clone())));
        assert_eq!(history.previous(&first).await, Ok(None));
        assert_eq!(history.next(&second).await, Ok(None));
        assert_eq!(history.index(&second).await, Ok(Some(1)));
    }

    #[tokio::test]
    async fn index_of_foreign_record_is_none() {
        let store = MemoryVersionStore::new();
        let article = Target::new("Article", 1);
        let _ = insert(&store, &article, 1).await;

        let mut stray = insert(&store, &article, 2).await;
        stray.id = VersionId(999);

        let history = History::new(&store);
        assert_eq!(history.index(&stray).await, Ok(None));
    }

    #[tokio::test]
    async fn first_after_is_strict() {
        let store = MemoryVersionStore::new();
        let article = Target::new("Article", 1);
        let _ = insert(&store, &article, 10).await;
        let later = insert(&store, &article, 20).await;

        let history = History::new(&store);
        assert_eq!(history.first_after(&article, at(10)).await, Ok(Some(later)));
        assert_eq!(history.first_after(&article, at(20)).await, Ok(None));
    }

    #[tokio::test]
    async fn created_after_excludes_the_boundary() {
        let store = MemoryVersionStore::new();
        let article = Target::new("Article", 1);
        let _ = insert(&store, &article, 10).await;
        let later = insert(&store, &article, 11).await;

        let history = History::new(&store);
        assert_eq!(history.created_after(at(10)).await, Ok(vec![later]));
    }
}
