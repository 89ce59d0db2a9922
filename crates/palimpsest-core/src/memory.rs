//! In-memory stores.
//!
//! [`MemoryVersionStore`] and [`MemoryEntityStore`] implement the storage
//! seams without a database. They back the test suites and suit embedded
//! use where history does not need to outlive the process.

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::future::{Future, ready};
use std::sync::{PoisonError, RwLock};

use palimpsest_types::{NewVersion, Target, VersionId, VersionRecord};

use crate::entity::Entity;
use crate::store::{EntityStore, QueryOrder, VersionQuery, VersionStore};

#[derive(Debug)]
struct Log {
    records: Vec<VersionRecord>,
    next_id: VersionId,
}

/// Append-only version log held in memory.
///
/// Ids are assigned under the write lock, so concurrent inserts still
/// receive strictly increasing ids.
#[derive(Debug)]
pub struct MemoryVersionStore {
    log: RwLock<Log>,
}

impl MemoryVersionStore {
    /// Create an empty store whose first id is 1.
    pub const fn new() -> Self {
        Self::starting_at(VersionId(1))
    }

    /// Create an empty store whose first id is `first`.
    pub const fn starting_at(first: VersionId) -> Self {
        Self {
            log: RwLock::new(Log {
                records: Vec::new(),
                next_id: first,
            }),
        }
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.log
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .records
            .len()
    }

    /// Whether no records are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn append(&self, version: NewVersion) -> VersionRecord {
        let mut log = self.log.write().unwrap_or_else(PoisonError::into_inner);
        let id = log.next_id;
        log.next_id = VersionId(id.0.saturating_add(1));
        let record = version.into_record(id);
        log.records.push(record.clone());
        tracing::debug!(
            version_id = %id,
            target_ref = %record.target,
            event = %record.event,
            "Inserted version"
        );
        record
    }

    fn select(&self, query: &VersionQuery) -> Vec<VersionRecord> {
        let log = self.log.read().unwrap_or_else(PoisonError::into_inner);
        let mut rows: Vec<VersionRecord> = log
            .records
            .iter()
            .filter(|r| query.matches(r))
            .cloned()
            .collect();
        drop(log);

        match query.order {
            // Records are appended in id order already.
            QueryOrder::Unordered | QueryOrder::IdAscending => {}
            QueryOrder::IdDescending => rows.reverse(),
            QueryOrder::CreatedAtAscending => {
                rows.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
            }
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        rows
    }
}

impl Default for MemoryVersionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl VersionStore for MemoryVersionStore {
    type Error = Infallible;

    fn insert(
        &self,
        version: NewVersion,
    ) -> impl Future<Output = Result<VersionRecord, Self::Error>> + Send {
        ready(Ok(self.append(version)))
    }

    fn fetch(
        &self,
        query: &VersionQuery,
    ) -> impl Future<Output = Result<Vec<VersionRecord>, Self::Error>> + Send {
        ready(Ok(self.select(query)))
    }
}

/// Live entities held in memory, keyed by their declared target.
#[derive(Debug, Default)]
pub struct MemoryEntityStore {
    entities: RwLock<BTreeMap<Target, Entity>>,
}

impl MemoryEntityStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the live entity behind `target`.
    pub fn put(&self, target: Target, entity: Entity) {
        self.entities
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(target, entity);
    }

    /// Remove the live entity behind `target`, returning it.
    pub fn remove(&self, target: &Target) -> Option<Entity> {
        self.entities
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(target)
    }

    /// A copy of the live entity behind `target`.
    pub fn get(&self, target: &Target) -> Option<Entity> {
        self.entities
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(target)
            .cloned()
    }
}

impl EntityStore for MemoryEntityStore {
    type Error = Infallible;

    fn find(
        &self,
        target: &Target,
    ) -> impl Future<Output = Result<Option<Entity>, Self::Error>> + Send {
        ready(Ok(self.get(target)))
    }
}
