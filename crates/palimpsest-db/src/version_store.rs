//! Version store operations on the `versions` table.
//!
//! Rows are append-only. The `id` column is a `BIGSERIAL`, so ids are
//! assigned by `PostgreSQL` and increase across the whole table.
//! A [`VersionQuery`] is compiled into a single parameterized `SELECT`.

use chrono::{DateTime, Utc};
use palimpsest_core::{QueryOrder, VersionQuery, VersionStore};
use palimpsest_types::{
    ActorId, NewVersion, Target, TargetId, VersionEvent, VersionId, VersionRecord,
};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::DbError;

/// Columns selected for every [`VersionRow`].
const VERSION_COLUMNS: &str =
    "id, target_type, target_id, event, snapshot, actor_id, whodunnit, created_at";

/// Operations on the `versions` table.
pub struct PgVersionStore<'a> {
    pool: &'a PgPool,
}

impl<'a> PgVersionStore<'a> {
    /// Create a new version store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Count the stored versions of one target.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn count_for(&self, target: &Target) -> Result<i64, DbError> {
        let count: (i64,) = sqlx::query_as(
            r"SELECT COUNT(*) FROM versions WHERE target_type = $1 AND target_id = $2",
        )
        .bind(&target.target_type)
        .bind(target.target_id.into_inner())
        .fetch_one(self.pool)
        .await?;
        Ok(count.0)
    }
}

impl VersionStore for PgVersionStore<'_> {
    type Error = DbError;

    async fn insert(&self, version: NewVersion) -> Result<VersionRecord, DbError> {
        let row = sqlx::query_as::<_, VersionRow>(
            r"INSERT INTO versions (target_type, target_id, event, snapshot, actor_id, whodunnit, created_at)
              VALUES ($1, $2, $3, $4, $5, $6, $7)
              RETURNING id, target_type, target_id, event, snapshot, actor_id, whodunnit, created_at",
        )
        .bind(&version.target.target_type)
        .bind(version.target.target_id.into_inner())
        .bind(version.event.as_str())
        .bind(version.snapshot.as_deref())
        .bind(version.actor_id.map(ActorId::into_inner))
        .bind(version.whodunnit.as_deref())
        .bind(version.created_at)
        .fetch_one(self.pool)
        .await?;

        tracing::debug!(
            version_id = row.id,
            target_type = %row.target_type,
            target_id = row.target_id,
            event = %row.event,
            "Inserted version"
        );
        VersionRecord::try_from(row)
    }

    async fn fetch(&self, query: &VersionQuery) -> Result<Vec<VersionRecord>, DbError> {
        let mut builder = select_for(query);
        let rows = builder
            .build_query_as::<VersionRow>()
            .fetch_all(self.pool)
            .await?;

        tracing::trace!(count = rows.len(), "Fetched versions");
        rows.into_iter().map(VersionRecord::try_from).collect()
    }
}

/// Compile `query` into a parameterized `SELECT` over `versions`.
fn select_for(query: &VersionQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT ");
    builder.push(VERSION_COLUMNS);
    builder.push(" FROM versions WHERE TRUE");

    if let Some(target) = &query.target {
        builder
            .push(" AND target_type = ")
            .push_bind(target.target_type.clone())
            .push(" AND target_id = ")
            .push_bind(target.target_id.into_inner());
    }
    if let Some(types) = &query.item_types {
        let types: Vec<String> = types.iter().cloned().collect();
        builder
            .push(" AND target_type = ANY(")
            .push_bind(types)
            .push(")");
    }
    if let Some(at) = query.created_after {
        builder.push(" AND created_at > ").push_bind(at);
    }
    if let Some(id) = query.id_above {
        builder.push(" AND id > ").push_bind(id.into_inner());
    }
    if let Some(id) = query.id_below {
        builder.push(" AND id < ").push_bind(id.into_inner());
    }

    match query.order {
        QueryOrder::Unordered => {}
        QueryOrder::IdAscending => {
            builder.push(" ORDER BY id ASC");
        }
        QueryOrder::IdDescending => {
            builder.push(" ORDER BY id DESC");
        }
        QueryOrder::CreatedAtAscending => {
            builder.push(" ORDER BY created_at ASC, id ASC");
        }
    }

    if let Some(limit) = query.limit {
        builder
            .push(" LIMIT ")
            .push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
    }
    builder
}

/// A row from the `versions` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VersionRow {
    /// Version id.
    pub id: i64,
    /// Declared type of the versioned entity.
    pub target_type: String,
    /// Id of the versioned entity.
    pub target_id: i64,
    /// Event name: `create`, `update` or `destroy`.
    pub event: String,
    /// Encoded pre-change attributes.
    pub snapshot: Option<String>,
    /// Responsible identity, if known.
    pub actor_id: Option<Uuid>,
    /// Responsible label.
    pub whodunnit: Option<String>,
    /// When the event happened.
    pub created_at: DateTime<Utc>,
}

impl TryFrom<VersionRow> for VersionRecord {
    type Error = DbError;

    fn try_from(row: VersionRow) -> Result<Self, DbError> {
        let event: VersionEvent = row.event.parse::<VersionEvent>().map_err(|e| DbError::Decode {
            id: row.id,
            reason: e.to_string(),
        })?;
        Ok(Self {
            id: VersionId(row.id),
            target: Target::new(row.target_type, TargetId(row.target_id)),
            event,
            snapshot: row.snapshot,
            actor_id: row.actor_id.map(ActorId),
            whodunnit: row.whodunnit,
            created_at: row.created_at,
        })
    }
}
