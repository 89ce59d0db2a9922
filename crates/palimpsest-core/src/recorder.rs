//! The write path: validated construction and insertion of version records.
//!
//! A change-capture layer describes a change with a [`VersionBuilder`] and
//! hands it to a [`Recorder`] together with the [`WriteContext`] of the
//! operation that made the change. The actor columns are filled from the
//! context only; callers cannot set them on the builder.

use chrono::{DateTime, Utc};
use palimpsest_types::{Actor, Attributes, NewVersion, Target, VersionEvent, VersionRecord};

use crate::codec;
use crate::error::{RecordError, ValidationError};
use crate::store::VersionStore;

/// Per-operation context consumed when a version is written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteContext {
    actor: Option<Actor>,
}

impl WriteContext {
    /// A context with no known actor.
    pub const fn anonymous() -> Self {
        Self { actor: None }
    }

    /// A context acting on behalf of `actor`.
    pub const fn with_actor(actor: Actor) -> Self {
        Self { actor: Some(actor) }
    }

    /// The actor of this operation.
    pub const fn actor(&self) -> Option<&Actor> {
        self.actor.as_ref()
    }
}

/// Builder for [`NewVersion`] values.
///
/// # Examples
///
/// ```
/// use palimpsest_core::recorder::{VersionBuilder, WriteContext};
/// use palimpsest_types::{Target, VersionEvent};
///
/// let version = VersionBuilder::new(Target::new("Article", 42))
///     .event(VersionEvent::Create)
///     .build(&WriteContext::anonymous());
///
/// assert!(version.is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct VersionBuilder {
    target: Target,
    event: Option<VersionEvent>,
    snapshot: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

impl VersionBuilder {
    /// Start describing a change to `target`.
    pub const fn new(target: Target) -> Self {
        Self {
            target,
            event: None,
            snapshot: None,
            created_at: None,
        }
    }

    /// Set the event kind. Required.
    #[must_use]
    pub const fn event(mut self, event: VersionEvent) -> Self {
        self.event = Some(event);
        self
    }

    /// Set the encoded pre-change snapshot.
    #[must_use]
    pub fn snapshot(mut self, encoded: impl Into<String>) -> Self {
        self.snapshot = Some(encoded.into());
        self
    }

    /// Set the event time. Defaults to the moment [`build`](Self::build) runs.
    #[must_use]
    pub const fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    /// Validate and produce the record to insert, stamping the actor from
    /// `ctx`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingField`] if no event was set.
    pub fn build(self, ctx: &WriteContext) -> Result<NewVersion, ValidationError> {
        let event = self.event.ok_or(ValidationError::MissingField("event"))?;
        Ok(NewVersion {
            target: self.target,
            event,
            snapshot: self.snapshot,
            actor_id: ctx.actor().and_then(Actor::actor_id),
            whodunnit: ctx.actor().map(Actor::whodunnit),
            created_at: self.created_at.unwrap_or_else(Utc::now),
        })
    }
}

/// Writes version records into a [`VersionStore`].
pub struct Recorder<'a, S> {
    store: &'a S,
}

impl<'a, S: VersionStore> Recorder<'a, S> {
    /// Create a recorder bound to a store.
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Validate `builder` and insert the result.
    ///
    /// A record that fails validation never reaches the store.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Validation`] for an invalid record, or
    /// [`RecordError::Store`] if the insert fails.
    pub async fn record(
        &self,
        ctx: &WriteContext,
        builder: VersionBuilder,
    ) -> Result<VersionRecord, RecordError<S::Error>> {
        let version = builder.build(ctx)?;
        let record = self
            .store
            .insert(version)
            .await
            .map_err(RecordError::Store)?;
        tracing::debug!(
            version_id = %record.id,
            target_ref = %record.target,
            event = %record.event,
            "Recorded version"
        );
        Ok(record)
    }

    /// Record the creation of `target`. No snapshot is stored.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Store`] if the insert fails.
    pub async fn record_create(
        &self,
        ctx: &WriteContext,
        target: Target,
    ) -> Result<VersionRecord, RecordError<S::Error>> {
        let builder = VersionBuilder::new(target).event(VersionEvent::Create);
        self.record(ctx, builder).await
    }

    /// Record an update of `target` whose state before the edit was `before`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Snapshot`] if `before` cannot be encoded, or
    /// [`RecordError::Store`] if the insert fails.
    pub async fn record_update(
        &self,
        ctx: &WriteContext,
        target: Target,
        before: &Attributes,
    ) -> Result<VersionRecord, RecordError<S::Error>> {
        let builder = VersionBuilder::new(target)
            .event(VersionEvent::Update)
            .snapshot(codec::encode(before)?);
        self.record(ctx, builder).await
    }

    /// Record the destruction of `target` whose final state was `before`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Snapshot`] if `before` cannot be encoded, or
    /// [`RecordError::Store`] if the insert fails.
    pub async fn record_destroy(
        &self,
        ctx: &WriteContext,
        target: Target,
        before: &Attributes,
    ) -> Result<VersionRecord, RecordError<S::Error>> {
        let builder = VersionBuilder::new(target)
            .event(VersionEvent::Destroy)
            .snapshot(codec::encode(before)?);
        self.record(ctx, builder).await
    }
}

#[cfg(test)]
mod tests {
    use palimpsest_types::{ActorId, AttributeValue};

    use super::*;
    use crate::memory::MemoryVersionStore;

    #[test]
    fn missing_event_fails_validation() {
        let result = VersionBuilder::new(Target::new("Article", 1)).build(&WriteContext::anonymous());
        assert_eq!(result, Err(ValidationError::MissingField("event")));
    }

    #[test]
    fn created_at_can_be_pinned() {
        let at = DateTime::from_timestamp(1_000, 0).unwrap_or_default();
        let version = VersionBuilder::new(Target::new("Article", 1))
            .event(VersionEvent::Create)
            .created_at(at)
            .build(&WriteContext::anonymous());
        assert_eq!(version.map(|v| v.created_at), Ok(at));
    }

    #[tokio::test]
    async fn invalid_record_is_not_persisted() {
        let store = MemoryVersionStore::new();
        let recorder = Recorder::new(&store);
        let result = recorder
            .record(&WriteContext::anonymous(), VersionBuilder::new(Target::new("Article", 1)))
            .await;

        assert!(matches!(
            result,
            Err(RecordError::Validation(ValidationError::MissingField("event")))
        ));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn actor_comes_from_context() {
        let store = MemoryVersionStore::new();
        let recorder = Recorder::new(&store);
        let actor = ActorId::new();
        let ctx = WriteContext::with_actor(Actor::Identified(actor));

        let record = recorder.record_create(&ctx, Target::new("Article", 1)).await.ok();
        assert_eq!(record.as_ref().and_then(|r| r.actor_id), Some(actor));
        assert_eq!(
            record.and_then(|r| r.whodunnit),
            Some(actor.to_string())
        );
    }

    #[tokio::test]
    async fn named_actor_sets_only_whodunnit() {
        let store = MemoryVersionStore::new();
        let recorder = Recorder::new(&store);
        let ctx = WriteContext::with_actor(Actor::Named("nightly-import".to_owned()));

        let record = recorder.record_create(&ctx, Target::new("Article", 1)).await.ok();
        assert_eq!(record.as_ref().and_then(|r| r.actor_id), None);
        assert_eq!(
            record.and_then(|r| r.whodunnit).as_deref(),
            Some("nightly-import")
        );
    }

    #[tokio::test]
    async fn update_stores_encoded_before_state() {
        let store = MemoryVersionStore::new();
        let recorder = Recorder::new(&store);
        let mut before = Attributes::new();
        before.insert("title".to_owned(), AttributeValue::from("Old"));

        let record = recorder
            .record_update(&WriteContext::anonymous(), Target::new("Article", 1), &before)
            .await
            .ok();

        let decoded = record
            .as_ref()
            .and_then(|r| r.snapshot.as_deref())
            .and_then(|s| codec::decode(s).ok());
        assert_eq!(decoded, Some(before));
        assert_eq!(record.map(|r| r.event), Some(VersionEvent::Update));
    }

    #[tokio::test]
    async fn create_has_no_snapshot() {
        let store = MemoryVersionStore::new();
        let recorder = Recorder::new(&store);
        let record = recorder
            .record_create(&WriteContext::anonymous(), Target::new("Article", 1))
            .await
            .ok();
        assert_eq!(record.map(|r| r.snapshot), Some(None));
    }
}
