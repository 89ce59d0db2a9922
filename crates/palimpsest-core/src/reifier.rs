//! Reification: rebuilding an entity from a version snapshot.
//!
//! The snapshot of a version holds the state *before* its event, so
//! reifying version N yields the entity as it stood between versions N-1
//! and N. When the entity still exists, the live copy is the base (any
//! attributes the snapshot does not mention keep their current values);
//! when it was destroyed, a blank instance of the resolved type is built.

use palimpsest_types::VersionRecord;

use crate::codec;
use crate::entity::Entity;
use crate::error::ReifyError;
use crate::registry::{TypeDescriptor, TypeRegistry};
use crate::resolver::{self, DEFAULT_INHERITANCE_COLUMN};
use crate::store::EntityStore;

/// Tunables for reification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReifyOptions {
    /// Snapshot key naming the concrete single-table-inheritance type.
    pub inheritance_column: String,
}

impl Default for ReifyOptions {
    fn default() -> Self {
        Self {
            inheritance_column: DEFAULT_INHERITANCE_COLUMN.to_owned(),
        }
    }
}

/// Builds detached historical entities from version records.
pub struct Reifier<'a, E> {
    registry: &'a TypeRegistry,
    entities: &'a E,
    options: ReifyOptions,
}

impl<'a, E: EntityStore> Reifier<'a, E> {
    /// Create a reifier with default options.
    pub fn new(registry: &'a TypeRegistry, entities: &'a E) -> Self {
        Self::with_options(registry, entities, ReifyOptions::default())
    }

    /// Create a reifier with explicit options.
    pub const fn with_options(
        registry: &'a TypeRegistry,
        entities: &'a E,
        options: ReifyOptions,
    ) -> Self {
        Self {
            registry,
            entities,
            options,
        }
    }

    /// The live entity store this reifier reads from.
    pub const fn entities(&self) -> &'a E {
        self.entities
    }

    /// Whether `descriptor` takes part in a single-table-inheritance
    /// hierarchy, as a subtype or as a base with subtypes.
    fn inherits(&self, descriptor: &TypeDescriptor) -> bool {
        descriptor.base().is_some()
            || self
                .registry
                .subtypes_of(descriptor.name())
                .next()
                .is_some()
    }

    /// Reconstruct the entity state captured by `version`.
    ///
    /// Returns `Ok(None)` for versions without a snapshot (creates). Snapshot
    /// keys the resolved type has no slot for are skipped with a warning and
    /// listed in the result's [`Provenance`](crate::entity::Provenance).
    /// On types with subtypes or a base, the inheritance column is always
    /// assigned.
    ///
    /// # Errors
    ///
    /// - [`ReifyError::CorruptSnapshot`] if the snapshot cannot be decoded.
    /// - [`ReifyError::UnknownType`] if the type to instantiate is not
    ///   registered.
    /// - [`ReifyError::Lookup`] if the live entity store fails.
    pub async fn reify(&self, version: &VersionRecord) -> Result<Option<Entity>, ReifyError> {
        let Some(snapshot) = version.snapshot.as_deref() else {
            return Ok(None);
        };

        let attributes = codec::decode(snapshot).map_err(|source| ReifyError::CorruptSnapshot {
            version_id: version.id,
            source,
        })?;

        let live = self
            .entities
            .find(&version.target)
            .await
            .map_err(|e| ReifyError::Lookup(Box::new(e)))?;

        let (mut entity, descriptor) = match live {
            Some(entity) => {
                let descriptor = self.registry.get(entity.type_name()).ok_or_else(|| {
                    ReifyError::UnknownType {
                        name: entity.type_name().to_owned(),
                        version_id: version.id,
                    }
                })?;
                (entity, descriptor)
            }
            None => {
                let descriptor = resolver::resolve(
                    self.registry,
                    &version.target.target_type,
                    &attributes,
                    &self.options.inheritance_column,
                    version.id,
                )?;
                let entity = Entity::blank(descriptor.name(), Some(version.target.target_id));
                (entity, descriptor)
            }
        };

        let sti_slot = self
            .inherits(descriptor)
            .then_some(self.options.inheritance_column.as_str());
        let mut skipped = Vec::new();
        for (key, value) in attributes {
            if descriptor.has_field(&key) || sti_slot == Some(key.as_str()) {
                entity.set(key, value);
            } else {
                tracing::warn!(
                    attribute = %key,
                    target_type = %version.target.target_type,
                    version_id = %version.id,
                    "Attribute {key} does not exist on {} (version id: {})",
                    version.target.target_type,
                    version.id,
                );
                skipped.push(key);
            }
        }

        entity.mark_reified(version.id, skipped);
        Ok(Some(entity))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use palimpsest_types::{AttributeValue, Attributes, Target, TargetId, VersionEvent, VersionId};

    use super::*;
    use crate::memory::MemoryEntityStore;

    fn registry() -> TypeRegistry {
        let article = TypeDescriptor::new("Article").fields(["title", "body", "type"]);
        let featured = article.subtype("FeaturedArticle");
        let mut registry = TypeRegistry::new();
        let _ = registry.register(article);
        let _ = registry.register(featured);
        registry
    }

    fn version(id: i64, snapshot: Option<&str>) -> VersionRecord {
        VersionRecord {
            id: VersionId(id),
            target: Target::new("Article", 42),
            event: VersionEvent::Update,
            snapshot: snapshot.map(str::to_owned),
            actor_id: None,
            whodunnit: None,
            created_at: Utc::now(),
        }
    }

    fn encoded(pairs: &[(&str, &str)]) -> String {
        let attrs: Attributes = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), AttributeValue::from(*v)))
            .collect();
        codec::encode(&attrs).unwrap_or_default()
    }

    #[tokio::test]
    async fn create_versions_have_nothing_to_reify() {
        let registry = registry();
        let entities = MemoryEntityStore::new();
        let reifier = Reifier::new(&registry, &entities);
        assert!(matches!(reifier.reify(&version(1, None)).await, Ok(None)));
    }

    #[tokio::test]
    async fn corrupt_snapshot_surfaces() {
        let registry = registry();
        let entities = MemoryEntityStore::new();
        let reifier = Reifier::new(&registry, &entities);
        let result = reifier.reify(&version(3, Some("not a snapshot"))).await;
        assert!(matches!(
            result,
            Err(ReifyError::CorruptSnapshot { version_id, .. }) if version_id == VersionId(3)
        ));
    }

    #[tokio::test]
    async fn live_entity_is_the_base() {
        let registry = registry();
        let entities = MemoryEntityStore::new();
        let mut live = Attributes::new();
        live.insert("title".to_owned(), AttributeValue::from("Now"));
        live.insert("body".to_owned(), AttributeValue::from("Current body"));
        entities.put(
            Target::new("Article", 42),
            Entity::live("Article", TargetId(42), live),
        );

        let reifier = Reifier::new(&registry, &entities);
        let snapshot = encoded(&[("title", "Then")]);
        let entity = reifier.reify(&version(5, Some(&snapshot))).await.ok().flatten();

        let entity = entity.unwrap_or_else(|| Entity::blank("missing", None));
        assert_eq!(entity.get("title"), Some(&AttributeValue::from("Then")));
        assert_eq!(entity.get("body"), Some(&AttributeValue::from("Current body")));
        assert_eq!(entity.reified_from(), Some(VersionId(5)));

        // The store still holds the live state.
        let stored = entities.get(&Target::new("Article", 42));
        assert_eq!(
            stored.as_ref().and_then(|e| e.get("title")),
            Some(&AttributeValue::from("Now"))
        );
        assert!(stored.is_some_and(|e| !e.is_reified()));
    }

    #[tokio::test]
    async fn unregistered_live_type_is_unknown() {
        let registry = registry();
        let entities = MemoryEntityStore::new();
        entities.put(
            Target::new("Article", 42),
            Entity::live("Gadget", TargetId(42), Attributes::new()),
        );
        let reifier = Reifier::new(&registry, &entities);
        let snapshot = encoded(&[("title", "Then")]);
        let result = reifier.reify(&version(6, Some(&snapshot))).await;
        assert!(matches!(result, Err(ReifyError::UnknownType { ref name, .. }) if name == "Gadget"));
    }

    #[tokio::test]
    async fn inheritance_column_is_not_drift() {
        let article = TypeDescriptor::new("Article").field("title");
        let featured = article.subtype("FeaturedArticle");
        let mut registry = TypeRegistry::new();
        let _ = registry.register(article);
        let _ = registry.register(featured);
        let entities = MemoryEntityStore::new();
        let reifier = Reifier::new(&registry, &entities);

        let snapshot = encoded(&[("title", "Hi"), ("type", "FeaturedArticle")]);
        let entity = reifier.reify(&version(8, Some(&snapshot))).await.ok().flatten();
        assert_eq!(entity.as_ref().map(Entity::type_name), Some("FeaturedArticle"));
        assert_eq!(
            entity.as_ref().and_then(|e| e.get("type")),
            Some(&AttributeValue::from("FeaturedArticle"))
        );
        assert_eq!(entity.map(|e| e.skipped_attributes().len()), Some(0));

        // A base type with no subtypes has no inheritance slot.
        let mut plain = TypeRegistry::new();
        let _ = plain.register(TypeDescriptor::new("Article").field("title"));
        let reifier = Reifier::new(&plain, &entities);
        let snapshot = encoded(&[("title", "Hi"), ("type", "")]);
        let entity = reifier.reify(&version(9, Some(&snapshot))).await.ok().flatten();
        assert_eq!(
            entity.map(|e| e.skipped_attributes().to_vec()),
            Some(vec!["type".to_owned()])
        );
    }

    #[tokio::test]
    async fn custom_inheritance_column_is_honoured() {
        let mut registry = TypeRegistry::new();
        let post = TypeDescriptor::new("Post").fields(["title", "kind"]);
        let announcement = post.subtype("Announcement");
        let _ = registry.register(post);
        let _ = registry.register(announcement);

        let entities = MemoryEntityStore::new();
        let options = ReifyOptions {
            inheritance_column: "kind".to_owned(),
        };
        let reifier = Reifier::with_options(&registry, &entities, options);
        let mut record = version(7, None);
        record.target = Target::new("Post", 1);
        let snapshot = encoded(&[("title", "Hello"), ("kind", "Announcement")]);
        record.snapshot = Some(snapshot);

        let entity = reifier.reify(&record).await.ok().flatten();
        assert_eq!(entity.as_ref().map(Entity::type_name), Some("Announcement"));
        assert_eq!(entity.and_then(|e| e.id()), Some(TargetId(1)));
    }
}
