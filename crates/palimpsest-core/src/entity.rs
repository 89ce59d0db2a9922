//! Entity instances as seen by the versioning core.
//!
//! The core treats application entities as typed attribute bags. A live
//! entity comes from an [`EntityStore`](crate::store::EntityStore); a
//! reified entity is built from a snapshot and carries
//! [`Provenance::Reified`] so callers can tell it apart from persisted state.

use palimpsest_types::{AttributeValue, Attributes, TargetId, VersionId};

/// Where an [`Entity`] value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provenance {
    /// Loaded from the live entity store.
    Live,
    /// Reconstructed from a version snapshot.
    Reified {
        /// The version whose snapshot was applied.
        version_id: VersionId,
        /// Snapshot keys the entity's type has no slot for.
        skipped: Vec<String>,
    },
}

/// An entity instance: a type name, an optional id and its attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    type_name: String,
    id: Option<TargetId>,
    attributes: Attributes,
    provenance: Provenance,
}

impl Entity {
    /// A blank instance of `type_name` with no attributes.
    pub fn blank(type_name: impl Into<String>, id: Option<TargetId>) -> Self {
        Self {
            type_name: type_name.into(),
            id,
            attributes: Attributes::new(),
            provenance: Provenance::Live,
        }
    }

    /// A live instance with the given attributes.
    pub fn live(type_name: impl Into<String>, id: TargetId, attributes: Attributes) -> Self {
        Self {
            type_name: type_name.into(),
            id: Some(id),
            attributes,
            provenance: Provenance::Live,
        }
    }

    /// Concrete type name.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Identifier within the type's namespace.
    pub const fn id(&self) -> Option<TargetId> {
        self.id
    }

    /// Read an attribute.
    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// All attributes.
    pub const fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Consume the entity, keeping its attributes.
    pub fn into_attributes(self) -> Attributes {
        self.attributes
    }

    /// Set an attribute, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: AttributeValue) {
        self.attributes.insert(key.into(), value);
    }

    /// Where this value came from.
    pub const fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    /// Whether this value was reconstructed from history.
    pub const fn is_reified(&self) -> bool {
        matches!(self.provenance, Provenance::Reified { .. })
    }

    /// The version this value was reconstructed from.
    pub const fn reified_from(&self) -> Option<VersionId> {
        match self.provenance {
            Provenance::Reified { version_id, .. } => Some(version_id),
            Provenance::Live => None,
        }
    }

    /// Snapshot keys dropped during reification.
    pub fn skipped_attributes(&self) -> &[String] {
        match &self.provenance {
            Provenance::Reified { skipped, .. } => skipped,
            Provenance::Live => &[],
        }
    }

    pub(crate) fn mark_reified(&mut self, version_id: VersionId, skipped: Vec<String>) {
        self.provenance = Provenance::Reified {
            version_id,
            skipped,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_entities_are_not_reified() {
        let entity = Entity::live("Article", TargetId(1), Attributes::new());
        assert!(!entity.is_reified());
        assert_eq!(entity.reified_from(), None);
        assert!(entity.skipped_attributes().is_empty());
    }

    #[test]
    fn marking_records_version_and_skips() {
        let mut entity = Entity::blank("Article", Some(TargetId(1)));
        entity.set("title", AttributeValue::from("Hi"));
        entity.mark_reified(VersionId(5), vec!["legacy_field".to_owned()]);

        assert!(entity.is_reified());
        assert_eq!(entity.reified_from(), Some(VersionId(5)));
        assert_eq!(entity.skipped_attributes(), ["legacy_field".to_owned()]);
        assert_eq!(entity.get("title"), Some(&AttributeValue::from("Hi")));
    }
}
