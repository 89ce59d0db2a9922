//! Registry of versioned entity types.
//!
//! A [`TypeDescriptor`] is the capability set of a type: the attribute names
//! that may be assigned when reconstructing an instance. Reification checks
//! each snapshot key against it instead of probing the entity for a setter.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::RegistryError;

/// Attribute that every versioned type can hold.
pub const PRIMARY_KEY: &str = "id";

/// Describes one constructible entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    name: String,
    base: Option<String>,
    fields: BTreeSet<String>,
}

impl TypeDescriptor {
    /// Describe a root type with no assignable fields besides [`PRIMARY_KEY`].
    pub fn new(name: impl Into<String>) -> Self {
        let mut fields = BTreeSet::new();
        fields.insert(PRIMARY_KEY.to_owned());
        Self {
            name: name.into(),
            base: None,
            fields,
        }
    }

    /// Add an assignable field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.fields.insert(name.into());
        self
    }

    /// Add several assignable fields.
    #[must_use]
    pub fn fields<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.extend(names.into_iter().map(Into::into));
        self
    }

    /// Derive a single-table-inheritance subtype that shares this type's
    /// fields.
    #[must_use]
    pub fn subtype(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base: Some(self.name.clone()),
            fields: self.fields.clone(),
        }
    }

    /// The type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The parent type for single-table-inheritance subtypes.
    pub fn base(&self) -> Option<&str> {
        self.base.as_deref()
    }

    /// Whether `field` can be assigned on instances of this type.
    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains(field)
    }

    /// All assignable field names, sorted.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }
}

/// Mapping from type name to [`TypeDescriptor`].
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: BTreeMap<String, TypeDescriptor>,
}

impl TypeRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            types: BTreeMap::new(),
        }
    }

    /// Register a descriptor.
    ///
    /// A subtype must be registered after its base.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateType`] if the name is taken, or
    /// [`RegistryError::UnknownBase`] if the parent is not registered.
    pub fn register(&mut self, descriptor: TypeDescriptor) -> Result<(), RegistryError> {
        if self.types.contains_key(descriptor.name()) {
            return Err(RegistryError::DuplicateType(descriptor.name));
        }
        if let Some(base) = descriptor.base() {
            if !self.types.contains_key(base) {
                return Err(RegistryError::UnknownBase {
                    name: descriptor.name.clone(),
                    base: base.to_owned(),
                });
            }
        }
        tracing::debug!(type_name = descriptor.name(), "Registered versioned type");
        self.types.insert(descriptor.name.clone(), descriptor);
        Ok(())
    }

    /// Look up a descriptor by name.
    pub fn get(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(name)
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Direct subtypes of `name`.
    pub fn subtypes_of<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a TypeDescriptor> {
        self.types.values().filter(move |d| d.base() == Some(name))
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether no types are registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
