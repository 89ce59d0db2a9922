//! Subtype resolution for single-table inheritance.
//!
//! A target reference always names the declared base type. When the entity
//! is a subtype, the snapshot's inheritance column (`type` by default) holds
//! the real class. A blank column means the base type itself.

use palimpsest_types::{Attributes, VersionId};

use crate::error::ReifyError;
use crate::registry::{TypeDescriptor, TypeRegistry};

/// Default name of the single-table-inheritance column.
pub const DEFAULT_INHERITANCE_COLUMN: &str = "type";

/// Pick the type name to instantiate: a non-blank text value in
/// `inheritance_column`, else `declared_type`.
pub fn concrete_type_name<'a>(
    declared_type: &'a str,
    attributes: &'a Attributes,
    inheritance_column: &str,
) -> &'a str {
    attributes
        .get(inheritance_column)
        .and_then(|v| v.as_text())
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(declared_type)
}

/// Resolve the concrete [`TypeDescriptor`] for a snapshot.
///
/// # Errors
///
/// Returns [`ReifyError::UnknownType`] if the chosen name is not registered.
pub fn resolve<'r>(
    registry: &'r TypeRegistry,
    declared_type: &str,
    attributes: &Attributes,
    inheritance_column: &str,
    version_id: VersionId,
) -> Result<&'r TypeDescriptor, ReifyError> {
    let name = concrete_type_name(declared_type, attributes, inheritance_column);
    registry.get(name).ok_or_else(|| ReifyError::UnknownType {
        name: name.to_owned(),
        version_id,
    })
}
