//! Enumeration types for the versioning engine.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// The kind of change a version record captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionEvent {
    /// The target was created. There is no prior state to snapshot.
    Create,
    /// The target was modified. The snapshot holds the state before the edit.
    Update,
    /// The target was destroyed. The snapshot holds its final state.
    Destroy,
}

impl VersionEvent {
    /// The text stored in the `event` column.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Destroy => "destroy",
        }
    }
}

impl core::fmt::Display for VersionEvent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when text does not name a [`VersionEvent`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown version event: {0:?}")]
pub struct UnknownEvent(pub String);

impl FromStr for VersionEvent {
    type Err = UnknownEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            "destroy" => Ok(Self::Destroy),
            other => Err(UnknownEvent(other.to_owned())),
        }
    }
}
