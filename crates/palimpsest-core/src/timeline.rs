//! Point-in-time reconstruction of a target.
//!
//! A version's snapshot is the state before its event, so the state of a
//! target at time `t` is the snapshot of the first version created after
//! `t`. If no version follows `t`, nothing has changed since and the live
//! entity is the answer.

use chrono::{DateTime, Utc};
use palimpsest_types::Target;

use crate::entity::Entity;
use crate::error::{ReifyError, TimelineError};
use crate::navigator::History;
use crate::reifier::Reifier;
use crate::store::{EntityStore, VersionStore};

/// Combines a navigator and a reifier to answer "what did this look like
/// at time `t`".
pub struct Timeline<'a, S, E> {
    history: History<'a, S>,
    reifier: Reifier<'a, E>,
}

impl<'a, S: VersionStore, E: EntityStore> Timeline<'a, S, E> {
    /// Create a timeline over a version store and a reifier.
    pub const fn new(store: &'a S, reifier: Reifier<'a, E>) -> Self {
        Self {
            history: History::new(store),
            reifier,
        }
    }

    /// The state of `target` at `at`.
    ///
    /// Returns `None` when the target did not exist at `at` (it was created
    /// later) or no longer exists and has no later version.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::Store`] if the version query fails, or
    /// [`TimelineError::Reify`] if reification or the live lookup fails.
    pub async fn state_at(
        &self,
        target: &Target,
        at: DateTime<Utc>,
    ) -> Result<Option<Entity>, TimelineError<S::Error>> {
        let following = self
            .history
            .first_after(target, at)
            .await
            .map_err(TimelineError::Store)?;

        match following {
            Some(version) => {
                tracing::debug!(
                    version_id = %version.id,
                    target_ref = %target,
                    %at,
                    "Reifying state at instant"
                );
                Ok(self.reifier.reify(&version).await?)
            }
            None => self
                .reifier
                .entities()
                .find(target)
                .await
                .map_err(|e| TimelineError::Reify(ReifyError::Lookup(Box::new(e)))),
        }
    }
}
