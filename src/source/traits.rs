//! The [`PolicySource`] contract.

use crate::error::SourceError;
use crate::policy::{PolicyId, PolicyLink};
use crate::setting::{ContextSet, RawSetting};

/// Retrieves links and exported settings for the engine.
///
/// Implementations must be safe to call from several extraction workers at once.
pub trait PolicySource: Send + Sync {
    /// Returns the flattened, ordered link list for `scope`.
    ///
    /// # Errors
    /// Any error here is fatal to the run (scope resolution failure).
    fn fetch_links(&self, scope: &str) -> Result<Vec<PolicyLink>, SourceError>;

    /// Returns the exported settings of one policy object, restricted to `contexts`.
    ///
    /// # Errors
    /// Errors are recoverable: the policy object is skipped with a warning.
    fn fetch_settings(
        &self,
        policy_id: &PolicyId,
        contexts: ContextSet,
    ) -> Result<Vec<RawSetting>, SourceError>;
}
