//! Policy objects and their links to a scope.
//!
//! A link is the association between one policy object and the scope being
//! analyzed. Links are built once per run from the collaborator's link list
//! and never mutated afterwards.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier of a policy object.
///
/// Usually a GUID in braces, but never interpreted by the engine.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyId(String);

impl PolicyId {
    /// Wraps an identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PolicyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PolicyId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PolicyId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A policy object's association with the scope.
///
/// Lower `precedence_rank` means higher effective precedence: the link is
/// applied later and its settings take effect over earlier ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyLink {
    /// The linked policy object.
    pub policy_id: PolicyId,

    /// Human-readable name of the policy object. Empty until filled by
    /// [`PolicyLink::with_default_name`].
    #[serde(default)]
    pub display_name: String,

    /// Whether the link is active.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Whether the link is enforced (no-override).
    #[serde(default)]
    pub enforced: bool,

    /// Link order at the scope.
    pub precedence_rank: i64,
}

const fn default_enabled() -> bool {
    true
}

impl PolicyLink {
    /// Creates an enabled, non-enforced link.
    #[must_use]
    pub fn new(policy_id: impl Into<PolicyId>, precedence_rank: i64) -> Self {
        let policy_id = policy_id.into();
        Self {
            display_name: policy_id.to_string(),
            policy_id,
            enabled: true,
            enforced: false,
            precedence_rank,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    /// Falls back to the policy id when no display name was provided.
    #[must_use]
    pub fn with_default_name(mut self) -> Self {
        if self.display_name.trim().is_empty() {
            self.display_name = self.policy_id.to_string();
        }
        self
    }

    /// Marks the link as enforced.
    #[must_use]
    pub fn enforced(mut self) -> Self {
        self.enforced = true;
        self
    }

    /// Marks the link as disabled.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}
