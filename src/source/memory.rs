//! In-memory policy source.
//!
//! Thread-safe reference backend. It can be seeded programmatically or from a
//! JSON fixture document, and can be told to fail for a scope or a policy
//! object so error paths are testable.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::error::SourceError;
use crate::policy::{PolicyId, PolicyLink};
use crate::setting::{ContextSet, RawSetting, SettingContext};
use crate::source::traits::PolicySource;

fn lock_err(context: &'static str) -> SourceError {
    SourceError::Backend {
        message: format!("poisoned lock: {context}"),
    }
}

/// Serialized form of an [`InMemoryPolicySource`].
///
/// ```json
/// {
///   "scopes": { "OU=Lab,DC=corp": [ { "policy_id": "{A}", "precedence_rank": 1 } ] },
///   "policies": {
///     "{A}": [ { "context": "machine", "key_path": "...", "value_name": "...", "value": "1" } ]
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeFixture {
    /// Link lists keyed by scope.
    #[serde(default)]
    pub scopes: BTreeMap<String, Vec<PolicyLink>>,

    /// Exported settings keyed by policy object.
    #[serde(default)]
    pub policies: BTreeMap<PolicyId, Vec<RawSetting>>,
}

#[derive(Debug, Default)]
struct SourceState {
    scopes: HashMap<String, Vec<PolicyLink>>,
    exports: HashMap<PolicyId, Vec<RawSetting>>,
    failing_scopes: HashMap<String, SourceError>,
    failing_policies: HashMap<PolicyId, SourceError>,
}

/// Thread-safe in-memory [`PolicySource`].
#[derive(Debug, Default)]
pub struct InMemoryPolicySource {
    state: RwLock<SourceState>,
}

impl InMemoryPolicySource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source seeded from a fixture.
    #[must_use]
    pub fn from_fixture(fixture: ScopeFixture) -> Self {
        Self {
            state: RwLock::new(SourceState {
                scopes: fixture.scopes.into_iter().collect(),
                exports: fixture.policies.into_iter().collect(),
                ..SourceState::default()
            }),
        }
    }

    /// Parses a JSON fixture document.
    ///
    /// # Errors
    /// Returns `Backend` if the document is not a valid fixture.
    pub fn from_json(json: &str) -> Result<Self, SourceError> {
        let fixture: ScopeFixture = serde_json::from_str(json).map_err(|e| SourceError::Backend {
            message: format!("invalid fixture: {e}"),
        })?;
        Ok(Self::from_fixture(fixture))
    }

    /// Reads and parses a JSON fixture file.
    ///
    /// # Errors
    /// Returns `Backend` if the file cannot be read or parsed.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| SourceError::Backend {
            message: format!("cannot read {}: {e}", path.display()),
        })?;
        Self::from_json(&json)
    }

    /// Sets the link list for a scope, replacing any previous one.
    ///
    /// # Errors
    /// Returns `Backend` if the lock is poisoned.
    pub fn insert_scope(
        &self,
        scope: impl Into<String>,
        links: Vec<PolicyLink>,
    ) -> Result<(), SourceError> {
        let mut state = self.state.write().map_err(|_| lock_err("insert_scope"))?;
        state.scopes.insert(scope.into(), links);
        Ok(())
    }

    /// Sets the exported settings of a policy object.
    ///
    /// # Errors
    /// Returns `Backend` if the lock is poisoned.
    pub fn insert_export(
        &self,
        policy_id: impl Into<PolicyId>,
        settings: Vec<RawSetting>,
    ) -> Result<(), SourceError> {
        let mut state = self.state.write().map_err(|_| lock_err("insert_export"))?;
        state.exports.insert(policy_id.into(), settings);
        Ok(())
    }

    /// Makes every `fetch_links` call for `scope` fail with `error`.
    ///
    /// # Errors
    /// Returns `Backend` if the lock is poisoned.
    pub fn fail_scope(
        &self,
        scope: impl Into<String>,
        error: SourceError,
    ) -> Result<(), SourceError> {
        let mut state = self.state.write().map_err(|_| lock_err("fail_scope"))?;
        state.failing_scopes.insert(scope.into(), error);
        Ok(())
    }

    /// Makes every `fetch_settings` call for `policy_id` fail with `error`.
    ///
    /// # Errors
    /// Returns `Backend` if the lock is poisoned.
    pub fn fail_policy(
        &self,
        policy_id: impl Into<PolicyId>,
        error: SourceError,
    ) -> Result<(), SourceError> {
        let mut state = self.state.write().map_err(|_| lock_err("fail_policy"))?;
        state.failing_policies.insert(policy_id.into(), error);
        Ok(())
    }

    /// Snapshots the current contents as a fixture. Injected failures are not included.
    ///
    /// # Errors
    /// Returns `Backend` if the lock is poisoned.
    pub fn to_fixture(&self) -> Result<ScopeFixture, SourceError> {
        let state = self.state.read().map_err(|_| lock_err("to_fixture"))?;
        Ok(ScopeFixture {
            scopes: state.scopes.clone().into_iter().collect(),
            policies: state.exports.clone().into_iter().collect(),
        })
    }
}

impl PolicySource for InMemoryPolicySource {
    fn fetch_links(&self, scope: &str) -> Result<Vec<PolicyLink>, SourceError> {
        let state = self.state.read().map_err(|_| lock_err("fetch_links"))?;
        if let Some(err) = state.failing_scopes.get(scope) {
            return Err(err.clone());
        }
        state
            .scopes
            .get(scope)
            .cloned()
            .ok_or_else(|| SourceError::ScopeNotFound {
                scope: scope.to_string(),
            })
    }

    fn fetch_settings(
        &self,
        policy_id: &PolicyId,
        contexts: ContextSet,
    ) -> Result<Vec<RawSetting>, SourceError> {
        let state = self.state.read().map_err(|_| lock_err("fetch_settings"))?;
        if let Some(err) = state.failing_policies.get(policy_id) {
            return Err(err.clone());
        }
        let export = state
            .exports
            .get(policy_id)
            .ok_or_else(|| SourceError::PolicyNotFound {
                id: policy_id.clone(),
            })?;

        // Unparseable contexts are passed through so the extractor can report them.
        Ok(export
            .iter()
            .filter(|raw| {
                raw.context
                    .as_deref()
                    .and_then(|c| c.parse::<SettingContext>().ok())
                    .map_or(true, |c| contexts.contains(c))
            })
            .cloned()
            .collect())
    }
}
