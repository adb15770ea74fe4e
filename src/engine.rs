//! Resolution engine.
//!
//! [`Resolver`] runs the whole pipeline for one scope against a pluggable
//! [`PolicySource`]. It holds no per-run state: every call builds its own
//! index and report, so one resolver can serve concurrent runs.

use std::sync::Arc;

use crate::config::ResolveConfig;
use crate::error::{ResolveError, ResolveResult};
use crate::policy::PolicyLink;
use crate::resolve::{
    build_report, detect_conflicts, extract_all, normalize_links, resolve_winners, ConflictReport,
    IdentityIndex,
};
use crate::source::PolicySource;

/// Computes conflict reports for scopes.
#[derive(Clone)]
pub struct Resolver {
    source: Arc<dyn PolicySource>,
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver").finish_non_exhaustive()
    }
}

impl Resolver {
    /// Create a resolver reading from `source`.
    #[must_use]
    pub fn new(source: Arc<dyn PolicySource>) -> Self {
        Self { source }
    }

    /// Resolve all setting conflicts among the policy objects linked to `scope`.
    ///
    /// Per-policy extraction failures are logged and reported as warnings;
    /// they never fail the run.
    ///
    /// # Errors
    /// - `Configuration` if `config` is invalid (checked before any lookup)
    /// - `ScopeResolution` if the scope's link list cannot be retrieved
    /// - `Internal` if the extraction pool fails
    pub fn resolve(&self, scope: &str, config: &ResolveConfig) -> ResolveResult<ConflictReport> {
        let config = config.compile()?;

        let links = self
            .source
            .fetch_links(scope)
            .map_err(|source| ResolveError::ScopeResolution {
                scope: scope.to_string(),
                source,
            })?;
        if links.is_empty() {
            tracing::warn!(scope, "scope has no linked policy objects");
            return Ok(ConflictReport::empty(scope));
        }

        let linked = links.len();
        let links = links.into_iter().map(PolicyLink::with_default_name).collect();
        let links = normalize_links(links, config.enforced_only);
        tracing::debug!(scope, linked, active = links.len(), "normalized links");

        let mut index = IdentityIndex::new(config.identity_folding);
        let mut warnings = Vec::new();
        for outcome in extract_all(self.source.as_ref(), &links, &config)? {
            match outcome {
                Ok(assertions) => index.extend(assertions),
                Err(warning) => {
                    tracing::warn!(
                        policy_id = %warning.policy_id,
                        "skipping policy object: {}",
                        warning.kind
                    );
                    warnings.push(warning);
                }
            }
        }

        let mut groups = detect_conflicts(&index);
        resolve_winners(&mut groups);
        tracing::debug!(
            scope,
            assertions = index.len(),
            identities = index.group_count(),
            divergent = groups.len(),
            "conflict detection complete"
        );

        build_report(scope, links.len(), &groups, warnings)
    }
}
