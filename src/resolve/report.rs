//! Report building.
//!
//! Flattens divergent groups into one [`ConflictRecord`] per contributor.
//! Records are ordered by identity (context, key path, value name) and then
//! by precedence rank; equal ranks keep contributor order. The report holds
//! no timestamps, so the same input always serializes to the same bytes.

use serde::{Deserialize, Serialize};

use crate::error::{ExtractionWarning, ResolveError, ResolveResult};
use crate::policy::PolicyId;
use crate::resolve::detector::ConflictGroup;
use crate::resolve::winner::is_conflicting;
use crate::setting::SettingContext;

/// One contributor of one divergent setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictRecord {
    /// Position of the record's group within the report.
    pub group: usize,
    /// Setting context.
    pub context: SettingContext,
    /// Key path as asserted by this contributor.
    pub key_path: String,
    /// Value name as asserted by this contributor.
    pub value_name: String,
    /// Data type as asserted by this contributor.
    pub data_type: String,
    /// Value asserted by this contributor.
    pub value: String,
    /// Contributing policy object.
    pub policy_id: PolicyId,
    /// Its display name.
    pub display_name: String,
    /// Whether its link is enforced.
    pub enforced: bool,
    /// Its link's precedence rank.
    pub precedence_rank: i64,
    /// Policy object whose value takes effect.
    pub winning_policy_id: PolicyId,
    /// The value that takes effect.
    pub winning_value: String,
    /// True if this contributor is overridden by the winner.
    pub is_conflicting: bool,
}

/// The outcome of one resolution run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictReport {
    /// The analyzed scope.
    pub scope: String,
    /// Number of links left after normalization.
    pub links_analyzed: usize,
    /// Flattened conflict records.
    pub records: Vec<ConflictRecord>,
    /// Policy objects skipped during extraction, in link order.
    pub warnings: Vec<ExtractionWarning>,
}

impl ConflictReport {
    /// Creates a report without records.
    #[must_use]
    pub fn empty(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            links_analyzed: 0,
            records: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Returns true if no conflict was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Number of divergent settings.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.records.last().map_or(0, |r| r.group + 1)
    }

    /// Records grouped per divergent setting.
    #[must_use]
    pub fn groups(&self) -> Vec<&[ConflictRecord]> {
        let mut out = Vec::with_capacity(self.group_count());
        let mut start = 0;
        for end in 1..=self.records.len() {
            if end == self.records.len() || self.records[end].group != self.records[start].group {
                out.push(&self.records[start..end]);
                start = end;
            }
        }
        out
    }

    /// Serializes the report as compact JSON.
    ///
    /// # Errors
    /// Returns `Internal` if serialization fails.
    pub fn to_json(&self) -> ResolveResult<String> {
        serde_json::to_string(self)
            .map_err(|e| ResolveError::internal(format!("report serialization failed: {e}")))
    }

    /// Serializes the report as indented JSON.
    ///
    /// # Errors
    /// Returns `Internal` if serialization fails.
    pub fn to_json_pretty(&self) -> ResolveResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ResolveError::internal(format!("report serialization failed: {e}")))
    }

    /// Stable digest of the records and warnings (hex-encoded blake3).
    ///
    /// # Errors
    /// Returns `Internal` if serialization fails.
    pub fn fingerprint(&self) -> ResolveResult<String> {
        let bytes = serde_json::to_vec(&(&self.records, &self.warnings))
            .map_err(|e| ResolveError::internal(format!("report serialization failed: {e}")))?;
        Ok(blake3::hash(&bytes).to_hex().to_string())
    }
}

/// Flattens resolved groups into a report.
///
/// `groups` must come from [`detect_conflicts`](crate::resolve::detect_conflicts)
/// (identity order) and have had their winners resolved.
///
/// # Errors
/// Returns `Internal` if a group has no winner.
pub fn build_report(
    scope: &str,
    links_analyzed: usize,
    groups: &[ConflictGroup<'_>],
    warnings: Vec<ExtractionWarning>,
) -> ResolveResult<ConflictReport> {
    let mut records = Vec::with_capacity(groups.iter().map(|g| g.assertions().len()).sum());

    for (position, group) in groups.iter().enumerate() {
        let winner = group.winner().ok_or_else(|| {
            ResolveError::internal(format!("conflict group {} has no winner", group.identity()))
        })?;

        let mut contributors = group.assertions().to_vec();
        contributors.sort_by_key(|a| a.source_precedence_rank);

        records.extend(contributors.into_iter().map(|a| ConflictRecord {
            group: position,
            context: a.context,
            key_path: a.key_path.clone(),
            value_name: a.value_name.clone(),
            data_type: a.data_type.clone(),
            value: a.value.clone(),
            policy_id: a.source_policy_id.clone(),
            display_name: a.source_display_name.clone(),
            enforced: a.source_enforced,
            precedence_rank: a.source_precedence_rank,
            winning_policy_id: winner.source_policy_id.clone(),
            winning_value: winner.value.clone(),
            is_conflicting: is_conflicting(a, winner),
        }));
    }

    Ok(ConflictReport {
        scope: scope.to_string(),
        links_analyzed,
        records,
        warnings,
    })
}
