//! Conflict detection.
//!
//! A group is divergent when it has at least two contributors and at least
//! two distinct values. Values compare byte-for-byte; `"1"` and `"0x1"`
//! differ even if they mean the same DWORD.

use std::collections::HashSet;

use crate::resolve::index::IdentityIndex;
use crate::setting::{Identity, SettingAssertion};

/// All assertions sharing one identity, borrowed from the index.
#[derive(Debug, Clone)]
pub struct ConflictGroup<'a> {
    identity: &'a Identity,
    assertions: Vec<&'a SettingAssertion>,
    distinct_value_count: usize,
    winner: Option<usize>,
}

impl<'a> ConflictGroup<'a> {
    /// Builds a group and counts its distinct values.
    #[must_use]
    pub fn new(identity: &'a Identity, assertions: Vec<&'a SettingAssertion>) -> Self {
        let distinct_value_count = assertions
            .iter()
            .map(|a| a.value.as_str())
            .collect::<HashSet<_>>()
            .len();
        Self {
            identity,
            assertions,
            distinct_value_count,
            winner: None,
        }
    }

    /// The group's identity.
    #[must_use]
    pub fn identity(&self) -> &'a Identity {
        self.identity
    }

    /// Contributors in precedence order.
    #[must_use]
    pub fn assertions(&self) -> &[&'a SettingAssertion] {
        &self.assertions
    }

    /// Number of unique values among contributors.
    #[must_use]
    pub fn distinct_value_count(&self) -> usize {
        self.distinct_value_count
    }

    /// Returns true if the group carries ambiguity worth reporting.
    #[must_use]
    pub fn is_divergent(&self) -> bool {
        self.assertions.len() >= 2 && self.distinct_value_count >= 2
    }

    /// The winning assertion, once resolved.
    #[must_use]
    pub fn winner(&self) -> Option<&'a SettingAssertion> {
        self.winner.map(|i| self.assertions[i])
    }

    /// Records the winner. Has no effect if one was already recorded.
    pub(crate) fn set_winner(&mut self, position: usize) {
        if self.winner.is_none() && position < self.assertions.len() {
            self.winner = Some(position);
        }
    }
}

/// Returns the divergent groups of an index, in identity order.
///
/// Single-contributor and uniform-value groups are dropped silently.
#[must_use]
pub fn detect_conflicts(index: &IdentityIndex) -> Vec<ConflictGroup<'_>> {
    index
        .groups()
        .map(|(identity, assertions)| ConflictGroup::new(identity, assertions))
        .filter(ConflictGroup::is_divergent)
        .collect()
}
