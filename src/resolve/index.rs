//! Identity index.
//!
//! Owns every assertion of a run in an arena and groups arena slots by
//! [`Identity`]. Groups keep arrival order, which is link precedence order
//! when fed from normalized links. Nothing is ever dropped here.

use std::collections::BTreeMap;

use crate::setting::{Identity, IdentityFolding, SettingAssertion};

/// Per-run index of assertions keyed by identity.
#[derive(Debug, Default)]
pub struct IdentityIndex {
    folding: IdentityFolding,
    arena: Vec<SettingAssertion>,
    groups: BTreeMap<Identity, Vec<usize>>,
}

impl IdentityIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new(folding: IdentityFolding) -> Self {
        Self {
            folding,
            arena: Vec::new(),
            groups: BTreeMap::new(),
        }
    }

    /// Adds one assertion to the end of its identity's group.
    pub fn insert(&mut self, assertion: SettingAssertion) {
        let identity = assertion.identity(self.folding);
        let slot = self.arena.len();
        self.arena.push(assertion);
        self.groups.entry(identity).or_default().push(slot);
    }

    /// Total number of assertions held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Returns true if no assertion was inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Number of distinct identities.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Assertions for one identity, in arrival order.
    #[must_use]
    pub fn group(&self, identity: &Identity) -> Option<Vec<&SettingAssertion>> {
        self.groups
            .get(identity)
            .map(|slots| slots.iter().map(|&slot| &self.arena[slot]).collect())
    }

    /// Iterates all groups in identity order.
    pub fn groups(&self) -> impl Iterator<Item = (&Identity, Vec<&SettingAssertion>)> + '_ {
        self.groups.iter().map(move |(identity, slots)| {
            (
                identity,
                slots.iter().map(|&slot| &self.arena[slot]).collect(),
            )
        })
    }
}

impl Extend<SettingAssertion> for IdentityIndex {
    fn extend<I: IntoIterator<Item = SettingAssertion>>(&mut self, iter: I) {
        for assertion in iter {
            self.insert(assertion);
        }
    }
}
