//! Winner resolution.
//!
//! Picks the assertion that takes effect for each divergent group and
//! derives the per-contributor conflict flag.

use crate::resolve::detector::ConflictGroup;
use crate::setting::SettingAssertion;

/// Picks the effective assertion of a group.
///
/// The lowest precedence rank wins; on equal ranks the earlier contributor
/// wins. The `enforced` flag does not participate. Returns the winner's
/// position, or `None` for an empty slice.
#[must_use]
pub fn select_winner(assertions: &[&SettingAssertion]) -> Option<usize> {
    let (first, rest) = assertions.split_first()?;
    let mut best = 0;
    let mut best_rank = first.source_precedence_rank;
    for (offset, a) in rest.iter().enumerate() {
        // Strict comparison keeps the first-seen assertion on ties.
        if a.source_precedence_rank < best_rank {
            best = offset + 1;
            best_rank = a.source_precedence_rank;
        }
    }
    Some(best)
}

/// Records the winner of every group.
pub fn resolve_winners(groups: &mut [ConflictGroup<'_>]) {
    for group in groups.iter_mut() {
        if let Some(position) = select_winner(group.assertions()) {
            group.set_winner(position);
        }
    }
}

/// Returns true if `assertion` comes from a different policy object than `winner`.
#[must_use]
pub fn is_conflicting(assertion: &SettingAssertion, winner: &SettingAssertion) -> bool {
    assertion.source_policy_id != winner.source_policy_id
}

#[cfg(test)]
mod tests {
    use crate::policy::PolicyLink;
    use crate::setting::SettingContext;

    use super::*;

    fn assertion(policy: &str, rank: i64, enforced: bool) -> SettingAssertion {
        let mut link = PolicyLink::new(policy, rank);
        link.enforced = enforced;
        SettingAssertion::from_link(
            &link,
            SettingContext::Machine,
            "K".to_string(),
            "V".to_string(),
            "REG_SZ".to_string(),
            policy.to_string(),
        )
    }

    #[test]
    fn lowest_rank_wins_regardless_of_position() {
        let a = assertion("r5", 5, false);
        let b = assertion("r1", 1, false);
        let c = assertion("r3", 3, false);
        assert_eq!(select_winner(&[&a, &b, &c]), Some(1));
    }

    #[test]
    fn ties_go_to_first_seen() {
        let a = assertion("first", 2, false);
        let b = assertion("second", 2, false);
        assert_eq!(select_winner(&[&a, &b]), Some(0));
    }

    #[test]
    fn enforced_flag_ignored() {
        let a = assertion("plain", 1, false);
        let b = assertion("enforced", 2, true);
        assert_eq!(select_winner(&[&a, &b]), Some(0));
    }

    #[test]
    fn empty_has_no_winner() {
        assert_eq!(select_winner(&[]), None);
    }

    #[test]
    fn conflict_flag_compares_policy() {
        let a = assertion("p", 1, false);
        let b = assertion("q", 2, false);
        assert!(!is_conflicting(&a, &a));
        assert!(is_conflicting(&b, &a));
    }
}
