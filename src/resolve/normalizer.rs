use crate::policy::PolicyLink;

/// Filters and orders a scope's raw link list.
///
/// Disabled links are dropped; with `enforced_only`, so are non-enforced
/// ones. Survivors are sorted ascending by precedence rank. The sort is
/// stable: equal ranks keep their input order.
#[must_use]
pub fn normalize_links(links: Vec<PolicyLink>, enforced_only: bool) -> Vec<PolicyLink> {
    let mut active: Vec<PolicyLink> = links
        .into_iter()
        .filter(|link| link.enabled && (!enforced_only || link.enforced))
        .collect();
    active.sort_by_key(|link| link.precedence_rank);
    active
}
