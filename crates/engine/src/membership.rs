//! Membership reconciliation.
//!
//! When an expense's split or payer changes, the set of participants indexed
//! for it must follow. [`MembershipDelta::between`] compares the participant
//! set before and after the change and returns the rows to attach and detach.
//! Nobody still named by the new split or payer is ever detached.

use std::collections::BTreeSet;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MembershipDelta {
    pub to_add: BTreeSet<String>,
    pub to_remove: BTreeSet<String>,
}

impl MembershipDelta {
    pub fn between(existing: &BTreeSet<String>, updated: &BTreeSet<String>) -> Self {
        Self {
            to_add: updated.difference(existing).cloned().collect(),
            to_remove: existing
                .difference(updated)
                .filter(|id| !updated.contains(*id))
                .cloned()
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn replaced_participants_are_swapped() {
        let delta = MembershipDelta::between(&set(&["A", "B", "C"]), &set(&["B", "D"]));
        assert_eq!(delta.to_add, set(&["D"]));
        assert_eq!(delta.to_remove, set(&["A", "C"]));
    }

    #[test]
    fn unchanged_participants_produce_no_delta() {
        let delta = MembershipDelta::between(&set(&["A", "B"]), &set(&["B", "A"]));
        assert!(delta.is_empty());
    }

    #[test]
    fn fresh_expense_attaches_everyone() {
        let delta = MembershipDelta::between(&BTreeSet::new(), &set(&["A", "B"]));
        assert_eq!(delta.to_add, set(&["A", "B"]));
        assert!(delta.to_remove.is_empty());
    }

    #[test]
    fn retained_ids_are_never_removed() {
        let existing = set(&["A", "B", "C"]);
        let updated = set(&["C"]);
        let delta = MembershipDelta::between(&existing, &updated);
        assert!(delta.to_remove.is_disjoint(&updated));
        assert_eq!(delta.to_remove, set(&["A", "B"]));
    }
}
