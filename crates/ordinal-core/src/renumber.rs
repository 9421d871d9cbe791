// ── Renumbering transactions ──
//
// Turns a reordered working sequence into the (old, new, payload) triples
// the appliance applies as one unit. Pure and total: any pair of
// sequences yields a transaction.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::model::{Rule, RuleNumber, RulePayload};

/// How new rule numbers are assigned to the working order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NumberingPolicy {
    /// Reuse the exact set of original numbers, reassigned by position.
    ///
    /// Keeps every number slot valid for anything that references it.
    Permutation,
    /// Contiguous block starting at the smallest number in use.
    Compaction,
}

/// One renumbering instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenumberEntry {
    /// The rule's number before the transaction is applied.
    pub old_number: RuleNumber,
    pub new_number: RuleNumber,
    pub payload: RulePayload,
}

impl RenumberEntry {
    pub fn is_identity(&self) -> bool {
        self.old_number == self.new_number
    }
}

/// Ordered list of renumbering instructions, built fresh for each save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenumberTransaction {
    policy: Option<NumberingPolicy>,
    entries: Vec<RenumberEntry>,
}

impl RenumberTransaction {
    /// Build the transaction realising `working` under `policy`.
    ///
    /// `original` only feeds the permutation pool; compaction derives its
    /// base from `working`. Identity entries (`old == new`) are kept.
    pub fn build(policy: NumberingPolicy, original: &[Rule], working: &[Rule]) -> Self {
        let entries = match policy {
            NumberingPolicy::Permutation => permutation_entries(original, working),
            NumberingPolicy::Compaction => compaction_entries(working),
        };
        Self {
            policy: Some(policy),
            entries,
        }
    }

    pub fn policy(&self) -> Option<NumberingPolicy> {
        self.policy
    }

    pub fn entries(&self) -> &[RenumberEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<RenumberEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when applying the transaction would change nothing remotely.
    ///
    /// Covers the empty and single-rule cases as well as an unchanged
    /// order under either policy.
    pub fn is_noop(&self) -> bool {
        self.entries.iter().all(RenumberEntry::is_identity)
    }

    /// Number of entries that actually move a rule.
    pub fn changed_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_identity()).count()
    }
}

fn permutation_entries(original: &[Rule], working: &[Rule]) -> Vec<RenumberEntry> {
    let mut pool: Vec<RuleNumber> = original.iter().map(|r| r.number).collect();
    pool.sort_unstable();

    working
        .iter()
        .enumerate()
        .map(|(i, rule)| RenumberEntry {
            old_number: rule.number,
            // A working sequence is always a permutation of `original`, so the
            // pool never runs short; fall back to the current number if it does.
            new_number: pool.get(i).copied().unwrap_or(rule.number),
            payload: rule.payload.clone(),
        })
        .collect()
}

/// Contiguous block from the smallest number, slid down when it would run
/// past `RuleNumber::MAX`. Distinct numbers always fit above their minimum,
/// so the slide only matters for a sequence that repeats a number.
fn compaction_entries(working: &[Rule]) -> Vec<RenumberEntry> {
    let Some(lowest) = working.iter().map(|r| r.number).min() else {
        return Vec::new();
    };
    let span = RuleNumber::try_from(working.len() - 1).unwrap_or(RuleNumber::MAX);
    let base = lowest.min(RuleNumber::MAX - span);

    working
        .iter()
        .zip(base..=RuleNumber::MAX)
        .map(|(rule, new_number)| RenumberEntry {
            old_number: rule.number,
            new_number,
            payload: rule.payload.clone(),
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeSet;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn rule(number: RuleNumber, action: &str) -> Rule {
        let mut payload = RulePayload::new();
        payload.insert("action".into(), json!(action));
        Rule::new(number, payload)
    }

    fn pairs(tx: &RenumberTransaction) -> Vec<(RuleNumber, RuleNumber)> {
        tx.entries()
            .iter()
            .map(|e| (e.old_number, e.new_number))
            .collect()
    }

    fn reorder(rules: &[Rule], order: &[RuleNumber]) -> Vec<Rule> {
        order
            .iter()
            .map(|n| rules.iter().find(|r| r.number == *n).unwrap().clone())
            .collect()
    }

    #[test]
    fn permutation_example_from_chain() {
        let original = vec![rule(10, "accept"), rule(20, "drop"), rule(30, "reject")];
        let working = reorder(&original, &[30, 10, 20]);

        let tx = RenumberTransaction::build(NumberingPolicy::Permutation, &original, &working);

        assert_eq!(pairs(&tx), vec![(30, 10), (10, 20), (20, 30)]);
        assert_eq!(tx.entries()[0].payload.get("action"), Some(&json!("reject")));
        assert_eq!(tx.changed_count(), 3);
    }

    #[test]
    fn compaction_example_from_chain() {
        let original = vec![rule(10, "accept"), rule(20, "drop"), rule(30, "reject")];
        let working = reorder(&original, &[30, 10, 20]);

        let tx = RenumberTransaction::build(NumberingPolicy::Compaction, &original, &working);

        assert_eq!(pairs(&tx), vec![(30, 10), (10, 11), (20, 12)]);
    }

    #[test]
    fn permutation_preserves_number_set() {
        let original = vec![
            rule(5, "a"),
            rule(17, "b"),
            rule(18, "c"),
            rule(40, "d"),
            rule(99, "e"),
        ];
        let orders: [&[RuleNumber]; 3] = [
            &[99, 40, 18, 17, 5],
            &[17, 5, 99, 18, 40],
            &[40, 5, 17, 99, 18],
        ];

        for order in orders {
            let working = reorder(&original, order);
            let tx = RenumberTransaction::build(NumberingPolicy::Permutation, &original, &working);

            let new: BTreeSet<_> = tx.entries().iter().map(|e| e.new_number).collect();
            let expected: BTreeSet<_> = original.iter().map(|r| r.number).collect();
            assert_eq!(new, expected);

            let old: Vec<_> = tx.entries().iter().map(|e| e.old_number).collect();
            assert_eq!(old, order.to_vec());
        }
    }

    #[test]
    fn permutation_uses_sorted_pool_even_if_original_unsorted() {
        // Server truth is never assumed monotonic.
        let original = vec![rule(30, "a"), rule(10, "b"), rule(20, "c")];
        let working = reorder(&original, &[10, 20, 30]);

        let tx = RenumberTransaction::build(NumberingPolicy::Permutation, &original, &working);

        assert_eq!(pairs(&tx), vec![(10, 10), (20, 20), (30, 30)]);
        assert!(tx.is_noop());
    }

    #[test]
    fn compaction_is_contiguous_from_minimum() {
        let original = vec![rule(7, "a"), rule(12, "b"), rule(50, "c"), rule(51, "d")];
        let working = reorder(&original, &[50, 12, 51, 7]);

        let tx = RenumberTransaction::build(NumberingPolicy::Compaction, &original, &working);

        let new: Vec<_> = tx.entries().iter().map(|e| e.new_number).collect();
        assert_eq!(new, vec![7, 8, 9, 10]);
    }

    #[test]
    fn unchanged_order_is_identity_under_permutation() {
        let original = vec![rule(10, "a"), rule(20, "b"), rule(30, "c")];

        let tx = RenumberTransaction::build(NumberingPolicy::Permutation, &original, &original);

        assert!(tx.entries().iter().all(RenumberEntry::is_identity));
        assert_eq!(tx.len(), 3);
        assert!(tx.is_noop());
    }

    #[test]
    fn unchanged_contiguous_order_is_identity_under_compaction() {
        let original = vec![rule(1, "a"), rule(2, "b"), rule(3, "c")];

        let tx = RenumberTransaction::build(NumberingPolicy::Compaction, &original, &original);

        assert!(tx.is_noop());
    }

    #[test]
    fn compaction_of_gapped_list_is_not_noop() {
        let original = vec![rule(10, "a"), rule(20, "b")];

        let tx = RenumberTransaction::build(NumberingPolicy::Compaction, &original, &original);

        assert_eq!(pairs(&tx), vec![(10, 10), (20, 11)]);
        assert!(!tx.is_noop());
    }

    #[test]
    fn compaction_near_the_top_of_the_range_stays_unique() {
        let top = RuleNumber::MAX;
        let original = vec![rule(top - 1, "a"), rule(top, "b")];
        let working = reorder(&original, &[top, top - 1]);

        let tx = RenumberTransaction::build(NumberingPolicy::Compaction, &original, &working);
        assert_eq!(pairs(&tx), vec![(top, top - 1), (top - 1, top)]);

        // A console that repeats a number still gets distinct targets.
        let repeated = vec![rule(top, "a"), rule(top, "b"), rule(top - 1, "c")];
        let tx = RenumberTransaction::build(NumberingPolicy::Compaction, &repeated, &repeated);
        let new: Vec<_> = tx.entries().iter().map(|e| e.new_number).collect();
        assert_eq!(new, vec![top - 2, top - 1, top]);
    }

    #[test]
    fn empty_and_single_rule_are_noops() {
        let empty = RenumberTransaction::build(NumberingPolicy::Compaction, &[], &[]);
        assert!(empty.is_empty());
        assert!(empty.is_noop());

        let one = vec![rule(42, "a")];
        let single = RenumberTransaction::build(NumberingPolicy::Permutation, &one, &one);
        assert_eq!(pairs(&single), vec![(42, 42)]);
        assert!(single.is_noop());
    }

    #[test]
    fn new_numbers_never_collide() {
        let original = vec![rule(3, "a"), rule(1, "b"), rule(2, "c"), rule(9, "d")];
        let working = reorder(&original, &[9, 3, 2, 1]);

        for policy in [NumberingPolicy::Permutation, NumberingPolicy::Compaction] {
            let tx = RenumberTransaction::build(policy, &original, &working);
            let unique: BTreeSet<_> = tx.entries().iter().map(|e| e.new_number).collect();
            assert_eq!(unique.len(), tx.len(), "collision under {policy}");
            assert_eq!(tx.policy(), Some(policy));
        }
    }
}
