// ── Wire ↔ domain conversions ──

use ordinal_api::types::{ReorderEntry, RuleRecord};

use crate::model::Rule;
use crate::renumber::{RenumberEntry, RenumberTransaction};

impl From<RuleRecord> for Rule {
    fn from(record: RuleRecord) -> Self {
        Rule::new(record.number, record.fields)
    }
}

impl From<&RenumberEntry> for ReorderEntry {
    fn from(entry: &RenumberEntry) -> Self {
        ReorderEntry {
            old_number: entry.old_number,
            new_number: entry.new_number,
            rule_data: entry.payload.clone(),
        }
    }
}

/// Wire entries for a transaction, in transaction order.
pub(crate) fn reorder_entries(transaction: &RenumberTransaction) -> Vec<ReorderEntry> {
    transaction
        .entries()
        .iter()
        .map(ReorderEntry::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::{Map, json};

    use super::*;
    use crate::renumber::NumberingPolicy;

    #[test]
    fn record_fields_become_payload() {
        let mut fields = Map::new();
        fields.insert("action".into(), json!("accept"));
        let rule = Rule::from(RuleRecord { number: 7, fields });

        assert_eq!(rule.number, 7);
        assert_eq!(rule.field("action"), Some(&json!("accept")));
    }

    #[test]
    fn entries_keep_transaction_order() {
        let rules: Vec<Rule> = [3, 1, 2]
            .into_iter()
            .map(|n| Rule::new(n, Map::new()))
            .collect();
        let tx = RenumberTransaction::build(NumberingPolicy::Compaction, &rules, &rules);

        let wire = reorder_entries(&tx);
        let pairs: Vec<_> = wire.iter().map(|e| (e.old_number, e.new_number)).collect();
        assert_eq!(pairs, vec![(3, 1), (1, 2), (2, 3)]);
    }
}
