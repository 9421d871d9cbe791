// ── Rule domain type ──

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Collection-scoped rule number. Doubles as the remote identifier.
pub type RuleNumber = u32;

/// Opaque rule fields. Their meaning belongs to the collection type.
pub type RulePayload = Map<String, Value>;

/// A single rule inside an ordered collection.
///
/// Identity is the `number` alone, and only within one collection; two
/// rules in different collections may share a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub number: RuleNumber,
    #[serde(flatten)]
    pub payload: RulePayload,
}

impl Rule {
    pub fn new(number: RuleNumber, payload: RulePayload) -> Self {
        Self { number, payload }
    }

    /// Look up a payload field by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.payload.get(name)
    }
}

/// Extract the rule numbers of a sequence, in order.
pub fn numbers_of(rules: &[Rule]) -> Vec<RuleNumber> {
    rules.iter().map(|r| r.number).collect()
}
