// Wire types for the appliance rule collection endpoints.
//
// Every response is wrapped in `{ success, data, error }`. Rules travel as
// flat JSON objects: `number` is the collection-scoped identifier, every
// other key belongs to the opaque payload.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Response envelope shared by every endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

/// A single rule as returned by the appliance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleRecord {
    pub number: u32,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// One renumbering instruction inside a reorder request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReorderEntry {
    pub old_number: u32,
    pub new_number: u32,
    pub rule_data: Map<String, Value>,
}

/// Body of `POST v1/firewall/{protocol}/chains/{chain}/rules/reorder`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainReorderRequest {
    pub custom: bool,
    pub rules: Vec<ReorderEntry>,
}

/// Body of the policy reorder endpoints (local-route and extcommunity-list).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyReorderRequest {
    pub rules: Vec<ReorderEntry>,
}
