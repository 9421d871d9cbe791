// ── Domain model ──

pub mod identity;
pub mod rule;

pub use identity::{
    CollectionIdentity, CollectionKind, ExtCommunityList, FirewallChain, IpProtocol,
    LocalRouteFamily, LocalRoutePolicy,
};
pub use rule::{Rule, RuleNumber, RulePayload, numbers_of};
