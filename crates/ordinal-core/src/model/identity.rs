// ── Rule collection identities ──
//
// Each feature area contributes only the shape of its identity and the
// numbering policy tag; the reorder machinery is generic over them.

use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::renumber::NumberingPolicy;

/// Which family of ordered collection an identity belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum CollectionKind {
    FirewallChain,
    LocalRoutePolicy,
    ExtCommunityList,
}

impl CollectionKind {
    /// Firewall chains keep their number slots; policy lists compact.
    pub const fn numbering_policy(self) -> NumberingPolicy {
        match self {
            Self::FirewallChain => NumberingPolicy::Permutation,
            Self::LocalRoutePolicy | Self::ExtCommunityList => NumberingPolicy::Compaction,
        }
    }
}

/// A value naming exactly one ordered rule collection.
///
/// Two identities compare equal iff they address the same remote
/// collection. A reorder session is bound to one identity for its whole
/// lifetime.
pub trait CollectionIdentity:
    Clone + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    const KIND: CollectionKind;

    fn numbering_policy(&self) -> NumberingPolicy {
        Self::KIND.numbering_policy()
    }
}

// ── Firewall chains ──────────────────────────────────────────────────

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
    AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum IpProtocol {
    #[default]
    Ipv4,
    Ipv6,
}

/// A firewall chain: built-in (`INPUT`, `FORWARD`, ...) or user-defined.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FirewallChain {
    pub protocol: IpProtocol,
    pub chain: String,
    pub custom: bool,
}

impl FirewallChain {
    pub fn new(protocol: IpProtocol, chain: impl Into<String>, custom: bool) -> Self {
        Self {
            protocol,
            chain: chain.into(),
            custom,
        }
    }
}

impl fmt::Display for FirewallChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scope = if self.custom { "custom chain" } else { "chain" };
        write!(f, "{} {scope} {}", self.protocol, self.chain)
    }
}

impl CollectionIdentity for FirewallChain {
    const KIND: CollectionKind = CollectionKind::FirewallChain;
}

// ── Local-route policies ─────────────────────────────────────────────

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
    AsRefStr,
)]
pub enum LocalRouteFamily {
    #[default]
    #[strum(serialize = "local-route")]
    #[serde(rename = "local-route")]
    Ipv4,
    #[strum(serialize = "local-route6")]
    #[serde(rename = "local-route6")]
    Ipv6,
}

/// A policy-based routing list (`policy local-route` / `local-route6`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalRoutePolicy {
    pub family: LocalRouteFamily,
    pub name: String,
}

impl LocalRoutePolicy {
    pub fn new(family: LocalRouteFamily, name: impl Into<String>) -> Self {
        Self {
            family,
            name: name.into(),
        }
    }
}

impl fmt::Display for LocalRoutePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.family, self.name)
    }
}

impl CollectionIdentity for LocalRoutePolicy {
    const KIND: CollectionKind = CollectionKind::LocalRoutePolicy;
}

// ── Extended community lists ─────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExtCommunityList {
    pub name: String,
}

impl ExtCommunityList {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for ExtCommunityList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "extcommunity-list {}", self.name)
    }
}

impl CollectionIdentity for ExtCommunityList {
    const KIND: CollectionKind = CollectionKind::ExtCommunityList;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_follows_collection_kind() {
        let chain = FirewallChain::new(IpProtocol::Ipv4, "FORWARD", false);
        let route = LocalRoutePolicy::new(LocalRouteFamily::Ipv6, "lab");
        let list = ExtCommunityList::new("PEERS");

        assert_eq!(chain.numbering_policy(), NumberingPolicy::Permutation);
        assert_eq!(route.numbering_policy(), NumberingPolicy::Compaction);
        assert_eq!(list.numbering_policy(), NumberingPolicy::Compaction);
    }

    #[test]
    fn custom_flag_distinguishes_chains() {
        let builtin = FirewallChain::new(IpProtocol::Ipv4, "WAN_IN", false);
        let custom = FirewallChain::new(IpProtocol::Ipv4, "WAN_IN", true);
        assert_ne!(builtin, custom);
        assert_eq!(custom.to_string(), "ipv4 custom chain WAN_IN");
    }

    #[test]
    fn wire_names() {
        assert_eq!(LocalRouteFamily::Ipv6.as_ref(), "local-route6");
        assert_eq!(IpProtocol::Ipv6.as_ref(), "ipv6");
        assert_eq!(CollectionKind::ExtCommunityList.to_string(), "ext-community-list");
        assert_eq!(
            "local-route".parse::<LocalRouteFamily>().ok(),
            Some(LocalRouteFamily::Ipv4)
        );
    }
}
