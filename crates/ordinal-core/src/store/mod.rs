// ── Ordered rule stores ──
//
// One store per collection kind. `StoredCollection` lets generic code
// find the right store from the identity type alone.

mod rule_store;
mod stream;

use std::sync::Arc;

pub use rule_store::{RefreshSummary, RuleStore};
pub use stream::RuleStream;

use crate::model::{CollectionIdentity, ExtCommunityList, FirewallChain, LocalRoutePolicy};

/// Every store the console keeps.
#[derive(Default)]
pub struct RuleStores {
    pub firewall_chains: Arc<RuleStore<FirewallChain>>,
    pub local_routes: Arc<RuleStore<LocalRoutePolicy>>,
    pub ext_community_lists: Arc<RuleStore<ExtCommunityList>>,
}

impl RuleStores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of<I: StoredCollection>(&self) -> &Arc<RuleStore<I>> {
        I::store_in(self)
    }
}

/// An identity type with a dedicated store in [`RuleStores`].
pub trait StoredCollection: CollectionIdentity {
    fn store_in(stores: &RuleStores) -> &Arc<RuleStore<Self>>;
}

impl StoredCollection for FirewallChain {
    fn store_in(stores: &RuleStores) -> &Arc<RuleStore<Self>> {
        &stores.firewall_chains
    }
}

impl StoredCollection for LocalRoutePolicy {
    fn store_in(stores: &RuleStores) -> &Arc<RuleStore<Self>> {
        &stores.local_routes
    }
}

impl StoredCollection for ExtCommunityList {
    fn store_in(stores: &RuleStores) -> &Arc<RuleStore<Self>> {
        &stores.ext_community_lists
    }
}
