// ── Reorder protocol client ──
//
// The seam between the reorder machinery and the remote store. Each
// collection kind supplies its own fetch and submit calls; everything
// above this trait is collection-agnostic.

use std::future::Future;
use std::sync::Arc;

use ordinal_api::ConsoleClient;
use ordinal_api::types::{ChainReorderRequest, PolicyReorderRequest};
use tracing::debug;

use crate::convert::reorder_entries;
use crate::error::CoreError;
use crate::model::{CollectionIdentity, ExtCommunityList, FirewallChain, LocalRoutePolicy, Rule};
use crate::renumber::RenumberTransaction;

/// Remote operations needed to edit one kind of ordered collection.
///
/// `submit_reorder` sends the whole transaction as one request. It never
/// retries and never splits the transaction; failures come back verbatim.
pub trait RuleBackend<I: CollectionIdentity>: Send + Sync {
    fn fetch_rules(
        &self,
        identity: &I,
        force_refresh: bool,
    ) -> impl Future<Output = Result<Vec<Rule>, CoreError>> + Send;

    fn submit_reorder(
        &self,
        identity: &I,
        transaction: &RenumberTransaction,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;
}

/// [`RuleBackend`] over the appliance HTTP API.
#[derive(Clone)]
pub struct ApiBackend {
    client: Arc<ConsoleClient>,
}

impl ApiBackend {
    pub fn new(client: Arc<ConsoleClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ConsoleClient {
        &self.client
    }
}

impl RuleBackend<FirewallChain> for ApiBackend {
    async fn fetch_rules(
        &self,
        identity: &FirewallChain,
        force_refresh: bool,
    ) -> Result<Vec<Rule>, CoreError> {
        let records = self
            .client
            .list_chain_rules(
                identity.protocol.as_ref(),
                &identity.chain,
                identity.custom,
                force_refresh,
            )
            .await?;
        Ok(records.into_iter().map(Rule::from).collect())
    }

    async fn submit_reorder(
        &self,
        identity: &FirewallChain,
        transaction: &RenumberTransaction,
    ) -> Result<(), CoreError> {
        debug!(collection = %identity, entries = transaction.len(), "submitting chain reorder");
        let body = ChainReorderRequest {
            custom: identity.custom,
            rules: reorder_entries(transaction),
        };
        self.client
            .reorder_chain_rules(identity.protocol.as_ref(), &identity.chain, &body)
            .await?;
        Ok(())
    }
}

impl RuleBackend<LocalRoutePolicy> for ApiBackend {
    async fn fetch_rules(
        &self,
        identity: &LocalRoutePolicy,
        force_refresh: bool,
    ) -> Result<Vec<Rule>, CoreError> {
        let records = self
            .client
            .list_policy_rules(identity.family.as_ref(), &identity.name, force_refresh)
            .await?;
        Ok(records.into_iter().map(Rule::from).collect())
    }

    async fn submit_reorder(
        &self,
        identity: &LocalRoutePolicy,
        transaction: &RenumberTransaction,
    ) -> Result<(), CoreError> {
        debug!(collection = %identity, entries = transaction.len(), "submitting policy reorder");
        let body = PolicyReorderRequest {
            rules: reorder_entries(transaction),
        };
        self.client
            .reorder_policy_rules(identity.family.as_ref(), &identity.name, &body)
            .await?;
        Ok(())
    }
}

impl RuleBackend<ExtCommunityList> for ApiBackend {
    async fn fetch_rules(
        &self,
        identity: &ExtCommunityList,
        force_refresh: bool,
    ) -> Result<Vec<Rule>, CoreError> {
        let records = self
            .client
            .list_extcommunity_rules(&identity.name, force_refresh)
            .await?;
        Ok(records.into_iter().map(Rule::from).collect())
    }

    async fn submit_reorder(
        &self,
        identity: &ExtCommunityList,
        transaction: &RenumberTransaction,
    ) -> Result<(), CoreError> {
        debug!(collection = %identity, entries = transaction.len(), "submitting list reorder");
        let body = PolicyReorderRequest {
            rules: reorder_entries(transaction),
        };
        self.client
            .reorder_extcommunity_rules(&identity.name, &body)
            .await?;
        Ok(())
    }
}
