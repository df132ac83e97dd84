use std::sync::Arc;

use crate::{
    account::AccountStateAccessor,
    asset::AssetProber,
    broadcast::Broadcaster,
    network::EndpointResolver,
    relay::NodeRelay,
    transaction::{FeeSchedule, TransactionBuilder},
};

/// Gateway service bundling every node-facing component
///
/// Holds no per-request state; one instance is shared by all HTTP workers.
#[derive(Clone)]
pub struct Gateway {
    /// Endpoint resolver, also used by handlers to pick the request network
    pub resolver: Arc<EndpointResolver>,
    pub accounts: AccountStateAccessor,
    pub assets: AssetProber,
    pub builder: TransactionBuilder,
    pub broadcaster: Broadcaster,
}

impl Gateway {
    /// Wire the components around a single relay and resolver
    ///
    /// # Arguments
    ///
    /// * `relay` - Relay executing every outbound node call
    /// * `resolver` - Endpoint resolver built from configuration
    /// * `fees` - Fees embedded in assembled transactions
    pub fn new(relay: Arc<dyn NodeRelay>, resolver: EndpointResolver, fees: FeeSchedule) -> Self {
        let resolver = Arc::new(resolver);
        let accounts = AccountStateAccessor::new(relay.clone(), resolver.clone());

        Self {
            assets: AssetProber::new(relay.clone(), resolver.clone()),
            builder: TransactionBuilder::new(accounts.clone(), resolver.clone(), fees),
            broadcaster: Broadcaster::new(relay, resolver.clone()),
            accounts,
            resolver,
        }
    }
}
