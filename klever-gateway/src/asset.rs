use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::{
    error::GatewayError,
    network::{EndpointResolver, Network},
    relay::NodeRelay,
};

/// Looks up asset metadata across the candidate endpoint shapes
///
/// Candidates are tried one at a time in the resolver's order and the first
/// 2xx answer wins. Probing is sequential and stops at the first hit.
#[derive(Clone)]
pub struct AssetProber {
    relay: Arc<dyn NodeRelay>,
    resolver: Arc<EndpointResolver>,
}

impl AssetProber {
    pub fn new(relay: Arc<dyn NodeRelay>, resolver: Arc<EndpointResolver>) -> Self {
        Self { relay, resolver }
    }

    /// Fetch the metadata of `asset_id`, returning the node's JSON untouched
    ///
    /// Individual candidate failures are only logged. When every candidate
    /// fails, a single `AssetNotFound` naming the asset is returned.
    #[instrument(skip(self), err)]
    pub async fn lookup(&self, asset_id: &str, network: Network) -> Result<Value, GatewayError> {
        let asset_id = asset_id.trim();
        if asset_id.is_empty() {
            return Err(GatewayError::Validation("Asset ID is required".to_string()));
        }

        let candidates = self.resolver.asset_candidates(network, asset_id);
        let total = candidates.len();

        for (attempt, url) in candidates.iter().enumerate() {
            debug!("Probing asset endpoint {}/{}: {}", attempt + 1, total, url);
            match self.relay.get_json(url).await {
                Ok(asset) => {
                    info!("Asset {} resolved via {}", asset_id, url);
                    return Ok(asset);
                }
                Err(e) => warn!(status = ?e.status(), "Asset endpoint {} failed: {}", url, e),
            }
        }

        Err(GatewayError::AssetNotFound {
            asset_id: asset_id.to_string(),
        })
    }
}
