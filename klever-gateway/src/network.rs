use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::warn;
use url::Url;

/// Deployment of the Klever node family a request is addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            other => Err(format!("Unknown network: {}", other)),
        }
    }
}

/// Base URLs and chain parameters of a single network
///
/// `api_url` serves the public read API (accounts, assets, history) and
/// `node_url` accepts signed transactions.
#[derive(Debug, Clone)]
pub struct NetworkProfile {
    pub api_url: Url,
    pub node_url: Url,
    pub chain_id: String,
}

impl NetworkProfile {
    pub fn new(api_url: Url, node_url: Url, chain_id: impl Into<String>) -> Self {
        Self {
            api_url,
            node_url,
            chain_id: chain_id.into(),
        }
    }

    /// Derive both base URLs of `network` from one domain suffix
    ///
    /// Every endpoint of a network is derived from the same suffix so the API
    /// and broadcast hosts can never drift apart.
    ///
    /// # Arguments
    ///
    /// * `network` - Network whose hosts are derived
    /// * `domain` - Domain suffix shared by the node family (e.g. `klever.org`)
    /// * `chain_id` - Chain identifier embedded in unsigned transactions
    ///
    /// # Returns
    ///
    /// * `Result<Self, url::ParseError>` - The profile, or an error if the domain yields an invalid URL
    pub fn from_domain(
        network: Network,
        domain: &str,
        chain_id: impl Into<String>,
    ) -> Result<Self, url::ParseError> {
        let api_url = Url::parse(&format!("https://api.{}.{}", network, domain))?;
        let node_url = Url::parse(&format!("https://node.{}.{}", network, domain))?;
        Ok(Self::new(api_url, node_url, chain_id))
    }
}

/// Maps a network selector to the node URLs a request should use
///
/// The resolver is built once from configuration and shared read-only between
/// requests. It never fails: every method only computes URLs.
#[derive(Debug, Clone)]
pub struct EndpointResolver {
    mainnet: NetworkProfile,
    testnet: NetworkProfile,
    default_network: Network,
}

impl EndpointResolver {
    pub fn new(mainnet: NetworkProfile, testnet: NetworkProfile, default_network: Network) -> Self {
        Self {
            mainnet,
            testnet,
            default_network,
        }
    }

    pub fn default_network(&self) -> Network {
        self.default_network
    }

    /// Pick the network for a request
    ///
    /// An absent selector uses the configured default. Anything that is not a
    /// recognized network name falls back to mainnet, never to testnet.
    pub fn select(&self, requested: Option<&str>) -> Network {
        match requested {
            None => self.default_network,
            Some(value) if value.trim().is_empty() => self.default_network,
            Some(value) => value.parse::<Network>().unwrap_or_else(|_| {
                warn!("Unrecognized network '{}', falling back to mainnet", value);
                Network::Mainnet
            }),
        }
    }

    pub fn profile(&self, network: Network) -> &NetworkProfile {
        match network {
            Network::Mainnet => &self.mainnet,
            Network::Testnet => &self.testnet,
        }
    }

    /// `{api}/v1.0/address/{address}`
    pub fn account_url(&self, network: Network, address: &str) -> Url {
        with_segments(&self.profile(network).api_url, &["v1.0", "address", address])
    }

    /// `{api}/v1.0/address/{address}/assets`
    pub fn account_assets_url(&self, network: Network, address: &str) -> Url {
        with_segments(
            &self.profile(network).api_url,
            &["v1.0", "address", address, "assets"],
        )
    }

    /// `{api}/v1.0/transaction/list/{address}?limit={limit}`
    pub fn transactions_url(&self, network: Network, address: &str, limit: u32) -> Url {
        let mut url = with_segments(
            &self.profile(network).api_url,
            &["v1.0", "transaction", "list", address],
        );
        url.query_pairs_mut().append_pair("limit", &limit.to_string());
        url
    }

    /// Candidate URLs for an asset lookup, in probing order
    ///
    /// The asset resource has been served under several path shapes, so the
    /// prober tries them in this fixed order:
    ///
    /// 1. `{api}/v1.0/assets/{id}`
    /// 2. `{api}/v1.0/asset/{id}`
    /// 3. `{api}/assets/{id}`
    /// 4. `{api}/asset/{id}`
    pub fn asset_candidates(&self, network: Network, asset_id: &str) -> Vec<Url> {
        let base = &self.profile(network).api_url;
        vec![
            with_segments(base, &["v1.0", "assets", asset_id]),
            with_segments(base, &["v1.0", "asset", asset_id]),
            with_segments(base, &["assets", asset_id]),
            with_segments(base, &["asset", asset_id]),
        ]
    }

    /// `{node}/transaction/broadcast`
    pub fn broadcast_url(&self, network: Network) -> Url {
        with_segments(&self.profile(network).node_url, &["transaction", "broadcast"])
    }
}

// Appends path segments, percent-encoding each one so user input can never
// escape its segment.
fn with_segments(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}
