use eyre::{eyre, Result, WrapErr};
use serde::Deserialize;
use url::Url;

use crate::{
    network::{EndpointResolver, Network, NetworkProfile},
    transaction::FeeSchedule,
};

/// Service configuration structure
///
/// Loaded from `GATEWAY_`-prefixed environment variables (and a `.env` file in
/// development) on top of the defaults below.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Host address to bind the server to (default: 127.0.0.1)
    pub host: String,

    /// Port to listen on (default: 8080)
    pub port: u16,

    /// Number of HTTP worker threads (default: 4)
    pub workers: usize,

    /// Network used when a request does not name one (default: mainnet)
    pub default_network: String,

    /// Domain suffix every node URL is derived from (default: klever.org)
    pub node_domain: String,

    pub mainnet_chain_id: String,
    pub testnet_chain_id: String,

    /// KApp fee attached to built transactions
    pub kapp_fee: u64,

    /// Bandwidth fee attached to built transactions
    pub bandwidth_fee: u64,

    // Explicit URL overrides, mainly for local nodes and tests.
    #[serde(default)]
    pub mainnet_api_url: Option<String>,
    #[serde(default)]
    pub testnet_api_url: Option<String>,
    #[serde(default)]
    pub mainnet_node_url: Option<String>,
    #[serde(default)]
    pub testnet_node_url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// # Returns
    ///
    /// * `Result<Self>` - Configuration structure or error
    ///
    /// # Environment Variables
    ///
    /// * `GATEWAY_HOST` - Server host address (default: "127.0.0.1")
    /// * `GATEWAY_PORT` - Server port (default: 8080)
    /// * `GATEWAY_WORKERS` - HTTP worker threads (default: 4)
    /// * `GATEWAY_DEFAULT_NETWORK` - "mainnet" or "testnet" (default: "mainnet")
    /// * `GATEWAY_NODE_DOMAIN` - Node domain suffix (default: "klever.org")
    /// * `GATEWAY_MAINNET_CHAIN_ID` / `GATEWAY_TESTNET_CHAIN_ID` - Chain ids (default: "100420" / "109")
    /// * `GATEWAY_KAPP_FEE` / `GATEWAY_BANDWIDTH_FEE` - Transaction fees (default: 30000000 / 1000000)
    /// * `GATEWAY_{MAINNET,TESTNET}_{API,NODE}_URL` - Optional base URL overrides
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists (useful for development)
        let _ = dotenv::dotenv();

        let fees = FeeSchedule::default();
        let settings = config::Config::builder()
            .set_default("host", "127.0.0.1")?
            .set_default("port", 8080_i64)?
            .set_default("workers", 4_i64)?
            .set_default("default_network", Network::Mainnet.as_str())?
            .set_default("node_domain", "klever.org")?
            .set_default("mainnet_chain_id", "100420")?
            .set_default("testnet_chain_id", "109")?
            .set_default("kapp_fee", fees.kapp_fee as i64)?
            .set_default("bandwidth_fee", fees.bandwidth_fee as i64)?
            .add_source(config::Environment::with_prefix("GATEWAY"))
            .build()
            .wrap_err("Failed to read configuration")?;

        settings
            .try_deserialize()
            .wrap_err("Invalid configuration")
    }

    /// Configured default network
    ///
    /// Unlike request selectors, an unknown value here is a startup error.
    pub fn default_network(&self) -> Result<Network> {
        self.default_network
            .parse::<Network>()
            .map_err(|e: String| eyre!("GATEWAY_DEFAULT_NETWORK: {}", e))
    }

    pub fn fee_schedule(&self) -> FeeSchedule {
        FeeSchedule {
            kapp_fee: self.kapp_fee,
            bandwidth_fee: self.bandwidth_fee,
        }
    }

    /// Build the endpoint resolver for both networks
    pub fn endpoint_resolver(&self) -> Result<EndpointResolver> {
        let mainnet = self.profile(
            Network::Mainnet,
            &self.mainnet_chain_id,
            self.mainnet_api_url.as_deref(),
            self.mainnet_node_url.as_deref(),
        )?;
        let testnet = self.profile(
            Network::Testnet,
            &self.testnet_chain_id,
            self.testnet_api_url.as_deref(),
            self.testnet_node_url.as_deref(),
        )?;

        Ok(EndpointResolver::new(mainnet, testnet, self.default_network()?))
    }

    fn profile(
        &self,
        network: Network,
        chain_id: &str,
        api_override: Option<&str>,
        node_override: Option<&str>,
    ) -> Result<NetworkProfile> {
        let mut profile = NetworkProfile::from_domain(network, &self.node_domain, chain_id)
            .wrap_err_with(|| format!("Invalid node domain '{}'", self.node_domain))?;

        if let Some(url) = api_override {
            profile.api_url = parse_base_url(url)?;
        }
        if let Some(url) = node_override {
            profile.node_url = parse_base_url(url)?;
        }
        Ok(profile)
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).wrap_err_with(|| format!("Invalid URL '{}'", raw))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(eyre!("URL '{}' must be an http(s) base URL", raw));
    }
    Ok(url)
}
