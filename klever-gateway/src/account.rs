use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, instrument};

use crate::{
    error::GatewayError,
    network::{EndpointResolver, Network},
    relay::{NodeRelay, RelayError},
};

/// Number of transactions returned when the caller does not ask for a limit
pub const DEFAULT_TRANSACTION_LIMIT: u32 = 10;

/// Largest transaction page the gateway will request from the node
pub const MAX_TRANSACTION_LIMIT: u32 = 100;

/// Normalized account state as reported by the node
///
/// Balances are in minor units. `assets` is keyed by asset identifier and holds
/// the node's per-asset record untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountState {
    pub address: String,
    pub balance: u64,
    pub nonce: u64,
    pub assets: BTreeMap<String, Value>,
}

impl AccountState {
    /// State of an address the node has never seen
    pub fn empty(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            balance: 0,
            nonce: 0,
            assets: BTreeMap::new(),
        }
    }
}

/// Reads address-scoped state from the node's public API
///
/// Nothing is cached: every call goes to the node, which keeps nonces fresh for
/// the transaction builder.
#[derive(Clone)]
pub struct AccountStateAccessor {
    relay: Arc<dyn NodeRelay>,
    resolver: Arc<EndpointResolver>,
}

impl AccountStateAccessor {
    pub fn new(relay: Arc<dyn NodeRelay>, resolver: Arc<EndpointResolver>) -> Self {
        Self { relay, resolver }
    }

    /// Fetch and normalize the account state of `address`
    ///
    /// A 404 from the node means the address has never received funds and is
    /// returned as an empty account, not as an error. Any other failure is
    /// reported once, without retrying.
    ///
    /// # Arguments
    ///
    /// * `address` - Account address; only checked for emptiness
    /// * `network` - Network to query
    ///
    /// # Returns
    ///
    /// * `Result<AccountState, GatewayError>` - Normalized state or the upstream failure
    #[instrument(skip(self), err)]
    pub async fn fetch(&self, address: &str, network: Network) -> Result<AccountState, GatewayError> {
        let address = require_address(address)?;
        let url = self.resolver.account_url(network, address);

        match self.relay.get_json(&url).await {
            Ok(body) => parse_account(address, &body),
            Err(RelayError::Status { status: 404, .. }) => {
                info!("Address {} not found on {}, reporting empty account", address, network);
                Ok(AccountState::empty(address))
            }
            Err(e) => {
                error!("Account fetch for {} failed: {}", address, e);
                Err(e.into())
            }
        }
    }

    /// Fetch the per-asset balances of `address`
    ///
    /// Same 404 rule as [`fetch`](Self::fetch): an unknown address has no assets.
    #[instrument(skip(self), err)]
    pub async fn fetch_balances(
        &self,
        address: &str,
        network: Network,
    ) -> Result<BTreeMap<String, Value>, GatewayError> {
        let address = require_address(address)?;
        let url = self.resolver.account_assets_url(network, address);

        match self.relay.get_json(&url).await {
            Ok(body) => {
                let assets = body
                    .pointer("/data/assets")
                    .ok_or_else(|| GatewayError::MalformedResponse("missing data.assets".to_string()))?;
                Ok(normalize_assets(Some(assets)))
            }
            Err(RelayError::Status { status: 404, .. }) => {
                info!("Address {} not found on {}, reporting no assets", address, network);
                Ok(BTreeMap::new())
            }
            Err(e) => {
                error!("Balance fetch for {} failed: {}", address, e);
                Err(e.into())
            }
        }
    }

    /// List the most recent transactions of `address`
    ///
    /// New wallets have no history and the node answers 404 for them, which is
    /// returned as an empty list.
    #[instrument(skip(self), err)]
    pub async fn list_transactions(
        &self,
        address: &str,
        network: Network,
        limit: Option<u32>,
    ) -> Result<Vec<Value>, GatewayError> {
        let address = require_address(address)?;
        let limit = limit.unwrap_or(DEFAULT_TRANSACTION_LIMIT);
        if limit == 0 || limit > MAX_TRANSACTION_LIMIT {
            return Err(GatewayError::Validation(format!(
                "limit must be between 1 and {}",
                MAX_TRANSACTION_LIMIT
            )));
        }
        let url = self.resolver.transactions_url(network, address, limit);

        match self.relay.get_json(&url).await {
            Ok(body) => {
                let transactions = match body.pointer("/data/transactions") {
                    Some(Value::Array(records)) => records.clone(),
                    Some(Value::Null) => Vec::new(),
                    _ => {
                        return Err(GatewayError::MalformedResponse(
                            "missing data.transactions".to_string(),
                        ))
                    }
                };
                debug!("Node returned {} transactions for {}", transactions.len(), address);
                Ok(transactions)
            }
            Err(RelayError::Status { status: 404, .. }) => {
                info!("No transactions for {} on {}", address, network);
                Ok(Vec::new())
            }
            Err(e) => {
                error!("Transaction history fetch for {} failed: {}", address, e);
                Err(e.into())
            }
        }
    }
}

fn require_address(address: &str) -> Result<&str, GatewayError> {
    let address = address.trim();
    if address.is_empty() {
        return Err(GatewayError::Validation("Address is required".to_string()));
    }
    Ok(address)
}

fn parse_account(requested: &str, body: &Value) -> Result<AccountState, GatewayError> {
    let account = body
        .pointer("/data/account")
        .filter(|account| account.is_object())
        .ok_or_else(|| GatewayError::MalformedResponse("missing data.account".to_string()))?;

    let address = account
        .get("address")
        .and_then(Value::as_str)
        .filter(|address| !address.is_empty())
        .unwrap_or(requested);

    Ok(AccountState {
        address: address.to_string(),
        balance: read_u64(account, "balance")?,
        nonce: read_u64(account, "nonce")?,
        assets: normalize_assets(account.get("assets")),
    })
}

// The node reports assets either as an object keyed by asset id or as an array
// of records carrying `assetId`.
fn normalize_assets(assets: Option<&Value>) -> BTreeMap<String, Value> {
    match assets {
        Some(Value::Object(map)) => map
            .iter()
            .map(|(id, record)| (id.clone(), record.clone()))
            .collect(),
        Some(Value::Array(records)) => records
            .iter()
            .filter_map(|record| {
                let id = record.get("assetId").and_then(Value::as_str)?;
                Some((id.to_string(), record.clone()))
            })
            .collect(),
        _ => BTreeMap::new(),
    }
}

// Absent counts as zero; a value that is present must be an unsigned integer,
// either as a JSON number or a decimal string.
fn read_u64(account: &Value, field: &str) -> Result<u64, GatewayError> {
    let parsed = match account.get(field) {
        None | Some(Value::Null) => Some(0),
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        Some(_) => None,
    };
    parsed.ok_or_else(|| GatewayError::MalformedResponse(format!("invalid {}", field)))
}
