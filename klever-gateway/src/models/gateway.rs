use std::collections::BTreeMap;

use serde::{ser::SerializeStruct, Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::{account::AccountState, network::Network, transaction::UnsignedTransaction};

/// Uniform result shape returned to gateway callers
///
/// Serializes as `{"success": true, "data": ...}` or
/// `{"success": false, "error": "...", "httpStatus": N}`.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayResult<T> {
    Success(T),
    Failure { error: String, http_status: u16 },
}

impl<T> GatewayResult<T> {
    pub fn success(data: T) -> Self {
        GatewayResult::Success(data)
    }

    pub fn failure(error: impl Into<String>, http_status: u16) -> Self {
        GatewayResult::Failure {
            error: error.into(),
            http_status,
        }
    }
}

impl<T: Serialize> Serialize for GatewayResult<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            GatewayResult::Success(data) => {
                let mut state = serializer.serialize_struct("GatewayResult", 2)?;
                state.serialize_field("success", &true)?;
                state.serialize_field("data", data)?;
                state.end()
            }
            GatewayResult::Failure { error, http_status } => {
                let mut state = serializer.serialize_struct("GatewayResult", 3)?;
                state.serialize_field("success", &false)?;
                state.serialize_field("error", error)?;
                state.serialize_field("httpStatus", http_status)?;
                state.end()
            }
        }
    }
}

/// Query for address-scoped reads (`/api/account`, `/api/balance`)
#[derive(Debug, Deserialize)]
pub struct AddressQuery {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub network: Option<String>,
}

/// Query for `/api/transactions`
#[derive(Debug, Deserialize)]
pub struct TransactionsQuery {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub network: Option<String>,
    /// Number of transactions to return (default 10)
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Query for `/api/asset`
#[derive(Debug, Deserialize)]
pub struct AssetQuery {
    #[serde(default, rename = "assetId")]
    pub asset_id: Option<String>,
    #[serde(default)]
    pub network: Option<String>,
}

/// Body of `POST /api/swap/build`
///
/// Every field is optional at the wire level so that a missing field surfaces
/// as a validation failure rather than a deserialization error.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRequest {
    #[serde(default)]
    pub wallet_address: Option<String>,
    #[serde(default)]
    pub contract_address: Option<String>,
    #[serde(default)]
    pub function_name: Option<String>,
    #[serde(default)]
    pub asset_id: Option<String>,
    /// Amount in the asset's minor units
    #[serde(default)]
    pub amount: Option<u64>,
    #[serde(default)]
    pub network: Option<String>,
}

/// Body of `POST /api/swap/broadcast`
#[derive(Debug, Default, Clone, Deserialize)]
pub struct BroadcastRequest {
    /// Signed transaction produced by the external wallet, relayed untouched
    #[serde(default, rename = "signedTx")]
    pub signed_tx: Option<Value>,
    #[serde(default)]
    pub network: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AccountEnvelope {
    pub account: AccountState,
}

#[derive(Debug, Serialize)]
pub struct BalancesEnvelope {
    pub address: String,
    pub assets: BTreeMap<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct TransactionsEnvelope {
    pub address: String,
    pub transactions: Vec<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildResponse {
    pub success: bool,
    pub unsigned_tx: UnsignedTransaction,
    pub nonce: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastResponse {
    pub success: bool,
    pub tx_hash: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub default_network: Network,
    /// Public API base URL per network
    pub networks: BTreeMap<&'static str, String>,
}
