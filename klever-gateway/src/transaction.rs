use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use prost::Message;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::{
    account::AccountStateAccessor,
    error::GatewayError,
    models::gateway::BuildRequest,
    network::{EndpointResolver, Network},
};

/// Contract type of a smart-contract call in the node's transaction model
pub const SMART_CONTRACT_TYPE: i32 = 23;

/// Protobuf type URL of the smart-contract parameter
pub const SMART_CONTRACT_TYPE_URL: &str = "type.googleapis.com/proto.SmartContract";

/// Transaction format version understood by the node
pub const TX_VERSION: u32 = 1;

/// `SmartContract.type` value for invoking a deployed contract
const INVOKE_CALL_TYPE: i32 = 0;

/// Fees attached to every assembled transaction, in minor units of the native coin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeSchedule {
    pub kapp_fee: u64,
    pub bandwidth_fee: u64,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            kapp_fee: 30_000_000,
            bandwidth_fee: 1_000_000,
        }
    }
}

/// Validated inputs of a smart-contract invocation
///
/// Construction checks that every field is present and that both addresses
/// decode, so nothing reaches the network with unusable input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeParams {
    pub sender: String,
    pub contract: String,
    pub function: String,
    pub asset_id: String,
    /// Amount in the asset's minor units
    pub amount: u64,
    sender_key: Vec<u8>,
    contract_key: Vec<u8>,
}

impl InvokeParams {
    /// Validate a build request
    ///
    /// All missing fields are reported together so the caller can fix them in
    /// one round trip.
    pub fn from_request(request: &BuildRequest) -> Result<Self, GatewayError> {
        let mut missing = Vec::new();
        let sender = required(&request.wallet_address, "walletAddress", &mut missing);
        let contract = required(&request.contract_address, "contractAddress", &mut missing);
        let function = required(&request.function_name, "functionName", &mut missing);
        let asset_id = required(&request.asset_id, "assetId", &mut missing);
        if request.amount.is_none() {
            missing.push("amount");
        }

        if !missing.is_empty() {
            return Err(GatewayError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        let amount = request.amount.unwrap_or_default();
        if amount == 0 {
            return Err(GatewayError::Validation(
                "amount must be greater than zero".to_string(),
            ));
        }

        let sender = sender.unwrap_or_default().to_string();
        let contract = contract.unwrap_or_default().to_string();

        Ok(Self {
            sender_key: decode_address("walletAddress", &sender)?,
            contract_key: decode_address("contractAddress", &contract)?,
            sender,
            contract,
            function: function.unwrap_or_default().to_string(),
            asset_id: asset_id.unwrap_or_default().to_string(),
            amount,
        })
    }
}

fn required<'a>(
    value: &'a Option<String>,
    name: &'static str,
    missing: &mut Vec<&'static str>,
) -> Option<&'a str> {
    let value = value.as_deref().map(str::trim).filter(|v| !v.is_empty());
    if value.is_none() {
        missing.push(name);
    }
    value
}

fn decode_address(field: &str, address: &str) -> Result<Vec<u8>, GatewayError> {
    let (_hrp, key) = bech32::decode(address)
        .map_err(|e| GatewayError::Validation(format!("Invalid {}: {}", field, e)))?;
    Ok(key)
}

/// Protobuf `SmartContract` message carried as the contract parameter
///
/// `type` is optional on the wire model so the invoke value 0 is still emitted.
#[derive(Clone, PartialEq, Message)]
pub struct SmartContract {
    #[prost(int32, optional, tag = "1")]
    pub r#type: Option<i32>,
    #[prost(bytes = "vec", tag = "2")]
    pub address: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub call_data: Vec<u8>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct CallData<'a> {
    call_type: &'static str,
    function: &'a str,
    transfers: [Transfer<'a>; 1],
}

#[derive(Serialize)]
struct Transfer<'a> {
    #[serde(rename = "AssetID")]
    asset_id: &'a str,
    #[serde(rename = "Amount")]
    amount: u64,
}

/// Unsigned transaction in the shape the external wallet signs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnsignedTransaction {
    #[serde(rename = "RawData")]
    pub raw_data: RawData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawData {
    pub nonce: u64,
    /// Base64 of the sender's decoded address bytes
    pub sender: String,
    pub contract: Vec<ContractEntry>,
    #[serde(rename = "KAppFee")]
    pub kapp_fee: u64,
    pub bandwidth_fee: u64,
    pub version: u32,
    /// Plain chain id string, not base64
    #[serde(rename = "ChainID")]
    pub chain_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractEntry {
    #[serde(rename = "Type")]
    pub contract_type: i32,
    #[serde(rename = "Parameter")]
    pub parameter: ContractParameter,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractParameter {
    pub type_url: String,
    /// Base64 of the encoded `SmartContract` message
    pub value: String,
}

/// Assemble the unsigned invoke transaction for `params` at `nonce`
///
/// Pure and deterministic: identical inputs always serialize to identical bytes.
///
/// # Arguments
///
/// * `params` - Validated invocation inputs
/// * `nonce` - Sender nonce freshly read from the node
/// * `chain_id` - Chain id of the target network
/// * `fees` - Fee schedule to embed
///
/// # Returns
///
/// * `Result<UnsignedTransaction, GatewayError>` - The transaction or an encoding error
pub fn assemble_unsigned(
    params: &InvokeParams,
    nonce: u64,
    chain_id: &str,
    fees: FeeSchedule,
) -> Result<UnsignedTransaction, GatewayError> {
    let call_data = CallData {
        call_type: "Invoke",
        function: &params.function,
        transfers: [Transfer {
            asset_id: &params.asset_id,
            amount: params.amount,
        }],
    };
    let call_data_json =
        serde_json::to_vec(&call_data).map_err(|e| GatewayError::Encoding(e.to_string()))?;

    // The node expects the base64 text itself as the call-data bytes.
    let parameter = SmartContract {
        r#type: Some(INVOKE_CALL_TYPE),
        address: params.contract_key.clone(),
        call_data: STANDARD.encode(call_data_json).into_bytes(),
    };
    let encoded = parameter.encode_to_vec();
    debug!("Encoded SmartContract parameter: {} bytes", encoded.len());

    Ok(UnsignedTransaction {
        raw_data: RawData {
            nonce,
            sender: STANDARD.encode(&params.sender_key),
            contract: vec![ContractEntry {
                contract_type: SMART_CONTRACT_TYPE,
                parameter: ContractParameter {
                    type_url: SMART_CONTRACT_TYPE_URL.to_string(),
                    value: STANDARD.encode(encoded),
                },
            }],
            kapp_fee: fees.kapp_fee,
            bandwidth_fee: fees.bandwidth_fee,
            version: TX_VERSION,
            chain_id: chain_id.to_string(),
        },
    })
}

/// Unsigned transaction together with the nonce it was built at
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltTransaction {
    pub unsigned_tx: UnsignedTransaction,
    pub nonce: u64,
}

/// Builds unsigned smart-contract invocations
///
/// The nonce is always read from the node right before assembly; a nonce
/// supplied by the caller is never trusted. Signing happens elsewhere.
#[derive(Clone)]
pub struct TransactionBuilder {
    accounts: AccountStateAccessor,
    resolver: Arc<EndpointResolver>,
    fees: FeeSchedule,
}

impl TransactionBuilder {
    pub fn new(
        accounts: AccountStateAccessor,
        resolver: Arc<EndpointResolver>,
        fees: FeeSchedule,
    ) -> Self {
        Self {
            accounts,
            resolver,
            fees,
        }
    }

    /// Validate `request`, fetch the sender nonce and assemble the transaction
    ///
    /// Validation happens before any network call. A failed nonce fetch fails
    /// the build with the underlying error; no default nonce is substituted.
    #[instrument(skip(self, request), err)]
    pub async fn build(
        &self,
        request: &BuildRequest,
        network: Network,
    ) -> Result<BuiltTransaction, GatewayError> {
        let params = InvokeParams::from_request(request)?;

        let nonce = self.accounts.fetch(&params.sender, network).await?.nonce;
        info!(
            "Building {} invoke on {} for {} at nonce {}",
            params.function, params.contract, params.sender, nonce
        );

        let chain_id = &self.resolver.profile(network).chain_id;
        let unsigned_tx = assemble_unsigned(&params, nonce, chain_id, self.fees)?;

        Ok(BuiltTransaction { unsigned_tx, nonce })
    }
}
