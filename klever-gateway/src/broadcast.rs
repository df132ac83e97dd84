use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{error, info, instrument};

use crate::{
    error::{GatewayError, BROADCAST_FAILED},
    network::{EndpointResolver, Network},
    relay::{NodeRelay, RelayError},
};

/// Relays externally signed transactions to the node
///
/// Each broadcast is a single POST; failures are reported, never retried.
#[derive(Clone)]
pub struct Broadcaster {
    relay: Arc<dyn NodeRelay>,
    resolver: Arc<EndpointResolver>,
}

impl Broadcaster {
    pub fn new(relay: Arc<dyn NodeRelay>, resolver: Arc<EndpointResolver>) -> Self {
        Self { relay, resolver }
    }

    /// Submit `signed_tx` and return the node-assigned transaction hash
    ///
    /// The payload is opaque and forwarded as `{"tx": signed_tx}`; it is only
    /// checked for emptiness.
    #[instrument(skip(self, signed_tx), err)]
    pub async fn broadcast(&self, signed_tx: &Value, network: Network) -> Result<String, GatewayError> {
        if is_empty_payload(signed_tx) {
            return Err(GatewayError::Validation(
                "Missing signed transaction".to_string(),
            ));
        }

        let url = self.resolver.broadcast_url(network);
        let body = json!({ "tx": signed_tx });

        match self.relay.post_json(&url, &body).await {
            Ok(response) => match extract_hash(&response) {
                Some(hash) => {
                    info!("Transaction {} accepted by {}", hash, network);
                    Ok(hash)
                }
                // A 2xx reply can still carry the node's refusal instead of a hash.
                None => match node_message(&response) {
                    Some(message) => {
                        error!("Broadcast refused without a hash: {}", message);
                        Err(GatewayError::BroadcastRejected {
                            status: 502,
                            message,
                        })
                    }
                    None => Err(GatewayError::MalformedResponse(
                        "missing transaction hash".to_string(),
                    )),
                },
            },
            Err(RelayError::Status { status, body }) => {
                let message = serde_json::from_str::<Value>(&body)
                    .ok()
                    .and_then(|parsed| node_message(&parsed))
                    .unwrap_or_else(|| BROADCAST_FAILED.to_string());
                error!("Broadcast rejected with status {}: {}", status, message);
                Err(GatewayError::BroadcastRejected { status, message })
            }
            Err(e) => {
                error!("Broadcast failed: {}", e);
                Err(e.into())
            }
        }
    }
}

fn is_empty_payload(signed_tx: &Value) -> bool {
    match signed_tx {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn extract_hash(response: &Value) -> Option<String> {
    response
        .pointer("/data/hash")
        .or_else(|| response.pointer("/data/txsHashes/0"))
        .or_else(|| response.get("hash"))
        .and_then(Value::as_str)
        .filter(|hash| !hash.is_empty())
        .map(str::to_string)
}

// The node's own error text, from `error` or else `message`.
fn node_message(response: &Value) -> Option<String> {
    ["error", "message"].iter().find_map(|key| {
        response
            .get(*key)
            .and_then(Value::as_str)
            .filter(|message| !message.trim().is_empty())
            .map(str::to_string)
    })
}
