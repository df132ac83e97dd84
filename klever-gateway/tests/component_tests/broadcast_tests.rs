//! Broadcast relay and node response normalization

use std::sync::Arc;

use actix_web::ResponseError;
use klever_gateway::{
    broadcast::Broadcaster,
    error::{GatewayError, BROADCAST_FAILED},
    network::Network,
    relay::{MockNodeRelay, RelayError},
};
use serde_json::{json, Value};

use crate::{init_logger, test_resolver};

fn broadcaster(relay: MockNodeRelay) -> Broadcaster {
    Broadcaster::new(Arc::new(relay), Arc::new(test_resolver()))
}

fn rejection(status: u16, body: &str) -> RelayError {
    RelayError::Status {
        status,
        body: body.to_string(),
    }
}

#[tokio::test]
async fn test_signed_blob_is_relayed_untouched() {
    init_logger();
    let signed = json!({ "RawData": { "Nonce": 7 }, "Signature": ["c2ln"] });
    let expected_body = json!({ "tx": signed.clone() });
    let mut relay = MockNodeRelay::new();
    relay
        .expect_post_json()
        .withf(move |url, body| {
            url.as_str() == "https://node.mainnet.klever.org/transaction/broadcast"
                && *body == expected_body
        })
        .times(1)
        .returning(|_, _| Ok(json!({ "data": { "hash": "abc123" }, "error": "" })));

    let hash = broadcaster(relay)
        .broadcast(&signed, Network::Mainnet)
        .await
        .unwrap();

    assert_eq!(hash, "abc123");
}

#[tokio::test]
async fn test_hash_falls_back_to_other_node_shapes() {
    init_logger();
    let responses = [
        json!({ "data": { "txsHashes": ["def456"] } }),
        json!({ "hash": "ghi789" }),
    ];

    for (response, expected) in responses.into_iter().zip(["def456", "ghi789"]) {
        let mut relay = MockNodeRelay::new();
        relay
            .expect_post_json()
            .times(1)
            .return_once(move |_, _| Ok(response));

        let hash = broadcaster(relay)
            .broadcast(&json!("0a0b0c"), Network::Testnet)
            .await
            .unwrap();
        assert_eq!(hash, expected);
    }
}

#[tokio::test]
async fn test_node_error_message_is_returned_verbatim() {
    init_logger();
    let mut relay = MockNodeRelay::new();
    relay.expect_post_json().times(1).returning(|_, _| {
        Err(rejection(
            400,
            r#"{"data":null,"error":"invalid nonce: expected 8, got 7","code":"internal_issue"}"#,
        ))
    });

    let err = broadcaster(relay)
        .broadcast(&json!("signed"), Network::Mainnet)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "invalid nonce: expected 8, got 7");
    assert_eq!(err.status_code().as_u16(), 400);
}

#[tokio::test]
async fn test_message_field_is_used_when_error_is_blank() {
    init_logger();
    let mut relay = MockNodeRelay::new();
    relay
        .expect_post_json()
        .times(1)
        .returning(|_, _| Err(rejection(500, r#"{"error":"","message":"node busy"}"#)));

    let err = broadcaster(relay)
        .broadcast(&json!("signed"), Network::Mainnet)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        GatewayError::BroadcastRejected {
            status: 500,
            message: "node busy".to_string()
        }
    );
}

#[tokio::test]
async fn test_unreadable_rejection_uses_generic_marker() {
    init_logger();
    let mut relay = MockNodeRelay::new();
    relay
        .expect_post_json()
        .times(1)
        .returning(|_, _| Err(rejection(502, "<html>Bad Gateway</html>")));

    let err = broadcaster(relay)
        .broadcast(&json!("signed"), Network::Mainnet)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), BROADCAST_FAILED);
    assert_eq!(err.status_code().as_u16(), 502);
}

#[tokio::test]
async fn test_transport_failure_is_not_retried() {
    init_logger();
    let mut relay = MockNodeRelay::new();
    relay
        .expect_post_json()
        .times(1)
        .returning(|_, _| Err(RelayError::Transport("timed out".to_string())));

    let err = broadcaster(relay)
        .broadcast(&json!("signed"), Network::Mainnet)
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Transport(_)));
}

#[tokio::test]
async fn test_accepted_response_without_hash_is_malformed() {
    init_logger();
    let mut relay = MockNodeRelay::new();
    relay
        .expect_post_json()
        .times(1)
        .returning(|_, _| Ok(json!({ "data": {} })));

    let err = broadcaster(relay)
        .broadcast(&json!("signed"), Network::Mainnet)
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_accepted_status_with_node_error_keeps_the_node_message() {
    init_logger();
    let mut relay = MockNodeRelay::new();
    relay.expect_post_json().times(1).returning(|_, _| {
        Ok(json!({ "data": null, "error": "invalid signature", "code": "internal_issue" }))
    });

    let err = broadcaster(relay)
        .broadcast(&json!("signed"), Network::Mainnet)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        GatewayError::BroadcastRejected {
            status: 502,
            message: "invalid signature".to_string()
        }
    );
    assert_eq!(err.to_string(), "invalid signature");
    assert_eq!(err.status_code().as_u16(), 502);
}

#[tokio::test]
async fn test_empty_blob_never_contacts_the_node() {
    init_logger();
    let mut relay = MockNodeRelay::new();
    relay.expect_post_json().never();
    let broadcaster = broadcaster(relay);

    for empty in [Value::Null, json!(""), json!("   "), json!({}), json!([])] {
        let err = broadcaster
            .broadcast(&empty, Network::Mainnet)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            GatewayError::Validation("Missing signed transaction".to_string())
        );
    }
}
