use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::{models::gateway::GatewayResult, relay::RelayError};

/// Generic message used when the node rejects a broadcast without saying why
pub const BROADCAST_FAILED: &str = "Broadcast failed";

/// Gateway error types
///
/// Every public operation converges to one of these variants before control
/// returns to the HTTP layer. A 404 on an account read never becomes an error:
/// the account accessor maps it to an empty account instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    /// Required input missing or malformed; detected before any network call
    #[error("{0}")]
    Validation(String),

    /// The node answered with a non-2xx status
    #[error("Node responded with status {status}: {body}")]
    Upstream { status: u16, body: String },

    /// The node could not be reached or its response could not be read
    #[error("Failed to reach node: {0}")]
    Transport(String),

    /// Every asset endpoint candidate failed
    #[error("No working endpoint found for asset {asset_id}")]
    AssetNotFound { asset_id: String },

    /// The node answered 2xx but without the fields this gateway needs
    #[error("Unexpected node response: {0}")]
    MalformedResponse(String),

    /// A transaction payload could not be serialized
    #[error("Failed to encode transaction: {0}")]
    Encoding(String),

    /// The node refused a signed transaction; `message` is the node's own text
    #[error("{message}")]
    BroadcastRejected { status: u16, message: String },
}

impl From<RelayError> for GatewayError {
    fn from(err: RelayError) -> Self {
        match err {
            RelayError::Status { status, body } => GatewayError::Upstream { status, body },
            RelayError::Transport(details) => GatewayError::Transport(details),
        }
    }
}

impl ResponseError for GatewayError {
    /// Convert the error to the uniform failure body
    ///
    /// `{"success": false, "error": "...", "httpStatus": N}`
    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        HttpResponse::build(status_code).json(GatewayResult::<()>::failure(
            self.to_string(),
            status_code.as_u16(),
        ))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::Upstream { status, .. } => echo_status(*status),
            GatewayError::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::AssetNotFound { .. } => StatusCode::NOT_FOUND,
            GatewayError::MalformedResponse(_) => StatusCode::BAD_GATEWAY,
            GatewayError::Encoding(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::BroadcastRejected { status, .. } => echo_status(*status),
        }
    }
}

// Upstream statuses are echoed as long as they are genuine error statuses.
fn echo_status(status: u16) -> StatusCode {
    match StatusCode::from_u16(status) {
        Ok(code) if code.is_client_error() || code.is_server_error() => code,
        _ => StatusCode::BAD_GATEWAY,
    }
}
