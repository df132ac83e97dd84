use async_trait::async_trait;
use mockall::automock;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// Failure of a single relayed HTTP call
///
/// The relay does not interpret status codes; callers decide what a given
/// status means in their context.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RelayError {
    /// The node answered with a non-2xx status; `body` is the raw response text
    #[error("node responded with status {status}")]
    Status { status: u16, body: String },

    /// No usable response: DNS, connection or decoding failure
    #[error("transport failure: {0}")]
    Transport(String),
}

impl RelayError {
    /// Upstream status code, when the node answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            RelayError::Status { status, .. } => Some(*status),
            RelayError::Transport(_) => None,
        }
    }
}

/// Executes single JSON requests against the node
///
/// Implementations must not retry; each call maps to exactly one HTTP request.
#[automock]
#[async_trait]
pub trait NodeRelay: Send + Sync {
    /// GET `url` and decode the 2xx body as JSON
    async fn get_json(&self, url: &Url) -> Result<Value, RelayError>;

    /// POST `body` as JSON to `url` and decode the 2xx body as JSON
    async fn post_json(&self, url: &Url, body: &Value) -> Result<Value, RelayError>;
}

/// `NodeRelay` backed by a shared reqwest client
///
/// Uses the client's default transport timeout; no overrides are applied.
#[derive(Clone)]
pub struct HttpRelay {
    client: reqwest::Client,
}

impl HttpRelay {
    /// Create a relay whose requests all carry JSON `Accept`/`Content-Type` headers
    pub fn new() -> Result<Self, RelayError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| RelayError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl NodeRelay for HttpRelay {
    async fn get_json(&self, url: &Url) -> Result<Value, RelayError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| RelayError::Transport(e.to_string()))?;
        decode(response).await
    }

    async fn post_json(&self, url: &Url, body: &Value) -> Result<Value, RelayError> {
        debug!("POST {}", url);
        let response = self
            .client
            .post(url.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| RelayError::Transport(e.to_string()))?;
        decode(response).await
    }
}

async fn decode(response: reqwest::Response) -> Result<Value, RelayError> {
    let status = response.status();
    debug!("Node responded with status {}", status);

    if !status.is_success() {
        // Error bodies are not guaranteed to be JSON, keep the raw text.
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to read error body for status {}: {}", status, e);
                String::new()
            }
        };
        return Err(RelayError::Status {
            status: status.as_u16(),
            body,
        });
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| RelayError::Transport(format!("Malformed response body: {}", e)))
}
