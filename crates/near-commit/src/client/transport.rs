//! Pluggable JSON-RPC transport.
//!
//! [`RpcClient`](super::RpcClient) speaks JSON-RPC envelopes; a
//! [`Transport`] only moves one JSON document to the node and one back.
//! [`HttpTransport`] is the reqwest-backed default. Tests and embedders can
//! supply their own implementation through
//! [`NearBuilder::transport`](super::NearBuilder::transport).

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::error::TransportError;

/// Boxed future returned by [`Transport::post`].
pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = Result<serde_json::Value, TransportError>> + Send + 'a>>;

/// Sends a JSON-RPC request document and returns the response document.
///
/// Implementations return `Ok` for any well-formed JSON-RPC envelope,
/// including ones carrying an `error` member, and `Err` only when no
/// envelope was obtained.
pub trait Transport: Send + Sync {
    fn post<'a>(&'a self, request: &'a serde_json::Value) -> TransportFuture<'a>;

    /// Human-readable endpoint, used in logs.
    fn endpoint(&self) -> &str {
        "custom"
    }
}

/// HTTP transport over reqwest.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with no request timeout.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Create a transport whose requests fail after `timeout`.
    ///
    /// The timeout applies to every request, including broadcasts that
    /// block until the transaction commits.
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn send(&self, request: &serde_json::Value) -> Result<serde_json::Value, TransportError> {
        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        classify_response(status, body)
    }
}

/// Turn an HTTP status and body into a JSON-RPC envelope.
///
/// Nodes report some application errors with a non-2xx status; if the body
/// still carries an `error` envelope it is passed through so the structured
/// cause survives. Any other non-2xx response is [`TransportError::Status`],
/// and a 2xx body that is not JSON is [`TransportError::Body`].
fn classify_response(status: u16, body: String) -> Result<serde_json::Value, TransportError> {
    let parsed = serde_json::from_str::<serde_json::Value>(&body);
    if !(200..300).contains(&status) {
        return match parsed {
            Ok(envelope) if envelope.get("error").is_some() => Ok(envelope),
            _ => Err(TransportError::Status { status, body }),
        };
    }
    parsed.map_err(|e| TransportError::Body(e.to_string()))
}

impl Transport for HttpTransport {
    fn post<'a>(&'a self, request: &'a serde_json::Value) -> TransportFuture<'a> {
        Box::pin(self.send(request))
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}
