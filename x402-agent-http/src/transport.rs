//! Payment-capable HTTP transport abstraction.
//!
//! The executor treats payment handling as an injected capability: a
//! [`PaymentTransport`] receives a fully built request and returns a final
//! response, resolving any HTTP 402 challenge internally (signing and
//! submitting payment, then retrying transparently).
//!
//! [`ReqwestTransport`] adapts a [`reqwest_middleware::ClientWithMiddleware`]
//! whose middleware stack performs that 402 handshake. It is also the only
//! place allowed to classify an opaque middleware failure as a payment
//! failure; the executor consumes typed [`TransportError`] variants and
//! never inspects error text itself.

use async_trait::async_trait;
use http::{HeaderMap, Method, StatusCode};
use reqwest_middleware::ClientWithMiddleware;
use serde_json::Value;
use url::Url;

/// A fully built outbound request.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: Method,
    /// Target URL, including any query parameters.
    pub url: Url,
    /// JSON body for POST/PUT/PATCH requests.
    pub json_body: Option<Value>,
}

/// A buffered response from the transport.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// Final HTTP status, after any internal payment retry.
    pub status: StatusCode,
    /// Response headers, which may carry payment-receipt metadata.
    pub headers: HeaderMap,
    /// Complete response body.
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Returns the body decoded as UTF-8 text, lossily.
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Failure reported by the transport, already classified.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TransportError {
    /// The payment protocol handshake failed.
    #[error("{message}")]
    Payment {
        /// Description of the payment failure.
        message: String,
    },

    /// The request failed at the network level.
    #[error("{message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },
}

/// A payment-capable HTTP client: given a request, returns the final
/// response with any HTTP 402 challenge already resolved.
#[async_trait]
pub trait PaymentTransport: Send + Sync {
    /// Dispatches the request and buffers the response.
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

/// [`PaymentTransport`] adapter over a reqwest client whose middleware
/// stack performs the x402 payment handshake.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: ClientWithMiddleware,
}

impl ReqwestTransport {
    /// Wraps an already-configured payment-capable client.
    #[must_use]
    pub const fn new(client: ClientWithMiddleware) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PaymentTransport for ReqwestTransport {
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let mut builder = self.client.request(request.method, request.url);
        if let Some(body) = &request.json_body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(classify)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Transport {
                message: format!("failed to read response body: {e}"),
            })?
            .to_vec();

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

/// Classifies a middleware error as a payment or transport failure.
///
/// Payment middleware reports its failures through the middleware error
/// channel without a structured kind, so classification falls back to
/// message inspection here, at the adapter edge, keeping the executor on
/// typed signals only.
fn classify(error: reqwest_middleware::Error) -> TransportError {
    match error {
        reqwest_middleware::Error::Middleware(inner) => {
            let message = inner.to_string();
            let lowered = message.to_lowercase();
            if lowered.contains("payment") || lowered.contains("402") {
                TransportError::Payment { message }
            } else {
                TransportError::Transport { message }
            }
        }
        reqwest_middleware::Error::Reqwest(inner) => TransportError::Transport {
            message: inner.to_string(),
        },
    }
}
