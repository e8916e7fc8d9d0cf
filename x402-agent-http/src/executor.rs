//! The payment-aware request executor.
//!
//! [`PaymentExecutor::call_endpoint`] is the central operation of the
//! system: it builds the outbound request from an endpoint descriptor and
//! an argument object, dispatches it through the payment-capable
//! transport under the retry policy, extracts payment-receipt metadata,
//! and returns a normalized [`EndpointCallResult`] or a classified error.

use http::Method;
use serde_json::{Map, Value};
use tracing::{debug, info};
use url::Url;
use x402_agent::config::{Endpoint, EndpointCallResult, HttpMethod};
use x402_agent::error::{AgentError, NetworkError, PaymentError};
use x402_agent::retry::RetryPolicy;

use crate::audit;
use crate::receipt::{self, PaymentReceipt};
use crate::transport::{PaymentTransport, TransportError, TransportRequest};

/// Executes endpoint calls with automatic payment handling, retry, and
/// receipt extraction.
#[derive(Debug, Clone)]
pub struct PaymentExecutor<T> {
    transport: T,
    retry: RetryPolicy,
}

impl<T: PaymentTransport> PaymentExecutor<T> {
    /// Creates an executor over the given payment-capable transport with
    /// the default retry policy.
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            retry: RetryPolicy::default(),
        }
    }

    /// Replaces the retry policy.
    #[must_use]
    pub const fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Calls an x402-protected endpoint with the given arguments.
    ///
    /// Arguments are serialized as URL query parameters for GET/DELETE and
    /// as a JSON body for POST/PUT/PATCH. The dispatch is retried with
    /// exponential backoff; client-class (4xx) responses are never
    /// retried. One audit record is emitted regardless of outcome.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Network`] for non-2xx responses, transport
    /// failures, and retry exhaustion, or [`AgentError::Payment`] when the
    /// transport reports a payment-protocol failure.
    pub async fn call_endpoint(
        &self,
        endpoint: &Endpoint,
        args: &Map<String, Value>,
    ) -> Result<EndpointCallResult, AgentError> {
        info!(
            endpoint = %endpoint.id,
            url = %endpoint.url,
            method = ?endpoint.method,
            "Calling endpoint"
        );

        let outcome = self.retry.run(|| self.attempt(endpoint, args)).await;

        match &outcome {
            Ok(result) => audit::success(
                &endpoint.id,
                result.tx_hash.as_deref(),
                result.amount.as_deref(),
            ),
            Err(error) => audit::failure(&endpoint.id, error),
        }

        outcome
    }

    /// One dispatch attempt: build, send, check status, extract receipt,
    /// parse body.
    async fn attempt(
        &self,
        endpoint: &Endpoint,
        args: &Map<String, Value>,
    ) -> Result<EndpointCallResult, AgentError> {
        let request = build_request(endpoint, args)?;
        if let Some(body) = &request.json_body {
            debug!(endpoint = %endpoint.id, %body, "Request body");
        }

        let response = self
            .transport
            .execute(request)
            .await
            .map_err(|e| classify_transport_error(e, endpoint))?;

        if !response.status.is_success() {
            let body = response.body_text();
            let reason = if body.is_empty() {
                response
                    .status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_owned()
            } else {
                body
            };
            return Err(NetworkError::new(format!(
                "HTTP {}: {reason}",
                response.status.as_u16()
            ))
            .with_status(response.status.as_u16())
            .with_url(endpoint.url.clone())
            .into());
        }

        let receipt = receipt::extract_receipt(&response.headers).unwrap_or_default();

        let data: Value = serde_json::from_slice(&response.body).map_err(|e| {
            NetworkError::new(format!(
                "Request failed for endpoint {}: invalid JSON response: {e}",
                endpoint.id
            ))
            .with_url(endpoint.url.clone())
        })?;

        if let Some(tx_hash) = &receipt.tx_hash {
            info!(
                endpoint = %endpoint.id,
                tx_hash,
                amount = receipt.amount.as_deref().unwrap_or("unknown"),
                "Payment successful"
            );
        } else {
            debug!(endpoint = %endpoint.id, "Request successful (no payment detected)");
        }

        Ok(build_result(data, receipt))
    }
}

/// Builds the outbound request for an endpoint call.
fn build_request(
    endpoint: &Endpoint,
    args: &Map<String, Value>,
) -> Result<TransportRequest, AgentError> {
    let mut url = Url::parse(&endpoint.url).map_err(|e| {
        NetworkError::new(format!("Invalid endpoint URL \"{}\": {e}", endpoint.url))
            .with_url(endpoint.url.clone())
    })?;

    let json_body = if endpoint.method.uses_query_params() {
        if !args.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in args {
                pairs.append_pair(key, &stringify(value));
            }
        }
        None
    } else {
        Some(Value::Object(args.clone()))
    };

    Ok(TransportRequest {
        method: as_http_method(endpoint.method),
        url,
        json_body,
    })
}

/// Renders an argument value as a query-parameter string.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

const fn as_http_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

fn build_result(data: Value, receipt: PaymentReceipt) -> EndpointCallResult {
    let payment_made = receipt.tx_hash.is_some();
    EndpointCallResult {
        data,
        tx_hash: receipt.tx_hash,
        amount: receipt.amount,
        payment_made,
    }
}

/// Maps a typed transport failure onto the error taxonomy, naming the
/// endpoint in either case.
fn classify_transport_error(error: TransportError, endpoint: &Endpoint) -> AgentError {
    match error {
        TransportError::Payment { message } => PaymentError::new(format!(
            "Payment failed for endpoint {}: {message}",
            endpoint.id
        ))
        .into(),
        TransportError::Transport { message } => NetworkError::new(format!(
            "Request failed for endpoint {}: {message}",
            endpoint.id
        ))
        .with_url(endpoint.url.clone())
        .into(),
    }
}
