//! Wire-level executor behavior against a mock HTTP server.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use base64::prelude::*;
use reqwest_middleware::ClientBuilder;
use serde_json::{Map, Value, json};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use x402_agent::config::{Endpoint, HttpMethod, ParameterSchema, SchemaType};
use x402_agent::error::AgentError;
use x402_agent::retry::RetryPolicy;
use x402_agent_http::executor::PaymentExecutor;
use x402_agent_http::transport::ReqwestTransport;

fn endpoint(server: &MockServer, route: &str, http_method: HttpMethod) -> Endpoint {
    Endpoint {
        id: "web_search".into(),
        name: "Web Search".into(),
        url: format!("{}{route}", server.uri()),
        method: http_method,
        description: "Search the web and return ranked results.".into(),
        category: None,
        parameters: ParameterSchema::of_type(SchemaType::Object),
        estimated_cost: None,
        trusted: true,
    }
}

fn executor() -> PaymentExecutor<ReqwestTransport> {
    let client = ClientBuilder::new(reqwest::Client::new()).build();
    PaymentExecutor::new(ReqwestTransport::new(client))
}

fn args(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

#[tokio::test]
async fn get_call_sends_query_params_and_parses_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "rust"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": [1, 2]})))
        .expect(1)
        .mount(&server)
        .await;

    let result = executor()
        .call_endpoint(&endpoint(&server, "/search", HttpMethod::Get), &args(json!({"q": "rust"})))
        .await
        .unwrap();

    assert_eq!(result.data, json!({"results": [1, 2]}));
    assert!(!result.payment_made);
    assert!(result.tx_hash.is_none());
}

#[tokio::test]
async fn post_call_sends_a_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/images"))
        .and(body_json(json!({"prompt": "a cat"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "img_1"})))
        .expect(1)
        .mount(&server)
        .await;

    let result = executor()
        .call_endpoint(
            &endpoint(&server, "/images", HttpMethod::Post),
            &args(json!({"prompt": "a cat"})),
        )
        .await
        .unwrap();

    assert_eq!(result.data["id"], json!("img_1"));
}

#[tokio::test]
async fn payment_response_header_yields_receipt_metadata() {
    let server = MockServer::start().await;
    let header = BASE64_STANDARD.encode(r#"{"transaction":"0xabc","amount":"0.01"}"#);
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"ok": true}))
                .insert_header("x-payment-response", header.as_str()),
        )
        .mount(&server)
        .await;

    let result = executor()
        .call_endpoint(&endpoint(&server, "/search", HttpMethod::Get), &Map::new())
        .await
        .unwrap();

    assert!(result.payment_made);
    assert_eq!(result.tx_hash.as_deref(), Some("0xabc"));
    assert_eq!(result.amount.as_deref(), Some("0.01"));
}

#[tokio::test]
async fn malformed_payment_header_is_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"ok": true}))
                .insert_header("x-payment-response", "garbage value"),
        )
        .mount(&server)
        .await;

    let result = executor()
        .call_endpoint(&endpoint(&server, "/search", HttpMethod::Get), &Map::new())
        .await
        .unwrap();

    assert!(!result.payment_made);
}

#[tokio::test]
async fn transient_failures_are_retried_until_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(3)
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let started = Instant::now();
    let result = executor()
        .call_endpoint(&endpoint(&server, "/flaky", HttpMethod::Get), &Map::new())
        .await
        .unwrap();

    assert_eq!(result.data, json!({"ok": true}));
    // Backoff of roughly 100ms + 200ms + 400ms
    assert!(started.elapsed() >= Duration::from_millis(700));
}

#[tokio::test]
async fn client_errors_fail_immediately_with_status_and_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such resource"))
        .expect(1)
        .mount(&server)
        .await;

    let err = executor()
        .call_endpoint(&endpoint(&server, "/missing", HttpMethod::Get), &Map::new())
        .await
        .unwrap_err();

    match err {
        AgentError::Network(e) => {
            assert_eq!(e.status_code, Some(404));
            assert!(e.message.contains("no such resource"), "{e}");
            assert!(e.url.as_deref().unwrap_or_default().contains("/missing"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn retry_exhaustion_reports_attempt_count() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let executor = executor().with_retry_policy(RetryPolicy {
        max_retries: 2,
        initial_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(50),
        backoff_multiplier: 2,
    });

    let err = executor
        .call_endpoint(&endpoint(&server, "/down", HttpMethod::Get), &Map::new())
        .await
        .unwrap_err();

    assert!(
        err.to_string().contains("Failed after 2 retries"),
        "{err}"
    );
}

/// Subscriber double capturing events emitted under the audit target,
/// one field map per record.
#[derive(Debug, Clone, Default)]
struct AuditRecords(Arc<Mutex<Vec<HashMap<String, String>>>>);

impl AuditRecords {
    fn take(&self) -> Vec<HashMap<String, String>> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

impl tracing::Subscriber for AuditRecords {
    fn enabled(&self, metadata: &tracing::Metadata<'_>) -> bool {
        metadata.target() == x402_agent_http::audit::AUDIT_TARGET
    }

    fn new_span(&self, _attrs: &tracing::span::Attributes<'_>) -> tracing::span::Id {
        tracing::span::Id::from_u64(1)
    }

    fn record(&self, _span: &tracing::span::Id, _values: &tracing::span::Record<'_>) {}

    fn record_follows_from(&self, _span: &tracing::span::Id, _follows: &tracing::span::Id) {}

    fn event(&self, event: &tracing::Event<'_>) {
        struct Fields<'a>(&'a mut HashMap<String, String>);

        impl tracing::field::Visit for Fields<'_> {
            fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
                self.0.insert(field.name().to_owned(), value.to_owned());
            }

            fn record_debug(
                &mut self,
                field: &tracing::field::Field,
                value: &dyn std::fmt::Debug,
            ) {
                self.0.insert(field.name().to_owned(), format!("{value:?}"));
            }
        }

        let mut fields = HashMap::new();
        event.record(&mut Fields(&mut fields));
        self.0.lock().unwrap().push(fields);
    }

    fn enter(&self, _span: &tracing::span::Id) {}

    fn exit(&self, _span: &tracing::span::Id) {}
}

#[tokio::test]
async fn successful_call_emits_one_audit_record() {
    use tracing::instrument::WithSubscriber;

    let server = MockServer::start().await;
    let header = BASE64_STANDARD.encode(r#"{"transaction":"0xabc","amount":"0.01"}"#);
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"ok": true}))
                .insert_header("x-payment-response", header.as_str()),
        )
        .mount(&server)
        .await;

    let records = AuditRecords::default();
    executor()
        .call_endpoint(&endpoint(&server, "/search", HttpMethod::Get), &Map::new())
        .with_subscriber(records.clone())
        .await
        .unwrap();

    let records = records.take();
    assert_eq!(records.len(), 1, "{records:?}");
    assert_eq!(records[0]["endpoint"], "web_search");
    assert_eq!(records[0]["status"], "success");
    assert_eq!(records[0]["tx_hash"], "0xabc");
}

#[tokio::test]
async fn failed_call_emits_one_audit_record() {
    use tracing::instrument::WithSubscriber;

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let records = AuditRecords::default();
    executor()
        .call_endpoint(&endpoint(&server, "/missing", HttpMethod::Get), &Map::new())
        .with_subscriber(records.clone())
        .await
        .unwrap_err();

    let records = records.take();
    assert_eq!(records.len(), 1, "{records:?}");
    assert_eq!(records[0]["endpoint"], "web_search");
    assert_eq!(records[0]["status"], "failed");
    assert!(records[0]["error"].contains("HTTP 404"), "{records:?}");
}

#[tokio::test]
async fn non_json_success_body_is_a_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;

    let err = executor()
        .call_endpoint(&endpoint(&server, "/html", HttpMethod::Get), &Map::new())
        .await
        .unwrap_err();

    assert!(matches!(err, AgentError::Network(_)), "{err}");
}
