//! Payment-receipt extraction from response headers.
//!
//! Different x402 services report settlement details in divergent wire
//! encodings. Extraction is an ordered list of independent parser
//! strategies, each returning an optional match; the first match wins.
//! Extraction never fails: a malformed header degrades to "no payment
//! info", not an error.
//!
//! Strategies, in priority order:
//!
//! 1. `X-Payment-Response` header — tried as base64-encoded JSON, then as
//!    raw JSON, then as a `tx_hash:<value>` pattern, then (if the value
//!    starts with `0x`) as a bare transaction hash.
//! 2. `X-Transaction-Hash` header — taken verbatim.

use std::sync::LazyLock;

use base64::prelude::*;
use http::HeaderMap;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

/// Header carrying a structured payment response.
pub const PAYMENT_RESPONSE_HEADER: &str = "x-payment-response";

/// Header carrying a bare transaction hash.
pub const TRANSACTION_HASH_HEADER: &str = "x-transaction-hash";

/// JSON field names a transaction hash may appear under.
const TX_HASH_FIELDS: [&str; 4] = ["transaction", "txHash", "transactionHash", "tx_hash"];

/// JSON field names a payment amount may appear under.
const AMOUNT_FIELDS: [&str; 2] = ["amount", "value"];

static TX_HASH_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"tx_hash:([0-9a-fA-Fx]+)").expect("valid regex"));

/// Payment-receipt metadata recovered from a response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentReceipt {
    /// Transaction hash, if reported.
    pub tx_hash: Option<String>,
    /// Payment amount, if reported.
    pub amount: Option<String>,
}

impl PaymentReceipt {
    /// Reads the known hash and amount field aliases out of a parsed
    /// payment-response JSON object.
    fn from_json(value: &Value) -> Self {
        let field = |names: &[&str]| {
            names.iter().find_map(|name| {
                let v = value.get(name)?;
                match v {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                }
            })
        };
        Self {
            tx_hash: field(&TX_HASH_FIELDS),
            amount: field(&AMOUNT_FIELDS),
        }
    }
}

type Strategy = fn(&HeaderMap) -> Option<PaymentReceipt>;

/// Parser strategies in priority order; the first match wins.
const STRATEGIES: &[Strategy] = &[from_payment_response_header, from_transaction_hash_header];

/// Extracts payment-receipt metadata from response headers.
///
/// Returns `None` when no strategy matched; this is a diagnostic
/// condition, never an error.
#[must_use]
pub fn extract_receipt(headers: &HeaderMap) -> Option<PaymentReceipt> {
    let receipt = STRATEGIES.iter().find_map(|strategy| strategy(headers));
    if receipt.is_none() {
        debug!(
            headers = headers.len(),
            "Response headers carried no payment info"
        );
    }
    receipt
}

/// Strategy 1: the structured `X-Payment-Response` header.
fn from_payment_response_header(headers: &HeaderMap) -> Option<PaymentReceipt> {
    let raw = headers.get(PAYMENT_RESPONSE_HEADER)?.to_str().ok()?;

    // Base64-encoded JSON (the x402 standard encoding)
    if let Some(parsed) = BASE64_STANDARD
        .decode(raw.trim())
        .ok()
        .and_then(|bytes| serde_json::from_slice::<Value>(&bytes).ok())
    {
        return Some(PaymentReceipt::from_json(&parsed));
    }

    // Raw JSON, unencoded
    if let Ok(parsed) = serde_json::from_str::<Value>(raw) {
        return Some(PaymentReceipt::from_json(&parsed));
    }

    // "tx_hash:0x..." pattern
    if let Some(captures) = TX_HASH_PATTERN.captures(raw) {
        return Some(PaymentReceipt {
            tx_hash: Some(captures[1].to_owned()),
            amount: None,
        });
    }

    // Bare transaction hash
    if raw.starts_with("0x") {
        return Some(PaymentReceipt {
            tx_hash: Some(raw.to_owned()),
            amount: None,
        });
    }

    None
}

/// Strategy 2: the `X-Transaction-Hash` header, verbatim.
fn from_transaction_hash_header(headers: &HeaderMap) -> Option<PaymentReceipt> {
    let raw = headers.get(TRANSACTION_HASH_HEADER)?.to_str().ok()?;
    Some(PaymentReceipt {
        tx_hash: Some(raw.to_owned()),
        amount: None,
    })
}
