//! Configuration data model for the x402 agent.
//!
//! These types mirror the JSON configuration document: a wallet descriptor
//! plus an ordered list of callable endpoint descriptors. The document is
//! parsed once at startup by the [`registry`](crate::registry); string
//! values anywhere in it may contain `${ENV_VAR}` placeholders resolved at
//! load time.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wallet provider kind. Only the CDP embedded wallet is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalletProvider {
    /// Coinbase Developer Platform embedded wallet.
    #[serde(rename = "cdp-embedded")]
    CdpEmbedded,
}

/// Network the wallet transacts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Network {
    /// Base mainnet.
    Base,
    /// Base Sepolia testnet.
    BaseSepolia,
    /// Ethereum mainnet.
    Ethereum,
    /// Ethereum Sepolia testnet.
    Sepolia,
}

impl Network {
    /// Returns the network's human-readable name as used in configuration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::BaseSepolia => "base-sepolia",
            Self::Ethereum => "ethereum",
            Self::Sepolia => "sepolia",
        }
    }
}

/// Wallet descriptor from the configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Wallet provider type.
    pub provider: WalletProvider,

    /// Network to use for transactions.
    pub network: Network,

    /// Private key material: a `0x`-prefixed hex literal, a base64 blob,
    /// or a `${VAR}` environment placeholder (resolved at load time).
    #[serde(rename = "privateKey")]
    pub private_key: String,
}

/// HTTP method an endpoint is called with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// HTTP GET — arguments become URL query parameters.
    Get,
    /// HTTP POST — arguments become a JSON body.
    Post,
    /// HTTP PUT — arguments become a JSON body.
    Put,
    /// HTTP PATCH — arguments become a JSON body.
    Patch,
    /// HTTP DELETE — arguments become URL query parameters.
    Delete,
}

impl HttpMethod {
    /// Returns `true` if call arguments are serialized as URL query
    /// parameters rather than a JSON body.
    #[must_use]
    pub const fn uses_query_params(self) -> bool {
        matches!(self, Self::Get | Self::Delete)
    }
}

/// Declared kind of a parameter schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    /// A JSON object with named properties.
    Object,
    /// A string, optionally restricted to an enumeration.
    String,
    /// A number (integer or float).
    Number,
    /// A boolean.
    Boolean,
    /// A homogeneous array; `items` describes the element schema.
    Array,
}

impl SchemaType {
    /// Returns the type's name as it appears in the document (`"object"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
        }
    }
}

/// Recursive JSON-Schema-like description of an endpoint's call arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// The node kind.
    #[serde(rename = "type")]
    pub schema_type: SchemaType,

    /// Property name → schema, when `schema_type` is `object`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, ParameterSchema>>,

    /// Names of required properties (subset of `properties` keys).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,

    /// Documentation attached to the property.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Allowed values, when `schema_type` is `string`.
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,

    /// Element schema, when `schema_type` is `array`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<ParameterSchema>>,
}

impl ParameterSchema {
    /// Creates a bare schema node of the given type with no constraints.
    #[must_use]
    pub const fn of_type(schema_type: SchemaType) -> Self {
        Self {
            schema_type,
            properties: None,
            required: None,
            description: None,
            enum_values: None,
            items: None,
        }
    }
}

/// A callable x402-protected endpoint from the configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Unique snake_case identifier; doubles as the exposed tool name.
    pub id: String,

    /// Human-readable name.
    pub name: String,

    /// Full HTTPS URL of the endpoint.
    pub url: String,

    /// HTTP method to use.
    pub method: HttpMethod,

    /// What the endpoint does, in at least 20 characters.
    pub description: String,

    /// Category for grouping endpoints (e.g. `search`, `media`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Schema for the arguments this endpoint accepts.
    pub parameters: ParameterSchema,

    /// Estimated cost per request, for operator reference.
    #[serde(
        rename = "estimatedCost",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub estimated_cost: Option<String>,

    /// Whether the endpoint may be called autonomously by the agent.
    pub trusted: bool,
}

/// The complete, resolved configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Wallet descriptor.
    pub wallet: WalletConfig,

    /// Ordered, non-empty list of callable endpoints.
    pub endpoints: Vec<Endpoint>,
}

/// Result of a successful call to an x402-protected endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointCallResult {
    /// Response body, parsed as JSON.
    pub data: Value,

    /// Transaction hash from the payment, if one was made.
    #[serde(rename = "txHash", default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,

    /// Payment amount, if reported by the endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,

    /// Whether a payment was required and executed.
    #[serde(rename = "paymentMade")]
    pub payment_made: bool,
}
