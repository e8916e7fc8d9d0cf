//! Structural validation of a raw configuration document.
//!
//! Runs against the parsed (and environment-interpolated) JSON value
//! before it is deserialized into typed [`Config`](crate::config::Config)
//! structures, so every violation is reported with a descriptive message
//! and the offending endpoint's position.
//!
//! Validation is fail-fast: the first violation aborts.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use url::Url;

use crate::error::ConfigError;

/// Supported wallet provider literal.
const SUPPORTED_PROVIDER: &str = "cdp-embedded";

/// Supported network literals.
const SUPPORTED_NETWORKS: [&str; 4] = ["base", "base-sepolia", "ethereum", "sepolia"];

/// Allowed HTTP method literals.
const SUPPORTED_METHODS: [&str; 5] = ["GET", "POST", "PUT", "PATCH", "DELETE"];

/// Allowed parameter schema type literals.
const SUPPORTED_SCHEMA_TYPES: [&str; 5] = ["object", "string", "number", "boolean", "array"];

/// Minimum length of an endpoint description.
const MIN_DESCRIPTION_LEN: usize = 20;

static ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]*$").expect("valid regex"));

static HEX_KEY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0x[0-9a-fA-F]{64}$").expect("valid regex"));

static BASE64_KEY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9+/]+=*$").expect("valid regex"));

static ENV_PLACEHOLDER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\$\{[^}]+\}$").expect("valid regex"));

/// Validates a complete raw configuration document.
///
/// # Errors
///
/// Returns a [`ConfigError`] describing the first violation found,
/// annotated with the offending endpoint's index where applicable.
pub fn validate_config(document: &Value) -> Result<(), ConfigError> {
    let Some(root) = document.as_object() else {
        return Err(ConfigError::new("Configuration must be a valid object"));
    };

    let wallet = root
        .get("wallet")
        .ok_or_else(|| ConfigError::new("Configuration missing required field: wallet"))?;
    validate_wallet(wallet)?;

    let endpoints = root
        .get("endpoints")
        .ok_or_else(|| ConfigError::new("Configuration missing required field: endpoints"))?;
    let Some(endpoints) = endpoints.as_array() else {
        return Err(ConfigError::new("Field \"endpoints\" must be an array"));
    };
    if endpoints.is_empty() {
        return Err(ConfigError::new(
            "Configuration must include at least one endpoint",
        ));
    }

    let mut seen_ids = HashSet::new();
    for (index, endpoint) in endpoints.iter().enumerate() {
        validate_endpoint(endpoint)
            .map_err(|e| ConfigError::new(format!("Endpoint at index {index}: {e}")))?;

        // validate_endpoint guarantees `id` is a string
        let id = endpoint["id"].as_str().unwrap_or_default();
        if !seen_ids.insert(id.to_owned()) {
            return Err(ConfigError::new(format!(
                "Endpoint at index {index}: Duplicate endpoint ID: \"{id}\""
            )));
        }
    }

    Ok(())
}

/// Validates the wallet descriptor.
fn validate_wallet(wallet: &Value) -> Result<(), ConfigError> {
    let Some(wallet) = wallet.as_object() else {
        return Err(ConfigError::new("Wallet configuration must be an object"));
    };

    let provider = require_string(wallet.get("provider"), "provider", "Wallet configuration")?;
    if provider != SUPPORTED_PROVIDER {
        return Err(ConfigError::new(format!(
            "Invalid wallet provider: \"{provider}\". Only \"{SUPPORTED_PROVIDER}\" is currently supported."
        )));
    }

    let network = require_string(wallet.get("network"), "network", "Wallet configuration")?;
    if !SUPPORTED_NETWORKS.contains(&network) {
        return Err(ConfigError::new(format!(
            "Invalid wallet network: \"{network}\". Must be one of: {}",
            SUPPORTED_NETWORKS.join(", ")
        )));
    }

    let key = require_string(wallet.get("privateKey"), "privateKey", "Wallet configuration")?;
    let is_hex = HEX_KEY_PATTERN.is_match(key);
    let is_base64 = BASE64_KEY_PATTERN.is_match(key) && key.len() >= 32;
    let is_env = ENV_PLACEHOLDER_PATTERN.is_match(key);
    if !is_hex && !is_base64 && !is_env {
        return Err(ConfigError::new(
            "Wallet privateKey must be either:\n\
             \x20 - A valid hex string starting with 0x (0x...)\n\
             \x20 - A base64-encoded key\n\
             \x20 - An environment variable reference (${VAR_NAME})",
        ));
    }

    Ok(())
}

/// Validates a single endpoint descriptor.
fn validate_endpoint(endpoint: &Value) -> Result<(), ConfigError> {
    let Some(obj) = endpoint.as_object() else {
        return Err(ConfigError::new("Endpoint must be an object"));
    };

    let id = require_string(obj.get("id"), "id", "Endpoint")?;
    if !ID_PATTERN.is_match(id) {
        return Err(ConfigError::new(format!(
            "Invalid endpoint ID format: \"{id}\". \
             Must be snake_case (lowercase letters, numbers, underscores only)"
        )));
    }

    require_string(obj.get("name"), "name", "Endpoint")?;

    let url = require_string(obj.get("url"), "url", "Endpoint")?;
    let parsed =
        Url::parse(url).map_err(|_| ConfigError::new(format!("Invalid URL format: \"{url}\"")))?;
    if parsed.scheme() != "https" {
        return Err(ConfigError::new(format!(
            "Endpoint URL must use HTTPS: \"{url}\""
        )));
    }

    let method = require_string(obj.get("method"), "method", "Endpoint")?;
    if !SUPPORTED_METHODS.contains(&method) {
        return Err(ConfigError::new(format!(
            "Invalid HTTP method: \"{method}\". Must be one of: {}",
            SUPPORTED_METHODS.join(", ")
        )));
    }

    let description = require_string(obj.get("description"), "description", "Endpoint")?;
    if description.chars().count() < MIN_DESCRIPTION_LEN {
        return Err(ConfigError::new(format!(
            "Description too short ({} characters). \
             Minimum {MIN_DESCRIPTION_LEN} characters required for clear tool descriptions.",
            description.chars().count()
        )));
    }

    let parameters = obj
        .get("parameters")
        .ok_or_else(|| ConfigError::new("Missing required field: parameters"))?;
    validate_parameter_schema(parameters)?;

    match obj.get("trusted") {
        None | Some(Value::Null) => {
            return Err(ConfigError::new("Missing required field: trusted"));
        }
        Some(Value::Bool(_)) => {}
        Some(_) => {
            return Err(ConfigError::new(
                "Field \"trusted\" must be a boolean (true or false)",
            ));
        }
    }

    for optional in ["category", "estimatedCost"] {
        if let Some(value) = obj.get(optional) {
            if !value.is_string() {
                return Err(ConfigError::new(format!(
                    "Field \"{optional}\" must be a string"
                )));
            }
        }
    }

    Ok(())
}

/// Validates the structure of a parameter schema node, recursively.
fn validate_parameter_schema(schema: &Value) -> Result<(), ConfigError> {
    let Some(obj) = schema.as_object() else {
        return Err(ConfigError::new(
            "Parameters must be a valid JSON Schema object",
        ));
    };

    let schema_type = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| ConfigError::new("JSON Schema missing required field: type"))?;
    if !SUPPORTED_SCHEMA_TYPES.contains(&schema_type) {
        return Err(ConfigError::new(format!(
            "Invalid JSON Schema type: \"{schema_type}\". Must be one of: {}",
            SUPPORTED_SCHEMA_TYPES.join(", ")
        )));
    }

    if schema_type == "object" {
        if let Some(properties) = obj.get("properties") {
            let Some(properties) = properties.as_object() else {
                return Err(ConfigError::new(
                    "JSON Schema \"properties\" must be an object",
                ));
            };
            for nested in properties.values() {
                validate_parameter_schema(nested)?;
            }
        }
        if let Some(required) = obj.get("required") {
            if !required.is_array() {
                return Err(ConfigError::new("JSON Schema \"required\" must be an array"));
            }
        }
    }

    if schema_type == "array" {
        if let Some(items) = obj.get("items") {
            if !items.is_object() {
                return Err(ConfigError::new("JSON Schema \"items\" must be an object"));
            }
        }
    }

    Ok(())
}

fn require_string<'a>(
    value: Option<&'a Value>,
    field: &str,
    context: &str,
) -> Result<&'a str, ConfigError> {
    match value {
        None | Some(Value::Null) => Err(ConfigError::new(format!(
            "{context} missing required field: {field}"
        ))),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(ConfigError::new(format!(
            "Field \"{field}\" must be a string"
        ))),
    }
}
