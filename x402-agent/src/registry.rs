//! Endpoint registry: single owner of the loaded configuration.
//!
//! The registry reads the JSON configuration document, resolves `${NAME}`
//! environment placeholders in every string value, validates the document
//! structurally, and indexes endpoints by id for O(1) lookup.
//!
//! A registry can only be obtained through [`EndpointRegistry::load`] (or
//! [`EndpointRegistry::from_json`]), so an "unloaded" registry is
//! unrepresentable: every accessor operates on a fully validated
//! configuration. The registry is immutable after construction and safe
//! for concurrent reads.

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::config::{Config, Endpoint, WalletConfig};
use crate::error::ConfigError;
use crate::validate::validate_config;

static ENV_VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid regex"));

/// Loaded, validated, and indexed endpoint configuration.
#[derive(Debug, Clone)]
pub struct EndpointRegistry {
    config: Config,
    index: HashMap<String, usize>,
}

impl EndpointRegistry {
    /// Loads a configuration document from a JSON file.
    ///
    /// Environment placeholders of the form `${NAME}` anywhere in string
    /// values are resolved against the process environment; an unresolved
    /// name is a fatal error naming the variable.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read, is not valid
    /// JSON, references an unset environment variable, or fails structural
    /// validation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::new(format!(
                    "Configuration file not found at: {}\n\
                     Please create a configuration file. \
                     See example at: config/endpoints.example.json",
                    path.display()
                ))
            } else {
                ConfigError::new(format!(
                    "Failed to read configuration file {}: {e}",
                    path.display()
                ))
            }
        })?;
        Self::from_json(&content)
    }

    /// Builds a registry from a JSON configuration string, resolving
    /// placeholders against the process environment.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`EndpointRegistry::load`], minus file I/O.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        Self::from_json_with_env(content, |name| std::env::var(name).ok())
    }

    /// Builds a registry from a JSON configuration string with an explicit
    /// environment lookup.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] on parse failure, unresolved placeholder,
    /// or structural validation failure.
    pub fn from_json_with_env(
        content: &str,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let raw: Value = serde_json::from_str(content)
            .map_err(|e| ConfigError::new(format!("Invalid JSON in configuration file: {e}")))?;

        let resolved = interpolate_env_vars(raw, &env)?;
        validate_config(&resolved)?;

        let config: Config = serde_json::from_value(resolved)
            .map_err(|e| ConfigError::new(format!("Failed to load configuration: {e}")))?;

        let index = config
            .endpoints
            .iter()
            .enumerate()
            .map(|(i, endpoint)| (endpoint.id.clone(), i))
            .collect();

        debug!(
            endpoints = config.endpoints.len(),
            network = config.wallet.network.as_str(),
            "Configuration loaded and validated"
        );

        Ok(Self { config, index })
    }

    /// Looks up an endpoint by its id.
    ///
    /// An unknown id is a caller-level condition, not a registry fault,
    /// so this returns `None` rather than an error.
    #[must_use]
    pub fn endpoint(&self, id: &str) -> Option<&Endpoint> {
        self.index.get(id).map(|&i| &self.config.endpoints[i])
    }

    /// Returns all configured endpoints, in document order.
    #[must_use]
    pub fn endpoints(&self) -> &[Endpoint] {
        &self.config.endpoints
    }

    /// Returns the endpoints marked `trusted = true`, in document order.
    pub fn trusted_endpoints(&self) -> impl Iterator<Item = &Endpoint> {
        self.config.endpoints.iter().filter(|e| e.trusted)
    }

    /// Returns the wallet descriptor.
    #[must_use]
    pub fn wallet(&self) -> &WalletConfig {
        &self.config.wallet
    }

    /// Returns the complete configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns `true` iff `id` resolves to an endpoint with `trusted = true`.
    #[must_use]
    pub fn is_trusted(&self, id: &str) -> bool {
        self.endpoint(id).is_some_and(|e| e.trusted)
    }
}

/// Recursively replaces `${NAME}` placeholders in every string value.
///
/// An unresolved name aborts the load with an error naming the variable.
fn interpolate_env_vars(
    value: Value,
    env: &impl Fn(&str) -> Option<String>,
) -> Result<Value, ConfigError> {
    match value {
        Value::String(s) => {
            let mut unresolved = None;
            let replaced = ENV_VAR_PATTERN.replace_all(&s, |caps: &regex::Captures<'_>| {
                let name = &caps[1];
                env(name).unwrap_or_else(|| {
                    unresolved.get_or_insert_with(|| name.to_owned());
                    String::new()
                })
            });
            if let Some(name) = unresolved {
                return Err(ConfigError::new(format!(
                    "Environment variable {name} is not set. \
                     Please set it before starting the server."
                )));
            }
            Ok(Value::String(replaced.into_owned()))
        }
        Value::Array(items) => items
            .into_iter()
            .map(|item| interpolate_env_vars(item, env))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Value::Object(map) => map
            .into_iter()
            .map(|(key, item)| Ok((key, interpolate_env_vars(item, env)?)))
            .collect::<Result<serde_json::Map<_, _>, ConfigError>>()
            .map(Value::Object),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpMethod;

    const DOC: &str = r#"{
        "wallet": {
            "provider": "cdp-embedded",
            "network": "base",
            "privateKey": "${WALLET_KEY}"
        },
        "endpoints": [
            {
                "id": "web_search",
                "name": "Web Search",
                "url": "https://api.example.com/search",
                "method": "GET",
                "description": "Search the web and return ranked results.",
                "category": "search",
                "parameters": {
                    "type": "object",
                    "properties": { "q": { "type": "string" } },
                    "required": ["q"]
                },
                "trusted": true
            },
            {
                "id": "image_gen",
                "name": "Image Generation",
                "url": "https://api.example.com/images",
                "method": "POST",
                "description": "Generate an image from a text prompt.",
                "parameters": { "type": "object" },
                "trusted": false
            }
        ]
    }"#;

    fn env(name: &str) -> Option<String> {
        (name == "WALLET_KEY")
            .then(|| "0x2222222222222222222222222222222222222222222222222222222222222222".into())
    }

    #[test]
    fn loads_and_indexes_endpoints() {
        let registry = EndpointRegistry::from_json_with_env(DOC, env).unwrap();
        assert_eq!(registry.endpoints().len(), 2);

        let search = registry.endpoint("web_search").unwrap();
        assert_eq!(search.method, HttpMethod::Get);
        assert!(registry.endpoint("nope").is_none());
    }

    #[test]
    fn resolves_env_placeholders() {
        let registry = EndpointRegistry::from_json_with_env(DOC, env).unwrap();
        assert!(registry.wallet().private_key.starts_with("0x2222"));
    }

    #[test]
    fn unresolved_placeholder_is_fatal() {
        let err = EndpointRegistry::from_json_with_env(DOC, |_| None).unwrap_err();
        assert!(err.message.contains("WALLET_KEY"), "{err}");
    }

    #[test]
    fn trust_accessors_filter_correctly() {
        let registry = EndpointRegistry::from_json_with_env(DOC, env).unwrap();
        let trusted: Vec<_> = registry.trusted_endpoints().map(|e| e.id.as_str()).collect();
        assert_eq!(trusted, ["web_search"]);
        assert!(registry.is_trusted("web_search"));
        assert!(!registry.is_trusted("image_gen"));
        assert!(!registry.is_trusted("missing"));
    }

    #[test]
    fn loading_twice_yields_identical_content() {
        let a = EndpointRegistry::from_json_with_env(DOC, env).unwrap();
        let b = EndpointRegistry::from_json_with_env(DOC, env).unwrap();
        assert_eq!(a.config(), b.config());
    }

    #[test]
    fn invalid_json_is_a_config_error() {
        let err = EndpointRegistry::from_json_with_env("{ not json", env).unwrap_err();
        assert!(err.message.contains("Invalid JSON"), "{err}");
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = EndpointRegistry::load("/nonexistent/endpoints.json").unwrap_err();
        assert!(err.message.contains("/nonexistent/endpoints.json"), "{err}");
    }

    #[test]
    fn interpolation_reaches_nested_arrays() {
        let value = serde_json::json!({
            "list": [{ "inner": "prefix-${WALLET_KEY}-suffix" }]
        });
        let resolved = interpolate_env_vars(value, &env).unwrap();
        let inner = resolved["list"][0]["inner"].as_str().unwrap();
        assert!(inner.starts_with("prefix-0x2222"));
        assert!(inner.ends_with("-suffix"));
    }
}
