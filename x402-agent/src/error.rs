//! Error taxonomy for the x402 agent workspace.
//!
//! Each failure kind is a dedicated struct carrying its contextual fields,
//! unified under [`AgentError`]. Configuration and schema-registration
//! errors are fatal to startup; everything else is caught at the tool
//! invocation boundary and converted into a structured error payload.

use std::fmt;

/// Top-level error type for x402 agent operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AgentError {
    /// Malformed or missing configuration, unresolved environment variable.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// Invalid tool invocation (unknown tool, bad arguments).
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Call against an endpoint not marked trusted.
    #[error("{0}")]
    Trust(#[from] TrustError),

    /// Malformed parameter schema encountered while building a validator.
    #[error("{0}")]
    SchemaConversion(#[from] SchemaConversionError),

    /// Transport failure, non-2xx response, or retry exhaustion.
    #[error("{0}")]
    Network(#[from] NetworkError),

    /// Payment-protocol failure reported by the transport.
    #[error("{0}")]
    Payment(#[from] PaymentError),
}

/// Configuration-related error (invalid document, missing file, unset
/// environment variable). Fatal: aborts startup.
#[derive(Debug, Clone)]
pub struct ConfigError {
    /// Human-readable description of the violation.
    pub message: String,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Invalid tool invocation: unknown tool name or a missing/null required
/// argument. Recoverable; reported to the caller as a structured failure.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Human-readable description of the violation.
    pub message: String,
    /// The offending field or parameter name, if known.
    pub field: Option<String>,
}

impl ValidationError {
    /// Creates a new validation error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field: None,
        }
    }

    /// Sets the offending field name.
    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Call against an endpoint that is not trusted for autonomous execution.
#[derive(Debug, Clone)]
pub struct TrustError {
    /// The untrusted endpoint's identifier.
    pub endpoint_id: String,
}

impl TrustError {
    /// Creates a new trust error for the given endpoint id.
    #[must_use]
    pub fn new(endpoint_id: impl Into<String>) -> Self {
        Self {
            endpoint_id: endpoint_id.into(),
        }
    }
}

impl fmt::Display for TrustError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Endpoint \"{}\" is not trusted for autonomous execution. \
             Set \"trusted\": true in the endpoint configuration to allow autonomous calls.",
            self.endpoint_id
        )
    }
}

impl std::error::Error for TrustError {}

/// Failure while converting a declared parameter schema into a runtime
/// argument validator. Occurs only at registration time.
#[derive(Debug, Clone)]
pub struct SchemaConversionError {
    /// Human-readable description of the problem.
    pub message: String,
    /// The offending declared schema type, if known.
    pub schema_type: Option<String>,
    /// Dotted/bracketed path to the offending property (e.g. `tags[]`).
    pub property_path: Option<String>,
}

impl SchemaConversionError {
    /// Creates a new schema conversion error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            schema_type: None,
            property_path: None,
        }
    }

    /// Sets the offending schema type.
    #[must_use]
    pub fn with_schema_type(mut self, schema_type: impl Into<String>) -> Self {
        self.schema_type = Some(schema_type.into());
        self
    }

    /// Sets the offending property path.
    #[must_use]
    pub fn with_property_path(mut self, path: impl Into<String>) -> Self {
        self.property_path = Some(path.into());
        self
    }
}

impl fmt::Display for SchemaConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SchemaConversionError {}

/// Network-level failure: unreachable endpoint, non-2xx response, or
/// retry exhaustion. Carries the status code and URL when known.
#[derive(Debug, Clone)]
pub struct NetworkError {
    /// Human-readable description of the failure.
    pub message: String,
    /// HTTP status code, if a response was received.
    pub status_code: Option<u16>,
    /// The endpoint URL, if known.
    pub url: Option<String>,
}

impl NetworkError {
    /// Creates a new network error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: None,
            url: None,
        }
    }

    /// Sets the HTTP status code.
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status_code = Some(status);
        self
    }

    /// Sets the endpoint URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Returns `true` if this error carries a client-class (4xx) status.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status_code.is_some_and(|s| (400..500).contains(&s))
    }
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for NetworkError {}

/// Payment-protocol failure (transaction failure, insufficient funds).
#[derive(Debug, Clone)]
pub struct PaymentError {
    /// Human-readable description of the failure.
    pub message: String,
    /// Transaction hash, if one was produced before the failure.
    pub tx_hash: Option<String>,
    /// Payment amount, if known.
    pub amount: Option<String>,
}

impl PaymentError {
    /// Creates a new payment error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            tx_hash: None,
            amount: None,
        }
    }

    /// Sets the transaction hash.
    #[must_use]
    pub fn with_tx_hash(mut self, tx_hash: impl Into<String>) -> Self {
        self.tx_hash = Some(tx_hash.into());
        self
    }

    /// Sets the payment amount.
    #[must_use]
    pub fn with_amount(mut self, amount: impl Into<String>) -> Self {
        self.amount = Some(amount.into());
        self
    }
}

impl fmt::Display for PaymentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for PaymentError {}
