//! Endpoint registry and payment-aware call plumbing for x402 agents.
//!
//! This crate is the core of an agent-facing gateway that exposes remote,
//! pay-per-call HTTP endpoints as callable tools. It owns the declarative
//! configuration model and everything that can be decided without touching
//! the network:
//!
//! - [`config`] — the configuration data model (wallet descriptor, endpoint
//!   descriptors, recursive parameter schemas) as it appears in the JSON
//!   configuration document.
//! - [`validate`] — fail-fast structural validation of a raw configuration
//!   document before anything is registered.
//! - [`registry`] — the [`EndpointRegistry`](registry::EndpointRegistry),
//!   the single owner of the loaded configuration, with `${NAME}`
//!   environment interpolation and O(1) endpoint lookup.
//! - [`schema`] — conversion of declared parameter schemas into runtime
//!   argument validators.
//! - [`retry`] — a generic exponential-backoff retry policy for fallible
//!   async operations.
//! - [`error`] — the error taxonomy shared across the workspace.
//!
//! Network execution lives in `x402-agent-http`; the agent-facing tool
//! boundary lives in `x402-agent-mcp`.

pub mod config;
pub mod error;
pub mod registry;
pub mod retry;
pub mod schema;
pub mod validate;

pub use config::{Config, Endpoint, EndpointCallResult, HttpMethod, Network, WalletConfig};
pub use error::AgentError;
pub use registry::EndpointRegistry;
pub use retry::RetryPolicy;
