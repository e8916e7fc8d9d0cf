//! Payment-aware HTTP request execution for x402 agent tooling.
//!
//! This crate turns a validated [`Endpoint`](x402_agent::Endpoint) plus an
//! argument object into a safely retried, payment-aware network call:
//!
//! - [`transport`] — the [`PaymentTransport`](transport::PaymentTransport)
//!   abstraction over a payment-capable HTTP client, and its
//!   reqwest-middleware adapter. The transport collaborator autonomously
//!   resolves HTTP 402 challenges; this crate never implements payment
//!   signing itself.
//! - [`receipt`] — cross-format extraction of payment-receipt metadata
//!   from response headers, as an ordered list of parser strategies.
//! - [`executor`] — the [`PaymentExecutor`](executor::PaymentExecutor),
//!   which builds the outbound request, dispatches it through the
//!   transport under the retry policy, and normalizes the result.
//!
//! Every call, successful or not, emits one audit record under the
//! `x402_agent::audit` tracing target — the system's only durable record
//! of payment activity.

pub mod audit;
pub mod executor;
pub mod receipt;
pub mod transport;

pub use executor::PaymentExecutor;
pub use receipt::PaymentReceipt;
pub use transport::{PaymentTransport, ReqwestTransport, TransportError};
