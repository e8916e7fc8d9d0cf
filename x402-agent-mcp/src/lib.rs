//! Agent-facing tool invocation boundary for x402 endpoint calls.
//!
//! This crate is framework-agnostic: it defines the tool-call and
//! tool-list types of the agent protocol via plain serde structures, so
//! any MCP SDK can adapt them. The [`ToolRouter`](router::ToolRouter)
//! validates invocations (known tool, trusted endpoint, required
//! arguments) and dispatches them to the payment-aware executor.
//!
//! Failures are never propagated as transport-level errors: every failed
//! call becomes a structured `{error, tool}` payload with `is_error` set.

pub mod router;
pub mod types;

pub use router::ToolRouter;
pub use types::{CallToolParams, CallToolResult, ContentItem, ToolDescriptor};
