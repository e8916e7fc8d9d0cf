//! Tool invocation routing and validation.
//!
//! The [`ToolRouter`] sits between the agent transport and the
//! payment-aware executor. At construction it converts every registered
//! endpoint's parameter schema into a runtime validator (a malformed
//! schema is fatal, so it surfaces at startup rather than mid-call). Per
//! invocation it enforces, in order: the tool name resolves to a
//! registered endpoint, the endpoint is trusted for autonomous execution,
//! every declared required argument is present and non-null, and the
//! supplied arguments conform to the converted shape.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, error};
use x402_agent::config::EndpointCallResult;
use x402_agent::error::{AgentError, TrustError, ValidationError};
use x402_agent::registry::EndpointRegistry;
use x402_agent::schema::{self, ArgumentShape};
use x402_agent_http::executor::PaymentExecutor;
use x402_agent_http::transport::PaymentTransport;

use crate::types::{CallToolParams, CallToolResult, ContentItem, ToolDescriptor, ToolErrorPayload};

/// Routes tool invocations to the payment-aware executor.
pub struct ToolRouter<T> {
    registry: Arc<EndpointRegistry>,
    executor: PaymentExecutor<T>,
    shapes: HashMap<String, Option<ArgumentShape>>,
}

impl<T> std::fmt::Debug for ToolRouter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRouter")
            .field("tools", &self.shapes.len())
            .finish_non_exhaustive()
    }
}

impl<T: PaymentTransport> ToolRouter<T> {
    /// Builds a router over a loaded registry, converting every
    /// endpoint's parameter schema into a runtime validator.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::SchemaConversion`] if any endpoint declares a
    /// schema that cannot be converted; this is fatal to startup.
    pub fn new(
        registry: Arc<EndpointRegistry>,
        executor: PaymentExecutor<T>,
    ) -> Result<Self, AgentError> {
        let mut shapes = HashMap::with_capacity(registry.endpoints().len());
        for endpoint in registry.endpoints() {
            debug!(tool = %endpoint.id, "Registering tool");
            let shape = schema::convert(&endpoint.parameters).map_err(|mut e| {
                e.message = format!("Endpoint \"{}\": {}", endpoint.id, e.message);
                e
            })?;
            shapes.insert(endpoint.id.clone(), shape);
        }
        Ok(Self {
            registry,
            executor,
            shapes,
        })
    }

    /// Produces the tool listing: one descriptor per registered endpoint.
    #[must_use]
    pub fn list_tools(&self) -> Vec<ToolDescriptor> {
        self.registry
            .endpoints()
            .iter()
            .map(|endpoint| ToolDescriptor {
                name: endpoint.id.clone(),
                description: endpoint.description.clone(),
                input_schema: endpoint.parameters.clone(),
            })
            .collect()
    }

    /// Handles a tool invocation.
    ///
    /// Never fails at the transport level: validation, trust, network, and
    /// payment failures all become a structured `{error, tool}` payload
    /// with `is_error` set, and the process continues serving calls.
    pub async fn call_tool(&self, params: CallToolParams) -> CallToolResult {
        debug!(tool = %params.name, "Tool call request");

        match self.dispatch(&params).await {
            Ok(result) => CallToolResult {
                content: vec![ContentItem::text(to_pretty_json(&result))],
                is_error: false,
            },
            Err(err) => {
                error!(tool = %params.name, error = %err, "Tool call failed");
                let payload = ToolErrorPayload {
                    error: err.to_string(),
                    tool: params.name.clone(),
                };
                CallToolResult {
                    content: vec![ContentItem::text(to_pretty_json(&payload))],
                    is_error: true,
                }
            }
        }
    }

    /// Validates an invocation and executes the endpoint call.
    async fn dispatch(&self, params: &CallToolParams) -> Result<EndpointCallResult, AgentError> {
        let Some(endpoint) = self.registry.endpoint(&params.name) else {
            let known = self
                .registry
                .endpoints()
                .iter()
                .map(|e| e.id.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(ValidationError::new(format!(
                "Unknown tool: \"{}\". Available tools: {known}",
                params.name
            ))
            .with_field("name")
            .into());
        };

        if !endpoint.trusted {
            return Err(TrustError::new(&endpoint.id).into());
        }

        // Required-field presence is mandatory policy, checked against the
        // descriptor's own required list before any type conformance.
        check_required(
            &params.arguments,
            endpoint.parameters.required.as_deref().unwrap_or_default(),
        )?;

        if let Some(shape) = self.shapes.get(&endpoint.id).and_then(Option::as_ref) {
            shape.validate(&params.arguments)?;
        }

        self.executor.call_endpoint(endpoint, &params.arguments).await
    }
}

/// Checks that every required parameter is present and non-null.
fn check_required(args: &Map<String, Value>, required: &[String]) -> Result<(), ValidationError> {
    for name in required {
        match args.get(name) {
            None => {
                return Err(ValidationError::new(format!(
                    "Missing required parameter: \"{name}\""
                ))
                .with_field(name));
            }
            Some(Value::Null) => {
                return Err(ValidationError::new(format!(
                    "Parameter \"{name}\" cannot be null or undefined"
                ))
                .with_field(name));
            }
            Some(_) => {}
        }
    }
    Ok(())
}

fn to_pretty_json<S: serde::Serialize>(value: &S) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_owned())
}
