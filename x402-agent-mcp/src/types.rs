//! Protocol types for the agent-facing tool boundary.
//!
//! Framework-agnostic representations of tool-call requests, results, and
//! tool listings, based on `serde_json::Value` so they adapt to any MCP
//! SDK implementation.

use serde::{Deserialize, Serialize};
use x402_agent::config::ParameterSchema;

/// Parameters of a tool invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallToolParams {
    /// The tool name to invoke (an endpoint id).
    pub name: String,
    /// Arguments to pass to the tool.
    #[serde(default)]
    pub arguments: serde_json::Map<String, serde_json::Value>,
}

/// A single content item in a tool call result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
#[non_exhaustive]
pub enum ContentItem {
    /// Text content.
    Text {
        /// The text value.
        text: String,
    },
}

impl ContentItem {
    /// Creates a new text content item.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Returns the text content if this is a text item.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
        }
    }
}

/// Result of a tool invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallToolResult {
    /// Content items returned by the tool.
    #[serde(default)]
    pub content: Vec<ContentItem>,
    /// Whether the tool returned an error.
    #[serde(default, rename = "isError", skip_serializing_if = "is_false")]
    pub is_error: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)] // serde skip_serializing_if signature
fn is_false(value: &bool) -> bool {
    !value
}

/// One entry of the tool listing boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Tool name (the endpoint id).
    pub name: String,
    /// Tool description (the endpoint description).
    pub description: String,
    /// The endpoint's declared parameter schema.
    #[serde(rename = "inputSchema")]
    pub input_schema: ParameterSchema,
}

/// Structured payload reported to the caller when a tool call fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolErrorPayload {
    /// Human-readable error message.
    pub error: String,
    /// The tool the failure occurred in.
    pub tool: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_params_default_to_empty_arguments() {
        let params: CallToolParams =
            serde_json::from_value(serde_json::json!({"name": "web_search"})).unwrap();
        assert_eq!(params.name, "web_search");
        assert!(params.arguments.is_empty());
    }

    #[test]
    fn error_flag_is_omitted_on_success() {
        let result = CallToolResult {
            content: vec![ContentItem::text("ok")],
            is_error: false,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("isError").is_none());
        assert_eq!(json["content"][0]["type"], "text");
    }
}
