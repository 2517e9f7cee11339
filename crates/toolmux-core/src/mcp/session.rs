//! The capability set the orchestration core needs from one tool server

use async_trait::async_trait;
use rmcp::model::{CallToolResult, RawContent, Tool};
use serde_json::Value;

use super::error::McpResult;

/// A tool as listed by its server, before namespacing
#[derive(Debug, Clone, PartialEq)]
pub struct SessionTool {
    /// Tool name local to the server
    pub name: String,
    /// Tool description, if the server gave one
    pub description: Option<String>,
    /// JSON Schema for the tool's input
    pub input_schema: Value,
}

impl SessionTool {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: Some(description.into()),
            input_schema: serde_json::json!({ "type": "object" }),
        }
    }

    /// Set the input schema
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.input_schema = schema;
        self
    }
}

impl From<Tool> for SessionTool {
    fn from(tool: Tool) -> Self {
        Self {
            name: tool.name.to_string(),
            description: tool.description.map(|s| s.to_string()),
            input_schema: serde_json::to_value(tool.input_schema.as_ref()).unwrap_or_default(),
        }
    }
}

/// What a tool invocation returned
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolCallContent {
    /// Text content; `None` when the tool produced nothing
    pub content: Option<String>,
    /// Whether the server flagged the result as a tool-level error
    pub is_error: bool,
}

impl ToolCallContent {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            is_error: false,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

impl From<CallToolResult> for ToolCallContent {
    fn from(result: CallToolResult) -> Self {
        // Text parts first, then structured content, then raw JSON of whatever else came back
        let texts: Vec<String> = result
            .content
            .iter()
            .filter_map(|c| match &c.raw {
                RawContent::Text(t) => Some(t.text.clone()),
                _ => None,
            })
            .collect();

        let content = if !texts.is_empty() {
            Some(texts.join("\n"))
        } else if let Some(structured) = &result.structured_content {
            Some(structured.to_string())
        } else if !result.content.is_empty() {
            serde_json::to_string(&result.content).ok()
        } else {
            None
        };

        Self {
            content: content.filter(|s| !s.is_empty()),
            is_error: result.is_error.unwrap_or(false),
        }
    }
}

/// One live connection to a tool server
///
/// `McpClient` is the real implementation; `MockToolSession` stands in for
/// it in tests.
#[async_trait]
pub trait ToolSession: Send + Sync {
    /// List the server's tools
    async fn list_tools(&self) -> McpResult<Vec<SessionTool>>;

    /// Invoke a tool by its local name
    async fn call_tool(&self, name: &str, arguments: Value) -> McpResult<ToolCallContent>;

    /// Close the connection
    async fn close(self: Box<Self>) -> McpResult<()>;
}
