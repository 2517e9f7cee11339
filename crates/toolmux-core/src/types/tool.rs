//! Tool/function calling types

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Tool definition offered to the chat endpoint
///
/// `qualified_name` is `<server>__<tool>`; see [`crate::tools::QUALIFIED_NAME_SEPARATOR`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Namespaced function name
    #[serde(rename = "qualifiedName")]
    pub qualified_name: String,
    /// Description shown to the model
    pub description: String,
    /// JSON Schema for the input parameters
    #[serde(rename = "parameterSchema")]
    pub parameter_schema: Value,
}

impl ToolDescriptor {
    /// Create a new tool descriptor with an empty object schema
    pub fn new(qualified_name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            description: description.into(),
            parameter_schema: Value::Object(Default::default()),
        }
    }

    /// Set the parameter schema
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.parameter_schema = schema;
        self
    }
}

/// Tool call requested by the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this tool call
    pub id: String,
    /// Qualified name of the function being called
    #[serde(rename = "functionName")]
    pub name: String,
    /// Raw JSON arguments, exactly as produced by the model
    #[serde(rename = "argumentsJSON")]
    pub arguments: String,
}

impl ToolCall {
    /// Create a new tool call
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

/// Why a tool call did not produce a usable result
///
/// These never abort a query; the dispatcher folds them into a failed
/// [`ToolOutcome`] whose payload is shown to the model and the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolFailure {
    #[error("Error: Server {server} not found")]
    ToolNotFound { server: String },

    #[error("Error: Invalid arguments for tool {tool}")]
    InvalidToolArguments { tool: String },

    #[error("{server} failed to retrieve data with tool {tool}")]
    EmptyToolResult { server: String, tool: String },

    #[error("Error: Tool {tool} on {server} reported an error: {message}")]
    ToolReportedError {
        server: String,
        tool: String,
        message: String,
    },

    #[error("Error: Tool {tool} on {server} failed: {message}")]
    TransportFailure {
        server: String,
        tool: String,
        message: String,
    },
}

/// Result of dispatching one tool call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutcome {
    /// Whether the tool produced content
    pub succeeded: bool,
    /// The tool's content, or a description of the failure
    pub payload: String,
    /// Failure classification, `None` when `succeeded`
    #[serde(skip)]
    pub failure: Option<ToolFailure>,
}

impl ToolOutcome {
    /// Create a successful outcome
    pub fn success(payload: impl Into<String>) -> Self {
        Self {
            succeeded: true,
            payload: payload.into(),
            failure: None,
        }
    }

    /// Create a failed outcome described by `failure`
    pub fn failed(failure: ToolFailure) -> Self {
        Self {
            succeeded: false,
            payload: failure.to_string(),
            failure: Some(failure),
        }
    }
}

impl From<ToolFailure> for ToolOutcome {
    fn from(failure: ToolFailure) -> Self {
        ToolOutcome::failed(failure)
    }
}
