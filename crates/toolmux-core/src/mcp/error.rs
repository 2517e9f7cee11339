//! MCP transport errors

use thiserror::Error;

/// MCP client errors
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Tool call failed: {0}")]
    ToolCallFailed(String),

    #[error("Unsupported transport for server {server}: {reason}")]
    UnsupportedTransport { server: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl McpError {
    /// Create an unsupported transport error
    pub fn unsupported(server: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnsupportedTransport {
            server: server.into(),
            reason: reason.into(),
        }
    }
}

pub type McpResult<T> = Result<T, McpError>;
