//! Errors surfaced by the exposed client operations

use thiserror::Error;

use crate::config::ConfigError;
use crate::mcp::McpError;
use crate::providers::ProviderError;

/// One server that could not be connected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectFailure {
    pub server: String,
    pub error: String,
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Server configuration not found: {0}")]
    ConfigNotFound(String),

    #[error("Unsupported transport for server {server}: {reason}")]
    UnsupportedTransport { server: String, reason: String },

    #[error("Not connected to any server")]
    NotConnected,

    #[error("Transport failure on server {server}: {source}")]
    TransportFailure {
        server: String,
        #[source]
        source: McpError,
    },

    #[error("Chat endpoint error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Recursion limit of {limit} exceeded")]
    RecursionLimitExceeded { limit: usize },

    #[error("Query cancelled")]
    Cancelled,

    #[error("No server could be connected ({} failed)", .0.len())]
    NoServerConnected(Vec<ConnectFailure>),
}

impl ClientError {
    /// Classify a transport error raised while connecting to `server`
    pub fn from_transport(server: impl Into<String>, error: McpError) -> Self {
        match error {
            McpError::UnsupportedTransport { server, reason } => {
                ClientError::UnsupportedTransport { server, reason }
            }
            source => ClientError::TransportFailure {
                server: server.into(),
                source,
            },
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
