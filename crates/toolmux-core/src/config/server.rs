//! Tool server descriptors

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// How a tool server is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Spawn a local process and speak over stdio
    Command,
    /// Legacy Server-Sent-Events endpoint
    Sse,
    /// Streamable HTTP endpoint
    Streamable,
    /// Any kind this client does not know how to build
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportKind::Command => write!(f, "command"),
            TransportKind::Sse => write!(f, "sse"),
            TransportKind::Streamable => write!(f, "streamable"),
            TransportKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// Where the client runs, which limits the transports it can build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostEnvironment {
    /// Native process: every transport is available
    #[default]
    Native,
    /// Sandboxed web host: only HTTP-based transports
    Web,
}

/// Static description of one tool server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerDescriptor {
    /// Unique server name, also the tool namespace
    pub name: String,
    /// Transport kind
    #[serde(rename = "type", alias = "transport", alias = "transportKind")]
    pub transport_kind: TransportKind,
    /// Endpoint URL for HTTP transports (absolute, or relative to `base_url`)
    #[serde(default, alias = "endpoint", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Executable for the command transport
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Arguments for the command transport
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    /// Extra environment for the command transport
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
    /// Whether the server is connected by `connect_enabled_servers`
    #[serde(default, alias = "isOpen")]
    pub enabled: bool,
}

impl ServerDescriptor {
    fn new(name: impl Into<String>, transport_kind: TransportKind) -> Self {
        Self {
            name: name.into(),
            transport_kind,
            url: None,
            command: None,
            args: Vec::new(),
            env: BTreeMap::new(),
            enabled: true,
        }
    }

    /// Descriptor for a Streamable HTTP server
    pub fn streamable(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::new(name, TransportKind::Streamable)
        }
    }

    /// Descriptor for a legacy SSE server
    pub fn sse(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::new(name, TransportKind::Sse)
        }
    }

    /// Descriptor for a spawned stdio server
    pub fn command(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            command: Some(command.into()),
            ..Self::new(name, TransportKind::Command)
        }
    }

    /// Set command arguments
    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Set the enabled flag
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}
