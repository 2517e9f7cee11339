//! Toolmux Core
//!
//! Multi-server tool orchestration for LLM chat endpoints. Connects to
//! several MCP tool servers, offers their tools to the model under
//! `<server>__<tool>` names, routes the model's tool calls back to the
//! owning server and keeps the conversation going until the model answers
//! in plain text.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use toolmux_core::{ConsoleLogger, FileConfigProvider, McpChatClient};
//!
//! let logger = Arc::new(ConsoleLogger::new());
//! let mut client = McpChatClient::load(&FileConfigProvider::user(), logger).await?;
//! client.connect_enabled_servers().await?;
//!
//! let answer = client.process_query("find the release notes for 0.3").await?;
//! client.cleanup().await;
//! ```

pub mod types;
pub mod logging;
pub mod config;
pub mod mcp;
pub mod providers;
pub mod tools;
pub mod client;

pub use types::{
    AssistantChoice, CancellationToken, ChatMessage, MessageRole, ToolCall, ToolDescriptor,
    ToolFailure, ToolOutcome,
};

pub use logging::{ConsoleLogger, Logger, MemoryLogger, NoOpLogger};

pub use config::{
    ClientConfig, ConfigProvider, FileConfigProvider, HostEnvironment, MemoryConfigProvider,
    ServerDescriptor, TransportKind,
};

pub use providers::{create_provider, GenaiProvider, MockProvider, Provider};

pub use mcp::{McpClient, McpConnector, McpError, McpResult, SessionConnector, ToolSession};

pub use tools::{SessionRegistry, ToolCatalog, ToolDispatcher, QUALIFIED_NAME_SEPARATOR};

pub use client::{
    ClientError, ClientResult, ConnectReport, ConversationDriver, McpChatClient, Transcript,
};
