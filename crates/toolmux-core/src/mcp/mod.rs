//! MCP (Model Context Protocol) sessions
//!
//! Uses the official rmcp SDK to talk to tool servers. Three transports:
//! spawned stdio processes, legacy SSE endpoints and Streamable HTTP.
//!
//! # Example
//!
//! ```rust,ignore
//! use toolmux_core::mcp::{McpClient, ToolSession};
//!
//! let client = McpClient::connect_streamable_http("docs", "http://localhost:8080/mcp", logger).await?;
//! let tools = client.list_tools().await?;
//! let result = client.call_tool("search", json!({ "q": "rust" })).await?;
//! ```

mod error;
mod session;
mod transport;
mod client;
mod sse;
mod connector;
mod mock;

pub use error::{McpError, McpResult};
pub use session::{SessionTool, ToolCallContent, ToolSession};
pub use transport::{CommandSpec, HttpTransport, TransportSpec};
pub use client::McpClient;
pub use connector::{McpConnector, SessionConnector};
pub use mock::{MockConnector, MockResponse, MockToolSession, RecordedCall};

// Re-export rmcp types that consumers might need
pub use rmcp::model::{Tool as McpTool, CallToolResult as McpToolResult};
