//! MCP Client using the official rmcp SDK
//!
//! One constructor per transport variant; `connect` picks among them.

use std::sync::Arc;

use async_trait::async_trait;
use rmcp::{
    ServiceExt,
    model::{CallToolRequestParams, ClientCapabilities, ClientInfo, Implementation},
    service::RunningService,
    transport::{ConfigureCommandExt, StreamableHttpClientTransport, TokioChildProcess},
    RoleClient,
};
use reqwest::Url;
use serde_json::Value;

use super::error::{McpError, McpResult};
use super::session::{SessionTool, ToolCallContent, ToolSession};
use super::sse;
use super::transport::{CommandSpec, HttpTransport, TransportSpec};
use crate::logging::Logger;

/// MCP client bound to one tool server
pub struct McpClient {
    /// Configured server name, used in logs
    server_name: String,
    /// The underlying rmcp running service
    client: RunningService<RoleClient, ClientInfo>,
    logger: Arc<dyn Logger>,
}

fn client_info() -> ClientInfo {
    ClientInfo {
        meta: None,
        protocol_version: Default::default(),
        capabilities: ClientCapabilities::default(),
        client_info: Implementation {
            name: "toolmux-core".to_string(),
            title: Some("Toolmux".to_string()),
            version: env!("CARGO_PKG_VERSION").to_string(),
            website_url: None,
            icons: None,
        },
    }
}

impl McpClient {
    /// Connect using whichever transport `spec` names
    pub async fn connect(
        server_name: &str,
        spec: &TransportSpec,
        logger: Arc<dyn Logger>,
    ) -> McpResult<Self> {
        match spec {
            TransportSpec::Command(command) => Self::connect_child_process(server_name, command, logger).await,
            TransportSpec::Http(http) => Self::connect_http(server_name, http, logger).await,
        }
    }

    /// Connect over one of the HTTP transports
    pub async fn connect_http(
        server_name: &str,
        spec: &HttpTransport,
        logger: Arc<dyn Logger>,
    ) -> McpResult<Self> {
        match spec {
            HttpTransport::Sse { url } => Self::connect_sse(server_name, url, logger).await,
            HttpTransport::Streamable { url } => {
                Self::connect_streamable_http(server_name, url.as_str(), logger).await
            }
        }
    }

    /// Spawn a local server and talk to it over stdio
    pub async fn connect_child_process(
        server_name: &str,
        spec: &CommandSpec,
        logger: Arc<dyn Logger>,
    ) -> McpResult<Self> {
        logger.info(&format!(
            "[McpClient] Spawning '{}' for server '{}'",
            spec.program, server_name
        ));

        let transport = TokioChildProcess::new(tokio::process::Command::new(&spec.program).configure(|cmd| {
            cmd.args(&spec.args).envs(&spec.env);
        }))
        .map_err(|e| McpError::ConnectionFailed(format!("spawn {}: {}", spec.program, e)))?;

        let client = client_info()
            .serve(transport)
            .await
            .map_err(|e| McpError::InitializationFailed(e.to_string()))?;

        Ok(Self::initialized(server_name, client, logger))
    }

    /// Connect to a legacy SSE server
    pub async fn connect_sse(server_name: &str, url: &Url, logger: Arc<dyn Logger>) -> McpResult<Self> {
        logger.info(&format!("[McpClient] Connecting to SSE: {}", url));

        let transport = sse::open(url, Arc::clone(&logger)).await?;

        let client = client_info()
            .serve(transport)
            .await
            .map_err(|e| McpError::InitializationFailed(e.to_string()))?;

        Ok(Self::initialized(server_name, client, logger))
    }

    /// Connect to a Streamable HTTP server
    pub async fn connect_streamable_http(
        server_name: &str,
        url: &str,
        logger: Arc<dyn Logger>,
    ) -> McpResult<Self> {
        logger.info(&format!("[McpClient] Connecting to HTTP: {}", url));

        let transport = StreamableHttpClientTransport::from_uri(url);

        let client = client_info()
            .serve(transport)
            .await
            .map_err(|e| McpError::InitializationFailed(e.to_string()))?;

        Ok(Self::initialized(server_name, client, logger))
    }

    fn initialized(
        server_name: &str,
        client: RunningService<RoleClient, ClientInfo>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        logger.info(&format!(
            "[McpClient] Connected and initialized '{}'",
            server_name
        ));
        Self {
            server_name: server_name.to_string(),
            client,
            logger,
        }
    }

    /// Cancel the running service
    pub async fn shutdown(self) -> McpResult<()> {
        self.logger.info(&format!(
            "[McpClient] Closing connection to '{}'",
            self.server_name
        ));
        self.client
            .cancel()
            .await
            .map_err(|e| McpError::Protocol(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl ToolSession for McpClient {
    async fn list_tools(&self) -> McpResult<Vec<SessionTool>> {
        let tools = self
            .client
            .list_all_tools()
            .await
            .map_err(|e| McpError::Protocol(e.to_string()))?;

        self.logger.debug(&format!(
            "[McpClient] '{}' listed {} tools",
            self.server_name,
            tools.len()
        ));

        Ok(tools.into_iter().map(SessionTool::from).collect())
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> McpResult<ToolCallContent> {
        self.logger.info(&format!(
            "[McpClient] Calling tool '{}' on '{}'",
            name, self.server_name
        ));

        let arguments = match arguments {
            Value::Object(map) => map,
            other => {
                return Err(McpError::ToolCallFailed(format!(
                    "arguments for '{}' must be a JSON object, got {}",
                    name, other
                )))
            }
        };

        let params = CallToolRequestParams {
            meta: None,
            name: name.to_owned().into(),
            arguments: Some(arguments),
            task: None,
        };

        let result = self
            .client
            .call_tool(params)
            .await
            .map_err(|e| McpError::ToolCallFailed(e.to_string()))?;

        Ok(ToolCallContent::from(result))
    }

    async fn close(self: Box<Self>) -> McpResult<()> {
        (*self).shutdown().await
    }
}
