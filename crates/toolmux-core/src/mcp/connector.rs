//! Session construction

use std::sync::Arc;

use async_trait::async_trait;

use super::client::McpClient;
use super::error::McpResult;
use super::session::ToolSession;
use super::transport::TransportSpec;
use crate::logging::Logger;

/// Opens a session for a resolved transport
#[async_trait]
pub trait SessionConnector: Send + Sync {
    async fn connect(&self, server_name: &str, spec: &TransportSpec) -> McpResult<Box<dyn ToolSession>>;
}

/// Connector that opens real rmcp sessions
pub struct McpConnector {
    logger: Arc<dyn Logger>,
}

impl McpConnector {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self { logger }
    }
}

#[async_trait]
impl SessionConnector for McpConnector {
    async fn connect(&self, server_name: &str, spec: &TransportSpec) -> McpResult<Box<dyn ToolSession>> {
        let client = McpClient::connect(server_name, spec, Arc::clone(&self.logger)).await?;
        Ok(Box::new(client))
    }
}
