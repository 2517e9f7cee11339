//! Routes a model-issued tool call to its owning session
//!
//! `dispatch` never fails. Every problem becomes a failed `ToolOutcome`
//! whose payload is shown to the model and the user in place of a result.

use std::sync::Arc;

use serde_json::Value;

use crate::logging::Logger;
use crate::types::{ToolCall, ToolFailure, ToolOutcome};

use super::registry::SessionRegistry;
use super::split_qualified_name;

pub struct ToolDispatcher<'a> {
    registry: &'a SessionRegistry,
    logger: Arc<dyn Logger>,
}

impl<'a> ToolDispatcher<'a> {
    pub fn new(registry: &'a SessionRegistry, logger: Arc<dyn Logger>) -> Self {
        Self { registry, logger }
    }

    pub async fn dispatch(&self, call: &ToolCall) -> ToolOutcome {
        let outcome = self.try_dispatch(call).await.unwrap_or_else(ToolOutcome::failed);
        match &outcome.failure {
            None => self.logger.info(&format!(
                "[ToolDispatcher] {} succeeded ({} bytes)",
                call.name,
                outcome.payload.len()
            )),
            Some(failure) => self
                .logger
                .warn(&format!("[ToolDispatcher] {} failed: {}", call.name, failure)),
        }
        outcome
    }

    async fn try_dispatch(&self, call: &ToolCall) -> Result<ToolOutcome, ToolFailure> {
        let (server, tool) = split_qualified_name(&call.name).ok_or_else(|| ToolFailure::ToolNotFound {
            server: call.name.clone(),
        })?;

        let session = self
            .registry
            .session(server)
            .ok_or_else(|| ToolFailure::ToolNotFound {
                server: server.to_string(),
            })?;

        // Tool arguments are a JSON object; anything else is refused, not dropped
        let arguments = serde_json::from_str::<Value>(&call.arguments)
            .ok()
            .filter(Value::is_object)
            .ok_or_else(|| ToolFailure::InvalidToolArguments {
                tool: call.name.clone(),
            })?;

        self.logger.debug(&format!(
            "[ToolDispatcher] Calling '{}' on '{}' with {}",
            tool, server, arguments
        ));

        let result = session
            .call_tool(tool, arguments)
            .await
            .map_err(|e| ToolFailure::TransportFailure {
                server: server.to_string(),
                tool: tool.to_string(),
                message: e.to_string(),
            })?;

        let content = result.content.filter(|c| !c.is_empty());
        if result.is_error {
            return Err(ToolFailure::ToolReportedError {
                server: server.to_string(),
                tool: tool.to_string(),
                message: content.unwrap_or_else(|| "no details".to_string()),
            });
        }

        content.map(ToolOutcome::success).ok_or_else(|| ToolFailure::EmptyToolResult {
            server: server.to_string(),
            tool: tool.to_string(),
        })
    }
}
