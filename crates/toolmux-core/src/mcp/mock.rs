//! Mock tool sessions for testing
//!
//! Deterministic stand-ins for real servers. A `MockToolSession` is a cheap
//! handle: clones share state, so a test can keep one clone for assertions
//! after handing another to the registry.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use super::connector::SessionConnector;
use super::error::{McpError, McpResult};
use super::session::{SessionTool, ToolCallContent, ToolSession};
use super::transport::TransportSpec;
use crate::config::TransportKind;

/// Canned reply for one tool
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return this text
    Content(String),
    /// Succeed with no content
    Empty,
    /// Return this text flagged as a tool-level error
    ToolError(String),
    /// Fail at the transport level
    Fail(String),
}

/// A tool invocation seen by a mock session
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub tool: String,
    pub arguments: Value,
}

#[derive(Debug, Default)]
struct MockSessionState {
    tools: Vec<SessionTool>,
    responses: HashMap<String, MockResponse>,
    calls: Vec<RecordedCall>,
    list_error: Option<String>,
    close_error: Option<String>,
    close_count: usize,
}

/// Mock tool session
#[derive(Debug, Clone, Default)]
pub struct MockToolSession {
    state: Arc<Mutex<MockSessionState>>,
}

impl MockToolSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool with a canned response
    pub fn with_tool(self, tool: SessionTool, response: MockResponse) -> Self {
        {
            let mut state = self.state.lock();
            state.responses.insert(tool.name.clone(), response);
            state.tools.push(tool);
        }
        self
    }

    /// Shorthand: a tool that returns `content`
    pub fn with_text_tool(self, name: &str, content: &str) -> Self {
        self.with_tool(
            SessionTool::new(name, format!("{} tool", name)),
            MockResponse::Content(content.to_string()),
        )
    }

    /// Make `list_tools` fail
    pub fn failing_list(self, message: impl Into<String>) -> Self {
        self.state.lock().list_error = Some(message.into());
        self
    }

    /// Make `close` fail
    pub fn failing_close(self, message: impl Into<String>) -> Self {
        self.state.lock().close_error = Some(message.into());
        self
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().calls.clone()
    }

    /// How many times `close` ran
    pub fn close_count(&self) -> usize {
        self.state.lock().close_count
    }
}

#[async_trait]
impl ToolSession for MockToolSession {
    async fn list_tools(&self) -> McpResult<Vec<SessionTool>> {
        let state = self.state.lock();
        match &state.list_error {
            Some(message) => Err(McpError::Protocol(message.clone())),
            None => Ok(state.tools.clone()),
        }
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> McpResult<ToolCallContent> {
        let mut state = self.state.lock();
        state.calls.push(RecordedCall {
            tool: name.to_string(),
            arguments,
        });

        match state.responses.get(name) {
            Some(MockResponse::Content(text)) => Ok(ToolCallContent::text(text.clone())),
            Some(MockResponse::Empty) => Ok(ToolCallContent::empty()),
            Some(MockResponse::ToolError(text)) => Ok(ToolCallContent {
                content: Some(text.clone()),
                is_error: true,
            }),
            Some(MockResponse::Fail(message)) => Err(McpError::ToolCallFailed(message.clone())),
            None => Err(McpError::ToolCallFailed(format!("unknown tool: {}", name))),
        }
    }

    async fn close(self: Box<Self>) -> McpResult<()> {
        let mut state = self.state.lock();
        state.close_count += 1;
        match &state.close_error {
            Some(message) => Err(McpError::Protocol(message.clone())),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Default)]
struct MockConnectorState {
    sessions: HashMap<String, MockToolSession>,
    failures: HashMap<String, String>,
    attempts: Vec<(String, TransportKind)>,
}

/// Connector that hands out registered mock sessions
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    state: Arc<Mutex<MockConnectorState>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `session` for `server_name`
    pub fn with_session(self, server_name: &str, session: MockToolSession) -> Self {
        self.state
            .lock()
            .sessions
            .insert(server_name.to_string(), session);
        self
    }

    /// Fail connections to `server_name`
    pub fn with_failure(self, server_name: &str, message: impl Into<String>) -> Self {
        self.state
            .lock()
            .failures
            .insert(server_name.to_string(), message.into());
        self
    }

    /// Connection attempts so far, with the transport kind requested
    pub fn attempts(&self) -> Vec<(String, TransportKind)> {
        self.state.lock().attempts.clone()
    }
}

#[async_trait]
impl SessionConnector for MockConnector {
    async fn connect(&self, server_name: &str, spec: &TransportSpec) -> McpResult<Box<dyn ToolSession>> {
        let mut state = self.state.lock();
        state.attempts.push((server_name.to_string(), spec.kind()));

        if let Some(message) = state.failures.get(server_name) {
            return Err(McpError::ConnectionFailed(message.clone()));
        }

        match state.sessions.get(server_name) {
            Some(session) => Ok(Box::new(session.clone())),
            None => Err(McpError::ConnectionFailed(format!(
                "no mock session for {}",
                server_name
            ))),
        }
    }
}
