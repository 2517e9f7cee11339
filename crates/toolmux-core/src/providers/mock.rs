//! Mock provider for testing
//!
//! Deterministic responses without network access. Clones share state, so
//! a test can inspect recorded requests after handing the provider to a
//! client.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

use super::error::{ProviderError, ProviderResult};
use super::traits::{ChatOptions, Provider, ProviderModelConfig};
use crate::logging::Logger;
use crate::types::{AssistantChoice, ChatMessage, MessageRole, ToolDescriptor};

/// Mock response mode
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Echo back the last user message
    Echo,
    /// Return a fixed text response
    Fixed(String),
    /// Return queued responses in order; fails once exhausted
    Script(VecDeque<Vec<AssistantChoice>>),
    /// Fail every request
    Error(String),
}

impl Default for MockMode {
    fn default() -> Self {
        MockMode::Echo
    }
}

/// A request seen by the mock
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub messages: Vec<ChatMessage>,
    pub model: String,
    pub tools: Option<Vec<ToolDescriptor>>,
}

impl RecordedRequest {
    /// Concatenated message text, for substring assertions
    pub fn text(&self) -> String {
        self.messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Default)]
struct MockState {
    mode: MockMode,
    requests: Vec<RecordedRequest>,
}

/// Mock chat endpoint
#[derive(Clone)]
pub struct MockProvider {
    state: Arc<Mutex<MockState>>,
    logger: Arc<dyn Logger>,
}

impl MockProvider {
    pub fn with_mode(mode: MockMode, logger: Arc<dyn Logger>) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                mode,
                requests: Vec::new(),
            })),
            logger,
        }
    }

    /// Create an echo provider (echoes back the last user message)
    pub fn echo(logger: Arc<dyn Logger>) -> Self {
        Self::with_mode(MockMode::Echo, logger)
    }

    /// Create a fixed response provider
    pub fn fixed(response: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        Self::with_mode(MockMode::Fixed(response.into()), logger)
    }

    /// Create a provider that plays back `responses`, one per request
    pub fn scripted(responses: Vec<Vec<AssistantChoice>>, logger: Arc<dyn Logger>) -> Self {
        Self::with_mode(MockMode::Script(responses.into()), logger)
    }

    /// Create an error-producing provider
    pub fn error(message: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        Self::with_mode(MockMode::Error(message.into()), logger)
    }

    /// Every request received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().requests.len()
    }

    fn last_user_message(messages: &[ChatMessage]) -> String {
        messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User && !m.content.is_empty())
            .map(|m| m.content.clone())
            .unwrap_or_else(|| "Hello from MockProvider!".to_string())
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        model: ProviderModelConfig,
        options: ChatOptions,
    ) -> ProviderResult<Vec<AssistantChoice>> {
        let mut state = self.state.lock();
        state.requests.push(RecordedRequest {
            messages: messages.clone(),
            model: model.model,
            tools: options.tools,
        });
        self.logger.debug(&format!(
            "[MockProvider] Request #{} with {} messages",
            state.requests.len(),
            messages.len()
        ));

        match &mut state.mode {
            MockMode::Echo => Ok(vec![AssistantChoice::text(Self::last_user_message(&messages))]),
            MockMode::Fixed(text) => Ok(vec![AssistantChoice::text(text.clone())]),
            MockMode::Script(queue) => queue.pop_front().ok_or_else(|| {
                ProviderError::invalid_response("mock", "scripted responses exhausted")
            }),
            MockMode::Error(message) => Err(ProviderError::request_failed("mock", message.clone())),
        }
    }
}
