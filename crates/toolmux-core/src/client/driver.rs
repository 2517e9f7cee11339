//! Conversation driver
//!
//! Runs one query to completion. Each query is a frame: the model's first
//! answer is flattened into an ordered list of steps (text, then tool
//! calls, per choice). A successful tool call triggers a follow-up
//! exchange; if that yields text, the text is processed as a fresh query
//! in a child frame one level deeper. A finished frame's output, joined
//! with newlines, is appended to its parent's output.
//!
//! Frames live on an explicit stack, so depth is bounded by `max_depth`
//! rather than by the call stack.

use std::collections::VecDeque;
use std::sync::Arc;

use serde_json::Value;

use crate::config::DEFAULT_MAX_DEPTH;
use crate::logging::Logger;
use crate::providers::{ChatOptions, Provider, ProviderModelConfig};
use crate::tools::{SessionRegistry, ToolCatalog, ToolDispatcher};
use crate::types::{AssistantChoice, CancellationToken, ChatMessage, ToolCall};

use super::error::{ClientError, ClientResult};

/// Messages for the exchange that follows a successful tool call
///
/// Built from the original query and the newest result only.
pub fn follow_up_turn(query: &str, tool_name: &str, payload: &str) -> Vec<ChatMessage> {
    let serialized = Value::String(payload.to_string()).to_string();
    vec![
        ChatMessage::user(query),
        ChatMessage::user(format!(
            "Use the result of tool {}: {} to assemble the next request. If no tool is needed, reply directly.",
            tool_name, serialized
        )),
    ]
}

enum Step {
    Text(String),
    Tool(ToolCall),
}

struct Frame {
    query: String,
    depth: usize,
    steps: VecDeque<Step>,
    output: Vec<String>,
}

pub struct ConversationDriver<'a> {
    registry: &'a SessionRegistry,
    provider: &'a dyn Provider,
    model: ProviderModelConfig,
    max_depth: usize,
    cancel: Option<CancellationToken>,
    logger: Arc<dyn Logger>,
}

impl<'a> ConversationDriver<'a> {
    pub fn new(
        registry: &'a SessionRegistry,
        provider: &'a dyn Provider,
        model: ProviderModelConfig,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            registry,
            provider,
            model,
            max_depth: DEFAULT_MAX_DEPTH,
            cancel: None,
            logger,
        }
    }

    /// Deepest nested query allowed; the top-level query is depth 0
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Process `query` and return the accumulated text
    pub async fn run(&self, query: &str) -> ClientResult<String> {
        if !self.registry.is_connected() {
            return Err(ClientError::NotConnected);
        }

        let dispatcher = ToolDispatcher::new(self.registry, Arc::clone(&self.logger));
        let mut stack = vec![self.open_frame(query, 0).await?];

        while let Some(frame) = stack.last_mut() {
            match frame.steps.pop_front() {
                Some(Step::Text(text)) => frame.output.push(text),
                Some(Step::Tool(call)) => {
                    self.check_cancelled()?;
                    let outcome = dispatcher.dispatch(&call).await;
                    frame.output.push(outcome.payload.clone());
                    if !outcome.succeeded {
                        continue;
                    }

                    let Some(next_query) = self.follow_up(&frame.query, &call.name, &outcome.payload).await? else {
                        continue;
                    };

                    let depth = frame.depth + 1;
                    if depth > self.max_depth {
                        self.logger.error(&format!(
                            "[ConversationDriver] Nested query at depth {} exceeds limit {}",
                            depth, self.max_depth
                        ));
                        return Err(ClientError::RecursionLimitExceeded {
                            limit: self.max_depth,
                        });
                    }
                    let child = self.open_frame(&next_query, depth).await?;
                    stack.push(child);
                }
                None => {
                    let finished = stack.pop().map(|f| f.output.join("\n")).unwrap_or_default();
                    match stack.last_mut() {
                        Some(parent) => parent.output.push(finished),
                        None => return Ok(finished),
                    }
                }
            }
        }

        Ok(String::new())
    }

    /// Propose phase: send `query` with the current catalog
    async fn open_frame(&self, query: &str, depth: usize) -> ClientResult<Frame> {
        self.check_cancelled()?;
        self.logger.info(&format!(
            "[ConversationDriver] Processing query at depth {}",
            depth
        ));

        let catalog = ToolCatalog::build(self.registry, &*self.logger).await;
        let options = ChatOptions::with_catalog(catalog.into_tools());

        let choices = self
            .provider
            .complete(vec![ChatMessage::user(query)], self.model.clone(), options)
            .await?;

        let mut steps = VecDeque::new();
        for choice in choices {
            let AssistantChoice { content, tool_calls } = choice;
            if let Some(text) = content.filter(|t| !t.is_empty()) {
                steps.push_back(Step::Text(text));
            }
            steps.extend(tool_calls.into_iter().map(Step::Tool));
        }

        Ok(Frame {
            query: query.to_string(),
            depth,
            steps,
            output: Vec::new(),
        })
    }

    /// Follow-up exchange after a successful tool call, with no tools attached
    ///
    /// Returns the text of the first choice, if any.
    async fn follow_up(&self, query: &str, tool_name: &str, payload: &str) -> ClientResult<Option<String>> {
        self.check_cancelled()?;
        self.logger.debug(&format!(
            "[ConversationDriver] Follow-up exchange for {}",
            tool_name
        ));

        let choices = self
            .provider
            .complete(
                follow_up_turn(query, tool_name, payload),
                self.model.clone(),
                ChatOptions::default(),
            )
            .await?;

        Ok(choices
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .filter(|t| !t.is_empty()))
    }

    fn check_cancelled(&self) -> ClientResult<()> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => {
                self.logger.info("[ConversationDriver] Query cancelled");
                Err(ClientError::Cancelled)
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::ServerDescriptor;
    use crate::logging::NoOpLogger;
    use crate::mcp::{MockConnector, MockToolSession};
    use crate::providers::MockProvider;

    async fn registry_with(sessions: Vec<(&str, MockToolSession)>) -> SessionRegistry {
        let mut connector = MockConnector::new();
        let mut servers = Vec::new();
        for (name, session) in &sessions {
            connector = connector.with_session(name, session.clone());
            servers.push(ServerDescriptor::streamable(*name, "http://localhost/mcp"));
        }
        let mut registry = SessionRegistry::new(servers, Arc::new(connector), Arc::new(NoOpLogger));
        for (name, _) in &sessions {
            registry.connect(name).await.unwrap();
        }
        registry
    }

    fn docs() -> MockToolSession {
        MockToolSession::new().with_text_tool("search", "3 results")
    }

    fn call(name: &str, args: &str) -> AssistantChoice {
        AssistantChoice::tool_calls(vec![ToolCall::new("call_1", name, args)])
    }

    fn driver<'a>(registry: &'a SessionRegistry, provider: &'a MockProvider) -> ConversationDriver<'a> {
        ConversationDriver::new(
            registry,
            provider,
            ProviderModelConfig::new("mock-model"),
            Arc::new(NoOpLogger),
        )
    }

    #[test]
    fn test_follow_up_turn() {
        let turn = follow_up_turn("find X", "docs__search", "3 \"good\" results");
        assert_eq!(turn.len(), 2);
        assert_eq!(turn[0], ChatMessage::user("find X"));
        assert_eq!(
            turn[1].content,
            r#"Use the result of tool docs__search: "3 \"good\" results" to assemble the next request. If no tool is needed, reply directly."#
        );
    }

    #[tokio::test]
    async fn test_search_scenario() {
        let registry = registry_with(vec![("docs", docs())]).await;
        let provider = MockProvider::scripted(
            vec![
                vec![call("docs__search", r#"{"q":"X"}"#)],
                vec![AssistantChoice::text("Summarize the 3 results")],
                vec![AssistantChoice::text("X appears in 3 documents")],
            ],
            Arc::new(NoOpLogger),
        );

        let output = driver(&registry, &provider).run("find X").await.unwrap();
        assert!(output.contains("3 results"));
        assert_eq!(output, "3 results\nX appears in 3 documents");

        let requests = provider.requests();
        assert_eq!(requests.len(), 3);

        assert_eq!(requests[0].messages, vec![ChatMessage::user("find X")]);
        assert_eq!(requests[0].tools.as_ref().map(Vec::len), Some(1));

        assert!(requests[1].text().contains("docs__search"));
        assert!(requests[1].text().contains("3 results"));
        assert_eq!(requests[1].messages[0], ChatMessage::user("find X"));
        assert!(requests[1].tools.is_none());

        assert_eq!(requests[2].messages, vec![ChatMessage::user("Summarize the 3 results")]);
        assert!(requests[2].tools.is_some());
    }

    #[tokio::test]
    async fn test_text_only_answer() {
        let registry = registry_with(vec![("docs", docs())]).await;
        let provider = MockProvider::fixed("Hello there", Arc::new(NoOpLogger));

        let output = driver(&registry, &provider).run("hi").await.unwrap();
        assert_eq!(output, "Hello there");
        assert_eq!(provider.request_count(), 1);
    }

    #[tokio::test]
    async fn test_not_connected_before_any_call() {
        let registry = registry_with(vec![]).await;
        let provider = MockProvider::echo(Arc::new(NoOpLogger));

        let err = driver(&registry, &provider).run("find X").await.unwrap_err();
        assert!(matches!(err, ClientError::NotConnected));
        assert_eq!(provider.request_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_tool_skips_follow_up() {
        let registry = registry_with(vec![("docs", docs())]).await;
        let provider = MockProvider::scripted(
            vec![vec![call("unknownserver__foo", "{}")]],
            Arc::new(NoOpLogger),
        );

        let output = driver(&registry, &provider).run("find X").await.unwrap();
        assert_eq!(output, "Error: Server unknownserver not found");
        assert_eq!(provider.request_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_follow_up_ends_branch() {
        let registry = registry_with(vec![("docs", docs())]).await;
        let provider = MockProvider::scripted(
            vec![
                vec![call("docs__search", "{}")],
                vec![AssistantChoice::default()],
            ],
            Arc::new(NoOpLogger),
        );

        let output = driver(&registry, &provider).run("find X").await.unwrap();
        assert_eq!(output, "3 results");
        assert_eq!(provider.request_count(), 2);
    }

    #[tokio::test]
    async fn test_order_text_then_tools_across_choices() {
        let registry = registry_with(vec![(
            "docs",
            docs().with_text_tool("fetch", "page body"),
        )])
        .await;
        let provider = MockProvider::scripted(
            vec![
                vec![
                    AssistantChoice::text("Looking it up")
                        .with_tool_call(ToolCall::new("1", "docs__search", "{}"))
                        .with_tool_call(ToolCall::new("2", "docs__fetch", "{}")),
                    AssistantChoice::text("Second choice"),
                ],
                vec![AssistantChoice::default()],
                vec![AssistantChoice::default()],
            ],
            Arc::new(NoOpLogger),
        );

        let output = driver(&registry, &provider).run("find X").await.unwrap();
        assert_eq!(output, "Looking it up\n3 results\npage body\nSecond choice");

        // Each follow-up only sees the original query and its own result.
        let requests = provider.requests();
        assert!(requests[1].text().contains("docs__search"));
        assert!(!requests[1].text().contains("page body"));
        assert!(requests[2].text().contains("docs__fetch"));
        assert!(!requests[2].text().contains("3 results"));
        assert_eq!(requests[2].messages[0], ChatMessage::user("find X"));
    }

    #[tokio::test]
    async fn test_nested_output_lands_at_call_site() {
        let registry = registry_with(vec![(
            "docs",
            docs().with_text_tool("fetch", "page body"),
        )])
        .await;
        let provider = MockProvider::scripted(
            vec![
                vec![AssistantChoice::tool_calls(vec![
                    ToolCall::new("1", "docs__search", "{}"),
                    ToolCall::new("2", "docs__fetch", "{}"),
                ])],
                vec![AssistantChoice::text("nested query")],
                vec![AssistantChoice::text("nested answer")],
                vec![AssistantChoice::default()],
            ],
            Arc::new(NoOpLogger),
        );

        let output = driver(&registry, &provider).run("find X").await.unwrap();
        assert_eq!(output, "3 results\nnested answer\npage body");
    }

    #[tokio::test]
    async fn test_recursion_limit() {
        let registry = registry_with(vec![("docs", docs())]).await;
        let provider = MockProvider::scripted(
            vec![
                vec![call("docs__search", "{}")],
                vec![AssistantChoice::text("again")],
                vec![call("docs__search", "{}")],
                vec![AssistantChoice::text("again")],
            ],
            Arc::new(NoOpLogger),
        );

        let err = driver(&registry, &provider)
            .with_max_depth(1)
            .run("find X")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::RecursionLimitExceeded { limit: 1 }));
        assert_eq!(provider.request_count(), 4);
    }

    #[tokio::test]
    async fn test_zero_depth_allows_tools_but_no_nested_query() {
        let registry = registry_with(vec![("docs", docs())]).await;
        let provider = MockProvider::scripted(
            vec![
                vec![call("docs__search", "{}")],
                vec![AssistantChoice::default()],
            ],
            Arc::new(NoOpLogger),
        );
        let output = driver(&registry, &provider).with_max_depth(0).run("find X").await.unwrap();
        assert_eq!(output, "3 results");

        let provider = MockProvider::scripted(
            vec![
                vec![call("docs__search", "{}")],
                vec![AssistantChoice::text("again")],
            ],
            Arc::new(NoOpLogger),
        );
        let err = driver(&registry, &provider)
            .with_max_depth(0)
            .run("find X")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::RecursionLimitExceeded { limit: 0 }));
        assert_eq!(provider.request_count(), 2);
    }

    #[tokio::test]
    async fn test_empty_catalog_sends_no_manifest() {
        let registry = registry_with(vec![("bare", MockToolSession::new())]).await;
        let provider = MockProvider::fixed("ok", Arc::new(NoOpLogger));

        driver(&registry, &provider).run("hi").await.unwrap();
        assert!(provider.requests()[0].tools.is_none());
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let registry = registry_with(vec![("docs", docs())]).await;
        let provider = MockProvider::error("quota exceeded", Arc::new(NoOpLogger));

        let err = driver(&registry, &provider).run("hi").await.unwrap_err();
        assert!(matches!(err, ClientError::Provider(_)));
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let registry = registry_with(vec![("docs", docs())]).await;
        let provider = MockProvider::echo(Arc::new(NoOpLogger));
        let token = CancellationToken::new();
        token.cancel();

        let err = driver(&registry, &provider)
            .with_cancel_token(token)
            .run("hi")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Cancelled));
        assert_eq!(provider.request_count(), 0);
    }
}
