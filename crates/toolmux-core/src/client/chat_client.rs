//! The operations a host application drives

use std::sync::Arc;

use crate::config::{ClientConfig, ConfigProvider, EnvSettings};
use crate::logging::Logger;
use crate::mcp::{McpConnector, SessionConnector};
use crate::providers::{create_provider, Provider, ProviderModelConfig, DEFAULT_MODEL};
use crate::tools::SessionRegistry;
use crate::types::CancellationToken;

use super::driver::ConversationDriver;
use super::error::{ClientError, ClientResult, ConnectFailure};
use super::transcript::Transcript;

/// Result of connecting every enabled server
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectReport {
    /// Servers connected, in configuration order
    pub connected: Vec<String>,
    pub failures: Vec<ConnectFailure>,
}

/// Multi-server tool-orchestration client
///
/// Operations that touch the session set or run a query take `&mut self`,
/// so one instance processes one query at a time.
pub struct McpChatClient {
    registry: SessionRegistry,
    provider: Arc<dyn Provider>,
    model: ProviderModelConfig,
    max_depth: usize,
    logger: Arc<dyn Logger>,
}

impl McpChatClient {
    pub fn new(
        registry: SessionRegistry,
        provider: Arc<dyn Provider>,
        model: ProviderModelConfig,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            registry,
            provider,
            model,
            max_depth: crate::config::DEFAULT_MAX_DEPTH,
            logger,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Build a client that opens real MCP sessions
    pub fn from_config(config: ClientConfig, logger: Arc<dyn Logger>) -> ClientResult<Self> {
        let connector = Arc::new(McpConnector::new(Arc::clone(&logger)));
        let provider = create_provider(&config.chat.provider, Arc::clone(&logger));
        Self::with_collaborators(config, connector, provider, logger)
    }

    /// Build from `config` with explicit transport and chat collaborators
    pub fn with_collaborators(
        config: ClientConfig,
        connector: Arc<dyn SessionConnector>,
        provider: Arc<dyn Provider>,
        logger: Arc<dyn Logger>,
    ) -> ClientResult<Self> {
        config.validate()?;

        let model = ProviderModelConfig::from_settings(&config.chat, DEFAULT_MODEL);

        let registry = SessionRegistry::new(config.servers, connector, Arc::clone(&logger))
            .with_environment(config.environment)
            .with_base_url(config.base_url);

        Ok(Self::new(registry, provider, model, logger).with_max_depth(config.driver.max_depth))
    }

    /// Load from `source`, overlay the environment, and build
    pub async fn load(source: &dyn ConfigProvider, logger: Arc<dyn Logger>) -> ClientResult<Self> {
        let mut config = source.load().await?;
        EnvSettings::from_env().apply(&mut config)?;
        Self::from_config(config, logger)
    }

    /// Enabled server names, in configuration order
    pub fn open_servers(&self) -> Vec<String> {
        self.registry
            .servers()
            .iter()
            .filter(|s| s.enabled)
            .map(|s| s.name.clone())
            .collect()
    }

    /// Connect one server; returns the tool names it listed
    pub async fn connect_to_server(&mut self, server_name: &str) -> ClientResult<Vec<String>> {
        self.registry.connect(server_name).await
    }

    /// Connect every enabled server independently
    ///
    /// Fails only when no session is active afterwards.
    pub async fn connect_enabled_servers(&mut self) -> ClientResult<ConnectReport> {
        let servers = self.open_servers();
        self.logger.info(&format!(
            "[McpChatClient] Connecting to servers: {}",
            servers.join(", ")
        ));

        let mut report = ConnectReport::default();
        for name in servers {
            match self.registry.connect(&name).await {
                Ok(_) => report.connected.push(name),
                Err(e) => {
                    self.logger.error(&format!(
                        "[McpChatClient] Failed to connect to server '{}': {}",
                        name, e
                    ));
                    report.failures.push(ConnectFailure {
                        server: name,
                        error: e.to_string(),
                    });
                }
            }
        }

        if !self.registry.is_connected() {
            return Err(ClientError::NoServerConnected(report.failures));
        }
        Ok(report)
    }

    /// Connect enabled servers and record the result in `transcript`
    pub async fn connect_with_transcript(&mut self, transcript: &mut Transcript) -> ClientResult<ConnectReport> {
        match self.connect_enabled_servers().await {
            Ok(report) => {
                transcript.push_bot("Connected to MCP servers successfully!");
                Ok(report)
            }
            Err(e) => {
                transcript.push_bot(format!("Connection failed: {}", e));
                Err(e)
            }
        }
    }

    /// Close every session; safe to call repeatedly
    pub async fn cleanup(&mut self) {
        self.registry.disconnect_all().await;
    }

    pub fn has_active_sessions(&self) -> bool {
        self.registry.is_connected()
    }

    pub fn active_server_names(&self) -> Vec<String> {
        self.registry.active_server_names()
    }

    pub async fn process_query(&mut self, query: &str) -> ClientResult<String> {
        self.driver().run(query).await
    }

    /// Like `process_query`, stopping with `Cancelled` once `token` fires
    pub async fn process_query_with_cancel(
        &mut self,
        query: &str,
        token: CancellationToken,
    ) -> ClientResult<String> {
        self.driver().with_cancel_token(token).run(query).await
    }

    /// Run `text` as a query and record both sides in `transcript`
    ///
    /// Blank input is ignored. A failed query is recorded as a single
    /// `Error: ...` bot message. Returns the bot text, if any was recorded.
    pub async fn send(&mut self, transcript: &mut Transcript, text: &str) -> Option<String> {
        if text.trim().is_empty() {
            return None;
        }

        transcript.push_user(text);
        let reply = match self.process_query(text).await {
            Ok(answer) => answer,
            Err(e) => {
                self.logger
                    .error(&format!("[McpChatClient] Query error: {}", e));
                format!("Error: {}", e)
            }
        };
        transcript.push_bot(reply.clone());
        Some(reply)
    }

    fn driver(&self) -> ConversationDriver<'_> {
        ConversationDriver::new(
            &self.registry,
            &*self.provider,
            self.model.clone(),
            Arc::clone(&self.logger),
        )
        .with_max_depth(self.max_depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Sender;
    use crate::config::{MemoryConfigProvider, ServerDescriptor};
    use crate::logging::{MemoryLogger, NoOpLogger};
    use crate::mcp::{MockConnector, MockToolSession};
    use crate::providers::MockProvider;
    use crate::types::{AssistantChoice, ToolCall};

    fn config() -> ClientConfig {
        ClientConfig::with_servers(vec![
            ServerDescriptor::streamable("docs", "http://localhost:8080/mcp"),
            ServerDescriptor::sse("weather", "http://localhost:8081/sse"),
            ServerDescriptor::streamable("off", "http://localhost:8082/mcp").with_enabled(false),
        ])
    }

    fn client(connector: MockConnector, provider: MockProvider) -> McpChatClient {
        McpChatClient::with_collaborators(
            config(),
            Arc::new(connector),
            Arc::new(provider),
            Arc::new(NoOpLogger),
        )
        .unwrap()
    }

    fn docs() -> MockToolSession {
        MockToolSession::new().with_text_tool("search", "3 results")
    }

    #[tokio::test]
    async fn test_open_servers() {
        let client = client(MockConnector::new(), MockProvider::echo(Arc::new(NoOpLogger)));
        assert_eq!(client.open_servers(), vec!["docs".to_string(), "weather".to_string()]);
        assert!(!client.has_active_sessions());
    }

    #[tokio::test]
    async fn test_connect_enabled_servers_partial_failure() {
        let connector = MockConnector::new()
            .with_session("docs", docs())
            .with_failure("weather", "connection refused");
        let mut client = client(connector, MockProvider::echo(Arc::new(NoOpLogger)));

        let report = client.connect_enabled_servers().await.unwrap();
        assert_eq!(report.connected, vec!["docs".to_string()]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].server, "weather");
        assert_eq!(client.active_server_names(), vec!["docs".to_string()]);
    }

    #[tokio::test]
    async fn test_connect_enabled_servers_none_connected() {
        let connector = MockConnector::new()
            .with_failure("docs", "down")
            .with_failure("weather", "down");
        let mut client = client(connector, MockProvider::echo(Arc::new(NoOpLogger)));
        let mut transcript = Transcript::new();

        let err = client.connect_with_transcript(&mut transcript).await.unwrap_err();
        assert!(matches!(err, ClientError::NoServerConnected(ref f) if f.len() == 2));
        assert!(transcript.last().unwrap().text.starts_with("Connection failed:"));
    }

    #[tokio::test]
    async fn test_connect_unknown_name() {
        let mut client = client(MockConnector::new(), MockProvider::echo(Arc::new(NoOpLogger)));
        assert!(matches!(
            client.connect_to_server("missing").await,
            Err(ClientError::ConfigNotFound(_))
        ));
        assert!(!client.has_active_sessions());
    }

    #[tokio::test]
    async fn test_process_query_end_to_end() {
        let session = docs();
        let connector = MockConnector::new().with_session("docs", session.clone());
        let provider = MockProvider::scripted(
            vec![
                vec![AssistantChoice::tool_calls(vec![ToolCall::new(
                    "call_1",
                    "docs__search",
                    r#"{"q":"X"}"#,
                )])],
                vec![AssistantChoice::default()],
            ],
            Arc::new(NoOpLogger),
        );
        let mut client = client(connector, provider.clone());
        client.connect_to_server("docs").await.unwrap();

        let output = client.process_query("find X").await.unwrap();
        assert_eq!(output, "3 results");
        assert_eq!(session.calls().len(), 1);
        assert!(provider.requests()[1].text().contains("docs__search"));
    }

    #[tokio::test]
    async fn test_send_records_both_sides() {
        let connector = MockConnector::new().with_session("docs", docs());
        let mut client = client(connector, MockProvider::fixed("Hi!", Arc::new(NoOpLogger)));
        client.connect_to_server("docs").await.unwrap();
        let mut transcript = Transcript::new();

        assert_eq!(client.send(&mut transcript, "   ").await, None);
        assert!(transcript.is_empty());

        assert_eq!(client.send(&mut transcript, "hello").await.as_deref(), Some("Hi!"));
        let entries = transcript.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].sender, Sender::User);
        assert_eq!(entries[0].text, "hello");
        assert_eq!(entries[1].sender, Sender::Bot);
        assert_eq!(entries[1].text, "Hi!");
    }

    #[tokio::test]
    async fn test_send_records_single_error() {
        let provider = MockProvider::echo(Arc::new(NoOpLogger));
        let mut client = client(MockConnector::new(), provider.clone());
        let mut transcript = Transcript::new();

        let reply = client.send(&mut transcript, "hello").await.unwrap();
        assert_eq!(reply, "Error: Not connected to any server");
        assert_eq!(transcript.len(), 2);
        assert_eq!(provider.request_count(), 0);
    }

    #[tokio::test]
    async fn test_cleanup_twice() {
        let docs = docs();
        let connector = MockConnector::new().with_session("docs", docs.clone());
        let mut client = client(connector, MockProvider::echo(Arc::new(NoOpLogger)));
        client.connect_to_server("docs").await.unwrap();

        client.cleanup().await;
        assert!(!client.has_active_sessions());
        client.cleanup().await;
        assert!(!client.has_active_sessions());
        assert_eq!(docs.close_count(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_query() {
        let connector = MockConnector::new().with_session("docs", docs());
        let provider = MockProvider::echo(Arc::new(NoOpLogger));
        let mut client = client(connector, provider.clone());
        client.connect_to_server("docs").await.unwrap();

        let token = CancellationToken::new();
        token.cancel();
        assert!(matches!(
            client.process_query_with_cancel("hi", token).await,
            Err(ClientError::Cancelled)
        ));
        assert_eq!(provider.request_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let mut bad = config();
        bad.servers.push(ServerDescriptor::streamable("docs", "http://elsewhere/mcp"));
        let result = McpChatClient::with_collaborators(
            bad,
            Arc::new(MockConnector::new()),
            Arc::new(MockProvider::echo(Arc::new(NoOpLogger))),
            Arc::new(NoOpLogger),
        );
        assert!(matches!(result, Err(ClientError::Config(_))));
    }

    #[tokio::test]
    async fn test_load_from_provider() {
        let source = MemoryConfigProvider::with_config(config());
        let logger = Arc::new(MemoryLogger::new());
        let client = McpChatClient::load(&source, logger).await.unwrap();
        assert_eq!(client.open_servers().len(), 2);
        assert!(!client.has_active_sessions());
    }
}
