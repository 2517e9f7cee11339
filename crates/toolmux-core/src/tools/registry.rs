//! Session registry
//!
//! Owns one live session per connected server. Entries keep insertion
//! order so catalogs built from the registry are reproducible.

use std::sync::Arc;

use crate::client::{ClientError, ClientResult};
use crate::config::{HostEnvironment, ServerDescriptor};
use crate::logging::Logger;
use crate::mcp::{SessionConnector, ToolSession, TransportSpec};

/// Live sessions keyed by server name
pub struct SessionRegistry {
    /// Configured servers
    servers: Vec<ServerDescriptor>,
    /// Host the transports are built for
    environment: HostEnvironment,
    /// Origin for relative server URLs
    base_url: Option<String>,
    connector: Arc<dyn SessionConnector>,
    sessions: Vec<(String, Box<dyn ToolSession>)>,
    logger: Arc<dyn Logger>,
}

impl SessionRegistry {
    pub fn new(
        servers: Vec<ServerDescriptor>,
        connector: Arc<dyn SessionConnector>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            servers,
            environment: HostEnvironment::default(),
            base_url: None,
            connector,
            sessions: Vec::new(),
            logger,
        }
    }

    /// Build transports for `environment`
    pub fn with_environment(mut self, environment: HostEnvironment) -> Self {
        self.environment = environment;
        self
    }

    /// Resolve relative server URLs against `base_url`
    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        self.base_url = base_url;
        self
    }

    /// Configured server descriptors
    pub fn servers(&self) -> &[ServerDescriptor] {
        &self.servers
    }

    /// Connect to `server_name` and register the session
    ///
    /// Returns the names of the tools the server listed. An existing
    /// session for the same name is closed and replaced in place. On any
    /// failure the registry is left untouched.
    pub async fn connect(&mut self, server_name: &str) -> ClientResult<Vec<String>> {
        let descriptor = self
            .servers
            .iter()
            .find(|s| s.name == server_name)
            .ok_or_else(|| ClientError::ConfigNotFound(server_name.to_string()))?;

        let spec = TransportSpec::resolve(descriptor, self.environment, self.base_url.as_deref())
            .map_err(|e| ClientError::from_transport(server_name, e))?;

        self.logger.info(&format!(
            "[SessionRegistry] Connecting to '{}' via {}",
            server_name,
            spec.kind()
        ));

        let session = self
            .connector
            .connect(server_name, &spec)
            .await
            .map_err(|e| ClientError::from_transport(server_name, e))?;

        let tools = match session.list_tools().await {
            Ok(tools) => tools,
            Err(e) => {
                if let Err(close_err) = session.close().await {
                    self.logger.warn(&format!(
                        "[SessionRegistry] Failed to close '{}' after handshake error: {}",
                        server_name, close_err
                    ));
                }
                return Err(ClientError::from_transport(server_name, e));
            }
        };

        let tool_names: Vec<String> = tools.into_iter().map(|t| t.name).collect();
        self.logger.info(&format!(
            "[SessionRegistry] Connected to server '{}' with tools: {:?}",
            server_name, tool_names
        ));

        let previous = match self.sessions.iter_mut().find(|(name, _)| name == server_name) {
            Some(entry) => Some(std::mem::replace(&mut entry.1, session)),
            None => {
                self.sessions.push((server_name.to_string(), session));
                None
            }
        };
        if let Some(old) = previous {
            self.logger.debug(&format!(
                "[SessionRegistry] Replaced existing session for '{}'",
                server_name
            ));
            if let Err(e) = old.close().await {
                self.logger.warn(&format!(
                    "[SessionRegistry] Failed to close previous session for '{}': {}",
                    server_name, e
                ));
            }
        }

        Ok(tool_names)
    }

    /// Close every session and clear the registry
    ///
    /// Close failures are logged and do not stop the remaining closes.
    /// Calling this with no sessions is a no-op.
    pub async fn disconnect_all(&mut self) {
        for (name, session) in self.sessions.drain(..) {
            match session.close().await {
                Ok(()) => {
                    self.logger
                        .debug(&format!("[SessionRegistry] Closed session '{}'", name));
                }
                Err(e) => {
                    self.logger.warn(&format!(
                        "[SessionRegistry] Error closing session '{}': {}",
                        name, e
                    ));
                }
            }
        }
    }

    /// True iff at least one session is registered
    pub fn is_connected(&self) -> bool {
        !self.sessions.is_empty()
    }

    /// Connected server names, in connection order
    pub fn active_server_names(&self) -> Vec<String> {
        self.sessions.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn session(&self, server_name: &str) -> Option<&dyn ToolSession> {
        self.sessions
            .iter()
            .find(|(name, _)| name == server_name)
            .map(|(_, session)| &**session)
    }

    /// Iterate `(server name, session)` in connection order
    pub fn sessions(&self) -> impl Iterator<Item = (&str, &dyn ToolSession)> {
        self.sessions
            .iter()
            .map(|(name, session)| (name.as_str(), &**session))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TransportKind;
    use crate::logging::{LogLevel, MemoryLogger, NoOpLogger};
    use crate::mcp::{MockConnector, MockToolSession};

    fn servers() -> Vec<ServerDescriptor> {
        vec![
            ServerDescriptor::streamable("docs", "http://localhost:8080/mcp"),
            ServerDescriptor::sse("weather", "http://localhost:8081/sse"),
            ServerDescriptor::command("local", "toolmux-fs"),
        ]
    }

    fn registry(connector: &MockConnector) -> SessionRegistry {
        SessionRegistry::new(servers(), Arc::new(connector.clone()), Arc::new(NoOpLogger))
    }

    #[tokio::test]
    async fn test_connect_registers_session() {
        let connector = MockConnector::new()
            .with_session("docs", MockToolSession::new().with_text_tool("search", "3 results"));
        let mut registry = registry(&connector);

        let tools = registry.connect("docs").await.unwrap();
        assert_eq!(tools, vec!["search".to_string()]);
        assert!(registry.is_connected());
        assert_eq!(registry.active_server_names(), vec!["docs".to_string()]);
        assert!(registry.session("docs").is_some());
        assert_eq!(
            connector.attempts(),
            vec![("docs".to_string(), TransportKind::Streamable)]
        );
    }

    #[tokio::test]
    async fn test_unknown_server_is_config_not_found() {
        let connector = MockConnector::new()
            .with_session("docs", MockToolSession::new().with_text_tool("search", "x"));
        let mut registry = registry(&connector);
        registry.connect("docs").await.unwrap();

        for name in ["nope", "", "docs__search", "DOCS"] {
            let err = registry.connect(name).await.unwrap_err();
            assert!(matches!(err, ClientError::ConfigNotFound(ref n) if n == name));
            assert_eq!(registry.active_server_names(), vec!["docs".to_string()]);
        }
        assert_eq!(connector.attempts().len(), 1);
    }

    #[tokio::test]
    async fn test_command_unsupported_in_web_host() {
        let connector = MockConnector::new().with_session("local", MockToolSession::new());
        let mut registry = registry(&connector).with_environment(HostEnvironment::Web);

        let err = registry.connect("local").await.unwrap_err();
        assert!(matches!(err, ClientError::UnsupportedTransport { .. }));
        assert!(!registry.is_connected());
        assert!(connector.attempts().is_empty());
    }

    #[tokio::test]
    async fn test_relative_url_uses_base() {
        let connector = MockConnector::new().with_session("rel", MockToolSession::new());
        let mut registry = SessionRegistry::new(
            vec![ServerDescriptor::streamable("rel", "/mcp")],
            Arc::new(connector.clone()),
            Arc::new(NoOpLogger),
        );
        assert!(matches!(
            registry.connect("rel").await,
            Err(ClientError::UnsupportedTransport { .. })
        ));

        let mut registry = registry.with_base_url(Some("http://localhost:3000".to_string()));
        registry.connect("rel").await.unwrap();
        assert!(registry.is_connected());
    }

    #[tokio::test]
    async fn test_connect_failure_is_transport_failure() {
        let connector = MockConnector::new().with_failure("docs", "connection refused");
        let mut registry = registry(&connector);

        let err = registry.connect("docs").await.unwrap_err();
        assert!(matches!(err, ClientError::TransportFailure { ref server, .. } if server == "docs"));
        assert!(!registry.is_connected());
    }

    #[tokio::test]
    async fn test_listing_failure_closes_session() {
        let session = MockToolSession::new().failing_list("handshake broke");
        let connector = MockConnector::new().with_session("docs", session.clone());
        let mut registry = registry(&connector);

        assert!(matches!(
            registry.connect("docs").await,
            Err(ClientError::TransportFailure { .. })
        ));
        assert_eq!(session.close_count(), 1);
        assert!(!registry.is_connected());
    }

    #[tokio::test]
    async fn test_reconnect_replaces_in_place() {
        let docs = MockToolSession::new().with_text_tool("search", "x");
        let weather = MockToolSession::new().with_text_tool("forecast", "sunny");
        let connector = MockConnector::new()
            .with_session("docs", docs.clone())
            .with_session("weather", weather);
        let mut registry = registry(&connector);

        registry.connect("docs").await.unwrap();
        registry.connect("weather").await.unwrap();
        registry.connect("docs").await.unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.active_server_names(),
            vec!["docs".to_string(), "weather".to_string()]
        );
        assert_eq!(docs.close_count(), 1);
    }

    #[tokio::test]
    async fn test_disconnect_all_twice() {
        let docs = MockToolSession::new().failing_close("already gone");
        let weather = MockToolSession::new();
        let connector = MockConnector::new()
            .with_session("docs", docs.clone())
            .with_session("weather", weather.clone());
        let logger = Arc::new(MemoryLogger::new());
        let mut registry =
            SessionRegistry::new(servers(), Arc::new(connector), logger.clone());

        registry.connect("docs").await.unwrap();
        registry.connect("weather").await.unwrap();

        registry.disconnect_all().await;
        assert!(!registry.is_connected());
        assert_eq!(registry.len(), 0);
        assert_eq!(docs.close_count(), 1);
        assert_eq!(weather.close_count(), 1);
        assert_eq!(logger.messages_at(LogLevel::Warn).len(), 1);

        registry.disconnect_all().await;
        assert!(!registry.is_connected());
        assert_eq!(registry.len(), 0);
        assert_eq!(weather.close_count(), 1);
    }
}
