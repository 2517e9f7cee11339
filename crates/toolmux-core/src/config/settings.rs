//! Top-level client configuration

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::server::{HostEnvironment, ServerDescriptor};
use super::traits::{ConfigError, ConfigResult};
use crate::tools::QUALIFIED_NAME_SEPARATOR;

/// Default bound on nested follow-up queries
pub const DEFAULT_MAX_DEPTH: usize = 5;

/// Chat endpoint settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSettings {
    /// Provider id understood by `providers::create_provider`
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Model identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// API key, normally supplied through the environment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Custom API base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Completion length cap
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_provider() -> String {
    "openai".to_string()
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            api_key: None,
            api_base: None,
            max_tokens: None,
        }
    }
}

/// Conversation driver settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverSettings {
    /// Maximum nesting of follow-up queries spawned by tool results
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Configuration file structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Tool servers, in connection order
    #[serde(default)]
    pub servers: Vec<ServerDescriptor>,

    #[serde(default)]
    pub chat: ChatSettings,

    #[serde(default)]
    pub driver: DriverSettings,

    #[serde(default)]
    pub environment: HostEnvironment,

    /// Origin that relative server URLs are resolved against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl ClientConfig {
    /// Create a config holding `servers` and defaults for everything else
    pub fn with_servers(servers: Vec<ServerDescriptor>) -> Self {
        Self {
            servers,
            ..Default::default()
        }
    }

    /// Check the invariants the registry and tool namespacing rely on
    pub fn validate(&self) -> ConfigResult<()> {
        let mut seen = HashSet::new();
        for server in &self.servers {
            if server.name.trim().is_empty() {
                return Err(ConfigError::InvalidServerName {
                    name: server.name.clone(),
                    reason: "name must not be empty".to_string(),
                });
            }
            if server.name.contains(QUALIFIED_NAME_SEPARATOR) {
                return Err(ConfigError::InvalidServerName {
                    name: server.name.clone(),
                    reason: format!("name must not contain '{}'", QUALIFIED_NAME_SEPARATOR),
                });
            }
            if server.name.ends_with('_') {
                return Err(ConfigError::InvalidServerName {
                    name: server.name.clone(),
                    reason: "name must not end with '_'".to_string(),
                });
            }
            if !seen.insert(server.name.as_str()) {
                return Err(ConfigError::DuplicateServer(server.name.clone()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_duplicates() {
        let config = ClientConfig::with_servers(vec![
            ServerDescriptor::streamable("docs", "http://one/mcp"),
            ServerDescriptor::streamable("docs", "http://two/mcp"),
        ]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateServer(name)) if name == "docs"
        ));
    }

    #[test]
    fn test_validate_rejects_separator_in_name() {
        let config =
            ClientConfig::with_servers(vec![ServerDescriptor::streamable("my__docs", "http://x")]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidServerName { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_trailing_underscore() {
        // `a_` + `b` and `a` + `_b` would both qualify to `a___b`
        let config = ClientConfig::with_servers(vec![
            ServerDescriptor::streamable("a_", "http://one/mcp"),
            ServerDescriptor::streamable("a", "http://two/mcp"),
        ]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidServerName { name, .. }) if name == "a_"
        ));

        let config = ClientConfig::with_servers(vec![ServerDescriptor::streamable("_a", "http://x/mcp")]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_accepts_zero_depth() {
        let mut config = ClientConfig::default();
        config.driver.max_depth = 0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_from_yaml() {
        let config: ClientConfig = serde_yaml::from_str("servers: []").unwrap();
        assert_eq!(config.chat.provider, "openai");
        assert_eq!(config.driver.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.environment, HostEnvironment::Native);
    }
}
