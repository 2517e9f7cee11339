//! Configuration provider trait

use async_trait::async_trait;

use super::settings::ClientConfig;

/// Configuration provider abstraction
///
/// Implementations:
/// - `MemoryConfigProvider`: In-memory
/// - `FileConfigProvider`: Reads from YAML file (~/.config/toolmux/config.yaml)
#[async_trait]
pub trait ConfigProvider: Send + Sync {
    /// Load and validate the configuration
    async fn load(&self) -> ConfigResult<ClientConfig>;

    /// Validate and store the configuration
    async fn save(&self, config: &ClientConfig) -> ConfigResult<()>;
}

/// Errors that can occur during configuration operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Duplicate server name: {0}")]
    DuplicateServer(String),

    #[error("Invalid server name '{name}': {reason}")]
    InvalidServerName { name: String, reason: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Other(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
