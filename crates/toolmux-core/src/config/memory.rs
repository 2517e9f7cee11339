//! In-memory configuration provider

use async_trait::async_trait;
use parking_lot::RwLock;

use super::settings::ClientConfig;
use super::traits::{ConfigProvider, ConfigResult};

/// In-memory configuration provider
#[derive(Debug, Default)]
pub struct MemoryConfigProvider {
    config: RwLock<ClientConfig>,
}

impl MemoryConfigProvider {
    /// Create an empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider holding `config`
    pub fn with_config(config: ClientConfig) -> Self {
        Self {
            config: RwLock::new(config),
        }
    }
}

#[async_trait]
impl ConfigProvider for MemoryConfigProvider {
    async fn load(&self) -> ConfigResult<ClientConfig> {
        let config = self.config.read().clone();
        config.validate()?;
        Ok(config)
    }

    async fn save(&self, config: &ClientConfig) -> ConfigResult<()> {
        config.validate()?;
        *self.config.write() = config.clone();
        Ok(())
    }
}
