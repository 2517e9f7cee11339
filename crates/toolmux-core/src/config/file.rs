//! File-based configuration provider (YAML)
//!
//! The user-level file lives at `~/.config/toolmux/config.yaml`.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;

use super::settings::ClientConfig;
use super::traits::{ConfigProvider, ConfigResult};

/// File-based configuration provider
///
/// # Example
///
/// ```no_run
/// use toolmux_core::config::FileConfigProvider;
///
/// let user_config = FileConfigProvider::user();
/// let project_config = FileConfigProvider::new("/path/to/toolmux.yaml");
/// ```
pub struct FileConfigProvider {
    path: PathBuf,
    cache: RwLock<Option<ClientConfig>>,
}

impl FileConfigProvider {
    /// Create a provider for a specific path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: RwLock::new(None),
        }
    }

    /// Create a user-level config provider (~/.config/toolmux/config.yaml)
    pub fn user() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".config"));
        Self::new(config_dir.join("toolmux").join("config.yaml"))
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if the config file exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    fn read_file(&self) -> ConfigResult<ClientConfig> {
        if !self.path.exists() {
            return Ok(ClientConfig::default());
        }

        let content = fs::read_to_string(&self.path)?;
        let config: ClientConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    fn write_file(&self, config: &ClientConfig) -> ConfigResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(config)?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    /// Reload config from disk (invalidate cache)
    pub fn reload(&self) -> ConfigResult<ClientConfig> {
        let config = self.read_file()?;
        config.validate()?;
        *self.cache.write() = Some(config.clone());
        Ok(config)
    }

    /// Export config as pretty JSON
    pub fn export_json(&self) -> ConfigResult<String> {
        let config = self.cached_or_load()?;
        Ok(serde_json::to_string_pretty(&config)?)
    }

    fn cached_or_load(&self) -> ConfigResult<ClientConfig> {
        if let Some(config) = self.cache.read().as_ref() {
            return Ok(config.clone());
        }
        self.reload()
    }
}

impl std::fmt::Debug for FileConfigProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileConfigProvider")
            .field("path", &self.path)
            .field("exists", &self.exists())
            .finish()
    }
}

#[async_trait]
impl ConfigProvider for FileConfigProvider {
    async fn load(&self) -> ConfigResult<ClientConfig> {
        self.cached_or_load()
    }

    async fn save(&self, config: &ClientConfig) -> ConfigResult<()> {
        config.validate()?;
        self.write_file(config)?;
        *self.cache.write() = Some(config.clone());
        Ok(())
    }
}
