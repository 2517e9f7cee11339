//! Chat endpoint capability

use async_trait::async_trait;

use super::error::ProviderResult;
use crate::config::ChatSettings;
use crate::types::{AssistantChoice, ChatMessage, ToolDescriptor};

/// Which model to ask, and how to reach it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderModelConfig {
    pub model: String,
    pub api_key: Option<String>,
    /// OpenAI-compatible base URL replacing the provider default
    pub api_base: Option<String>,
    pub max_tokens: Option<u32>,
}

impl ProviderModelConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            api_key: None,
            api_base: None,
            max_tokens: None,
        }
    }

    /// Take everything from `settings`, using `default_model` if none is set
    pub fn from_settings(settings: &ChatSettings, default_model: &str) -> Self {
        Self {
            model: settings
                .model
                .clone()
                .unwrap_or_else(|| default_model.to_string()),
            api_key: settings.api_key.clone(),
            api_base: settings.api_base.clone(),
            max_tokens: settings.max_tokens,
        }
    }

    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = Some(base.into());
        self
    }
}

/// Per-exchange request options
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatOptions {
    /// Tool manifest; `None` means the model cannot call tools. When
    /// present the model picks among them freely.
    pub tools: Option<Vec<ToolDescriptor>>,
}

impl ChatOptions {
    /// Offer `tools`; an empty list sends no manifest
    pub fn with_catalog(tools: Vec<ToolDescriptor>) -> Self {
        Self {
            tools: Some(tools).filter(|t| !t.is_empty()),
        }
    }
}

/// A chat completion endpoint
///
/// Returns every choice the endpoint produced; each may carry text,
/// tool calls or both.
#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        model: ProviderModelConfig,
        options: ChatOptions,
    ) -> ProviderResult<Vec<AssistantChoice>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_settings_defaults_model() {
        let settings = ChatSettings {
            api_base: Some("http://localhost:8000/v1".to_string()),
            ..Default::default()
        };
        let config = ProviderModelConfig::from_settings(&settings, "gpt-4o-mini");
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.api_base.as_deref(), Some("http://localhost:8000/v1"));
        assert_eq!(config.api_key, None);
    }

    #[test]
    fn test_empty_catalog_sends_nothing() {
        assert_eq!(ChatOptions::with_catalog(vec![]), ChatOptions::default());

        let options = ChatOptions::with_catalog(vec![ToolDescriptor::new("docs__search", "[docs] search")]);
        assert_eq!(options.tools.map(|t| t.len()), Some(1));
    }
}
