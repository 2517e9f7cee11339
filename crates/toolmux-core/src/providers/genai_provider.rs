//! GenaiProvider - chat endpoint backed by the genai crate

use async_trait::async_trait;
use std::sync::Arc;

use genai::chat::ChatRequest;

use crate::config::EnvSettings;
use crate::logging::Logger;
use crate::types::{AssistantChoice, ChatMessage};

use super::error::{ProviderError, ProviderResult};
use super::genai_adapter::{
    create_client, from_genai_response, to_genai_messages, to_genai_options, to_genai_tools,
    ProviderConfig,
};
use super::traits::{ChatOptions, Provider, ProviderModelConfig};

/// Provider for OpenAI and any genai-supported or OpenAI-compatible API
pub struct GenaiProvider {
    provider_id: String,
    logger: Arc<dyn Logger>,
}

impl GenaiProvider {
    pub fn new(provider_id: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        Self {
            provider_id: provider_id.into(),
            logger,
        }
    }

    /// Extract model name from a model string (e.g., "openai/gpt-4o" -> "gpt-4o")
    pub fn extract_model_name(model: &str) -> &str {
        model.split_once('/').map(|(_, name)| name).unwrap_or(model)
    }

    /// The hosted OpenAI API cannot be called without a key. Custom base
    /// URLs (local servers, proxies) may not need one.
    fn check_api_key(&self, model: &ProviderModelConfig, env: &EnvSettings) -> ProviderResult<()> {
        let hosted_openai = self.provider_id.eq_ignore_ascii_case("openai") && model.api_base.is_none();
        if hosted_openai && model.api_key.is_none() && env.api_key.is_none() {
            return Err(ProviderError::missing_api_key(&self.provider_id));
        }
        Ok(())
    }
}

#[async_trait]
impl Provider for GenaiProvider {
    fn name(&self) -> &str {
        &self.provider_id
    }

    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        model_config: ProviderModelConfig,
        options: ChatOptions,
    ) -> ProviderResult<Vec<AssistantChoice>> {
        self.check_api_key(&model_config, &EnvSettings::from_env())?;

        let tool_count = options.tools.as_ref().map_or(0, Vec::len);
        self.logger.debug(&format!(
            "[GenaiProvider] complete: provider={}, model={}, messages={}, tools={}",
            self.provider_id,
            model_config.model,
            messages.len(),
            tool_count
        ));

        let client = create_client(&ProviderConfig::from_model(&self.provider_id, &model_config));

        let mut chat_req = ChatRequest::new(to_genai_messages(messages));
        if let Some(tools) = options.tools {
            chat_req = chat_req.with_tools(to_genai_tools(tools));
        }

        let genai_options = to_genai_options(&model_config);
        let model_name = Self::extract_model_name(&model_config.model);

        let response = client
            .exec_chat(model_name, chat_req, Some(&genai_options))
            .await
            .map_err(|e| {
                self.logger
                    .error(&format!("[GenaiProvider] Request failed: {}", e));
                ProviderError::request_failed(self.provider_id.clone(), e.to_string())
            })?;

        let choice = from_genai_response(&response);
        self.logger.debug(&format!(
            "[GenaiProvider] Response: text={}, tool_calls={}",
            choice.text_content().is_some(),
            choice.tool_calls.len()
        ));

        Ok(vec![choice])
    }
}
