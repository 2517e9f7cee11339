//! Adapter between toolmux types and genai types
//!
//! Auth resolution goes through our own resolver: an explicit key from the
//! configuration wins, then the toolmux/OpenAI environment variables. A
//! custom `api_base` is routed through genai's OpenAI adapter so any
//! OpenAI-compatible endpoint works.

use std::future::Future;
use std::pin::Pin;

use genai::chat::{
    ChatMessage as GenaiMessage, ChatOptions as GenaiOptions, ChatResponse, ChatRole as GenaiRole,
    Tool as GenaiTool, ToolCall as GenaiToolCall,
};
use genai::resolver::{AuthData, AuthResolver, Endpoint, ServiceTargetResolver};
use genai::{adapter::AdapterKind, Client, ModelIden, ServiceTarget};
use serde_json::Value;

use crate::config::EnvSettings;
use crate::types::{AssistantChoice, ChatMessage, MessageRole, ToolCall, ToolDescriptor};

use super::traits::ProviderModelConfig;

// ============================================================================
// toolmux -> genai
// ============================================================================

pub fn to_genai_role(role: MessageRole) -> GenaiRole {
    match role {
        MessageRole::System => GenaiRole::System,
        MessageRole::User => GenaiRole::User,
        MessageRole::Assistant => GenaiRole::Assistant,
    }
}

pub fn to_genai_message(msg: ChatMessage) -> GenaiMessage {
    match msg.role {
        MessageRole::System => GenaiMessage::system(msg.content),
        MessageRole::User => GenaiMessage::user(msg.content),
        MessageRole::Assistant => GenaiMessage::assistant(msg.content),
    }
}

pub fn to_genai_messages(messages: Vec<ChatMessage>) -> Vec<GenaiMessage> {
    messages.into_iter().map(to_genai_message).collect()
}

/// Qualified name becomes the function name the model sees
pub fn to_genai_tool(tool: ToolDescriptor) -> GenaiTool {
    GenaiTool::new(tool.qualified_name)
        .with_description(tool.description)
        .with_schema(tool.parameter_schema)
}

pub fn to_genai_tools(tools: Vec<ToolDescriptor>) -> Vec<GenaiTool> {
    tools.into_iter().map(to_genai_tool).collect()
}

pub fn to_genai_options(model: &ProviderModelConfig) -> GenaiOptions {
    let mut genai_opts = GenaiOptions::default();
    if let Some(max_tokens) = model.max_tokens {
        genai_opts = genai_opts.with_max_tokens(max_tokens);
    }
    genai_opts
}

// ============================================================================
// genai -> toolmux
// ============================================================================

/// Keep the arguments as the raw JSON text the model produced.
///
/// genai stores arguments it could not parse as a JSON string; those are
/// passed through untouched so the dispatcher can reject them.
pub fn from_genai_tool_call(tc: &GenaiToolCall) -> ToolCall {
    let arguments = match &tc.fn_arguments {
        Value::String(raw) => raw.clone(),
        other => other.to_string(),
    };
    ToolCall::new(tc.call_id.clone(), tc.fn_name.clone(), arguments)
}

/// genai folds a completion into one response; it becomes a single choice.
pub fn from_genai_response(response: &ChatResponse) -> AssistantChoice {
    AssistantChoice {
        content: response.first_text().map(str::to_string),
        tool_calls: response
            .tool_calls()
            .into_iter()
            .map(from_genai_tool_call)
            .collect(),
    }
}

// ============================================================================
// Client creation
// ============================================================================

/// Provider configuration for routing
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Provider identifier (e.g., "openai")
    pub provider: String,
    /// API key for authentication
    pub api_key: Option<String>,
    /// Custom API base URL
    pub api_base: Option<String>,
}

impl ProviderConfig {
    pub fn from_model(provider: impl Into<String>, model: &ProviderModelConfig) -> Self {
        Self {
            provider: provider.into(),
            api_key: model.api_key.clone(),
            api_base: model.api_base.clone(),
        }
    }
}

/// genai joins paths onto the endpoint, which needs a trailing slash
fn normalize_base(base: &str) -> String {
    if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{}/", base)
    }
}

/// Create a genai Client with our auth and endpoint resolution
pub fn create_client(config: &ProviderConfig) -> Client {
    let explicit_api_key = config.api_key.clone();
    let is_openai = config.provider.eq_ignore_ascii_case("openai");

    let auth_resolver = AuthResolver::from_resolver_async_fn(
        move |_model_iden: ModelIden| -> Pin<Box<dyn Future<Output = genai::resolver::Result<Option<AuthData>>> + Send>> {
            let explicit_key = explicit_api_key.clone();

            Box::pin(async move {
                if let Some(key) = explicit_key {
                    return Ok(Some(AuthData::from_single(key)));
                }
                if is_openai {
                    if let Some(key) = EnvSettings::from_env().api_key {
                        return Ok(Some(AuthData::from_single(key)));
                    }
                }
                // Fall back to genai's own lookup
                Ok(None)
            })
        },
    );

    let api_base = config.api_base.as_deref().map(normalize_base);

    let target_resolver = ServiceTargetResolver::from_resolver_fn(
        move |target: ServiceTarget| -> Result<ServiceTarget, genai::resolver::Error> {
            let Some(base) = api_base.clone() else {
                return Ok(target);
            };

            let ServiceTarget { auth, model, .. } = target;
            Ok(ServiceTarget {
                endpoint: Endpoint::from_owned(base),
                auth,
                model: ModelIden::new(AdapterKind::OpenAI, model.model_name),
            })
        },
    );

    Client::builder()
        .with_auth_resolver(auth_resolver)
        .with_service_target_resolver(target_resolver)
        .build()
}
