//! Chat endpoint errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("API key is required for {provider}")]
    MissingApiKey { provider: String },

    /// The request did not produce a response, or the endpoint refused it
    #[error("{provider} request failed: {message}")]
    RequestFailed { provider: String, message: String },

    /// The endpoint answered with something unusable
    #[error("Invalid response from {provider}: {message}")]
    InvalidResponse { provider: String, message: String },
}

impl ProviderError {
    pub fn missing_api_key(provider: impl Into<String>) -> Self {
        Self::MissingApiKey {
            provider: provider.into(),
        }
    }

    pub fn request_failed(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RequestFailed {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn invalid_response(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;
