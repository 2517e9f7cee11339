//! Chat endpoint providers
//!
//! `GenaiProvider` talks to OpenAI (or any OpenAI-compatible base URL) via
//! the `genai` crate. `MockProvider` returns scripted choices for tests.

mod traits;
mod error;
mod genai_adapter;
mod genai_provider;
mod mock;

pub use traits::{ChatOptions, Provider, ProviderModelConfig};
pub use error::{ProviderError, ProviderResult};
pub use genai_provider::GenaiProvider;
pub use genai_adapter::ProviderConfig;
pub use mock::{MockMode, MockProvider, RecordedRequest};

use crate::logging::Logger;
use std::sync::Arc;

/// Model used when neither the config nor the environment names one
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// `mock` yields an echoing `MockProvider`; everything else goes through genai
pub fn create_provider(provider_id: &str, logger: Arc<dyn Logger>) -> Arc<dyn Provider> {
    match provider_id.to_lowercase().as_str() {
        "mock" => Arc::new(MockProvider::echo(logger)),
        _ => Arc::new(GenaiProvider::new(provider_id, logger)),
    }
}
