//! LLM client trait and factory.

use crate::config::TalonConfig;
use crate::types::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Generic LLM client trait for provider abstraction.
///
/// The orchestration layer never depends on a concrete provider; every
/// component that needs text completion takes an `Arc<dyn LlmClient>`.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a completion from a prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate with a system prompt.
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Get the model name/identifier.
    fn model_name(&self) -> &str;
}

/// Creates per-role LLM clients from configuration.
///
/// Each worker role can be pinned to its own model in `[models]`; roles
/// without an explicit assignment share the Ollama default.
pub struct LlmClientFactory {
    base_url: String,
    request_timeout_secs: u64,
    config: Arc<TalonConfig>,
}

impl LlmClientFactory {
    pub fn new(config: Arc<TalonConfig>) -> Self {
        Self {
            base_url: config.ollama.base_url.clone(),
            request_timeout_secs: config.ollama.request_timeout_secs,
            config,
        }
    }

    /// Create a client for the model assigned to the given role name.
    pub fn client_for(&self, role: &str) -> Arc<dyn LlmClient> {
        let model = self.config.model_for(role);
        Arc::new(crate::llm::ollama::OllamaClient::new(
            self.base_url.clone(),
            model,
            self.request_timeout_secs,
        ))
    }

    /// Create a client for the default model.
    pub fn default_client(&self) -> Arc<dyn LlmClient> {
        Arc::new(crate::llm::ollama::OllamaClient::new(
            self.base_url.clone(),
            self.config.ollama.default_model.clone(),
            self.request_timeout_secs,
        ))
    }
}
