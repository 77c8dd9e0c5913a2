//! Mock implementations for testing.
//!
//! Shared mock LLM clients and workers used across test files without
//! duplication. None of them touch the network.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use talon::agents::{Worker, WorkerPayload};
use talon::llm::LlmClient;
use talon::types::{AppError, Result, WorkerRole};

/// Mock LLM client with a fixed response.
///
/// # Examples
///
/// ```ignore
/// let client = MockLlmClient::new("Hello, world!");
/// let client = MockLlmClient::failing();
/// ```
#[derive(Clone)]
pub struct MockLlmClient {
    response: String,
    should_fail: bool,
}

impl MockLlmClient {
    /// Create a mock client that returns the given response.
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            should_fail: false,
        }
    }

    /// Create a mock client that always returns an error.
    pub fn failing() -> Self {
        Self {
            response: String::new(),
            should_fail: true,
        }
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_with_system("", prompt).await
    }

    async fn generate_with_system(&self, _system: &str, _prompt: &str) -> Result<String> {
        if self.should_fail {
            return Err(AppError::Llm("Mock LLM failure".to_string()));
        }
        Ok(self.response.clone())
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// Mock worker producing a fixed payload under the given key.
pub struct MockWorker {
    role: WorkerRole,
    key: String,
    text: String,
    should_fail: bool,
}

impl MockWorker {
    pub fn new(role: WorkerRole, key: &str, text: &str) -> Self {
        Self {
            role,
            key: key.to_string(),
            text: text.to_string(),
            should_fail: false,
        }
    }

    pub fn failing(role: WorkerRole) -> Self {
        Self {
            role,
            key: String::new(),
            text: String::new(),
            should_fail: true,
        }
    }
}

#[async_trait]
impl Worker for MockWorker {
    fn role(&self) -> WorkerRole {
        self.role
    }

    async fn execute(&self, _input: &str) -> Result<WorkerPayload> {
        if self.should_fail {
            return Err(AppError::Backend("Mock worker failure".to_string()));
        }
        let mut payload = WorkerPayload::new();
        payload.insert(self.key.clone(), json!(self.text));
        Ok(payload)
    }
}

/// Register a mock worker for a role.
pub fn register_mock(
    registry: &talon::agents::AgentRegistry,
    role: WorkerRole,
    key: &'static str,
    text: &'static str,
) {
    registry.register(role, move || async move {
        Ok(Arc::new(MockWorker::new(role, key, text)) as Arc<dyn Worker>)
    });
}
