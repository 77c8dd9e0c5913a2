//! Redactor worker: condenses oversized context into a compact brief.

use crate::agents::{Worker, WorkerPayload};
use crate::llm::LlmClient;
use crate::types::{Result, WorkerRole};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

const REDACTOR_SYSTEM_PROMPT: &str = "You are a condensation agent. Compress the \
provided material into a tight intelligence brief. Preserve every concrete fact, \
figure, and named entity; drop repetition and filler.";

pub struct RedactorWorker {
    llm: Arc<dyn LlmClient>,
}

impl RedactorWorker {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Worker for RedactorWorker {
    fn role(&self) -> WorkerRole {
        WorkerRole::Redactor
    }

    async fn execute(&self, input: &str) -> Result<WorkerPayload> {
        let summary = self
            .llm
            .generate_with_system(REDACTOR_SYSTEM_PROMPT, input)
            .await?;

        let mut payload = WorkerPayload::new();
        payload.insert("summary".to_string(), json!(summary));
        payload.insert("original_chars".to_string(), json!(input.len()));
        Ok(payload)
    }
}
