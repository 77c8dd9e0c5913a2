//! Analyst worker: historical archive retrieval plus LLM analysis.

use crate::agents::{Worker, WorkerPayload};
use crate::backends::ArchiveStore;
use crate::llm::LlmClient;
use crate::types::{ContextDocument, Result, WorkerRole};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

const ANALYST_SYSTEM_PROMPT: &str = "You are an analytical agent specialized in \
geopolitical pattern detection. Ground your analysis in the provided historical \
context and state uncertainty explicitly when the context is thin.";

/// Worker that retrieves historical context from the semantic archive and
/// asks the LLM for an analytical synthesis over it.
pub struct AnalystWorker {
    archive: Arc<dyn ArchiveStore>,
    llm: Arc<dyn LlmClient>,
    top_k: usize,
}

impl AnalystWorker {
    pub fn new(archive: Arc<dyn ArchiveStore>, llm: Arc<dyn LlmClient>, top_k: usize) -> Self {
        Self {
            archive,
            llm,
            top_k,
        }
    }

    fn build_prompt(query: &str, documents: &[ContextDocument]) -> String {
        let mut prompt = format!("Query: {}\n", query);
        if documents.is_empty() {
            prompt.push_str("\nNo historical context was retrieved for this query.\n");
        } else {
            prompt.push_str("\nHistorical context:\n");
            for (i, doc) in documents.iter().enumerate() {
                let text: String = doc.text.chars().take(300).collect();
                prompt.push_str(&format!("\n{}. [{}] {}", i + 1, doc.source_tag, text));
            }
            prompt.push('\n');
        }
        prompt.push_str(
            "\nAnalyze patterns, trends, and causal factors relevant to the query. \
             Be concise and evidence-driven.",
        );
        prompt
    }
}

#[async_trait]
impl Worker for AnalystWorker {
    fn role(&self) -> WorkerRole {
        WorkerRole::Analyst
    }

    async fn execute(&self, input: &str) -> Result<WorkerPayload> {
        let documents = self.archive.query(input, self.top_k).await.unwrap_or_else(|e| {
            // Analysis degrades to pure reasoning when the archive is down.
            tracing::warn!(error = %e, "Archive retrieval failed, analyzing without context");
            Vec::new()
        });

        let prompt = Self::build_prompt(input, &documents);
        let synthesis = self
            .llm
            .generate_with_system(ANALYST_SYSTEM_PROMPT, &prompt)
            .await?;

        let mut payload = WorkerPayload::new();
        payload.insert("synthesis".to_string(), json!(synthesis));
        payload.insert("document_count".to_string(), json!(documents.len()));
        payload.insert(
            "sources".to_string(),
            json!(documents
                .iter()
                .map(|d| d.source_tag.clone())
                .collect::<Vec<_>>()),
        );
        Ok(payload)
    }
}
