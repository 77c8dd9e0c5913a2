//! Final narrative synthesis over the collected worker results.

use crate::config::SynthesisConfig;
use crate::llm::LlmClient;
use crate::types::{ErrorKind, FusedDocument, Result, WorkerResult, WorkerRole};
use std::collections::HashMap;
use std::sync::Arc;

const SYNTHESIS_SYSTEM_PROMPT: &str = "You are the lead analyst of an OSINT \
reasoning system. Combine the specialist reports below into one coherent, \
well-structured answer to the user's query. Acknowledge degraded or missing \
inputs instead of papering over them.";

/// Character budget for a role's section of the synthesis prompt. Verbose
/// roles get more room than ones that already condense.
fn truncation_limit(role: WorkerRole) -> usize {
    match role {
        WorkerRole::Search => 3000,
        WorkerRole::Analyst => 2000,
        WorkerRole::Geo => 1500,
        WorkerRole::Redactor | WorkerRole::Orchestrator => 1000,
    }
}

fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        text.to_string()
    } else {
        let cut: String = text.chars().take(limit).collect();
        format!("{}...", cut)
    }
}

/// Compact rendering of a success payload for prompt embedding. Prefers the
/// worker's own prose field over a raw JSON dump.
fn render_payload(payload: &serde_json::Map<String, serde_json::Value>) -> String {
    for key in ["report", "synthesis", "summary"] {
        if let Some(serde_json::Value::String(text)) = payload.get(key) {
            return text.clone();
        }
    }
    serde_json::to_string(payload).unwrap_or_default()
}

pub struct Synthesizer {
    llm: Arc<dyn LlmClient>,
    config: SynthesisConfig,
}

impl Synthesizer {
    pub fn new(llm: Arc<dyn LlmClient>, config: SynthesisConfig) -> Self {
        Self { llm, config }
    }

    /// Builds one prompt from the query, every worker result, and the top
    /// fused context documents, then makes exactly one LLM call.
    ///
    /// Failures are rendered as short notes so the synthesis can acknowledge
    /// degraded input. When no role produced anything at all the LLM is
    /// skipped entirely.
    pub async fn synthesize(
        &self,
        query: &str,
        results: &HashMap<WorkerRole, WorkerResult>,
        fused_context: &[FusedDocument],
    ) -> Result<String> {
        if results
            .values()
            .all(|r| r.failure_kind() == Some(ErrorKind::NotAvailable))
        {
            return Ok(
                "No data sources were available to answer this query. \
                 Please check the agent configuration and try again."
                    .to_string(),
            );
        }

        let prompt = self.build_prompt(query, results, fused_context);
        tracing::debug!(prompt_chars = prompt.len(), "Running synthesis");
        self.llm
            .generate_with_system(SYNTHESIS_SYSTEM_PROMPT, &prompt)
            .await
    }

    fn build_prompt(
        &self,
        query: &str,
        results: &HashMap<WorkerRole, WorkerResult>,
        fused_context: &[FusedDocument],
    ) -> String {
        let mut prompt = format!("User query: {}\n", query);

        // Fixed role order keeps the prompt deterministic for a given input.
        for role in WorkerRole::dispatchable() {
            let Some(result) = results.get(&role) else {
                continue;
            };
            match result {
                WorkerResult::Success { payload, .. } => {
                    let rendered = render_payload(payload);
                    prompt.push_str(&format!(
                        "\n=== {} ===\n{}\n",
                        role.display_name(),
                        truncate(&rendered, truncation_limit(role))
                    ));
                }
                WorkerResult::Failure { kind, message } => {
                    prompt.push_str(&format!(
                        "\n=== {} ===\nThis source failed ({:?}): {}\n",
                        role.display_name(),
                        kind,
                        truncate(message, 200)
                    ));
                }
            }
        }

        if !fused_context.is_empty() {
            prompt.push_str("\n=== Historical context (weighted by source reliability) ===\n");
            for fused in fused_context.iter().take(self.config.max_context_docs) {
                prompt.push_str(&format!(
                    "- [{}] {}\n",
                    fused.document.source_tag,
                    truncate(&fused.document.text, self.config.context_doc_chars)
                ));
            }
        }

        prompt.push_str("\nWrite the final answer now.");
        prompt
    }
}
