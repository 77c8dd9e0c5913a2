//! Search worker: web search and report formatting.

use crate::agents::{Worker, WorkerPayload};
use crate::backends::{SearchHit, WebSearch};
use crate::types::{Result, WorkerRole};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

/// Worker that performs a web search and formats the hits into a report.
pub struct SearchWorker {
    search: Arc<dyn WebSearch>,
    max_results: usize,
}

impl SearchWorker {
    pub fn new(search: Arc<dyn WebSearch>, max_results: usize) -> Self {
        Self {
            search,
            max_results,
        }
    }

    fn format_report(query: &str, hits: &[SearchHit]) -> String {
        let mut report = format!(
            "WEB SEARCH RESULTS FOR: {}\nFound {} results\n",
            query,
            hits.len()
        );
        for (i, hit) in hits.iter().enumerate() {
            report.push_str(&format!(
                "\n{}. {}\n   URL: {}\n   {}\n",
                i + 1,
                hit.title,
                hit.url,
                hit.snippet
            ));
        }
        report
    }
}

#[async_trait]
impl Worker for SearchWorker {
    fn role(&self) -> WorkerRole {
        WorkerRole::Search
    }

    async fn execute(&self, input: &str) -> Result<WorkerPayload> {
        let hits = self.search.search(input, self.max_results).await?;
        tracing::info!(count = hits.len(), "Web search completed");

        let report = if hits.is_empty() {
            "No search results found.".to_string()
        } else {
            Self::format_report(input, &hits)
        };

        let mut payload = WorkerPayload::new();
        payload.insert("results".to_string(), json!(hits));
        payload.insert("count".to_string(), json!(hits.len()));
        payload.insert("report".to_string(), json!(report));
        Ok(payload)
    }
}
