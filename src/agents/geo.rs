//! Geospatial worker: event clustering plus LLM spatial summary.

use crate::agents::{Worker, WorkerPayload};
use crate::backends::HotspotService;
use crate::llm::LlmClient;
use crate::types::{Result, WorkerRole};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

const GEO_SYSTEM_PROMPT: &str = "You are a geospatial analysis agent. Interpret \
clustered event data and describe the spatial distribution of activity in plain \
language, naming regions rather than raw coordinates where possible.";

/// Worker that queries the hotspot clustering service and summarizes the
/// resulting spatial distribution through the LLM.
pub struct GeoWorker {
    hotspots: Arc<dyn HotspotService>,
    llm: Arc<dyn LlmClient>,
}

impl GeoWorker {
    pub fn new(hotspots: Arc<dyn HotspotService>, llm: Arc<dyn LlmClient>) -> Self {
        Self { hotspots, llm }
    }
}

#[async_trait]
impl Worker for GeoWorker {
    fn role(&self) -> WorkerRole {
        WorkerRole::Geo
    }

    async fn execute(&self, input: &str) -> Result<WorkerPayload> {
        let hotspots = self.hotspots.cluster(input).await?;

        let mut payload = WorkerPayload::new();
        payload.insert("n_clusters".to_string(), json!(hotspots.len()));
        payload.insert("hotspots".to_string(), json!(hotspots));

        if hotspots.is_empty() {
            payload.insert(
                "summary".to_string(),
                json!("No geographic event clusters were identified for this query."),
            );
            return Ok(payload);
        }

        let mut prompt = format!("Query: {}\n\nIdentified event hotspots:\n", input);
        for h in &hotspots {
            prompt.push_str(&format!(
                "- {} at ({:.3}, {:.3}): {} events, {} fatalities\n",
                h.label, h.latitude, h.longitude, h.event_count, h.fatalities
            ));
        }
        prompt.push_str("\nSummarize the spatial pattern of these events.");

        let summary = self.llm.generate_with_system(GEO_SYSTEM_PROMPT, &prompt).await?;
        payload.insert("summary".to_string(), json!(summary));
        Ok(payload)
    }
}
