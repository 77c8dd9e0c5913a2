//! Top-level request execution: route, dispatch, fuse, synthesize, report.

use crate::agents::AgentRegistry;
use crate::backends::ArchiveStore;
use crate::config::TalonConfig;
use crate::fusion::SourceWeights;
use crate::orchestrate::dispatcher::{Dispatcher, EventSink};
use crate::orchestrate::router;
use crate::orchestrate::synthesizer::Synthesizer;
use crate::stream::chunk_text;
use crate::types::{
    AppError, FusedDocument, OrchestrationReport, OrchestrationRequest, ProgressEvent, Result,
    WorkerRole,
};
use chrono::Utc;
use std::sync::Arc;
use tokio::time::Instant;

/// Composes the full pipeline behind one entry point. Constructed once at
/// startup and shared across requests; holds no per-request state.
pub struct Orchestrator {
    registry: Arc<AgentRegistry>,
    dispatcher: Dispatcher,
    synthesizer: Synthesizer,
    archive: Option<Arc<dyn ArchiveStore>>,
    weights: SourceWeights,
    config: Arc<TalonConfig>,
}

impl Orchestrator {
    pub fn new(
        registry: Arc<AgentRegistry>,
        synthesizer: Synthesizer,
        archive: Option<Arc<dyn ArchiveStore>>,
        config: Arc<TalonConfig>,
    ) -> Self {
        let dispatcher = Dispatcher::new(registry.clone(), &config.dispatch);
        let weights = SourceWeights::with_overrides(&config.fusion.weights);
        Self {
            registry,
            dispatcher,
            synthesizer,
            archive,
            weights,
            config,
        }
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    /// Runs one request end to end, emitting progress through the sink.
    ///
    /// Every event sequence the sink sees ends with `Done`, including on
    /// validation failure. A rejected query produces no partial report.
    pub async fn execute(
        &self,
        request: &OrchestrationRequest,
        sink: &EventSink,
    ) -> Result<OrchestrationReport> {
        let result = self.execute_inner(request, sink).await;
        if let Err(e) = &result {
            sink.emit(ProgressEvent::ContentChunk(format!("Error: {}", e)));
        }
        sink.emit(ProgressEvent::Done);
        result
    }

    async fn execute_inner(
        &self,
        request: &OrchestrationRequest,
        sink: &EventSink,
    ) -> Result<OrchestrationReport> {
        let query = request.query.trim();
        if query.is_empty() {
            return Err(AppError::EmptyQuery);
        }

        let started = Instant::now();
        let roles = router::route(query);
        tracing::info!(
            session = %request.session_id,
            roles = ?roles,
            "Routing query"
        );

        // Historical context only feeds analytical queries; other routes go
        // straight to their live sources.
        let fused_context = if roles.contains(&WorkerRole::Analyst) {
            self.retrieve_context(query).await
        } else {
            Vec::new()
        };

        let results = self.dispatcher.run_all(query, &roles, sink).await;

        sink.emit(ProgressEvent::SynthesisStarted);
        let synthesis = match self.synthesizer.synthesize(query, &results, &fused_context).await {
            Ok(synthesis) => self.maybe_condense(synthesis).await,
            Err(e) => {
                // The request still succeeds; the narrative explains itself.
                tracing::error!(error = %e, "Synthesis backend failed, degrading");
                let succeeded: Vec<&str> = results
                    .iter()
                    .filter(|(_, r)| r.is_success())
                    .map(|(role, _)| role.display_name())
                    .collect();
                if succeeded.is_empty() {
                    "The reasoning backend is currently unavailable and no agent \
                     produced usable findings. Please try again shortly."
                        .to_string()
                } else {
                    format!(
                        "The reasoning backend is currently unavailable, so the \
                         findings from {} could not be composed into a narrative. \
                         Please try again shortly.",
                        succeeded.join(", ")
                    )
                }
            }
        };

        let report = OrchestrationReport {
            timestamp: Utc::now(),
            query: query.to_string(),
            roles_used: roles,
            results,
            synthesis,
            duration_ms: started.elapsed().as_millis() as u64,
        };

        for chunk in chunk_text(render_content(&report), self.config.stream.words_per_chunk) {
            sink.emit(ProgressEvent::ContentChunk(chunk));
        }

        Ok(report)
    }

    async fn retrieve_context(&self, query: &str) -> Vec<FusedDocument> {
        let Some(archive) = &self.archive else {
            return Vec::new();
        };
        match archive.query(query, self.config.archive.top_k).await {
            Ok(documents) => self.weights.fuse_tagged(&documents),
            Err(e) => {
                tracing::warn!(error = %e, "Context retrieval failed, continuing without");
                Vec::new()
            }
        }
    }

    /// Hands an oversized synthesis to the redactor once. Condensation
    /// failure keeps the original text.
    async fn maybe_condense(&self, synthesis: String) -> String {
        if synthesis.chars().count() <= self.config.synthesis.condense_over_chars {
            return synthesis;
        }
        let Ok(redactor) = self.registry.get(WorkerRole::Redactor).await else {
            return synthesis;
        };
        match redactor.execute(&synthesis).await {
            Ok(payload) => match payload.get("summary") {
                Some(serde_json::Value::String(summary)) => summary.clone(),
                _ => synthesis,
            },
            Err(e) => {
                tracing::warn!(error = %e, "Condensation failed, keeping full synthesis");
                synthesis
            }
        }
    }
}

/// The content string delivered to the client. The streaming path chunks
/// exactly this string, so both delivery modes produce identical text.
pub fn render_content(report: &OrchestrationReport) -> &str {
    &report.synthesis
}
