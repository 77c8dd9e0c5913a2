//! # TALON - OSINT-capable multi-agent reasoning server
//!
//! TALON routes a free-text query to a set of specialist agents (web search,
//! analytical, geospatial, condensation), runs them concurrently with per-worker
//! and global deadlines, fuses retrieved context by source reliability, and
//! synthesizes one narrative answer through a local Ollama backend. Results are
//! served over a native chat endpoint and an OpenAI-compatible surface with SSE
//! streaming.
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use talon::agents::{AgentRegistry, AnalystWorker, Worker};
//! use talon::config::TalonConfig;
//! use talon::orchestrate::{EventSink, Orchestrator, Synthesizer};
//! use talon::types::OrchestrationRequest;
//!
//! #[tokio::main]
//! async fn main() -> talon::types::Result<()> {
//!     let config = Arc::new(TalonConfig::load("talon.toml")?);
//!     let registry = Arc::new(AgentRegistry::new());
//!     // register workers ...
//!     let factory = talon::llm::LlmClientFactory::new(config.clone());
//!     let synthesizer = Synthesizer::new(factory.default_client(), config.synthesis.clone());
//!     let orchestrator = Orchestrator::new(registry, synthesizer, None, config);
//!
//!     let request = OrchestrationRequest::new("analyze instability in the Sahel".into(), None, false);
//!     let report = orchestrator.execute(&request, &EventSink::disabled()).await?;
//!     println!("{}", report.synthesis);
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`agents`] - Worker implementations and the lazy-memoizing registry
//! - [`orchestrate`] - Routing, concurrent dispatch, synthesis
//! - [`fusion`] - Source-reliability weighted context re-ranking
//! - [`stream`] - OpenAI `chat.completion.chunk` SSE encoding
//! - [`backends`] - Web search, semantic archive, hotspot clustering
//! - [`llm`] - Ollama text-completion client
//! - [`api`] - Axum routes and handlers
//! - [`types`] - Wire types, worker results, error handling

pub mod agents;
pub mod api;
pub mod backends;
pub mod config;
pub mod fusion;
pub mod llm;
pub mod orchestrate;
pub mod stream;
pub mod types;

use crate::config::TalonConfig;
use crate::orchestrate::Orchestrator;
use std::sync::Arc;

pub use crate::agents::{AgentRegistry, Worker};
pub use crate::types::{AppError, Result};

/// Shared server state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<TalonConfig>,
    pub orchestrator: Arc<Orchestrator>,
}
