//! Worker agents and the registry that owns their instances.

pub mod analyst;
pub mod geo;
pub mod redactor;
pub mod registry;
pub mod search;

use crate::types::{Result, WorkerRole};
use async_trait::async_trait;

pub use analyst::AnalystWorker;
pub use geo::GeoWorker;
pub use redactor::RedactorWorker;
pub use registry::AgentRegistry;
pub use search::SearchWorker;

/// Structured payload produced by a successful worker invocation.
pub type WorkerPayload = serde_json::Map<String, serde_json::Value>;

/// Capability contract every worker implements.
///
/// One invocation produces exactly one result. The caller enforces the
/// deadline by cancelling the future, so implementations must not spawn
/// background work that outlives the call.
#[async_trait]
pub trait Worker: Send + Sync {
    /// The role this worker fills.
    fn role(&self) -> WorkerRole;

    /// Execute the worker's capability for the given input.
    async fn execute(&self, input: &str) -> Result<WorkerPayload>;
}
