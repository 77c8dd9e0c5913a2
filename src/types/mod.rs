use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

// ============= Worker Types =============

/// The fixed set of worker roles known to the orchestrator.
///
/// `Orchestrator` is a tag for the coordinating layer itself and is never
/// produced by routing or dispatched as a worker.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum WorkerRole {
    Search,
    Analyst,
    Geo,
    Redactor,
    Orchestrator,
}

impl WorkerRole {
    /// Stable lowercase name used in wire payloads, logs, and model ids.
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerRole::Search => "search",
            WorkerRole::Analyst => "analyst",
            WorkerRole::Geo => "geo",
            WorkerRole::Redactor => "redactor",
            WorkerRole::Orchestrator => "orchestrator",
        }
    }

    /// Display name used in progress lines and agent-transparency output.
    pub fn display_name(&self) -> &'static str {
        match self {
            WorkerRole::Search => "SearchAgent",
            WorkerRole::Analyst => "AnalystAgent",
            WorkerRole::Geo => "GeoAgent",
            WorkerRole::Redactor => "RedactorAgent",
            WorkerRole::Orchestrator => "Orchestrator",
        }
    }

    /// All roles the dispatcher can be asked to run.
    pub fn dispatchable() -> [WorkerRole; 4] {
        [
            WorkerRole::Search,
            WorkerRole::Analyst,
            WorkerRole::Geo,
            WorkerRole::Redactor,
        ]
    }
}

impl std::fmt::Display for WorkerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a worker invocation did not produce a payload.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The worker could not be constructed or was never registered.
    NotAvailable,
    /// The per-worker or global deadline elapsed.
    Timeout,
    /// The worker ran and returned an error.
    WorkerError,
}

/// Outcome of exactly one worker invocation. Never partially populated: a
/// role's entry is either a complete payload or a typed failure.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum WorkerResult {
    Success {
        payload: serde_json::Map<String, serde_json::Value>,
        produced_at: DateTime<Utc>,
    },
    Failure {
        kind: ErrorKind,
        message: String,
    },
}

impl WorkerResult {
    pub fn success(payload: serde_json::Map<String, serde_json::Value>) -> Self {
        WorkerResult::Success {
            payload,
            produced_at: Utc::now(),
        }
    }

    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        WorkerResult::Failure {
            kind,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, WorkerResult::Success { .. })
    }

    pub fn failure_kind(&self) -> Option<ErrorKind> {
        match self {
            WorkerResult::Failure { kind, .. } => Some(*kind),
            WorkerResult::Success { .. } => None,
        }
    }
}

// ============= Context Types =============

/// One document returned by the archive lookup. Immutable once returned by
/// the backend.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ContextDocument {
    pub text: String,
    #[serde(default, alias = "source")]
    pub source_tag: String,
    /// Raw retrieval score in [0, 1].
    #[serde(default = "default_raw_score", alias = "score")]
    pub raw_score: f64,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

fn default_raw_score() -> f64 {
    0.5
}

/// A context document with its reliability-weighted score attached.
#[derive(Debug, Serialize, Clone)]
pub struct FusedDocument {
    #[serde(flatten)]
    pub document: ContextDocument,
    pub weighted_score: f64,
}

// ============= Orchestration Types =============

/// One inbound request to the orchestrator. Read-only after creation.
#[derive(Debug, Clone)]
pub struct OrchestrationRequest {
    pub query: String,
    pub session_id: String,
    pub wants_streaming: bool,
}

impl OrchestrationRequest {
    pub fn new(
        query: impl Into<String>,
        session_id: Option<String>,
        wants_streaming: bool,
    ) -> Self {
        Self {
            query: query.into(),
            session_id: session_id.unwrap_or_else(|| "default".to_string()),
            wants_streaming,
        }
    }
}

/// The complete record of one orchestrated request: which roles ran, what
/// each produced, and the synthesized narrative.
#[derive(Debug, Serialize, Clone)]
pub struct OrchestrationReport {
    pub timestamp: DateTime<Utc>,
    pub query: String,
    pub roles_used: Vec<WorkerRole>,
    pub results: HashMap<WorkerRole, WorkerResult>,
    pub synthesis: String,
    pub duration_ms: u64,
}

/// One unit of the ordered wire-level progress sequence for a session.
///
/// Ordering contract: every `Started(role)` precedes its matching
/// `Completed(role)` or `Failed(role)`; `SynthesisStarted` follows all
/// dispatch events; `ContentChunk`s arrive in text order; `Done` is last
/// and unique.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Started(WorkerRole),
    Completed(WorkerRole),
    Failed(WorkerRole),
    SynthesisStarted,
    ContentChunk(String),
    Done,
}

// ============= API Request/Response Types =============

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChatRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default)]
    pub stream: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChatResponse {
    pub response: String,
    pub status: String,
    /// Wall-clock duration in seconds.
    pub duration: f64,
    pub agents_used: Vec<String>,
    pub session_id: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub status: String,
    pub agents: Vec<String>,
    pub models: HashMap<String, String>,
    pub timestamp: String,
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Query cannot be empty")]
    EmptyQuery,

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::EmptyQuery => (
                axum::http::StatusCode::BAD_REQUEST,
                "Query cannot be empty".to_string(),
            ),
            AppError::InvalidInput(msg) => (axum::http::StatusCode::BAD_REQUEST, msg),
            AppError::Llm(msg) => (axum::http::StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::Backend(msg) => (axum::http::StatusCode::BAD_GATEWAY, msg),
            AppError::Configuration(msg) => (axum::http::StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::Internal(msg) => (axum::http::StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
