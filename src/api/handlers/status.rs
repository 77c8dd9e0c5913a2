use crate::types::{StatusResponse, WorkerRole};
use crate::AppState;
use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::json;
use utoipa::OpenApi;

/// Service banner
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service metadata")),
    tag = "system"
)]
pub async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "name": "TALON",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "OSINT-capable multi-agent reasoning server",
        "endpoints": {
            "chat": "/chat",
            "openai_chat": "/v1/chat/completions",
            "models": "/v1/models",
            "status": "/status",
            "health": "/health",
        }
    }))
}

/// Liveness probe
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up")),
    tag = "system"
)]
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// Registered agents and their models
#[utoipa::path(
    get,
    path = "/status",
    responses((status = 200, description = "Agent status", body = StatusResponse)),
    tag = "system"
)]
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let agents: Vec<WorkerRole> = state.orchestrator.registry().roles();
    let models = agents
        .iter()
        .map(|role| (role.to_string(), state.config.model_for(role.as_str())))
        .collect();

    Json(StatusResponse {
        status: "operational".to_string(),
        agents: agents.iter().map(|r| r.to_string()).collect(),
        models,
        timestamp: Utc::now().to_rfc3339(),
    })
}

pub async fn openapi() -> Json<serde_json::Value> {
    Json(
        serde_json::to_value(crate::api::ApiDoc::openapi())
            .unwrap_or_else(|_| json!({"error": "schema generation failed"})),
    )
}
