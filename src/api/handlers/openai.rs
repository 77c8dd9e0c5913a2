//! OpenAI-compatible chat completions and model listing.

use crate::orchestrate::{render_content, EventSink};
use crate::types::{AppError, OrchestrationRequest, Result, WorkerRole};
use crate::AppState;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CompletionRequest {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub messages: Vec<CompletionMessage>,
    /// OpenAI clients poll for streams, so streaming is the default here.
    #[serde(default = "default_stream")]
    pub stream: bool,
}

#[derive(Debug, Deserialize)]
pub struct CompletionMessage {
    pub role: String,
    #[serde(default)]
    pub content: String,
}

fn default_stream() -> bool {
    true
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

pub async fn chat_completions(
    State(state): State<AppState>,
    Json(payload): Json<CompletionRequest>,
) -> Result<Response> {
    let query = payload
        .messages
        .iter()
        .rev()
        .find(|m| m.role == "user")
        .map(|m| m.content.trim().to_string())
        .unwrap_or_default();
    if query.is_empty() {
        return Err(AppError::InvalidInput(
            "No user message in request".to_string(),
        ));
    }

    let model = payload
        .model
        .unwrap_or_else(|| state.config.stream.model_name.clone());
    let request = OrchestrationRequest::new(query, None, payload.stream);

    if request.wants_streaming {
        return Ok(super::sse_response(state, request, model).into_response());
    }

    let report = state
        .orchestrator
        .execute(&request, &EventSink::disabled())
        .await?;
    let content = render_content(&report);

    let prompt_tokens = word_count(&report.query);
    let completion_tokens = word_count(content);
    Ok(Json(json!({
        "id": format!("chatcmpl-{}", Uuid::new_v4()),
        "object": "chat.completion",
        "created": Utc::now().timestamp(),
        "model": model,
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": content,
            },
            "finish_reason": "stop",
        }],
        "usage": {
            "prompt_tokens": prompt_tokens,
            "completion_tokens": completion_tokens,
            "total_tokens": prompt_tokens + completion_tokens,
        }
    }))
    .into_response())
}

/// Advertises the orchestrator and the individual worker roles as model
/// cards so Open WebUI can list them.
pub async fn models(State(state): State<AppState>) -> Json<serde_json::Value> {
    let created = Utc::now().timestamp();
    let mut data = vec![json!({
        "id": state.config.stream.model_name,
        "object": "model",
        "created": created,
        "owned_by": "talon",
        "name": "TALON Orchestrator",
        "description": "Multi-agent orchestrator for OSINT analysis",
    })];
    for role in WorkerRole::dispatchable() {
        data.push(json!({
            "id": format!("talon-{}", role),
            "object": "model",
            "created": created,
            "owned_by": "talon",
            "name": role.display_name(),
            "description": format!("Direct access to the {}", role.display_name()),
        }));
    }

    Json(json!({
        "object": "list",
        "data": data,
    }))
}
