use crate::orchestrate::{render_content, EventSink};
use crate::types::{
    AppError, ChatRequest, ChatResponse, OrchestrationReport, OrchestrationRequest, Result,
};
use crate::AppState;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;

/// Run a query through the multi-agent pipeline
#[utoipa::path(
    post,
    path = "/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Orchestrated response", body = ChatResponse),
        (status = 400, description = "Empty query")
    ),
    tag = "chat"
)]
pub async fn chat(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Response> {
    if payload.query.trim().is_empty() {
        return Err(AppError::EmptyQuery);
    }

    let request = OrchestrationRequest::new(payload.query, payload.session_id, payload.stream);

    if request.wants_streaming {
        let model = state.config.stream.model_name.clone();
        return Ok(super::sse_response(state, request, model).into_response());
    }

    let report = state
        .orchestrator
        .execute(&request, &EventSink::disabled())
        .await?;
    Ok(Json(chat_response(&report, request.session_id)).into_response())
}

fn chat_response(report: &OrchestrationReport, session_id: String) -> ChatResponse {
    ChatResponse {
        response: render_content(report).to_string(),
        status: "success".to_string(),
        duration: report.duration_ms as f64 / 1000.0,
        agents_used: report.roles_used.iter().map(|r| r.to_string()).collect(),
        session_id,
        timestamp: Utc::now().to_rfc3339(),
    }
}
