use crate::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(crate::api::handlers::status::root))
        .route("/health", get(crate::api::handlers::status::health))
        .route("/status", get(crate::api::handlers::status::status))
        .route("/chat", post(crate::api::handlers::chat::chat))
        // OpenAI-compatible surface for Open WebUI and similar clients.
        .route(
            "/v1/chat/completions",
            post(crate::api::handlers::openai::chat_completions),
        )
        .route(
            "/api/chat/completions",
            post(crate::api::handlers::openai::chat_completions),
        )
        .route("/v1/models", get(crate::api::handlers::openai::models))
        .route("/api/models", get(crate::api::handlers::openai::models))
        .route(
            "/api-docs/openapi.json",
            get(crate::api::handlers::status::openapi),
        )
}
