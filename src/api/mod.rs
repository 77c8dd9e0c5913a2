//! REST API surface: native chat plus OpenAI-compatible endpoints.

pub mod handlers;
pub mod routes;

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::chat::chat,
        handlers::status::root,
        handlers::status::health,
        handlers::status::status,
    ),
    components(schemas(
        crate::types::ChatRequest,
        crate::types::ChatResponse,
        crate::types::StatusResponse,
        crate::types::WorkerRole,
    )),
    tags(
        (name = "chat", description = "Query orchestration"),
        (name = "system", description = "Service health and status")
    )
)]
pub struct ApiDoc;
