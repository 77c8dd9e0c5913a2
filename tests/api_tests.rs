//! End-to-end API tests over an in-process server with mocked agents.

mod common;

use axum_test::TestServer;
use common::mocks::{register_mock, MockLlmClient};
use serde_json::json;
use std::sync::Arc;
use talon::agents::AgentRegistry;
use talon::config::TalonConfig;
use talon::orchestrate::{Orchestrator, Synthesizer};
use talon::types::WorkerRole;
use talon::AppState;

fn test_state(synthesis_reply: &str) -> AppState {
    let registry = Arc::new(AgentRegistry::new());
    register_mock(&registry, WorkerRole::Search, "report", "web findings");
    register_mock(&registry, WorkerRole::Analyst, "synthesis", "pattern analysis");
    register_mock(&registry, WorkerRole::Redactor, "summary", "condensed");

    let config = Arc::new(TalonConfig::default());
    let llm = Arc::new(MockLlmClient::new(synthesis_reply));
    let synthesizer = Synthesizer::new(llm, config.synthesis.clone());
    let orchestrator = Arc::new(Orchestrator::new(registry, synthesizer, None, config.clone()));

    AppState {
        config,
        orchestrator,
    }
}

fn server(state: AppState) -> TestServer {
    let app = talon::api::routes::create_router().with_state(state);
    TestServer::new(app).expect("test server")
}

/// Content frames extracted from an SSE body, concatenated.
fn sse_content(body: &str) -> String {
    let mut content = String::new();
    for line in body.lines() {
        let Some(payload) = line.strip_prefix("data: ") else {
            continue;
        };
        if payload == "[DONE]" {
            break;
        }
        if let Ok(chunk) = serde_json::from_str::<serde_json::Value>(payload) {
            if let Some(text) = chunk["choices"][0]["delta"]["content"].as_str() {
                content.push_str(text);
            }
        }
    }
    content
}

#[tokio::test]
async fn test_chat_returns_synthesis() {
    let server = server(test_state("the final answer"));

    let response = server
        .post("/chat")
        .json(&json!({"query": "analyze economic trends"}))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["response"], "the final answer");
    assert_eq!(body["status"], "success");
    assert_eq!(body["session_id"], "default");
    assert_eq!(body["agents_used"], json!(["analyst"]));
}

#[tokio::test]
async fn test_chat_rejects_empty_query() {
    let server = server(test_state("unused"));

    let response = server.post("/chat").json(&json!({"query": "   "})).await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_streaming_and_non_streaming_content_match() {
    let reply = "alpha beta gamma delta epsilon zeta";

    let plain = server(test_state(reply))
        .post("/chat")
        .json(&json!({"query": "analyze this", "stream": false}))
        .await;
    plain.assert_status_ok();
    let plain_body: serde_json::Value = plain.json();

    let streamed = server(test_state(reply))
        .post("/chat")
        .json(&json!({"query": "analyze this", "stream": true}))
        .await;
    streamed.assert_status_ok();
    let body = streamed.text();

    // The streamed transcript carries progress lines before the synthesis
    // content; the content itself must match the non-streaming response.
    let content = sse_content(&body);
    assert!(content.ends_with(plain_body["response"].as_str().unwrap()));
    assert!(content.contains("AnalystAgent: Working..."));
    assert!(body.trim_end().ends_with("data: [DONE]"));
}

#[tokio::test]
async fn test_openai_completions_non_streaming() {
    let server = server(test_state("narrative"));

    let response = server
        .post("/v1/chat/completions")
        .json(&json!({
            "model": "talon-orchestrator",
            "stream": false,
            "messages": [
                {"role": "system", "content": "be brief"},
                {"role": "user", "content": "analyze the data"}
            ]
        }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["object"], "chat.completion");
    assert_eq!(body["choices"][0]["message"]["content"], "narrative");
    assert_eq!(body["choices"][0]["finish_reason"], "stop");
    assert_eq!(body["usage"]["completion_tokens"], 1);
    assert_eq!(body["usage"]["total_tokens"], 4);
}

#[tokio::test]
async fn test_openai_completions_defaults_to_streaming() {
    let server = server(test_state("streamed narrative"));

    let response = server
        .post("/api/chat/completions")
        .json(&json!({
            "messages": [{"role": "user", "content": "analyze stuff"}]
        }))
        .await;

    response.assert_status_ok();
    let body = response.text();
    assert!(body.contains("chat.completion.chunk"));
    assert!(sse_content(&body).ends_with("streamed narrative"));
}

#[tokio::test]
async fn test_openai_completions_requires_user_message() {
    let server = server(test_state("unused"));

    let response = server
        .post("/v1/chat/completions")
        .json(&json!({"messages": [{"role": "system", "content": "hi"}]}))
        .await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_models_lists_orchestrator_and_agents() {
    let server = server(test_state("unused"));

    let response = server.get("/v1/models").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["object"], "list");

    let ids: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|m| m["id"].as_str())
        .collect();
    assert!(ids.contains(&"talon-orchestrator"));
    assert!(ids.contains(&"talon-search"));
    assert!(ids.contains(&"talon-geo"));
}

#[tokio::test]
async fn test_status_reports_registered_agents() {
    let server = server(test_state("unused"));

    let response = server.get("/status").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "operational");
    // Geo has no registered constructor in the test wiring.
    assert_eq!(body["agents"], json!(["search", "analyst", "redactor"]));
}

#[tokio::test]
async fn test_health_and_root() {
    let server = server(test_state("unused"));

    let health = server.get("/health").await;
    health.assert_status_ok();
    let body: serde_json::Value = health.json();
    assert_eq!(body["status"], "healthy");

    let root = server.get("/").await;
    root.assert_status_ok();
    let body: serde_json::Value = root.json();
    assert_eq!(body["name"], "TALON");
}

#[tokio::test]
async fn test_degraded_synthesis_still_succeeds() {
    let registry = Arc::new(AgentRegistry::new());
    register_mock(&registry, WorkerRole::Analyst, "synthesis", "analysis");

    let config = Arc::new(TalonConfig::default());
    let llm = Arc::new(MockLlmClient::failing());
    let synthesizer = Synthesizer::new(llm, config.synthesis.clone());
    let orchestrator = Arc::new(Orchestrator::new(registry, synthesizer, None, config.clone()));
    let server = server(AppState {
        config,
        orchestrator,
    });

    let response = server
        .post("/chat")
        .json(&json!({"query": "analyze the outlook"}))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "success");
    assert!(body["response"]
        .as_str()
        .unwrap()
        .contains("currently unavailable"));
}
