//! Semantic archive backend.
//!
//! The archive is an opaque ranked-retrieval service: given a query it
//! returns documents with source tags and relevance scores. Per-source
//! reliability weighting happens afterwards in the fusion layer.

use crate::types::{AppError, ContextDocument, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

/// Narrow archive-lookup interface consumed by the analyst worker and the
/// orchestrator's context-retrieval step.
#[async_trait]
pub trait ArchiveStore: Send + Sync {
    /// Return up to `top_k` documents ranked by relevance to `text`.
    async fn query(&self, text: &str, top_k: usize) -> Result<Vec<ContextDocument>>;
}

#[derive(Debug, Serialize)]
struct ArchiveQuery<'a> {
    query: &'a str,
    top_k: usize,
}

/// Archive client against a remote HTTP endpoint.
///
/// The endpoint accepts `{"query": ..., "top_k": ...}` and returns a JSON
/// array of documents (`text`, `source`, `score`, optional `metadata`).
pub struct HttpArchiveStore {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpArchiveStore {
    pub fn new(endpoint: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self { http, endpoint }
    }
}

#[async_trait]
impl ArchiveStore for HttpArchiveStore {
    async fn query(&self, text: &str, top_k: usize) -> Result<Vec<ContextDocument>> {
        let body = ArchiveQuery { query: text, top_k };

        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Archive request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Backend(format!(
                "Archive returned {}",
                response.status()
            )));
        }

        response
            .json::<Vec<ContextDocument>>()
            .await
            .map_err(|e| AppError::Backend(format!("Invalid archive response: {}", e)))
    }
}

/// Archive stand-in for deployments without an archive endpoint. Always
/// returns no documents, so analysis proceeds on reasoning alone.
pub struct NullArchive;

#[async_trait]
impl ArchiveStore for NullArchive {
    async fn query(&self, _text: &str, _top_k: usize) -> Result<Vec<ContextDocument>> {
        Ok(Vec::new())
    }
}
