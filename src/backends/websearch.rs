//! Web search backend using daedra (DuckDuckGo).

use crate::types::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One web search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Narrow web-search interface consumed by the search worker.
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>>;
}

/// Web search powered by the daedra crate.
pub struct DaedraSearch;

impl DaedraSearch {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DaedraSearch {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WebSearch for DaedraSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        let search_args = daedra::SearchArgs {
            query: query.to_string(),
            options: Some(daedra::SearchOptions {
                num_results: max_results,
                ..Default::default()
            }),
        };

        match daedra::tools::search::perform_search(&search_args).await {
            Ok(response) => Ok(response
                .data
                .iter()
                .map(|r| SearchHit {
                    title: r.title.clone(),
                    url: r.url.clone(),
                    snippet: r.description.clone(),
                })
                .collect()),
            Err(e) => Err(AppError::Backend(format!("Web search failed: {}", e))),
        }
    }
}
