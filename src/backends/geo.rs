//! Geospatial hotspot backend.
//!
//! Event clustering runs in an external service; the geo worker only
//! consumes the resulting hotspot list and narrates it.

use crate::types::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One clustered event hotspot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hotspot {
    pub label: String,
    pub latitude: f64,
    pub longitude: f64,
    pub event_count: u64,
    #[serde(default)]
    pub fatalities: u64,
}

/// Narrow clustering interface consumed by the geo worker.
#[async_trait]
pub trait HotspotService: Send + Sync {
    /// Cluster events relevant to the query into geographic hotspots.
    async fn cluster(&self, query: &str) -> Result<Vec<Hotspot>>;
}

#[derive(Debug, Serialize)]
struct ClusterRequest<'a> {
    query: &'a str,
}

/// Hotspot client against a remote clustering service.
pub struct HttpHotspotService {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpHotspotService {
    pub fn new(endpoint: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_default();

        Self { http, endpoint }
    }
}

#[async_trait]
impl HotspotService for HttpHotspotService {
    async fn cluster(&self, query: &str) -> Result<Vec<Hotspot>> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&ClusterRequest { query })
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Hotspot request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Backend(format!(
                "Hotspot service returned {}",
                response.status()
            )));
        }

        response
            .json::<Vec<Hotspot>>()
            .await
            .map_err(|e| AppError::Backend(format!("Invalid hotspot response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hotspot_deserialization_defaults_fatalities() {
        let h: Hotspot = serde_json::from_str(
            r#"{"label": "Khartoum", "latitude": 15.5, "longitude": 32.5, "event_count": 42}"#,
        )
        .unwrap();
        assert_eq!(h.fatalities, 0);
        assert_eq!(h.event_count, 42);
    }
}
