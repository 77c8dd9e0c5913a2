//! Server configuration loaded from `talon.toml` with environment overrides.
//!
//! Every section has sensible defaults so the server runs with no config file
//! at all (local Ollama, no archive/geo backends). Environment variables
//! override the file for deployment-specific settings.

use crate::types::{AppError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TalonConfig {
    pub server: ServerConfig,
    pub ollama: OllamaConfig,
    /// Per-role model overrides keyed by role name ("search", "analyst", ...).
    pub models: HashMap<String, String>,
    pub dispatch: DispatchConfig,
    pub stream: StreamConfig,
    pub synthesis: SynthesisConfig,
    pub fusion: FusionConfig,
    pub archive: ArchiveConfig,
    pub geo: GeoConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub base_url: String,
    pub default_model: String,
    /// Outbound HTTP timeout in seconds for completion calls.
    pub request_timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:11434".to_string(),
            default_model: "magistral:latest".to_string(),
            request_timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub per_worker_timeout_ms: u64,
    pub global_timeout_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            per_worker_timeout_ms: 60_000,
            global_timeout_ms: 180_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Words per content chunk in the streamed transcript.
    pub words_per_chunk: usize,
    /// Pacing delay between chunks; smoothness only, never correctness.
    pub chunk_delay_ms: u64,
    /// Model name advertised in SSE frames and /v1/models.
    pub model_name: String,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            words_per_chunk: 3,
            chunk_delay_ms: 10,
            model_name: "talon-orchestrator".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// How many top fused documents to embed in the synthesis prompt.
    pub max_context_docs: usize,
    /// Character cap per embedded context document.
    pub context_doc_chars: usize,
    /// Synthesis longer than this is handed to the redactor for condensation.
    pub condense_over_chars: usize,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            max_context_docs: 3,
            context_doc_chars: 300,
            condense_over_chars: 8_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Source-reliability multipliers keyed by source tag.
    pub weights: HashMap<String, f64>,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            weights: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Semantic-archive query endpoint; empty disables archive retrieval.
    pub endpoint: String,
    pub top_k: usize,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            top_k: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeoConfig {
    /// Hotspot clustering service endpoint; empty disables the geo worker.
    pub endpoint: String,
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { max_results: 5 }
    }
}

impl TalonConfig {
    /// Load configuration from a TOML file, falling back to defaults when the
    /// file does not exist, then apply environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let path = path.as_ref();
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path).map_err(|e| {
                AppError::Configuration(format!("Failed to read {}: {}", path.display(), e))
            })?;
            toml::from_str(&raw).map_err(|e| {
                AppError::Configuration(format!("Failed to parse {}: {}", path.display(), e))
            })?
        } else {
            tracing::warn!(path = %path.display(), "Config file not found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(host) = env::var("TALON_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = env::var("TALON_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Ok(url) = env::var("OLLAMA_URL") {
            self.ollama.base_url = url;
        }
        if let Ok(model) = env::var("OLLAMA_MODEL") {
            self.ollama.default_model = model;
        }
        if let Ok(endpoint) = env::var("TALON_ARCHIVE_URL") {
            self.archive.endpoint = endpoint;
        }
        if let Ok(endpoint) = env::var("TALON_GEO_URL") {
            self.geo.endpoint = endpoint;
        }
    }

    /// Model assigned to a role, falling back to the Ollama default.
    pub fn model_for(&self, role: &str) -> String {
        self.models
            .get(role)
            .cloned()
            .unwrap_or_else(|| self.ollama.default_model.clone())
    }
}
