//! LLM backend abstraction.
//!
//! The orchestration core treats the language model as an opaque
//! text-completion service behind [`LlmClient`]. The only shipped
//! implementation talks to a local Ollama server.

pub mod client;
pub mod ollama;

pub use client::{LlmClient, LlmClientFactory};
pub use ollama::OllamaClient;
