//! LLM Client: the single point of entry for every completion and embedding call.
//!
//! No other module may talk to a model provider directly. Orchestrators receive an
//! `Arc<dyn CompletionBackend>` at construction and go through it.
//!
//! Backends: OpenAI and Groq (both chat-completions wire format, see `openai.rs`) and a
//! deterministic network-free stub. The backend is chosen once at startup by `build_backend`.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::info;

use crate::config::Config;

pub mod cache;
pub mod extract;
pub mod openai;
pub mod prompts;
pub mod retry;
pub mod stub;

pub use cache::CachedBackend;
pub use openai::{ChatCompletionsBackend, Provider};
pub use retry::RetryPolicy;
pub use stub::StubBackend;

/// Dimension of every embedding vector produced by a backend.
pub const EMBEDDING_DIMS: usize = 1536;

/// Parsed JSON object returned by `complete`.
pub type Completion = Map<String, Value>;

#[derive(Debug, Error)]
pub enum LlmError {
    /// The backend answered, but no JSON object could be recovered from the text.
    /// Never retried: the content is structurally wrong, not transiently wrong.
    #[error("Malformed completion, no JSON object recovered: {source}")]
    MalformedResponse {
        #[source]
        source: serde_json::Error,
    },

    #[error("Backend '{backend}' unavailable after {attempts} attempt(s): {last_error}")]
    BackendUnavailable {
        backend: String,
        attempts: u32,
        last_error: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Stub,
    #[serde(rename = "openai")]
    OpenAi,
    Groq,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackendKind::Stub => "stub",
            BackendKind::OpenAi => "openai",
            BackendKind::Groq => "groq",
        };
        f.write_str(name)
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stub" | "demo" | "mock" => Ok(BackendKind::Stub),
            "openai" => Ok(BackendKind::OpenAi),
            "groq" => Ok(BackendKind::Groq),
            other => Err(format!(
                "unknown backend '{other}' (expected stub, openai, or groq)"
            )),
        }
    }
}

/// Fixed request parameters shared by every call a backend makes.
#[derive(Debug, Clone, Copy)]
pub struct RequestParams {
    pub max_tokens: u32,
    /// Kept low so repeated screenings of the same input agree.
    pub temperature: f32,
    pub timeout: Duration,
}

impl Default for RequestParams {
    fn default() -> Self {
        Self {
            max_tokens: 2000,
            temperature: 0.1,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Capability interface over a model provider.
///
/// Carried by every orchestrator as `Arc<dyn CompletionBackend>`.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    fn name(&self) -> &str;

    fn kind(&self) -> BackendKind;

    /// Whether orchestrators should run a real embedding pass and blend it into model scores.
    /// Only OpenAI offers an embedding model without reasoning end-to-end itself.
    fn semantic_similarity(&self) -> bool {
        self.kind() == BackendKind::OpenAi
    }

    /// Sends `prompt` and returns the JSON object recovered from the completion.
    async fn complete(&self, prompt: &str) -> Result<Completion, LlmError>;

    /// Sends `prompt` and returns the completion as plain text, no JSON handling.
    async fn complete_text(&self, prompt: &str) -> Result<String, LlmError>;

    /// Embeds `text` into an `EMBEDDING_DIMS`-long vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError>;
}

/// Builds the backend named by the configuration, wrapped in the completion cache if enabled.
pub fn build_backend(config: &Config) -> anyhow::Result<Arc<dyn CompletionBackend>> {
    let params = RequestParams {
        max_tokens: config.max_tokens,
        temperature: config.temperature,
        timeout: Duration::from_secs(config.request_timeout_secs),
    };
    let retry = RetryPolicy {
        max_attempts: config.max_retries,
        ..RetryPolicy::default()
    };

    let backend: Arc<dyn CompletionBackend> = match config.backend {
        BackendKind::Stub => Arc::new(StubBackend::new()),
        BackendKind::OpenAi => {
            let provider = Provider::openai(
                config.openai_api_key.clone().unwrap_or_default(),
                config.openai_model.clone(),
                config.embedding_model.clone(),
            );
            Arc::new(ChatCompletionsBackend::new(provider, params, retry)?)
        }
        BackendKind::Groq => {
            let provider = Provider::groq(
                config.groq_api_key.clone().unwrap_or_default(),
                config.groq_model.clone(),
            );
            Arc::new(ChatCompletionsBackend::new(provider, params, retry)?)
        }
    };

    info!(
        "Completion backend: {} (semantic similarity: {})",
        backend.name(),
        backend.semantic_similarity()
    );

    if config.completion_cache {
        info!(
            "Completion cache enabled (capacity {})",
            config.completion_cache_capacity
        );
        return Ok(Arc::new(CachedBackend::new(
            backend,
            config.completion_cache_capacity,
        )));
    }
    Ok(backend)
}
