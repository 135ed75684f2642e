use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};

use crate::llm_client::openai::{DEFAULT_EMBEDDING_MODEL, DEFAULT_GROQ_MODEL, DEFAULT_OPENAI_MODEL};
use crate::llm_client::BackendKind;

/// Application configuration loaded from environment variables.
/// Fails at startup if the selected backend's API key is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub backend: BackendKind,
    pub openai_api_key: Option<String>,
    pub groq_api_key: Option<String>,
    pub openai_model: String,
    pub groq_model: String,
    pub embedding_model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub index_path: PathBuf,
    /// Directory whose `*.prompt` files override the built-in templates.
    pub template_dir: Option<PathBuf>,
    pub batch_concurrency: usize,
    pub completion_cache: bool,
    /// Most completions the cache holds before evicting.
    pub completion_cache_capacity: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let backend = match get("SCREENING_BACKEND") {
            Some(name) => BackendKind::from_str(&name)
                .map_err(|e| anyhow!(e))
                .context("SCREENING_BACKEND is invalid")?,
            None if flag(&get, "DEMO_MODE")? => BackendKind::Stub,
            None if flag(&get, "USE_GROQ")? => BackendKind::Groq,
            None => BackendKind::OpenAi,
        };

        let openai_api_key = get("OPENAI_API_KEY").filter(|k| !k.trim().is_empty());
        let groq_api_key = get("GROQ_API_KEY").filter(|k| !k.trim().is_empty());
        match backend {
            BackendKind::OpenAi if openai_api_key.is_none() => {
                return Err(missing("OPENAI_API_KEY", backend))
            }
            BackendKind::Groq if groq_api_key.is_none() => {
                return Err(missing("GROQ_API_KEY", backend))
            }
            _ => {}
        }

        Ok(Config {
            backend,
            openai_api_key,
            groq_api_key,
            openai_model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            groq_model: get("GROQ_MODEL").unwrap_or_else(|| DEFAULT_GROQ_MODEL.to_string()),
            embedding_model: get("EMBEDDING_MODEL")
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            max_tokens: parse_or(&get, "MAX_TOKENS", 2000)?,
            temperature: parse_or(&get, "TEMPERATURE", 0.1)?,
            request_timeout_secs: parse_or(&get, "REQUEST_TIMEOUT_SECS", 30)?,
            max_retries: parse_or(&get, "MAX_RETRIES", 3)?,
            index_path: get("INDEX_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("faiss_index.bin")),
            template_dir: get("TEMPLATE_DIR").map(PathBuf::from),
            batch_concurrency: parse_or(&get, "BATCH_CONCURRENCY", 4)?,
            completion_cache: flag(&get, "COMPLETION_CACHE")?,
            completion_cache_capacity: parse_or(&get, "COMPLETION_CACHE_CAPACITY", 1024)?,
            port: parse_or(&get, "PORT", 8080).context("PORT must be a valid port number")?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn missing(key: &str, backend: BackendKind) -> anyhow::Error {
    anyhow!("Required environment variable '{key}' is not set (backend: {backend})")
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        None => Ok(default),
    }
}

fn flag(get: &impl Fn(&str) -> Option<String>, key: &str) -> Result<bool> {
    match get(key).map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(false),
        Some(v) => match v.as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" | "" => Ok(false),
            _ => Err(anyhow!("Environment variable '{key}' must be true or false, got '{v}'")),
        },
    }
}
