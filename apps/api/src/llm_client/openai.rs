//! Chat-completions HTTP backend. Serves both OpenAI and Groq, which share the wire format.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::extract::parse_completion;
use super::prompts::JSON_ONLY_SYSTEM;
use super::retry::{AttemptError, RetryPolicy};
use super::{BackendKind, Completion, CompletionBackend, LlmError, RequestParams};

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";

/// Where and how to reach one chat-completions provider.
#[derive(Debug, Clone)]
pub struct Provider {
    pub kind: BackendKind,
    pub base_url: String,
    pub api_key: String,
    pub chat_model: String,
    /// `None` when the provider hosts no embedding model.
    pub embedding_model: Option<String>,
}

impl Provider {
    pub fn openai(api_key: String, chat_model: String, embedding_model: String) -> Self {
        Self {
            kind: BackendKind::OpenAi,
            base_url: OPENAI_BASE_URL.to_string(),
            api_key,
            chat_model,
            embedding_model: Some(embedding_model),
        }
    }

    pub fn groq(api_key: String, chat_model: String) -> Self {
        Self {
            kind: BackendKind::Groq,
            base_url: GROQ_BASE_URL.to_string(),
            api_key,
            chat_model,
            embedding_model: None,
        }
    }

    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Live backend over a chat-completions API, with retry on transient failures.
#[derive(Clone)]
pub struct ChatCompletionsBackend {
    client: Client,
    provider: Provider,
    params: RequestParams,
    retry: RetryPolicy,
}

impl ChatCompletionsBackend {
    pub fn new(
        provider: Provider,
        params: RequestParams,
        retry: RetryPolicy,
    ) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(params.timeout).build()?;
        Ok(Self {
            client,
            provider,
            params,
            retry,
        })
    }

    /// One chat call under the retry policy. Returns the raw text of the first choice.
    async fn chat(&self, system: Option<&str>, prompt: &str) -> Result<String, LlmError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt,
        });

        let body = ChatRequest {
            model: &self.provider.chat_model,
            messages,
            max_tokens: self.params.max_tokens,
            temperature: self.params.temperature,
        };
        let url = format!("{}/chat/completions", self.provider.base_url);

        let client = &self.client;
        let api_key = self.provider.api_key.as_str();
        let url = url.as_str();
        let body = &body;

        let response: ChatResponse = self
            .retry
            .run(self.name(), || async move {
                let response = client
                    .post(url)
                    .bearer_auth(api_key)
                    .json(body)
                    .send()
                    .await
                    .map_err(|e| AttemptError::Transient(e.to_string()))?;
                read_json(response).await
            })
            .await?;

        if let Some(usage) = &response.usage {
            debug!(
                "{} call succeeded: prompt_tokens={}, completion_tokens={}",
                self.name(),
                usage.prompt_tokens,
                usage.completion_tokens
            );
        }

        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }
}

/// Classifies an HTTP response: 429 and 5xx are transient, other failures are fatal.
async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, AttemptError> {
    let status = response.status();

    if status.as_u16() == 429 || status.is_server_error() {
        let body = response.text().await.unwrap_or_default();
        warn!("Backend returned {status}: {body}");
        return Err(AttemptError::Transient(format!("status {status}: {body}")));
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiError>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        return Err(AttemptError::Fatal(format!("status {status}: {message}")));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| AttemptError::Transient(format!("unreadable response body: {e}")))
}

#[async_trait]
impl CompletionBackend for ChatCompletionsBackend {
    fn name(&self) -> &str {
        match self.provider.kind {
            BackendKind::Groq => "groq",
            _ => "openai",
        }
    }

    fn kind(&self) -> BackendKind {
        self.provider.kind
    }

    async fn complete(&self, prompt: &str) -> Result<Completion, LlmError> {
        let text = self.chat(Some(JSON_ONLY_SYSTEM), prompt).await?;
        parse_completion(&text)
    }

    async fn complete_text(&self, prompt: &str) -> Result<String, LlmError> {
        Ok(self.chat(None, prompt).await?.trim().to_string())
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let Some(model) = self.provider.embedding_model.as_deref() else {
            return Err(LlmError::BackendUnavailable {
                backend: self.name().to_string(),
                attempts: 0,
                last_error: "provider has no embedding model".to_string(),
            });
        };

        let url = format!("{}/embeddings", self.provider.base_url);
        let body = EmbeddingRequest { model, input: text };

        let client = &self.client;
        let api_key = self.provider.api_key.as_str();
        let url = url.as_str();
        let body = &body;

        self.retry
            .run(self.name(), || async move {
                let response = client
                    .post(url)
                    .bearer_auth(api_key)
                    .json(body)
                    .send()
                    .await
                    .map_err(|e| AttemptError::Transient(e.to_string()))?;
                let parsed: EmbeddingResponse = read_json(response).await?;
                parsed
                    .data
                    .into_iter()
                    .next()
                    .map(|d| d.embedding)
                    .ok_or_else(|| AttemptError::Fatal("embedding response had no data".to_string()))
            })
            .await
    }
}
