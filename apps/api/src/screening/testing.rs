//! Scriptable backend for orchestrator tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::ScreeningContext;
use crate::llm_client::{BackendKind, Completion, CompletionBackend, LlmError, StubBackend};
use crate::prompts::TemplateStore;

pub enum Reply {
    Map(Value),
    Malformed,
    Unavailable,
}

pub struct FakeBackend {
    reply: Reply,
    text: Result<String, ()>,
    semantic: bool,
    embedding: Vec<f32>,
    pub completions: AtomicUsize,
    pub text_calls: AtomicUsize,
    pub embed_calls: AtomicUsize,
    /// Every prompt passed to `complete`, in call order.
    pub prompts: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn new(reply: Reply) -> Self {
        Self {
            reply,
            text: Ok("plain answer".to_string()),
            semantic: false,
            embedding: vec![1.0, 0.0, 0.0],
            completions: AtomicUsize::new(0),
            text_calls: AtomicUsize::new(0),
            embed_calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn semantic(mut self, embedding: Vec<f32>) -> Self {
        self.semantic = true;
        self.embedding = embedding;
        self
    }

    pub fn failing_text(mut self) -> Self {
        self.text = Err(());
        self
    }

    fn unavailable() -> LlmError {
        LlmError::BackendUnavailable {
            backend: "fake".to_string(),
            attempts: 3,
            last_error: "connection refused".to_string(),
        }
    }
}

#[async_trait]
impl CompletionBackend for FakeBackend {
    fn name(&self) -> &str {
        "fake"
    }

    fn kind(&self) -> BackendKind {
        BackendKind::OpenAi
    }

    fn semantic_similarity(&self) -> bool {
        self.semantic
    }

    async fn complete(&self, prompt: &str) -> Result<Completion, LlmError> {
        self.completions.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.reply {
            Reply::Map(value) => Ok(value.as_object().cloned().unwrap_or_default()),
            Reply::Malformed => Err(LlmError::MalformedResponse {
                source: serde_json::from_str::<Value>("not json").unwrap_err(),
            }),
            Reply::Unavailable => Err(Self::unavailable()),
        }
    }

    async fn complete_text(&self, _prompt: &str) -> Result<String, LlmError> {
        self.text_calls.fetch_add(1, Ordering::SeqCst);
        self.text.clone().map_err(|_| Self::unavailable())
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, LlmError> {
        self.embed_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.embedding.clone())
    }
}

pub fn context(backend: Arc<dyn CompletionBackend>) -> ScreeningContext {
    ScreeningContext::new(backend, Arc::new(TemplateStore::builtin()))
}

pub fn stub_context() -> ScreeningContext {
    context(Arc::new(StubBackend::with_latency(Duration::ZERO)))
}
