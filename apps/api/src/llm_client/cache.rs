//! Content-addressed completion cache.
//!
//! Keys are the SHA-256 of the backend name plus the whitespace-collapsed prompt, so
//! screening the same resume against the same job twice costs one backend call. Only
//! successful `complete` results are cached; text completions and embeddings pass straight
//! through. Capacity is bounded and the least useful entries are evicted first.

use std::sync::Arc;

use async_trait::async_trait;
use moka::sync::Cache;
use sha2::{Digest, Sha256};
use tracing::debug;

use super::{BackendKind, Completion, CompletionBackend, LlmError};
use crate::text::normalize_text;

pub struct CachedBackend {
    inner: Arc<dyn CompletionBackend>,
    entries: Cache<String, Completion>,
}

impl CachedBackend {
    pub fn new(inner: Arc<dyn CompletionBackend>, capacity: u64) -> Self {
        Self {
            inner,
            entries: Cache::new(capacity),
        }
    }

    /// Entries currently held, after pending evictions are applied.
    #[cfg(test)]
    pub fn len(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }

    fn key(&self, prompt: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.inner.name().as_bytes());
        hasher.update([0u8]);
        hasher.update(normalize_text(prompt).as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[async_trait]
impl CompletionBackend for CachedBackend {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn kind(&self) -> BackendKind {
        self.inner.kind()
    }

    fn semantic_similarity(&self) -> bool {
        self.inner.semantic_similarity()
    }

    async fn complete(&self, prompt: &str) -> Result<Completion, LlmError> {
        let key = self.key(prompt);
        if let Some(hit) = self.entries.get(&key) {
            debug!("Completion cache hit {}", &key[..12]);
            return Ok(hit);
        }

        let completion = self.inner.complete(prompt).await?;
        self.entries.insert(key, completion.clone());
        Ok(completion)
    }

    async fn complete_text(&self, prompt: &str) -> Result<String, LlmError> {
        self.inner.complete_text(prompt).await
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        self.inner.embed(text).await
    }
}
