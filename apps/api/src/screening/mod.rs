//! Screening orchestrators.
//!
//! Every agent follows the same pipeline: normalize input text, render a named template,
//! ask the backend for a completion, validate it into a record. Agents carry a
//! [`ScreeningContext`] handed to them at construction; nothing here reaches a provider
//! except through it.

use std::sync::Arc;

use tracing::debug;

use crate::errors::AppError;
use crate::llm_client::CompletionBackend;
use crate::models::FromCompletion;
use crate::prompts::TemplateStore;
use crate::similarity::similarity_score;

pub mod ats;
pub mod batch;
pub mod blend;
pub mod handlers;
pub mod matching;
pub mod profile;

#[cfg(test)]
pub(crate) mod testing;

pub use ats::AtsAgent;
pub use blend::{BlendPolicy, SemanticSignal, UnweightedAverage, PLACEHOLDER_SIMILARITY};
pub use matching::{MatchReport, MatchingPipeline};
pub use profile::{JdAgent, ResumeAgent};

/// Collaborators shared by every agent. Cheap to clone.
#[derive(Clone)]
pub struct ScreeningContext {
    pub backend: Arc<dyn CompletionBackend>,
    pub templates: Arc<TemplateStore>,
    pub blend: Arc<dyn BlendPolicy>,
}

impl ScreeningContext {
    pub fn new(backend: Arc<dyn CompletionBackend>, templates: Arc<TemplateStore>) -> Self {
        Self {
            backend,
            templates,
            blend: Arc::new(UnweightedAverage),
        }
    }

    pub fn with_blend_policy(mut self, blend: Arc<dyn BlendPolicy>) -> Self {
        self.blend = blend;
        self
    }

    /// Render, complete, validate.
    pub async fn run<T: FromCompletion>(
        &self,
        template: &str,
        fields: &[(&str, &str)],
    ) -> Result<T, AppError> {
        let prompt = self.templates.render(template, fields)?;
        let completion = self.backend.complete(&prompt).await?;
        Ok(T::from_completion(&completion)?)
    }

    /// Embeds both descriptions and scores them when the backend supports it; otherwise
    /// returns the placeholder signal without calling the embedding endpoint.
    pub async fn semantic_signal(
        &self,
        candidate: &str,
        job: &str,
    ) -> Result<SemanticSignal, AppError> {
        if !self.backend.semantic_similarity() {
            return Ok(SemanticSignal::Placeholder(PLACEHOLDER_SIMILARITY));
        }

        let candidate = self.backend.embed(candidate).await?;
        let job = self.backend.embed(job).await?;
        let score = similarity_score(&candidate, &job)?;
        debug!("Semantic similarity {score:.3}");
        Ok(SemanticSignal::Measured(score))
    }

    /// Folds a semantic signal into a model score using the configured policy.
    pub fn blend(&self, model_score: f64, signal: SemanticSignal) -> f64 {
        self.blend.blend(model_score, signal)
    }
}

/// Renders a record into a prompt slot.
pub(crate) fn prompt_json<T: serde::Serialize>(record: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(record)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to render record: {e}")))
}
