use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::CompletionBackend;
use crate::prompts::TemplateStore;
use crate::screening::{BlendPolicy, ScreeningContext};
use crate::similarity::SimilarityIndex;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Selected once at startup from `SCREENING_BACKEND`.
    pub backend: Arc<dyn CompletionBackend>,
    pub templates: Arc<TemplateStore>,
    pub index: Arc<SimilarityIndex>,
    /// Pluggable score blend. Default: UnweightedAverage.
    pub blend_policy: Arc<dyn BlendPolicy>,
    pub config: Config,
}

impl AppState {
    pub fn screening(&self) -> ScreeningContext {
        ScreeningContext::new(self.backend.clone(), self.templates.clone())
            .with_blend_policy(self.blend_policy.clone())
    }
}
