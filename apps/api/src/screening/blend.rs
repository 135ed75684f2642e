//! Blending a semantic similarity signal into a model-produced score.
//!
//! Carried in `ScreeningContext` as `Arc<dyn BlendPolicy>` so a weighted rule can replace
//! the default without touching the agents.

use crate::models::clamp_score;

/// Similarity assumed when no embedding pass runs.
pub const PLACEHOLDER_SIMILARITY: f32 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SemanticSignal {
    /// Cosine similarity of real embeddings, in [0, 1].
    Measured(f32),
    /// Assumed similarity. Never blended.
    Placeholder(f32),
}

pub trait BlendPolicy: Send + Sync {
    fn name(&self) -> &str;

    /// Result is always within [0, 100].
    fn blend(&self, model_score: f64, signal: SemanticSignal) -> f64;
}

/// Mean of the model score and the similarity on a 0-100 scale.
pub struct UnweightedAverage;

impl BlendPolicy for UnweightedAverage {
    fn name(&self) -> &str {
        "unweighted_average"
    }

    fn blend(&self, model_score: f64, signal: SemanticSignal) -> f64 {
        match signal {
            SemanticSignal::Measured(similarity) => {
                clamp_score((model_score + f64::from(similarity) * 100.0) / 2.0)
            }
            SemanticSignal::Placeholder(_) => clamp_score(model_score),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measured_signal_is_averaged() {
        let blended = UnweightedAverage.blend(80.0, SemanticSignal::Measured(0.5));
        assert!((blended - 65.0).abs() < 1e-9);
    }

    #[test]
    fn test_placeholder_leaves_score_unchanged() {
        let blended =
            UnweightedAverage.blend(78.0, SemanticSignal::Placeholder(PLACEHOLDER_SIMILARITY));
        assert_eq!(blended, 78.0);
    }

    #[test]
    fn test_blend_stays_in_range() {
        for model in [0.0, 42.0, 100.0] {
            for similarity in [0.0f32, 0.37, 1.0] {
                let blended = UnweightedAverage.blend(model, SemanticSignal::Measured(similarity));
                assert!((0.0..=100.0).contains(&blended));
            }
        }
    }
}
