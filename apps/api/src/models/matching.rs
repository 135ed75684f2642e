//! Match scoring and the human-readable explanation built on top of it.

use serde::Serialize;

use super::fields::Fields;
use super::{FromCompletion, SchemaError, NOT_SPECIFIED};
use crate::llm_client::Completion;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchingScore {
    pub overall_score: f64,
    pub skills_match: f64,
    pub experience_match: f64,
    pub education_match: f64,
    pub reasoning: String,
}

impl FromCompletion for MatchingScore {
    fn from_completion(map: &Completion) -> Result<Self, SchemaError> {
        let f = Fields::new(map);
        Ok(Self {
            overall_score: f.score("overall_score")?,
            skills_match: f.score("skills_match")?,
            experience_match: f.score("experience_match")?,
            education_match: f.score("education_match")?,
            reasoning: f.text_or("reasoning", "Analysis completed")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplanationResult {
    /// Never empty: falls back to a single placeholder entry.
    pub strengths: Vec<String>,
    pub gaps: Vec<String>,
    /// Never empty: falls back to a single placeholder entry.
    pub recommendations: Vec<String>,
    pub fit_assessment: String,
}

impl FromCompletion for ExplanationResult {
    fn from_completion(map: &Completion) -> Result<Self, SchemaError> {
        let f = Fields::new(map);
        Ok(Self {
            strengths: or_placeholder(f.trimmed_list("strengths")?),
            gaps: f.optional_trimmed_list("gaps")?,
            recommendations: or_placeholder(f.trimmed_list("recommendations")?),
            fit_assessment: f.text_or("fit_assessment", "Assessment completed")?,
        })
    }
}

fn or_placeholder(items: Vec<String>) -> Vec<String> {
    if items.is_empty() {
        vec![NOT_SPECIFIED.to_string()]
    } else {
        items
    }
}
