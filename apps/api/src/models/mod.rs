//! Structured records produced from completions, and the validation that builds them.
//!
//! Every record is built exactly once from one completion mapping via [`FromCompletion`]
//! and never mutated afterwards. Known fields are validated strictly; unknown keys are ignored.

use thiserror::Error;

use crate::llm_client::Completion;

pub mod ats;
pub mod fields;
pub mod matching;
pub mod profile;

pub use ats::{
    AtsScanResult, AtsScreeningResult, CandidateSummary, FinalDecision, InterviewQuestions,
    SkillGapAnalysis,
};
pub use matching::{ExplanationResult, MatchingScore};
pub use profile::{JobRequirements, ResumeData};

/// Sentinel for blank descriptive fields.
pub const NOT_SPECIFIED: &str = "Not specified";

/// A completion field that is absent, of the wrong shape, or not coercible.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Invalid field '{field}': {reason} (received {received})")]
pub struct SchemaError {
    pub field: String,
    pub received: String,
    pub reason: String,
}

/// Construction of a record from the mapping a backend returned.
pub trait FromCompletion: Sized {
    fn from_completion(map: &Completion) -> Result<Self, SchemaError>;
}

/// Clamps a score into the inclusive [0, 100] range every bounded field lives in.
pub fn clamp_score(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}
