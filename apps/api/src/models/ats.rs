//! ATS screening records: the shortlist decision and the recruiter side-analyses.

use serde::Serialize;
use serde_json::Value;

use super::fields::Fields;
use super::{FromCompletion, SchemaError};
use crate::llm_client::Completion;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinalDecision {
    Shortlist,
    Reject,
}

impl FinalDecision {
    /// Only a case-insensitive "SHORTLIST" shortlists; every other value rejects.
    pub fn coerce(value: &str) -> Self {
        if value.eq_ignore_ascii_case("SHORTLIST") {
            FinalDecision::Shortlist
        } else {
            FinalDecision::Reject
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FinalDecision::Shortlist => "SHORTLIST",
            FinalDecision::Reject => "REJECT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtsScreeningResult {
    pub overall_match_score: f64,
    pub technical_skill_match: f64,
    pub project_relevance_score: f64,
    pub experience_score: f64,
    pub matched_skills: Vec<String>,
    pub missing_critical_skills: Vec<String>,
    pub nice_to_have_missing_skills: Vec<String>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub final_decision: FinalDecision,
    pub decision_reason: String,
}

impl FromCompletion for AtsScreeningResult {
    fn from_completion(map: &Completion) -> Result<Self, SchemaError> {
        let f = Fields::new(map);
        let final_decision = match f.value("final_decision")? {
            Value::String(s) => FinalDecision::coerce(s),
            _ => FinalDecision::Reject,
        };

        Ok(Self {
            overall_match_score: f.score("overall_match_score")?,
            technical_skill_match: f.score("technical_skill_match")?,
            project_relevance_score: f.score("project_relevance_score")?,
            experience_score: f.score("experience_score")?,
            matched_skills: f.list("matched_skills")?,
            missing_critical_skills: f.list("missing_critical_skills")?,
            nice_to_have_missing_skills: f.list("nice_to_have_missing_skills")?,
            strengths: f.list("strengths")?,
            weaknesses: f.list("weaknesses")?,
            final_decision,
            decision_reason: f.text("decision_reason")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtsScanResult {
    pub ats_score: f64,
    pub ats_issues: Vec<String>,
    pub improvement_suggestions: Vec<String>,
}

impl FromCompletion for AtsScanResult {
    fn from_completion(map: &Completion) -> Result<Self, SchemaError> {
        let f = Fields::new(map);
        Ok(Self {
            ats_score: f.score("ats_score")?,
            ats_issues: f.list("ats_issues")?,
            improvement_suggestions: f.list("improvement_suggestions")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillGapAnalysis {
    pub must_have_missing_skills: Vec<String>,
    pub good_to_have_missing_skills: Vec<String>,
    pub learning_recommendations: Vec<String>,
}

impl FromCompletion for SkillGapAnalysis {
    fn from_completion(map: &Completion) -> Result<Self, SchemaError> {
        let f = Fields::new(map);
        Ok(Self {
            must_have_missing_skills: f.list("must_have_missing_skills")?,
            good_to_have_missing_skills: f.list("good_to_have_missing_skills")?,
            learning_recommendations: f.list("learning_recommendations")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateSummary {
    pub candidate_level: String,
    pub key_expertise: Vec<String>,
    pub most_impressive_project: String,
    pub hiring_recommendation: String,
}

impl FromCompletion for CandidateSummary {
    fn from_completion(map: &Completion) -> Result<Self, SchemaError> {
        let f = Fields::new(map);
        Ok(Self {
            candidate_level: f.text("candidate_level")?,
            key_expertise: f.list("key_expertise")?,
            most_impressive_project: f.text("most_impressive_project")?,
            hiring_recommendation: f.text("hiring_recommendation")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterviewQuestions {
    pub technical_questions: Vec<String>,
    pub project_questions: Vec<String>,
    pub hr_questions: Vec<String>,
}

impl FromCompletion for InterviewQuestions {
    fn from_completion(map: &Completion) -> Result<Self, SchemaError> {
        let f = Fields::new(map);
        Ok(Self {
            technical_questions: f.list("technical_questions")?,
            project_questions: f.list("project_questions")?,
            hr_questions: f.list("hr_questions")?,
        })
    }
}
