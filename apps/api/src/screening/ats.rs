//! ATS screening and the recruiter-facing analyses of a single resume.

use serde_json::Value;
use tracing::warn;

use crate::errors::AppError;
use crate::llm_client::{Completion, LlmError};
use crate::models::{
    AtsScanResult, AtsScreeningResult, CandidateSummary, InterviewQuestions, SkillGapAnalysis,
};
use crate::prompts;
use crate::text::clean_text;

use super::ScreeningContext;

#[derive(Clone)]
pub struct AtsAgent {
    ctx: ScreeningContext,
}

impl AtsAgent {
    pub fn new(ctx: ScreeningContext) -> Self {
        Self { ctx }
    }

    /// Shortlist-or-reject screening of a resume against a job description.
    pub async fn screen_resume(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<AtsScreeningResult, AppError> {
        let resume = clean_text(resume_text);
        let jd = clean_text(job_description);

        let signal = self.ctx.semantic_signal(&resume, &jd).await?;
        let mut result: AtsScreeningResult = self
            .ctx
            .run(
                prompts::ATS_SCREENING,
                &[
                    ("resume_text", resume.as_str()),
                    ("job_description", jd.as_str()),
                ],
            )
            .await?;

        result.overall_match_score = self.ctx.blend(result.overall_match_score, signal);
        Ok(result)
    }

    pub async fn scan_resume_format(&self, resume_text: &str) -> Result<AtsScanResult, AppError> {
        let resume = clean_text(resume_text);
        self.ctx
            .run(prompts::ATS_SCANNER, &[("resume_text", resume.as_str())])
            .await
    }

    pub async fn analyze_skill_gaps(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<SkillGapAnalysis, AppError> {
        let resume = clean_text(resume_text);
        let jd = clean_text(job_description);
        self.ctx
            .run(
                prompts::SKILL_GAP,
                &[
                    ("resume_text", resume.as_str()),
                    ("job_description", jd.as_str()),
                ],
            )
            .await
    }

    pub async fn summarize_candidate(
        &self,
        resume_text: &str,
    ) -> Result<CandidateSummary, AppError> {
        let resume = clean_text(resume_text);
        self.ctx
            .run(prompts::CANDIDATE_SUMMARY, &[("resume_text", resume.as_str())])
            .await
    }

    pub async fn generate_interview_questions(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<InterviewQuestions, AppError> {
        let resume = clean_text(resume_text);
        let jd = clean_text(job_description);
        self.ctx
            .run(
                prompts::INTERVIEW_QUESTIONS,
                &[
                    ("resume_text", resume.as_str()),
                    ("job_description", jd.as_str()),
                ],
            )
            .await
    }

    /// Free-form answer to a recruiter's question about the candidate.
    ///
    /// Asks for a structured answer first. If that completion is malformed or the backend
    /// is unavailable, the same prompt is sent once more as a plain-text request.
    pub async fn answer_recruiter_question(
        &self,
        resume_text: &str,
        job_description: &str,
        question: &str,
    ) -> Result<String, AppError> {
        let resume = clean_text(resume_text);
        let jd = clean_text(job_description);
        let question = clean_text(question);
        let prompt = self.ctx.templates.render(
            prompts::RECRUITER_QA,
            &[
                ("resume_text", resume.as_str()),
                ("job_description", jd.as_str()),
                ("question", question.as_str()),
            ],
        )?;

        match self.ctx.backend.complete(&prompt).await {
            Ok(map) => Ok(answer_from(&map)),
            Err(e @ (LlmError::MalformedResponse { .. } | LlmError::BackendUnavailable { .. })) => {
                warn!("Structured answer failed, falling back to plain text: {e}");
                Ok(self.ctx.backend.complete_text(&prompt).await?)
            }
        }
    }
}

/// The `answer` entry when present, otherwise the whole mapping as compact JSON.
fn answer_from(map: &Completion) -> String {
    match map.get("answer") {
        Some(Value::String(answer)) => answer.clone(),
        Some(other) => other.to_string(),
        None => Value::Object(map.clone()).to_string(),
    }
}
