//! Resume-to-job matching, the explanation on top of it, and the pipeline running both.

use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::models::{ExplanationResult, JobRequirements, MatchingScore, ResumeData};
use crate::prompts;

use super::{prompt_json, JdAgent, ResumeAgent, ScreeningContext};

#[derive(Clone)]
pub struct MatchingAgent {
    ctx: ScreeningContext,
}

impl MatchingAgent {
    pub fn new(ctx: ScreeningContext) -> Self {
        Self { ctx }
    }

    /// Model-scored match, with `overall_score` blended against semantic similarity.
    pub async fn calculate_match_score(
        &self,
        resume: &ResumeData,
        job: &JobRequirements,
    ) -> Result<MatchingScore, AppError> {
        let signal = self
            .ctx
            .semantic_signal(&resume.semantic_description(), &job.semantic_description())
            .await?;

        let resume_data = prompt_json(resume)?;
        let job_requirements = prompt_json(job)?;
        let mut score: MatchingScore = self
            .ctx
            .run(
                prompts::MATCHING_REASONING,
                &[
                    ("resume_data", resume_data.as_str()),
                    ("job_requirements", job_requirements.as_str()),
                ],
            )
            .await?;

        score.overall_score = self.ctx.blend(score.overall_score, signal);
        Ok(score)
    }
}

#[derive(Clone)]
pub struct ExplanationAgent {
    ctx: ScreeningContext,
}

impl ExplanationAgent {
    pub fn new(ctx: ScreeningContext) -> Self {
        Self { ctx }
    }

    pub async fn generate_explanation(
        &self,
        resume: &ResumeData,
        job: &JobRequirements,
        score: &MatchingScore,
    ) -> Result<ExplanationResult, AppError> {
        let resume_data = prompt_json(resume)?;
        let job_requirements = prompt_json(job)?;
        let matching_results = prompt_json(score)?;
        self.ctx
            .run(
                prompts::EXPLANATION,
                &[
                    ("resume_data", resume_data.as_str()),
                    ("job_requirements", job_requirements.as_str()),
                    ("matching_results", matching_results.as_str()),
                ],
            )
            .await
    }
}

/// Everything the full matching flow produces for one resume and one job.
#[derive(Debug, Clone, Serialize)]
pub struct MatchReport {
    pub resume: ResumeData,
    pub job: JobRequirements,
    pub score: MatchingScore,
    pub explanation: ExplanationResult,
}

/// Compress, extract, score, explain. Stops at the first failing step.
#[derive(Clone)]
pub struct MatchingPipeline {
    resumes: ResumeAgent,
    jobs: JdAgent,
    matcher: MatchingAgent,
    explainer: ExplanationAgent,
}

impl MatchingPipeline {
    pub fn new(ctx: ScreeningContext) -> Self {
        Self {
            resumes: ResumeAgent::new(ctx.clone()),
            jobs: JdAgent::new(ctx.clone()),
            matcher: MatchingAgent::new(ctx.clone()),
            explainer: ExplanationAgent::new(ctx),
        }
    }

    pub async fn run(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<MatchReport, AppError> {
        let resume = self.resumes.process_resume(resume_text).await?;
        let job = self.jobs.process_job_description(job_description).await?;
        let score = self.matcher.calculate_match_score(&resume, &job).await?;
        let explanation = self
            .explainer
            .generate_explanation(&resume, &job, &score)
            .await?;

        info!("Match scored {:.1}", score.overall_score);
        Ok(MatchReport {
            resume,
            job,
            score,
            explanation,
        })
    }
}
