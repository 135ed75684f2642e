//! Resume compression and job description extraction.

use crate::errors::AppError;
use crate::models::{JobRequirements, ResumeData};
use crate::prompts;
use crate::text::clean_text;

use super::ScreeningContext;

#[derive(Clone)]
pub struct ResumeAgent {
    ctx: ScreeningContext,
}

impl ResumeAgent {
    pub fn new(ctx: ScreeningContext) -> Self {
        Self { ctx }
    }

    pub async fn process_resume(&self, resume_text: &str) -> Result<ResumeData, AppError> {
        let cleaned = clean_text(resume_text);
        self.ctx
            .run(prompts::RESUME_COMPRESSION, &[("resume_text", cleaned.as_str())])
            .await
    }
}

#[derive(Clone)]
pub struct JdAgent {
    ctx: ScreeningContext,
}

impl JdAgent {
    pub fn new(ctx: ScreeningContext) -> Self {
        Self { ctx }
    }

    pub async fn process_job_description(
        &self,
        job_description: &str,
    ) -> Result<JobRequirements, AppError> {
        let cleaned = clean_text(job_description);
        self.ctx
            .run(prompts::JD_EXTRACTION, &[("job_description", cleaned.as_str())])
            .await
    }
}
