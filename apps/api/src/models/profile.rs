//! Compressed resume and extracted job requirements.

use serde::Serialize;

use super::fields::Fields;
use super::{FromCompletion, SchemaError};
use crate::llm_client::Completion;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResumeData {
    /// Trimmed, blanks dropped, never empty.
    pub skills: Vec<String>,
    pub experience: String,
    pub education: String,
    pub summary: String,
}

impl FromCompletion for ResumeData {
    fn from_completion(map: &Completion) -> Result<Self, SchemaError> {
        let f = Fields::new(map);

        let skills = f.trimmed_list("skills")?;
        if skills.is_empty() {
            return Err(f.error("skills", "at least one skill required"));
        }

        Ok(Self {
            skills,
            experience: f.described("experience")?,
            education: f.described("education")?,
            summary: f.described("summary")?,
        })
    }
}

impl ResumeData {
    /// Free-text description used for the semantic similarity pass.
    pub fn semantic_description(&self) -> String {
        format!(
            "{} {} {}",
            self.summary,
            self.skills.join(" "),
            self.experience
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobRequirements {
    pub required_skills: Vec<String>,
    pub preferred_skills: Vec<String>,
    pub experience_level: String,
    pub education_requirements: String,
    pub job_summary: String,
}

impl FromCompletion for JobRequirements {
    fn from_completion(map: &Completion) -> Result<Self, SchemaError> {
        let f = Fields::new(map);
        Ok(Self {
            required_skills: f.trimmed_list("required_skills")?,
            preferred_skills: f.optional_trimmed_list("preferred_skills")?,
            experience_level: f.described("experience_level")?,
            education_requirements: f.described("education_requirements")?,
            job_summary: f.described("job_summary")?,
        })
    }
}

impl JobRequirements {
    pub fn semantic_description(&self) -> String {
        format!(
            "{} {} {}",
            self.job_summary,
            self.required_skills.join(" "),
            self.preferred_skills.join(" ")
        )
    }
}
