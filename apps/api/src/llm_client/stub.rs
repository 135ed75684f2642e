//! Deterministic, network-free backend for demos and offline tests.
//!
//! Routes on the template name found in the prompt (the renderer writes it on the first
//! line) and answers with a canned mapping. Never fails.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::{BackendKind, Completion, CompletionBackend, LlmError, EMBEDDING_DIMS};
use crate::prompts;

/// Artificial latency per completion, mimicking a live round trip.
pub const DEFAULT_LATENCY: Duration = Duration::from_secs(1);

/// Plain-text answer used when the stub is asked for free text.
pub const PLACEHOLDER_ANSWER: &str = "The candidate has relevant experience for this role.";

const FALLBACK_TEMPLATE: &str = prompts::ATS_SCREENING;

const ROUTES: &[&str] = &[
    prompts::RESUME_COMPRESSION,
    prompts::JD_EXTRACTION,
    prompts::MATCHING_REASONING,
    prompts::EXPLANATION,
    prompts::ATS_SCREENING,
    prompts::ATS_SCANNER,
    prompts::SKILL_GAP,
    prompts::CANDIDATE_SUMMARY,
    prompts::INTERVIEW_QUESTIONS,
    prompts::RECRUITER_QA,
];

#[derive(Debug, Clone)]
pub struct StubBackend {
    latency: Duration,
}

impl Default for StubBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl StubBackend {
    pub fn new() -> Self {
        Self {
            latency: DEFAULT_LATENCY,
        }
    }

    #[cfg(test)]
    pub fn with_latency(latency: Duration) -> Self {
        Self { latency }
    }

    /// Picks the canned response for `prompt`: the `task:` header first, then any known
    /// template name anywhere in the text, then the screening default.
    fn route(prompt: &str) -> &'static str {
        let header = prompt
            .lines()
            .next()
            .and_then(|line| line.strip_prefix("task:"))
            .map(str::trim);

        if let Some(name) = header.and_then(|h| ROUTES.iter().copied().find(|r| *r == h)) {
            return name;
        }

        ROUTES
            .iter()
            .find(|name| prompt.contains(*name))
            .copied()
            .unwrap_or(FALLBACK_TEMPLATE)
    }
}

#[async_trait]
impl CompletionBackend for StubBackend {
    fn name(&self) -> &str {
        "stub"
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Stub
    }

    async fn complete(&self, prompt: &str) -> Result<Completion, LlmError> {
        tokio::time::sleep(self.latency).await;
        let template = Self::route(prompt);
        debug!("Stub backend answering with canned '{template}' response");
        Ok(canned_response(template)
            .as_object()
            .cloned()
            .unwrap_or_default())
    }

    async fn complete_text(&self, _prompt: &str) -> Result<String, LlmError> {
        tokio::time::sleep(self.latency).await;
        Ok(PLACEHOLDER_ANSWER.to_string())
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, LlmError> {
        Ok(vec![0.1; EMBEDDING_DIMS])
    }
}

fn canned_response(template: &str) -> Value {
    match template {
        prompts::RESUME_COMPRESSION => json!({
            "skills": ["Python", "JavaScript", "React", "SQL", "AWS"],
            "experience": "5 years software development experience",
            "education": "Bachelor's in Computer Science",
            "summary": "Experienced full-stack developer with cloud expertise"
        }),
        prompts::JD_EXTRACTION => json!({
            "required_skills": ["Python", "React", "SQL"],
            "preferred_skills": ["AWS", "Docker", "Kubernetes"],
            "experience_level": "3-5 years",
            "education_requirements": "Bachelor's degree in Computer Science",
            "job_summary": "Full-stack developer position"
        }),
        prompts::MATCHING_REASONING => json!({
            "overall_score": 82.5,
            "skills_match": 85.0,
            "experience_match": 80.0,
            "education_match": 85.0,
            "reasoning": "Strong technical skills match with 4/5 required skills. Experience aligns well with requirements."
        }),
        prompts::EXPLANATION => json!({
            "strengths": ["Strong Python skills", "Relevant React experience", "Cloud knowledge"],
            "gaps": ["Missing Docker experience", "No Kubernetes background"],
            "recommendations": ["Learn Docker containerization", "Get Kubernetes certification"],
            "fit_assessment": "Good technical fit with some skill gaps to address"
        }),
        prompts::ATS_SCANNER => json!({
            "ats_score": 85.0,
            "ats_issues": ["Missing quantifiable achievements", "Skills section could be more prominent"],
            "improvement_suggestions": [
                "Add metrics to project descriptions",
                "Use bullet points for better readability",
                "Include keywords from job description"
            ]
        }),
        prompts::SKILL_GAP => json!({
            "must_have_missing_skills": ["Docker", "Kubernetes"],
            "good_to_have_missing_skills": ["CI/CD", "Jenkins", "Terraform"],
            "learning_recommendations": [
                "Docker & Kubernetes Fundamentals Course",
                "DevOps CI/CD Pipeline Tutorial",
                "Infrastructure as Code with Terraform"
            ]
        }),
        prompts::CANDIDATE_SUMMARY => json!({
            "candidate_level": "Mid",
            "key_expertise": ["Full-stack Development", "React", "Python", "Cloud Architecture", "SQL"],
            "most_impressive_project": "Built scalable e-commerce platform handling 10K+ daily users with microservices architecture",
            "hiring_recommendation": "Strong mid-level candidate with proven full-stack expertise and cloud experience, ideal for teams building modern web applications."
        }),
        prompts::INTERVIEW_QUESTIONS => json!({
            "technical_questions": [
                "Explain how you would implement Docker containerization for your e-commerce project",
                "Describe your experience with Kubernetes orchestration",
                "How do you handle database scaling in high-traffic applications?",
                "Walk me through your CI/CD pipeline setup",
                "What's your approach to microservices communication?"
            ],
            "project_questions": [
                "Tell me about the architecture decisions in your e-commerce platform",
                "How did you handle 10K+ daily users - what challenges did you face?",
                "What would you do differently if you rebuilt this project today?"
            ],
            "hr_questions": [
                "Why are you interested in learning DevOps technologies?",
                "How do you stay updated with new technologies in your field?"
            ]
        }),
        prompts::RECRUITER_QA => json!({ "answer": PLACEHOLDER_ANSWER }),
        _ => json!({
            "overall_match_score": 78.0,
            "technical_skill_match": 82.0,
            "project_relevance_score": 75.0,
            "experience_score": 80.0,
            "matched_skills": ["Python", "JavaScript", "React", "SQL"],
            "missing_critical_skills": ["Docker"],
            "nice_to_have_missing_skills": ["Kubernetes", "CI/CD"],
            "strengths": [
                "Strong full-stack development experience",
                "Proven track record with modern frameworks",
                "Cloud platform expertise"
            ],
            "weaknesses": ["Limited containerization experience", "No DevOps background mentioned"],
            "final_decision": "SHORTLIST",
            "decision_reason": "Candidate demonstrates strong technical foundation with 5 years of relevant experience. Core skills align well with job requirements. While missing some DevOps tools, the candidate's solid programming background and cloud experience make them a viable fit for the role."
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[test]
    fn test_route_prefers_task_header() {
        // The resume mentions another template name; the header still wins.
        let prompt = "task: ats_scanner\n\nRESUME: wrote an explanation generator";
        assert_eq!(StubBackend::route(prompt), prompts::ATS_SCANNER);
    }

    #[test]
    fn test_route_falls_back_to_substring() {
        let prompt = "please run skill_gap on this";
        assert_eq!(StubBackend::route(prompt), prompts::SKILL_GAP);
    }

    #[test]
    fn test_route_defaults_to_screening() {
        assert_eq!(StubBackend::route("hello"), prompts::ATS_SCREENING);
    }

    #[test]
    fn test_every_route_has_an_object_response() {
        for name in ROUTES {
            assert!(canned_response(name).is_object(), "{name}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_complete_simulates_latency() {
        let started = Instant::now();
        let map = StubBackend::new()
            .complete("task: ats_screening\n\n")
            .await
            .unwrap();
        assert_eq!(started.elapsed(), DEFAULT_LATENCY);
        assert_eq!(map["final_decision"], json!("SHORTLIST"));
        assert_eq!(map["overall_match_score"], json!(78.0));
    }

    #[tokio::test]
    async fn test_embed_is_constant() {
        let stub = StubBackend::with_latency(Duration::ZERO);
        let a = stub.embed("one").await.unwrap();
        let b = stub.embed("two").await.unwrap();
        assert_eq!(a.len(), EMBEDDING_DIMS);
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_complete_text_is_placeholder() {
        let stub = StubBackend::with_latency(Duration::ZERO);
        assert_eq!(
            stub.complete_text("task: recruiter_qa").await.unwrap(),
            PLACEHOLDER_ANSWER
        );
    }
}
