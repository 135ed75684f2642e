//! Axum route handlers for the Screening API.

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{
    AtsScanResult, AtsScreeningResult, CandidateSummary, InterviewQuestions, SkillGapAnalysis,
};
use crate::state::AppState;
use crate::text::clean_text;

use super::batch::{screen_batch, BatchDocument, BatchReport};
use super::{AtsAgent, MatchReport, MatchingPipeline};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ScreenRequest {
    pub resume_text: String,
    pub job_description: String,
}

#[derive(Debug, Deserialize)]
pub struct ResumeRequest {
    pub resume_text: String,
}

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub resume_text: String,
    pub job_description: String,
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct IndexRequest {
    pub texts: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub indexed: usize,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default = "default_k")]
    pub k: usize,
}

fn default_k() -> usize {
    5
}

#[derive(Debug, Serialize)]
pub struct SearchHit {
    pub text: String,
    pub score: f32,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
}

fn require(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/screen
pub async fn handle_screen(
    State(state): State<AppState>,
    Json(req): Json<ScreenRequest>,
) -> Result<Json<AtsScreeningResult>, AppError> {
    require("resume_text", &req.resume_text)?;
    require("job_description", &req.job_description)?;

    let result = AtsAgent::new(state.screening())
        .screen_resume(&req.resume_text, &req.job_description)
        .await?;
    Ok(Json(result))
}

/// POST /api/v1/screen/batch
///
/// Multipart form: one `job_description` text field plus any number of `resume` files.
pub async fn handle_screen_batch(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<BatchReport>, AppError> {
    let mut job_description = String::new();
    let mut documents = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        match field.name().unwrap_or("") {
            "job_description" => {
                job_description = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("job_description: {e}")))?;
            }
            "resume" | "resumes" => {
                let filename = field.file_name().unwrap_or("unknown").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("{filename}: {e}")))?;
                documents.push(BatchDocument { filename, bytes });
            }
            _ => {}
        }
    }

    require("job_description", &job_description)?;

    let agent = AtsAgent::new(state.screening());
    let report = screen_batch(
        &agent,
        documents,
        &job_description,
        state.config.batch_concurrency,
    )
    .await?;
    Ok(Json(report))
}

/// POST /api/v1/scan
pub async fn handle_scan(
    State(state): State<AppState>,
    Json(req): Json<ResumeRequest>,
) -> Result<Json<AtsScanResult>, AppError> {
    require("resume_text", &req.resume_text)?;
    let result = AtsAgent::new(state.screening())
        .scan_resume_format(&req.resume_text)
        .await?;
    Ok(Json(result))
}

/// POST /api/v1/skill-gap
pub async fn handle_skill_gap(
    State(state): State<AppState>,
    Json(req): Json<ScreenRequest>,
) -> Result<Json<SkillGapAnalysis>, AppError> {
    require("resume_text", &req.resume_text)?;
    require("job_description", &req.job_description)?;
    let result = AtsAgent::new(state.screening())
        .analyze_skill_gaps(&req.resume_text, &req.job_description)
        .await?;
    Ok(Json(result))
}

/// POST /api/v1/summary
pub async fn handle_summary(
    State(state): State<AppState>,
    Json(req): Json<ResumeRequest>,
) -> Result<Json<CandidateSummary>, AppError> {
    require("resume_text", &req.resume_text)?;
    let result = AtsAgent::new(state.screening())
        .summarize_candidate(&req.resume_text)
        .await?;
    Ok(Json(result))
}

/// POST /api/v1/interview-questions
pub async fn handle_interview_questions(
    State(state): State<AppState>,
    Json(req): Json<ScreenRequest>,
) -> Result<Json<InterviewQuestions>, AppError> {
    require("resume_text", &req.resume_text)?;
    require("job_description", &req.job_description)?;
    let result = AtsAgent::new(state.screening())
        .generate_interview_questions(&req.resume_text, &req.job_description)
        .await?;
    Ok(Json(result))
}

/// POST /api/v1/ask
pub async fn handle_ask(
    State(state): State<AppState>,
    Json(req): Json<AskRequest>,
) -> Result<Json<AskResponse>, AppError> {
    require("resume_text", &req.resume_text)?;
    require("job_description", &req.job_description)?;
    require("question", &req.question)?;
    let answer = AtsAgent::new(state.screening())
        .answer_recruiter_question(&req.resume_text, &req.job_description, &req.question)
        .await?;
    Ok(Json(AskResponse { answer }))
}

/// POST /api/v1/match
///
/// Full matching flow: compress resume, extract JD, score, explain.
pub async fn handle_match(
    State(state): State<AppState>,
    Json(req): Json<ScreenRequest>,
) -> Result<Json<MatchReport>, AppError> {
    require("resume_text", &req.resume_text)?;
    require("job_description", &req.job_description)?;
    let report = MatchingPipeline::new(state.screening())
        .run(&req.resume_text, &req.job_description)
        .await?;
    Ok(Json(report))
}

/// POST /api/v1/index
///
/// Embeds each text and appends it to the similarity index, saved before returning.
pub async fn handle_index(
    State(state): State<AppState>,
    Json(req): Json<IndexRequest>,
) -> Result<Json<IndexResponse>, AppError> {
    if req.texts.is_empty() {
        return Err(AppError::Validation("texts cannot be empty".to_string()));
    }

    let mut vectors = Vec::with_capacity(req.texts.len());
    let mut labels = Vec::with_capacity(req.texts.len());
    for (i, text) in req.texts.iter().enumerate() {
        require(&format!("texts[{i}]"), text)?;
        let cleaned = clean_text(text);
        vectors.push(state.backend.embed(&cleaned).await?);
        labels.push(cleaned);
    }

    let index = Arc::clone(&state.index);
    let indexed = labels.len();
    let total = tokio::task::spawn_blocking(move || index.append(&vectors, &labels))
        .await
        .map_err(|e| AppError::Internal(e.into()))??;

    Ok(Json(IndexResponse { indexed, total }))
}

/// POST /api/v1/index/search
pub async fn handle_search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, AppError> {
    require("query", &req.query)?;
    let query = state.backend.embed(&clean_text(&req.query)).await?;
    let results = state
        .index
        .nearest(&query, req.k)?
        .into_iter()
        .map(|(text, score)| SearchHit { text, score })
        .collect();
    Ok(Json(SearchResponse { results }))
}
