use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;
use crate::models::SchemaError;
use crate::prompts::PromptError;
use crate::similarity::SimilarityError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Similarity(#[from] SimilarityError),

    #[error("Document extraction failed: {0}")]
    DocumentExtraction(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Stable machine-readable code, shared by HTTP bodies and batch item reports.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Prompt(PromptError::TemplateNotFound(_)) => "TEMPLATE_NOT_FOUND",
            AppError::Prompt(PromptError::Substitution { .. }) => "TEMPLATE_SUBSTITUTION_ERROR",
            AppError::Llm(LlmError::MalformedResponse { .. }) => "MALFORMED_RESPONSE",
            AppError::Llm(LlmError::BackendUnavailable { .. }) => "BACKEND_UNAVAILABLE",
            AppError::Schema(_) => "SCHEMA_VALIDATION_ERROR",
            AppError::Similarity(SimilarityError::Io(_)) => "INDEX_IO_ERROR",
            AppError::Similarity(_) => "SIMILARITY_ERROR",
            AppError::DocumentExtraction(_) => "DOCUMENT_EXTRACTION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Prompt(PromptError::Substitution { .. }) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Similarity(
                SimilarityError::DimensionMismatch { .. }
                | SimilarityError::DegenerateVector
                | SimilarityError::LengthMismatch { .. },
            ) => StatusCode::BAD_REQUEST,
            AppError::Llm(LlmError::MalformedResponse { .. }) | AppError::Schema(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::Llm(LlmError::BackendUnavailable { .. }) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::DocumentExtraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Prompt(PromptError::TemplateNotFound(_))
            | AppError::Similarity(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "An internal server error occurred".to_string()
            }
            other if status.is_server_error() => {
                tracing::error!("{}: {other}", other.code());
                other.to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
