pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::screening::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Single-resume screening
        .route("/api/v1/screen", post(handlers::handle_screen))
        .route("/api/v1/screen/batch", post(handlers::handle_screen_batch))
        .route("/api/v1/scan", post(handlers::handle_scan))
        .route("/api/v1/skill-gap", post(handlers::handle_skill_gap))
        .route("/api/v1/summary", post(handlers::handle_summary))
        .route(
            "/api/v1/interview-questions",
            post(handlers::handle_interview_questions),
        )
        .route("/api/v1/ask", post(handlers::handle_ask))
        // Matching pipeline
        .route("/api/v1/match", post(handlers::handle_match))
        // Similarity index
        .route("/api/v1/index", post(handlers::handle_index))
        .route("/api/v1/index/search", post(handlers::handle_search))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::llm_client::{BackendKind, StubBackend, EMBEDDING_DIMS};
    use crate::prompts::TemplateStore;
    use crate::screening::UnweightedAverage;
    use crate::similarity::SimilarityIndex;

    fn test_config(dir: &TempDir) -> Config {
        Config {
            backend: BackendKind::Stub,
            openai_api_key: None,
            groq_api_key: None,
            openai_model: "gpt-3.5-turbo".into(),
            groq_model: "llama-3.3-70b-versatile".into(),
            embedding_model: "text-embedding-ada-002".into(),
            max_tokens: 2000,
            temperature: 0.1,
            request_timeout_secs: 30,
            max_retries: 3,
            index_path: dir.path().join("index.bin"),
            template_dir: None,
            batch_concurrency: 2,
            completion_cache: false,
            completion_cache_capacity: 16,
            port: 0,
            rust_log: "info".into(),
        }
    }

    fn app(dir: &TempDir) -> Router {
        let config = test_config(dir);
        let state = AppState {
            backend: Arc::new(StubBackend::with_latency(Duration::ZERO)),
            templates: Arc::new(TemplateStore::builtin()),
            index: Arc::new(SimilarityIndex::open(&config.index_path, EMBEDDING_DIMS)),
            blend_policy: Arc::new(UnweightedAverage),
            config,
        };
        build_router(state)
    }

    async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_reports_backend() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(&dir)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["backend"], "stub");
        assert_eq!(body["semantic_similarity"], false);
    }

    #[tokio::test]
    async fn test_screen_with_stub() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = post_json(
            app(&dir),
            "/api/v1/screen",
            json!({
                "resume_text": "Experienced Python developer, 5 years, AWS certified",
                "job_description": "Require Python, AWS, 3+ years"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["final_decision"], "SHORTLIST");
        assert_eq!(body["overall_match_score"], 78.0);
    }

    #[tokio::test]
    async fn test_empty_resume_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = post_json(
            app(&dir),
            "/api/v1/screen",
            json!({"resume_text": "  ", "job_description": "Require Python"}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_ask_returns_answer() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = post_json(
            app(&dir),
            "/api/v1/ask",
            json!({
                "resume_text": "Python developer",
                "job_description": "Python role",
                "question": "Is the candidate senior?"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["answer"],
            "The candidate has relevant experience for this role."
        );
    }

    #[tokio::test]
    async fn test_match_returns_all_records() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = post_json(
            app(&dir),
            "/api/v1/match",
            json!({
                "resume_text": "Python developer",
                "job_description": "Python role"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["score"]["overall_score"], 82.5);
        assert!(body["resume"]["skills"].is_array());
        assert!(body["explanation"]["strengths"].is_array());
    }

    #[tokio::test]
    async fn test_index_then_search() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir);

        let (status, body) = post_json(
            app.clone(),
            "/api/v1/index",
            json!({"texts": ["Python developer", "Java developer"]}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["indexed"], 2);
        assert_eq!(body["total"], 2);
        assert!(dir.path().join("index.bin.labels").exists());

        let (status, body) = post_json(
            app,
            "/api/v1/index/search",
            json!({"query": "Python", "k": 1}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_batch_multipart() {
        let dir = tempfile::tempdir().unwrap();
        let boundary = "XBOUNDARYX";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"job_description\"\r\n\r\n\
             Require Python, AWS, 3+ years\r\n\
             --{boundary}\r\n\
             Content-Disposition: form-data; name=\"resume\"; filename=\"a.txt\"\r\n\
             Content-Type: text/plain\r\n\r\n\
             Python developer, 5 years\r\n\
             --{boundary}\r\n\
             Content-Disposition: form-data; name=\"resume\"; filename=\"b.txt\"\r\n\
             Content-Type: text/plain\r\n\r\n\
             \r\n\
             --{boundary}--\r\n"
        );
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/screen/batch")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();

        let response = app(&dir).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let report: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(report["total"], 2);
        assert_eq!(report["shortlisted"], 1);
        assert_eq!(report["failed"], 1);
        assert_eq!(report["items"][1]["error_code"], "DOCUMENT_EXTRACTION_ERROR");
        assert_eq!(report["ranking"], serde_json::json!([0]));
    }
}
