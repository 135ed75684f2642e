//! Bulk screening of uploaded resumes against one job description.
//!
//! Items run concurrently on a `JoinSet`, bounded by a semaphore. A failing item is
//! reported in place and never aborts its siblings.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};
use uuid::Uuid;

use crate::documents::extract_text;
use crate::errors::AppError;
use crate::models::{AtsScreeningResult, FinalDecision};

use super::AtsAgent;

/// Largest number of resumes accepted in one batch.
pub const MAX_BATCH_SIZE: usize = 50;

#[derive(Debug, Clone)]
pub struct BatchDocument {
    pub filename: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchItemOutcome {
    Screened { result: AtsScreeningResult },
    Failed { error_code: String, message: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchItem {
    pub index: usize,
    pub filename: String,
    #[serde(flatten)]
    pub outcome: BatchItemOutcome,
}

impl BatchItem {
    pub fn result(&self) -> Option<&AtsScreeningResult> {
        match &self.outcome {
            BatchItemOutcome::Screened { result } => Some(result),
            BatchItemOutcome::Failed { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub batch_id: Uuid,
    pub completed_at: DateTime<Utc>,
    pub total: usize,
    pub shortlisted: usize,
    pub rejected: usize,
    pub failed: usize,
    /// Mean overall score of the screened items; absent when none succeeded.
    pub average_score: Option<f64>,
    /// Indices of the screened items, best overall score first.
    pub ranking: Vec<usize>,
    /// One entry per input document, in input order.
    pub items: Vec<BatchItem>,
}

impl BatchReport {
    fn from_items(items: Vec<BatchItem>) -> Self {
        let results: Vec<&AtsScreeningResult> = items.iter().filter_map(BatchItem::result).collect();
        let shortlisted = results
            .iter()
            .filter(|r| r.final_decision == FinalDecision::Shortlist)
            .count();
        let average_score = if results.is_empty() {
            None
        } else {
            Some(results.iter().map(|r| r.overall_match_score).sum::<f64>() / results.len() as f64)
        };
        let screened = results.len();
        let ranking = rank(&items);

        Self {
            batch_id: Uuid::new_v4(),
            completed_at: Utc::now(),
            total: items.len(),
            shortlisted,
            rejected: screened - shortlisted,
            failed: items.len() - screened,
            average_score,
            ranking,
            items,
        }
    }
}

/// Ties keep input order.
fn rank(items: &[BatchItem]) -> Vec<usize> {
    let mut scored: Vec<(usize, f64)> = items
        .iter()
        .filter_map(|item| item.result().map(|r| (item.index, r.overall_match_score)))
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.into_iter().map(|(index, _)| index).collect()
}

/// Screens every document against `job_description`, at most `concurrency` at a time.
pub async fn screen_batch(
    agent: &AtsAgent,
    documents: Vec<BatchDocument>,
    job_description: &str,
    concurrency: usize,
) -> Result<BatchReport, AppError> {
    if documents.is_empty() {
        return Err(AppError::Validation(
            "at least one resume is required".to_string(),
        ));
    }
    if documents.len() > MAX_BATCH_SIZE {
        return Err(AppError::Validation(format!(
            "a batch holds at most {MAX_BATCH_SIZE} resumes, got {}",
            documents.len()
        )));
    }

    let permits = Arc::new(Semaphore::new(concurrency.max(1)));
    let job_description: Arc<str> = Arc::from(job_description);
    let mut tasks = JoinSet::new();

    for (index, document) in documents.into_iter().enumerate() {
        let agent = agent.clone();
        let permits = Arc::clone(&permits);
        let job_description = Arc::clone(&job_description);

        tasks.spawn(async move {
            let outcome = match permits.acquire_owned().await {
                Ok(_permit) => screen_one(&agent, &document, &job_description).await,
                Err(e) => Err(AppError::Internal(e.into())),
            };

            let outcome = match outcome {
                Ok(result) => {
                    info!(
                        "Batch item {index} ({}) screened: {} at {:.1}",
                        document.filename,
                        result.final_decision.as_str(),
                        result.overall_match_score
                    );
                    BatchItemOutcome::Screened { result }
                }
                Err(e) => {
                    warn!("Batch item {index} ({}) failed: {e}", document.filename);
                    BatchItemOutcome::Failed {
                        error_code: e.code().to_string(),
                        message: e.to_string(),
                    }
                }
            };

            BatchItem {
                index,
                filename: document.filename,
                outcome,
            }
        });
    }

    let mut items = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        items.push(joined.map_err(|e| AppError::Internal(e.into()))?);
    }
    items.sort_by_key(|item| item.index);

    let report = BatchReport::from_items(items);
    info!(
        "Batch {} done: {} shortlisted, {} rejected, {} failed",
        report.batch_id, report.shortlisted, report.rejected, report.failed
    );
    Ok(report)
}

async fn screen_one(
    agent: &AtsAgent,
    document: &BatchDocument,
    job_description: &str,
) -> Result<AtsScreeningResult, AppError> {
    let resume_text = extract_off_runtime(document).await?;
    agent.screen_resume(&resume_text, job_description).await
}

/// PDF parsing is CPU-bound, so it runs on the blocking pool and never stalls the timers
/// of sibling items.
async fn extract_off_runtime(document: &BatchDocument) -> Result<String, AppError> {
    let filename = document.filename.clone();
    let bytes = document.bytes.clone();
    tokio::task::spawn_blocking(move || extract_text(&filename, &bytes))
        .await
        .map_err(|e| {
            AppError::Internal(anyhow::anyhow!("spawn_blocking failed in extraction: {e}"))
        })?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screening::testing::stub_context;

    fn doc(filename: &str, contents: &'static [u8]) -> BatchDocument {
        BatchDocument {
            filename: filename.to_string(),
            bytes: Bytes::from_static(contents),
        }
    }

    fn screened(index: usize, score: f64, decision: FinalDecision) -> BatchItem {
        BatchItem {
            index,
            filename: format!("{index}.txt"),
            outcome: BatchItemOutcome::Screened {
                result: AtsScreeningResult {
                    overall_match_score: score,
                    technical_skill_match: 0.0,
                    project_relevance_score: 0.0,
                    experience_score: 0.0,
                    matched_skills: vec![],
                    missing_critical_skills: vec![],
                    nice_to_have_missing_skills: vec![],
                    strengths: vec![],
                    weaknesses: vec![],
                    final_decision: decision,
                    decision_reason: String::new(),
                },
            },
        }
    }

    #[tokio::test]
    async fn test_failed_item_does_not_abort_siblings() {
        let agent = AtsAgent::new(stub_context());
        let documents = vec![
            doc("first.txt", b"Experienced Python developer, 5 years, AWS certified"),
            doc("second.pdf", b"this is not a pdf"),
            doc("third.md", b"# Jane\nPython, AWS, 6 years"),
        ];

        let report = screen_batch(&agent, documents, "Require Python, AWS, 3+ years", 2)
            .await
            .unwrap();

        assert_eq!(report.total, 3);
        assert_eq!(report.shortlisted, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.average_score, Some(78.0));

        let names: Vec<&str> = report.items.iter().map(|i| i.filename.as_str()).collect();
        assert_eq!(names, vec!["first.txt", "second.pdf", "third.md"]);

        assert!(report.items[0].result().is_some());
        match &report.items[1].outcome {
            BatchItemOutcome::Failed { error_code, .. } => {
                assert_eq!(error_code, "DOCUMENT_EXTRACTION_ERROR")
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert!(report.items[2].result().is_some());
        assert_eq!(report.ranking, vec![0, 2]);
    }

    #[tokio::test]
    async fn test_extraction_runs_on_blocking_pool() {
        let document = doc("resume.txt", b"Rust   engineer\n10 years");
        let text = extract_off_runtime(&document).await.unwrap();
        assert!(text.contains("Rust"));

        let err = extract_off_runtime(&doc("resume.docx", b"binary"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "DOCUMENT_EXTRACTION_ERROR");
    }

    #[tokio::test]
    async fn test_batch_limits() {
        let agent = AtsAgent::new(stub_context());

        let err = screen_batch(&agent, vec![], "jd", 4).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let too_many = (0..=MAX_BATCH_SIZE)
            .map(|i| BatchDocument {
                filename: format!("{i}.txt"),
                bytes: Bytes::from_static(b"resume"),
            })
            .collect();
        let err = screen_batch(&agent, too_many, "jd", 4).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_report_summary_and_ranking() {
        let failed = BatchItem {
            index: 1,
            filename: "1.pdf".into(),
            outcome: BatchItemOutcome::Failed {
                error_code: "DOCUMENT_EXTRACTION_ERROR".into(),
                message: "empty".into(),
            },
        };
        let report = BatchReport::from_items(vec![
            screened(0, 40.0, FinalDecision::Reject),
            failed,
            screened(2, 90.0, FinalDecision::Shortlist),
            screened(3, 65.0, FinalDecision::Shortlist),
        ]);

        assert_eq!(report.total, 4);
        assert_eq!(report.shortlisted, 2);
        assert_eq!(report.rejected, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.average_score, Some(65.0));

        assert_eq!(report.ranking, vec![2, 3, 0]);

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["ranking"], serde_json::json!([2, 3, 0]));
    }

    #[test]
    fn test_all_failed_has_no_average() {
        let report = BatchReport::from_items(vec![BatchItem {
            index: 0,
            filename: "a.docx".into(),
            outcome: BatchItemOutcome::Failed {
                error_code: "DOCUMENT_EXTRACTION_ERROR".into(),
                message: "unsupported".into(),
            },
        }]);
        assert_eq!(report.average_score, None);
        assert!(report.ranking.is_empty());
    }

    #[test]
    fn test_item_serializes_flat() {
        let item = BatchItem {
            index: 0,
            filename: "a.pdf".into(),
            outcome: BatchItemOutcome::Failed {
                error_code: "DOCUMENT_EXTRACTION_ERROR".into(),
                message: "empty".into(),
            },
        };
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["status"], "failed");
        assert_eq!(value["error_code"], "DOCUMENT_EXTRACTION_ERROR");
        assert_eq!(value["filename"], "a.pdf");
    }
}
