//! Retry with exponential backoff for transient backend failures.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use super::LlmError;

/// Outcome of a single failed attempt.
#[derive(Debug)]
pub enum AttemptError {
    /// Timeouts, rate limiting, 5xx, transport errors. Retried.
    Transient(String),
    /// Anything retrying cannot fix (bad credentials, unsupported operation). Surfaced at once.
    Fatal(String),
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Wait before the first retry; doubles for each retry after that.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Backoff before retry number `retry` (1-based): base, 2×base, 4×base, ...
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(retry.saturating_sub(1))
    }

    /// Runs `op` until it succeeds, fails fatally, or the attempt budget is spent.
    pub async fn run<T, F, Fut>(&self, backend: &str, mut op: F) -> Result<T, LlmError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AttemptError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 0..max_attempts {
            if attempt > 0 {
                let delay = self.delay_for(attempt);
                warn!(
                    "{backend} attempt {attempt} failed, retrying after {}ms: {last_error}",
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            match op().await {
                Ok(value) => return Ok(value),
                Err(AttemptError::Transient(message)) => last_error = message,
                Err(AttemptError::Fatal(message)) => {
                    return Err(LlmError::BackendUnavailable {
                        backend: backend.to_string(),
                        attempts: attempt + 1,
                        last_error: message,
                    })
                }
            }
        }

        Err(LlmError::BackendUnavailable {
            backend: backend.to_string(),
            attempts: max_attempts,
            last_error,
        })
    }
}
