//! Task-level retry with exponential backoff.
//!
//! Wraps the entire job body: a retry re-runs from the first step and
//! relies on the idempotent replay guard to avoid duplicate external calls
//! when a previous attempt actually succeeded.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::{WorkerError, WorkerResult};

/// Retry policy for a whole job task.
#[derive(Debug, Clone)]
pub struct TaskRetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles each attempt.
    pub base_delay: Duration,
    /// Ceiling on the backoff delay.
    pub max_delay: Duration,
}

impl Default for TaskRetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl TaskRetryPolicy {
    /// Delay before retry number `retry` (1-based).
    fn delay_for_retry(&self, retry: u32) -> Duration {
        let delay = self
            .base_delay
            .saturating_mul(2u32.saturating_pow(retry.saturating_sub(1)));
        delay.min(self.max_delay)
    }
}

/// Run a job body under the retry policy.
///
/// Only errors the job marks retryable are attempted again; validation and
/// not-found failures surface immediately.
pub async fn run_with_retry<F, Fut, T>(policy: &TaskRetryPolicy, operation: F) -> WorkerResult<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = WorkerResult<T>>,
{
    let mut attempt = 1u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < policy.max_attempts => {
                let delay = policy.delay_for_retry(attempt);
                warn!(
                    attempt,
                    max_attempts = policy.max_attempts,
                    "Job attempt failed, retrying in {:?}: {}",
                    delay,
                    e
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
