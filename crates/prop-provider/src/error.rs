//! Provider error types.

use thiserror::Error;

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors that can occur while driving an external generation task.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The submit or poll HTTP call was rejected, or the provider's own
    /// envelope reported a non-success code.
    #[error("Provider request failed: {0}")]
    Request(String),

    /// The provider reported the task itself as failed.
    #[error("Provider task failed: {0}")]
    TaskFailed(String),

    /// The poll budget was exhausted before the task reached a terminal
    /// state.
    #[error("Provider task timed out after {attempts} polls (~{seconds}s)")]
    Timeout { attempts: u32, seconds: u64 },

    /// The provider returned a status string this client does not know.
    #[error("Unknown task status: {0}")]
    UnknownStatus(String),

    /// The task completed but carried no output media.
    #[error("Provider returned no output media")]
    EmptyResult,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProviderError {
    pub fn request(msg: impl Into<String>) -> Self {
        Self::Request(msg.into())
    }

    /// Check if error is retryable at the task level.
    ///
    /// Everything except a malformed payload is worth one more attempt:
    /// request rejections and timeouts are often transient, and a reported
    /// task failure may succeed on resubmission.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ProviderError::Json(_))
    }
}
