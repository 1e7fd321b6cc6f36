//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    /// Required input is missing or malformed. Surfaced immediately, never
    /// retried.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The referenced entity does not exist. Fatal, never retried.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Fetching the provider's result media failed.
    #[error("Download failed: {0}")]
    Download(String),

    #[error("Job failed: {0}")]
    JobFailed(String),

    #[error("Provider error: {0}")]
    Provider(#[from] prop_provider::ProviderError),

    #[error("Storage error: {0}")]
    Storage(#[from] prop_storage::StorageError),

    #[error("Store error: {0}")]
    Db(#[from] prop_db::DbError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn download(msg: impl Into<String>) -> Self {
        Self::Download(msg.into())
    }

    pub fn job_failed(msg: impl Into<String>) -> Self {
        Self::JobFailed(msg.into())
    }

    /// The message persisted on the entity record and shown to the user.
    ///
    /// Provider task failures surface the provider's own error string
    /// verbatim; everything else uses the error's display form.
    pub fn user_message(&self) -> String {
        match self {
            WorkerError::Provider(prop_provider::ProviderError::TaskFailed(msg)) => msg.clone(),
            other => other.to_string(),
        }
    }

    /// Whether the task-level retry should attempt this job again.
    pub fn is_retryable(&self) -> bool {
        match self {
            WorkerError::Validation(_) | WorkerError::NotFound(_) | WorkerError::JobFailed(_) => {
                false
            }
            WorkerError::Download(_) | WorkerError::Storage(_) | WorkerError::Io(_) => true,
            WorkerError::Provider(e) => e.is_retryable(),
            WorkerError::Db(e) => e.is_retryable(),
        }
    }
}
