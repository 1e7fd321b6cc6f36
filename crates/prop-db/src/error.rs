//! Store error types.

use thiserror::Error;

/// Result type for store operations.
pub type DbResult<T> = Result<T, DbError>;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Record already exists: {0}")]
    AlreadyExists(String),

    /// Unique `(lineage root, version)` violation. Raised when two
    /// concurrent edits computed the same next version; the ledger retries
    /// on this.
    #[error("Version {version} already exists in lineage {root}")]
    VersionConflict { root: String, version: u32 },
}

impl DbError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn already_exists(what: impl Into<String>) -> Self {
        Self::AlreadyExists(what.into())
    }

    /// True for conflicts that a re-read-and-retry can resolve.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DbError::VersionConflict { .. })
    }
}
