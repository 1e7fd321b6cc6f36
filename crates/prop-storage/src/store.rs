//! The storage seam consumed by job tasks.

use async_trait::async_trait;

use crate::error::StorageResult;

/// Persist binary media under a deterministic key.
///
/// Implementations must overwrite on re-upload (re-running a job for the
/// same entity writes the same key), and must not retry internally: an
/// upload failure is terminal for the current job attempt, and retrying is
/// the job task's decision.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store `bytes` at `key` and return a publicly resolvable URL.
    async fn store(&self, bytes: Vec<u8>, key: &str, content_type: &str) -> StorageResult<String>;

    /// Delete the object at `key`. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Check whether an object exists at `key`.
    async fn exists(&self, key: &str) -> StorageResult<bool>;
}
