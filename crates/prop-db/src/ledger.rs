//! Version ledger: edit lineages for image records.
//!
//! Every edit of an image is a new record linked to the lineage's root with
//! a strictly increasing version number. The ledger owns lineage traversal,
//! next-version assignment, and the "replace newer versions" truncation.

use std::sync::Arc;

use tracing::{debug, warn};

use prop_models::{EditMode, ImageEditRecord, ImageId, ProjectId};

use crate::error::{DbError, DbResult};
use crate::store::MemoryStore;

/// Attempts at the read-max-then-insert before giving up on a lineage.
///
/// A conflict means a concurrent edit claimed the same version number; one
/// re-read is normally enough to move past it.
const CREATE_VERSION_ATTEMPTS: u32 = 3;

/// Fields the caller supplies for a new version.
#[derive(Debug, Clone)]
pub struct NewVersion {
    /// Image the edit starts from (usually the result of the version the
    /// user was looking at)
    pub source_url: String,
    /// Natural-language edit instruction
    pub prompt: String,
    /// Edit mode
    pub mode: EditMode,
}

/// A fully resolved lineage: the root plus its children in version order.
///
/// The root is a position in this type, not a nullable reference the caller
/// has to check. Assembled on demand from the store, never cached.
#[derive(Debug, Clone)]
pub struct Lineage {
    pub root: ImageEditRecord,
    pub children: Vec<ImageEditRecord>,
}

impl Lineage {
    /// All records, root first, ascending by version. The iterator is
    /// finite and restartable; call [`VersionLedger::lineage`] again for a
    /// fresh snapshot.
    pub fn iter(&self) -> impl Iterator<Item = &ImageEditRecord> {
        std::iter::once(&self.root).chain(self.children.iter())
    }

    /// The record with the highest version.
    pub fn latest(&self) -> &ImageEditRecord {
        self.children.last().unwrap_or(&self.root)
    }

    /// Highest version in the lineage.
    pub fn max_version(&self) -> u32 {
        self.iter().map(|r| r.version).max().unwrap_or(self.root.version)
    }

    /// Number of records in the lineage.
    pub fn len(&self) -> usize {
        1 + self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Lineage operations over the store.
#[derive(Clone)]
pub struct VersionLedger {
    store: Arc<MemoryStore>,
}

impl VersionLedger {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    /// Resolve the lineage containing `any_id`.
    ///
    /// Accepts any record in the lineage: a child resolves to its root
    /// first, then the root plus all children are gathered and sorted
    /// ascending by version.
    pub async fn lineage(&self, any_id: &ImageId) -> DbResult<Lineage> {
        let record = self
            .store
            .get_image(any_id)
            .await
            .ok_or_else(|| DbError::not_found(format!("image edit {}", any_id)))?;

        let root_id = record.lineage_root().clone();
        let root = self
            .store
            .get_image(&root_id)
            .await
            .ok_or_else(|| DbError::not_found(format!("lineage root {}", root_id)))?;

        let children = self.store.list_images_by_root(&root_id).await;
        Ok(Lineage { root, children })
    }

    /// The latest version of the lineage containing `any_id`.
    pub async fn latest(&self, any_id: &ImageId) -> DbResult<ImageEditRecord> {
        Ok(self.lineage(any_id).await?.latest().clone())
    }

    /// Append a new version to a lineage.
    ///
    /// The next version is `max(root.version, max(children.version)) + 1`.
    /// The read-then-insert is guarded by the store's unique
    /// `(lineage root, version)` key: on a concurrent conflict the max is
    /// re-read and the insert retried a bounded number of times.
    pub async fn create_version(
        &self,
        root_id: &ImageId,
        edit: NewVersion,
    ) -> DbResult<ImageEditRecord> {
        let mut last_conflict = None;

        for attempt in 0..CREATE_VERSION_ATTEMPTS {
            let lineage = self.lineage(root_id).await?;
            let next_version = lineage.max_version() + 1;
            let root = &lineage.root;

            let record = ImageEditRecord {
                id: ImageId::new(),
                project_id: root.project_id.clone(),
                workspace_id: root.workspace_id.clone(),
                status: prop_models::EditStatus::Pending,
                source_url: edit.source_url.clone(),
                result_url: None,
                version: next_version,
                root_id: Some(root.id.clone()),
                prompt: edit.prompt.clone(),
                mode: edit.mode,
                error_message: None,
                created_at: chrono::Utc::now(),
                updated_at: chrono::Utc::now(),
            };

            match self.store.insert_image(record).await {
                Ok(inserted) => {
                    debug!(
                        root_id = %root.id,
                        version = inserted.version,
                        "Created lineage version"
                    );
                    return Ok(inserted);
                }
                Err(e @ DbError::VersionConflict { .. }) => {
                    warn!(
                        root_id = %root.id,
                        attempt,
                        "Version conflict on concurrent edit, re-reading lineage"
                    );
                    last_conflict = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_conflict.expect("conflict retries exhausted without a conflict"))
    }

    /// Delete every version strictly greater than `version` in the lineage
    /// rooted at `root_id`. Returns the number of deleted records.
    ///
    /// Afterwards the lineage's max version equals `version`: the versions
    /// below it are untouched, so no gaps or orphaned children remain.
    pub async fn truncate_after(&self, root_id: &ImageId, version: u32) -> DbResult<u64> {
        // Resolve to the actual root so a child id works too.
        let record = self
            .store
            .get_image(root_id)
            .await
            .ok_or_else(|| DbError::not_found(format!("image edit {}", root_id)))?;
        let root_id = record.lineage_root().clone();

        let deleted = self
            .store
            .delete_image_versions_after(&root_id, version)
            .await;

        debug!(root_id = %root_id, version, deleted, "Truncated lineage");
        Ok(deleted)
    }

    /// Latest completed version of each lineage in a project, ordered by
    /// the root's creation time. Used for bulk download.
    pub async fn latest_version_images(
        &self,
        project_id: &ProjectId,
    ) -> DbResult<Vec<ImageEditRecord>> {
        let images = self.store.list_images_by_project(project_id).await;

        let mut roots: Vec<ImageId> = Vec::new();
        for img in &images {
            let root = img.lineage_root().clone();
            if !roots.contains(&root) {
                roots.push(root);
            }
        }

        let mut latest = Vec::new();
        for root_id in roots {
            let lineage = match self.lineage(&root_id).await {
                Ok(l) => l,
                // Orphaned children of a truncated root carry no usable
                // lineage; skip them.
                Err(DbError::NotFound(_)) => continue,
                Err(e) => return Err(e),
            };
            let record = lineage.latest().clone();
            if record.status == prop_models::EditStatus::Completed {
                latest.push(record);
            }
        }

        latest.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(latest)
    }
}
