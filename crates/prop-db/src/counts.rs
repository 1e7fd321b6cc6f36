//! Aggregate counters: derived counts and status for parent entities.
//!
//! Counts are recomputed from scratch after every child mutation, not
//! maintained incrementally. One read of the child table produces all
//! derived fields, and one update writes them together.

use tracing::debug;

use prop_models::{EditStatus, Project, ProjectId, ProjectStatus, VideoProject, VideoProjectId};

use crate::error::DbResult;
use crate::store::MemoryStore;

/// Tally of child statuses from a single read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct StatusTally {
    total: u32,
    completed: u32,
    processing: u32,
    failed: u32,
}

impl StatusTally {
    fn add(&mut self, status: EditStatus) {
        self.total += 1;
        match status {
            EditStatus::Completed => self.completed += 1,
            EditStatus::Processing => self.processing += 1,
            EditStatus::Failed => self.failed += 1,
            EditStatus::Pending => {}
        }
    }

    /// The deterministic status rule:
    /// - `completed` iff every child completed and there is at least one
    /// - `processing` iff any child completed or any is still processing
    /// - `failed` iff every child failed
    /// - `pending` otherwise
    fn derive_status(&self) -> ProjectStatus {
        if self.total > 0 && self.completed == self.total {
            ProjectStatus::Completed
        } else if self.completed > 0 || self.processing > 0 {
            ProjectStatus::Processing
        } else if self.total > 0 && self.failed == self.total {
            ProjectStatus::Failed
        } else {
            ProjectStatus::Pending
        }
    }
}

/// Recompute an image project's counts and derived status.
///
/// Idempotent; safe to call redundantly after every child mutation.
pub async fn recompute_project(store: &MemoryStore, project_id: &ProjectId) -> DbResult<Project> {
    let mut tally = StatusTally::default();
    for record in store.list_images_by_project(project_id).await {
        tally.add(record.status);
    }

    let status = tally.derive_status();
    debug!(
        project_id = %project_id,
        total = tally.total,
        completed = tally.completed,
        status = %status,
        "Recomputed project counts"
    );

    store
        .update_project(project_id, |p| {
            p.image_count = tally.total;
            p.completed_count = tally.completed;
            p.status = status;
        })
        .await
}

/// Recompute a video project's clip counts and derived status.
pub async fn recompute_video_project(
    store: &MemoryStore,
    video_project_id: &VideoProjectId,
) -> DbResult<VideoProject> {
    let mut tally = StatusTally::default();
    for clip in store.list_clips_by_video_project(video_project_id).await {
        tally.add(clip.status);
    }

    let status = tally.derive_status();
    debug!(
        video_project_id = %video_project_id,
        total = tally.total,
        completed = tally.completed,
        status = %status,
        "Recomputed video project counts"
    );

    store
        .update_video_project(video_project_id, |p| {
            p.clip_count = tally.total;
            p.completed_clip_count = tally.completed;
            p.status = status;
        })
        .await
}
