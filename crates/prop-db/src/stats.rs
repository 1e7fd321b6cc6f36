//! Workspace-level stats for the dashboard.

use prop_models::{EditStatus, ProjectStatus, WorkspaceId};

use crate::store::MemoryStore;

/// Cost charged per completed image, in USD.
const IMAGE_COST_USD: f64 = 0.039;

/// Image edit counts by status across a workspace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageStats {
    pub total: u32,
    pub completed: u32,
    pub processing: u32,
    pub failed: u32,
}

/// Project totals across a workspace.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectStats {
    pub total_projects: u32,
    pub completed_projects: u32,
    pub processing_projects: u32,
    pub total_images: u32,
    /// Spend derived from completed images, rounded to cents.
    pub total_cost: f64,
}

/// Video project totals across a workspace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VideoProjectStats {
    pub total_videos: u32,
    pub completed_videos: u32,
    pub processing_videos: u32,
    pub total_clips: u32,
}

/// Tally image edits by status for a workspace.
pub async fn image_stats(store: &MemoryStore, workspace_id: &WorkspaceId) -> ImageStats {
    let mut stats = ImageStats::default();
    for record in store.list_images_by_workspace(workspace_id).await {
        stats.total += 1;
        match record.status {
            EditStatus::Completed => stats.completed += 1,
            EditStatus::Processing => stats.processing += 1,
            EditStatus::Failed => stats.failed += 1,
            EditStatus::Pending => {}
        }
    }
    stats
}

/// Tally projects and derived spend for a workspace.
pub async fn project_stats(store: &MemoryStore, workspace_id: &WorkspaceId) -> ProjectStats {
    let mut stats = ProjectStats::default();
    let mut completed_images = 0u32;

    for project in store.list_projects_by_workspace(workspace_id).await {
        stats.total_projects += 1;
        match project.status {
            ProjectStatus::Completed => stats.completed_projects += 1,
            ProjectStatus::Processing => stats.processing_projects += 1,
            _ => {}
        }
        stats.total_images += project.image_count;
        completed_images += project.completed_count;
    }

    stats.total_cost = (completed_images as f64 * IMAGE_COST_USD * 100.0).round() / 100.0;
    stats
}

/// Tally video projects for a workspace.
pub async fn video_project_stats(
    store: &MemoryStore,
    workspace_id: &WorkspaceId,
) -> VideoProjectStats {
    let mut stats = VideoProjectStats::default();
    for project in store.list_video_projects_by_workspace(workspace_id).await {
        stats.total_videos += 1;
        match project.status {
            ProjectStatus::Completed => stats.completed_videos += 1,
            ProjectStatus::Processing => stats.processing_videos += 1,
            _ => {}
        }
        stats.total_clips += project.clip_count;
    }
    stats
}
