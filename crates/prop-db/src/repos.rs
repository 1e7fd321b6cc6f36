//! Typed repositories over the store.
//!
//! Each repository exposes the narrow operations its callers actually
//! perform, so status transitions happen in one place.

use std::sync::Arc;

use tracing::info;

use prop_models::{
    ClipId, EditStatus, ImageEditRecord, ImageId, MusicTrack, MusicTrackId, Project, ProjectId,
    VideoClip, VideoProject, VideoProjectId, WorkspaceId,
};

use crate::error::{DbError, DbResult};
use crate::store::MemoryStore;

/// Repository for image edit records.
#[derive(Clone)]
pub struct ImageEditRepository {
    store: Arc<MemoryStore>,
}

impl ImageEditRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    /// Create a new record (a lineage root; versions go through the ledger).
    pub async fn create(&self, record: ImageEditRecord) -> DbResult<ImageEditRecord> {
        let record = self.store.insert_image(record).await?;
        info!(image_id = %record.id, "Created image edit record");
        Ok(record)
    }

    pub async fn get(&self, id: &ImageId) -> Option<ImageEditRecord> {
        self.store.get_image(id).await
    }

    /// Get a record, failing with `NotFound` when missing.
    pub async fn require(&self, id: &ImageId) -> DbResult<ImageEditRecord> {
        self.store
            .get_image(id)
            .await
            .ok_or_else(|| DbError::not_found(format!("image edit {}", id)))
    }

    pub async fn list_by_project(&self, project_id: &ProjectId) -> Vec<ImageEditRecord> {
        self.store.list_images_by_project(project_id).await
    }

    /// Claim the record for a job task.
    pub async fn mark_processing(&self, id: &ImageId) -> DbResult<ImageEditRecord> {
        self.store
            .update_image(id, |r| r.status = EditStatus::Processing)
            .await
    }

    /// Record a successful result: completed, result URL set, error cleared.
    pub async fn complete(&self, id: &ImageId, result_url: &str) -> DbResult<ImageEditRecord> {
        self.store
            .update_image(id, |r| {
                r.status = EditStatus::Completed;
                r.result_url = Some(result_url.to_string());
                r.error_message = None;
            })
            .await
    }

    /// Record a failure with its human-readable message.
    pub async fn fail(&self, id: &ImageId, error: &str) -> DbResult<ImageEditRecord> {
        self.store
            .update_image(id, |r| {
                r.status = EditStatus::Failed;
                r.error_message = Some(error.to_string());
            })
            .await
    }
}

/// Repository for image projects.
#[derive(Clone)]
pub struct ProjectRepository {
    store: Arc<MemoryStore>,
}

impl ProjectRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, project: Project) -> DbResult<Project> {
        let project = self.store.insert_project(project).await?;
        info!(project_id = %project.id, "Created project");
        Ok(project)
    }

    pub async fn get(&self, id: &ProjectId) -> Option<Project> {
        self.store.get_project(id).await
    }

    pub async fn require(&self, id: &ProjectId) -> DbResult<Project> {
        self.store
            .get_project(id)
            .await
            .ok_or_else(|| DbError::not_found(format!("project {}", id)))
    }

    pub async fn rename(&self, id: &ProjectId, name: &str) -> DbResult<Project> {
        self.store
            .update_project(id, |p| p.name = name.to_string())
            .await
    }

    pub async fn delete(&self, id: &ProjectId) -> DbResult<()> {
        self.store.delete_project(id).await
    }

    pub async fn list_by_workspace(&self, workspace_id: &WorkspaceId) -> Vec<Project> {
        self.store.list_projects_by_workspace(workspace_id).await
    }
}

/// Repository for video clips.
#[derive(Clone)]
pub struct VideoClipRepository {
    store: Arc<MemoryStore>,
}

impl VideoClipRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, clip: VideoClip) -> DbResult<VideoClip> {
        let clip = self.store.insert_clip(clip).await?;
        info!(clip_id = %clip.id, "Created video clip");
        Ok(clip)
    }

    /// Create a storyboard's worth of clips at once.
    pub async fn create_many(&self, clips: Vec<VideoClip>) -> DbResult<Vec<VideoClip>> {
        let mut created = Vec::with_capacity(clips.len());
        for clip in clips {
            created.push(self.store.insert_clip(clip).await?);
        }
        Ok(created)
    }

    pub async fn get(&self, id: &ClipId) -> Option<VideoClip> {
        self.store.get_clip(id).await
    }

    pub async fn require(&self, id: &ClipId) -> DbResult<VideoClip> {
        self.store
            .get_clip(id)
            .await
            .ok_or_else(|| DbError::not_found(format!("video clip {}", id)))
    }

    pub async fn list_by_project(&self, video_project_id: &VideoProjectId) -> Vec<VideoClip> {
        self.store.list_clips_by_video_project(video_project_id).await
    }

    pub async fn mark_processing(&self, id: &ClipId) -> DbResult<VideoClip> {
        self.store
            .update_clip(id, |c| c.status = EditStatus::Processing)
            .await
    }

    pub async fn complete(&self, id: &ClipId, clip_url: &str) -> DbResult<VideoClip> {
        self.store
            .update_clip(id, |c| {
                c.status = EditStatus::Completed;
                c.clip_url = Some(clip_url.to_string());
                c.error_message = None;
            })
            .await
    }

    pub async fn fail(&self, id: &ClipId, error: &str) -> DbResult<VideoClip> {
        self.store
            .update_clip(id, |c| {
                c.status = EditStatus::Failed;
                c.error_message = Some(error.to_string());
            })
            .await
    }

    /// Rewrite storyboard positions after a drag-and-drop reorder.
    pub async fn reorder(&self, orders: &[(ClipId, u32)]) -> DbResult<()> {
        for (id, sequence_order) in orders {
            self.store
                .update_clip(id, |c| c.sequence_order = *sequence_order)
                .await?;
        }
        Ok(())
    }

    pub async fn delete(&self, id: &ClipId) -> DbResult<()> {
        self.store.delete_clip(id).await
    }
}

/// Repository for video projects.
#[derive(Clone)]
pub struct VideoProjectRepository {
    store: Arc<MemoryStore>,
}

impl VideoProjectRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, project: VideoProject) -> DbResult<VideoProject> {
        let project = self.store.insert_video_project(project).await?;
        info!(video_project_id = %project.id, "Created video project");
        Ok(project)
    }

    pub async fn get(&self, id: &VideoProjectId) -> Option<VideoProject> {
        self.store.get_video_project(id).await
    }

    pub async fn require(&self, id: &VideoProjectId) -> DbResult<VideoProject> {
        self.store
            .get_video_project(id)
            .await
            .ok_or_else(|| DbError::not_found(format!("video project {}", id)))
    }

    pub async fn set_music_track(
        &self,
        id: &VideoProjectId,
        music_track_id: Option<MusicTrackId>,
    ) -> DbResult<VideoProject> {
        self.store
            .update_video_project(id, |p| p.music_track_id = music_track_id)
            .await
    }

    pub async fn delete(&self, id: &VideoProjectId) -> DbResult<()> {
        self.store.delete_video_project(id).await
    }

    pub async fn list_by_workspace(&self, workspace_id: &WorkspaceId) -> Vec<VideoProject> {
        self.store
            .list_video_projects_by_workspace(workspace_id)
            .await
    }
}

/// Repository for the music track catalog.
#[derive(Clone)]
pub struct MusicTrackRepository {
    store: Arc<MemoryStore>,
}

impl MusicTrackRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    /// Load the built-in catalog into an empty store.
    pub async fn seed_builtin(&self) -> DbResult<usize> {
        let catalog = MusicTrack::builtin_catalog();
        let count = catalog.len();
        for track in catalog {
            self.store.insert_music_track(track).await?;
        }
        Ok(count)
    }

    pub async fn get(&self, id: &MusicTrackId) -> Option<MusicTrack> {
        self.store.get_music_track(id).await
    }

    /// Active tracks, optionally filtered by category, sorted by name.
    pub async fn list(&self, category: Option<&str>) -> Vec<MusicTrack> {
        self.store
            .list_music_tracks()
            .await
            .into_iter()
            .filter(|t| t.is_active)
            .filter(|t| category.map_or(true, |c| t.category == c))
            .collect()
    }
}
