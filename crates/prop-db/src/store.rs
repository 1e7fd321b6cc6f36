//! In-memory reference store.
//!
//! Tables are plain maps behind async RwLocks. Each operation is a single
//! "read, compute, atomic update" against one table; no operation holds a
//! lock across an await point into another table.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;

use prop_models::{
    ClipId, ImageEditRecord, ImageId, MusicTrack, MusicTrackId, Project, ProjectId, VideoClip,
    VideoProject, VideoProjectId, WorkspaceId,
};

use crate::error::{DbError, DbResult};

/// The store the pipeline runs against: CRUD plus simple filtering on the
/// core entities.
#[derive(Default)]
pub struct MemoryStore {
    images: RwLock<HashMap<ImageId, ImageEditRecord>>,
    projects: RwLock<HashMap<ProjectId, Project>>,
    clips: RwLock<HashMap<ClipId, VideoClip>>,
    video_projects: RwLock<HashMap<VideoProjectId, VideoProject>>,
    music_tracks: RwLock<HashMap<MusicTrackId, MusicTrack>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- image edit records ----

    /// Insert an image edit record.
    ///
    /// Enforces the unique `(lineage root, version)` key: an insert that
    /// would duplicate a version within a lineage fails with
    /// [`DbError::VersionConflict`] instead of silently creating a fork.
    pub async fn insert_image(&self, record: ImageEditRecord) -> DbResult<ImageEditRecord> {
        let mut images = self.images.write().await;

        if images.contains_key(&record.id) {
            return Err(DbError::already_exists(record.id.to_string()));
        }

        let root = record.lineage_root().clone();
        if images
            .values()
            .any(|r| r.lineage_root() == &root && r.version == record.version)
        {
            return Err(DbError::VersionConflict {
                root: root.to_string(),
                version: record.version,
            });
        }

        images.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    pub async fn get_image(&self, id: &ImageId) -> Option<ImageEditRecord> {
        self.images.read().await.get(id).cloned()
    }

    /// Apply an update to an image record; bumps `updated_at`.
    pub async fn update_image(
        &self,
        id: &ImageId,
        apply: impl FnOnce(&mut ImageEditRecord),
    ) -> DbResult<ImageEditRecord> {
        let mut images = self.images.write().await;
        let record = images
            .get_mut(id)
            .ok_or_else(|| DbError::not_found(format!("image edit {}", id)))?;
        apply(record);
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    /// All records owned by a project, newest first.
    pub async fn list_images_by_project(&self, project_id: &ProjectId) -> Vec<ImageEditRecord> {
        let mut records: Vec<_> = self
            .images
            .read()
            .await
            .values()
            .filter(|r| &r.project_id == project_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records
    }

    /// Child records of a lineage root, ascending by version.
    pub async fn list_images_by_root(&self, root_id: &ImageId) -> Vec<ImageEditRecord> {
        let mut records: Vec<_> = self
            .images
            .read()
            .await
            .values()
            .filter(|r| r.root_id.as_ref() == Some(root_id))
            .cloned()
            .collect();
        records.sort_by_key(|r| r.version);
        records
    }

    /// Delete every record in a lineage with version strictly greater than
    /// `after`. The root itself is deleted when its version qualifies
    /// (edge case). Returns the number of deleted records.
    pub async fn delete_image_versions_after(&self, root_id: &ImageId, after: u32) -> u64 {
        let mut images = self.images.write().await;
        let before = images.len();
        images.retain(|_, r| !(r.lineage_root() == root_id && r.version > after));
        (before - images.len()) as u64
    }

    /// All image records in a workspace (for stats).
    pub async fn list_images_by_workspace(&self, workspace_id: &WorkspaceId) -> Vec<ImageEditRecord> {
        self.images
            .read()
            .await
            .values()
            .filter(|r| &r.workspace_id == workspace_id)
            .cloned()
            .collect()
    }

    /// Records stuck in `processing` since before `cutoff` (stale sweep).
    pub async fn list_stale_processing_images(
        &self,
        cutoff: chrono::DateTime<Utc>,
    ) -> Vec<ImageEditRecord> {
        self.images
            .read()
            .await
            .values()
            .filter(|r| r.status == prop_models::EditStatus::Processing && r.updated_at < cutoff)
            .cloned()
            .collect()
    }

    // ---- projects ----

    pub async fn insert_project(&self, project: Project) -> DbResult<Project> {
        let mut projects = self.projects.write().await;
        if projects.contains_key(&project.id) {
            return Err(DbError::already_exists(project.id.to_string()));
        }
        projects.insert(project.id.clone(), project.clone());
        Ok(project)
    }

    pub async fn get_project(&self, id: &ProjectId) -> Option<Project> {
        self.projects.read().await.get(id).cloned()
    }

    pub async fn update_project(
        &self,
        id: &ProjectId,
        apply: impl FnOnce(&mut Project),
    ) -> DbResult<Project> {
        let mut projects = self.projects.write().await;
        let project = projects
            .get_mut(id)
            .ok_or_else(|| DbError::not_found(format!("project {}", id)))?;
        apply(project);
        project.updated_at = Utc::now();
        Ok(project.clone())
    }

    pub async fn delete_project(&self, id: &ProjectId) -> DbResult<()> {
        self.projects
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DbError::not_found(format!("project {}", id)))
    }

    pub async fn list_projects_by_workspace(&self, workspace_id: &WorkspaceId) -> Vec<Project> {
        let mut projects: Vec<_> = self
            .projects
            .read()
            .await
            .values()
            .filter(|p| &p.workspace_id == workspace_id)
            .cloned()
            .collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        projects
    }

    // ---- video clips ----

    pub async fn insert_clip(&self, clip: VideoClip) -> DbResult<VideoClip> {
        let mut clips = self.clips.write().await;
        if clips.contains_key(&clip.id) {
            return Err(DbError::already_exists(clip.id.to_string()));
        }
        clips.insert(clip.id.clone(), clip.clone());
        Ok(clip)
    }

    pub async fn get_clip(&self, id: &ClipId) -> Option<VideoClip> {
        self.clips.read().await.get(id).cloned()
    }

    pub async fn update_clip(
        &self,
        id: &ClipId,
        apply: impl FnOnce(&mut VideoClip),
    ) -> DbResult<VideoClip> {
        let mut clips = self.clips.write().await;
        let clip = clips
            .get_mut(id)
            .ok_or_else(|| DbError::not_found(format!("video clip {}", id)))?;
        apply(clip);
        clip.updated_at = Utc::now();
        Ok(clip.clone())
    }

    pub async fn delete_clip(&self, id: &ClipId) -> DbResult<()> {
        self.clips
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DbError::not_found(format!("video clip {}", id)))
    }

    /// Clips of a video project in storyboard order.
    pub async fn list_clips_by_video_project(
        &self,
        video_project_id: &VideoProjectId,
    ) -> Vec<VideoClip> {
        let mut clips: Vec<_> = self
            .clips
            .read()
            .await
            .values()
            .filter(|c| &c.video_project_id == video_project_id)
            .cloned()
            .collect();
        clips.sort_by_key(|c| c.sequence_order);
        clips
    }

    /// Clips stuck in `processing` since before `cutoff` (stale sweep).
    pub async fn list_stale_processing_clips(
        &self,
        cutoff: chrono::DateTime<Utc>,
    ) -> Vec<VideoClip> {
        self.clips
            .read()
            .await
            .values()
            .filter(|c| c.status == prop_models::EditStatus::Processing && c.updated_at < cutoff)
            .cloned()
            .collect()
    }

    // ---- video projects ----

    pub async fn insert_video_project(&self, project: VideoProject) -> DbResult<VideoProject> {
        let mut projects = self.video_projects.write().await;
        if projects.contains_key(&project.id) {
            return Err(DbError::already_exists(project.id.to_string()));
        }
        projects.insert(project.id.clone(), project.clone());
        Ok(project)
    }

    pub async fn get_video_project(&self, id: &VideoProjectId) -> Option<VideoProject> {
        self.video_projects.read().await.get(id).cloned()
    }

    pub async fn update_video_project(
        &self,
        id: &VideoProjectId,
        apply: impl FnOnce(&mut VideoProject),
    ) -> DbResult<VideoProject> {
        let mut projects = self.video_projects.write().await;
        let project = projects
            .get_mut(id)
            .ok_or_else(|| DbError::not_found(format!("video project {}", id)))?;
        apply(project);
        project.updated_at = Utc::now();
        Ok(project.clone())
    }

    pub async fn delete_video_project(&self, id: &VideoProjectId) -> DbResult<()> {
        self.video_projects
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DbError::not_found(format!("video project {}", id)))
    }

    pub async fn list_video_projects_by_workspace(
        &self,
        workspace_id: &WorkspaceId,
    ) -> Vec<VideoProject> {
        let mut projects: Vec<_> = self
            .video_projects
            .read()
            .await
            .values()
            .filter(|p| &p.workspace_id == workspace_id)
            .cloned()
            .collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        projects
    }

    // ---- music tracks ----

    pub async fn insert_music_track(&self, track: MusicTrack) -> DbResult<MusicTrack> {
        let mut tracks = self.music_tracks.write().await;
        if tracks.contains_key(&track.id) {
            return Err(DbError::already_exists(track.id.to_string()));
        }
        tracks.insert(track.id.clone(), track.clone());
        Ok(track)
    }

    pub async fn get_music_track(&self, id: &MusicTrackId) -> Option<MusicTrack> {
        self.music_tracks.read().await.get(id).cloned()
    }

    pub async fn list_music_tracks(&self) -> Vec<MusicTrack> {
        let mut tracks: Vec<_> = self.music_tracks.read().await.values().cloned().collect();
        tracks.sort_by(|a, b| a.name.cmp(&b.name));
        tracks
    }
}
