//! Video projects and clips.

use std::fmt;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{ClipId, EditStatus, MusicTrackId, ProjectStatus, RoomType, VideoProjectId, WorkspaceId};

/// Output aspect ratio for a tour video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
pub enum AspectRatio {
    /// Landscape (MLS listings, YouTube)
    #[serde(rename = "16:9")]
    #[default]
    Landscape,
    /// Portrait (Reels, TikTok)
    #[serde(rename = "9:16")]
    Portrait,
    /// Square (feed posts)
    #[serde(rename = "1:1")]
    Square,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Landscape => "16:9",
            AspectRatio::Portrait => "9:16",
            AspectRatio::Square => "1:1",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Clip length accepted by the video provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
pub enum ClipDuration {
    #[serde(rename = "5")]
    #[default]
    Five,
    #[serde(rename = "10")]
    Ten,
}

impl ClipDuration {
    pub fn as_secs(&self) -> u32 {
        match self {
            ClipDuration::Five => 5,
            ClipDuration::Ten => 10,
        }
    }

    /// Wire representation ("5" or "10").
    pub fn as_str(&self) -> &'static str {
        match self {
            ClipDuration::Five => "5",
            ClipDuration::Ten => "10",
        }
    }
}

/// One generated motion clip within a tour video.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VideoClip {
    /// Unique clip ID
    pub id: ClipId,

    /// Owning video project
    pub video_project_id: VideoProjectId,

    /// Processing status
    #[serde(default)]
    pub status: EditStatus,

    /// Still image the motion is generated from
    pub source_image_url: String,

    /// URL of the stored result clip; set only on completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clip_url: Option<String>,

    /// Position in the assembled video
    pub sequence_order: u32,

    /// Motion description; when absent the room type's default is used
    #[serde(skip_serializing_if = "Option::is_none")]
    pub motion_prompt: Option<String>,

    /// Clip length
    #[serde(default)]
    pub duration: ClipDuration,

    /// Room classification of the source image
    pub room_type: RoomType,

    /// Error message (if failed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl VideoClip {
    /// Create a new pending clip.
    pub fn new(
        video_project_id: VideoProjectId,
        source_image_url: impl Into<String>,
        sequence_order: u32,
        room_type: RoomType,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ClipId::new(),
            video_project_id,
            status: EditStatus::Pending,
            source_image_url: source_image_url.into(),
            clip_url: None,
            sequence_order,
            motion_prompt: None,
            duration: ClipDuration::default(),
            room_type,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The motion prompt to submit: explicit when set, otherwise the room
    /// type's default.
    pub fn effective_motion_prompt(&self) -> &str {
        self.motion_prompt
            .as_deref()
            .unwrap_or_else(|| self.room_type.default_motion_prompt())
    }

    /// True when a job task already finished this clip successfully.
    pub fn is_replay_complete(&self) -> bool {
        self.status == EditStatus::Completed && self.clip_url.is_some()
    }
}

/// A tour video being assembled from generated clips.
///
/// `clip_count`, `completed_clip_count`, and `status` are derived from the
/// project's clips by the aggregate counter.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VideoProject {
    /// Unique video project ID
    pub id: VideoProjectId,

    /// Owning workspace
    pub workspace_id: WorkspaceId,

    /// Display name
    pub name: String,

    /// Derived status
    #[serde(default)]
    pub status: ProjectStatus,

    /// Total clips owned by this project
    #[serde(default)]
    pub clip_count: u32,

    /// Clips with status `completed`
    #[serde(default)]
    pub completed_clip_count: u32,

    /// Output aspect ratio for every clip in the project
    #[serde(default)]
    pub aspect_ratio: AspectRatio,

    /// Background music for the assembled video
    #[serde(skip_serializing_if = "Option::is_none")]
    pub music_track_id: Option<MusicTrackId>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl VideoProject {
    /// Create an empty video project in `pending`.
    pub fn new(
        workspace_id: WorkspaceId,
        name: impl Into<String>,
        aspect_ratio: AspectRatio,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: VideoProjectId::new(),
            workspace_id,
            name: name.into(),
            status: ProjectStatus::Pending,
            clip_count: 0,
            completed_clip_count: 0,
            aspect_ratio,
            music_track_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_ratio_wire_format() {
        assert_eq!(
            serde_json::to_string(&AspectRatio::Portrait).unwrap(),
            "\"9:16\""
        );
        let back: AspectRatio = serde_json::from_str("\"1:1\"").unwrap();
        assert_eq!(back, AspectRatio::Square);
    }

    #[test]
    fn test_clip_duration_wire_format() {
        assert_eq!(serde_json::to_string(&ClipDuration::Ten).unwrap(), "\"10\"");
        assert_eq!(ClipDuration::Five.as_secs(), 5);
    }

    #[test]
    fn test_effective_motion_prompt_falls_back_to_room_default() {
        let mut clip = VideoClip::new(
            VideoProjectId::new(),
            "https://example.com/kitchen.jpg",
            0,
            RoomType::Kitchen,
        );
        assert_eq!(
            clip.effective_motion_prompt(),
            RoomType::Kitchen.default_motion_prompt()
        );

        clip.motion_prompt = Some("slow pan across the island".to_string());
        assert_eq!(clip.effective_motion_prompt(), "slow pan across the island");
    }
}
