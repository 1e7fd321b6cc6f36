//! Music tracks: read-only reference data for video assembly.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::MusicTrackId;

/// A licensed background track selectable for tour videos.
///
/// The pipeline never mutates tracks; video projects reference them by id.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MusicTrack {
    /// Unique track ID
    pub id: MusicTrackId,

    /// Track title
    pub name: String,

    /// Credited artist
    pub artist: String,

    /// Browsing category (modern, cinematic, upbeat, calm, classical)
    pub category: String,

    /// Mood tag shown next to the category
    pub mood: String,

    /// Track length in seconds
    pub duration_seconds: u32,

    /// Beats per minute
    pub bpm: u32,

    /// License classification
    pub license_type: String,

    /// Inactive tracks are hidden from selection
    #[serde(default = "default_active")]
    pub is_active: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl MusicTrack {
    fn seeded(
        name: &str,
        artist: &str,
        category: &str,
        mood: &str,
        duration_seconds: u32,
        bpm: u32,
    ) -> Self {
        Self {
            id: MusicTrackId::new(),
            name: name.to_string(),
            artist: artist.to_string(),
            category: category.to_string(),
            mood: mood.to_string(),
            duration_seconds,
            bpm,
            license_type: "royalty-free".to_string(),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    /// The built-in catalog used to seed a fresh store.
    pub fn builtin_catalog() -> Vec<MusicTrack> {
        vec![
            MusicTrack::seeded("Open House", "Arden Lane", "modern", "professional", 180, 90),
            MusicTrack::seeded("Golden Hour", "Field & Frame", "cinematic", "elegant", 240, 75),
            MusicTrack::seeded("Move-In Day", "Copper Keys", "upbeat", "energetic", 150, 120),
            MusicTrack::seeded("Still Water", "Low Tide", "calm", "relaxing", 200, 60),
            MusicTrack::seeded("Parlor Light", "The Gables", "classical", "warm", 220, 85),
        ]
    }
}
