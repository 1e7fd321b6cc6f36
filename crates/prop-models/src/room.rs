//! Room classification for tour video source images.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Negative prompt sent with every clip generation request.
///
/// Keeps the provider from warping architecture or inventing people in an
/// empty listing shot.
pub const DEFAULT_NEGATIVE_PROMPT: &str =
    "blur, distortion, warped walls, morphing, people, text, watermark, low quality";

/// Room classification of a source image.
///
/// Each variant carries a display label and a default camera-motion prompt
/// used when a clip has no explicit one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum RoomType {
    ExteriorFront,
    ExteriorBack,
    Entryway,
    LivingRoom,
    Kitchen,
    DiningRoom,
    Bedroom,
    Bathroom,
    Office,
    Other,
}

impl RoomType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomType::ExteriorFront => "exterior-front",
            RoomType::ExteriorBack => "exterior-back",
            RoomType::Entryway => "entryway",
            RoomType::LivingRoom => "living-room",
            RoomType::Kitchen => "kitchen",
            RoomType::DiningRoom => "dining-room",
            RoomType::Bedroom => "bedroom",
            RoomType::Bathroom => "bathroom",
            RoomType::Office => "office",
            RoomType::Other => "other",
        }
    }

    /// Human-readable label for storyboard slots.
    pub fn label(&self) -> &'static str {
        match self {
            RoomType::ExteriorFront => "Front Exterior",
            RoomType::ExteriorBack => "Backyard / Patio",
            RoomType::Entryway => "Entryway",
            RoomType::LivingRoom => "Living Room",
            RoomType::Kitchen => "Kitchen",
            RoomType::DiningRoom => "Dining Room",
            RoomType::Bedroom => "Bedroom",
            RoomType::Bathroom => "Bathroom",
            RoomType::Office => "Office",
            RoomType::Other => "Other",
        }
    }

    /// Default motion prompt submitted when a clip carries none.
    pub fn default_motion_prompt(&self) -> &'static str {
        match self {
            RoomType::ExteriorFront => {
                "slow cinematic push-in toward the front entrance, golden hour light"
            }
            RoomType::ExteriorBack => {
                "smooth drift across the backyard, trees swaying gently"
            }
            RoomType::Entryway => "gentle dolly forward through the entryway into the home",
            RoomType::LivingRoom => {
                "slow lateral pan across the living room, soft natural light through the windows"
            }
            RoomType::Kitchen => {
                "smooth tracking shot along the kitchen counters toward the island"
            }
            RoomType::DiningRoom => "slow orbit around the dining table, warm ambient light",
            RoomType::Bedroom => "gentle push-in toward the bed, curtains moving slightly",
            RoomType::Bathroom => "slow reveal of the bathroom vanity and fixtures",
            RoomType::Office => "steady push-in toward the desk by the window",
            RoomType::Other => "slow cinematic camera movement through the space",
        }
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_type_serde_kebab_case() {
        assert_eq!(
            serde_json::to_string(&RoomType::LivingRoom).unwrap(),
            "\"living-room\""
        );
        let back: RoomType = serde_json::from_str("\"exterior-front\"").unwrap();
        assert_eq!(back, RoomType::ExteriorFront);
    }

    #[test]
    fn test_every_room_has_a_motion_prompt() {
        let all = [
            RoomType::ExteriorFront,
            RoomType::ExteriorBack,
            RoomType::Entryway,
            RoomType::LivingRoom,
            RoomType::Kitchen,
            RoomType::DiningRoom,
            RoomType::Bedroom,
            RoomType::Bathroom,
            RoomType::Office,
            RoomType::Other,
        ];
        for room in all {
            assert!(!room.default_motion_prompt().is_empty());
            assert!(!room.label().is_empty());
        }
    }
}
