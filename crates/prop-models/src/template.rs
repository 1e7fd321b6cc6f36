//! Tour video templates: ordered room slots for the storyboard.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::RoomType;

/// One slot in a template's storyboard.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TemplateSlot {
    /// Room the uploaded image should show
    pub room_type: RoomType,
    /// Slot label shown in the storyboard
    pub label: String,
    /// Short guidance for the user
    pub description: String,
}

impl TemplateSlot {
    fn new(room_type: RoomType, label: &str, description: &str) -> Self {
        Self {
            room_type,
            label: label.to_string(),
            description: description.to_string(),
        }
    }
}

/// A predefined tour structure.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VideoTemplate {
    /// Stable template identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// One-line description
    pub description: String,
    /// Ordered storyboard slots
    pub slots: Vec<TemplateSlot>,
    /// Estimated assembled duration in seconds
    pub estimated_duration: u32,
}

impl VideoTemplate {
    /// All built-in templates.
    pub fn all() -> Vec<VideoTemplate> {
        vec![
            VideoTemplate {
                id: "classic-tour".to_string(),
                name: "Classic Home Tour".to_string(),
                description: "A comprehensive walkthrough perfect for most residential properties."
                    .to_string(),
                estimated_duration: 35,
                slots: vec![
                    TemplateSlot::new(
                        RoomType::ExteriorFront,
                        "Front Exterior",
                        "The hero shot of the home from the street",
                    ),
                    TemplateSlot::new(
                        RoomType::Entryway,
                        "Entryway",
                        "Welcome viewers into the home",
                    ),
                    TemplateSlot::new(
                        RoomType::LivingRoom,
                        "Living Room",
                        "The main gathering space",
                    ),
                    TemplateSlot::new(
                        RoomType::Kitchen,
                        "Kitchen",
                        "Show off the heart of the home",
                    ),
                    TemplateSlot::new(
                        RoomType::DiningRoom,
                        "Dining Room",
                        "Where meals are shared",
                    ),
                    TemplateSlot::new(RoomType::Bedroom, "Primary Bedroom", "A relaxing retreat"),
                    TemplateSlot::new(RoomType::Bathroom, "Primary Bathroom", "Spa-like features"),
                    TemplateSlot::new(
                        RoomType::ExteriorBack,
                        "Backyard / Patio",
                        "Outdoor living space",
                    ),
                ],
            },
            VideoTemplate {
                id: "highlight-reel".to_string(),
                name: "Quick Highlights".to_string(),
                description: "Fast-paced teaser focusing on the property's best features."
                    .to_string(),
                estimated_duration: 20,
                slots: vec![
                    TemplateSlot::new(
                        RoomType::ExteriorFront,
                        "Exterior",
                        "Catch attention immediately",
                    ),
                    TemplateSlot::new(
                        RoomType::LivingRoom,
                        "Living Space",
                        "The most impressive room",
                    ),
                    TemplateSlot::new(
                        RoomType::Kitchen,
                        "Kitchen",
                        "Modern appliances and finishes",
                    ),
                    TemplateSlot::new(RoomType::Bedroom, "Bedroom", "Comfort and style"),
                ],
            },
        ]
    }

    /// Look up a template by id.
    pub fn by_id(id: &str) -> Option<VideoTemplate> {
        Self::all().into_iter().find(|t| t.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_lookup() {
        let t = VideoTemplate::by_id("classic-tour").unwrap();
        assert_eq!(t.slots.len(), 8);
        assert_eq!(t.slots[0].room_type, RoomType::ExteriorFront);
        assert!(VideoTemplate::by_id("nope").is_none());
    }
}
