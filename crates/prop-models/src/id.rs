//! Newtype identifiers for the core entities.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Generate a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Get the inner string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id!(
    /// Unique identifier for an image edit record.
    ImageId
);
string_id!(
    /// Unique identifier for an image project.
    ProjectId
);
string_id!(
    /// Unique identifier for a video clip.
    ClipId
);
string_id!(
    /// Unique identifier for a video project.
    VideoProjectId
);
string_id!(
    /// Unique identifier for a workspace (tenant).
    WorkspaceId
);
string_id!(
    /// Unique identifier for a music track.
    MusicTrackId
);
string_id!(
    /// Unique identifier for a background job run.
    ///
    /// Returned to the caller at dispatch time and used to poll progress.
    RunId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_generation_is_unique() {
        let a = ImageId::new();
        let b = ImageId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_id_serde_is_transparent() {
        let id = RunId::from("run-1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"run-1\"");
        let back: RunId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
