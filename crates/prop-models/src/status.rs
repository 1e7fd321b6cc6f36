//! Status enums for pipeline entities.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Processing status of a child entity (image edit record or video clip).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum EditStatus {
    /// Created, not yet claimed by a job task
    #[default]
    Pending,
    /// A job task is driving the external generation
    Processing,
    /// Result URL is set and valid
    Completed,
    /// Terminal failure; error message is set
    Failed,
}

impl EditStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EditStatus::Pending => "pending",
            EditStatus::Processing => "processing",
            EditStatus::Completed => "completed",
            EditStatus::Failed => "failed",
        }
    }

    /// Check if this is a terminal state (no more updates expected).
    pub fn is_terminal(&self) -> bool {
        matches!(self, EditStatus::Completed | EditStatus::Failed)
    }
}

impl fmt::Display for EditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Derived status of a parent aggregate (project or video project).
///
/// Never set directly: always recomputed from the current child statuses.
/// The derivation rule lives with the aggregate counter; this enum only
/// names the outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// No child has made progress yet
    #[default]
    Pending,
    /// Work is in flight or partially complete
    Processing,
    /// Every child completed (and there is at least one)
    Completed,
    /// At least one child failed and none completed
    Failed,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Pending => "pending",
            ProjectStatus::Processing => "processing",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!EditStatus::Pending.is_terminal());
        assert!(!EditStatus::Processing.is_terminal());
        assert!(EditStatus::Completed.is_terminal());
        assert!(EditStatus::Failed.is_terminal());
    }

    #[test]
    fn test_status_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&EditStatus::Processing).unwrap(),
            "\"processing\""
        );
        assert_eq!(
            serde_json::to_string(&ProjectStatus::Failed).unwrap(),
            "\"failed\""
        );
    }
}
