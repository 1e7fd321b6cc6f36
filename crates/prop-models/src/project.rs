//! Image project aggregate.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{ProjectId, ProjectStatus, WorkspaceId};

/// A batch of images being enhanced together.
///
/// `image_count`, `completed_count`, and `status` are derived from the
/// project's image edit records and rewritten wholesale by the aggregate
/// counter after every child mutation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Project {
    /// Unique project ID
    pub id: ProjectId,

    /// Owning workspace
    pub workspace_id: WorkspaceId,

    /// Display name (e.g. the listing address)
    pub name: String,

    /// Derived status
    #[serde(default)]
    pub status: ProjectStatus,

    /// Total image edit records owned by this project
    #[serde(default)]
    pub image_count: u32,

    /// Records with status `completed`
    #[serde(default)]
    pub completed_count: u32,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Create an empty project in `pending`.
    pub fn new(workspace_id: WorkspaceId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ProjectId::new(),
            workspace_id,
            name: name.into(),
            status: ProjectStatus::Pending,
            image_count: 0,
            completed_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_project_counts_start_at_zero() {
        let p = Project::new(WorkspaceId::new(), "12 Elm Street");
        assert_eq!(p.image_count, 0);
        assert_eq!(p.completed_count, 0);
        assert_eq!(p.status, ProjectStatus::Pending);
    }
}
