//! Image edit records and version lineage fields.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{EditStatus, ImageId, ProjectId, WorkspaceId};

/// How an edit modifies the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EditMode {
    /// Erase the masked region and fill it in. A brush mask is required.
    Remove,
    /// Insert new content. The mask may be derived from a placement
    /// rectangle instead of being drawn explicitly.
    Add,
}

impl EditMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EditMode::Remove => "remove",
            EditMode::Add => "add",
        }
    }
}

/// Placement rectangle for add-mode edits, in source-image pixels.
///
/// The editor seeds this as a centered rectangle covering 20% of the
/// canvas; the user moves/resizes it before submitting. Canvas dimensions
/// are carried along so a mask can be rasterized at the right size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PlacementRect {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
    pub canvas_width: u32,
    pub canvas_height: u32,
}

impl PlacementRect {
    /// The default rectangle for a canvas: centered, 20% of each dimension.
    pub fn centered(canvas_width: u32, canvas_height: u32) -> Self {
        let width = canvas_width / 5;
        let height = canvas_height / 5;
        Self {
            left: (canvas_width - width) / 2,
            top: (canvas_height - height) / 2,
            width,
            height,
            canvas_width,
            canvas_height,
        }
    }

    /// True when the rectangle lies fully inside its canvas and is non-empty.
    pub fn is_valid(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.left.saturating_add(self.width) <= self.canvas_width
            && self.top.saturating_add(self.height) <= self.canvas_height
    }
}

/// One edited image: a row in a version lineage.
///
/// The first version of a lineage (the root) has `root_id = None` and
/// `version = 1`; every later version points back at the root and carries
/// the next version number. Lineage traversal and invariants live in the
/// version ledger; this type is just the persisted shape.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ImageEditRecord {
    /// Unique record ID
    pub id: ImageId,

    /// Owning project
    pub project_id: ProjectId,

    /// Owning workspace (tenant)
    pub workspace_id: WorkspaceId,

    /// Processing status
    #[serde(default)]
    pub status: EditStatus,

    /// URL of the image this edit started from
    pub source_url: String,

    /// URL of the stored result; set only on completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_url: Option<String>,

    /// Position within the lineage, starting at 1
    #[serde(default = "default_version")]
    pub version: u32,

    /// Root of the lineage; `None` when this record is the root
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_id: Option<ImageId>,

    /// Natural-language edit instruction
    pub prompt: String,

    /// Edit mode used for this version
    pub mode: EditMode,

    /// Error message (if failed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

fn default_version() -> u32 {
    1
}

impl ImageEditRecord {
    /// Create a new lineage root in `pending`.
    pub fn new_root(
        project_id: ProjectId,
        workspace_id: WorkspaceId,
        source_url: impl Into<String>,
        prompt: impl Into<String>,
        mode: EditMode,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ImageId::new(),
            project_id,
            workspace_id,
            status: EditStatus::Pending,
            source_url: source_url.into(),
            result_url: None,
            version: 1,
            root_id: None,
            prompt: prompt.into(),
            mode,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The root of this record's lineage (self when this is the root).
    pub fn lineage_root(&self) -> &ImageId {
        self.root_id.as_ref().unwrap_or(&self.id)
    }

    /// True when this record is its lineage's root.
    pub fn is_root(&self) -> bool {
        self.root_id.is_none()
    }

    /// True when a job task already finished this record successfully.
    ///
    /// Used as the idempotent replay guard: re-running a job for a record
    /// in this state is a no-op success.
    pub fn is_replay_complete(&self) -> bool {
        self.status == EditStatus::Completed && self.result_url.is_some()
    }
}
