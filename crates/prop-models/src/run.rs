//! Run progress reporting for background jobs.
//!
//! Each dispatched job run publishes a small status object at every major
//! step. It is a side channel for progress bars, not part of the
//! correctness contract; the entity record remains the durable state.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::RunId;

/// Major step of a job run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RunStep {
    /// Loading the entity record
    Fetching,
    /// Preparing/uploading inputs for the provider
    Uploading,
    /// Waiting on the external generation
    Generating,
    /// Downloading and storing the result
    Saving,
    /// Run finished successfully
    Completed,
    /// Run finished with an error
    Failed,
}

impl RunStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStep::Fetching => "fetching",
            RunStep::Uploading => "uploading",
            RunStep::Generating => "generating",
            RunStep::Saving => "saving",
            RunStep::Completed => "completed",
            RunStep::Failed => "failed",
        }
    }
}

/// Observable progress snapshot published by a run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RunStatus {
    /// Current step
    pub step: RunStep,
    /// Human-readable label for the step
    pub label: String,
    /// Progress percentage (0-100)
    pub progress: u8,
}

impl RunStatus {
    pub fn new(step: RunStep, label: impl Into<String>, progress: u8) -> Self {
        Self {
            step,
            label: label.into(),
            progress: progress.min(100),
        }
    }

    /// Terminal success snapshot.
    pub fn completed(label: impl Into<String>) -> Self {
        Self::new(RunStep::Completed, label, 100)
    }

    /// Terminal failure snapshot.
    pub fn failed(label: impl Into<String>) -> Self {
        Self::new(RunStep::Failed, label, 0)
    }
}

/// Full state of a run as seen by a polling caller.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RunState {
    /// Run identifier handed back at dispatch time
    pub run_id: RunId,
    /// Latest published status
    pub status: RunStatus,
    /// Error message when the run failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// When the run was dispatched
    pub started_at: DateTime<Utc>,
    /// When the status was last updated
    pub updated_at: DateTime<Utc>,
}

impl RunState {
    /// Create a fresh run state at the fetching step.
    pub fn new(run_id: RunId) -> Self {
        let now = Utc::now();
        Self {
            run_id,
            status: RunStatus::new(RunStep::Fetching, "Queued", 0),
            error_message: None,
            started_at: now,
            updated_at: now,
        }
    }

    /// Publish a new status snapshot.
    pub fn set_status(&mut self, status: RunStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    /// Mark the run failed with an error message.
    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = RunStatus::failed("Generation failed");
        self.error_message = Some(error.into());
        self.updated_at = Utc::now();
    }

    /// True once the run reached a terminal step.
    pub fn is_terminal(&self) -> bool {
        matches!(self.status.step, RunStep::Completed | RunStep::Failed)
    }
}
