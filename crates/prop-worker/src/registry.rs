//! Run registry: the progress side channel callers poll.
//!
//! Dispatch hands back a `RunId` immediately; the task publishes a status
//! snapshot at each major step. Terminal states stay in the registry so a
//! late poll still sees the outcome. The entity record, not the registry,
//! is the durable source of truth.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use prop_models::{RunId, RunState, RunStatus};

/// Shared map of run states.
#[derive(Clone, Default)]
pub struct RunRegistry {
    runs: Arc<RwLock<HashMap<RunId, RunState>>>,
}

impl RunRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly dispatched run.
    pub async fn insert(&self, run_id: RunId) {
        let state = RunState::new(run_id.clone());
        self.runs.write().await.insert(run_id, state);
    }

    /// Publish a status snapshot for a run.
    ///
    /// Publishing for an unknown run is a no-op: progress is advisory and
    /// must never fail a job.
    pub async fn publish(&self, run_id: &RunId, status: RunStatus) {
        if let Some(state) = self.runs.write().await.get_mut(run_id) {
            state.set_status(status);
        }
    }

    /// Mark a run failed with an error message.
    pub async fn fail(&self, run_id: &RunId, error: impl Into<String>) {
        if let Some(state) = self.runs.write().await.get_mut(run_id) {
            state.fail(error);
        }
    }

    /// Current state of a run.
    pub async fn get(&self, run_id: &RunId) -> Option<RunState> {
        self.runs.read().await.get(run_id).cloned()
    }

    /// Number of tracked runs.
    pub async fn len(&self) -> usize {
        self.runs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.runs.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prop_models::RunStep;

    #[tokio::test]
    async fn test_publish_and_poll() {
        let registry = RunRegistry::new();
        let run_id = RunId::new();
        registry.insert(run_id.clone()).await;

        registry
            .publish(&run_id, RunStatus::new(RunStep::Generating, "Generating video", 40))
            .await;

        let state = registry.get(&run_id).await.unwrap();
        assert_eq!(state.status.step, RunStep::Generating);
        assert_eq!(state.status.progress, 40);
        assert!(!state.is_terminal());
    }

    #[tokio::test]
    async fn test_fail_is_terminal_and_sticky() {
        let registry = RunRegistry::new();
        let run_id = RunId::new();
        registry.insert(run_id.clone()).await;
        registry.fail(&run_id, "mask missing").await;

        let state = registry.get(&run_id).await.unwrap();
        assert!(state.is_terminal());
        assert_eq!(state.error_message.as_deref(), Some("mask missing"));
    }

    #[tokio::test]
    async fn test_publish_unknown_run_is_noop() {
        let registry = RunRegistry::new();
        registry
            .publish(&RunId::new(), RunStatus::completed("Complete"))
            .await;
        assert!(registry.is_empty().await);
    }
}
