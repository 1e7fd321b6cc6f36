//! Fire-and-forget task dispatch.
//!
//! Each job runs as an independent spawned task bounded by a semaphore.
//! The caller gets a `RunId` back immediately and observes progress through
//! the run registry and the entity records.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::{error, info};

use prop_models::{EditMode, ImageId, PlacementRect, RunId};

use crate::clip_job::{run_clip_job, ClipJobPayload};
use crate::context::WorkerContext;
use crate::error::WorkerResult;
use crate::inpaint_job::{run_inpaint_job, InpaintJobPayload};
use crate::retry::{run_with_retry, TaskRetryPolicy};

/// A user-initiated edit of an existing image version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditRequest {
    /// The version being edited (any record in the lineage)
    pub image_id: ImageId,
    /// Edit instruction
    pub prompt: String,
    /// Edit mode
    pub mode: EditMode,
    /// Brush mask as a base64 data URL
    pub mask_data_url: Option<String>,
    /// Placement rectangle for add-mode edits
    pub placement_rect: Option<PlacementRect>,
    /// Discard versions newer than the one being edited before appending
    pub replace_newer_versions: bool,
}

/// Dispatches job tasks onto the runtime.
#[derive(Clone)]
pub struct TaskRunner {
    ctx: Arc<WorkerContext>,
    semaphore: Arc<Semaphore>,
    retry: TaskRetryPolicy,
}

impl TaskRunner {
    pub fn new(ctx: Arc<WorkerContext>) -> Self {
        let semaphore = Arc::new(Semaphore::new(ctx.config.max_concurrent_runs));
        Self {
            ctx,
            semaphore,
            retry: TaskRetryPolicy::default(),
        }
    }

    pub fn context(&self) -> &Arc<WorkerContext> {
        &self.ctx
    }

    /// Dispatch an inpaint job for an existing record. Returns immediately.
    pub async fn dispatch_inpaint(&self, payload: InpaintJobPayload) -> RunId {
        let run_id = RunId::new();
        self.ctx.registry.insert(run_id.clone()).await;

        let ctx = Arc::clone(&self.ctx);
        let semaphore = Arc::clone(&self.semaphore);
        let retry = self.retry.clone();
        let spawned_run_id = run_id.clone();

        tokio::spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return;
            };

            let result = run_with_retry(&retry, || {
                run_inpaint_job(&ctx, &spawned_run_id, &payload)
            })
            .await;

            if let Err(e) = result {
                error!(
                    run_id = %spawned_run_id,
                    image_id = %payload.image_id,
                    "Inpaint run failed terminally: {}",
                    e
                );
            }
        });

        info!(run_id = %run_id, "Dispatched inpaint run");
        run_id
    }

    /// Dispatch a clip generation job. Returns immediately.
    pub async fn dispatch_clip(&self, payload: ClipJobPayload) -> RunId {
        let run_id = RunId::new();
        self.ctx.registry.insert(run_id.clone()).await;

        let ctx = Arc::clone(&self.ctx);
        let semaphore = Arc::clone(&self.semaphore);
        let retry = self.retry.clone();
        let spawned_run_id = run_id.clone();

        tokio::spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return;
            };

            let result =
                run_with_retry(&retry, || run_clip_job(&ctx, &spawned_run_id, &payload)).await;

            if let Err(e) = result {
                error!(
                    run_id = %spawned_run_id,
                    clip_id = %payload.clip_id,
                    "Clip run failed terminally: {}",
                    e
                );
            }
        });

        info!(run_id = %run_id, "Dispatched clip run");
        run_id
    }

    /// Handle an edit request: append a new version to the lineage (after
    /// optionally discarding newer ones) and dispatch a job for it.
    ///
    /// Returns the run id and the new version's record id so the caller can
    /// poll both.
    pub async fn dispatch_edit(&self, request: EditRequest) -> WorkerResult<(RunId, ImageId)> {
        let record = self.ctx.images.get(&request.image_id).await.ok_or_else(|| {
            crate::error::WorkerError::not_found(format!(
                "Image edit not found: {}",
                request.image_id
            ))
        })?;

        let root_id = record.lineage_root().clone();

        if request.replace_newer_versions {
            let deleted = self
                .ctx
                .ledger
                .truncate_after(&root_id, record.version)
                .await?;
            info!(
                root_id = %root_id,
                version = record.version,
                deleted,
                "Discarded newer versions before edit"
            );
        }

        // The new version edits what the user was looking at: the stored
        // result when the record completed, else its source.
        let source_url = record
            .result_url
            .clone()
            .unwrap_or_else(|| record.source_url.clone());

        let new_record = self
            .ctx
            .ledger
            .create_version(
                &root_id,
                prop_db::NewVersion {
                    source_url,
                    prompt: request.prompt.clone(),
                    mode: request.mode,
                },
            )
            .await?;

        let run_id = self
            .dispatch_inpaint(InpaintJobPayload {
                image_id: new_record.id.clone(),
                mask_data_url: request.mask_data_url,
                placement_rect: request.placement_rect,
            })
            .await;

        Ok((run_id, new_record.id))
    }
}
