//! Image inpaint job task.
//!
//! Drives one image edit record through the external provider: load,
//! replay-guard, mark processing, submit with mask + prompt, await, download
//! the result, store it, persist completion, recompute the owning project.

use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use prop_db::recompute_project;
use prop_models::{ImageEditRecord, ImageId, PlacementRect, RunId, RunStatus, RunStep};
use prop_provider::{CreateTaskRequest, TaskInput, TaskType, IMAGE_EDIT_MODEL};
use prop_storage::paths::{image_content_type, image_mask_key, image_result_key};

use crate::context::WorkerContext;
use crate::error::{WorkerError, WorkerResult};
use crate::mask::resolve_mask;

/// Invocation payload for one inpaint run.
///
/// Prompt and mode live on the record itself; the payload carries only the
/// per-run inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InpaintJobPayload {
    /// Record to process
    pub image_id: ImageId,
    /// Brush mask as a base64 data URL
    pub mask_data_url: Option<String>,
    /// Placement rectangle for add-mode edits without a drawn mask
    pub placement_rect: Option<PlacementRect>,
}

/// Result handed back to the dispatcher.
#[derive(Debug, Clone)]
pub struct InpaintOutcome {
    pub image_id: ImageId,
    pub result_url: String,
    /// True when the record was already completed and no provider call was
    /// made.
    pub replayed: bool,
}

/// Run one inpaint job to a terminal state.
pub async fn run_inpaint_job(
    ctx: &WorkerContext,
    run_id: &RunId,
    payload: &InpaintJobPayload,
) -> WorkerResult<InpaintOutcome> {
    ctx.registry
        .publish(run_id, RunStatus::new(RunStep::Fetching, "Loading image data", 10))
        .await;

    let record = ctx.images.get(&payload.image_id).await.ok_or_else(|| {
        WorkerError::not_found(format!("Image edit not found: {}", payload.image_id))
    })?;

    // Idempotent replay guard: a finished record is a no-op success, not an
    // error, and must not trigger a second provider call.
    if record.is_replay_complete() {
        info!(image_id = %record.id, "Image already processed, skipping");
        ctx.registry
            .publish(run_id, RunStatus::completed("Already processed"))
            .await;
        return Ok(InpaintOutcome {
            image_id: record.id.clone(),
            result_url: record.result_url.clone().unwrap_or_default(),
            replayed: true,
        });
    }

    match inpaint_inner(ctx, run_id, &record, payload).await {
        Ok(result_url) => {
            recompute_project(&ctx.store, &record.project_id).await?;
            counter!("propella_inpaint_jobs_completed_total").increment(1);
            ctx.registry
                .publish(run_id, RunStatus::completed("Complete"))
                .await;
            info!(image_id = %record.id, result_url = %result_url, "Image inpaint completed");
            Ok(InpaintOutcome {
                image_id: record.id.clone(),
                result_url,
                replayed: false,
            })
        }
        Err(e) => {
            let message = e.user_message();
            warn!(image_id = %record.id, "Image inpaint failed: {}", message);
            counter!("propella_inpaint_jobs_failed_total").increment(1);

            // Persist the failure and reflect it in the parent before
            // re-raising for the runner's retry decision.
            ctx.images.fail(&record.id, &message).await.ok();
            recompute_project(&ctx.store, &record.project_id).await.ok();
            ctx.registry.fail(run_id, message).await;
            Err(e)
        }
    }
}

/// Steps 3-8: everything that turns a failure into `status = failed`.
async fn inpaint_inner(
    ctx: &WorkerContext,
    run_id: &RunId,
    record: &ImageEditRecord,
    payload: &InpaintJobPayload,
) -> WorkerResult<String> {
    ctx.images.mark_processing(&record.id).await?;

    ctx.registry
        .publish(run_id, RunStatus::new(RunStep::Uploading, "Preparing image", 20))
        .await;

    let mut input = TaskInput::img2img(&record.prompt, &record.source_url)
        .with_output_format(&ctx.config.image_output_format);

    if let Some(mask_bytes) = resolve_mask(
        record.mode,
        payload.mask_data_url.as_deref(),
        payload.placement_rect.as_ref(),
    )? {
        let mask_key = image_mask_key(&record.workspace_id, &record.project_id, &record.id);
        let mask_url = ctx.media.store(mask_bytes, &mask_key, "image/png").await?;
        input = input.with_mask(mask_url);
    }

    ctx.registry
        .publish(run_id, RunStatus::new(RunStep::Generating, "Enhancing image", 40))
        .await;

    let task_id = ctx
        .provider
        .submit(&CreateTaskRequest {
            model: IMAGE_EDIT_MODEL.to_string(),
            task_type: TaskType::Img2img,
            input,
        })
        .await?;

    ctx.registry
        .publish(run_id, RunStatus::new(RunStep::Generating, "Enhancing image", 50))
        .await;

    let output = ctx.provider.await_result(&task_id).await?;
    let media_url = &output.images[0].url;

    ctx.registry
        .publish(run_id, RunStatus::new(RunStep::Saving, "Saving image", 80))
        .await;

    let bytes = ctx.download_media(media_url).await?;

    let ext = ctx.config.image_ext();
    let key = image_result_key(&record.workspace_id, &record.project_id, &record.id, ext);
    let stored_url = ctx.media.store(bytes, &key, image_content_type(ext)).await?;

    ctx.images.complete(&record.id, &stored_url).await?;
    Ok(stored_url)
}
