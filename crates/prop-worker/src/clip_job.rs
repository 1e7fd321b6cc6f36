//! Video clip generation job task.
//!
//! Mirrors the inpaint task for motion clips: the source still image goes
//! to the provider with a motion prompt (explicit or room-type default),
//! the fixed negative prompt, and the owning project's duration/aspect
//! settings; the resulting clip is stored and the project counts
//! recomputed.

use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use prop_db::recompute_video_project;
use prop_models::{ClipId, RunId, RunStatus, RunStep, VideoClip, VideoProject, DEFAULT_NEGATIVE_PROMPT};
use prop_provider::{CreateTaskRequest, TaskInput, TaskType, VIDEO_CLIP_MODEL};
use prop_storage::paths::clip_result_key;

use crate::context::WorkerContext;
use crate::error::{WorkerError, WorkerResult};

/// Invocation payload for one clip generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipJobPayload {
    pub clip_id: ClipId,
}

/// Result handed back to the dispatcher.
#[derive(Debug, Clone)]
pub struct ClipOutcome {
    pub clip_id: ClipId,
    pub clip_url: String,
    /// True when the clip was already completed and no provider call was
    /// made.
    pub replayed: bool,
}

/// Run one clip generation job to a terminal state.
pub async fn run_clip_job(
    ctx: &WorkerContext,
    run_id: &RunId,
    payload: &ClipJobPayload,
) -> WorkerResult<ClipOutcome> {
    ctx.registry
        .publish(run_id, RunStatus::new(RunStep::Fetching, "Loading clip data", 10))
        .await;

    let clip = ctx.clips.get(&payload.clip_id).await.ok_or_else(|| {
        WorkerError::not_found(format!("Video clip not found: {}", payload.clip_id))
    })?;

    if clip.is_replay_complete() {
        info!(clip_id = %clip.id, "Clip already processed, skipping");
        ctx.registry
            .publish(run_id, RunStatus::completed("Already processed"))
            .await;
        return Ok(ClipOutcome {
            clip_id: clip.id.clone(),
            clip_url: clip.clip_url.clone().unwrap_or_default(),
            replayed: true,
        });
    }

    match clip_inner(ctx, run_id, &clip).await {
        Ok(clip_url) => {
            recompute_video_project(&ctx.store, &clip.video_project_id).await?;
            counter!("propella_clip_jobs_completed_total").increment(1);
            ctx.registry
                .publish(run_id, RunStatus::completed("Complete"))
                .await;
            info!(clip_id = %clip.id, clip_url = %clip_url, "Video clip generation completed");
            Ok(ClipOutcome {
                clip_id: clip.id.clone(),
                clip_url,
                replayed: false,
            })
        }
        Err(e) => {
            let message = e.user_message();
            warn!(clip_id = %clip.id, "Video clip generation failed: {}", message);
            counter!("propella_clip_jobs_failed_total").increment(1);

            ctx.clips.fail(&clip.id, &message).await.ok();
            recompute_video_project(&ctx.store, &clip.video_project_id)
                .await
                .ok();
            ctx.registry.fail(run_id, message).await;
            Err(e)
        }
    }
}

async fn clip_inner(ctx: &WorkerContext, run_id: &RunId, clip: &VideoClip) -> WorkerResult<String> {
    // The owning project supplies aspect ratio and workspace.
    let project: VideoProject = ctx
        .video_projects
        .get(&clip.video_project_id)
        .await
        .ok_or_else(|| {
            WorkerError::not_found(format!("Video project not found: {}", clip.video_project_id))
        })?;

    ctx.clips.mark_processing(&clip.id).await?;

    ctx.registry
        .publish(run_id, RunStatus::new(RunStep::Uploading, "Preparing image", 20))
        .await;

    let motion_prompt = clip.effective_motion_prompt();

    ctx.registry
        .publish(run_id, RunStatus::new(RunStep::Generating, "Generating video", 40))
        .await;

    info!(
        clip_id = %clip.id,
        prompt = %motion_prompt,
        duration = %clip.duration.as_str(),
        aspect_ratio = %project.aspect_ratio,
        "Submitting clip generation"
    );

    let input = TaskInput::img2img(motion_prompt, &clip.source_image_url)
        .with_duration(clip.duration.as_str())
        .with_aspect_ratio(project.aspect_ratio.as_str())
        .with_negative_prompt(DEFAULT_NEGATIVE_PROMPT)
        .with_output_format("mp4");

    let task_id = ctx
        .provider
        .submit(&CreateTaskRequest {
            model: VIDEO_CLIP_MODEL.to_string(),
            task_type: TaskType::Img2img,
            input,
        })
        .await?;

    ctx.registry
        .publish(run_id, RunStatus::new(RunStep::Generating, "Generating video", 50))
        .await;

    let output = ctx.provider.await_result(&task_id).await?;
    let media_url = &output.images[0].url;

    ctx.registry
        .publish(run_id, RunStatus::new(RunStep::Saving, "Saving video", 80))
        .await;

    let bytes = ctx.download_media(media_url).await?;

    let key = clip_result_key(&project.workspace_id, &clip.video_project_id, &clip.id);
    let stored_url = ctx.media.store(bytes, &key, "video/mp4").await?;

    ctx.clips.complete(&clip.id, &stored_url).await?;
    Ok(stored_url)
}
