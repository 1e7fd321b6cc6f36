//! Stale-run sweep.
//!
//! A crash between "result obtained" and "record updated" leaves an entity
//! in `processing` forever; no multi-step transaction spans the external
//! calls, so the store cannot prevent it. The sweep reclaims such records:
//! anything still `processing` past the staleness threshold is failed with
//! a timeout message and its parent recomputed.

use chrono::Utc;
use metrics::counter;
use tracing::{info, warn};

use prop_db::{recompute_project, recompute_video_project};

use crate::context::WorkerContext;
use crate::error::WorkerResult;

/// Message persisted on reclaimed records.
pub const STALE_MESSAGE: &str =
    "Processing timed out. The worker may have crashed. Please try again.";

/// One sweep pass: reclaim every stale `processing` record.
///
/// Returns the number of reclaimed records (images + clips).
pub async fn sweep_once(ctx: &WorkerContext) -> WorkerResult<u64> {
    let cutoff = Utc::now()
        - chrono::Duration::from_std(ctx.config.stale_after)
            .unwrap_or_else(|_| chrono::Duration::seconds(600));

    let mut reclaimed = 0u64;

    for record in ctx.store.list_stale_processing_images(cutoff).await {
        warn!(image_id = %record.id, "Reclaiming stale image edit");
        ctx.images.fail(&record.id, STALE_MESSAGE).await?;
        recompute_project(&ctx.store, &record.project_id).await?;
        reclaimed += 1;
    }

    for clip in ctx.store.list_stale_processing_clips(cutoff).await {
        warn!(clip_id = %clip.id, "Reclaiming stale video clip");
        ctx.clips.fail(&clip.id, STALE_MESSAGE).await?;
        recompute_video_project(&ctx.store, &clip.video_project_id).await?;
        reclaimed += 1;
    }

    if reclaimed > 0 {
        counter!("propella_stale_runs_reclaimed_total").increment(reclaimed);
        info!(reclaimed, "Stale sweep reclaimed stuck records");
    }

    Ok(reclaimed)
}

/// Periodic sweep loop.
pub struct StaleSweep {
    ctx: std::sync::Arc<WorkerContext>,
}

impl StaleSweep {
    pub fn new(ctx: std::sync::Arc<WorkerContext>) -> Self {
        Self { ctx }
    }

    /// Run until cancelled, sweeping on the configured interval.
    pub async fn run(&self) {
        let mut interval = tokio::time::interval(self.ctx.config.sweep_interval);
        // The first tick fires immediately; skip straight into the cadence.
        interval.tick().await;

        loop {
            interval.tick().await;
            if let Err(e) = sweep_once(&self.ctx).await {
                warn!("Stale sweep failed: {}", e);
            }
        }
    }
}
