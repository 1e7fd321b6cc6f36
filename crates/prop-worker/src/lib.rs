//! Background job tasks for the Propella pipeline.
//!
//! This crate provides:
//! - The image inpaint and video clip generation tasks
//! - Fire-and-forget dispatch with a pollable run registry
//! - Task-level retry with exponential backoff
//! - A stale-run sweep for records stuck in `processing`

pub mod clip_job;
pub mod config;
pub mod context;
pub mod error;
pub mod inpaint_job;
pub mod mask;
pub mod registry;
pub mod retry;
pub mod runner;
pub mod sweep;

pub use clip_job::{run_clip_job, ClipJobPayload, ClipOutcome};
pub use config::WorkerConfig;
pub use context::WorkerContext;
pub use error::{WorkerError, WorkerResult};
pub use inpaint_job::{run_inpaint_job, InpaintJobPayload, InpaintOutcome};
pub use registry::RunRegistry;
pub use retry::TaskRetryPolicy;
pub use runner::{EditRequest, TaskRunner};
pub use sweep::{sweep_once, StaleSweep, STALE_MESSAGE};
