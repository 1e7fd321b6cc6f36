//! HTTP client for the external AI generation provider.
//!
//! This crate provides:
//! - Task submission (`createTask`) with the provider's code/message envelope
//! - Bounded polling (`getTask`) until completion, failure, or timeout
//! - Typed failures for every terminal outcome

pub mod client;
pub mod error;
pub mod types;

pub use client::{ProviderClient, ProviderConfig, MAX_POLL_ATTEMPTS, POLL_INTERVAL};
pub use error::{ProviderError, ProviderResult};
pub use types::{
    CreateTaskRequest, MediaOutput, TaskInput, TaskOutput, TaskType, IMAGE_EDIT_MODEL,
    VIDEO_CLIP_MODEL,
};
