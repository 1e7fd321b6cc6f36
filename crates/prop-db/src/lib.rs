//! Data store interface for the Propella pipeline.
//!
//! The relational store itself is an external collaborator; this crate
//! provides the CRUD + filtering surface the pipeline consumes, an
//! in-memory reference implementation, and the two pieces of data-model
//! logic that are in scope:
//!
//! - the version ledger (edit lineages with strictly increasing versions)
//! - the aggregate counters (derived project counts/status)

pub mod counts;
pub mod error;
pub mod ledger;
pub mod repos;
pub mod stats;
pub mod store;

pub use counts::{recompute_project, recompute_video_project};
pub use error::{DbError, DbResult};
pub use ledger::{Lineage, NewVersion, VersionLedger};
pub use repos::{
    ImageEditRepository, MusicTrackRepository, ProjectRepository, VideoClipRepository,
    VideoProjectRepository,
};
pub use stats::{image_stats, project_stats, video_project_stats, ImageStats, ProjectStats, VideoProjectStats};
pub use store::MemoryStore;
