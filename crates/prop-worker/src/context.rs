//! Shared context for job tasks.

use std::sync::Arc;

use prop_db::{
    ImageEditRepository, MemoryStore, ProjectRepository, VersionLedger, VideoClipRepository,
    VideoProjectRepository,
};
use prop_provider::ProviderClient;
use prop_storage::MediaStore;

use crate::config::WorkerConfig;
use crate::registry::RunRegistry;

/// Everything a job task needs, constructed explicitly and passed in.
///
/// No ambient singletons: the provider client, media store, and store handle
/// are all supplied at construction time, which is also what makes the job
/// tasks testable against mocks.
pub struct WorkerContext {
    pub store: Arc<MemoryStore>,
    pub images: ImageEditRepository,
    pub projects: ProjectRepository,
    pub clips: VideoClipRepository,
    pub video_projects: VideoProjectRepository,
    pub ledger: VersionLedger,
    pub provider: ProviderClient,
    pub media: Arc<dyn MediaStore>,
    pub http: reqwest::Client,
    pub registry: RunRegistry,
    pub config: WorkerConfig,
}

impl WorkerContext {
    pub fn new(
        store: Arc<MemoryStore>,
        provider: ProviderClient,
        media: Arc<dyn MediaStore>,
        config: WorkerConfig,
    ) -> Self {
        Self {
            images: ImageEditRepository::new(store.clone()),
            projects: ProjectRepository::new(store.clone()),
            clips: VideoClipRepository::new(store.clone()),
            video_projects: VideoProjectRepository::new(store.clone()),
            ledger: VersionLedger::new(store.clone()),
            store,
            provider,
            media,
            http: reqwest::Client::new(),
            registry: RunRegistry::new(),
            config,
        }
    }

    /// Fetch result media from the provider's CDN.
    pub async fn download_media(&self, url: &str) -> crate::error::WorkerResult<Vec<u8>> {
        use crate::error::WorkerError;

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| WorkerError::download(format!("Failed to fetch result: {}", e)))?;

        if !response.status().is_success() {
            return Err(WorkerError::download(format!(
                "Result fetch returned {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| WorkerError::download(format!("Failed to read result body: {}", e)))?;

        Ok(bytes.to_vec())
    }
}
