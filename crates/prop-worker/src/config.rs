//! Worker configuration.

use std::time::Duration;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Maximum concurrently running job tasks
    pub max_concurrent_runs: usize,
    /// How long a record may sit in `processing` before the sweep reclaims it
    pub stale_after: Duration,
    /// How often the stale sweep runs
    pub sweep_interval: Duration,
    /// Output format requested for image results
    pub image_output_format: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_runs: 4,
            stale_after: Duration::from_secs(600), // 10 minutes
            sweep_interval: Duration::from_secs(60),
            image_output_format: "jpeg".to_string(),
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            max_concurrent_runs: std::env::var("WORKER_MAX_RUNS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(4),
            stale_after: Duration::from_secs(
                std::env::var("WORKER_STALE_AFTER_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(600),
            ),
            sweep_interval: Duration::from_secs(
                std::env::var("WORKER_SWEEP_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            ),
            image_output_format: std::env::var("WORKER_IMAGE_FORMAT")
                .unwrap_or_else(|_| "jpeg".to_string()),
        }
    }

    /// File extension for the configured image output format.
    pub fn image_ext(&self) -> &str {
        match self.image_output_format.as_str() {
            "jpeg" | "jpg" => "jpg",
            "png" => "png",
            "webp" => "webp",
            _ => "jpg",
        }
    }
}
