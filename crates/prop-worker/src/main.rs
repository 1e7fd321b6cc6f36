//! Propella worker binary.
//!
//! Wires the provider client, storage, and store together and runs the
//! stale-run sweep. Job dispatch itself is driven by the API layer through
//! [`prop_worker::TaskRunner`]; this process keeps the pipeline healthy.

use std::sync::Arc;

use anyhow::Context;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use prop_db::MemoryStore;
use prop_provider::ProviderClient;
use prop_storage::{MediaStore, R2Client};
use prop_worker::{StaleSweep, WorkerConfig, WorkerContext};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("prop=info".parse().expect("valid directive"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(true).with_target(true))
            .with(env_filter)
            .init();
    }

    info!("Starting prop-worker");

    PrometheusBuilder::new()
        .install()
        .context("Failed to install Prometheus exporter")?;

    let config = WorkerConfig::from_env();
    info!("Worker config: {:?}", config);

    let provider = ProviderClient::from_env().context("Failed to create provider client")?;
    let media: Arc<dyn MediaStore> =
        Arc::new(R2Client::from_env().context("Failed to create storage client")?);
    let store = Arc::new(MemoryStore::new());

    let ctx = Arc::new(WorkerContext::new(store, provider, media, config));
    let sweep = StaleSweep::new(ctx);

    tokio::select! {
        _ = sweep.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
    }

    info!("Worker shutdown complete");
    Ok(())
}
