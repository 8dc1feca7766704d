use anyhow::Context;
use homelog_ingest::config_manager::ConfigManager;
use homelog_ingest::diagnostics;
use homelog_ingest::supervisor::Supervisor;
use std::sync::Arc;

const DEFAULT_ARCHIVE_WORKER_THREADS: usize = 2;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    diagnostics::init();

    let config_path = std::env::var("HOMELOG_CONFIG_PATH").unwrap_or_else(|_| "config.json".to_string());

    let config_manager = Arc::new(
        ConfigManager::load(&config_path)
            .with_context(|| format!("failed to load configuration from {config_path}"))?,
    );

    let worker_threads = std::env::var("HOMELOG_ARCHIVE_WORKERS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_ARCHIVE_WORKER_THREADS);

    let supervisor = Supervisor::new(config_manager, worker_threads)
        .context("failed to initialize supervisor")?;

    supervisor.run().await.context("service exited with error")?;
    Ok(())
}
