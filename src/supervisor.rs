//! Process supervisor
//!
//! Wires the config manager, archive pool, consumer, and admin HTTP stub
//! together, then waits for either task to exit or a SIGINT/SIGTERM before
//! driving a bounded graceful shutdown.

use crate::archive::ArchiveWorkerPool;
use crate::config_manager::ConfigManager;
use crate::consumer::Consumer;
use crate::error::{IngestError, Result, StopError};
use axum::Router;
use axum::routing::get;
use std::sync::Arc;
use std::time::Duration;

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

pub struct Supervisor {
    config_manager: Arc<ConfigManager>,
    consumer: Arc<Consumer>,
}

impl Supervisor {
    pub fn new(config_manager: Arc<ConfigManager>, archive_worker_threads: usize) -> Result<Self> {
        let archive_pool = Arc::new(
            ArchiveWorkerPool::new(archive_worker_threads)
                .map_err(|e| IngestError::from(crate::error::StartError::SinkInit(e.to_string())))?,
        );
        let consumer = Arc::new(Consumer::new(config_manager.clone(), archive_pool));
        Ok(Self {
            config_manager,
            consumer,
        })
    }

    /// The admin surface this process exposes directly: a health probe and
    /// a read-only view of the live config. The real administration API
    /// (project CRUD, config editing UI) is an external collaborator.
    fn admin_router(&self) -> Router {
        let config_manager = self.config_manager.clone();
        Router::new()
            .route("/healthz", get(|| async { "ok" }))
            .route(
                "/config",
                get(move || {
                    let config_manager = config_manager.clone();
                    async move {
                        axum::Json((*config_manager.current()).clone())
                    }
                }),
            )
    }

    /// Runs until SIGINT/SIGTERM, or until the consumer or admin server
    /// exits on its own. On shutdown signal, stops the consumer and gives
    /// it up to 30 seconds to finish in-flight work before returning.
    pub async fn run(&self) -> Result<()> {
        let api_config = self.config_manager.current().api.clone();
        let admin_router = self.admin_router();

        let admin_task = tokio::spawn(async move {
            if !api_config.enabled {
                std::future::pending::<()>().await;
                return Ok::<(), std::io::Error>(());
            }
            let addr = format!("{}:{}", api_config.host, api_config.port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!(%addr, "admin http surface listening");
            axum::serve(listener, admin_router).await
        });

        let consumer = self.consumer.clone();
        let consumer_task = tokio::spawn(async move { consumer.run_forever().await });

        tokio::select! {
            result = admin_task => {
                tracing::warn!("admin http surface exited");
                if let Ok(Err(err)) = result {
                    tracing::warn!(error = %err, "admin http surface error");
                }
            }
            result = consumer_task => {
                tracing::warn!("consumer task exited");
                if let Ok(Err(err)) = result {
                    tracing::warn!(error = %err, "consumer error");
                }
            }
            _ = shutdown_signal() => {
                tracing::info!("shutdown signal received");
            }
        }

        self.shutdown().await
    }

    async fn shutdown(&self) -> Result<()> {
        let stop = self.consumer.stop();
        match tokio::time::timeout(SHUTDOWN_TIMEOUT, stop).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!("graceful shutdown timed out after 30s");
                Err(IngestError::from(StopError::Teardown(
                    "shutdown deadline exceeded".into(),
                )))
            }
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        let mut signal = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        signal.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
