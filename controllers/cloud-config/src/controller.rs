//! Main controller implementation.
//!
//! Runs the Cluster watcher next to the probe and metrics server and exits
//! when either of them stops.

use crate::config::Config;
use crate::error::ControllerError;
use crate::metrics::Metrics;
use crate::reconciler::{ClusterBackoffs, Reconciler};
use crate::server::{self, ServerState};
use crate::watcher::watch_clusters;
use kube::Client;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

/// Main controller for cloud config publication.
#[derive(Debug)]
pub struct Controller {
    cluster_watcher: JoinHandle<Result<(), ControllerError>>,
    server: JoinHandle<Result<(), ControllerError>>,
}

impl Controller {
    /// Creates a new controller instance and starts its tasks.
    pub async fn new(config: Config) -> Result<Self, ControllerError> {
        info!("Initializing Cloud Config Controller");

        let client = Client::try_default().await?;

        let metrics = Arc::new(
            Metrics::new().map_err(|e| ControllerError::Server(format!("metrics: {}", e)))?,
        );
        let ready = Arc::new(AtomicBool::new(false));

        let reconciler = Arc::new(Reconciler::new(
            client.clone(),
            metrics.clone(),
            ClusterBackoffs::new(config.backoff_min_seconds, config.backoff_max_seconds),
        ));

        let server_state = ServerState {
            metrics,
            ready: ready.clone(),
        };
        let metrics_addr = config.metrics_addr;
        let server = tokio::spawn(async move { server::serve(metrics_addr, server_state).await });

        let cluster_watcher = tokio::spawn(async move {
            ready.store(true, Ordering::Relaxed);
            watch_clusters(client, reconciler, &config).await
        });

        Ok(Self {
            cluster_watcher,
            server,
        })
    }

    /// Runs the controller until shutdown.
    pub async fn run(mut self) -> Result<(), ControllerError> {
        info!("Cloud Config Controller running");

        tokio::select! {
            result = &mut self.cluster_watcher => {
                result.map_err(|e| ControllerError::Watch(format!("Cluster watcher panicked: {}", e)))??;
            }
            result = &mut self.server => {
                result.map_err(|e| ControllerError::Server(format!("Server panicked: {}", e)))??;
            }
        }

        Ok(())
    }
}
