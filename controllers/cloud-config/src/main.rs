//! Cloud Config Controller
//!
//! Compiles the cloud-controller configuration of every `Cluster` and
//! publishes it as the `cloud-config` ConfigMap in the cluster's namespace.

mod backoff;
mod config;
mod controller;
mod error;
mod metrics;
mod reconciler;
mod server;
mod watcher;

#[cfg(test)]
mod test_utils;

use crate::config::Config;
use crate::error::ControllerError;
use controller::Controller;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ControllerError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting Cloud Config Controller");

    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }

    let config = Config::from_env()?;

    info!("Configuration:");
    info!(
        "  Label selector: {}",
        config.label_selector.as_deref().unwrap_or("all clusters")
    );
    info!("  Concurrency: {}", config.concurrency);
    info!("  Debounce: {}s", config.debounce.as_secs());
    info!(
        "  Backoff: {}s - {}s",
        config.backoff_min_seconds, config.backoff_max_seconds
    );
    info!("  Metrics address: {}", config.metrics_addr);

    let controller = Controller::new(config).await?;
    controller.run().await?;

    Ok(())
}
