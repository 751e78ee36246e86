//! Kubernetes resource watchers.
//!
//! Clusters are reconciled through `kube_runtime::Controller`, which handles
//! reconnection, requeueing and deduplication. Changes to a published
//! ConfigMap map back to its Cluster through the cluster-name label, so a
//! deleted or edited ConfigMap is restored.

use crate::config::Config;
use crate::error::ControllerError;
use crate::reconciler::Reconciler;
use cloud_config::configmap::{CLUSTER_NAME_LABEL, MANAGED_BY_LABEL, MANAGED_BY_VALUE};
use crds::Cluster;
use futures::StreamExt;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::{Api, Client, ResourceExt};
use kube_runtime::reflector::ObjectRef;
use kube_runtime::{
    controller::{self, Action, Config as ControllerConfig},
    watcher, Controller,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The Cluster a published ConfigMap belongs to
pub(crate) fn cluster_for_config_map(config_map: &ConfigMap) -> Option<ObjectRef<Cluster>> {
    config_map
        .labels()
        .get(CLUSTER_NAME_LABEL)
        .map(|name| ObjectRef::new(name))
}

/// Watch Clusters and reconcile them until the stream ends.
pub async fn watch_clusters(
    client: Client,
    reconciler: Arc<Reconciler>,
    config: &Config,
) -> Result<(), ControllerError> {
    info!("Starting Cluster watcher");

    let clusters: Api<Cluster> = Api::all(client.clone());
    let config_maps: Api<ConfigMap> = Api::all(client);

    let mut cluster_watch = watcher::Config::default();
    if let Some(selector) = &config.label_selector {
        cluster_watch = cluster_watch.labels(selector);
    }
    let config_map_watch = watcher::Config::default()
        .labels(&format!("{}={}", MANAGED_BY_LABEL, MANAGED_BY_VALUE));

    let error_policy = |cluster: Arc<Cluster>, error: &ControllerError, ctx: Arc<Reconciler>| {
        let delay = ctx.error_backoff(&cluster);
        warn!(
            "Reconciliation of Cluster {} failed: {}, retrying in {}s",
            cluster.name_any(),
            error,
            delay.as_secs()
        );
        Action::requeue(delay)
    };

    let reconcile = |cluster: Arc<Cluster>, ctx: Arc<Reconciler>| async move {
        ctx.reconcile_cluster(&cluster).await
    };

    let controller_config = ControllerConfig::default()
        .debounce(config.debounce)
        .concurrency(config.concurrency);

    Controller::new(clusters, cluster_watch)
        .watches(config_maps, config_map_watch, |cm| cluster_for_config_map(&cm))
        .with_config(controller_config)
        .shutdown_on_signal()
        .run(reconcile, error_policy, reconciler.clone())
        .for_each(|res| {
            let reconciler = reconciler.clone();
            async move {
                match res {
                    Ok((cluster, _)) => debug!("Reconciled Cluster {}", cluster.name),
                    Err(controller::Error::ObjectNotFound(cluster)) => {
                        debug!("Cluster {} is gone", cluster.name);
                        reconciler.forget_cluster(&cluster.name);
                    }
                    Err(e) => warn!("Cluster controller error: {}", e),
                }
            }
        })
        .await;

    info!("Cluster watcher stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use cloud_config::cloud_config_map;

    #[test]
    fn test_config_map_maps_to_cluster() {
        let cluster = create_test_cluster("prod-eu", Some("cluster-prod-eu"));
        let cm = cloud_config_map(&cluster, "cluster-prod-eu", "[global]\n");

        let owner = cluster_for_config_map(&cm).unwrap();
        assert_eq!(owner.name, "prod-eu");
        assert_eq!(owner.namespace, None);
    }

    #[test]
    fn test_unlabelled_config_map_is_ignored() {
        assert!(cluster_for_config_map(&ConfigMap::default()).is_none());
    }
}
