//! The ConfigMap that carries a compiled cloud config into the cluster namespace

use crds::Cluster;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::api::ObjectMeta;
use kube::{Resource, ResourceExt};
use std::collections::BTreeMap;

/// Name of the ConfigMap in the cluster namespace
pub const CLOUD_CONFIG_CONFIGMAP_NAME: &str = "cloud-config";

/// Data key holding the payload
pub const CLOUD_CONFIG_KEY: &str = "config";

pub const MANAGED_BY_LABEL: &str = "app.kubernetes.io/managed-by";
pub const MANAGED_BY_VALUE: &str = "clusterops";
pub const CLUSTER_NAME_LABEL: &str = "platform.microscaler.io/cluster-name";

/// Build the cloud-config ConfigMap for `cluster` in `namespace`.
///
/// The Cluster becomes the controlling owner when it has a UID, so the
/// ConfigMap is garbage collected with it.
pub fn cloud_config_map(cluster: &Cluster, namespace: &str, payload: &str) -> ConfigMap {
    let labels = BTreeMap::from([
        (MANAGED_BY_LABEL.to_string(), MANAGED_BY_VALUE.to_string()),
        (CLUSTER_NAME_LABEL.to_string(), cluster.name_any()),
    ]);

    ConfigMap {
        metadata: ObjectMeta {
            name: Some(CLOUD_CONFIG_CONFIGMAP_NAME.to_string()),
            namespace: Some(namespace.to_string()),
            labels: Some(labels),
            owner_references: cluster.controller_owner_ref(&()).map(|r| vec![r]),
            ..Default::default()
        },
        data: Some(BTreeMap::from([(
            CLOUD_CONFIG_KEY.to_string(),
            payload.to_string(),
        )])),
        ..Default::default()
    }
}
