//! Test utilities for building Kubernetes objects

use crds::*;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use kube::api::ObjectMeta;
use std::collections::BTreeMap;

/// Helper to create a test GCP Cluster, optionally with an assigned namespace
pub fn create_test_cluster(name: &str, namespace: Option<&str>) -> Cluster {
    let mut cluster = Cluster::new(
        name,
        ClusterSpec {
            version: "1.30.1".to_string(),
            cloud: CloudSpec {
                datacenter_name: "gcp-us".to_string(),
                credentials_reference: Some(SecretReference::new("gcp-credentials", "clusterops")),
                provider: Some(CloudProvider::Gcp(GcpCloudSpec::default())),
            },
            cluster_network: ClusterNetwork::default(),
            features: BTreeMap::new(),
        },
    );
    cluster.metadata.uid = Some(format!("uid-{}", name));
    cluster.status = namespace.map(|ns| ClusterStatus {
        namespace_name: ns.to_string(),
        ..Default::default()
    });
    cluster
}

/// Helper to create a test Secret from raw key/value pairs
pub fn create_test_secret(name: &str, data: &[(&str, &[u8])]) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some("clusterops".to_string()),
            ..Default::default()
        },
        data: Some(
            data.iter()
                .map(|(k, v)| (k.to_string(), ByteString(v.to_vec())))
                .collect(),
        ),
        ..Default::default()
    }
}
