//! Cluster CRD
//!
//! Declares a user cluster: its Kubernetes version, networking, feature flags
//! and the cloud provider it runs on.

use crate::cloud::CloudSpec;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Feature flag: use the cluster name as the vSphere CSI cluster ID.
///
/// Enabled by default for new vSphere clusters. Older clusters keep the
/// datacenter's compute cluster name until they are migrated by hand.
pub const FEATURE_VSPHERE_CSI_CLUSTER_ID: &str = "vsphereCSIClusterID";

/// Feature flag: the cluster runs the external cloud-controller-manager.
pub const FEATURE_EXTERNAL_CLOUD_PROVIDER: &str = "externalCloudProvider";

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "platform.microscaler.io",
    version = "v1alpha1",
    kind = "Cluster",
    status = "ClusterStatus",
    printcolumn = r#"{"name":"Version","type":"string","jsonPath":".spec.version"}"#,
    printcolumn = r#"{"name":"Datacenter","type":"string","jsonPath":".spec.cloud.datacenterName"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSpec {
    /// Desired Kubernetes version (e.g. "1.29.4")
    pub version: String,

    /// Cloud provider settings
    pub cloud: CloudSpec,

    /// Cluster networking
    #[serde(default)]
    pub cluster_network: ClusterNetwork,

    /// Feature flags, keyed by flag name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub features: BTreeMap<String, bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterNetwork {
    /// IP family of the cluster nodes
    #[serde(default)]
    pub ip_family: IpFamily,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
pub enum IpFamily {
    /// IPv4 only
    #[default]
    #[serde(rename = "IPv4")]
    IPv4,

    /// IPv4 and IPv6
    #[serde(rename = "IPv4+IPv6")]
    DualStack,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClusterStatus {
    /// Namespace hosting the cluster's control plane
    #[serde(default)]
    pub namespace_name: String,

    /// Observed component versions
    #[serde(default)]
    pub versions: ClusterVersionsStatus,

    /// State of the compiled cloud config
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_config: Option<CloudConfigStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClusterVersionsStatus {
    /// Version the control plane currently runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_plane: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct CloudConfigStatus {
    pub state: CloudConfigState,

    /// ConfigMap holding the compiled cloud config
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_map: Option<String>,

    /// Error message if compiling failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Last reconciliation timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reconciled: Option<chrono::DateTime<chrono::Utc>>,
}

/// Cloud config compilation state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "PascalCase")]
pub enum CloudConfigState {
    #[default]
    Pending,

    /// Cloud config compiled and stored
    Ready,

    /// The provider needs no cloud config
    NotRequired,

    /// Compiling failed; see `error`
    Failed,
}

impl Cluster {
    /// Whether the nodes use both IPv4 and IPv6
    pub fn is_dual_stack(&self) -> bool {
        self.spec.cluster_network.ip_family == IpFamily::DualStack
    }

    /// Whether the named feature flag is set to true
    pub fn has_feature(&self, feature: &str) -> bool {
        self.spec.features.get(feature).copied().unwrap_or(false)
    }

    /// Whether the cluster runs the external cloud-controller-manager
    pub fn external_cloud_provider_enabled(&self) -> bool {
        self.has_feature(FEATURE_EXTERNAL_CLOUD_PROVIDER)
    }

    /// Namespace assigned to the control plane, if any
    pub fn namespace_name(&self) -> Option<&str> {
        self.status
            .as_ref()
            .map(|s| s.namespace_name.as_str())
            .filter(|ns| !ns.is_empty())
    }

    /// Observed control-plane version, falling back to the desired version
    pub fn control_plane_version(&self) -> &str {
        self.status
            .as_ref()
            .and_then(|s| s.versions.control_plane.as_deref())
            .unwrap_or(&self.spec.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster(features: &[(&str, bool)]) -> Cluster {
        Cluster::new(
            "test-1",
            ClusterSpec {
                version: "1.29.4".to_string(),
                cloud: CloudSpec::default(),
                cluster_network: ClusterNetwork::default(),
                features: features
                    .iter()
                    .map(|(k, v)| (k.to_string(), *v))
                    .collect(),
            },
        )
    }

    #[test]
    fn test_has_feature_defaults_to_false() {
        let c = cluster(&[(FEATURE_VSPHERE_CSI_CLUSTER_ID, false)]);
        assert!(!c.has_feature(FEATURE_VSPHERE_CSI_CLUSTER_ID));
        assert!(!c.has_feature("unknown"));

        let c = cluster(&[(FEATURE_EXTERNAL_CLOUD_PROVIDER, true)]);
        assert!(c.external_cloud_provider_enabled());
    }

    #[test]
    fn test_ip_family_serialization() {
        let net: ClusterNetwork =
            serde_json::from_value(serde_json::json!({ "ipFamily": "IPv4+IPv6" })).unwrap();
        assert_eq!(net.ip_family, IpFamily::DualStack);
        assert_eq!(ClusterNetwork::default().ip_family, IpFamily::IPv4);
    }

    #[test]
    fn test_control_plane_version_fallback() {
        let mut c = cluster(&[]);
        assert_eq!(c.control_plane_version(), "1.29.4");

        c.status = Some(ClusterStatus {
            versions: ClusterVersionsStatus {
                control_plane: Some("1.28.9".to_string()),
            },
            ..Default::default()
        });
        assert_eq!(c.control_plane_version(), "1.28.9");
    }

    #[test]
    fn test_namespace_name_empty_is_none() {
        let mut c = cluster(&[]);
        assert_eq!(c.namespace_name(), None);

        c.status = Some(ClusterStatus::default());
        assert_eq!(c.namespace_name(), None);

        c.status = Some(ClusterStatus {
            namespace_name: "cluster-test-1".to_string(),
            ..Default::default()
        });
        assert_eq!(c.namespace_name(), Some("cluster-test-1"));
    }

    /// Whether `nullable` appears anywhere below an `anyOf`/`oneOf`/`allOf`
    fn nullable_under_junctor(schema: &serde_json::Value, in_junctor: bool) -> bool {
        match schema {
            serde_json::Value::Object(map) => map.iter().any(|(key, value)| {
                (in_junctor && key == "nullable")
                    || nullable_under_junctor(
                        value,
                        in_junctor || matches!(key.as_str(), "anyOf" | "oneOf" | "allOf"),
                    )
            }),
            serde_json::Value::Array(items) => {
                items.iter().any(|item| nullable_under_junctor(item, in_junctor))
            }
            _ => false,
        }
    }

    #[test]
    fn test_crd_schema_is_structural() {
        use kube::CustomResourceExt;

        let crd = serde_json::to_value(Cluster::crd()).unwrap();
        let schema = &crd["spec"]["versions"][0]["schema"]["openAPIV3Schema"];
        assert!(schema.is_object());
        assert!(!nullable_under_junctor(schema, false));

        let provider = &schema["properties"]["spec"]["properties"]["cloud"]["properties"]["provider"];
        assert_eq!(provider["type"], "object");
        assert_eq!(provider["nullable"], true);
        assert_eq!(provider["maxProperties"], 1);
        for kind in ["aws", "azure", "openstack", "vsphere", "gcp", "kubevirt"] {
            assert!(provider["properties"][kind].is_object(), "missing {}", kind);
        }
        assert_eq!(
            provider["properties"]["aws"]["properties"]["vpcId"]["type"],
            "string"
        );
    }
}
