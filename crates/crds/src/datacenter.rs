//! Datacenter CRD
//!
//! Operator-provided, region scoped settings. A Datacenter carries one optional
//! section per cloud provider; clusters reference it by name and only the
//! section matching the cluster's provider is read. KubeVirt needs no
//! datacenter settings.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[kube(
    group = "platform.microscaler.io",
    version = "v1alpha1",
    kind = "Datacenter"
)]
#[serde(rename_all = "camelCase")]
pub struct DatacenterSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws: Option<DatacenterSpecAws>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azure: Option<DatacenterSpecAzure>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openstack: Option<DatacenterSpecOpenstack>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vsphere: Option<DatacenterSpecVSphere>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gcp: Option<DatacenterSpecGcp>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DatacenterSpecAws {
    /// AWS region (e.g. "eu-central-1")
    pub region: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DatacenterSpecAzure {
    /// Azure location (e.g. "westeurope")
    pub location: String,
}

/// OpenStack datacenter settings
///
/// `use_octavia`, `trust_device_path` and `manage_security_groups` are
/// three-state: unset values resolve to a provider specific default.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DatacenterSpecOpenstack {
    /// Keystone endpoint
    pub auth_url: String,

    pub region: String,

    /// Default for clusters that do not set `useOctavia` themselves
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_octavia: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust_device_path: Option<bool>,

    #[serde(default)]
    pub ignore_volume_az: bool,

    /// Let the cloud provider manage load balancer security groups (default true)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manage_security_groups: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DatacenterSpecVSphere {
    /// vCenter URL (e.g. "https://vcenter.example.com")
    pub endpoint: String,

    /// Skip TLS verification of the vCenter endpoint
    #[serde(default)]
    pub allow_insecure: bool,

    /// vSphere datacenter name
    pub datacenter: String,

    /// Compute cluster; doubles as the legacy CSI cluster ID
    #[serde(default)]
    pub cluster: String,

    /// Datastore used when the cluster does not pick one
    #[serde(default)]
    pub default_datastore: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DatacenterSpecGcp {
    /// GCP region (e.g. "europe-west3")
    pub region: String,

    /// Zone suffixes available in the region (e.g. ["a", "b"])
    #[serde(default)]
    pub zone_suffixes: Vec<String>,

    /// Regional (multi-master) cluster
    #[serde(default)]
    pub regional: bool,
}
