//! Cloud provider settings for a Cluster
//!
//! A cluster runs on at most one cloud provider. The provider is modelled as an
//! externally tagged enum, so a manifest naming two providers is rejected at
//! deserialization time and "no provider" is an explicit `None`.

use crate::references::SecretReference;
use schemars::{json_schema, JsonSchema, Schema, SchemaGenerator};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cloud settings of a cluster
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CloudSpec {
    /// Name of the Datacenter resource the cluster is scheduled into
    pub datacenter_name: String,

    /// Secret holding the provider credentials (not needed for AWS and KubeVirt)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials_reference: Option<SecretReference>,

    /// Provider specific settings; `None` for clusters without a cloud provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "provider_schema")]
    pub provider: Option<CloudProvider>,
}

/// Structural schema for `CloudSpec::provider`.
///
/// The derived schema of an optional externally tagged enum nests `nullable`
/// inside `anyOf`, which the API server rejects. Each provider becomes a
/// property of one object instead, limited to a single key.
fn provider_schema(generator: &mut SchemaGenerator) -> Schema {
    json_schema!({
        "type": "object",
        "nullable": true,
        "maxProperties": 1,
        "properties": {
            "aws": generator.subschema_for::<AwsCloudSpec>(),
            "azure": generator.subschema_for::<AzureCloudSpec>(),
            "openstack": generator.subschema_for::<OpenstackCloudSpec>(),
            "vsphere": generator.subschema_for::<VSphereCloudSpec>(),
            "gcp": generator.subschema_for::<GcpCloudSpec>(),
            "kubevirt": generator.subschema_for::<KubevirtCloudSpec>(),
        }
    })
}

/// Provider specific cluster settings (exactly one provider)
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum CloudProvider {
    Aws(AwsCloudSpec),
    Azure(AzureCloudSpec),
    Openstack(OpenstackCloudSpec),
    Vsphere(VSphereCloudSpec),
    Gcp(GcpCloudSpec),
    Kubevirt(KubevirtCloudSpec),
}

impl CloudProvider {
    /// The kind of this provider
    pub fn kind(&self) -> ProviderKind {
        match self {
            CloudProvider::Aws(_) => ProviderKind::Aws,
            CloudProvider::Azure(_) => ProviderKind::Azure,
            CloudProvider::Openstack(_) => ProviderKind::Openstack,
            CloudProvider::Vsphere(_) => ProviderKind::Vsphere,
            CloudProvider::Gcp(_) => ProviderKind::Gcp,
            CloudProvider::Kubevirt(_) => ProviderKind::Kubevirt,
        }
    }
}

/// Provider discriminator without the provider settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Aws,
    Azure,
    Openstack,
    Vsphere,
    Gcp,
    Kubevirt,
}

impl ProviderKind {
    /// Lowercase provider name, as used in manifests and metric labels
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Aws => "aws",
            ProviderKind::Azure => "azure",
            ProviderKind::Openstack => "openstack",
            ProviderKind::Vsphere => "vsphere",
            ProviderKind::Gcp => "gcp",
            ProviderKind::Kubevirt => "kubevirt",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// AWS cluster settings
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AwsCloudSpec {
    /// VPC the cluster nodes run in
    #[serde(default)]
    pub vpc_id: String,

    /// Route table used for pod routes
    #[serde(default)]
    pub route_table_id: String,

    /// IAM role assumed by the control plane (cross-account access)
    #[serde(default)]
    pub control_plane_role_arn: String,
}

/// Azure cluster settings
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AzureCloudSpec {
    #[serde(default)]
    pub resource_group: String,

    #[serde(default)]
    pub vnet_resource_group: String,

    #[serde(default)]
    pub vnet_name: String,

    #[serde(default)]
    pub subnet_name: String,

    #[serde(default)]
    pub route_table_name: String,

    #[serde(default)]
    pub security_group: String,

    #[serde(default)]
    pub availability_set: String,

    /// Load balancer SKU (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_balancer_sku: Option<AzureLoadBalancerSku>,
}

/// Azure load balancer SKU
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AzureLoadBalancerSku {
    Basic,
    Standard,
}

impl AzureLoadBalancerSku {
    pub fn as_str(&self) -> &'static str {
        match self {
            AzureLoadBalancerSku::Basic => "basic",
            AzureLoadBalancerSku::Standard => "standard",
        }
    }
}

/// OpenStack cluster settings
///
/// All fields are optional: an unset value means "fall back to the datacenter
/// default" (`use_octavia`) or "do not emit" (ingress hostname settings).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OpenstackCloudSpec {
    /// Overrides the datacenter's Octavia setting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_octavia: Option<bool>,

    /// Publish load balancer hostnames instead of IPs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_ingress_hostname: Option<bool>,

    /// Suffix appended to generated ingress hostnames
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingress_hostname_suffix: Option<String>,
}

/// vSphere cluster settings
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VSphereCloudSpec {
    /// Datastore for volumes; takes precedence over `datastore_cluster`
    #[serde(default)]
    pub datastore: String,

    /// Datastore cluster for volumes
    #[serde(default)]
    pub datastore_cluster: String,

    /// VM folder
    #[serde(default)]
    pub folder: String,
}

/// GCP cluster settings
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GcpCloudSpec {
    /// VPC network name; empty means the default network
    #[serde(default)]
    pub network: String,

    #[serde(default)]
    pub subnetwork: String,
}

/// KubeVirt cluster settings
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct KubevirtCloudSpec {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_deserializes_single_variant() {
        let spec: CloudSpec = serde_json::from_value(serde_json::json!({
            "datacenterName": "eu-west",
            "provider": { "aws": { "vpcId": "vpc-1" } }
        }))
        .unwrap();

        let provider = spec.provider.unwrap();
        assert_eq!(provider.kind(), ProviderKind::Aws);
        match provider {
            CloudProvider::Aws(aws) => assert_eq!(aws.vpc_id, "vpc-1"),
            other => panic!("unexpected provider {:?}", other),
        }
    }

    #[test]
    fn test_provider_rejects_two_variants() {
        let result: Result<CloudSpec, _> = serde_json::from_value(serde_json::json!({
            "datacenterName": "eu-west",
            "provider": { "aws": {}, "gcp": {} }
        }));
        assert!(result.is_err(), "two providers must not deserialize");
    }

    #[test]
    fn test_provider_absent_is_none() {
        let spec: CloudSpec = serde_json::from_value(serde_json::json!({
            "datacenterName": "byo"
        }))
        .unwrap();
        assert!(spec.provider.is_none());
    }

    #[test]
    fn test_openstack_three_state_fields() {
        let spec: OpenstackCloudSpec =
            serde_json::from_value(serde_json::json!({ "useOctavia": false })).unwrap();
        assert_eq!(spec.use_octavia, Some(false));
        assert_eq!(spec.enable_ingress_hostname, None);
        assert_eq!(spec.ingress_hostname_suffix, None);
    }

    #[test]
    fn test_azure_sku_text() {
        assert_eq!(AzureLoadBalancerSku::Standard.as_str(), "standard");
        let sku: AzureLoadBalancerSku = serde_json::from_str("\"basic\"").unwrap();
        assert_eq!(sku, AzureLoadBalancerSku::Basic);
    }
}
