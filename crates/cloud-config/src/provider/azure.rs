//! Azure cloud config
//!
//! Rendered as compact JSON in the field order the Azure cloud provider documents.

use crate::credentials::AzureCredentials;
use crate::error::Result;
use crds::{AzureCloudSpec, DatacenterSpecAzure};
use serde::Serialize;

/// Only the public Azure cloud is supported
const AZURE_PUBLIC_CLOUD: &str = "AZUREPUBLICCLOUD";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AzureCloudConfig<'a> {
    cloud: &'static str,
    tenant_id: &'a str,
    subscription_id: &'a str,
    aad_client_id: &'a str,
    aad_client_secret: &'a str,
    resource_group: &'a str,
    location: &'a str,
    vnet_name: &'a str,
    subnet_name: &'a str,
    route_table_name: &'a str,
    security_group_name: &'a str,
    primary_availability_set_name: &'a str,
    vnet_resource_group: &'a str,
    use_instance_metadata: bool,
    load_balancer_sku: &'a str,
}

pub(super) fn compile(
    spec: &AzureCloudSpec,
    datacenter: &DatacenterSpecAzure,
    credentials: &AzureCredentials,
) -> Result<String> {
    let config = AzureCloudConfig {
        cloud: AZURE_PUBLIC_CLOUD,
        tenant_id: &credentials.tenant_id,
        subscription_id: &credentials.subscription_id,
        aad_client_id: &credentials.client_id,
        aad_client_secret: &credentials.client_secret,
        resource_group: &spec.resource_group,
        location: &datacenter.location,
        vnet_name: &spec.vnet_name,
        subnet_name: &spec.subnet_name,
        route_table_name: &spec.route_table_name,
        security_group_name: &spec.security_group,
        primary_availability_set_name: &spec.availability_set,
        vnet_resource_group: &spec.vnet_resource_group,
        use_instance_metadata: false,
        load_balancer_sku: spec.load_balancer_sku.map(|s| s.as_str()).unwrap_or_default(),
    };

    Ok(serde_json::to_string(&config)?)
}
