//! Test utilities for building compiler inputs
//!
//! All fixtures are fully populated so a test only changes the field it is about.

use crate::credentials::*;
use base64::{engine::general_purpose::STANDARD, Engine};
use crds::*;
use std::collections::BTreeMap;

/// Cluster named `name` on `provider`, version 1.29.4, with an assigned namespace
pub fn cluster(name: &str, provider: CloudProvider) -> Cluster {
    let mut cluster = Cluster::new(
        name,
        ClusterSpec {
            version: "1.29.4".to_string(),
            cloud: CloudSpec {
                datacenter_name: "test-dc".to_string(),
                credentials_reference: None,
                provider: Some(provider),
            },
            cluster_network: ClusterNetwork::default(),
            features: BTreeMap::new(),
        },
    );
    cluster.status = Some(ClusterStatus {
        namespace_name: format!("cluster-{}", name),
        ..Default::default()
    });
    cluster
}

/// Datacenter with settings for every provider
pub fn datacenter() -> DatacenterSpec {
    DatacenterSpec {
        aws: Some(DatacenterSpecAws {
            region: "eu-central-1".to_string(),
        }),
        azure: Some(DatacenterSpecAzure {
            location: "westeurope".to_string(),
        }),
        openstack: Some(DatacenterSpecOpenstack {
            auth_url: "https://keystone.example.com:5000/v3".to_string(),
            region: "RegionOne".to_string(),
            use_octavia: None,
            trust_device_path: None,
            ignore_volume_az: false,
            manage_security_groups: None,
        }),
        vsphere: Some(DatacenterSpecVSphere {
            endpoint: "https://vcenter.example.com".to_string(),
            allow_insecure: false,
            datacenter: "dc-1".to_string(),
            cluster: "compute-cluster".to_string(),
            default_datastore: "default-ds".to_string(),
        }),
        gcp: Some(DatacenterSpecGcp {
            region: "us-central1".to_string(),
            zone_suffixes: vec!["a".to_string()],
            regional: false,
        }),
    }
}

/// Base64 encoding of `json`, as stored in a GCP credentials Secret
pub fn service_account(json: &str) -> String {
    STANDARD.encode(json)
}

/// Credentials for every provider
pub fn credentials() -> Credentials {
    Credentials {
        azure: AzureCredentials {
            tenant_id: "tenant".to_string(),
            subscription_id: "subscription".to_string(),
            client_id: "client".to_string(),
            client_secret: "client-secret".to_string(),
        },
        openstack: OpenstackCredentials {
            username: "demo".to_string(),
            password: "demo-pass".to_string(),
            domain: "Default".to_string(),
            project: "demo-project".to_string(),
            project_id: "0123456789".to_string(),
            application_credential_id: String::new(),
            application_credential_secret: String::new(),
        },
        vsphere: VSphereCredentials {
            username: "administrator@vsphere.local".to_string(),
            password: "vc-pass".to_string(),
        },
        gcp: GcpCredentials {
            service_account: service_account(r#"{"project_id":"proj-x"}"#),
        },
    }
}
