//! Shared builders for the compiler integration tests

#![allow(dead_code)]

use base64::{engine::general_purpose::STANDARD, Engine};
use cloud_config::Credentials;
use crds::*;
use std::collections::BTreeMap;

pub fn cluster(name: &str, provider: Option<CloudProvider>) -> Cluster {
    let mut cluster = Cluster::new(
        name,
        ClusterSpec {
            version: "1.30.2".to_string(),
            cloud: CloudSpec {
                datacenter_name: "europe-west".to_string(),
                credentials_reference: Some(SecretReference::new(
                    format!("credential-{}", name),
                    "clusterops",
                )),
                provider,
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

pub fn datacenter() -> DatacenterSpec {
    DatacenterSpec {
        aws: Some(DatacenterSpecAws {
            region: "eu-west-1".to_string(),
        }),
        azure: Some(DatacenterSpecAzure {
            location: "northeurope".to_string(),
        }),
        openstack: Some(DatacenterSpecOpenstack {
            auth_url: "https://identity.example.org/v3".to_string(),
            region: "fra1".to_string(),
            use_octavia: Some(true),
            trust_device_path: None,
            ignore_volume_az: true,
            manage_security_groups: None,
        }),
        vsphere: Some(DatacenterSpecVSphere {
            endpoint: "https://vc.example.org:8443".to_string(),
            allow_insecure: true,
            datacenter: "Datacenter".to_string(),
            cluster: "Cluster".to_string(),
            default_datastore: "datastore1".to_string(),
        }),
        gcp: Some(DatacenterSpecGcp {
            region: "us-central1".to_string(),
            zone_suffixes: vec!["a".to_string()],
            regional: false,
        }),
    }
}

/// Secret data as the controller would read it for `kind`
pub fn secret_data(kind: ProviderKind) -> BTreeMap<String, String> {
    let pairs: Vec<(&str, String)> = match kind {
        ProviderKind::Aws | ProviderKind::Kubevirt => vec![],
        ProviderKind::Azure => vec![
            ("tenantID", "t-1".to_string()),
            ("subscriptionID", "s-1".to_string()),
            ("clientID", "c-1".to_string()),
            ("clientSecret", "secret-1".to_string()),
        ],
        ProviderKind::Openstack => vec![
            ("username", "os-user".to_string()),
            ("password", "os-pass".to_string()),
            ("domain", "default".to_string()),
            ("project", "tenant-a".to_string()),
        ],
        ProviderKind::Vsphere => vec![
            ("username", "vs-user".to_string()),
            ("password", "vs-pass".to_string()),
        ],
        ProviderKind::Gcp => vec![(
            "serviceAccount",
            STANDARD.encode(r#"{"project_id":"my-project","type":"service_account"}"#),
        )],
    };
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

pub fn credentials(kind: ProviderKind) -> Credentials {
    Credentials::from_secret_data(kind, &secret_data(kind)).unwrap()
}

/// One cluster per provider
pub fn all_providers() -> Vec<CloudProvider> {
    vec![
        CloudProvider::Aws(AwsCloudSpec {
            vpc_id: "vpc-1".to_string(),
            ..Default::default()
        }),
        CloudProvider::Azure(AzureCloudSpec {
            resource_group: "rg-1".to_string(),
            ..Default::default()
        }),
        CloudProvider::Openstack(OpenstackCloudSpec::default()),
        CloudProvider::Vsphere(VSphereCloudSpec {
            folder: "/Datacenter/vm/clusters".to_string(),
            ..Default::default()
        }),
        CloudProvider::Gcp(GcpCloudSpec::default()),
        CloudProvider::Kubevirt(KubevirtCloudSpec {}),
    ]
}
