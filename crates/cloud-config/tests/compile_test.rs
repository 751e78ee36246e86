//! End-to-end tests for the cloud config compiler

mod common;

use cloud_config::{compile, CloudConfigError, Credentials};
use common::*;
use crds::*;

#[test]
fn test_gcp_end_to_end() {
    let c = cluster("test-1", Some(CloudProvider::Gcp(GcpCloudSpec::default())));

    let payload = compile(&c, &datacenter(), &credentials(ProviderKind::Gcp)).unwrap();

    assert!(payload.starts_with("[global]\n"));
    assert!(payload.contains("project-id = \"my-project\"\n"));
    assert!(payload.contains("local-zone = \"us-central1-a\"\n"));
    assert!(payload.contains("network-name = \"default\"\n"));
    assert!(payload.contains("multizone = true\n"));
    assert!(payload.contains("node-tags = \"kubernetes-cluster-test-1\"\n"));
}

#[test]
fn test_every_provider_compiles() {
    for provider in all_providers() {
        let kind = provider.kind();
        let c = cluster("multi", Some(provider));

        let payload = compile(&c, &datacenter(), &credentials(kind))
            .unwrap_or_else(|e| panic!("{} failed to compile: {}", kind, e));
        assert!(!payload.is_empty(), "{} produced an empty payload", kind);
    }
}

#[test]
fn test_compile_is_deterministic() {
    for provider in all_providers() {
        let kind = provider.kind();
        let c = cluster("repeat", Some(provider));
        let dc = datacenter();
        let creds = credentials(kind);

        let first = compile(&c, &dc, &creds).unwrap();
        let second = compile(&c, &dc, &creds).unwrap();
        assert_eq!(first, second, "{} output differs between calls", kind);
    }
}

#[test]
fn test_no_provider_is_empty() {
    let c = cluster("bring-your-own", None);
    let payload = compile(&c, &datacenter(), &Credentials::default()).unwrap();
    assert_eq!(payload, "");
}

#[test]
fn test_provider_credentials_reach_payload() {
    let c = cluster("vs", Some(CloudProvider::Vsphere(VSphereCloudSpec::default())));
    let payload = compile(&c, &datacenter(), &credentials(ProviderKind::Vsphere)).unwrap();

    assert!(payload.contains("[VirtualCenter \"vc.example.org\"]\n"));
    assert!(payload.contains("user = \"vs-user\"\n"));
    assert!(payload.contains("port = \"8443\"\n"));
    assert!(payload.contains("insecure-flag = true\n"));

    let c = cluster("az", Some(CloudProvider::Azure(AzureCloudSpec::default())));
    let payload = compile(&c, &datacenter(), &credentials(ProviderKind::Azure)).unwrap();
    let json: serde_json::Value = serde_json::from_str(&payload).unwrap();
    assert_eq!(json["aadClientSecret"], "secret-1");
    assert_eq!(json["location"], "northeurope");
}

#[test]
fn test_gcp_errors() {
    let c = cluster("gcp", Some(CloudProvider::Gcp(GcpCloudSpec::default())));

    let mut dc = datacenter();
    dc.gcp.as_mut().unwrap().zone_suffixes.clear();
    let err = compile(&c, &dc, &credentials(ProviderKind::Gcp)).unwrap_err();
    assert!(matches!(err, CloudConfigError::MissingZoneSuffixes));

    let mut creds = credentials(ProviderKind::Gcp);
    creds.gcp.service_account = "definitely not base64!".to_string();
    let err = compile(&c, &datacenter(), &creds).unwrap_err();
    assert!(matches!(err, CloudConfigError::InvalidServiceAccount(_)));
}

#[test]
fn test_missing_credentials_key() {
    let mut data = secret_data(ProviderKind::Azure);
    data.remove("clientSecret");

    let err = Credentials::from_secret_data(ProviderKind::Azure, &data).unwrap_err();
    assert!(matches!(
        err,
        CloudConfigError::MissingCredential {
            provider: ProviderKind::Azure,
            key: "clientSecret"
        }
    ));
}
