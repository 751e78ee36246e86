//! Provider dispatch
//!
//! [`compile`] picks the builder matching the cluster's cloud provider. Each
//! provider module owns a private model of its cloud config, fills it from the
//! cluster, datacenter and credentials, and renders it in the format the
//! provider's cloud-controller-manager reads:
//!
//! | Provider  | Format |
//! |-----------|--------|
//! | AWS       | INI (`[global]`) |
//! | Azure     | JSON |
//! | OpenStack | INI (`[Global]`, `[LoadBalancer]`, `[BlockStorage]`) |
//! | vSphere   | INI with a `[VirtualCenter "<host>"]` map |
//! | GCP       | INI (`[global]`) |
//! | KubeVirt  | YAML |

mod aws;
mod azure;
mod gcp;
mod kubevirt;
mod openstack;
mod vsphere;

use crate::credentials::Credentials;
use crate::error::{CloudConfigError, Result};
use crds::{CloudProvider, Cluster, DatacenterSpec, ProviderKind};
use kube::ResourceExt;
use semver::Version;
use tracing::debug;

/// Compile the cloud config of `cluster`.
///
/// Returns an empty string when the cluster has no cloud provider: such
/// clusters need no cloud config, which is not an error. The inputs are only
/// read; identical inputs always produce identical output.
pub fn compile(
    cluster: &Cluster,
    datacenter: &DatacenterSpec,
    credentials: &Credentials,
) -> Result<String> {
    let name = cluster.name_any();
    let Some(provider) = &cluster.spec.cloud.provider else {
        debug!("Cluster {} has no cloud provider, no cloud config needed", name);
        return Ok(String::new());
    };

    let kind = provider.kind();
    debug!("Compiling {} cloud config for cluster {}", kind, name);

    match provider {
        CloudProvider::Aws(spec) => {
            aws::compile(cluster, spec, datacenter_section(datacenter.aws.as_ref(), kind)?)
        }
        CloudProvider::Azure(spec) => azure::compile(
            spec,
            datacenter_section(datacenter.azure.as_ref(), kind)?,
            &credentials.azure,
        ),
        CloudProvider::Openstack(spec) => openstack::compile(
            cluster,
            spec,
            datacenter_section(datacenter.openstack.as_ref(), kind)?,
            &credentials.openstack,
        ),
        CloudProvider::Vsphere(spec) => vsphere::compile(
            cluster,
            spec,
            datacenter_section(datacenter.vsphere.as_ref(), kind)?,
            &credentials.vsphere,
        ),
        CloudProvider::Gcp(spec) => gcp::compile(
            cluster,
            spec,
            datacenter_section(datacenter.gcp.as_ref(), kind)?,
            &credentials.gcp,
        ),
        CloudProvider::Kubevirt(_) => kubevirt::compile(cluster),
    }
}

fn datacenter_section<T>(section: Option<&T>, kind: ProviderKind) -> Result<&T> {
    section.ok_or(CloudConfigError::MissingDatacenterSpec(kind))
}

/// Parse a Kubernetes version, tolerating a leading `v`
pub(crate) fn parse_version(version: &str) -> Result<Version> {
    let trimmed = version.trim();
    let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
    Version::parse(trimmed).map_err(|source| CloudConfigError::InvalidVersion {
        version: version.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use crds::{AwsCloudSpec, KubevirtCloudSpec};

    #[test]
    fn test_no_provider_compiles_to_empty() {
        let mut c = cluster("byo", CloudProvider::Kubevirt(KubevirtCloudSpec {}));
        c.spec.cloud.provider = None;

        let payload = compile(&c, &datacenter(), &credentials()).unwrap();
        assert!(payload.is_empty());
    }

    #[test]
    fn test_missing_datacenter_section() {
        let c = cluster("aws-1", CloudProvider::Aws(AwsCloudSpec::default()));
        let dc = DatacenterSpec::default();

        let err = compile(&c, &dc, &credentials()).unwrap_err();
        assert!(matches!(
            err,
            CloudConfigError::MissingDatacenterSpec(ProviderKind::Aws)
        ));
    }

    #[test]
    fn test_parse_version_variants() {
        assert_eq!(parse_version("1.27.3").unwrap().minor, 27);
        assert_eq!(parse_version("v1.26.0").unwrap().minor, 26);
        assert!(matches!(
            parse_version("latest"),
            Err(CloudConfigError::InvalidVersion { .. })
        ));
    }
}
