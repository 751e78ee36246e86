//! vSphere cloud config
//!
//! The vSphere provider reads the vCenter address, credentials and datacenter
//! from three places: `[Global]`, `[Workspace]` and a `[VirtualCenter "<host>"]`
//! entry. The `[Global]` fields are deprecated upstream but the provider still
//! refuses to start without them, so all three sections are rendered from one
//! [`VCenterIdentity`] and can never disagree.

use crate::credentials::VSphereCredentials;
use crate::error::{CloudConfigError, Result};
use crate::ini::IniWriter;
use crds::{Cluster, DatacenterSpecVSphere, VSphereCloudSpec, FEATURE_VSPHERE_CSI_CLUSTER_ID};
use kube::ResourceExt;
use url::{Host, Url};

const DEFAULT_VCENTER_PORT: &str = "443";
const SCSI_CONTROLLER_TYPE: &str = "pvscsi";
const DUAL_STACK_IP_FAMILY: &str = "ipv4,ipv6";

/// The vCenter connection shared by all sections
#[derive(Debug)]
struct VCenterIdentity<'a> {
    host: String,
    port: String,
    user: &'a str,
    password: &'a str,
    datacenter: &'a str,
    datastore: &'a str,
}

#[derive(Debug)]
struct VSphereCloudConfig<'a> {
    vcenter: VCenterIdentity<'a>,
    insecure: bool,
    working_dir: String,
    cluster_id: String,
    folder: &'a str,
    ip_family: Option<&'static str>,
}

pub(super) fn compile(
    cluster: &Cluster,
    spec: &VSphereCloudSpec,
    datacenter: &DatacenterSpecVSphere,
    credentials: &VSphereCredentials,
) -> Result<String> {
    let (host, port) = parse_endpoint(&datacenter.endpoint)?;

    let config = VSphereCloudConfig {
        vcenter: VCenterIdentity {
            host,
            port,
            user: &credentials.username,
            password: &credentials.password,
            datacenter: &datacenter.datacenter,
            datastore: resolve_datastore(spec, datacenter),
        },
        insecure: datacenter.allow_insecure,
        working_dir: cluster.name_any(),
        cluster_id: resolve_cluster_id(cluster, datacenter),
        folder: &spec.folder,
        ip_family: (cluster.is_dual_stack() && cluster.external_cloud_provider_enabled())
            .then_some(DUAL_STACK_IP_FAMILY),
    };

    config.render()
}

/// Host name and port of the vCenter endpoint; the port defaults to 443.
fn parse_endpoint(endpoint: &str) -> Result<(String, String)> {
    let invalid = |reason: String| CloudConfigError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason,
    };

    let url = Url::parse(endpoint).map_err(|e| invalid(e.to_string()))?;
    let host = match url.host() {
        // Display would wrap the address in brackets
        Some(Host::Ipv6(addr)) => addr.to_string(),
        Some(host) => host.to_string(),
        None => return Err(invalid("missing host".to_string())),
    };
    // Url::port() hides a port equal to the scheme default, e.g. http://vc:80
    let port = match url.port() {
        Some(port) => port.to_string(),
        None if has_explicit_port(endpoint) => url
            .port_or_known_default()
            .map_or_else(|| DEFAULT_VCENTER_PORT.to_string(), |p| p.to_string()),
        None => DEFAULT_VCENTER_PORT.to_string(),
    };

    Ok((host, port))
}

/// Whether the authority of `endpoint` spells out a port
fn has_explicit_port(endpoint: &str) -> bool {
    let Some((_, rest)) = endpoint.split_once("://") else {
        return false;
    };
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority.rsplit('@').next().unwrap_or_default();

    match host_port.rfind(']') {
        Some(end) => host_port[end + 1..].starts_with(':'),
        None => host_port.contains(':'),
    }
}

/// Cluster datastore, then cluster datastore cluster, then the datacenter default.
fn resolve_datastore<'a>(spec: &'a VSphereCloudSpec, datacenter: &'a DatacenterSpecVSphere) -> &'a str {
    [spec.datastore.as_str(), spec.datastore_cluster.as_str()]
        .into_iter()
        .find(|ds| !ds.is_empty())
        .unwrap_or(&datacenter.default_datastore)
}

/// CSI cluster ID: the cluster name when the feature flag is set, else the
/// datacenter's compute cluster (clusters created before the flag existed).
fn resolve_cluster_id(cluster: &Cluster, datacenter: &DatacenterSpecVSphere) -> String {
    if cluster.has_feature(FEATURE_VSPHERE_CSI_CLUSTER_ID) {
        cluster.name_any()
    } else {
        datacenter.cluster.clone()
    }
}

impl VSphereCloudConfig<'_> {
    fn render(&self) -> Result<String> {
        let vc = &self.vcenter;
        let mut w = IniWriter::spaced();

        w.section("Global")?;
        w.string("user", vc.user)?;
        w.string("password", vc.password)?;
        w.string("port", &vc.port)?;
        w.bare("insecure-flag", self.insecure)?;
        w.string("working-dir", &self.working_dir)?;
        w.string("datacenter", vc.datacenter)?;
        w.string("datastore", vc.datastore)?;
        w.string("server", &vc.host)?;
        w.string("cluster-id", &self.cluster_id)?;
        if let Some(ip_family) = self.ip_family {
            w.string("ip-family", ip_family)?;
        }

        w.section("Disk")?;
        w.string("scsicontrollertype", SCSI_CONTROLLER_TYPE)?;

        w.section("Workspace")?;
        w.string("server", &vc.host)?;
        w.string("datacenter", vc.datacenter)?;
        w.string("folder", self.folder)?;
        w.string("default-datastore", vc.datastore)?;

        w.subsection("VirtualCenter", &vc.host)?;
        w.string("user", vc.user)?;
        w.string("password", vc.password)?;
        w.bare("port", &vc.port)?;
        w.string("datacenters", vc.datacenter)?;

        Ok(w.finish())
    }
}
