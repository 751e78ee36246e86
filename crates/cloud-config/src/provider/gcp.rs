//! GCP cloud config

use crate::credentials::GcpCredentials;
use crate::error::{CloudConfigError, Result};
use crate::ini::IniWriter;
use base64::{engine::general_purpose::STANDARD, Engine};
use crds::{Cluster, DatacenterSpecGcp, GcpCloudSpec};
use kube::ResourceExt;
use serde::Deserialize;

const DEFAULT_NETWORK: &str = "default";

/// Path form of the default network. The provider treats any name containing
/// `/` as a URL, which breaks route cleanup, so it is rewritten to the plain name.
const DEFAULT_NETWORK_PATH: &str = "global/networks/default";

/// The provider reads `nil` as "use the metadata server"
const TOKEN_URL_NONE: &str = "nil";

/// Control plane and workers may live in different zones of the region and
/// the machine zones are not known here, so multi-zone lookups are always on.
// TODO: derive from the machine deployment zones once they are part of the cluster spec
const MULTIZONE: bool = true;

#[derive(Debug, Deserialize)]
struct ServiceAccount {
    #[serde(default)]
    project_id: String,
}

#[derive(Debug)]
struct GcpCloudConfig {
    project_id: String,
    local_zone: String,
    network_name: String,
    subnetwork_name: String,
    token_url: &'static str,
    multizone: bool,
    regional: bool,
    node_tags: Vec<String>,
}

pub(super) fn compile(
    cluster: &Cluster,
    spec: &GcpCloudSpec,
    datacenter: &DatacenterSpecGcp,
    credentials: &GcpCredentials,
) -> Result<String> {
    let project_id = project_id(&credentials.service_account)?;

    let first_suffix = datacenter
        .zone_suffixes
        .first()
        .ok_or(CloudConfigError::MissingZoneSuffixes)?;

    let config = GcpCloudConfig {
        project_id,
        local_zone: format!("{}-{}", datacenter.region, first_suffix),
        network_name: network_name(&spec.network).to_string(),
        subnetwork_name: spec.subnetwork.clone(),
        token_url: TOKEN_URL_NONE,
        multizone: MULTIZONE,
        regional: datacenter.regional,
        node_tags: vec![format!("kubernetes-cluster-{}", cluster.name_any())],
    };

    config.render()
}

/// Project ID from the base64-encoded service account JSON
fn project_id(service_account: &str) -> Result<String> {
    let decoded = STANDARD
        .decode(service_account.trim())
        .map_err(|e| CloudConfigError::InvalidServiceAccount(format!("invalid base64: {}", e)))?;
    // `null` decodes like an empty object
    let account: Option<ServiceAccount> = serde_json::from_slice(&decoded)
        .map_err(|e| CloudConfigError::InvalidServiceAccount(format!("invalid JSON: {}", e)))?;

    match account {
        Some(account) if !account.project_id.is_empty() => Ok(account.project_id),
        _ => Err(CloudConfigError::MissingProjectId),
    }
}

fn network_name(network: &str) -> &str {
    if network.is_empty() || network == DEFAULT_NETWORK_PATH {
        DEFAULT_NETWORK
    } else {
        network
    }
}

impl GcpCloudConfig {
    fn render(&self) -> Result<String> {
        let mut w = IniWriter::spaced();
        w.section("global")?;
        w.string("project-id", &self.project_id)?;
        w.string("local-zone", &self.local_zone)?;
        w.string("network-name", &self.network_name)?;
        w.string("subnetwork-name", &self.subnetwork_name)?;
        w.string("token-url", self.token_url)?;
        w.bare("multizone", self.multizone)?;
        w.bare("regional", self.regional)?;
        for tag in &self.node_tags {
            w.string("node-tags", tag)?;
        }
        Ok(w.finish())
    }
}
