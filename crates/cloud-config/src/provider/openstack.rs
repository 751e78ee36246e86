//! OpenStack cloud config
//!
//! Several settings come from a chain of optional values. Each chain is one
//! `resolve_*` function over `Option<bool>` so the precedence can be read and
//! tested in one place.

use super::parse_version;
use crate::credentials::OpenstackCredentials;
use crate::error::Result;
use crate::ini::IniWriter;
use crds::{Cluster, DatacenterSpecOpenstack, OpenstackCloudSpec};
use semver::Version;

const BLOCK_STORAGE_VERSION_AUTO: &str = "auto";
const LOAD_BALANCER_VERSION: &str = "v2";
const LOAD_BALANCER_METHOD: &str = "ROUND_ROBIN";

/// Oldest control-plane minor version that understands `ignore-volume-az`
const IGNORE_VOLUME_AZ_MIN_MINOR: u64 = 12;

#[derive(Debug)]
struct OpenstackCloudConfig<'a> {
    global: GlobalOpts<'a>,
    load_balancer: LoadBalancerOpts<'a>,
    block_storage: BlockStorageOpts,
    /// Control-plane version the config is rendered for
    version: Version,
}

#[derive(Debug)]
struct GlobalOpts<'a> {
    auth_url: &'a str,
    credentials: &'a OpenstackCredentials,
    region: &'a str,
}

#[derive(Debug)]
struct LoadBalancerOpts<'a> {
    manage_security_groups: bool,
    use_octavia: Option<bool>,
    enable_ingress_hostname: Option<bool>,
    ingress_hostname_suffix: Option<&'a str>,
}

#[derive(Debug)]
struct BlockStorageOpts {
    bs_version: &'static str,
    trust_device_path: bool,
    ignore_volume_az: bool,
}

/// Cluster setting wins over the datacenter default; `None` if neither is set.
fn resolve_use_octavia(cluster: Option<bool>, datacenter: Option<bool>) -> Option<bool> {
    cluster.or(datacenter)
}

/// Security groups are managed unless the datacenter explicitly disables it.
fn resolve_manage_security_groups(datacenter: Option<bool>) -> bool {
    datacenter.unwrap_or(true)
}

/// Device paths are only trusted when the datacenter explicitly says so.
fn resolve_trust_device_path(datacenter: Option<bool>) -> bool {
    datacenter.unwrap_or(false)
}

pub(super) fn compile(
    cluster: &Cluster,
    spec: &OpenstackCloudSpec,
    datacenter: &DatacenterSpecOpenstack,
    credentials: &OpenstackCredentials,
) -> Result<String> {
    let config = OpenstackCloudConfig {
        global: GlobalOpts {
            auth_url: &datacenter.auth_url,
            credentials,
            region: &datacenter.region,
        },
        load_balancer: LoadBalancerOpts {
            manage_security_groups: resolve_manage_security_groups(
                datacenter.manage_security_groups,
            ),
            use_octavia: resolve_use_octavia(spec.use_octavia, datacenter.use_octavia),
            enable_ingress_hostname: spec.enable_ingress_hostname,
            ingress_hostname_suffix: spec.ingress_hostname_suffix.as_deref(),
        },
        block_storage: BlockStorageOpts {
            bs_version: BLOCK_STORAGE_VERSION_AUTO,
            trust_device_path: resolve_trust_device_path(datacenter.trust_device_path),
            ignore_volume_az: datacenter.ignore_volume_az,
        },
        version: parse_version(cluster.control_plane_version())?,
    };

    config.render()
}

impl OpenstackCloudConfig<'_> {
    fn render(&self) -> Result<String> {
        let mut w = IniWriter::spaced();

        let global = &self.global;
        let creds = global.credentials;
        w.section("Global")?;
        w.string("auth-url", global.auth_url)?;
        if creds.application_credential_id.is_empty() {
            w.string("username", &creds.username)?;
            w.string("password", &creds.password)?;
            w.string("tenant-name", &creds.project)?;
            w.string("tenant-id", &creds.project_id)?;
            w.string("domain-name", &creds.domain)?;
        } else {
            w.string("application-credential-id", &creds.application_credential_id)?;
            w.string(
                "application-credential-secret",
                &creds.application_credential_secret,
            )?;
        }
        w.string("region", global.region)?;

        let lb = &self.load_balancer;
        w.section("LoadBalancer")?;
        w.string("lb-version", LOAD_BALANCER_VERSION)?;
        w.string("lb-method", LOAD_BALANCER_METHOD)?;
        if let Some(use_octavia) = lb.use_octavia {
            w.bare("use-octavia", use_octavia)?;
        }
        w.bare("manage-security-groups", lb.manage_security_groups)?;
        if let Some(enable) = lb.enable_ingress_hostname {
            w.bare("enable-ingress-hostname", enable)?;
        }
        if let Some(suffix) = lb.ingress_hostname_suffix {
            w.string("ingress-hostname-suffix", suffix)?;
        }

        let bs = &self.block_storage;
        w.section("BlockStorage")?;
        if self.version.major > 1 || self.version.minor >= IGNORE_VOLUME_AZ_MIN_MINOR {
            w.bare("ignore-volume-az", bs.ignore_volume_az)?;
        }
        w.bare("trust-device-path", bs.trust_device_path)?;
        w.string("bs-version", bs.bs_version)?;

        Ok(w.finish())
    }
}
