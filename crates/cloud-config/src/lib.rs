//! ClusterOps Cloud Config Compiler
//!
//! Turns a cluster's declared cloud provider, its datacenter and the resolved
//! provider credentials into the configuration file that the cluster's
//! cloud-controller-manager reads at boot.
//!
//! # Example
//!
//! ```no_run
//! use cloud_config::{compile, Credentials};
//! use crds::{Cluster, DatacenterSpec};
//!
//! # fn example(cluster: &Cluster, datacenter: &DatacenterSpec) -> cloud_config::Result<()> {
//! let payload = compile(cluster, datacenter, &Credentials::default())?;
//! if payload.is_empty() {
//!     // no cloud provider, nothing to ship
//! }
//! # Ok(())
//! # }
//! ```

pub mod configmap;
pub mod credentials;
pub mod error;
pub mod ini;
pub mod provider;

#[cfg(test)]
mod test_utils;

pub use configmap::{cloud_config_map, CLOUD_CONFIG_CONFIGMAP_NAME, CLOUD_CONFIG_KEY};
pub use credentials::Credentials;
pub use error::{CloudConfigError, Result};
pub use provider::compile;
