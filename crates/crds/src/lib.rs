//! ClusterOps CRD Definitions
//!
//! Kubernetes Custom Resource Definitions for the ClusterOps platform:
//! user clusters, the datacenters they are scheduled into, and the
//! per-provider cloud settings shared between the two.

pub mod cloud;
pub mod cluster;
pub mod datacenter;
pub mod references;

pub use cloud::*;
pub use cluster::*;
pub use datacenter::*;
pub use references::*;
