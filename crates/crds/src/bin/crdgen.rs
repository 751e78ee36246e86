//! Prints the ClusterOps CustomResourceDefinitions as a multi-document YAML stream.
//!
//! Usage: `cargo run -p crds --bin crdgen > config/crd/crds.yaml`

use crds::{Cluster, Datacenter};
use kube::CustomResourceExt;

fn main() -> Result<(), serde_yaml::Error> {
    let crds = [Cluster::crd(), Datacenter::crd()];
    for crd in &crds {
        println!("---");
        print!("{}", serde_yaml::to_string(crd)?);
    }
    Ok(())
}
