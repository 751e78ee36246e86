//! KubeVirt cloud config

use crate::error::Result;
use crds::Cluster;
use serde::Serialize;

/// Where the infra cluster kubeconfig is mounted in the cloud-controller-manager
const INFRA_KUBECONFIG_PATH: &str = "/etc/kubernetes/cloud/infra-kubeconfig";

#[derive(Debug, Serialize)]
struct KubevirtCloudConfig<'a> {
    kubeconfig: &'static str,
    namespace: &'a str,
}

pub(super) fn compile(cluster: &Cluster) -> Result<String> {
    let config = KubevirtCloudConfig {
        kubeconfig: INFRA_KUBECONFIG_PATH,
        namespace: cluster.namespace_name().unwrap_or_default(),
    };
    Ok(serde_yaml::to_string(&config)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use crds::{CloudProvider, KubevirtCloudSpec};

    #[test]
    fn test_namespace_from_status() {
        let c = cluster("kv-1", CloudProvider::Kubevirt(KubevirtCloudSpec {}));
        assert_eq!(
            compile(&c).unwrap(),
            "kubeconfig: /etc/kubernetes/cloud/infra-kubeconfig\nnamespace: cluster-kv-1\n"
        );
    }

    #[test]
    fn test_namespace_not_yet_assigned() {
        let mut c = cluster("kv-1", CloudProvider::Kubevirt(KubevirtCloudSpec {}));
        c.status = None;

        let payload = compile(&c).unwrap();
        let parsed: serde_yaml::Value = serde_yaml::from_str(&payload).unwrap();
        assert_eq!(parsed["namespace"].as_str(), Some(""));
    }
}
