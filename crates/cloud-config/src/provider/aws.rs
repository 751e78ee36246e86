//! AWS cloud config

use super::parse_version;
use crate::error::Result;
use crate::ini::IniWriter;
use crds::{AwsCloudSpec, Cluster, DatacenterSpecAws};
use kube::ResourceExt;

const DUAL_STACK_IP_FAMILIES: [&str; 2] = ["ipv4", "ipv6"];

/// From this minor version on, the AWS cloud-controller-manager rejects
/// `DisableStrictZoneCheck`.
const STRICT_ZONE_CHECK_REMOVED_MINOR: u64 = 27;

#[derive(Debug)]
struct AwsCloudConfig {
    zone: String,
    vpc: String,
    /// Always rendered empty, like the next two
    subnet_id: String,
    kubernetes_cluster_tag: String,
    elb_security_group: String,
    route_table_id: String,
    role_arn: String,
    kubernetes_cluster_id: String,
    disable_security_group_ingress: bool,
    /// Only rendered when true
    disable_strict_zone_check: bool,
    node_ip_families: Vec<String>,
}

pub(super) fn compile(
    cluster: &Cluster,
    spec: &AwsCloudSpec,
    datacenter: &DatacenterSpecAws,
) -> Result<String> {
    let version = parse_version(&cluster.spec.version)?;

    let mut config = AwsCloudConfig {
        // The legacy provider derives the region from an availability zone
        // name only, so hand it a fake zone in the right region.
        zone: format!("{}x", datacenter.region),
        vpc: spec.vpc_id.clone(),
        subnet_id: String::new(),
        kubernetes_cluster_tag: String::new(),
        elb_security_group: String::new(),
        route_table_id: spec.route_table_id.clone(),
        role_arn: spec.control_plane_role_arn.clone(),
        kubernetes_cluster_id: cluster.name_any(),
        disable_security_group_ingress: false,
        disable_strict_zone_check: true,
        node_ip_families: Vec::new(),
    };

    if cluster.is_dual_stack() {
        config.node_ip_families = DUAL_STACK_IP_FAMILIES.iter().map(|f| f.to_string()).collect();
    }

    if version.minor >= STRICT_ZONE_CHECK_REMOVED_MINOR {
        config.disable_strict_zone_check = false;
    }

    config.render()
}

impl AwsCloudConfig {
    fn render(&self) -> Result<String> {
        let mut w = IniWriter::compact();
        w.section("global")?;
        w.string("Zone", &self.zone)?;
        w.string("VPC", &self.vpc)?;
        w.string("SubnetID", &self.subnet_id)?;
        w.string("RouteTableID", &self.route_table_id)?;
        w.string("RoleARN", &self.role_arn)?;
        w.string("KubernetesClusterTag", &self.kubernetes_cluster_tag)?;
        w.string("KubernetesClusterID", &self.kubernetes_cluster_id)?;
        w.string("ElbSecurityGroup", &self.elb_security_group)?;
        w.bare("DisableSecurityGroupIngress", self.disable_security_group_ingress)?;
        if self.disable_strict_zone_check {
            w.bare("DisableStrictZoneCheck", self.disable_strict_zone_check)?;
        }
        for family in &self.node_ip_families {
            w.string("NodeIPFamilies", family)?;
        }
        Ok(w.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use crds::{CloudProvider, IpFamily};

    fn aws_cluster() -> Cluster {
        cluster(
            "aws-1",
            CloudProvider::Aws(AwsCloudSpec {
                vpc_id: "vpc-123".to_string(),
                route_table_id: "rtb-456".to_string(),
                control_plane_role_arn: "arn:aws:iam::123456789012:role/cp".to_string(),
            }),
        )
    }

    fn compile_cluster(cluster: &Cluster) -> String {
        let dc = datacenter();
        let spec = match &cluster.spec.cloud.provider {
            Some(CloudProvider::Aws(spec)) => spec.clone(),
            other => panic!("expected AWS provider, got {:?}", other),
        };
        compile(cluster, &spec, dc.aws.as_ref().unwrap()).unwrap()
    }

    #[test]
    fn test_global_section() {
        let mut c = aws_cluster();
        c.spec.version = "1.26.5".to_string();

        assert_eq!(
            compile_cluster(&c),
            "[global]\n\
             Zone=\"eu-central-1x\"\n\
             VPC=\"vpc-123\"\n\
             SubnetID=\"\"\n\
             RouteTableID=\"rtb-456\"\n\
             RoleARN=\"arn:aws:iam::123456789012:role/cp\"\n\
             KubernetesClusterTag=\"\"\n\
             KubernetesClusterID=\"aws-1\"\n\
             ElbSecurityGroup=\"\"\n\
             DisableSecurityGroupIngress=false\n\
             DisableStrictZoneCheck=true\n"
        );
    }

    #[test]
    fn test_strict_zone_check_dropped_from_1_27() {
        let mut c = aws_cluster();

        c.spec.version = "1.27.0".to_string();
        assert!(!compile_cluster(&c).contains("DisableStrictZoneCheck"));

        c.spec.version = "1.26.9".to_string();
        assert!(compile_cluster(&c).contains("DisableStrictZoneCheck=true\n"));
    }

    #[test]
    fn test_dual_stack_node_ip_families() {
        let mut c = aws_cluster();
        assert!(!compile_cluster(&c).contains("NodeIPFamilies"));

        c.spec.cluster_network.ip_family = IpFamily::DualStack;
        let payload = compile_cluster(&c);
        assert!(payload.contains("NodeIPFamilies=\"ipv4\"\nNodeIPFamilies=\"ipv6\"\n"));
    }

    #[test]
    fn test_invalid_version() {
        let mut c = aws_cluster();
        c.spec.version = "not-a-version".to_string();

        let dc = datacenter();
        let result = compile(&c, &AwsCloudSpec::default(), dc.aws.as_ref().unwrap());
        assert!(result.is_err());
    }
}
