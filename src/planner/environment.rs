//! Environment planner
//!
//! Assembles the compute-environment description: IAM instance role and
//! profile, the application/environment pair, the topology's option
//! settings, the backend DNS alias, and the dependency edges the
//! materializer must honor.

use serde::{Deserialize, Serialize};

use crate::config::{DeploymentConfig, Region};
use crate::models::{
    AliasTarget, DnsAliasRecord, EnvironmentIdentity, InstanceProfilePlan, InstanceRolePlan,
    ResourceOption,
};

use super::ResolvedTopology;

/// Hosted zone ids of the regional Elastic Beanstalk service endpoints
///
/// Total over the supported region set; unknown regions are rejected at
/// configuration time, never defaulted here.
pub fn beanstalk_zone_id(region: Region) -> &'static str {
    match region {
        Region::UsEast1 => "Z117KPS5GTRQ2G",
        Region::UsEast2 => "Z14LCN19Q5QHIC",
        Region::SaEast1 => "Z10X7K2B4QSOFV",
    }
}

/// Logical id of the application resource
pub fn application_id(identity: &EnvironmentIdentity) -> String {
    format!("application/{}", identity.application_name)
}

/// Logical id of the single-instance security group
pub fn security_group_id(name: &str) -> String {
    format!("security-group/{name}")
}

/// Declarative description of the compute environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentPlan {
    pub identity: EnvironmentIdentity,
    pub solution_stack: String,
    pub instance_role: InstanceRolePlan,
    pub instance_profile: InstanceProfilePlan,
    pub options: Vec<ResourceOption>,
    pub dns_alias: DnsAliasRecord,
    /// Logical ids the environment must be materialized after
    pub depends_on: Vec<String>,
}

/// Plan the environment and its DNS alias
pub fn plan_environment(
    config: &DeploymentConfig,
    identity: &EnvironmentIdentity,
    topology: &ResolvedTopology,
    options: Vec<ResourceOption>,
    solution_stack: String,
) -> EnvironmentPlan {
    let instance_role = InstanceRolePlan {
        role_name: format!("{}-Elb", config.project_name),
        assumed_by: "ec2.amazonaws.com".to_string(),
        managed_policies: vec!["AWSElasticBeanstalkWebTier".to_string()],
    };
    let instance_profile = InstanceProfilePlan {
        profile_name: identity.instance_profile_name.clone(),
        role_name: instance_role.role_name.clone(),
    };

    let target = match topology {
        ResolvedTopology::Shared { load_balancer, .. } => AliasTarget::LoadBalancer {
            identity: load_balancer.identity().to_string(),
        },
        // AWS serves the environment at a predictable hostname derived
        // from the cname prefix, so the alias can be declared up front
        ResolvedTopology::Single { .. } => AliasTarget::EnvironmentEndpoint {
            dns_name: format!(
                "{}.{}.elasticbeanstalk.com",
                identity.cname_prefix, config.region
            ),
            hosted_zone_id: beanstalk_zone_id(config.region).to_string(),
        },
    };
    let dns_alias = DnsAliasRecord {
        record_name: config.backend_domain.clone(),
        zone_domain: config.hosted_zone_domain.clone(),
        target,
    };

    // The environment cannot exist before its application; for the
    // single-instance topology the security group rules must also be in
    // place first, or the materializer races rule attachment against
    // environment creation
    let mut depends_on = vec![application_id(identity)];
    if let ResolvedTopology::Single { security_group } = topology {
        depends_on.push(security_group_id(&security_group.name));
    }

    EnvironmentPlan {
        identity: identity.clone(),
        solution_stack,
        instance_role,
        instance_profile,
        options,
        dns_alias,
        depends_on,
    }
}
