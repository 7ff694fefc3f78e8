//! Core data models for stackplan
//!
//! Defines the fundamental data structures used throughout stackplan:
//! - `ResourceOption`: one Elastic Beanstalk option setting
//! - `EnvironmentIdentity`: names derived from project and stage
//! - `LoadBalancerRef` / `CertificateRef`: owned-or-referenced resources
//! - Supporting descriptions: listeners, security groups, DNS aliases, IAM

use serde::{Deserialize, Serialize};

/// A single Elastic Beanstalk environment option setting
///
/// Option sequences are insertion-ordered; ordering carries no semantics
/// but is kept deterministic so plans compare reproducibly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceOption {
    pub namespace: String,
    pub option_name: String,
    pub value: String,
}

impl ResourceOption {
    pub fn new(
        namespace: impl Into<String>,
        option_name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            option_name: option_name.into(),
            value: value.into(),
        }
    }
}

/// Names derived from the project and stage, used by every planner
///
/// All fields are pure functions of the configuration:
/// - application name is the project name (environments of one project
///   share the application)
/// - environment name is `{project}-{stage}`
/// - cname prefix is the lowercased environment name; AWS serves the
///   environment at `{cname_prefix}.{region}.elasticbeanstalk.com`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentIdentity {
    pub application_name: String,
    pub environment_name: String,
    pub instance_profile_name: String,
    pub cname_prefix: String,
}

impl EnvironmentIdentity {
    /// Derive the identity from the raw project and stage names
    pub fn derive(project_name: &str, stage_name: &str) -> Self {
        let environment_name = format!("{project_name}-{stage_name}");
        Self {
            application_name: project_name.to_string(),
            environment_name: environment_name.clone(),
            instance_profile_name: format!("{project_name}-InstanceProfile"),
            cname_prefix: environment_name.to_lowercase(),
        }
    }

    /// Security group name for the single-instance topology
    ///
    /// The `awseb-e-` prefix matches the naming Elastic Beanstalk uses for
    /// environment-owned groups, so the instance picks it up by name.
    pub fn security_group_name(&self) -> String {
        format!("awseb-e-{}", self.environment_name.to_lowercase())
    }
}

/// VPC binding shared by owned and referenced load balancers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkBinding {
    pub vpc_id: String,
    pub public_subnet_ids: Vec<String>,
}

/// Fixed-response default action for a listener
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedResponse {
    pub status: u16,
    pub content_type: String,
    pub body: String,
}

/// A listener on an owned load balancer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum ListenerPlan {
    /// HTTP redirect (80 -> 443)
    Redirect { source_port: u16, target_port: u16 },
    /// HTTPS listener whose default action is a static placeholder;
    /// real routing comes from per-environment listener rules
    Https {
        port: u16,
        certificate: CertificateRef,
        default_action: FixedResponse,
    },
}

/// Description of a load balancer to create
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbPlan {
    pub name: String,
    pub internet_facing: bool,
    pub network: NetworkBinding,
    pub listeners: Vec<ListenerPlan>,
}

/// A load balancer that is either created by this plan or referenced
/// by the ARN of an existing one
///
/// Both variants expose the same read-only surface: an identity string
/// and the VPC binding. For `Owned` the identity is the logical resource
/// name; the materializer substitutes the real ARN once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum LoadBalancerRef {
    Owned(AlbPlan),
    Referenced { arn: String, network: NetworkBinding },
}

impl LoadBalancerRef {
    /// Identity string used wherever an option value must name the balancer
    pub fn identity(&self) -> &str {
        match self {
            LoadBalancerRef::Owned(plan) => &plan.name,
            LoadBalancerRef::Referenced { arn, .. } => arn,
        }
    }

    /// VPC binding, regardless of variant
    pub fn network(&self) -> &NetworkBinding {
        match self {
            LoadBalancerRef::Owned(plan) => &plan.network,
            LoadBalancerRef::Referenced { network, .. } => network,
        }
    }
}

/// Request for a new DNS-validated certificate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRequest {
    pub name: String,
    pub domain_name: String,
    pub subject_alternative_names: Vec<String>,
    /// Hosted zone domain the DNS validation challenge runs against
    pub validation_zone: String,
}

/// A certificate that is either requested by this plan or referenced by ARN
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum CertificateRef {
    Owned(CertificateRequest),
    Referenced { arn: String },
}

impl CertificateRef {
    /// Identity string: the ARN for referenced certificates, the logical
    /// name for requested ones
    pub fn identity(&self) -> &str {
        match self {
            CertificateRef::Owned(req) => &req.name,
            CertificateRef::Referenced { arn } => arn,
        }
    }
}

/// One inbound firewall rule on a security group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngressRule {
    pub peer: String,
    pub protocol: String,
    pub port: u16,
    pub description: String,
}

impl IngressRule {
    /// TCP rule open to any IPv4 source
    pub fn tcp_any_ipv4(port: u16, description: impl Into<String>) -> Self {
        Self {
            peer: "0.0.0.0/0".to_string(),
            protocol: "tcp".to_string(),
            port,
            description: description.into(),
        }
    }
}

/// Security group created for the single-instance topology
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityGroupPlan {
    pub name: String,
    pub vpc_id: String,
    pub description: String,
    pub allow_all_outbound: bool,
    pub ingress: Vec<IngressRule>,
}

/// Target of the backend DNS alias record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum AliasTarget {
    /// Alias to the shared load balancer
    LoadBalancer { identity: String },
    /// Alias to the predictable Elastic Beanstalk environment endpoint
    EnvironmentEndpoint {
        dns_name: String,
        hosted_zone_id: String,
    },
}

/// DNS A-record alias for the backend domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsAliasRecord {
    pub record_name: String,
    pub zone_domain: String,
    pub target: AliasTarget,
}

/// EC2 instance role for the environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceRolePlan {
    pub role_name: String,
    pub assumed_by: String,
    pub managed_policies: Vec<String>,
}

/// Instance profile wrapping the instance role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceProfilePlan {
    pub profile_name: String,
    pub role_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_derivation() {
        let id = EnvironmentIdentity::derive("api", "PRODUCTION");
        assert_eq!(id.application_name, "api");
        assert_eq!(id.environment_name, "api-PRODUCTION");
        assert_eq!(id.instance_profile_name, "api-InstanceProfile");
        assert_eq!(id.cname_prefix, "api-production");
    }

    #[test]
    fn test_identity_is_stable() {
        let a = EnvironmentIdentity::derive("shop", "Staging");
        let b = EnvironmentIdentity::derive("shop", "Staging");
        assert_eq!(a, b);
    }

    #[test]
    fn test_security_group_name_is_lowercased() {
        let id = EnvironmentIdentity::derive("Api", "DEMO");
        assert_eq!(id.security_group_name(), "awseb-e-api-demo");
    }

    #[test]
    fn test_load_balancer_ref_uniform_surface() {
        let network = NetworkBinding {
            vpc_id: "vpc-123".to_string(),
            public_subnet_ids: vec!["subnet-a".to_string()],
        };
        let referenced = LoadBalancerRef::Referenced {
            arn: "arn:aws:elasticloadbalancing:us-east-1:111111111111:loadbalancer/app/x/y"
                .to_string(),
            network: network.clone(),
        };
        assert!(referenced.identity().starts_with("arn:aws:"));
        assert_eq!(referenced.network().vpc_id, "vpc-123");

        let owned = LoadBalancerRef::Owned(AlbPlan {
            name: "SHARED-ALB".to_string(),
            internet_facing: true,
            network,
            listeners: vec![],
        });
        assert_eq!(owned.identity(), "SHARED-ALB");
        assert_eq!(owned.network().vpc_id, "vpc-123");
    }

    #[test]
    fn test_ingress_rule_constructor() {
        let rule = IngressRule::tcp_any_ipv4(22, "allow SSH access from anywhere");
        assert_eq!(rule.peer, "0.0.0.0/0");
        assert_eq!(rule.protocol, "tcp");
        assert_eq!(rule.port, 22);
    }
}
