//! Topology option resolvers
//!
//! Each deployment topology maps to one pure function producing the
//! Elastic Beanstalk option settings for the environment. The planner
//! concatenates nothing across branches; each branch returns its full,
//! immutable sequence.

use crate::error::{PlanError, PlanResult};
use crate::models::{
    EnvironmentIdentity, IngressRule, LoadBalancerRef, ResourceOption, SecurityGroupPlan,
};

/// Listener rule names may not contain hyphens
pub fn listener_rule_name(project_name: &str) -> String {
    project_name.split('-').collect()
}

/// Options binding the environment to an existing shared load balancer
///
/// The environment joins the balancer's VPC and public subnets, routes by
/// host header through one listener rule, and keeps a fixed capacity of
/// one instance (the shared topology does not scale horizontally).
pub fn shared_alb_options(
    profile_name: &str,
    load_balancer: &LoadBalancerRef,
    backend_domain: &str,
    project_name: &str,
) -> PlanResult<Vec<ResourceOption>> {
    let network = load_balancer.network();
    if network.public_subnet_ids.is_empty() {
        return Err(PlanError::EmptySubnetList {
            load_balancer: load_balancer.identity().to_string(),
        });
    }
    let subnets = network.public_subnet_ids.join(",");
    let rule = listener_rule_name(project_name);
    if rule.is_empty() {
        return Err(PlanError::EmptyListenerRuleName {
            project_name: project_name.to_string(),
        });
    }

    Ok(vec![
        ResourceOption::new("aws:ec2:vpc", "VPCId", &network.vpc_id),
        ResourceOption::new("aws:ec2:vpc", "Subnets", &subnets),
        ResourceOption::new("aws:ec2:vpc", "ELBSubnets", &subnets),
        ResourceOption::new("aws:ec2:vpc", "ELBScheme", "public"),
        ResourceOption::new(
            "aws:elasticbeanstalk:environment:process:default",
            "HealthCheckPath",
            "/api/status",
        ),
        ResourceOption::new("aws:ec2:instances", "InstanceTypes", "t2.micro"),
        ResourceOption::new("aws:autoscaling:asg", "MinSize", "1"),
        ResourceOption::new("aws:autoscaling:asg", "MaxSize", "1"),
        ResourceOption::new(
            "aws:autoscaling:launchconfiguration",
            "IamInstanceProfile",
            profile_name,
        ),
        ResourceOption::new(
            "aws:elasticbeanstalk:environment",
            "EnvironmentType",
            "LoadBalanced",
        ),
        ResourceOption::new(
            "aws:elasticbeanstalk:environment",
            "LoadBalancerType",
            "application",
        ),
        ResourceOption::new(
            "aws:elasticbeanstalk:environment",
            "LoadBalancerIsShared",
            "true",
        ),
        ResourceOption::new(
            "aws:elbv2:loadbalancer",
            "SharedLoadBalancer",
            load_balancer.identity(),
        ),
        ResourceOption::new("aws:elbv2:listener:443", "Rules", &rule),
        ResourceOption::new(
            format!("aws:elbv2:listenerrule:{rule}"),
            "HostHeaders",
            backend_domain,
        ),
    ])
}

/// Security group for the single-instance topology
///
/// Intentionally permissive: the convenience topology opens SSH, HTTP
/// and HTTPS to any IPv4 source.
pub fn single_instance_security_group(
    identity: &EnvironmentIdentity,
    vpc_id: &str,
) -> SecurityGroupPlan {
    SecurityGroupPlan {
        name: identity.security_group_name(),
        vpc_id: vpc_id.to_string(),
        description: format!(
            "Security group for the {} ElasticBeanstalk",
            identity.environment_name
        ),
        allow_all_outbound: true,
        ingress: vec![
            IngressRule::tcp_any_ipv4(22, "allow SSH access from anywhere"),
            IngressRule::tcp_any_ipv4(80, "allow HTTP traffic from anywhere"),
            IngressRule::tcp_any_ipv4(443, "allow HTTPS traffic from anywhere"),
        ],
    }
}

/// Options for a single instance without any load balancer
pub fn single_instance_options(
    profile_name: &str,
    security_group_name: &str,
) -> Vec<ResourceOption> {
    vec![
        ResourceOption::new("aws:ec2:instances", "InstanceTypes", "t2.micro"),
        ResourceOption::new(
            "aws:autoscaling:launchconfiguration",
            "IamInstanceProfile",
            profile_name,
        ),
        ResourceOption::new(
            "aws:autoscaling:launchconfiguration",
            "SecurityGroups",
            security_group_name,
        ),
        ResourceOption::new(
            "aws:elasticbeanstalk:environment",
            "EnvironmentType",
            "SingleInstance",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NetworkBinding;

    fn referenced_alb() -> LoadBalancerRef {
        LoadBalancerRef::Referenced {
            arn: "arn:aws:elasticloadbalancing:us-east-1:111111111111:loadbalancer/app/shared/abc"
                .to_string(),
            network: NetworkBinding {
                vpc_id: "vpc-0a1b".to_string(),
                public_subnet_ids: vec!["subnet-a".to_string(), "subnet-b".to_string()],
            },
        }
    }

    #[test]
    fn test_listener_rule_name_strips_hyphens() {
        assert_eq!(listener_rule_name("my-cool-api"), "mycoolapi");
        assert_eq!(listener_rule_name("api"), "api");
    }

    #[test]
    fn test_shared_options_full_sequence() {
        let options =
            shared_alb_options("api-InstanceProfile", &referenced_alb(), "api.example.com", "api")
                .unwrap();

        assert_eq!(options[0], ResourceOption::new("aws:ec2:vpc", "VPCId", "vpc-0a1b"));
        assert_eq!(
            options[1],
            ResourceOption::new("aws:ec2:vpc", "Subnets", "subnet-a,subnet-b")
        );
        assert_eq!(
            options[2],
            ResourceOption::new("aws:ec2:vpc", "ELBSubnets", "subnet-a,subnet-b")
        );
        assert_eq!(
            options[4],
            ResourceOption::new(
                "aws:elasticbeanstalk:environment:process:default",
                "HealthCheckPath",
                "/api/status"
            )
        );
        assert_eq!(
            options.last().unwrap(),
            &ResourceOption::new("aws:elbv2:listenerrule:api", "HostHeaders", "api.example.com")
        );
    }

    #[test]
    fn test_shared_options_pin_capacity_to_one() {
        let options =
            shared_alb_options("p", &referenced_alb(), "api.example.com", "api").unwrap();
        let asg: Vec<_> = options
            .iter()
            .filter(|o| o.namespace == "aws:autoscaling:asg")
            .collect();
        assert_eq!(asg.len(), 2);
        assert!(asg.iter().any(|o| o.option_name == "MinSize" && o.value == "1"));
        assert!(asg.iter().any(|o| o.option_name == "MaxSize" && o.value == "1"));
    }

    #[test]
    fn test_shared_options_single_shared_balancer_binding() {
        let alb = referenced_alb();
        let options = shared_alb_options("p", &alb, "api.example.com", "api").unwrap();
        let shared: Vec<_> = options
            .iter()
            .filter(|o| o.option_name == "SharedLoadBalancer")
            .collect();
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].value, alb.identity());
    }

    #[test]
    fn test_shared_options_no_path_patterns() {
        let options = shared_alb_options("p", &referenced_alb(), "d.example.com", "my-api").unwrap();
        assert!(options.iter().all(|o| o.option_name != "PathPatterns"));
    }

    #[test]
    fn test_shared_options_empty_subnets_fail() {
        let alb = LoadBalancerRef::Referenced {
            arn: "arn:aws:elasticloadbalancing:us-east-1:111111111111:loadbalancer/app/x/y"
                .to_string(),
            network: NetworkBinding {
                vpc_id: "vpc-0a1b".to_string(),
                public_subnet_ids: vec![],
            },
        };
        assert!(matches!(
            shared_alb_options("p", &alb, "api.example.com", "api").unwrap_err(),
            PlanError::EmptySubnetList { .. }
        ));
    }

    #[test]
    fn test_shared_options_hyphen_only_project_rejected() {
        // "---" survives the identifier check but sanitizes to nothing,
        // which would emit an unnamed Rules value and a bare
        // "aws:elbv2:listenerrule:" namespace.
        assert!(matches!(
            shared_alb_options("p", &referenced_alb(), "api.example.com", "---").unwrap_err(),
            PlanError::EmptyListenerRuleName { project_name } if project_name == "---"
        ));
    }

    #[test]
    fn test_single_options_have_no_load_balancer_namespaces() {
        let options = single_instance_options("api-InstanceProfile", "awseb-e-api-production");
        assert!(options.iter().all(|o| !o.namespace.starts_with("aws:elbv2")));
        assert!(options
            .iter()
            .any(|o| o.option_name == "EnvironmentType" && o.value == "SingleInstance"));
        assert!(options
            .iter()
            .any(|o| o.option_name == "SecurityGroups" && o.value == "awseb-e-api-production"));
    }

    #[test]
    fn test_single_security_group_opens_exactly_three_ports() {
        let identity = EnvironmentIdentity::derive("api", "PRODUCTION");
        let sg = single_instance_security_group(&identity, "vpc-0a1b");
        let mut ports: Vec<u16> = sg.ingress.iter().map(|r| r.port).collect();
        ports.sort_unstable();
        assert_eq!(ports, vec![22, 80, 443]);
        assert!(sg.ingress.iter().all(|r| r.peer == "0.0.0.0/0"));
        assert_eq!(sg.name, "awseb-e-api-production");
    }
}
