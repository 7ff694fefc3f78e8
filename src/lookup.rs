//! Injected lookup capabilities
//!
//! Planning needs two facts it cannot derive from configuration: the
//! newest matching solution stack, and VPC attributes (for the default
//! VPC or an existing load balancer). Both are modeled as traits so the
//! planners stay pure; the default implementations shell out to the
//! `aws` CLI.

use std::process::Command;

use serde::Deserialize;

use crate::config::Region;
use crate::error::{PlanError, PlanResult};
use crate::models::NetworkBinding;

/// Substring filter selecting a platform stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFilter {
    pub runtime: String,
    pub platform: String,
}

impl StackFilter {
    /// The fixed platform this planner targets
    pub fn node14_amazon_linux2() -> Self {
        Self {
            runtime: "Node.js 14".to_string(),
            platform: "64bit Amazon Linux 2".to_string(),
        }
    }

    pub fn matches(&self, stack: &str) -> bool {
        stack.contains(&self.runtime) && stack.contains(&self.platform)
    }
}

impl std::fmt::Display for StackFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} + {}", self.runtime, self.platform)
    }
}

/// Catalog of available solution stacks
pub trait StackCatalog {
    /// Newest stack matching the filter, or `NoMatchingStack`
    fn latest_matching(&self, filter: &StackFilter) -> PlanResult<String>;
}

/// VPC attribute lookup for network bindings
pub trait NetworkLookup {
    /// The account's default VPC with its public subnets
    fn default_vpc(&self) -> PlanResult<NetworkBinding>;
    /// VPC binding of an existing load balancer
    fn load_balancer(&self, arn: &str) -> PlanResult<NetworkBinding>;
}

/// Pick the newest matching stack from a newest-first catalog listing
pub fn newest_matching<'a>(stacks: &'a [String], filter: &StackFilter) -> Option<&'a str> {
    stacks
        .iter()
        .find(|stack| filter.matches(stack))
        .map(String::as_str)
}

/// Solution stack with a fixed answer (offline planning, tests)
pub struct FixedStack(pub String);

impl StackCatalog for FixedStack {
    fn latest_matching(&self, _filter: &StackFilter) -> PlanResult<String> {
        Ok(self.0.clone())
    }
}

/// `aws` CLI process runner shared by the CLI-backed lookups
struct AwsCli {
    region: Region,
    profile: Option<String>,
}

impl AwsCli {
    fn run(&self, args: &[&str]) -> PlanResult<String> {
        let mut cmd = Command::new("aws");
        cmd.args(args).args(["--region", self.region.as_str(), "--output", "json"]);
        if let Some(profile) = &self.profile {
            cmd.args(["--profile", profile]);
        }
        let output = cmd.output().map_err(|e| PlanError::LookupFailed {
            message: format!("cannot run `aws {}`: {e}", args.join(" ")),
        })?;
        if !output.status.success() {
            return Err(PlanError::LookupFailed {
                message: format!(
                    "`aws {}` failed: {}",
                    args.join(" "),
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Solution stack catalog backed by the `aws` CLI
pub struct AwsCliCatalog {
    cli: AwsCli,
}

impl AwsCliCatalog {
    pub fn new(region: Region, profile: Option<String>) -> Self {
        Self {
            cli: AwsCli { region, profile },
        }
    }
}

impl StackCatalog for AwsCliCatalog {
    fn latest_matching(&self, filter: &StackFilter) -> PlanResult<String> {
        // The CLI lists stacks ordered by newest version first
        let stdout = self.cli.run(&[
            "elasticbeanstalk",
            "list-available-solution-stacks",
            "--query",
            "SolutionStacks",
        ])?;
        let stacks: Vec<String> = serde_json::from_str(&stdout)?;
        newest_matching(&stacks, filter)
            .map(str::to_string)
            .ok_or_else(|| PlanError::NoMatchingStack {
                filter: filter.to_string(),
            })
    }
}

#[derive(Debug, Deserialize)]
struct VpcList {
    #[serde(rename = "Vpcs")]
    vpcs: Vec<VpcDescription>,
}

#[derive(Debug, Deserialize)]
struct VpcDescription {
    #[serde(rename = "VpcId")]
    vpc_id: String,
}

#[derive(Debug, Deserialize)]
struct SubnetList {
    #[serde(rename = "Subnets")]
    subnets: Vec<SubnetDescription>,
}

#[derive(Debug, Deserialize)]
struct SubnetDescription {
    #[serde(rename = "SubnetId")]
    subnet_id: String,
}

#[derive(Debug, Deserialize)]
struct AlbList {
    #[serde(rename = "LoadBalancers")]
    load_balancers: Vec<AlbDescription>,
}

#[derive(Debug, Deserialize)]
struct AlbDescription {
    #[serde(rename = "VpcId")]
    vpc_id: String,
    #[serde(rename = "AvailabilityZones")]
    availability_zones: Vec<AlbZone>,
}

#[derive(Debug, Deserialize)]
struct AlbZone {
    #[serde(rename = "SubnetId")]
    subnet_id: String,
}

/// VPC and load balancer lookup backed by the `aws` CLI
pub struct AwsCliNetwork {
    cli: AwsCli,
}

impl AwsCliNetwork {
    pub fn new(region: Region, profile: Option<String>) -> Self {
        Self {
            cli: AwsCli { region, profile },
        }
    }
}

impl NetworkLookup for AwsCliNetwork {
    fn default_vpc(&self) -> PlanResult<NetworkBinding> {
        let stdout = self.cli.run(&[
            "ec2",
            "describe-vpcs",
            "--filters",
            "Name=isDefault,Values=true",
        ])?;
        let vpcs: VpcList = serde_json::from_str(&stdout)?;
        let vpc = vpcs.vpcs.into_iter().next().ok_or_else(|| PlanError::LookupFailed {
            message: "account has no default VPC".to_string(),
        })?;

        let filter = format!("Name=vpc-id,Values={}", vpc.vpc_id);
        let stdout = self.cli.run(&[
            "ec2",
            "describe-subnets",
            "--filters",
            filter.as_str(),
            "Name=map-public-ip-on-launch,Values=true",
        ])?;
        let subnets: SubnetList = serde_json::from_str(&stdout)?;
        Ok(NetworkBinding {
            vpc_id: vpc.vpc_id,
            public_subnet_ids: subnets.subnets.into_iter().map(|s| s.subnet_id).collect(),
        })
    }

    fn load_balancer(&self, arn: &str) -> PlanResult<NetworkBinding> {
        let stdout = self.cli.run(&[
            "elbv2",
            "describe-load-balancers",
            "--load-balancer-arns",
            arn,
        ])?;
        let albs: AlbList = serde_json::from_str(&stdout)?;
        let alb = albs
            .load_balancers
            .into_iter()
            .next()
            .ok_or_else(|| PlanError::LookupFailed {
                message: format!("load balancer not found: {arn}"),
            })?;
        Ok(NetworkBinding {
            vpc_id: alb.vpc_id,
            public_subnet_ids: alb
                .availability_zones
                .into_iter()
                .map(|z| z.subnet_id)
                .collect(),
        })
    }
}
