//! Deployment planning
//!
//! One synchronous pass over the validated configuration: resolve the
//! solution stack, resolve the topology's resources, derive the
//! environment description, and attach the pipeline. The output is a
//! `DeploymentPlan` (resources, options, and explicit dependency edges)
//! for the external materializer. Planning never creates anything.

pub mod environment;
pub mod network;
pub mod options;
pub mod pipeline;

use serde::{Deserialize, Serialize};

use crate::config::{DeploymentConfig, Region, Topology};
use crate::error::PlanResult;
use crate::lookup::{NetworkLookup, StackCatalog, StackFilter};
use crate::models::{CertificateRef, EnvironmentIdentity, LoadBalancerRef, SecurityGroupPlan};

use environment::EnvironmentPlan;
use pipeline::PipelinePlan;

/// Topology after resource resolution
///
/// Selects which option-derivation runs and which auxiliary resources
/// the plan carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum ResolvedTopology {
    /// Environment joins a shared application load balancer
    Shared {
        certificate: CertificateRef,
        load_balancer: LoadBalancerRef,
    },
    /// Standalone instance behind its own security group
    Single { security_group: SecurityGroupPlan },
}

/// Application container for the environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationPlan {
    pub name: String,
}

/// The full declarative output of one planning pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentPlan {
    pub account: String,
    pub region: Region,
    pub application: ApplicationPlan,
    pub topology: ResolvedTopology,
    pub environment: EnvironmentPlan,
    pub pipeline: PipelinePlan,
}

/// Plan a deployment from validated configuration
///
/// The solution stack resolves first: if the catalog has no matching
/// platform, planning aborts before any resource description exists.
pub fn plan_deployment(
    config: &DeploymentConfig,
    catalog: &dyn StackCatalog,
    network: &dyn NetworkLookup,
) -> PlanResult<DeploymentPlan> {
    let solution_stack = catalog.latest_matching(&StackFilter::node14_amazon_linux2())?;
    let identity = EnvironmentIdentity::derive(&config.project_name, config.stage.as_str());

    let topology = match config.topology {
        Topology::SharedLoadBalancer => {
            let shared = network::resolve_certificate_and_balancer(config, network)?;
            ResolvedTopology::Shared {
                certificate: shared.certificate,
                load_balancer: shared.load_balancer,
            }
        }
        Topology::Single => {
            let vpc = network.default_vpc()?;
            ResolvedTopology::Single {
                security_group: options::single_instance_security_group(&identity, &vpc.vpc_id),
            }
        }
    };

    let environment_options = match &topology {
        ResolvedTopology::Shared { load_balancer, .. } => options::shared_alb_options(
            &identity.instance_profile_name,
            load_balancer,
            &config.backend_domain,
            &config.project_name,
        )?,
        ResolvedTopology::Single { security_group } => {
            options::single_instance_options(&identity.instance_profile_name, &security_group.name)
        }
    };

    let environment = environment::plan_environment(
        config,
        &identity,
        &topology,
        environment_options,
        solution_stack,
    );
    let pipeline = pipeline::plan_pipeline(config, &identity);

    Ok(DeploymentPlan {
        account: config.account.clone(),
        region: config.region,
        application: ApplicationPlan {
            name: identity.application_name,
        },
        topology,
        environment,
        pipeline,
    })
}
