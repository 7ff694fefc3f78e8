//! Certificate and load balancer resolution for the shared topology
//!
//! Decides whether the plan references existing resources by identity or
//! describes new ones: a DNS-validated wildcard certificate when no ARN
//! is configured, and a `SHARED-ALB` load balancer on the default VPC
//! when no balancer ARN is configured. Referenced ARNs must live in the
//! deployment's target account and region.

use crate::config::{check_arn_location, DeploymentConfig};
use crate::error::PlanResult;
use crate::lookup::NetworkLookup;
use crate::models::{
    AlbPlan, CertificateRef, CertificateRequest, FixedResponse, ListenerPlan, LoadBalancerRef,
};

/// Resolved certificate and load balancer for the shared topology
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedNetwork {
    pub certificate: CertificateRef,
    pub load_balancer: LoadBalancerRef,
}

/// Resolve the certificate and load balancer references
///
/// Only invoked for the `SHARED_LOAD_BALANCER` topology.
pub fn resolve_certificate_and_balancer(
    config: &DeploymentConfig,
    network: &dyn NetworkLookup,
) -> PlanResult<SharedNetwork> {
    let certificate = match &config.certificate_arn {
        None => CertificateRef::Owned(CertificateRequest {
            name: format!("{}-Certificate", config.project_name),
            domain_name: config.hosted_zone_domain.clone(),
            subject_alternative_names: vec![format!("*.{}", config.hosted_zone_domain)],
            validation_zone: config.hosted_zone_domain.clone(),
        }),
        Some(arn) => {
            check_arn_location("certificate_arn", arn, config.region, &config.account)?;
            CertificateRef::Referenced { arn: arn.clone() }
        }
    };

    let load_balancer = match &config.shared_load_balancer_arn {
        Some(arn) => LoadBalancerRef::Referenced {
            arn: arn.clone(),
            network: network.load_balancer(arn)?,
        },
        None => LoadBalancerRef::Owned(AlbPlan {
            name: "SHARED-ALB".to_string(),
            internet_facing: true,
            network: network.default_vpc()?,
            listeners: vec![
                ListenerPlan::Redirect {
                    source_port: 80,
                    target_port: 443,
                },
                ListenerPlan::Https {
                    port: 443,
                    certificate: certificate.clone(),
                    default_action: FixedResponse {
                        status: 200,
                        content_type: "text/plain".to_string(),
                        body: "OK".to_string(),
                    },
                },
            ],
        }),
    };

    Ok(SharedNetwork {
        certificate,
        load_balancer,
    })
}
