//! stackplan - deployment planner for AWS Elastic Beanstalk
//!
//! stackplan validates a flat deployment configuration, decides which
//! cloud resources the deployment needs (shared load balancer vs.
//! single instance), and emits a declarative plan (resources, option
//! settings, and dependency edges) for an external materializer.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── config     # Config file + env loading, validation, closed enums
//! ├── models     # Options, identity, owned-or-referenced resources
//! ├── lookup     # Injected capabilities (solution stacks, VPC info)
//! ├── planner/   # One-pass planning
//! │   ├── options      # Per-topology option derivation
//! │   ├── network      # Certificate and load balancer resolution
//! │   ├── environment  # Environment, IAM, DNS alias, dependencies
//! │   └── pipeline     # Source -> Build -> Deploy description
//! └── error      # Fatal, synchronous error taxonomy
//! ```

pub mod config;
pub mod error;
pub mod lookup;
pub mod models;
pub mod planner;

// Re-exports for convenience
pub use config::{DeploymentConfig, RawConfig, Region, Stage, Topology};
pub use error::{PlanError, PlanResult};
pub use lookup::{
    AwsCliCatalog, AwsCliNetwork, FixedStack, NetworkLookup, StackCatalog, StackFilter,
};
pub use models::{EnvironmentIdentity, LoadBalancerRef, ResourceOption};
pub use planner::{plan_deployment, DeploymentPlan, ResolvedTopology};
