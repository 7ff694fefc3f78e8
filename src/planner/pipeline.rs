//! Pipeline planner
//!
//! Thin composition: turns the environment identity and the GitHub
//! source reference into a three-stage Source -> Build -> Deploy
//! pipeline description. No option translation happens here; the deploy
//! stage carries only the application and environment names.

use serde::{Deserialize, Serialize};

use crate::config::{DeploymentConfig, GitSource};
use crate::models::EnvironmentIdentity;

/// Logical id of the environment resource, used as a dependency edge
pub fn environment_id(identity: &EnvironmentIdentity) -> String {
    format!("environment/{}", identity.environment_name)
}

/// Private bucket used for out-of-band env-file transfer to the build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketPlan {
    pub name: String,
    pub block_public_access: bool,
    pub auto_delete_objects: bool,
    /// Principals granted read/write (the build project)
    pub read_write_grants: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildEnvironmentVariable {
    pub name: String,
    pub value: String,
}

/// Source stage: GitHub webhook trigger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceStage {
    pub action_name: String,
    pub source: GitSource,
    pub trigger: String,
}

/// Build stage: CodeBuild project driven by a buildspec in the source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildStage {
    pub action_name: String,
    pub project_name: String,
    pub buildspec: String,
    pub build_image: String,
    pub environment: Vec<BuildEnvironmentVariable>,
}

/// Deploy stage: the custom Elastic Beanstalk action binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployStage {
    pub action_name: String,
    pub application_name: String,
    pub environment_name: String,
}

/// Declarative description of the deployment pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelinePlan {
    pub name: String,
    pub cross_account_keys: bool,
    pub envs_bucket: BucketPlan,
    pub source: SourceStage,
    pub build: BuildStage,
    pub deploy: DeployStage,
    /// Managed policies attached to the pipeline's execution role
    pub role_managed_policies: Vec<String>,
    pub depends_on: Vec<String>,
}

/// Plan the CI/CD pipeline for the environment
pub fn plan_pipeline(config: &DeploymentConfig, identity: &EnvironmentIdentity) -> PipelinePlan {
    let project = &config.project_name;
    let stage = config.stage.as_str();
    let build_project_name = format!("{project}{stage}CodeBuild");
    // Bucket names must be lowercase
    let bucket_name = format!("{project}-{stage}-server-envs").to_lowercase();

    PipelinePlan {
        name: format!("{project}-{stage}-CodePipeline"),
        cross_account_keys: false,
        envs_bucket: BucketPlan {
            name: bucket_name.clone(),
            block_public_access: true,
            auto_delete_objects: true,
            read_write_grants: vec![build_project_name.clone()],
        },
        source: SourceStage {
            action_name: "Github_Source".to_string(),
            source: config.source.clone(),
            trigger: "webhook".to_string(),
        },
        build: BuildStage {
            action_name: format!("{project}-Build"),
            project_name: build_project_name,
            buildspec: "buildspec.yml".to_string(),
            build_image: "aws/codebuild/amazonlinux2-x86_64-standard:3.0".to_string(),
            // The buildspec copies the env file out of the bucket by name
            environment: vec![
                BuildEnvironmentVariable {
                    name: "DOMAIN".to_string(),
                    value: config.backend_domain.clone(),
                },
                BuildEnvironmentVariable {
                    name: "ENVS_BUCKET_NAME".to_string(),
                    value: bucket_name,
                },
            ],
        },
        deploy: DeployStage {
            action_name: format!("{project}-Deploy"),
            application_name: identity.application_name.clone(),
            environment_name: identity.environment_name.clone(),
        },
        role_managed_policies: vec!["AdministratorAccess-AWSElasticBeanstalk".to_string()],
        depends_on: vec![environment_id(identity)],
    }
}
