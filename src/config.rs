//! Configuration module for stackplan
//!
//! Configuration is a flat map of named string values, merged from two
//! layers:
//! 1. Environment variables (`STACKPLAN_*`, highest priority)
//! 2. Project config file (`stackplan.toml`)
//!
//! The merged `RawConfig` is validated into a typed `DeploymentConfig`
//! before any planning runs. Planners only ever see validated values.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PlanError, PlanResult};

/// Deployment target region (closed set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "us-east-1")]
    UsEast1,
    #[serde(rename = "us-east-2")]
    UsEast2,
    #[serde(rename = "sa-east-1")]
    SaEast1,
}

impl Region {
    pub const ALL: [Region; 3] = [Region::UsEast1, Region::UsEast2, Region::SaEast1];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::UsEast1 => "us-east-1",
            Region::UsEast2 => "us-east-2",
            Region::SaEast1 => "sa-east-1",
        }
    }

    fn parse(key: &str, value: &str) -> PlanResult<Self> {
        match value {
            "us-east-1" => Ok(Region::UsEast1),
            "us-east-2" => Ok(Region::UsEast2),
            "sa-east-1" => Ok(Region::SaEast1),
            _ => Err(PlanError::InvalidChoice {
                key: key.to_string(),
                value: value.to_string(),
                allowed: "us-east-1, us-east-2, sa-east-1".to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const STAGE_CHOICES: [&str; 5] = ["PRODUCTION", "DEVELOPMENT", "STAGING", "DEMO", "TEST"];

/// Deployment stage
///
/// Membership in the closed set is checked case-insensitively, but the
/// configured casing is preserved: the stage string is embedded verbatim
/// in environment and pipeline names and only lowercased where AWS
/// requires it (cname prefix, bucket name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Stage {
    name: String,
}

impl Stage {
    fn parse(key: &str, value: &str) -> PlanResult<Self> {
        let upper = value.to_uppercase();
        if STAGE_CHOICES.contains(&upper.as_str()) {
            Ok(Self {
                name: value.to_string(),
            })
        } else {
            Err(PlanError::InvalidChoice {
                key: key.to_string(),
                value: value.to_string(),
                allowed: STAGE_CHOICES.join(", "),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}

/// Deployment topology choice (closed set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Topology {
    #[serde(rename = "SHARED_LOAD_BALANCER")]
    SharedLoadBalancer,
    #[serde(rename = "SINGLE")]
    Single,
}

impl Topology {
    fn parse(key: &str, value: &str) -> PlanResult<Self> {
        match value {
            "SHARED_LOAD_BALANCER" => Ok(Topology::SharedLoadBalancer),
            "SINGLE" => Ok(Topology::Single),
            _ => Err(PlanError::InvalidChoice {
                key: key.to_string(),
                value: value.to_string(),
                allowed: "SHARED_LOAD_BALANCER, SINGLE".to_string(),
            }),
        }
    }
}

/// GitHub source reference for the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitSource {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    /// Never serialized into plan output
    #[serde(skip_serializing, default)]
    pub oauth_token: String,
}

/// Unvalidated configuration as read from file and environment
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfig {
    pub account: Option<String>,
    pub region: Option<String>,
    pub project_name: Option<String>,
    pub stage_name: Option<String>,
    pub hosted_zone_domain: Option<String>,
    pub certificate_arn: Option<String>,
    pub shared_load_balancer: Option<String>,
    pub topology: Option<String>,
    pub backend_domain: Option<String>,
    pub backend_path: Option<String>,
    pub github_owner: Option<String>,
    pub github_repo: Option<String>,
    pub github_branch: Option<String>,
    pub github_oauth_token: Option<String>,
}

impl RawConfig {
    /// Load the config file, then apply `STACKPLAN_*` environment overrides
    ///
    /// An explicitly given path must exist; the default `stackplan.toml`
    /// is optional (everything can come from the environment).
    pub fn load(path: Option<&Path>) -> PlanResult<Self> {
        let mut raw = match path {
            Some(p) => Self::parse(&fs::read_to_string(p)?)?,
            None => {
                let default = Path::new("stackplan.toml");
                if default.exists() {
                    Self::parse(&fs::read_to_string(default)?)?
                } else {
                    RawConfig::default()
                }
            }
        };
        raw.apply_env_overrides();
        Ok(raw)
    }

    /// Parse TOML, rejecting any key the configuration does not accept
    ///
    /// Serde skips unrecognized keys by default, so a misspelled optional
    /// key like `certificateArn` would quietly flip the plan from
    /// referencing a certificate to creating one.
    fn parse(content: &str) -> PlanResult<Self> {
        let mut unknown_keys = Vec::new();
        let deserializer = toml::de::Deserializer::new(content);
        let raw: RawConfig = serde_ignored::deserialize(deserializer, |path| {
            unknown_keys.push(path.to_string());
        })?;
        if let Some(key) = unknown_keys.into_iter().next() {
            return Err(PlanError::UnknownKey { key });
        }
        Ok(raw)
    }

    /// Apply environment variable overrides (STACKPLAN_* prefix)
    fn apply_env_overrides(&mut self) {
        let overrides: [(&str, &mut Option<String>); 14] = [
            ("STACKPLAN_ACCOUNT", &mut self.account),
            ("STACKPLAN_REGION", &mut self.region),
            ("STACKPLAN_PROJECT_NAME", &mut self.project_name),
            ("STACKPLAN_STAGE_NAME", &mut self.stage_name),
            ("STACKPLAN_HOSTED_ZONE_DOMAIN", &mut self.hosted_zone_domain),
            ("STACKPLAN_CERTIFICATE_ARN", &mut self.certificate_arn),
            ("STACKPLAN_SHARED_LOAD_BALANCER", &mut self.shared_load_balancer),
            ("STACKPLAN_TOPOLOGY", &mut self.topology),
            ("STACKPLAN_BACKEND_DOMAIN", &mut self.backend_domain),
            ("STACKPLAN_BACKEND_PATH", &mut self.backend_path),
            ("STACKPLAN_GITHUB_OWNER", &mut self.github_owner),
            ("STACKPLAN_GITHUB_REPO", &mut self.github_repo),
            ("STACKPLAN_GITHUB_BRANCH", &mut self.github_branch),
            ("STACKPLAN_GITHUB_OAUTHTOKEN", &mut self.github_oauth_token),
        ];
        for (var, slot) in overrides {
            if let Ok(value) = std::env::var(var) {
                *slot = Some(value);
            }
        }
    }
}

/// Validated configuration consumed by the planners
///
/// Constructed once at the program boundary and passed by value into
/// every resolver; no planner reads ambient state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfig {
    pub account: String,
    pub region: Region,
    pub project_name: String,
    pub stage: Stage,
    pub hosted_zone_domain: String,
    pub certificate_arn: Option<String>,
    pub shared_load_balancer_arn: Option<String>,
    pub topology: Topology,
    pub backend_domain: String,
    pub backend_path: String,
    pub source: GitSource,
}

impl DeploymentConfig {
    /// Validate a raw configuration into a typed one
    ///
    /// Fails on the first missing, malformed, or cross-referencing
    /// inconsistent value.
    pub fn from_raw(raw: RawConfig) -> PlanResult<Self> {
        let account = identifier("account", require("account", raw.account)?)?;
        let region = Region::parse("region", &require("region", raw.region)?)?;
        let project_name = identifier("project_name", require("project_name", raw.project_name)?)?;
        let stage = Stage::parse("stage_name", &require("stage_name", raw.stage_name)?)?;
        let hosted_zone_domain = hostname(
            "hosted_zone_domain",
            require("hosted_zone_domain", raw.hosted_zone_domain)?,
        )?;
        let topology = Topology::parse("topology", &require("topology", raw.topology)?)?;
        let backend_domain =
            hostname("backend_domain", require("backend_domain", raw.backend_domain)?)?;
        let backend_path =
            identifier("backend_path", require("backend_path", raw.backend_path)?)?;

        let certificate_arn = optional(raw.certificate_arn);
        let shared_load_balancer_arn = optional(raw.shared_load_balancer);
        if let Some(arn) = &shared_load_balancer_arn {
            check_arn_location("shared_load_balancer", arn, region, &account)?;
        }

        let source = GitSource {
            owner: identifier("github_owner", require("github_owner", raw.github_owner)?)?,
            repo: identifier("github_repo", require("github_repo", raw.github_repo)?)?,
            branch: identifier("github_branch", require("github_branch", raw.github_branch)?)?,
            oauth_token: identifier(
                "github_oauth_token",
                require("github_oauth_token", raw.github_oauth_token)?,
            )?,
        };

        Ok(Self {
            account,
            region,
            project_name,
            stage,
            hosted_zone_domain,
            certificate_arn,
            shared_load_balancer_arn,
            topology,
            backend_domain,
            backend_path,
            source,
        })
    }
}

fn require(key: &str, value: Option<String>) -> PlanResult<String> {
    value.ok_or_else(|| PlanError::MissingValue {
        key: key.to_string(),
    })
}

/// Empty strings in optional slots mean "not configured"
fn optional(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn identifier(key: &str, value: String) -> PlanResult<String> {
    if value.is_empty() || value.chars().any(char::is_whitespace) {
        return Err(PlanError::Whitespace {
            key: key.to_string(),
        });
    }
    Ok(value)
}

fn hostname(key: &str, value: String) -> PlanResult<String> {
    let valid = !value.is_empty()
        && value.len() <= 253
        && value.split('.').all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        });
    if valid {
        Ok(value)
    } else {
        Err(PlanError::InvalidHostname {
            key: key.to_string(),
            value,
        })
    }
}

/// Split an ARN and return its (region, account) tokens
pub fn arn_location<'a>(key: &str, arn: &'a str) -> PlanResult<(&'a str, &'a str)> {
    let tokens: Vec<&str> = arn.split(':').collect();
    if tokens.len() < 6 || tokens[0] != "arn" {
        return Err(PlanError::MalformedArn {
            key: key.to_string(),
            arn: arn.to_string(),
        });
    }
    Ok((tokens[3], tokens[4]))
}

/// Fail unless the ARN lives in the deployment's target region and account
///
/// Certificates and load balancers cannot be referenced cross-region or
/// cross-account for these resource types.
pub fn check_arn_location(
    key: &str,
    arn: &str,
    region: Region,
    account: &str,
) -> PlanResult<()> {
    let (arn_region, arn_account) = arn_location(key, arn)?;
    if arn_region != region.as_str() {
        return Err(PlanError::ArnRegionMismatch {
            key: key.to_string(),
            arn_region: arn_region.to_string(),
            region: region.as_str().to_string(),
        });
    }
    if arn_account != account {
        return Err(PlanError::ArnAccountMismatch {
            key: key.to_string(),
            arn_account: arn_account.to_string(),
            account: account.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawConfig {
        RawConfig {
            account: Some("111111111111".to_string()),
            region: Some("us-east-1".to_string()),
            project_name: Some("api".to_string()),
            stage_name: Some("PRODUCTION".to_string()),
            hosted_zone_domain: Some("example.com".to_string()),
            certificate_arn: None,
            shared_load_balancer: None,
            topology: Some("SINGLE".to_string()),
            backend_domain: Some("api.example.com".to_string()),
            backend_path: Some("/api".to_string()),
            github_owner: Some("acme".to_string()),
            github_repo: Some("backend".to_string()),
            github_branch: Some("main".to_string()),
            github_oauth_token: Some("tok".to_string()),
        }
    }

    #[test]
    fn test_valid_config() {
        let cfg = DeploymentConfig::from_raw(raw()).unwrap();
        assert_eq!(cfg.region, Region::UsEast1);
        assert_eq!(cfg.topology, Topology::Single);
        assert_eq!(cfg.stage.as_str(), "PRODUCTION");
    }

    #[test]
    fn test_missing_value() {
        let mut r = raw();
        r.project_name = None;
        let err = DeploymentConfig::from_raw(r).unwrap_err();
        assert!(matches!(err, PlanError::MissingValue { key } if key == "project_name"));
    }

    #[test]
    fn test_whitespace_identifier_rejected() {
        let mut r = raw();
        r.project_name = Some("my api".to_string());
        assert!(matches!(
            DeploymentConfig::from_raw(r).unwrap_err(),
            PlanError::Whitespace { .. }
        ));
    }

    #[test]
    fn test_region_outside_closed_set() {
        let mut r = raw();
        r.region = Some("eu-west-1".to_string());
        assert!(matches!(
            DeploymentConfig::from_raw(r).unwrap_err(),
            PlanError::InvalidChoice { key, .. } if key == "region"
        ));
    }

    #[test]
    fn test_stage_case_insensitive_preserves_casing() {
        let mut r = raw();
        r.stage_name = Some("Staging".to_string());
        let cfg = DeploymentConfig::from_raw(r).unwrap();
        assert_eq!(cfg.stage.as_str(), "Staging");
    }

    #[test]
    fn test_unknown_stage_rejected() {
        let mut r = raw();
        r.stage_name = Some("QA".to_string());
        assert!(DeploymentConfig::from_raw(r).is_err());
    }

    #[test]
    fn test_unknown_topology_rejected() {
        let mut r = raw();
        r.topology = Some("MULTI".to_string());
        assert!(matches!(
            DeploymentConfig::from_raw(r).unwrap_err(),
            PlanError::InvalidChoice { key, .. } if key == "topology"
        ));
    }

    #[test]
    fn test_invalid_hostname_rejected() {
        let mut r = raw();
        r.backend_domain = Some("-bad.example.com".to_string());
        assert!(matches!(
            DeploymentConfig::from_raw(r).unwrap_err(),
            PlanError::InvalidHostname { .. }
        ));
    }

    #[test]
    fn test_empty_optional_treated_as_absent() {
        let mut r = raw();
        r.certificate_arn = Some(String::new());
        r.shared_load_balancer = Some(String::new());
        let cfg = DeploymentConfig::from_raw(r).unwrap();
        assert!(cfg.certificate_arn.is_none());
        assert!(cfg.shared_load_balancer_arn.is_none());
    }

    #[test]
    fn test_shared_load_balancer_cross_account_rejected() {
        let mut r = raw();
        r.shared_load_balancer = Some(
            "arn:aws:elasticloadbalancing:us-east-1:999999999999:loadbalancer/app/x/y"
                .to_string(),
        );
        assert!(matches!(
            DeploymentConfig::from_raw(r).unwrap_err(),
            PlanError::ArnAccountMismatch { .. }
        ));
    }

    #[test]
    fn test_shared_load_balancer_cross_region_rejected() {
        let mut r = raw();
        r.shared_load_balancer = Some(
            "arn:aws:elasticloadbalancing:us-east-2:111111111111:loadbalancer/app/x/y"
                .to_string(),
        );
        assert!(matches!(
            DeploymentConfig::from_raw(r).unwrap_err(),
            PlanError::ArnRegionMismatch { .. }
        ));
    }

    #[test]
    fn test_arn_location_malformed() {
        assert!(arn_location("certificate_arn", "not-an-arn").is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let toml_src = r#"
            account = "111111111111"
            region = "us-east-2"
            project_name = "shop"
            stage_name = "TEST"
            hosted_zone_domain = "example.org"
            topology = "SHARED_LOAD_BALANCER"
            backend_domain = "api.example.org"
            backend_path = "/api"
            github_owner = "acme"
            github_repo = "shop"
            github_branch = "main"
            github_oauth_token = "tok"
        "#;
        let raw: RawConfig = toml::from_str(toml_src).unwrap();
        let cfg = DeploymentConfig::from_raw(raw).unwrap();
        assert_eq!(cfg.region, Region::UsEast2);
        assert_eq!(cfg.topology, Topology::SharedLoadBalancer);
    }

    #[test]
    fn test_misspelled_optional_key_rejected() {
        // Camel-cased key that serde would otherwise drop silently,
        // planning a new certificate instead of referencing one.
        let toml_src = r#"
            account = "111111111111"
            certificateArn = "arn:aws:acm:us-east-1:111111111111:certificate/abc"
        "#;
        let err = RawConfig::parse(toml_src).unwrap_err();
        assert!(matches!(err, PlanError::UnknownKey { key } if key == "certificateArn"));
    }

    #[test]
    fn test_known_keys_parse_clean() {
        let raw = RawConfig::parse("account = \"111111111111\"").unwrap();
        assert_eq!(raw.account.as_deref(), Some("111111111111"));
    }
}
