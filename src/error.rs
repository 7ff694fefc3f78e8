//! Error types for stackplan
//!
//! Uses `thiserror` for library errors; `anyhow` appears only at the
//! binary boundary.

use thiserror::Error;

/// Result type alias for stackplan operations
pub type PlanResult<T> = Result<T, PlanError>;

/// Main error type for stackplan operations
///
/// Every variant is fatal: planning is a single synchronous pass and
/// aborts on the first error, before any plan is emitted.
#[derive(Error, Debug)]
pub enum PlanError {
    /// Required configuration key absent from file and environment
    #[error("missing required configuration value '{key}'")]
    MissingValue { key: String },

    /// Key in the config file that no configuration slot accepts
    ///
    /// A typo'd optional key would otherwise silently change which
    /// resources the plan creates versus references.
    #[error("unknown configuration key '{key}'")]
    UnknownKey { key: String },

    /// Identifier values must be non-empty and whitespace-free
    #[error("configuration value '{key}' is empty or contains whitespace")]
    Whitespace { key: String },

    /// Value outside a closed enumeration
    #[error("invalid value '{value}' for '{key}' (expected one of: {allowed})")]
    InvalidChoice {
        key: String,
        value: String,
        allowed: String,
    },

    /// Domain values must be syntactically valid hostnames
    #[error("configuration value '{key}' is not a valid hostname: '{value}'")]
    InvalidHostname { key: String, value: String },

    /// ARN with fewer tokens than the region/account fields require
    #[error("malformed ARN for '{key}': '{arn}'")]
    MalformedArn { key: String, arn: String },

    /// Resource ARN points at a different region than the deployment target
    #[error("'{key}' is located in another region ('{arn_region}', deploying to '{region}')")]
    ArnRegionMismatch {
        key: String,
        arn_region: String,
        region: String,
    },

    /// Resource ARN points at a different account than the deployment target
    #[error("'{key}' is located in another account ('{arn_account}', deploying to '{account}')")]
    ArnAccountMismatch {
        key: String,
        arn_account: String,
        account: String,
    },

    /// Solution stack catalog had no entry matching the platform filter
    #[error("cannot find a solution stack matching '{filter}'")]
    NoMatchingStack { filter: String },

    /// Shared load balancer resolved to a VPC with no public subnets
    #[error("shared load balancer '{load_balancer}' exposes no public subnets")]
    EmptySubnetList { load_balancer: String },

    /// Project name sanitized to nothing, leaving no listener rule name
    #[error("project name '{project_name}' contains no characters usable in a listener rule name")]
    EmptyListenerRuleName { project_name: String },

    /// An injected lookup (solution stacks, VPC, load balancer) failed
    #[error("lookup failed: {message}")]
    LookupFailed { message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error (aws CLI output)
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error (config file)
    #[error("config parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}
