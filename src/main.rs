//! stackplan CLI - deployment planner for AWS Elastic Beanstalk
//!
//! Usage: stackplan <COMMAND>
//!
//! Commands:
//!   plan    Produce the full deployment plan
//!   check   Validate configuration and report the derived identity

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};

use stackplan::models::AliasTarget;
use stackplan::planner::environment::EnvironmentPlan;
use stackplan::{
    plan_deployment, AwsCliCatalog, AwsCliNetwork, DeploymentConfig, DeploymentPlan,
    EnvironmentIdentity, FixedStack, RawConfig, ResolvedTopology, StackCatalog,
};

/// stackplan - deployment planner for AWS Elastic Beanstalk
#[derive(Parser, Debug)]
#[command(name = "stackplan")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output format for CI
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Produce the full deployment plan
    Plan {
        /// Path to the config file (default: stackplan.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// AWS CLI profile forwarded to the lookups
        #[arg(long)]
        profile: Option<String>,

        /// Use this solution stack instead of querying the catalog
        #[arg(long)]
        solution_stack: Option<String>,
    },

    /// Validate configuration and report the derived identity
    Check {
        /// Path to the config file (default: stackplan.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Plan {
            config,
            profile,
            solution_stack,
        } => cmd_plan(config.as_deref(), profile, solution_stack, cli.json),
        Commands::Check { config } => cmd_check(config.as_deref(), cli.json),
    }
}

fn load_config(path: Option<&Path>) -> Result<DeploymentConfig> {
    let raw = RawConfig::load(path)?;
    Ok(DeploymentConfig::from_raw(raw)?)
}

fn cmd_plan(
    config_path: Option<&Path>,
    profile: Option<String>,
    solution_stack: Option<String>,
    json: bool,
) -> Result<()> {
    let config = load_config(config_path)?;

    let catalog: Box<dyn StackCatalog> = match solution_stack {
        Some(stack) => Box::new(FixedStack(stack)),
        None => Box::new(AwsCliCatalog::new(config.region, profile.clone())),
    };
    let network = AwsCliNetwork::new(config.region, profile);

    let plan = plan_deployment(&config, catalog.as_ref(), &network)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        print_plan(&plan);
    }
    Ok(())
}

fn print_plan(plan: &DeploymentPlan) {
    println!(
        "Plan: {} ({}, account {})",
        plan.environment.identity.environment_name, plan.region, plan.account
    );
    println!("  application     {}", plan.application.name);
    println!("  solution stack  {}", plan.environment.solution_stack);
    match &plan.topology {
        ResolvedTopology::Shared {
            certificate,
            load_balancer,
        } => {
            println!("  topology        shared load balancer");
            println!("    balancer      {}", load_balancer.identity());
            println!("    certificate   {}", certificate.identity());
        }
        ResolvedTopology::Single { security_group } => {
            println!("  topology        single instance");
            println!(
                "    firewall      {} ({} inbound rules)",
                security_group.name,
                security_group.ingress.len()
            );
        }
    }
    print_environment(&plan.environment);
    println!(
        "  pipeline        {} (Source -> Build -> Deploy)",
        plan.pipeline.name
    );
    println!("    env bucket    {}", plan.pipeline.envs_bucket.name);
}

fn print_environment(environment: &EnvironmentPlan) {
    println!("  options         ({} settings)", environment.options.len());
    for option in &environment.options {
        println!(
            "    {} {} = {}",
            option.namespace, option.option_name, option.value
        );
    }
    match &environment.dns_alias.target {
        AliasTarget::LoadBalancer { identity } => {
            println!(
                "  dns alias       {} -> {}",
                environment.dns_alias.record_name, identity
            );
        }
        AliasTarget::EnvironmentEndpoint {
            dns_name,
            hosted_zone_id,
        } => {
            println!(
                "  dns alias       {} -> {} (zone {})",
                environment.dns_alias.record_name, dns_name, hosted_zone_id
            );
        }
    }
    println!("  depends on      {}", environment.depends_on.join(", "));
}

fn cmd_check(config_path: Option<&Path>, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let identity = EnvironmentIdentity::derive(&config.project_name, config.stage.as_str());

    if json {
        let payload = serde_json::json!({
            "status": "ok",
            "applicationName": identity.application_name,
            "environmentName": identity.environment_name,
            "cnamePrefix": identity.cname_prefix,
            "region": config.region,
            "topology": config.topology,
        });
        println!("{payload}");
    } else {
        println!("✓ Configuration OK");
        println!("  application  {}", identity.application_name);
        println!("  environment  {}", identity.environment_name);
        println!("  cname        {}", identity.cname_prefix);
        println!("  region       {}", config.region);
    }
    Ok(())
}
