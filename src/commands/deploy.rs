// ABOUTME: Deploy command implementation.
// ABOUTME: Builds the configuration from flags and drives the deployment workflow.

use ebdeploy::cloud::{AwsCli, DockerCli};
use ebdeploy::config::{DeployConfig, DeployTargets, resolve_region};
use ebdeploy::deploy::{PollPolicy, run_deployment};
use ebdeploy::diagnostics::Diagnostics;
use ebdeploy::error::Result;
use ebdeploy::output::Output;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Flags accepted by `ebdeploy deploy`.
pub struct DeployArgs {
    pub ecr_name: String,
    pub eb_app_name: String,
    pub eb_env_name: String,
    pub eb_bucket: String,
    pub eb_version: String,
    pub region: Option<String>,
    pub poll_interval: Duration,
    pub poll_timeout: Duration,
    pub container_tool: PathBuf,
}

/// Deploy the project in the current directory.
pub async fn deploy(args: DeployArgs, output: &mut Output) -> Result<()> {
    let targets = DeployTargets::parse(
        &args.ecr_name,
        &args.eb_app_name,
        &args.eb_env_name,
        &args.eb_bucket,
        &args.eb_version,
    )?;
    let region = resolve_region(args.region);
    let cwd = env::current_dir()?;
    let config = DeployConfig::for_project(&cwd, targets)
        .with_poll(PollPolicy::new(args.poll_interval, args.poll_timeout));

    let aws = AwsCli::new(region);
    let docker = DockerCli::with_program(args.container_tool);
    tracing::debug!(region = aws.region(), dir = %cwd.display(), "starting deployment");

    let mut diag = Diagnostics::default();

    output.start_timer();
    let summary = run_deployment(config, &aws, &docker, output, &mut diag).await?;

    for outcome in &summary.outcomes {
        let verb = if outcome.created { "created" } else { "reused" };
        output.progress(&format!("  {} {} {}", verb, outcome.kind, outcome.name));
    }

    // Emit collected warnings
    for warning in diag.warnings() {
        output.warning(&warning.message);
    }

    output.success(&format!("Application deployed at: {}", summary.url));
    Ok(())
}
