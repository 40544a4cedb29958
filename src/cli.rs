// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "ebdeploy")]
#[command(about = "Deploy a containerised web application to Elastic Beanstalk")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print the final result and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build and push the image, then deploy it as a new application version
    Deploy {
        /// Container registry repository name
        #[arg(long)]
        ecr_name: String,

        /// Application name
        #[arg(long)]
        eb_app_name: String,

        /// Environment name
        #[arg(long)]
        eb_env_name: String,

        /// Bucket receiving the deployment archive
        #[arg(long)]
        eb_bucket: String,

        /// Version label, also used as the image tag
        #[arg(long)]
        eb_version: String,

        /// Region (defaults to AWS_REGION, then AWS_DEFAULT_REGION, then us-east-1)
        #[arg(long)]
        region: Option<String>,

        /// Delay between status checks
        #[arg(long, default_value = "10s", value_parser = parse_poll_interval)]
        poll_interval: Duration,

        /// Give up waiting on a resource after this long
        #[arg(long, default_value = "30m", value_parser = humantime::parse_duration)]
        poll_timeout: Duration,

        /// Container tool used to build and push the image (docker or podman)
        #[arg(long, default_value = "docker")]
        container_tool: PathBuf,
    },

    /// Create the analytics database and table described in a YAML file
    ProvisionTable {
        /// Table definition file
        #[arg(short, long, default_value = "athena_table.yml")]
        config: PathBuf,

        /// Region (defaults to AWS_REGION, then AWS_DEFAULT_REGION, then us-east-1)
        #[arg(long)]
        region: Option<String>,
    },

    /// Write an athena_table.yml template
    InitTable {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

/// Parse a poll interval, rejecting zero so status checks never spin.
fn parse_poll_interval(value: &str) -> Result<Duration, String> {
    let interval = humantime::parse_duration(value).map_err(|e| e.to_string())?;
    if interval.is_zero() {
        return Err("poll interval must be greater than zero".to_string());
    }
    Ok(interval)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_interval_accepts_humantime() {
        assert_eq!(parse_poll_interval("2s"), Ok(Duration::from_secs(2)));
        assert_eq!(parse_poll_interval("500ms"), Ok(Duration::from_millis(500)));
    }

    #[test]
    fn poll_interval_rejects_zero() {
        let err = parse_poll_interval("0s").unwrap_err();
        assert!(err.contains("greater than zero"));
    }

    #[test]
    fn poll_interval_rejects_garbage() {
        assert!(parse_poll_interval("soon").is_err());
    }
}
