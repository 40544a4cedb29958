// ABOUTME: Entry point for the ebdeploy CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use ebdeploy::error::Result;
use ebdeploy::output::{Output, OutputMode};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };
    let mut output = Output::new(mode);

    if let Err(e) = run(cli.command, &mut output).await {
        output.error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(command: Commands, output: &mut Output) -> Result<()> {
    match command {
        Commands::Deploy {
            ecr_name,
            eb_app_name,
            eb_env_name,
            eb_bucket,
            eb_version,
            region,
            poll_interval,
            poll_timeout,
            container_tool,
        } => {
            let args = commands::DeployArgs {
                ecr_name,
                eb_app_name,
                eb_env_name,
                eb_bucket,
                eb_version,
                region,
                poll_interval,
                poll_timeout,
                container_tool,
            };
            commands::deploy(args, output).await
        }
        Commands::ProvisionTable { config, region } => {
            commands::provision_table(&config, region, output).await
        }
        Commands::InitTable { force } => commands::init_table(force, output),
    }
}
