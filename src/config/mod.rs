// ABOUTME: Deployment configuration: target names, fixed project paths and polling.
// ABOUTME: Loads option settings from eb_options.yaml and src/.env and resolves the region.

mod init;
mod options;
mod table;

pub use init::init_table_config;
pub use options::{
    APP_ENV_NAMESPACE, load_dotenv, load_option_file, merge_options, parse_dotenv,
    parse_option_file, warn_duplicates,
};
pub use table::{Column, TABLE_CONFIG_FILENAME, TableConfig};

use crate::cloud::{DEFAULT_REGION, OptionSetting};
use crate::deploy::PollPolicy;
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::types::{ApplicationName, BucketName, EnvironmentName, RepositoryName, VersionLabel};
use std::path::{Path, PathBuf};

pub const OPTIONS_FILENAME: &str = "eb_options.yaml";
pub const DOTENV_PATH: &str = "src/.env";
pub const BUILD_CONTEXT: &str = "src";
pub const SOLUTION_STACK: &str = "64bit Amazon Linux 2023 v4.5.1 running Docker";
pub const ALLOWED_HOSTS_OPTION: &str = "DJANGO_ALLOWED_HOSTS";

/// Everything a deployment run needs to know before it talks to any service.
#[derive(Debug, Clone)]
pub struct DeployConfig {
    pub repository: RepositoryName,
    pub bucket: BucketName,
    pub application: ApplicationName,
    pub environment: EnvironmentName,
    pub version: VersionLabel,
    pub build_context: PathBuf,
    pub options_file: PathBuf,
    pub dotenv_file: PathBuf,
    pub solution_stack: String,
    pub allowed_hosts_option: String,
    pub poll: PollPolicy,
}

/// Validated target names as given on the command line.
#[derive(Debug, Clone)]
pub struct DeployTargets {
    pub repository: RepositoryName,
    pub bucket: BucketName,
    pub application: ApplicationName,
    pub environment: EnvironmentName,
    pub version: VersionLabel,
}

impl DeployTargets {
    pub fn parse(
        repository: &str,
        application: &str,
        environment: &str,
        bucket: &str,
        version: &str,
    ) -> Result<Self> {
        Ok(DeployTargets {
            repository: RepositoryName::new(repository)?,
            bucket: BucketName::new(bucket)?,
            application: ApplicationName::new(application)?,
            environment: EnvironmentName::new(environment)?,
            version: VersionLabel::new(version)?,
        })
    }
}

impl DeployConfig {
    /// Configuration for a project rooted at `dir`, using the fixed file layout.
    pub fn for_project(dir: &Path, targets: DeployTargets) -> Self {
        DeployConfig {
            repository: targets.repository,
            bucket: targets.bucket,
            application: targets.application,
            environment: targets.environment,
            version: targets.version,
            build_context: dir.join(BUILD_CONTEXT),
            options_file: dir.join(OPTIONS_FILENAME),
            dotenv_file: dir.join(DOTENV_PATH),
            solution_stack: SOLUTION_STACK.to_string(),
            allowed_hosts_option: ALLOWED_HOSTS_OPTION.to_string(),
            poll: PollPolicy::default(),
        }
    }

    pub fn with_poll(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    /// Assemble the environment option settings.
    ///
    /// The dotenv file is checked first so a missing one is reported before
    /// anything else is read.
    pub fn load_option_settings(&self, diag: &mut Diagnostics) -> Result<Vec<OptionSetting>> {
        let env_vars = load_dotenv(&self.dotenv_file)?;
        let file_settings = load_option_file(&self.options_file)?;
        let settings = merge_options(file_settings, env_vars);
        warn_duplicates(&settings, diag);
        tracing::debug!(count = settings.len(), "assembled option settings");
        Ok(settings)
    }
}

/// Pick the region: explicit value, then `AWS_REGION`, then `AWS_DEFAULT_REGION`.
pub fn resolve_region(explicit: Option<String>) -> String {
    explicit
        .filter(|r| !r.is_empty())
        .or_else(|| std::env::var("AWS_REGION").ok().filter(|r| !r.is_empty()))
        .or_else(|| {
            std::env::var("AWS_DEFAULT_REGION")
                .ok()
                .filter(|r| !r.is_empty())
        })
        .unwrap_or_else(|| DEFAULT_REGION.to_string())
}
