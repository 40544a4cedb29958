// ABOUTME: Application-wide error types for ebdeploy.
// ABOUTME: Uses thiserror for ergonomic error handling.

use crate::deploy::DeployError;
use crate::provision::ProvisionError;
use crate::types::{ResourceNameError, VersionLabelError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("file already exists: {0} (use --force to overwrite)")]
    AlreadyExists(PathBuf),

    #[error("no .env file found at {0}")]
    MissingEnvFile(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read {path}: {message}")]
    Dotenv { path: PathBuf, message: String },

    #[error(transparent)]
    InvalidName(#[from] ResourceNameError),

    #[error(transparent)]
    InvalidVersion(#[from] VersionLabelError),

    #[error("deployment failed at {0}")]
    Deploy(#[from] DeployError),

    #[error("table provisioning failed: {0}")]
    Provision(#[from] ProvisionError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
