// ABOUTME: Shared types used across cloud trait definitions.
// ABOUTME: Resource descriptions, creation requests, option settings and watched statuses.

use crate::types::{ApplicationName, BucketName, EnvironmentName, RepositoryName, VersionLabel};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A container registry repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub name: RepositoryName,
    /// Fully qualified URI used to tag and push images.
    pub uri: String,
}

/// Where an uploaded object lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLocation {
    pub bucket: BucketName,
    pub key: String,
}

impl fmt::Display for ArtifactLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

/// A platform application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Application {
    pub name: ApplicationName,
}

/// Processing status of an application version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionStatus {
    Processing,
    Processed,
    Building,
    Unprocessed,
    Failed,
    Other(String),
}

impl From<&str> for VersionStatus {
    fn from(value: &str) -> Self {
        match value {
            "PROCESSING" => VersionStatus::Processing,
            "PROCESSED" => VersionStatus::Processed,
            "BUILDING" => VersionStatus::Building,
            "UNPROCESSED" => VersionStatus::Unprocessed,
            "FAILED" => VersionStatus::Failed,
            other => VersionStatus::Other(other.to_string()),
        }
    }
}

impl fmt::Display for VersionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionStatus::Processing => write!(f, "PROCESSING"),
            VersionStatus::Processed => write!(f, "PROCESSED"),
            VersionStatus::Building => write!(f, "BUILDING"),
            VersionStatus::Unprocessed => write!(f, "UNPROCESSED"),
            VersionStatus::Failed => write!(f, "FAILED"),
            VersionStatus::Other(s) => write!(f, "{s}"),
        }
    }
}

/// An application version registered with the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationVersion {
    pub application: ApplicationName,
    pub label: VersionLabel,
    pub status: VersionStatus,
}

/// Request to register an uploaded artifact as a version.
#[derive(Debug, Clone)]
pub struct VersionRequest {
    pub application: ApplicationName,
    pub label: VersionLabel,
    pub source: ArtifactLocation,
}

/// Lifecycle status of an environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentStatus {
    Launching,
    Updating,
    Ready,
    Terminating,
    Terminated,
    Aborting,
    Other(String),
}

impl From<&str> for EnvironmentStatus {
    fn from(value: &str) -> Self {
        match value {
            "Launching" => EnvironmentStatus::Launching,
            "Updating" => EnvironmentStatus::Updating,
            "Ready" => EnvironmentStatus::Ready,
            "Terminating" => EnvironmentStatus::Terminating,
            "Terminated" => EnvironmentStatus::Terminated,
            "Aborting" => EnvironmentStatus::Aborting,
            other => EnvironmentStatus::Other(other.to_string()),
        }
    }
}

impl fmt::Display for EnvironmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvironmentStatus::Launching => write!(f, "Launching"),
            EnvironmentStatus::Updating => write!(f, "Updating"),
            EnvironmentStatus::Ready => write!(f, "Ready"),
            EnvironmentStatus::Terminating => write!(f, "Terminating"),
            EnvironmentStatus::Terminated => write!(f, "Terminated"),
            EnvironmentStatus::Aborting => write!(f, "Aborting"),
            EnvironmentStatus::Other(s) => write!(f, "{s}"),
        }
    }
}

/// A runtime environment as described by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    pub name: EnvironmentName,
    pub id: Option<String>,
    pub version_label: Option<String>,
    pub status: EnvironmentStatus,
    /// Public address, present once the environment has launched.
    pub cname: Option<String>,
}

/// One platform configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OptionSetting {
    pub namespace: String,
    pub option_name: String,
    pub value: String,
}

impl OptionSetting {
    pub fn new(
        namespace: impl Into<String>,
        option_name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            option_name: option_name.into(),
            value: value.into(),
        }
    }
}

/// Request to create an environment running a processed version.
#[derive(Debug, Clone)]
pub struct EnvironmentRequest {
    pub application: ApplicationName,
    pub environment: EnvironmentName,
    pub version: VersionLabel,
    pub solution_stack: String,
    pub option_settings: Vec<OptionSetting>,
}

/// Request to run one analytics query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub query: String,
    pub database: Option<String>,
    pub output_location: String,
}

/// State of an analytics query execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryState {
    Queued,
    Running,
    Succeeded,
    Failed,
    Cancelled,
    Other(String),
}

impl From<&str> for QueryState {
    fn from(value: &str) -> Self {
        match value {
            "QUEUED" => QueryState::Queued,
            "RUNNING" => QueryState::Running,
            "SUCCEEDED" => QueryState::Succeeded,
            "FAILED" => QueryState::Failed,
            "CANCELLED" => QueryState::Cancelled,
            other => QueryState::Other(other.to_string()),
        }
    }
}

impl fmt::Display for QueryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryState::Queued => write!(f, "QUEUED"),
            QueryState::Running => write!(f, "RUNNING"),
            QueryState::Succeeded => write!(f, "SUCCEEDED"),
            QueryState::Failed => write!(f, "FAILED"),
            QueryState::Cancelled => write!(f, "CANCELLED"),
            QueryState::Other(s) => write!(f, "{s}"),
        }
    }
}

/// A query execution as described by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryExecution {
    pub id: String,
    pub state: QueryState,
    pub reason: Option<String>,
}

impl fmt::Display for QueryExecution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            Some(reason) => write!(f, "{} ({reason})", self.state),
            None => write!(f, "{}", self.state),
        }
    }
}
