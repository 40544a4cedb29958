// ABOUTME: Deployment error types with SNAFU pattern.
// ABOUTME: Every variant names the workflow step that failed.

use snafu::Snafu;
use std::fmt;

use super::poll::PollError;
use crate::artifact::ArtifactError;
use crate::cloud::{CloudError, ImageError};
use crate::types::ParseImageRefError;

/// Workflow steps, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    PublishImage,
    UploadArtifact,
    RegisterApplication,
    RegisterVersion,
    LaunchEnvironment,
    PatchAllowedHosts,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::PublishImage => "publish image",
            Step::UploadArtifact => "upload artifact",
            Step::RegisterApplication => "register application",
            Step::RegisterVersion => "register version",
            Step::LaunchEnvironment => "launch environment",
            Step::PatchAllowedHosts => "patch allowed hosts",
        };
        f.write_str(name)
    }
}

/// Errors that abort a deployment.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DeployError {
    #[snafu(display("{step}: {source}"))]
    Cloud { step: Step, source: CloudError },

    #[snafu(display("{step}: {source}"))]
    Image { step: Step, source: ImageError },

    #[snafu(display("{step}: {source}"))]
    Artifact { step: Step, source: ArtifactError },

    #[snafu(display("{step}: {source}"))]
    Watch { step: Step, source: PollError },

    #[snafu(display("{step}: invalid image reference: {source}"))]
    InvalidImage {
        step: Step,
        source: ParseImageRefError,
    },

    #[snafu(display("{step}: environment {environment} has no public address"))]
    NoAddress { step: Step, environment: String },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployErrorKind {
    /// A resource that should exist could not be found.
    MissingResource,
    /// A watched resource reported a failed state.
    TerminalFailure,
    /// A watched resource did not settle before the deadline.
    TimedOut,
    /// The local container tool failed.
    ImageTool,
    /// The deployment archive could not be built.
    Packaging,
    /// Any other service error.
    Api,
}

impl DeployError {
    /// The step that was running when the deployment failed.
    pub fn step(&self) -> Step {
        match self {
            DeployError::Cloud { step, .. }
            | DeployError::Image { step, .. }
            | DeployError::Artifact { step, .. }
            | DeployError::Watch { step, .. }
            | DeployError::InvalidImage { step, .. }
            | DeployError::NoAddress { step, .. } => *step,
        }
    }

    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> DeployErrorKind {
        match self {
            DeployError::Cloud { source, .. } => cloud_kind(source),
            DeployError::Watch { source, .. } => match source {
                PollError::Missing(_) => DeployErrorKind::MissingResource,
                PollError::Failed { .. } => DeployErrorKind::TerminalFailure,
                PollError::TimedOut { .. } => DeployErrorKind::TimedOut,
                PollError::Cloud(e) => cloud_kind(e),
            },
            DeployError::Image { .. } => DeployErrorKind::ImageTool,
            DeployError::Artifact { .. } | DeployError::InvalidImage { .. } => {
                DeployErrorKind::Packaging
            }
            DeployError::NoAddress { .. } => DeployErrorKind::MissingResource,
        }
    }
}

fn cloud_kind(err: &CloudError) -> DeployErrorKind {
    if err.is_not_found() {
        DeployErrorKind::MissingResource
    } else {
        DeployErrorKind::Api
    }
}
