// ABOUTME: Deployment orchestration using the type state pattern.
// ABOUTME: Exports state markers, the create-or-adopt helper and the shared poll loop.

mod deployment;
mod ensure;
mod error;
mod poll;
mod state;
mod transitions;
mod workflow;

pub use deployment::{Deployment, ResourceOutcome};
pub use ensure::{Ensured, ensure_resource};
pub use error::{DeployError, DeployErrorKind, Step};
pub use poll::{
    EnvironmentPhase, EnvironmentWatch, ObservedEnvironment, PollError, PollPolicy, Progress,
    QueryWatch, VersionWatch, Watch, poll_until_terminal, waiting_message,
};
pub use state::{
    ApplicationRegistered, ArtifactUploaded, Completed, EnvironmentReady, ImagePublished,
    Initialized, VersionProcessed,
};
pub use transitions::DeploymentSummary;
pub use workflow::run_deployment;
