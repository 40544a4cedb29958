// ABOUTME: Collaborators a deployment talks to: registry, object store, platform, container tool.
// ABOUTME: Exposes the capability traits and their command-line backed implementations.

mod aws_cli;
mod docker_cli;
mod error;
pub mod traits;

pub use aws_cli::{AwsCli, DEFAULT_REGION};
pub use docker_cli::DockerCli;
pub use error::CloudError;
pub use traits::*;
