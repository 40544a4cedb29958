// ABOUTME: Deployment state marker types for the type state pattern.
// ABOUTME: Each state carries what earlier steps produced, so later steps cannot run early.

use crate::cloud::{ArtifactLocation, Environment};
use crate::types::ImageRef;

/// Initial state: option settings loaded, nothing remote touched yet.
/// Available actions: `publish_image()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Initialized;

/// Image pushed to the registry.
/// Available actions: `upload_artifact()`
#[derive(Debug, Clone)]
pub struct ImagePublished {
    pub(crate) image: ImageRef,
}

/// Deployment archive uploaded to the bucket.
/// Available actions: `register_application()`
#[derive(Debug, Clone)]
pub struct ArtifactUploaded {
    pub(crate) image: ImageRef,
    pub(crate) artifact: ArtifactLocation,
}

/// Application exists.
/// Available actions: `register_version()`
#[derive(Debug, Clone)]
pub struct ApplicationRegistered {
    pub(crate) image: ImageRef,
    pub(crate) artifact: ArtifactLocation,
}

/// Version registered and processed.
/// Available actions: `launch_environment()`
#[derive(Debug, Clone)]
pub struct VersionProcessed {
    pub(crate) image: ImageRef,
}

/// Environment ready and running the new version.
/// Available actions: `patch_allowed_hosts()`
#[derive(Debug, Clone)]
pub struct EnvironmentReady {
    pub(crate) image: ImageRef,
    pub(crate) environment: Environment,
}

/// Completed: allowed hosts patched, environment ready again.
/// Available actions: `cleanup_image()`, `finish()`
#[derive(Debug, Clone)]
pub struct Completed {
    pub(crate) image: ImageRef,
    pub(crate) cname: String,
}
