// ABOUTME: Local container image operations trait.
// ABOUTME: Log in to a registry, build, push and remove tagged images.

use crate::types::ImageRef;
use async_trait::async_trait;
use std::path::Path;

/// Image operations performed by the local container tool.
#[async_trait]
pub trait ImageOps: Send + Sync {
    /// Log in to `registry` with a password read from stdin.
    async fn login(&self, registry: &str, username: &str, password: &str)
    -> Result<(), ImageError>;

    /// Build the image from the given build context directory.
    async fn build(&self, context: &Path, image: &ImageRef) -> Result<(), ImageError>;

    async fn push(&self, image: &ImageRef) -> Result<(), ImageError>;

    /// Remove the local copy of an image.
    async fn remove(&self, image: &ImageRef) -> Result<(), ImageError>;
}

/// Errors from image operations.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("registry login failed: {0}")]
    Login(String),

    #[error("image build failed: {0}")]
    Build(String),

    #[error("image push failed: {0}")]
    Push(String),

    #[error("image removal failed: {0}")]
    Remove(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
