// ABOUTME: Object store operations trait.
// ABOUTME: Create and check buckets, upload deployment archives.

use super::shared_types::ArtifactLocation;
use crate::cloud::CloudError;
use crate::types::BucketName;
use async_trait::async_trait;
use std::path::Path;

/// Object store operations: bucket lifecycle and uploads.
#[async_trait]
pub trait ObjectStoreOps: Send + Sync {
    /// Create a bucket. Fails with `AlreadyExists` if we already own it.
    async fn create_bucket(&self, bucket: &BucketName) -> Result<(), CloudError>;

    /// Check that a bucket exists and is reachable.
    async fn head_bucket(&self, bucket: &BucketName) -> Result<(), CloudError>;

    /// Upload a local file under `key`.
    async fn put_object(
        &self,
        bucket: &BucketName,
        key: &str,
        file: &Path,
    ) -> Result<ArtifactLocation, CloudError>;
}
