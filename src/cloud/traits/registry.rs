// ABOUTME: Container registry operations trait.
// ABOUTME: Create and describe repositories, fetch a push credential.

use super::shared_types::Repository;
use crate::cloud::CloudError;
use crate::types::RepositoryName;
use async_trait::async_trait;

/// Registry operations: create, describe, authenticate.
#[async_trait]
pub trait RegistryOps: Send + Sync {
    /// Create a repository. Fails with `AlreadyExists` if it is present.
    async fn create_repository(&self, name: &RepositoryName) -> Result<Repository, CloudError>;

    /// Describe an existing repository.
    async fn describe_repository(&self, name: &RepositoryName)
    -> Result<Repository, CloudError>;

    /// Short-lived password for `docker login` against this registry.
    async fn login_password(&self) -> Result<String, CloudError>;
}
