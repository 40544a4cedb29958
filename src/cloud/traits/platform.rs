// ABOUTME: Platform control plane operations trait.
// ABOUTME: Applications, application versions and environments.

use super::shared_types::{
    Application, ApplicationVersion, Environment, EnvironmentRequest, OptionSetting,
    VersionRequest,
};
use crate::cloud::CloudError;
use crate::types::{ApplicationName, EnvironmentName, VersionLabel};
use async_trait::async_trait;

/// Platform operations. Describe calls return `NotFound` when nothing matches.
#[async_trait]
pub trait PlatformOps: Send + Sync {
    async fn create_application(&self, name: &ApplicationName)
    -> Result<Application, CloudError>;

    async fn describe_application(
        &self,
        name: &ApplicationName,
    ) -> Result<Application, CloudError>;

    /// Register an uploaded artifact and start processing it.
    async fn create_application_version(
        &self,
        request: &VersionRequest,
    ) -> Result<ApplicationVersion, CloudError>;

    async fn describe_application_version(
        &self,
        application: &ApplicationName,
        label: &VersionLabel,
    ) -> Result<ApplicationVersion, CloudError>;

    async fn create_environment(
        &self,
        request: &EnvironmentRequest,
    ) -> Result<Environment, CloudError>;

    async fn describe_environment(&self, name: &EnvironmentName)
    -> Result<Environment, CloudError>;

    /// Apply option settings to a running environment.
    async fn update_environment(
        &self,
        name: &EnvironmentName,
        settings: &[OptionSetting],
    ) -> Result<Environment, CloudError>;

    /// Point a running environment at another processed version.
    async fn deploy_version(
        &self,
        name: &EnvironmentName,
        label: &VersionLabel,
    ) -> Result<Environment, CloudError>;
}
