// ABOUTME: State transition methods for deployment orchestration.
// ABOUTME: Each method consumes self and returns the next state on success.

use snafu::{OptionExt, ResultExt};

use crate::artifact::{self, ArtifactError, Descriptor};
use crate::cloud::{
    EnvironmentRequest, ImageOps, ObjectStoreOps, OptionSetting, PlatformOps, RegistryOps,
    VersionRequest,
};
use crate::config::APP_ENV_NAMESPACE;
use crate::diagnostics::{Diagnostics, Warning};
use crate::output::Output;
use crate::types::ImageRef;

use super::Deployment;
use super::deployment::ResourceOutcome;
use super::ensure::ensure_resource;
use super::error::{
    ArtifactSnafu, CloudSnafu, DeployError, ImageSnafu, InvalidImageSnafu, NoAddressSnafu, Step,
    WatchSnafu,
};
use super::poll::{EnvironmentPhase, EnvironmentWatch, VersionWatch, poll_until_terminal};
use super::state::{
    ApplicationRegistered, ArtifactUploaded, Completed, EnvironmentReady, ImagePublished,
    Initialized, VersionProcessed,
};

/// Registry login user for token-based authentication.
const REGISTRY_USERNAME: &str = "AWS";

// =============================================================================
// Initialized -> ImagePublished
// =============================================================================

impl Deployment<Initialized> {
    /// Ensure the repository, then log in, build, tag and push the image.
    #[must_use = "deployment state must be used"]
    pub async fn publish_image<R, I>(
        mut self,
        registry: &R,
        images: &I,
    ) -> Result<Deployment<ImagePublished>, DeployError>
    where
        R: RegistryOps + ?Sized,
        I: ImageOps + ?Sized,
    {
        let step = Step::PublishImage;
        let name = self.config.repository.clone();

        let repository = ensure_resource(
            "repository",
            name.as_str(),
            || registry.create_repository(&name),
            || registry.describe_repository(&name),
        )
        .await
        .context(CloudSnafu { step })?;
        self.record("repository", name.as_str(), repository.was_created());
        let repository = repository.into_inner();

        let image =
            ImageRef::new(&repository.uri, &self.config.version).context(InvalidImageSnafu { step })?;
        let host = image.registry().unwrap_or(image.repository()).to_string();

        let password = registry.login_password().await.context(CloudSnafu { step })?;
        images
            .login(&host, REGISTRY_USERNAME, &password)
            .await
            .context(ImageSnafu { step })?;

        tracing::info!(%image, "building image");
        images
            .build(&self.config.build_context, &image)
            .await
            .context(ImageSnafu { step })?;

        tracing::info!(%image, "pushing image");
        images.push(&image).await.context(ImageSnafu { step })?;

        Ok(self.transition(ImagePublished { image }))
    }
}

// =============================================================================
// ImagePublished -> ArtifactUploaded
// =============================================================================

impl Deployment<ImagePublished> {
    /// Ensure the bucket, package the descriptor and upload the archive.
    #[must_use = "deployment state must be used"]
    pub async fn upload_artifact<S>(
        mut self,
        store: &S,
    ) -> Result<Deployment<ArtifactUploaded>, DeployError>
    where
        S: ObjectStoreOps + ?Sized,
    {
        let step = Step::UploadArtifact;
        let bucket = self.config.bucket.clone();

        let ensured = ensure_resource(
            "bucket",
            bucket.as_str(),
            || store.create_bucket(&bucket),
            || store.head_bucket(&bucket),
        )
        .await
        .context(CloudSnafu { step })?;
        self.record("bucket", bucket.as_str(), ensured.was_created());

        let staging = tempfile::tempdir()
            .map_err(ArtifactError::Io)
            .context(ArtifactSnafu { step })?;
        let descriptor = Descriptor::for_image(&self.state.image);
        let archive = artifact::package(&descriptor, staging.path()).context(ArtifactSnafu { step })?;

        let key = artifact::archive_key(&self.config.application, &self.config.version);
        let location = store
            .put_object(&bucket, &key, &archive)
            .await
            .context(CloudSnafu { step })?;
        tracing::info!(%location, "uploaded deployment archive");

        let image = self.state.image.clone();
        Ok(self.transition(ArtifactUploaded {
            image,
            artifact: location,
        }))
    }
}

// =============================================================================
// ArtifactUploaded -> ApplicationRegistered
// =============================================================================

impl Deployment<ArtifactUploaded> {
    #[must_use = "deployment state must be used"]
    pub async fn register_application<P>(
        mut self,
        platform: &P,
    ) -> Result<Deployment<ApplicationRegistered>, DeployError>
    where
        P: PlatformOps + ?Sized,
    {
        let step = Step::RegisterApplication;
        let name = self.config.application.clone();

        let ensured = ensure_resource(
            "application",
            name.as_str(),
            || platform.create_application(&name),
            || platform.describe_application(&name),
        )
        .await
        .context(CloudSnafu { step })?;
        self.record("application", name.as_str(), ensured.was_created());

        let ArtifactUploaded { image, artifact } = self.state.clone();
        Ok(self.transition(ApplicationRegistered { image, artifact }))
    }
}

// =============================================================================
// ApplicationRegistered -> VersionProcessed
// =============================================================================

impl Deployment<ApplicationRegistered> {
    /// Register the archive as a version and wait for it to be processed.
    #[must_use = "deployment state must be used"]
    pub async fn register_version<P>(
        mut self,
        platform: &P,
        output: &Output,
    ) -> Result<Deployment<VersionProcessed>, DeployError>
    where
        P: PlatformOps + ?Sized,
    {
        let step = Step::RegisterVersion;
        let request = VersionRequest {
            application: self.config.application.clone(),
            label: self.config.version.clone(),
            source: self.state.artifact.clone(),
        };

        let ensured = ensure_resource(
            "version",
            request.label.as_str(),
            || platform.create_application_version(&request),
            || platform.describe_application_version(&request.application, &request.label),
        )
        .await
        .context(CloudSnafu { step })?;
        self.record("version", request.label.as_str(), ensured.was_created());

        let watch = VersionWatch {
            platform,
            application: &request.application,
            label: &request.label,
        };
        poll_until_terminal(&watch, &self.config.poll, output)
            .await
            .context(WatchSnafu { step })?;
        tracing::info!(version = %request.label, "version processed");

        let image = self.state.image.clone();
        Ok(self.transition(VersionProcessed { image }))
    }
}

// =============================================================================
// VersionProcessed -> EnvironmentReady
// =============================================================================

impl Deployment<VersionProcessed> {
    /// Ensure the environment runs the new version and wait until it is ready.
    ///
    /// An adopted environment running another version is switched over.
    #[must_use = "deployment state must be used"]
    pub async fn launch_environment<P>(
        mut self,
        platform: &P,
        output: &Output,
    ) -> Result<Deployment<EnvironmentReady>, DeployError>
    where
        P: PlatformOps + ?Sized,
    {
        let step = Step::LaunchEnvironment;
        let request = EnvironmentRequest {
            application: self.config.application.clone(),
            environment: self.config.environment.clone(),
            version: self.config.version.clone(),
            solution_stack: self.config.solution_stack.clone(),
            option_settings: self.option_settings.clone(),
        };

        let ensured = ensure_resource(
            "environment",
            request.environment.as_str(),
            || platform.create_environment(&request),
            || platform.describe_environment(&request.environment),
        )
        .await
        .context(CloudSnafu { step })?;
        let created = ensured.was_created();
        self.record("environment", request.environment.as_str(), created);

        let mut watch = EnvironmentWatch {
            platform,
            name: &request.environment,
            phase: EnvironmentPhase::Launch,
        };
        let mut ready = poll_until_terminal(&watch, &self.config.poll, output)
            .await
            .context(WatchSnafu { step })?;

        if ready.0.version_label.as_deref() != Some(request.version.as_str()) {
            tracing::info!(
                environment = %request.environment,
                from = ready.0.version_label.as_deref().unwrap_or("none"),
                to = %request.version,
                "switching environment version"
            );
            platform
                .deploy_version(&request.environment, &request.version)
                .await
                .context(CloudSnafu { step })?;
            watch.phase = EnvironmentPhase::Update;
            ready = poll_until_terminal(&watch, &self.config.poll, output)
                .await
                .context(WatchSnafu { step })?;
        }

        let image = self.state.image.clone();
        Ok(self.transition(EnvironmentReady {
            image,
            environment: ready.0,
        }))
    }
}

// =============================================================================
// EnvironmentReady -> Completed
// =============================================================================

impl Deployment<EnvironmentReady> {
    /// Set the allowed-hosts option to the public address and wait for the update.
    #[must_use = "deployment state must be used"]
    pub async fn patch_allowed_hosts<P>(
        self,
        platform: &P,
        output: &Output,
    ) -> Result<Deployment<Completed>, DeployError>
    where
        P: PlatformOps + ?Sized,
    {
        let step = Step::PatchAllowedHosts;
        let name = &self.config.environment;

        let cname = self
            .state
            .environment
            .cname
            .clone()
            .filter(|c| !c.is_empty())
            .context(NoAddressSnafu {
                step,
                environment: name.to_string(),
            })?;

        let setting = OptionSetting::new(
            APP_ENV_NAMESPACE,
            self.config.allowed_hosts_option.as_str(),
            cname.as_str(),
        );
        platform
            .update_environment(name, &[setting])
            .await
            .context(CloudSnafu { step })?;

        let watch = EnvironmentWatch {
            platform,
            name,
            phase: EnvironmentPhase::Update,
        };
        poll_until_terminal(&watch, &self.config.poll, output)
            .await
            .context(WatchSnafu { step })?;
        tracing::info!(%cname, "allowed hosts updated");

        let image = self.state.image.clone();
        Ok(self.transition(Completed { image, cname }))
    }
}

// =============================================================================
// Completed
// =============================================================================

/// What a finished deployment produced.
#[derive(Debug, Clone)]
pub struct DeploymentSummary {
    pub url: String,
    pub image: ImageRef,
    pub outcomes: Vec<ResourceOutcome>,
}

impl Deployment<Completed> {
    /// Remove the local image. Failure only produces a warning.
    pub async fn cleanup_image<I>(&self, images: &I, diag: &mut Diagnostics)
    where
        I: ImageOps + ?Sized,
    {
        if let Err(e) = images.remove(&self.state.image).await {
            diag.warn(Warning::image_cleanup(format!(
                "failed to remove local image {}: {e}",
                self.state.image
            )));
        }
    }

    pub fn finish(self) -> DeploymentSummary {
        DeploymentSummary {
            url: self.url(),
            image: self.state.image,
            outcomes: self.outcomes,
        }
    }
}
