// ABOUTME: Runs the whole deployment from local preconditions to the public URL.
// ABOUTME: Steps run strictly in order; the first failure aborts the run.

use crate::cloud::{CloudServices, ImageOps};
use crate::config::DeployConfig;
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::output::Output;

use super::Deployment;
use super::transitions::DeploymentSummary;

/// Deploy `config.version` and return where it is served.
///
/// Option settings are assembled before any remote call, so a missing
/// `.env` or options file fails without touching any service.
pub async fn run_deployment<C, I>(
    config: DeployConfig,
    cloud: &C,
    images: &I,
    output: &Output,
    diag: &mut Diagnostics,
) -> Result<DeploymentSummary>
where
    C: CloudServices + ?Sized,
    I: ImageOps + ?Sized,
{
    let settings = config.load_option_settings(diag)?;

    output.progress(&format!(
        "Deploying {} version {} to {}",
        config.application, config.version, config.environment
    ));
    let deployment = Deployment::new(config, settings);

    output.progress("  → Publishing image...");
    let deployment = deployment.publish_image(cloud, images).await?;

    output.progress("  → Uploading deployment archive...");
    let deployment = deployment.upload_artifact(cloud).await?;

    output.progress("  → Registering application...");
    let deployment = deployment.register_application(cloud).await?;

    output.progress("  → Registering version and waiting for processing...");
    let deployment = deployment.register_version(cloud, output).await?;

    output.progress("  → Launching environment and waiting until ready...");
    let deployment = deployment.launch_environment(cloud, output).await?;

    output.progress("  → Updating allowed hosts...");
    let deployment = deployment.patch_allowed_hosts(cloud, output).await?;

    deployment.cleanup_image(images, diag).await;

    Ok(deployment.finish())
}
