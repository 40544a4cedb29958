// ABOUTME: Local image operations backed by the `docker` command line tool.
// ABOUTME: Output is streamed to the terminal; only the exit status is inspected.

use crate::cloud::traits::{ImageError, ImageOps};
use crate::types::ImageRef;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

#[derive(Debug, Clone)]
pub struct DockerCli {
    program: PathBuf,
}

impl Default for DockerCli {
    fn default() -> Self {
        Self {
            program: PathBuf::from("docker"),
        }
    }
}

impl DockerCli {
    /// Use a compatible tool instead of `docker`, e.g. `podman`.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        command
    }
}

fn describe(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

#[async_trait]
impl ImageOps for DockerCli {
    async fn login(&self, registry: &str, username: &str, password: &str) -> Result<(), ImageError> {
        tracing::debug!("Logging in to registry {}", registry);
        let mut child = self
            .command()
            .arg("login")
            .arg("--username")
            .arg(username)
            .arg("--password-stdin")
            .arg(registry)
            .stdin(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(password.as_bytes()).await?;
        }

        let status = child.wait().await?;
        if status.success() {
            Ok(())
        } else {
            Err(ImageError::Login(describe(status)))
        }
    }

    async fn build(&self, context: &Path, image: &ImageRef) -> Result<(), ImageError> {
        tracing::debug!("Building image {} from {}", image, context.display());
        let status = self
            .command()
            .arg("build")
            .arg("--tag")
            .arg(image.to_string())
            .arg(".")
            .current_dir(context)
            .status()
            .await?;
        if status.success() {
            Ok(())
        } else {
            Err(ImageError::Build(describe(status)))
        }
    }

    async fn push(&self, image: &ImageRef) -> Result<(), ImageError> {
        tracing::debug!("Pushing image {}", image);
        let status = self.command().arg("push").arg(image.to_string()).status().await?;
        if status.success() {
            Ok(())
        } else {
            Err(ImageError::Push(describe(status)))
        }
    }

    async fn remove(&self, image: &ImageRef) -> Result<(), ImageError> {
        let status = self.command().arg("rmi").arg(image.to_string()).status().await?;
        if status.success() {
            Ok(())
        } else {
            Err(ImageError::Remove(describe(status)))
        }
    }
}
