// ABOUTME: Cloud collaborators backed by the `aws` command line client.
// ABOUTME: Runs one CLI call per operation, parses JSON output and classifies service errors.

use crate::cloud::CloudError;
use crate::cloud::traits::{
    Application, ApplicationVersion, ArtifactLocation, Environment, EnvironmentRequest,
    EnvironmentStatus, ObjectStoreOps, OptionSetting, PlatformOps, QueryExecution, QueryOps,
    QueryRequest, QueryState, RegistryOps, Repository, VersionRequest, VersionStatus,
};
use crate::types::{ApplicationName, BucketName, EnvironmentName, RepositoryName, VersionLabel};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tempfile::NamedTempFile;
use tokio::process::Command;

pub const DEFAULT_REGION: &str = "us-east-1";

/// Client for ECR, S3, Elastic Beanstalk and Athena through the `aws` CLI.
#[derive(Debug, Clone)]
pub struct AwsCli {
    program: PathBuf,
    region: String,
}

impl AwsCli {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            program: PathBuf::from("aws"),
            region: region.into(),
        }
    }

    /// Use a different executable, e.g. a pinned install path.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Run one CLI call and return its raw stdout.
    async fn invoke(&self, subject: &str, format: &str, args: &[String]) -> Result<Vec<u8>, CloudError> {
        // Argument values may carry option settings; only the operation is logged.
        let operation = args.iter().take(2).map(String::as_str).collect::<Vec<_>>().join(" ");
        tracing::debug!(region = %self.region, %operation, subject, "aws call");

        let output = Command::new(&self.program)
            .arg("--region")
            .arg(&self.region)
            .arg("--output")
            .arg(format)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if output.status.success() {
            return Ok(output.stdout);
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let err = classify_error(&stderr, subject);
        tracing::debug!(subject, error = %err, "aws call failed");
        Err(err)
    }

    async fn call<T: DeserializeOwned>(&self, subject: &str, args: &[String]) -> Result<T, CloudError> {
        let stdout = self.invoke(subject, "json", args).await?;
        Ok(serde_json::from_slice(&stdout)?)
    }

    /// Run a call whose successful output carries nothing we need.
    async fn call_unit(&self, subject: &str, args: &[String]) -> Result<(), CloudError> {
        self.invoke(subject, "json", args).await.map(|_| ())
    }
}

fn args<const N: usize>(parts: [&str; N]) -> Vec<String> {
    parts.iter().map(|p| p.to_string()).collect()
}

/// Write option settings to a temporary JSON file.
///
/// The CLI reads it through a `file://` argument, so setting values never
/// appear on the command line.
pub(crate) fn settings_file(settings: &[OptionSetting]) -> Result<NamedTempFile, CloudError> {
    let mut file = NamedTempFile::new()?;
    serde_json::to_writer(&mut file, settings)?;
    file.flush()?;
    Ok(file)
}

fn file_uri(path: &Path) -> String {
    format!("file://{}", path.display())
}

/// Map CLI stderr to a typed error.
///
/// Service errors look like
/// `An error occurred (Code) when calling the Operation operation: message`.
pub(crate) fn classify_error(stderr: &str, subject: &str) -> CloudError {
    let Some((code, message)) = parse_service_error(stderr) else {
        return CloudError::Command(stderr.trim().to_string());
    };

    // BucketAlreadyExists means another account owns the name.
    let already_exists = (code.contains("AlreadyExists") && code != "BucketAlreadyExists")
        || code == "BucketAlreadyOwnedByYou"
        || (code.starts_with("InvalidParameterValue")
            && message.to_lowercase().contains("already exists"));
    if already_exists {
        return CloudError::AlreadyExists(subject.to_string());
    }

    if code.contains("NotFound") || code.starts_with("NoSuch") || code == "404" {
        return CloudError::NotFound(subject.to_string());
    }

    CloudError::Api { code, message }
}

fn parse_service_error(stderr: &str) -> Option<(String, String)> {
    const MARKER: &str = "An error occurred (";
    let start = stderr.find(MARKER)? + MARKER.len();
    let rest = &stderr[start..];
    let end = rest.find(')')?;
    let code = rest[..end].to_string();
    let message = rest[end..]
        .split_once(": ")
        .map(|(_, m)| m.trim().to_string())
        .unwrap_or_default();
    Some((code, message))
}

#[async_trait]
impl RegistryOps for AwsCli {
    async fn create_repository(&self, name: &RepositoryName) -> Result<Repository, CloudError> {
        let subject = format!("registry repository {name}");
        let resp: wire::CreateRepository = self
            .call(
                &subject,
                &args(["ecr", "create-repository", "--repository-name", name.as_str()]),
            )
            .await?;
        Ok(Repository {
            name: name.clone(),
            uri: resp.repository.repository_uri,
        })
    }

    async fn describe_repository(&self, name: &RepositoryName) -> Result<Repository, CloudError> {
        let subject = format!("registry repository {name}");
        let resp: wire::DescribeRepositories = self
            .call(
                &subject,
                &args(["ecr", "describe-repositories", "--repository-names", name.as_str()]),
            )
            .await?;
        let repo = resp
            .repositories
            .into_iter()
            .find(|r| r.repository_name == name.as_str())
            .ok_or(CloudError::NotFound(subject))?;
        Ok(Repository {
            name: name.clone(),
            uri: repo.repository_uri,
        })
    }

    async fn login_password(&self) -> Result<String, CloudError> {
        let stdout = self
            .invoke("registry login", "text", &args(["ecr", "get-login-password"]))
            .await?;
        let password = String::from_utf8_lossy(&stdout).trim().to_string();
        if password.is_empty() {
            return Err(CloudError::Decode("empty registry password".to_string()));
        }
        Ok(password)
    }
}

#[async_trait]
impl ObjectStoreOps for AwsCli {
    async fn create_bucket(&self, bucket: &BucketName) -> Result<(), CloudError> {
        let subject = format!("bucket {bucket}");
        let mut call = args(["s3api", "create-bucket", "--bucket", bucket.as_str()]);
        // us-east-1 rejects an explicit location constraint.
        if self.region != DEFAULT_REGION {
            let location = serde_json::json!({ "LocationConstraint": self.region });
            call.push("--create-bucket-configuration".to_string());
            call.push(location.to_string());
        }
        self.call_unit(&subject, &call).await
    }

    async fn head_bucket(&self, bucket: &BucketName) -> Result<(), CloudError> {
        let subject = format!("bucket {bucket}");
        self.call_unit(&subject, &args(["s3api", "head-bucket", "--bucket", bucket.as_str()]))
            .await
    }

    async fn put_object(
        &self,
        bucket: &BucketName,
        key: &str,
        file: &Path,
    ) -> Result<ArtifactLocation, CloudError> {
        let location = ArtifactLocation {
            bucket: bucket.clone(),
            key: key.to_string(),
        };
        let body = file.to_string_lossy();
        self.call_unit(
            &location.to_string(),
            &args([
                "s3api",
                "put-object",
                "--bucket",
                bucket.as_str(),
                "--key",
                key,
                "--body",
                body.as_ref(),
            ]),
        )
        .await?;
        Ok(location)
    }
}

#[async_trait]
impl PlatformOps for AwsCli {
    async fn create_application(&self, name: &ApplicationName) -> Result<Application, CloudError> {
        let subject = format!("application {name}");
        let _: wire::CreateApplication = self
            .call(
                &subject,
                &args(["elasticbeanstalk", "create-application", "--application-name", name.as_str()]),
            )
            .await?;
        Ok(Application { name: name.clone() })
    }

    async fn describe_application(&self, name: &ApplicationName) -> Result<Application, CloudError> {
        let subject = format!("application {name}");
        let resp: wire::DescribeApplications = self
            .call(
                &subject,
                &args([
                    "elasticbeanstalk",
                    "describe-applications",
                    "--application-names",
                    name.as_str(),
                ]),
            )
            .await?;
        resp.applications
            .iter()
            .find(|a| a.application_name == name.as_str())
            .map(|_| Application { name: name.clone() })
            .ok_or(CloudError::NotFound(subject))
    }

    async fn create_application_version(
        &self,
        request: &VersionRequest,
    ) -> Result<ApplicationVersion, CloudError> {
        let subject = format!("application version {}", request.label);
        let bundle = serde_json::json!({
            "S3Bucket": request.source.bucket.as_str(),
            "S3Key": request.source.key,
        });
        let resp: wire::CreateApplicationVersion = self
            .call(
                &subject,
                &args([
                    "elasticbeanstalk",
                    "create-application-version",
                    "--application-name",
                    request.application.as_str(),
                    "--version-label",
                    request.label.as_str(),
                    "--source-bundle",
                    bundle.to_string().as_str(),
                    "--process",
                ]),
            )
            .await?;
        Ok(ApplicationVersion {
            application: request.application.clone(),
            label: request.label.clone(),
            status: VersionStatus::from(resp.application_version.status.as_str()),
        })
    }

    async fn describe_application_version(
        &self,
        application: &ApplicationName,
        label: &VersionLabel,
    ) -> Result<ApplicationVersion, CloudError> {
        let subject = format!("application version {label}");
        let resp: wire::DescribeApplicationVersions = self
            .call(
                &subject,
                &args([
                    "elasticbeanstalk",
                    "describe-application-versions",
                    "--application-name",
                    application.as_str(),
                    "--version-labels",
                    label.as_str(),
                ]),
            )
            .await?;
        let version = resp
            .application_versions
            .into_iter()
            .find(|v| v.version_label == label.as_str())
            .ok_or(CloudError::NotFound(subject))?;
        Ok(ApplicationVersion {
            application: application.clone(),
            label: label.clone(),
            status: VersionStatus::from(version.status.as_str()),
        })
    }

    async fn create_environment(&self, request: &EnvironmentRequest) -> Result<Environment, CloudError> {
        let subject = format!("environment {}", request.environment);
        let settings = settings_file(&request.option_settings)?;
        let settings_uri = file_uri(settings.path());
        let resp: wire::Environment = self
            .call(
                &subject,
                &args([
                    "elasticbeanstalk",
                    "create-environment",
                    "--application-name",
                    request.application.as_str(),
                    "--environment-name",
                    request.environment.as_str(),
                    "--version-label",
                    request.version.as_str(),
                    "--solution-stack-name",
                    request.solution_stack.as_str(),
                    "--option-settings",
                    settings_uri.as_str(),
                ]),
            )
            .await?;
        Ok(resp.into_environment(&request.environment))
    }

    async fn describe_environment(&self, name: &EnvironmentName) -> Result<Environment, CloudError> {
        let subject = format!("environment {name}");
        let resp: wire::DescribeEnvironments = self
            .call(
                &subject,
                &args([
                    "elasticbeanstalk",
                    "describe-environments",
                    "--environment-names",
                    name.as_str(),
                    "--no-include-deleted",
                ]),
            )
            .await?;
        resp.environments
            .into_iter()
            .find(|e| e.environment_name == name.as_str())
            .map(|e| e.into_environment(name))
            .ok_or(CloudError::NotFound(subject))
    }

    async fn update_environment(
        &self,
        name: &EnvironmentName,
        settings: &[OptionSetting],
    ) -> Result<Environment, CloudError> {
        let subject = format!("environment {name}");
        let settings = settings_file(settings)?;
        let settings_uri = file_uri(settings.path());
        let resp: wire::Environment = self
            .call(
                &subject,
                &args([
                    "elasticbeanstalk",
                    "update-environment",
                    "--environment-name",
                    name.as_str(),
                    "--option-settings",
                    settings_uri.as_str(),
                ]),
            )
            .await?;
        Ok(resp.into_environment(name))
    }

    async fn deploy_version(
        &self,
        name: &EnvironmentName,
        label: &VersionLabel,
    ) -> Result<Environment, CloudError> {
        let subject = format!("environment {name}");
        let resp: wire::Environment = self
            .call(
                &subject,
                &args([
                    "elasticbeanstalk",
                    "update-environment",
                    "--environment-name",
                    name.as_str(),
                    "--version-label",
                    label.as_str(),
                ]),
            )
            .await?;
        Ok(resp.into_environment(name))
    }
}

#[async_trait]
impl QueryOps for AwsCli {
    async fn start_query(&self, request: &QueryRequest) -> Result<String, CloudError> {
        let result_config = serde_json::json!({ "OutputLocation": request.output_location });
        let mut call = args([
            "athena",
            "start-query-execution",
            "--query-string",
            request.query.as_str(),
            "--result-configuration",
            result_config.to_string().as_str(),
        ]);
        if let Some(database) = &request.database {
            let context = serde_json::json!({ "Database": database });
            call.push("--query-execution-context".to_string());
            call.push(context.to_string());
        }
        let resp: wire::StartQueryExecution = self.call("query", &call).await?;
        Ok(resp.query_execution_id)
    }

    async fn query_execution(&self, id: &str) -> Result<QueryExecution, CloudError> {
        let subject = format!("query execution {id}");
        let resp: wire::GetQueryExecution = self
            .call(
                &subject,
                &args(["athena", "get-query-execution", "--query-execution-id", id]),
            )
            .await?;
        let status = resp.query_execution.status;
        Ok(QueryExecution {
            id: id.to_string(),
            state: QueryState::from(status.state.as_str()),
            reason: status.state_change_reason,
        })
    }
}

/// Response shapes of the CLI's JSON output, reduced to the fields we read.
mod wire {
    use super::{EnvironmentName, EnvironmentStatus};
    use serde::Deserialize;

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct EcrRepository {
        pub repository_name: String,
        pub repository_uri: String,
    }

    #[derive(Deserialize)]
    pub struct CreateRepository {
        pub repository: EcrRepository,
    }

    #[derive(Deserialize)]
    pub struct DescribeRepositories {
        pub repositories: Vec<EcrRepository>,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "PascalCase")]
    pub struct Application {
        pub application_name: String,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "PascalCase")]
    pub struct CreateApplication {
        #[allow(dead_code)]
        pub application: Application,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "PascalCase")]
    pub struct DescribeApplications {
        pub applications: Vec<Application>,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "PascalCase")]
    pub struct ApplicationVersion {
        pub version_label: String,
        pub status: String,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "PascalCase")]
    pub struct CreateApplicationVersion {
        pub application_version: ApplicationVersion,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "PascalCase")]
    pub struct DescribeApplicationVersions {
        pub application_versions: Vec<ApplicationVersion>,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "PascalCase")]
    pub struct Environment {
        pub environment_name: String,
        #[serde(default)]
        pub environment_id: Option<String>,
        #[serde(default)]
        pub version_label: Option<String>,
        pub status: String,
        #[serde(default, rename = "CNAME")]
        pub cname: Option<String>,
    }

    impl Environment {
        pub fn into_environment(self, name: &EnvironmentName) -> super::Environment {
            super::Environment {
                name: name.clone(),
                id: self.environment_id,
                version_label: self.version_label,
                status: EnvironmentStatus::from(self.status.as_str()),
                cname: self.cname,
            }
        }
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "PascalCase")]
    pub struct DescribeEnvironments {
        pub environments: Vec<Environment>,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "PascalCase")]
    pub struct StartQueryExecution {
        pub query_execution_id: String,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "PascalCase")]
    pub struct QueryStatus {
        pub state: String,
        #[serde(default)]
        pub state_change_reason: Option<String>,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "PascalCase")]
    pub struct QueryExecution {
        pub status: QueryStatus,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "PascalCase")]
    pub struct GetQueryExecution {
        pub query_execution: QueryExecution,
    }
}
