// ABOUTME: Test support utilities.
// ABOUTME: In-memory fake cloud and container tool with scripted statuses and call logs.

// Each test binary only uses some of these helpers, so allow dead_code.
#![allow(dead_code)]

use async_trait::async_trait;
use ebdeploy::cloud::{
    Application, ApplicationVersion, ArtifactLocation, CloudError, Environment, EnvironmentRequest,
    EnvironmentStatus, ImageError, ImageOps, ObjectStoreOps, OptionSetting, PlatformOps,
    QueryExecution, QueryOps, QueryRequest, QueryState, RegistryOps, Repository, VersionRequest,
    VersionStatus,
};
use ebdeploy::config::{DeployConfig, DeployTargets};
use ebdeploy::deploy::PollPolicy;
use ebdeploy::types::{
    ApplicationName, BucketName, EnvironmentName, ImageRef, RepositoryName, VersionLabel,
};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::time::Duration;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env()
            .add_directive("ebdeploy=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub const REGISTRY_HOST: &str = "123456789012.dkr.ecr.us-east-1.amazonaws.com";
pub const CNAME: &str = "my-app-env.eba-abc123.us-east-1.elasticbeanstalk.com";

/// Statuses handed out one per describe call; the last one repeats.
#[derive(Debug, Clone)]
struct Script<T>(VecDeque<T>);

impl<T: Clone> Script<T> {
    fn new(items: impl IntoIterator<Item = T>) -> Self {
        Script(items.into_iter().collect())
    }

    fn next(&mut self) -> T {
        if self.0.len() > 1 {
            self.0.pop_front().expect("script is non-empty")
        } else {
            self.0.front().cloned().expect("script is non-empty")
        }
    }
}

#[derive(Debug)]
struct FakeEnvironment {
    version_label: String,
    statuses: Script<EnvironmentStatus>,
    settings: Vec<OptionSetting>,
}

#[derive(Default)]
struct State {
    calls: Vec<String>,
    repositories: HashSet<String>,
    buckets: HashSet<String>,
    objects: HashMap<(String, String), Vec<u8>>,
    applications: HashSet<String>,
    versions: HashMap<(String, String), Script<VersionStatus>>,
    environments: HashMap<String, FakeEnvironment>,
    queries: Vec<(String, QueryRequest)>,
    query_states: HashMap<String, Script<QueryState>>,
    version_script: Vec<VersionStatus>,
    launch_script: Vec<EnvironmentStatus>,
    update_script: Vec<EnvironmentStatus>,
    query_script: Vec<QueryState>,
    cname: Option<String>,
}

/// In-memory stand-in for the registry, object store, platform and query service.
pub struct FakeCloud {
    state: Mutex<State>,
}

impl Default for FakeCloud {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeCloud {
    pub fn new() -> Self {
        FakeCloud {
            state: Mutex::new(State {
                version_script: vec![VersionStatus::Processing, VersionStatus::Processed],
                launch_script: vec![EnvironmentStatus::Launching, EnvironmentStatus::Ready],
                update_script: vec![EnvironmentStatus::Updating, EnvironmentStatus::Ready],
                query_script: vec![QueryState::Running, QueryState::Succeeded],
                cname: Some(CNAME.to_string()),
                ..State::default()
            }),
        }
    }

    /// Statuses a newly registered version reports, one per describe.
    pub fn with_version_statuses(self, statuses: Vec<VersionStatus>) -> Self {
        self.state.lock().version_script = statuses;
        self
    }

    /// Statuses a newly created environment reports, one per describe.
    pub fn with_launch_statuses(self, statuses: Vec<EnvironmentStatus>) -> Self {
        self.state.lock().launch_script = statuses;
        self
    }

    /// Statuses reported after each environment update.
    pub fn with_update_statuses(self, statuses: Vec<EnvironmentStatus>) -> Self {
        self.state.lock().update_script = statuses;
        self
    }

    pub fn with_query_states(self, states: Vec<QueryState>) -> Self {
        self.state.lock().query_script = states;
        self
    }

    pub fn without_cname(self) -> Self {
        self.state.lock().cname = None;
        self
    }

    /// Pre-create an application so the next create reports a conflict.
    pub fn with_application(self, name: &str) -> Self {
        self.state.lock().applications.insert(name.to_string());
        self
    }

    /// Pre-create a ready environment running `version`.
    pub fn with_environment(self, name: &str, version: &str) -> Self {
        self.state.lock().environments.insert(
            name.to_string(),
            FakeEnvironment {
                version_label: version.to_string(),
                statuses: Script::new([EnvironmentStatus::Ready]),
                settings: Vec::new(),
            },
        );
        self
    }

    /// Every call made, in order, as `"operation name"`.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    pub fn calls_to(&self, operation: &str) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| c.split(' ').next() == Some(operation))
            .count()
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.state
            .lock()
            .objects
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn environment_settings(&self, name: &str) -> Vec<OptionSetting> {
        self.state
            .lock()
            .environments
            .get(name)
            .map(|e| e.settings.clone())
            .unwrap_or_default()
    }

    pub fn environment_version(&self, name: &str) -> Option<String> {
        self.state
            .lock()
            .environments
            .get(name)
            .map(|e| e.version_label.clone())
    }

    pub fn started_queries(&self) -> Vec<QueryRequest> {
        self.state
            .lock()
            .queries
            .iter()
            .map(|(_, q)| q.clone())
            .collect()
    }

    fn log(&self, operation: &str, subject: &str) {
        self.state.lock().calls.push(format!("{operation} {subject}"));
    }

    fn repository(name: &RepositoryName) -> Repository {
        Repository {
            name: name.clone(),
            uri: format!("{REGISTRY_HOST}/{name}"),
        }
    }

    fn describe_env(state: &mut State, name: &EnvironmentName) -> Result<Environment, CloudError> {
        let cname = state.cname.clone();
        let env = state
            .environments
            .get_mut(name.as_str())
            .ok_or_else(|| CloudError::NotFound(format!("environment {name}")))?;
        let status = env.statuses.next();
        let launched = !matches!(status, EnvironmentStatus::Launching);
        Ok(Environment {
            name: name.clone(),
            id: Some(format!("e-{name}")),
            version_label: Some(env.version_label.clone()),
            status,
            cname: if launched { cname } else { None },
        })
    }

    fn restart_updates(state: &mut State, name: &EnvironmentName) -> Result<(), CloudError> {
        let script = Script::new(state.update_script.clone());
        let env = state
            .environments
            .get_mut(name.as_str())
            .ok_or_else(|| CloudError::NotFound(format!("environment {name}")))?;
        env.statuses = script;
        Ok(())
    }
}

#[async_trait]
impl RegistryOps for FakeCloud {
    async fn create_repository(&self, name: &RepositoryName) -> Result<Repository, CloudError> {
        self.log("create_repository", name.as_str());
        if !self.state.lock().repositories.insert(name.to_string()) {
            return Err(CloudError::AlreadyExists(format!("repository {name}")));
        }
        Ok(Self::repository(name))
    }

    async fn describe_repository(&self, name: &RepositoryName) -> Result<Repository, CloudError> {
        self.log("describe_repository", name.as_str());
        if self.state.lock().repositories.contains(name.as_str()) {
            Ok(Self::repository(name))
        } else {
            Err(CloudError::NotFound(format!("repository {name}")))
        }
    }

    async fn login_password(&self) -> Result<String, CloudError> {
        self.log("login_password", "");
        Ok("token".to_string())
    }
}

#[async_trait]
impl ObjectStoreOps for FakeCloud {
    async fn create_bucket(&self, bucket: &BucketName) -> Result<(), CloudError> {
        self.log("create_bucket", bucket.as_str());
        if !self.state.lock().buckets.insert(bucket.to_string()) {
            return Err(CloudError::AlreadyExists(format!("bucket {bucket}")));
        }
        Ok(())
    }

    async fn head_bucket(&self, bucket: &BucketName) -> Result<(), CloudError> {
        self.log("head_bucket", bucket.as_str());
        if self.state.lock().buckets.contains(bucket.as_str()) {
            Ok(())
        } else {
            Err(CloudError::NotFound(format!("bucket {bucket}")))
        }
    }

    async fn put_object(
        &self,
        bucket: &BucketName,
        key: &str,
        body: &Path,
    ) -> Result<ArtifactLocation, CloudError> {
        self.log("put_object", key);
        let bytes = std::fs::read(body)?;
        self.state
            .lock()
            .objects
            .insert((bucket.to_string(), key.to_string()), bytes);
        Ok(ArtifactLocation {
            bucket: bucket.clone(),
            key: key.to_string(),
        })
    }
}

#[async_trait]
impl PlatformOps for FakeCloud {
    async fn create_application(&self, name: &ApplicationName) -> Result<Application, CloudError> {
        self.log("create_application", name.as_str());
        if !self.state.lock().applications.insert(name.to_string()) {
            return Err(CloudError::AlreadyExists(format!("application {name}")));
        }
        Ok(Application { name: name.clone() })
    }

    async fn describe_application(
        &self,
        name: &ApplicationName,
    ) -> Result<Application, CloudError> {
        self.log("describe_application", name.as_str());
        if self.state.lock().applications.contains(name.as_str()) {
            Ok(Application { name: name.clone() })
        } else {
            Err(CloudError::NotFound(format!("application {name}")))
        }
    }

    async fn create_application_version(
        &self,
        request: &VersionRequest,
    ) -> Result<ApplicationVersion, CloudError> {
        self.log("create_application_version", request.label.as_str());
        let mut state = self.state.lock();
        let key = (request.application.to_string(), request.label.to_string());
        if state.versions.contains_key(&key) {
            return Err(CloudError::AlreadyExists(format!(
                "version {}",
                request.label
            )));
        }
        let script = Script::new(state.version_script.clone());
        state.versions.insert(key, script);
        Ok(ApplicationVersion {
            application: request.application.clone(),
            label: request.label.clone(),
            status: VersionStatus::Processing,
        })
    }

    async fn describe_application_version(
        &self,
        application: &ApplicationName,
        label: &VersionLabel,
    ) -> Result<ApplicationVersion, CloudError> {
        self.log("describe_application_version", label.as_str());
        let mut state = self.state.lock();
        let script = state
            .versions
            .get_mut(&(application.to_string(), label.to_string()))
            .ok_or_else(|| CloudError::NotFound(format!("version {label}")))?;
        Ok(ApplicationVersion {
            application: application.clone(),
            label: label.clone(),
            status: script.next(),
        })
    }

    async fn create_environment(
        &self,
        request: &EnvironmentRequest,
    ) -> Result<Environment, CloudError> {
        self.log("create_environment", request.environment.as_str());
        let mut state = self.state.lock();
        if state.environments.contains_key(request.environment.as_str()) {
            return Err(CloudError::AlreadyExists(format!(
                "environment {}",
                request.environment
            )));
        }
        let statuses = Script::new(state.launch_script.clone());
        state.environments.insert(
            request.environment.to_string(),
            FakeEnvironment {
                version_label: request.version.to_string(),
                statuses,
                settings: request.option_settings.clone(),
            },
        );
        Ok(Environment {
            name: request.environment.clone(),
            id: Some(format!("e-{}", request.environment)),
            version_label: Some(request.version.to_string()),
            status: EnvironmentStatus::Launching,
            cname: None,
        })
    }

    async fn describe_environment(
        &self,
        name: &EnvironmentName,
    ) -> Result<Environment, CloudError> {
        self.log("describe_environment", name.as_str());
        Self::describe_env(&mut self.state.lock(), name)
    }

    async fn update_environment(
        &self,
        name: &EnvironmentName,
        settings: &[OptionSetting],
    ) -> Result<Environment, CloudError> {
        self.log("update_environment", name.as_str());
        let mut state = self.state.lock();
        Self::restart_updates(&mut state, name)?;
        if let Some(env) = state.environments.get_mut(name.as_str()) {
            env.settings.extend_from_slice(settings);
        }
        Self::describe_env(&mut state, name)
    }

    async fn deploy_version(
        &self,
        name: &EnvironmentName,
        label: &VersionLabel,
    ) -> Result<Environment, CloudError> {
        self.log("deploy_version", name.as_str());
        let mut state = self.state.lock();
        Self::restart_updates(&mut state, name)?;
        if let Some(env) = state.environments.get_mut(name.as_str()) {
            env.version_label = label.to_string();
        }
        Self::describe_env(&mut state, name)
    }
}

#[async_trait]
impl QueryOps for FakeCloud {
    async fn start_query(&self, request: &QueryRequest) -> Result<String, CloudError> {
        self.log("start_query", &request.query);
        let mut state = self.state.lock();
        let id = format!("q-{}", state.queries.len() + 1);
        let script = Script::new(state.query_script.clone());
        state.query_states.insert(id.clone(), script);
        state.queries.push((id.clone(), request.clone()));
        Ok(id)
    }

    async fn query_execution(&self, id: &str) -> Result<QueryExecution, CloudError> {
        self.log("query_execution", id);
        let mut state = self.state.lock();
        let script = state
            .query_states
            .get_mut(id)
            .ok_or_else(|| CloudError::NotFound(format!("query execution {id}")))?;
        let query_state = script.next();
        let reason = matches!(query_state, QueryState::Failed).then(|| "syntax error".to_string());
        Ok(QueryExecution {
            id: id.to_string(),
            state: query_state,
            reason,
        })
    }
}

/// Container tool that records what it was asked to do.
#[derive(Default)]
pub struct FakeImages {
    calls: Mutex<Vec<String>>,
    fail_build: bool,
    fail_remove: bool,
}

impl FakeImages {
    pub fn failing_build() -> Self {
        FakeImages {
            fail_build: true,
            ..Self::default()
        }
    }

    pub fn failing_remove() -> Self {
        FakeImages {
            fail_remove: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ImageOps for FakeImages {
    async fn login(&self, registry: &str, username: &str, _password: &str) -> Result<(), ImageError> {
        self.calls.lock().push(format!("login {username}@{registry}"));
        Ok(())
    }

    async fn build(&self, _context: &Path, image: &ImageRef) -> Result<(), ImageError> {
        self.calls.lock().push(format!("build {image}"));
        if self.fail_build {
            return Err(ImageError::Build("exit status: 1".to_string()));
        }
        Ok(())
    }

    async fn push(&self, image: &ImageRef) -> Result<(), ImageError> {
        self.calls.lock().push(format!("push {image}"));
        Ok(())
    }

    async fn remove(&self, image: &ImageRef) -> Result<(), ImageError> {
        self.calls.lock().push(format!("remove {image}"));
        if self.fail_remove {
            return Err(ImageError::Remove("image is in use".to_string()));
        }
        Ok(())
    }
}

/// A project directory with `eb_options.yaml` and `src/.env`.
pub struct Project {
    pub dir: tempfile::TempDir,
}

impl Project {
    pub fn new(options_yaml: &str, dotenv: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("eb_options.yaml"), options_yaml).unwrap();
        std::fs::write(dir.path().join("src/.env"), dotenv).unwrap();
        Project { dir }
    }

    pub fn without_dotenv(options_yaml: &str) -> Self {
        let project = Self::new(options_yaml, "");
        std::fs::remove_file(project.dir.path().join("src/.env")).unwrap();
        project
    }

    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Deployment config for `my-app` / `my-app-env` at version `v3`, polling fast.
    pub fn config(&self) -> DeployConfig {
        let targets =
            DeployTargets::parse("myrepo", "my-app", "my-app-env", "my-bucket", "v3").unwrap();
        DeployConfig::for_project(self.dir.path(), targets)
            .with_poll(fast_poll())
    }
}

pub fn fast_poll() -> PollPolicy {
    PollPolicy::new(Duration::from_millis(1), Duration::from_secs(5))
}

pub const OPTIONS_YAML: &str = r#"
aws:autoscaling:launchconfiguration:
  IamInstanceProfile: aws-elasticbeanstalk-ec2-role
  InstanceType: t3.micro
aws:elasticbeanstalk:environment:
  EnvironmentType: SingleInstance
"#;
