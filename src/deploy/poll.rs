// ABOUTME: Poll-until-terminal loop shared by versions, environments and queries.
// ABOUTME: Fixed interval between observations, bounded by an overall deadline.

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

use crate::cloud::{
    ApplicationVersion, CloudError, Environment, EnvironmentStatus, PlatformOps, QueryExecution,
    QueryOps, QueryState, VersionStatus,
};
use crate::output::Output;
use crate::types::{ApplicationName, EnvironmentName, VersionLabel};

/// Interval between observations and the deadline for the whole wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub timeout: Duration,
}

impl PollPolicy {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            timeout: Duration::from_secs(30 * 60),
        }
    }
}

/// Classification of one observed status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Pending,
    Succeeded,
    Failed,
}

#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("{0} not found")]
    Missing(String),

    #[error("{resource} ended in status {status}")]
    Failed { resource: String, status: String },

    #[error("gave up waiting for {resource} after {}", humantime::format_duration(*.timeout))]
    TimedOut { resource: String, timeout: Duration },

    #[error(transparent)]
    Cloud(CloudError),
}

impl From<CloudError> for PollError {
    fn from(err: CloudError) -> Self {
        match err {
            CloudError::NotFound(what) => PollError::Missing(what),
            other => PollError::Cloud(other),
        }
    }
}

/// Something whose status can be observed until it settles.
#[async_trait]
pub trait Watch: Send + Sync {
    type Status: fmt::Display + Send;

    /// Human-readable name used in logs and errors.
    fn resource(&self) -> String;

    async fn observe(&self) -> Result<Self::Status, CloudError>;

    fn classify(&self, status: &Self::Status) -> Progress;
}

/// Progress line printed for every observation that is still pending.
pub fn waiting_message(resource: &str, status: &dyn fmt::Display) -> String {
    format!("    Waiting for {resource} (status: {status})")
}

/// Observe `watch` until it reaches a terminal status or the deadline passes.
///
/// A describe that finds nothing is fatal and never retried.
pub async fn poll_until_terminal<W: Watch>(
    watch: &W,
    policy: &PollPolicy,
    output: &Output,
) -> Result<W::Status, PollError> {
    let resource = watch.resource();
    let deadline = Instant::now() + policy.timeout;

    loop {
        let status = watch.observe().await?;
        match watch.classify(&status) {
            Progress::Succeeded => {
                tracing::debug!(%resource, %status, "reached terminal status");
                return Ok(status);
            }
            Progress::Failed => {
                return Err(PollError::Failed {
                    resource,
                    status: status.to_string(),
                });
            }
            Progress::Pending => {
                let now = Instant::now();
                if now >= deadline {
                    return Err(PollError::TimedOut {
                        resource,
                        timeout: policy.timeout,
                    });
                }
                output.progress(&waiting_message(&resource, &status));
                tokio::time::sleep(policy.interval.min(deadline - now)).await;
            }
        }
    }
}

/// Wait for an application version to finish processing.
pub struct VersionWatch<'a, P: ?Sized> {
    pub platform: &'a P,
    pub application: &'a ApplicationName,
    pub label: &'a VersionLabel,
}

#[async_trait]
impl<P: PlatformOps + ?Sized> Watch for VersionWatch<'_, P> {
    type Status = VersionStatus;

    fn resource(&self) -> String {
        format!("version {} of {}", self.label, self.application)
    }

    async fn observe(&self) -> Result<VersionStatus, CloudError> {
        let version: ApplicationVersion = self
            .platform
            .describe_application_version(self.application, self.label)
            .await?;
        Ok(version.status)
    }

    fn classify(&self, status: &VersionStatus) -> Progress {
        match status {
            VersionStatus::Processing | VersionStatus::Building => Progress::Pending,
            VersionStatus::Processed => Progress::Succeeded,
            _ => Progress::Failed,
        }
    }
}

/// Which environment transition is being waited on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvironmentPhase {
    Launch,
    Update,
}

/// Wait for an environment to become ready.
pub struct EnvironmentWatch<'a, P: ?Sized> {
    pub platform: &'a P,
    pub name: &'a EnvironmentName,
    pub phase: EnvironmentPhase,
}

/// Observed environment, displayed by its status.
#[derive(Debug, Clone)]
pub struct ObservedEnvironment(pub Environment);

impl fmt::Display for ObservedEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.status)
    }
}

#[async_trait]
impl<P: PlatformOps + ?Sized> Watch for EnvironmentWatch<'_, P> {
    type Status = ObservedEnvironment;

    fn resource(&self) -> String {
        format!("environment {}", self.name)
    }

    async fn observe(&self) -> Result<ObservedEnvironment, CloudError> {
        let environment = self.platform.describe_environment(self.name).await?;
        Ok(ObservedEnvironment(environment))
    }

    fn classify(&self, observed: &ObservedEnvironment) -> Progress {
        classify_environment(&observed.0.status, self.phase)
    }
}

/// `Updating` stays pending during a launch too: an adopted environment may
/// still be applying an earlier change.
fn classify_environment(status: &EnvironmentStatus, phase: EnvironmentPhase) -> Progress {
    match (status, phase) {
        (EnvironmentStatus::Ready, _) => Progress::Succeeded,
        (EnvironmentStatus::Updating, _) => Progress::Pending,
        (EnvironmentStatus::Launching, EnvironmentPhase::Launch) => Progress::Pending,
        _ => Progress::Failed,
    }
}

/// Wait for an analytics query to finish.
pub struct QueryWatch<'a, Q: ?Sized> {
    pub queries: &'a Q,
    pub execution_id: &'a str,
}

#[async_trait]
impl<Q: QueryOps + ?Sized> Watch for QueryWatch<'_, Q> {
    type Status = QueryExecution;

    fn resource(&self) -> String {
        format!("query {}", self.execution_id)
    }

    async fn observe(&self) -> Result<QueryExecution, CloudError> {
        self.queries.query_execution(self.execution_id).await
    }

    fn classify(&self, execution: &QueryExecution) -> Progress {
        match execution.state {
            QueryState::Queued | QueryState::Running => Progress::Pending,
            QueryState::Succeeded => Progress::Succeeded,
            _ => Progress::Failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Replays a fixed sequence of statuses, repeating the last one.
    struct Scripted {
        statuses: Vec<&'static str>,
        observed: AtomicUsize,
    }

    impl Scripted {
        fn new(statuses: Vec<&'static str>) -> Self {
            Self {
                statuses,
                observed: AtomicUsize::new(0),
            }
        }

        fn observations(&self) -> usize {
            self.observed.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Watch for Scripted {
        type Status = String;

        fn resource(&self) -> String {
            "thing".to_string()
        }

        async fn observe(&self) -> Result<String, CloudError> {
            let n = self.observed.fetch_add(1, Ordering::SeqCst);
            match self.statuses[n.min(self.statuses.len() - 1)] {
                "missing" => Err(CloudError::NotFound("thing".into())),
                status => Ok(status.to_string()),
            }
        }

        fn classify(&self, status: &String) -> Progress {
            match status.as_str() {
                "busy" => Progress::Pending,
                "done" => Progress::Succeeded,
                _ => Progress::Failed,
            }
        }
    }

    fn fast() -> PollPolicy {
        PollPolicy::new(Duration::from_millis(1), Duration::from_secs(5))
    }

    fn quiet() -> Output {
        Output::new(crate::output::OutputMode::Quiet)
    }

    #[test]
    fn waiting_message_names_resource_and_status() {
        let status = EnvironmentStatus::Launching;
        assert_eq!(
            waiting_message("environment my-app-env", &status),
            "    Waiting for environment my-app-env (status: Launching)"
        );
    }

    #[tokio::test]
    async fn pending_statuses_are_reported_in_normal_mode() {
        let watch = Scripted::new(vec!["busy", "done"]);
        let output = Output::new(crate::output::OutputMode::Normal);
        let status = poll_until_terminal(&watch, &fast(), &output).await.unwrap();
        assert_eq!(status, "done");
    }

    #[tokio::test]
    async fn waits_through_pending_statuses() {
        let watch = Scripted::new(vec!["busy", "busy", "done"]);
        let status = poll_until_terminal(&watch, &fast(), &quiet()).await.unwrap();
        assert_eq!(status, "done");
        assert_eq!(watch.observations(), 3);
    }

    #[tokio::test]
    async fn failed_status_aborts_with_status_named() {
        let watch = Scripted::new(vec!["busy", "broken"]);
        let err = poll_until_terminal(&watch, &fast(), &quiet()).await.unwrap_err();
        assert!(matches!(
            &err,
            PollError::Failed { resource, status } if resource == "thing" && status == "broken"
        ));
    }

    #[tokio::test]
    async fn not_found_is_not_retried() {
        let watch = Scripted::new(vec!["missing"]);
        let err = poll_until_terminal(&watch, &fast(), &quiet()).await.unwrap_err();
        assert!(matches!(err, PollError::Missing(_)));
        assert_eq!(watch.observations(), 1);
    }

    #[tokio::test]
    async fn stuck_resource_times_out() {
        let watch = Scripted::new(vec!["busy"]);
        let policy = PollPolicy::new(Duration::from_millis(5), Duration::from_millis(30));
        let err = poll_until_terminal(&watch, &policy, &quiet()).await.unwrap_err();
        assert!(matches!(err, PollError::TimedOut { .. }));
        assert!(err.to_string().contains("30ms"));
    }

    #[test]
    fn default_policy_matches_documented_values() {
        let policy = PollPolicy::default();
        assert_eq!(policy.interval, Duration::from_secs(10));
        assert_eq!(policy.timeout, Duration::from_secs(1800));
    }

    #[test]
    fn environment_classification_depends_on_phase() {
        use EnvironmentPhase::{Launch, Update};
        use EnvironmentStatus::*;

        assert_eq!(classify_environment(&Launching, Launch), Progress::Pending);
        assert_eq!(classify_environment(&Launching, Update), Progress::Failed);
        assert_eq!(classify_environment(&Updating, Update), Progress::Pending);
        assert_eq!(classify_environment(&Ready, Update), Progress::Succeeded);
        assert_eq!(classify_environment(&Terminated, Launch), Progress::Failed);
    }
}
