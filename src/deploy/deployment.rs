// ABOUTME: Generic deployment struct parameterized by state marker.
// ABOUTME: State types carry their own data for compile-time guarantees.

use crate::cloud::OptionSetting;
use crate::config::DeployConfig;

use super::state::{Completed, Initialized};

/// Whether a resource was created by this run or already existed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceOutcome {
    pub kind: &'static str,
    pub name: String,
    pub created: bool,
}

/// A deployment in progress, parameterized by its current state.
///
/// The state type parameter `S` carries what earlier steps produced (the
/// pushed image, the uploaded archive, the ready environment), so each
/// transition only exists once its inputs do. In particular an environment
/// can only be launched from `Deployment<VersionProcessed>`.
#[derive(Debug)]
pub struct Deployment<S> {
    pub(crate) config: DeployConfig,
    pub(crate) option_settings: Vec<OptionSetting>,
    pub(crate) outcomes: Vec<ResourceOutcome>,
    pub(crate) state: S,
}

impl Deployment<Initialized> {
    /// Start a deployment with the already assembled option settings.
    pub fn new(config: DeployConfig, option_settings: Vec<OptionSetting>) -> Self {
        Deployment {
            config,
            option_settings,
            outcomes: Vec::new(),
            state: Initialized,
        }
    }
}

impl<S> Deployment<S> {
    pub(crate) fn record(&mut self, kind: &'static str, name: impl Into<String>, created: bool) {
        self.outcomes.push(ResourceOutcome {
            kind,
            name: name.into(),
            created,
        });
    }

    pub(crate) fn transition<T>(self, state: T) -> Deployment<T> {
        Deployment {
            config: self.config,
            option_settings: self.option_settings,
            outcomes: self.outcomes,
            state,
        }
    }
}

impl Deployment<Completed> {
    /// Public URL of the deployed application.
    pub fn url(&self) -> String {
        format!("http://{}", self.state.cname)
    }
}
