pub mod command;
pub mod locator;
pub mod ports;
pub mod report;
pub mod runner;
pub mod workspace;

pub use command::{Action, ToolchainInvocation};
pub use locator::Locator;
pub use ports::PortInfo;
pub use report::{Outcome, StatusResponse};
pub use runner::{Classification, ProcessRunner, RunOutcome, ToolchainResult, ToolchainRunner};
pub use workspace::Workspace;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::ToolchainConfig;
use crate::error::DeployError;

/// A sketch submitted for compilation or upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildRequest {
    #[serde(alias = "code")]
    pub source_text: String,
    /// Fully qualified board name, e.g. `arduino:avr:uno`
    #[serde(alias = "board")]
    pub target_board: String,
    #[serde(alias = "port", default)]
    pub device_port: Option<String>,
}

impl BuildRequest {
    /// Rejects requests the toolchain should never see
    pub fn validate(&self, action: Action) -> Result<(), DeployError> {
        if self.target_board.trim().is_empty() {
            return Err(DeployError::Validation("Board required".to_string()));
        }
        if action.requires_port() && command::non_blank(self.device_port.as_deref()).is_none() {
            return Err(DeployError::Validation(
                "Port required for upload".to_string(),
            ));
        }
        Ok(())
    }
}

/// Stages, builds and reports on sketches
///
/// Holds no per-request state; every call gets its own workspace and
/// re-resolves the toolchain, so one instance serves concurrent requests.
pub struct Orchestrator {
    locator: Locator,
    runner: Arc<dyn ToolchainRunner>,
    staging_dir: PathBuf,
}

impl Orchestrator {
    pub fn new(locator: Locator, runner: Arc<dyn ToolchainRunner>) -> Self {
        Self {
            locator,
            runner,
            staging_dir: std::env::temp_dir(),
        }
    }

    /// Builds an orchestrator spawning real toolchain processes
    pub fn from_config(config: &ToolchainConfig) -> std::io::Result<Self> {
        let install_dir = match &config.install_dir {
            Some(dir) => dir.clone(),
            None => locator::current_install_dir()?,
        };
        let binary_name = config
            .binary_name
            .clone()
            .unwrap_or_else(locator::default_binary_name);
        let timeout = match config.timeout_secs {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => Some(Duration::from_secs(crate::config::DEFAULT_TIMEOUT_SECS)),
        };

        let mut orchestrator = Self::new(
            Locator::new(install_dir, binary_name),
            Arc::new(ProcessRunner::new(timeout)),
        );
        if let Some(dir) = &config.staging_dir {
            orchestrator = orchestrator.with_staging_dir(dir.clone());
        }
        Ok(orchestrator)
    }

    /// Stage workspaces under `dir` instead of the system temp directory
    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = dir.into();
        self
    }

    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    /// Runs one request through stage, locate, build, run and report
    ///
    /// The workspace is removed before this returns, whatever the outcome.
    pub async fn deploy(
        &self,
        action: Action,
        request: &BuildRequest,
    ) -> Result<Outcome, DeployError> {
        request.validate(action)?;

        let workspace = Workspace::stage_in(&self.staging_dir, &request.source_text)?;
        let executable = self.locator.locate();
        log::info!(
            "Running {action} for board {} with {}",
            request.target_board,
            executable.display()
        );

        let invocation = command::build(
            action,
            &executable,
            &request.target_board,
            &workspace,
            request.device_port.as_deref(),
        )?;
        let classification = self.runner.run(&invocation).await?.classify();
        drop(workspace);

        let outcome = report::report(action, classification);
        match &outcome {
            Outcome::Success(_) => log::info!("{action} succeeded"),
            Outcome::Failure(_) => log::info!("{action} failed in toolchain"),
            Outcome::SimulatedFallback(_) => log::warn!("{action} simulated, toolchain absent"),
        }
        Ok(outcome)
    }
}
