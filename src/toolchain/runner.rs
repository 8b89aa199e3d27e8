use std::io;
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;

use super::command::ToolchainInvocation;
use crate::error::DeployError;

/// Captured result of one finished toolchain process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainResult {
    /// `-1` when the process was terminated by a signal
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// What happened when the toolchain was started
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed(ToolchainResult),
    /// The executable could not be resolved on disk or on the search path
    ToolchainAbsent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Succeeded(ToolchainResult),
    BuildOrUploadFailed { diagnostic: String },
    ToolchainAbsent,
}

impl RunOutcome {
    pub fn classify(self) -> Classification {
        match self {
            Self::Completed(result) if result.exit_code == 0 => Classification::Succeeded(result),
            Self::Completed(result) => Classification::BuildOrUploadFailed {
                diagnostic: result.stderr,
            },
            Self::ToolchainAbsent => Classification::ToolchainAbsent,
        }
    }
}

/// Trait for executing toolchain invocations
///
/// The production implementation spawns a child process; tests substitute
/// recording stubs to observe invocations without a real toolchain.
#[async_trait]
pub trait ToolchainRunner: Send + Sync {
    /// Runs the invocation once and waits for it to finish
    ///
    /// Must return `RunOutcome::ToolchainAbsent` only when the executable
    /// itself cannot be found; other failures are errors.
    async fn run(&self, invocation: &ToolchainInvocation) -> Result<RunOutcome, DeployError>;
}

/// Runs the toolchain as a child process with an optional deadline
///
/// The child is killed if the deadline expires or the calling future is
/// dropped, so a hung toolchain never outlives its request.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    timeout: Option<Duration>,
}

impl ProcessRunner {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

#[async_trait]
impl ToolchainRunner for ProcessRunner {
    async fn run(&self, invocation: &ToolchainInvocation) -> Result<RunOutcome, DeployError> {
        let mut cmd = Command::new(&invocation.executable_path);
        cmd.args(&invocation.arguments)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // Compilers and uploaders the toolchain starts share its group
        #[cfg(unix)]
        cmd.process_group(0);

        let child = match cmd.spawn() {
            Ok(child) => child,
            // An existing file that fails with ENOENT has a missing interpreter or loader
            Err(e)
                if e.kind() == io::ErrorKind::NotFound
                    && !invocation.executable_path.exists() =>
            {
                log::warn!(
                    "Toolchain executable {} not found",
                    invocation.executable_path.display()
                );
                return Ok(RunOutcome::ToolchainAbsent);
            }
            Err(e) => {
                log::error!(
                    "Failed to start toolchain {}: {e}",
                    invocation.executable_path.display()
                );
                return Err(e.into());
            }
        };
        let mut group = ProcessGroupGuard::new(child.id());

        let start_time = Instant::now();
        let output = match self.timeout {
            Some(limit) => timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| {
                    log::error!(
                        "Toolchain {} killed after {limit:?}",
                        invocation.executable_path.display()
                    );
                    DeployError::Timeout(limit)
                })??,
            None => child.wait_with_output().await?,
        };
        group.disarm();

        let result = ToolchainResult {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        log::info!(
            "Toolchain exited with code {} in {:?}",
            result.exit_code,
            start_time.elapsed()
        );

        Ok(RunOutcome::Completed(result))
    }
}

/// Kills the child's whole process group unless disarmed
///
/// Armed while the toolchain runs, so a deadline or a dropped request also
/// takes down the compilers and uploaders it spawned.
struct ProcessGroupGuard {
    pgid: Option<u32>,
}

impl ProcessGroupGuard {
    fn new(pgid: Option<u32>) -> Self {
        Self { pgid }
    }

    /// Called once the child has been reaped and its id may be reused
    fn disarm(&mut self) {
        self.pgid = None;
    }
}

impl Drop for ProcessGroupGuard {
    fn drop(&mut self) {
        let Some(pgid) = self.pgid.take() else {
            return;
        };

        #[cfg(unix)]
        {
            // SAFETY: killpg has no memory-safety preconditions
            let rc = unsafe { libc::killpg(pgid as libc::pid_t, libc::SIGKILL) };
            if rc == 0 {
                log::debug!("Killed toolchain process group {pgid}");
            } else {
                log::debug!(
                    "Process group {pgid} already gone: {}",
                    io::Error::last_os_error()
                );
            }
        }
        #[cfg(not(unix))]
        let _ = pgid;
    }
}
