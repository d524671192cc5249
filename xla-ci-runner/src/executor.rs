//! Step executor
//!
//! Runs a single command line as a child process and waits for it.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;
use xla_ci_core::CommandLine;

use crate::error::{Result, RunError};

/// How a finished step exited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepStatus {
    /// Exit code, `None` when the process was killed by a signal
    pub code: Option<i32>,
}

impl StepStatus {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Executes one command to completion
///
/// Implementations must not return before the command has terminated.
#[async_trait]
pub trait StepExecutor: Send + Sync {
    /// Runs `command` and reports how it exited
    ///
    /// # Errors
    /// Returns `RunError::Spawn` if the process could not be started. A
    /// non-zero exit is not an error at this level.
    async fn execute(&self, command: &CommandLine) -> Result<StepStatus>;
}

/// Executes commands as local child processes
///
/// The child inherits stdout and stderr so its output lands in the CI log.
/// No shell is involved.
#[derive(Debug, Clone, Default)]
pub struct ProcessExecutor {
    workdir: Option<PathBuf>,
}

impl ProcessExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs every command in `dir` instead of the current directory
    pub fn with_workdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(dir.into());
        self
    }
}

#[async_trait]
impl StepExecutor for ProcessExecutor {
    async fn execute(&self, command: &CommandLine) -> Result<StepStatus> {
        let mut child = Command::new(command.program());
        child
            .args(command.arguments())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        if let Some(dir) = &self.workdir {
            child.current_dir(dir);
        }

        let status = child.status().await.map_err(|source| RunError::Spawn {
            command: command.to_string(),
            source,
        })?;

        debug!("Process exited: {} ({})", command, status);

        Ok(StepStatus {
            code: status.code(),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_success() {
        let status = ProcessExecutor::new()
            .execute(&CommandLine::new("true"))
            .await
            .unwrap();
        assert!(status.success());
    }

    #[tokio::test]
    async fn test_exit_code_is_reported() {
        let cmd = CommandLine::new("sh").args(["-c", "exit 7"]);
        let status = ProcessExecutor::new().execute(&cmd).await.unwrap();

        assert!(!status.success());
        assert_eq!(status.code, Some(7));
    }

    #[tokio::test]
    async fn test_arguments_are_not_shell_expanded() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = CommandLine::new("touch").arg("$HOME;ls");

        let status = ProcessExecutor::new()
            .with_workdir(dir.path())
            .execute(&cmd)
            .await
            .unwrap();

        assert!(status.success());
        assert!(dir.path().join("$HOME;ls").exists());
    }

    #[tokio::test]
    async fn test_missing_program_fails_to_spawn() {
        let cmd = CommandLine::new("definitely-not-an-installed-program-xla-ci");
        let err = ProcessExecutor::new().execute(&cmd).await.unwrap_err();
        assert!(matches!(err, RunError::Spawn { .. }));
    }
}
