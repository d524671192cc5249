//! Build runner
//!
//! Executes a build's command sequence:
//! - One step at a time, in order
//! - Each step awaited to completion before the next starts
//! - The first failing step aborts the run
//!
//! A failed run skips the remaining steps, teardown included, so a failing
//! test run leaves the `xla_ci` container up for inspection.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info};
use xla_ci_core::CommandLine;

use crate::error::{Result, RunError};
use crate::executor::StepExecutor;

/// Record of one completed step
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub command: CommandLine,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Result of a run in which every step succeeded
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub steps: Vec<StepRecord>,
}

impl RunSummary {
    /// Wall time from the first step's start to the last step's end
    pub fn elapsed(&self) -> chrono::Duration {
        match (self.steps.first(), self.steps.last()) {
            (Some(first), Some(last)) => last.finished_at - first.started_at,
            _ => chrono::Duration::zero(),
        }
    }
}

/// Runs command sequences through a `StepExecutor`
pub struct BuildRunner<E> {
    executor: E,
}

impl<E: StepExecutor> BuildRunner<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    /// Executes `commands` in order, stopping at the first failure
    ///
    /// # Errors
    /// - `RunError::Spawn` if a step could not be started
    /// - `RunError::CommandFailed` if a step exited non-zero
    pub async fn run(&self, commands: &[CommandLine]) -> Result<RunSummary> {
        let total = commands.len();
        let mut steps = Vec::with_capacity(total);

        for (idx, command) in commands.iter().enumerate() {
            debug!("Step {}/{}", idx + 1, total);
            info!("Starting process: {}", command);

            let started_at = Utc::now();
            let status = self.executor.execute(command).await?;
            let finished_at = Utc::now();

            if !status.success() {
                error!(
                    "Step {}/{} failed: {} (exit code {:?})",
                    idx + 1,
                    total,
                    command,
                    status.code
                );
                return Err(RunError::CommandFailed {
                    command: command.to_string(),
                    code: status.code,
                });
            }

            steps.push(StepRecord {
                command: command.clone(),
                started_at,
                finished_at,
            });
        }

        info!("All {} steps succeeded", total);
        Ok(RunSummary { steps })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::StepStatus;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Records every command and answers with canned exit codes
    #[derive(Default)]
    struct RecordingExecutor {
        executed: Mutex<Vec<CommandLine>>,
        codes: HashMap<String, Option<i32>>,
    }

    impl RecordingExecutor {
        fn failing(program: &str, code: Option<i32>) -> Self {
            let mut codes = HashMap::new();
            codes.insert(program.to_string(), code);
            Self {
                executed: Mutex::new(Vec::new()),
                codes,
            }
        }

        fn executed(&self) -> Vec<CommandLine> {
            self.executed.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl StepExecutor for RecordingExecutor {
        async fn execute(&self, command: &CommandLine) -> Result<StepStatus> {
            self.executed.lock().unwrap().push(command.clone());
            let code = self.codes.get(command.program()).copied().unwrap_or(Some(0));
            Ok(StepStatus { code })
        }
    }

    fn commands() -> Vec<CommandLine> {
        vec![
            CommandLine::new("git").args(["clone", "--depth=1"]),
            CommandLine::new("bazel").arg("test"),
            CommandLine::new("docker").args(["stop", "xla_ci"]),
        ]
    }

    #[tokio::test]
    async fn test_runs_every_step_in_order() {
        let runner = BuildRunner::new(RecordingExecutor::default());
        let summary = runner.run(&commands()).await.unwrap();

        assert_eq!(runner.executor.executed(), commands());
        assert_eq!(summary.steps.len(), 3);
        assert!(summary.elapsed() >= chrono::Duration::zero());
        for step in &summary.steps {
            assert!(step.finished_at >= step.started_at);
        }
    }

    #[tokio::test]
    async fn test_stops_at_first_failure() {
        let runner = BuildRunner::new(RecordingExecutor::failing("bazel", Some(3)));
        let err = runner.run(&commands()).await.unwrap_err();

        assert_eq!(err.exit_code(), 3);
        assert!(matches!(err, RunError::CommandFailed { ref command, .. } if command == "bazel test"));
        // Teardown is skipped
        assert_eq!(runner.executor.executed(), commands()[..2].to_vec());
    }

    #[tokio::test]
    async fn test_signal_counts_as_failure() {
        let runner = BuildRunner::new(RecordingExecutor::failing("git", None));
        let err = runner.run(&commands()).await.unwrap_err();

        assert_eq!(err.exit_code(), 1);
        assert_eq!(runner.executor.executed().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_sequence_succeeds() {
        let runner = BuildRunner::new(RecordingExecutor::default());
        let summary = runner.run(&[]).await.unwrap();

        assert!(summary.steps.is_empty());
        assert_eq!(summary.elapsed(), chrono::Duration::zero());
    }
}
