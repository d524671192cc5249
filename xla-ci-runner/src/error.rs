//! Error types for the build runner

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for runner operations
pub type Result<T> = std::result::Result<T, RunError>;

/// Errors that abort a build run
#[derive(Debug, Error)]
pub enum RunError {
    /// The process could not be started at all
    #[error("Failed to start '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The process ran and exited non-zero (or was killed by a signal)
    #[error("Command '{command}' failed with {}", describe_code(.code))]
    CommandFailed {
        command: String,
        /// Exit code, `None` when terminated by a signal
        code: Option<i32>,
    },

    /// Appending to the report file failed
    #[error("Failed to write report {}: {source}", .path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Runner configuration is unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl RunError {
    /// Exit status the driver should terminate with
    ///
    /// A failed command propagates its own code; everything else is 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::CommandFailed {
                code: Some(code), ..
            } => *code,
            _ => 1,
        }
    }

    /// Check if this error came from a command exiting non-zero
    pub fn is_command_failure(&self) -> bool {
        matches!(self, Self::CommandFailed { .. })
    }
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "a signal".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_failure_propagates_code() {
        let err = RunError::CommandFailed {
            command: "bazel test".to_string(),
            code: Some(3),
        };
        assert_eq!(err.exit_code(), 3);
        assert!(err.is_command_failure());
        assert_eq!(err.to_string(), "Command 'bazel test' failed with exit code 3");
    }

    #[test]
    fn test_signal_and_other_errors_exit_with_one() {
        let killed = RunError::CommandFailed {
            command: "docker pull".to_string(),
            code: None,
        };
        assert_eq!(killed.exit_code(), 1);
        assert_eq!(killed.to_string(), "Command 'docker pull' failed with a signal");

        let config = RunError::InvalidConfig("job_name cannot be empty".to_string());
        assert_eq!(config.exit_code(), 1);
        assert!(!config.is_command_failure());
    }
}
