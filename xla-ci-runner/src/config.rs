//! Runner configuration
//!
//! Which job to run, where to write the report, and where to run the steps.

use std::path::PathBuf;

use crate::error::{Result, RunError};
use crate::report::REPORT_FILE;

/// Environment variable naming the Kokoro job
pub const JOB_NAME_ENV: &str = "KOKORO_JOB_NAME";

/// Overrides the report file location
pub const REPORT_PATH_ENV: &str = "XLA_CI_REPORT_PATH";

/// Overrides the directory the steps run in
pub const WORKDIR_ENV: &str = "XLA_CI_WORKDIR";

/// Runner configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Kokoro job name selecting the build
    pub job_name: String,

    /// File receiving `key,value` report lines
    pub report_path: PathBuf,

    /// Directory the steps run in; `None` keeps the current directory.
    /// The checkout is expected under `./github` relative to it.
    pub workdir: Option<PathBuf>,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(job_name: String) -> Self {
        Self {
            job_name,
            report_path: PathBuf::from(REPORT_FILE),
            workdir: None,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - KOKORO_JOB_NAME (required)
    /// - XLA_CI_REPORT_PATH (optional, default: custom_sponge_config.csv)
    /// - XLA_CI_WORKDIR (optional, default: current directory)
    pub fn from_env() -> Result<Self> {
        let job_name = std::env::var(JOB_NAME_ENV).map_err(|_| {
            RunError::InvalidConfig(format!("{} environment variable not set", JOB_NAME_ENV))
        })?;

        let mut config = Self::new(job_name);

        if let Some(path) = std::env::var_os(REPORT_PATH_ENV) {
            config = config.with_report_path(path);
        }

        if let Some(dir) = std::env::var_os(WORKDIR_ENV) {
            config = config.with_workdir(dir);
        }

        Ok(config)
    }

    pub fn with_report_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.report_path = path.into();
        self
    }

    pub fn with_workdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(dir.into());
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.job_name.trim().is_empty() {
            return Err(RunError::InvalidConfig("job_name cannot be empty".to_string()));
        }

        if self.report_path.as_os_str().is_empty() {
            return Err(RunError::InvalidConfig("report_path cannot be empty".to_string()));
        }

        if let Some(dir) = &self.workdir {
            if !dir.is_dir() {
                return Err(RunError::InvalidConfig(format!(
                    "workdir {} is not a directory",
                    dir.display()
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::new("tensorflow/xla/linux/cpu/build_cpu".to_string());
        assert_eq!(config.report_path, PathBuf::from("custom_sponge_config.csv"));
        assert!(config.workdir.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::new(String::new());

        // Empty job name should fail
        assert!(config.validate().is_err());

        config.job_name = "tensorflow/xla/jax/cpu/build_cpu".to_string();
        assert!(config.validate().is_ok());

        // Missing workdir should fail
        let config = config.with_workdir("/definitely/not/a/real/dir");
        assert!(config.validate().is_err());

        let dir = tempfile::tempdir().unwrap();
        let config = config.with_workdir(dir.path());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_with_report_path() {
        let config = Config::new("job".to_string()).with_report_path("/tmp/report.csv");
        assert_eq!(config.report_path, PathBuf::from("/tmp/report.csv"));

        let config = config.with_report_path("");
        assert!(config.validate().is_err());
    }
}
