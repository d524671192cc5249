//! XLA CI Runner
//!
//! Executes the command sequence of a build on the local machine.
//!
//! Architecture:
//! - Configuration: job name, report path and workdir from the environment
//! - Executor: spawns one child process per step and waits for it
//! - Runner: walks the sequence, aborting on the first failure
//! - Report: appends `key,value` properties for Sponge

pub mod config;
pub mod error;
pub mod executor;
pub mod report;
pub mod runner;

pub use config::Config;
pub use error::{Result, RunError};
pub use executor::{ProcessExecutor, StepExecutor, StepStatus};
pub use report::ReportWriter;
pub use runner::{BuildRunner, RunSummary, StepRecord};
