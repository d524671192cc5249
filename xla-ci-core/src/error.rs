//! Error types for the XLA CI core

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised while building descriptors or resolving jobs
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The job identifier has no descriptor in the catalog
    #[error("Unknown job: {0}")]
    UnknownJob(String),

    /// A repository reference that is not exactly `owner/name`
    #[error("Malformed repository reference '{0}', expected 'owner/name'")]
    MalformedRepo(String),

    /// A command line needs at least a program token
    #[error("Command line must not be empty")]
    EmptyCommand,
}

impl CoreError {
    /// Check if this error is an unknown-job error
    pub fn is_unknown_job(&self) -> bool {
        matches!(self, Self::UnknownJob(_))
    }
}
