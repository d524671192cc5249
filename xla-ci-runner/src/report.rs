//! Sponge report file
//!
//! Sponge picks up extra properties for a build from a CSV file of
//! `key,value` lines in the working directory.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Result, RunError};

/// Default report file name
pub const REPORT_FILE: &str = "custom_sponge_config.csv";

/// Appends `key,value` lines to the report file
#[derive(Debug, Clone)]
pub struct ReportWriter {
    path: PathBuf,
}

impl ReportWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one entry, creating the file if needed
    pub fn append(&self, key: &str, value: impl std::fmt::Display) -> Result<()> {
        let to_report_error = |source: std::io::Error| RunError::Report {
            path: self.path.clone(),
            source,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(to_report_error)?;

        writeln!(file, "{},{}", key, value).map_err(to_report_error)?;

        debug!("Recorded {}={} in {}", key, value, self.path.display());
        Ok(())
    }
}

impl Default for ReportWriter {
    fn default() -> Self {
        Self::new(REPORT_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_creates_and_appends() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path().join(REPORT_FILE));

        writer.append("build_type", "CPU_X86").unwrap();
        writer.append("attempts", 3).unwrap();

        let contents = std::fs::read_to_string(writer.path()).unwrap();
        assert_eq!(contents, "build_type,CPU_X86\nattempts,3\n");
    }

    #[test]
    fn test_append_keeps_existing_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(REPORT_FILE);
        std::fs::write(&path, "existing,1\n").unwrap();

        ReportWriter::new(&path).append("build_type", "GPU").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "existing,1\nbuild_type,GPU\n");
    }

    #[test]
    fn test_unwritable_path_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path().join("missing").join(REPORT_FILE));

        let err = writer.append("build_type", "GPU").unwrap_err();
        assert!(matches!(err, RunError::Report { .. }));
    }
}
