//! Run command handler
//!
//! Resolves the job, records its build type and executes the sequence.

use anyhow::{Context, Result};
use colored::*;
use tracing::info;
use xla_ci_core::Catalog;
use xla_ci_runner::{BuildRunner, Config, ProcessExecutor, ReportWriter};

/// Runs the build for `config.job_name`
///
/// Fails before executing anything if the job is unknown.
pub async fn handle_run(config: &Config, catalog: &Catalog) -> Result<()> {
    let build = catalog.lookup(&config.job_name)?;
    let commands = build.commands();

    info!(
        "Running {} build of {} for job {} ({} steps)",
        build.build_type(),
        build.repo(),
        config.job_name,
        commands.len()
    );

    ReportWriter::new(&config.report_path)
        .append("build_type", build.build_type())
        .context("Failed to record build type")?;

    let mut executor = ProcessExecutor::new();
    if let Some(dir) = &config.workdir {
        executor = executor.with_workdir(dir);
    }

    let summary = BuildRunner::new(executor)
        .run(&commands)
        .await
        .with_context(|| format!("{} build failed", build.build_type()))?;

    println!(
        "{} {} steps finished in {}s",
        "✓".green(),
        summary.steps.len(),
        summary.elapsed().num_seconds()
    );

    Ok(())
}
