//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod list;
mod plan;
mod run;

use anyhow::{Context, Result};
use clap::Subcommand;
use xla_ci_core::Catalog;
use xla_ci_runner::Config;

/// Top-level CLI commands
#[derive(Subcommand, Default)]
pub enum Commands {
    /// Run the build selected by KOKORO_JOB_NAME
    #[default]
    Run,
    /// Print the commands the selected build would run, without running them
    Plan {
        /// Print the build and its commands as JSON
        #[arg(long)]
        json: bool,
    },
    /// List known job names and their builds
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Handle a CLI command
///
/// Builds the catalog once, then routes to the handler. Job resolution
/// happens before any step runs.
pub async fn handle_command(command: Commands) -> Result<()> {
    let catalog = Catalog::standard().context("Failed to build the job catalog")?;

    match command {
        Commands::Run => run::handle_run(&load_config()?, &catalog).await,
        Commands::Plan { json } => plan::handle_plan(&load_config()?, &catalog, json),
        Commands::List { json } => list::handle_list(&catalog, json),
    }
}

/// Loads and validates the runner configuration from the environment
fn load_config() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}
