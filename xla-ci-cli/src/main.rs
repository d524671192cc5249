//! XLA CI
//!
//! Build driver for the XLA Kokoro jobs. Reads `KOKORO_JOB_NAME`, picks the
//! matching build and runs its command sequence, exiting with the status of
//! the first step that fails.

mod commands;

use clap::Parser;
use commands::{Commands, handle_command};
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use xla_ci_runner::RunError;

#[derive(Parser)]
#[command(name = "xla-ci")]
#[command(about = "XLA CI build driver", long_about = None)]
struct Cli {
    /// Defaults to `run`
    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "xla_ci=info,xla_ci_runner=info,xla_ci_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match handle_command(cli.command.unwrap_or_default()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(exit_status(&e))
        }
    }
}

/// Status to exit with for a failed run
///
/// A failing step propagates its own code; anything else exits with 1.
fn exit_status(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<RunError>()
        .map(RunError::exit_code)
        .and_then(|code| u8::try_from(code).ok())
        .filter(|code| *code != 0)
        .unwrap_or(1)
}
