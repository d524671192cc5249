//! Docker container commands
//!
//! Builds the command lines for the container lifecycle of a CI build:
//! - Pulling the build image, with or without a retry wrapper
//! - Starting a detached, named container with the checkout mounted
//! - Executing commands inside the running container
//! - Stopping it (the container is started with `--rm`, so stop also deletes it)
//!
//! Nothing here runs docker; the runner executes the returned command lines.

use crate::domain::command::CommandLine;
use crate::domain::options::OptionMap;

/// Fixed name of the build container, targeted by `exec` and `stop`
pub const CONTAINER_NAME: &str = "xla_ci";

/// Host directory holding every checkout, mounted at the same path in the container
pub const CHECKOUT_ROOT: &str = "github";

/// How the build image is pulled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullPolicy {
    /// Plain `docker pull`
    Direct,
    /// `docker pull` wrapped in GNU parallel, used only for its retry support
    Retrying { retries: u32, delay_secs: u32 },
}

impl PullPolicy {
    /// Three attempts, fifteen seconds apart
    pub const DEFAULT_RETRYING: PullPolicy = PullPolicy::Retrying {
        retries: 3,
        delay_secs: 15,
    };
}

/// Builds the pull command for `image`
pub fn pull(image: &str, policy: PullPolicy) -> CommandLine {
    match policy {
        PullPolicy::Direct => CommandLine::new("docker").args(["pull", image]),
        PullPolicy::Retrying {
            retries,
            delay_secs,
        } => CommandLine::new("parallel")
            .arg("--ungroup")
            .arg("--retries")
            .arg(retries.to_string())
            .arg("--delay")
            .arg(delay_secs.to_string())
            .args(["docker", "pull", ":::", image]),
    }
}

/// Starts the build container running `bash`, detached
///
/// # Arguments
/// * `image` - Build image
/// * `repo_name` - Checkout directory under the mounted root, used as workdir
pub fn run(image: &str, repo_name: &str) -> CommandLine {
    let options = OptionMap::new()
        .with("detach", true)
        .with("name", CONTAINER_NAME)
        .with("rm", true)
        .with("interactive", true)
        .with("tty", true)
        .with("volume", format!("./{root}:/{root}", root = CHECKOUT_ROOT))
        .with("workdir", format!("/{}/{}", CHECKOUT_ROOT, repo_name));

    CommandLine::new("docker")
        .arg("run")
        .args(options.to_cli_options())
        .arg(image)
        .arg("bash")
}

/// Wraps `command` to run inside the build container
pub fn exec(command: CommandLine) -> CommandLine {
    command.wrapped_in(CommandLine::new("docker").args(["exec", CONTAINER_NAME]))
}

/// Stops the build container
pub fn stop() -> CommandLine {
    CommandLine::new("docker").args(["stop", CONTAINER_NAME])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_pull() {
        let cmd = pull("gcr.io/img:tag", PullPolicy::Direct);
        assert_eq!(cmd.tokens(), &["docker", "pull", "gcr.io/img:tag"]);
    }

    #[test]
    fn test_retrying_pull() {
        let cmd = pull("gcr.io/img:tag", PullPolicy::DEFAULT_RETRYING);
        assert_eq!(
            cmd.tokens(),
            &[
                "parallel",
                "--ungroup",
                "--retries",
                "3",
                "--delay",
                "15",
                "docker",
                "pull",
                ":::",
                "gcr.io/img:tag"
            ]
        );
    }

    #[test]
    fn test_run_mounts_checkout_and_names_container() {
        let cmd = run("gcr.io/img:tag", "jax");
        assert_eq!(
            cmd.tokens(),
            &[
                "docker",
                "run",
                "--detach",
                "--name=xla_ci",
                "--rm",
                "--interactive",
                "--tty",
                "--volume=./github:/github",
                "--workdir=/github/jax",
                "gcr.io/img:tag",
                "bash"
            ]
        );
    }

    #[test]
    fn test_exec_and_stop_target_named_container() {
        let cmd = exec(CommandLine::new("bazel").arg("version"));
        assert_eq!(cmd.tokens(), &["docker", "exec", "xla_ci", "bazel", "version"]);
        assert_eq!(stop().tokens(), &["docker", "stop", "xla_ci"]);
    }
}
