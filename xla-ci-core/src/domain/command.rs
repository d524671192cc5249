//! Command line domain type

use serde::Serialize;
use std::fmt;

use crate::error::{CoreError, Result};

/// A command to execute directly, without a shell
///
/// Always holds at least the program token. Built the same way as
/// `std::process::Command`: start from a program and chain `arg`/`args`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CommandLine(Vec<String>);

impl CommandLine {
    /// Creates a command line running `program` with no arguments
    pub fn new(program: impl Into<String>) -> Self {
        Self(vec![program.into()])
    }

    /// Appends one argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.0.push(arg.into());
        self
    }

    /// Appends every argument in order
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0.extend(args.into_iter().map(Into::into));
        self
    }

    /// Builds a command line from raw tokens
    ///
    /// # Errors
    /// Returns `CoreError::EmptyCommand` if `tokens` is empty
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        if tokens.is_empty() {
            return Err(CoreError::EmptyCommand);
        }
        Ok(Self(tokens))
    }

    /// The program to run
    pub fn program(&self) -> &str {
        &self.0[0]
    }

    /// Arguments after the program
    pub fn arguments(&self) -> &[String] {
        &self.0[1..]
    }

    /// All tokens, program first
    pub fn tokens(&self) -> &[String] {
        &self.0
    }

    /// Prefixes this command with another, e.g. `docker exec <name>`
    pub fn wrapped_in(self, prefix: CommandLine) -> Self {
        prefix.args(self.0)
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(" "))
    }
}

impl TryFrom<Vec<String>> for CommandLine {
    type Error = CoreError;

    fn try_from(tokens: Vec<String>) -> Result<Self> {
        Self::from_tokens(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_order() {
        let cmd = CommandLine::new("git")
            .arg("clone")
            .args(["--depth=1", "https://github.com/google/jax"]);

        assert_eq!(cmd.program(), "git");
        assert_eq!(
            cmd.arguments(),
            &["clone", "--depth=1", "https://github.com/google/jax"]
        );
        assert_eq!(cmd.to_string(), "git clone --depth=1 https://github.com/google/jax");
    }

    #[test]
    fn test_empty_tokens_rejected() {
        let tokens: Vec<String> = Vec::new();
        assert_eq!(CommandLine::try_from(tokens), Err(CoreError::EmptyCommand));
    }

    #[test]
    fn test_wrapped_in_prefixes_tokens() {
        let cmd = CommandLine::new("nvidia-smi")
            .wrapped_in(CommandLine::new("docker").args(["exec", "xla_ci"]));

        assert_eq!(cmd.tokens(), &["docker", "exec", "xla_ci", "nvidia-smi"]);
    }

    #[test]
    fn test_serializes_as_token_list() {
        let cmd = CommandLine::new("docker").arg("stop");
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json, serde_json::json!(["docker", "stop"]));
    }
}
