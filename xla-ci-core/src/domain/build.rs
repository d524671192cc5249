//! Build descriptor domain types

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::container::{self, CHECKOUT_ROOT, PullPolicy};
use crate::domain::command::CommandLine;
use crate::domain::options::OptionMap;
use crate::error::{CoreError, Result};

/// Repository every build runs from; other repositories are cloned next to it
pub const PRIMARY_REPO: &str = "openxla/xla";

/// Profile written by `bazel test` and read back by `bazel analyze-profile`
pub const PROFILE_FILE: &str = "profile.json.gz";

/// Script producing the index page of the build artifacts
pub const INDEX_SCRIPT: &str = "./github/xla/.kokoro/generate_index_html.sh";

/// Platform or downstream project a build targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildType {
    CpuX86,
    CpuArm64,
    Gpu,
    GpuContinuous,
    JaxCpu,
    JaxGpu,
    TensorflowCpu,
    TensorflowGpu,
}

impl BuildType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildType::CpuX86 => "CPU_X86",
            BuildType::CpuArm64 => "CPU_ARM64",
            BuildType::Gpu => "GPU",
            BuildType::GpuContinuous => "GPU_CONTINUOUS",
            BuildType::JaxCpu => "JAX_CPU",
            BuildType::JaxGpu => "JAX_GPU",
            BuildType::TensorflowCpu => "TENSORFLOW_CPU",
            BuildType::TensorflowGpu => "TENSORFLOW_GPU",
        }
    }

    /// How the build image is pulled on this platform
    ///
    /// The ARM64 VMs have no GNU parallel, so they pull without retries.
    pub fn pull_policy(&self) -> PullPolicy {
        match self {
            BuildType::CpuArm64 => PullPolicy::Direct,
            _ => PullPolicy::DEFAULT_RETRYING,
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// GitHub repository reference, `owner/name`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Repo {
    owner: String,
    name: String,
}

impl Repo {
    /// Parses `owner/name`
    ///
    /// # Errors
    /// Returns `CoreError::MalformedRepo` unless there is exactly one `/`
    /// with a non-empty part on each side
    pub fn parse(input: &str) -> Result<Self> {
        match input.split('/').collect::<Vec<_>>().as_slice() {
            [owner, name] if !owner.is_empty() && !name.is_empty() => Ok(Self {
                owner: owner.to_string(),
                name: name.to_string(),
            }),
            _ => Err(CoreError::MalformedRepo(input.to_string())),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Repository name, also the checkout directory
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_primary(&self) -> bool {
        self.to_string() == PRIMARY_REPO
    }

    pub fn clone_url(&self) -> String {
        format!("https://github.com/{}", self)
    }
}

impl fmt::Display for Repo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for Repo {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for Repo {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Everything needed to test one repository on one platform
///
/// Built once through [`Build::builder`] and immutable afterwards; the
/// command sequence is a pure function of these fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Build {
    build_type: BuildType,
    repo: Repo,
    image_url: String,
    target_patterns: Vec<String>,
    configs: Vec<String>,
    build_tag_filters: Vec<String>,
    test_tag_filters: Vec<String>,
    action_env: OptionMap,
    test_env: OptionMap,
    options: OptionMap,
    extra_setup_commands: Vec<CommandLine>,
}

impl Build {
    /// Starts a builder with the required fields; everything else defaults to empty
    pub fn builder<I, S>(
        build_type: BuildType,
        repo: impl Into<String>,
        image_url: impl Into<String>,
        target_patterns: I,
    ) -> BuildBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        BuildBuilder {
            build_type,
            repo: repo.into(),
            image_url: image_url.into(),
            target_patterns: collect(target_patterns),
            configs: Vec::new(),
            build_tag_filters: Vec::new(),
            test_tag_filters: Vec::new(),
            action_env: OptionMap::new(),
            test_env: OptionMap::new(),
            options: OptionMap::new(),
            extra_setup_commands: Vec::new(),
        }
    }

    pub fn build_type(&self) -> BuildType {
        self.build_type
    }

    pub fn repo(&self) -> &Repo {
        &self.repo
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    pub fn target_patterns(&self) -> &[String] {
        &self.target_patterns
    }

    pub fn configs(&self) -> &[String] {
        &self.configs
    }

    pub fn build_tag_filters(&self) -> &[String] {
        &self.build_tag_filters
    }

    pub fn test_tag_filters(&self) -> &[String] {
        &self.test_tag_filters
    }

    pub fn action_env(&self) -> &OptionMap {
        &self.action_env
    }

    pub fn test_env(&self) -> &OptionMap {
        &self.test_env
    }

    pub fn options(&self) -> &OptionMap {
        &self.options
    }

    pub fn extra_setup_commands(&self) -> &[CommandLine] {
        &self.extra_setup_commands
    }

    /// Renders the `bazel test` invocation for this build
    ///
    /// Both tag filter flags are always present, even with an empty value.
    pub fn bazel_test_command(&self) -> CommandLine {
        let build_tag_filters = format!("--build_tag_filters={}", self.build_tag_filters.join(","));
        let test_tag_filters = format!("--test_tag_filters={}", self.test_tag_filters.join(","));
        let configs = self.configs.iter().map(|config| format!("--config={}", config));

        CommandLine::new("bazel")
            .arg("test")
            .arg(build_tag_filters)
            .arg(test_tag_filters)
            .args(configs)
            .args(self.action_env.to_env_flags("action_env"))
            .args(self.test_env.to_env_flags("test_env"))
            .args(self.options.to_cli_options())
            .arg("--")
            .args(self.target_patterns.iter().cloned())
    }

    /// Returns the ordered commands that check out, test and tear down this build
    ///
    /// Pure: nothing is executed and repeated calls return the same sequence.
    pub fn commands(&self) -> Vec<CommandLine> {
        let mut cmds = vec![CommandLine::new(INDEX_SCRIPT).arg("index.html")];

        if !self.repo.is_primary() {
            cmds.push(
                CommandLine::new("git")
                    .arg("clone")
                    .arg("--depth=1")
                    .arg(self.repo.clone_url())
                    .arg(format!("./{}/{}", CHECKOUT_ROOT, self.repo.name())),
            );
        }

        cmds.extend(self.extra_setup_commands.iter().cloned());

        cmds.push(container::pull(&self.image_url, self.build_type.pull_policy()));
        cmds.push(container::run(&self.image_url, self.repo.name()));
        cmds.push(container::exec(self.bazel_test_command()));
        cmds.push(container::exec(
            CommandLine::new("bazel").args(["analyze-profile", PROFILE_FILE]),
        ));
        cmds.push(container::stop());

        cmds
    }
}

/// Builder for [`Build`]
///
/// Every optional field starts empty. `build()` validates the repository
/// reference, so a `Build` can never hold a malformed one.
#[derive(Debug, Clone)]
pub struct BuildBuilder {
    build_type: BuildType,
    repo: String,
    image_url: String,
    target_patterns: Vec<String>,
    configs: Vec<String>,
    build_tag_filters: Vec<String>,
    test_tag_filters: Vec<String>,
    action_env: OptionMap,
    test_env: OptionMap,
    options: OptionMap,
    extra_setup_commands: Vec<CommandLine>,
}

impl BuildBuilder {
    pub fn with_configs<I, S>(mut self, configs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.configs = collect(configs);
        self
    }

    pub fn with_build_tag_filters<I, S>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.build_tag_filters = collect(filters);
        self
    }

    pub fn with_test_tag_filters<I, S>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.test_tag_filters = collect(filters);
        self
    }

    /// Sets the same filters for build and test
    pub fn with_tag_filters<I, S>(self, filters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let filters: Vec<String> = collect(filters);
        self.with_build_tag_filters(filters.clone())
            .with_test_tag_filters(filters)
    }

    pub fn with_action_env(mut self, env: OptionMap) -> Self {
        self.action_env = env;
        self
    }

    pub fn with_test_env(mut self, env: OptionMap) -> Self {
        self.test_env = env;
        self
    }

    pub fn with_options(mut self, options: OptionMap) -> Self {
        self.options = options;
        self
    }

    pub fn with_extra_setup_commands(mut self, commands: Vec<CommandLine>) -> Self {
        self.extra_setup_commands = commands;
        self
    }

    /// Finishes the descriptor
    ///
    /// # Errors
    /// Returns `CoreError::MalformedRepo` if the repository is not `owner/name`
    pub fn build(self) -> Result<Build> {
        Ok(Build {
            build_type: self.build_type,
            repo: Repo::parse(&self.repo)?,
            image_url: self.image_url,
            target_patterns: self.target_patterns,
            configs: self.configs,
            build_tag_filters: self.build_tag_filters,
            test_tag_filters: self.test_tag_filters,
            action_env: self.action_env,
            test_env: self.test_env,
            options: self.options,
            extra_setup_commands: self.extra_setup_commands,
        })
    }
}

fn collect<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}
