//! Build catalog
//!
//! Maps Kokoro job names to the build they run. The catalog is built once at
//! startup and only read afterwards; several job names share a build.

use std::collections::HashMap;
use tracing::debug;

use crate::domain::build::{Build, BuildType, PRIMARY_REPO, PROFILE_FILE};
use crate::domain::command::CommandLine;
use crate::domain::options::OptionMap;
use crate::domain::tags::{compute_capability_version, tag_filters_for_compute_capability};
use crate::error::{CoreError, Result};

pub const DEFAULT_IMAGE: &str = "gcr.io/tensorflow-sigs/build:latest-python3.11";

/// Pinned image shipping cuDNN 9, used by the GPU builds
pub const CUDNN_9_IMAGE: &str = "gcr.io/tensorflow-sigs/build@sha256:0a9728e258d7e0e5830d1960a65968ffdc1d138af5441e30948918e0d50ab2c7";

pub const ARM64_JAX_MULTI_PYTHON_IMAGE: &str =
    "us-central1-docker.pkg.dev/tensorflow-sigs/tensorflow/build-arm64:jax-latest-multi-python";

pub const XLA_DEFAULT_TARGET_PATTERNS: [&str; 3] = ["//xla/...", "//build_tools/...", "@tsl//tsl/..."];

const TENSORFLOW_TARGET_PATTERNS: [&str; 5] = [
    "//tensorflow/compiler/...",
    "-//tensorflow/compiler/tf2tensorrt/...",
    "//tensorflow/python/...",
    "-//tensorflow/python/distribute/...",
    "-//tensorflow/python/compiler/tensorrt/...",
];

const CPU_X86_TAG_FILTERS: [&str; 4] = ["-no_oss", "-gpu", "-requires-gpu-nvidia", "-requires-gpu-amd"];

const CPU_ARM64_TAG_FILTERS: [&str; 5] = [
    "-no_oss",
    "-gpu",
    "-requires-gpu-nvidia",
    "-requires-gpu-amd",
    "-not_run:arm",
];

const NVIDIA_GPU_TAG_FILTERS: [&str; 3] = ["-no_oss", "requires-gpu-nvidia", "gpu"];

/// Local checkout of XLA as seen from inside the build container
const XLA_OVERRIDE: &str = "xla=/github/xla";

/// Kokoro job names and the build each one runs
const JOBS: [(&str, BuildType); 10] = [
    ("tensorflow/xla/linux/arm64/build_cpu", BuildType::CpuArm64),
    ("tensorflow/xla/linux/cpu/build_cpu", BuildType::CpuX86),
    ("tensorflow/xla/linux/gpu/build_gpu", BuildType::Gpu),
    ("tensorflow/xla/linux/github_continuous/arm64/build_cpu", BuildType::CpuArm64),
    ("tensorflow/xla/linux/github_continuous/build_gpu", BuildType::Gpu),
    ("tensorflow/xla/linux/github_continuous/build_cpu", BuildType::CpuX86),
    ("tensorflow/xla/jax/cpu/build_cpu", BuildType::JaxCpu),
    ("tensorflow/xla/jax/gpu/build_gpu", BuildType::JaxGpu),
    ("tensorflow/xla/tensorflow/cpu/build_cpu", BuildType::TensorflowCpu),
    ("tensorflow/xla/tensorflow/gpu/build_gpu", BuildType::TensorflowGpu),
];

/// Bazel options shared by the XLA and JAX builds
pub fn default_bazel_options() -> OptionMap {
    OptionMap::new()
        .with("test_output", "errors")
        .with("verbose_failures", true)
        .with("keep_going", true)
        .with("nobuild_tests_only", true)
        .with("profile", PROFILE_FILE)
        .with("flaky_test_attempts", 3)
        .with("jobs", 150)
        .with("bes_upload_mode", "fully_async")
}

/// Builds an XLA GPU build for one NVIDIA compute capability
///
/// # Arguments
/// * `build_type` - Build type to tag the descriptor with
/// * `configs` - Bazel configs
/// * `compute_capability` - e.g. `75` for sm_75
pub fn nvidia_gpu_build(build_type: BuildType, configs: &[&str], compute_capability: u32) -> Result<Build> {
    let test_tag_filters = NVIDIA_GPU_TAG_FILTERS
        .iter()
        .map(|tag| tag.to_string())
        .chain(tag_filters_for_compute_capability(compute_capability));

    let options = OptionMap::new()
        .with("run_under", "//tools/ci_build/gpu_build:parallel_gpu_execute")
        .with(
            "repo_env",
            format!(
                "TF_CUDA_COMPUTE_CAPABILITIES={}",
                compute_capability_version(compute_capability)
            ),
        )
        .extend(&default_bazel_options());

    Build::builder(build_type, PRIMARY_REPO, CUDNN_9_IMAGE, XLA_DEFAULT_TARGET_PATTERNS)
        .with_configs(configs.iter().copied())
        .with_build_tag_filters(NVIDIA_GPU_TAG_FILTERS)
        .with_test_tag_filters(test_tag_filters)
        .with_options(options)
        .with_extra_setup_commands(vec![
            CommandLine::new("nvidia-smi"),
            // TODO: drop both rewrites once the TF containers ship cuDNN 9
            CommandLine::new("sed").args([
                "-i",
                r"s/@sigbuild-r2\.17-clang_/@sigbuild-r2.17-clang-cudnn9_/g",
                "github/xla/.bazelrc",
            ]),
            CommandLine::new("sed").args(["-i", r"s/8\.9\.7\.29/9.1.1/g", "github/xla/.bazelrc"]),
        ])
        .build()
}

fn cpu_x86_build() -> Result<Build> {
    Build::builder(BuildType::CpuX86, PRIMARY_REPO, DEFAULT_IMAGE, XLA_DEFAULT_TARGET_PATTERNS)
        .with_configs(["warnings", "nonccl", "rbe_linux_cpu"])
        .with_tag_filters(CPU_X86_TAG_FILTERS)
        .with_options(default_bazel_options())
        .build()
}

fn cpu_arm64_build() -> Result<Build> {
    Build::builder(
        BuildType::CpuArm64,
        PRIMARY_REPO,
        ARM64_JAX_MULTI_PYTHON_IMAGE,
        XLA_DEFAULT_TARGET_PATTERNS,
    )
    .with_configs(["warnings", "rbe_cross_compile_linux_arm64_xla", "nonccl"])
    .with_tag_filters(CPU_ARM64_TAG_FILTERS)
    .with_options(default_bazel_options().with("build_tests_only", true))
    .build()
}

fn gpu_build() -> Result<Build> {
    nvidia_gpu_build(BuildType::Gpu, &["warnings", "rbe_linux_cuda_nvcc"], 75)
}

fn jax_cpu_build() -> Result<Build> {
    Build::builder(
        BuildType::JaxCpu,
        "google/jax",
        DEFAULT_IMAGE,
        ["//tests:cpu_tests", "//tests:backend_independent_tests"],
    )
    .with_configs([
        "avx_posix",
        "mkl_open_source_only",
        "rbe_cpu_linux_py3.12",
        "tensorflow_testing_rbe_linux",
    ])
    .with_test_env(
        OptionMap::new()
            .with("JAX_NUM_GENERATED_CASES", 25)
            .with("JAX_SKIP_SLOW_TESTS", 1),
    )
    .with_options(default_bazel_options().with("override_repository", XLA_OVERRIDE))
    .build()
}

fn jax_gpu_build() -> Result<Build> {
    Build::builder(
        BuildType::JaxGpu,
        "google/jax",
        DEFAULT_IMAGE,
        ["//tests:gpu_tests", "//tests:backend_independent_tests"],
    )
    .with_configs([
        "avx_posix",
        "mkl_open_source_only",
        "rbe_linux_cuda12.3_nvcc_py3.10",
        "tensorflow_testing_rbe_linux",
    ])
    .with_tag_filters(["-multiaccelerator"])
    .with_test_env(
        OptionMap::new()
            .with("JAX_SKIP_SLOW_TESTS", 1)
            .with("TF_CPP_MIN_LOG_LEVEL", 0)
            .with("JAX_EXCLUDE_TEST_TARGETS", "PmapTest.testSizeOverflow"),
    )
    .with_options(default_bazel_options().with("override_repository", XLA_OVERRIDE))
    .build()
}

/// TensorFlow builds don't use the shared defaults
fn tensorflow_options() -> OptionMap {
    OptionMap::new()
        .with("verbose_failures", true)
        .with("test_output", "errors")
        .with("override_repository", XLA_OVERRIDE)
        .with("profile", PROFILE_FILE)
}

fn tensorflow_cpu_build() -> Result<Build> {
    Build::builder(
        BuildType::TensorflowCpu,
        "tensorflow/tensorflow",
        DEFAULT_IMAGE,
        TENSORFLOW_TARGET_PATTERNS,
    )
    .with_configs(["release_cpu_linux", "rbe_linux_cpu", "linux_cpu_pycpp_test_filters"])
    .with_options(tensorflow_options())
    .build()
}

fn tensorflow_gpu_build() -> Result<Build> {
    Build::builder(
        BuildType::TensorflowGpu,
        "tensorflow/tensorflow",
        DEFAULT_IMAGE,
        TENSORFLOW_TARGET_PATTERNS,
    )
    .with_configs(["release_gpu_linux", "rbe_linux_cuda", "linux_cuda_pycpp_test_filters"])
    .with_tag_filters(["-no_oss", "+gpu"])
    .with_options(tensorflow_options())
    .build()
}

/// Read-only registry of builds keyed by job name
#[derive(Debug, Clone)]
pub struct Catalog {
    builds: HashMap<BuildType, Build>,
    jobs: Vec<(String, BuildType)>,
}

impl Catalog {
    /// Creates an empty catalog
    pub fn new() -> Self {
        Self {
            builds: HashMap::new(),
            jobs: Vec::new(),
        }
    }

    /// Builds the catalog of every Kokoro job this driver knows about
    pub fn standard() -> Result<Self> {
        let mut catalog = Self::new();
        for build in [
            cpu_x86_build()?,
            cpu_arm64_build()?,
            gpu_build()?,
            jax_cpu_build()?,
            jax_gpu_build()?,
            tensorflow_cpu_build()?,
            tensorflow_gpu_build()?,
        ] {
            catalog = catalog.with_build(build);
        }
        for (job_name, build_type) in JOBS {
            catalog = catalog.with_job(job_name, build_type);
        }
        Ok(catalog)
    }

    /// Registers a build, replacing any build of the same type
    pub fn with_build(mut self, build: Build) -> Self {
        self.builds.insert(build.build_type(), build);
        self
    }

    /// Maps a job name to a build type
    pub fn with_job(mut self, job_name: impl Into<String>, build_type: BuildType) -> Self {
        self.jobs.push((job_name.into(), build_type));
        self
    }

    /// Resolves a job name to its build
    ///
    /// # Errors
    /// Returns `CoreError::UnknownJob` if the job is not registered or its
    /// build type has no build
    pub fn lookup(&self, job_name: &str) -> Result<&Build> {
        let build = self
            .jobs
            .iter()
            .find(|(name, _)| name == job_name)
            .and_then(|(_, build_type)| self.builds.get(build_type))
            .ok_or_else(|| CoreError::UnknownJob(job_name.to_string()))?;

        debug!("Resolved job {} to {} build", job_name, build.build_type());
        Ok(build)
    }

    /// Iterates job names with their build, in registration order
    pub fn jobs(&self) -> impl Iterator<Item = (&str, &Build)> {
        self.jobs.iter().filter_map(|(name, build_type)| {
            self.builds
                .get(build_type)
                .map(|build| (name.as_str(), build))
        })
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}
