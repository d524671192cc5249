//! XLA CI Core
//!
//! Core types and pure logic for the XLA CI build driver.
//!
//! This crate contains:
//! - Domain types: build descriptors, option maps, command lines
//! - Container command builders (pull, run, exec, stop)
//! - The catalog mapping Kokoro job names to builds
//!
//! Nothing in here spawns a process; execution lives in `xla-ci-runner`.

pub mod catalog;
pub mod container;
pub mod domain;
pub mod error;

pub use catalog::Catalog;
pub use domain::build::{Build, BuildBuilder, BuildType, Repo};
pub use domain::command::CommandLine;
pub use domain::options::{OptionMap, OptionValue};
pub use error::{CoreError, Result};
