//! Core domain types
//!
//! A `Build` describes one repository/platform combination. It is built once,
//! never mutated, and turned into an ordered list of `CommandLine`s.

pub mod build;
pub mod command;
pub mod options;
pub mod tags;
