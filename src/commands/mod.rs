//! Command implementations for the skillset CLI
//!
//! Each command resolves the project directory, runs the matching operation
//! and prints its results to stdout. Logs and spinners go to stderr.

pub mod check;
pub mod completions;
pub mod helpers;
pub mod install;
pub mod list;
pub mod uninstall;
pub mod update;
