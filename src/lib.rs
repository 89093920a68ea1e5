//! skillset - install agent skills, agents and hooks from git
//!
//! Installs packages from git repositories or local directories into the
//! agent directories of a project (`.claude/`, `.cursor/`, ...) and records
//! every path it writes in `.skillset/manifest.json`, so updates and
//! removals touch exactly those paths.

pub mod agent;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod git;
pub mod installer;
pub mod manifest;
pub mod operations;
pub mod progress;
pub mod source;
pub mod temp;
pub mod transaction;
pub mod update;
