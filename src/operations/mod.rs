//! Operations module for installing, updating and uninstalling packages
//!
//! This module provides high-level operations that coordinate:
//! - InstallOperation: fetch, plan, collision check, copy and record
//! - UpdateOperation: re-fetch and reinstall installed entries
//! - UninstallOperation: remove an entry's files and its record
//!
//! The operations coordinate with:
//! - Installer: planning, collision analysis and transactional copies
//! - Git: cloning through a `GitRunner`
//! - Manifest: reading and atomically writing the installed-package record

pub mod install;
pub mod uninstall;
pub mod update;

pub use install::{InstallOperation, InstallOptions, InstalledPackage};
pub use uninstall::{UninstallOperation, UninstallReport};
pub use update::{UpdateOperation, UpdateOptions, UpdateResult};
