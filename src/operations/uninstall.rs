//! Uninstall operation module
//!
//! Removes exactly the paths an entry owns, prunes directories left empty
//! (agent target directories are kept), then drops the entry from the
//! manifest.

use std::path::Path;

use crate::agent::AgentRegistry;
use crate::error::{Result, SkillsetError};
use crate::installer::file_ops::remove_owned_paths;
use crate::manifest;

/// What an uninstall removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UninstallReport {
    pub key: String,
    /// Owned paths that were present and removed
    pub removed: Vec<String>,
}

/// High-level uninstall operation
pub struct UninstallOperation<'a> {
    project_dir: &'a Path,
    registry: &'a AgentRegistry,
}

impl<'a> UninstallOperation<'a> {
    pub fn new(project_dir: &'a Path, registry: &'a AgentRegistry) -> Self {
        Self {
            project_dir,
            registry,
        }
    }

    /// Uninstall the entry stored under `key`
    pub fn execute(&self, key: &str) -> Result<UninstallReport> {
        let manifest = manifest::read(self.project_dir)?;
        let entry = manifest.get(key).ok_or_else(|| SkillsetError::EntryNotFound {
            key: key.to_string(),
        })?;

        let removed = remove_owned_paths(self.project_dir, &entry.files, &self.registry.target_dirs());
        tracing::debug!("Removed {} of {} paths for {key}", removed.len(), entry.files.len());

        manifest::write(self.project_dir, &manifest.clone().without_entry(key))?;
        Ok(UninstallReport {
            key: key.to_string(),
            removed,
        })
    }
}
