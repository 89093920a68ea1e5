//! Command helper utilities

use std::path::PathBuf;

use crate::error::{Result, SkillsetError};
use crate::manifest::ManifestEntry;
use crate::update::short_sha;

/// Resolve project path from optional argument
///
/// If a project path is provided it must be an existing directory.
/// Otherwise, resolve to the current directory.
pub fn resolve_project_path(project: Option<PathBuf>) -> Result<PathBuf> {
    match project {
        Some(path) if path.is_dir() => Ok(path),
        Some(path) => Err(SkillsetError::IoError {
            message: format!("Project directory does not exist: {}", path.display()),
        }),
        None => std::env::current_dir().map_err(|e| SkillsetError::IoError {
            message: format!("Failed to get current directory: {e}"),
        }),
    }
}

/// Short description of what an entry is pinned to
pub fn version_label(entry: &ManifestEntry) -> String {
    match (entry.git_ref.as_deref(), entry.commit.as_deref()) {
        (Some(git_ref), Some(commit)) => format!("{git_ref} ({})", short_sha(commit)),
        (Some(git_ref), None) => git_ref.to_string(),
        (None, Some(commit)) => short_sha(commit).to_string(),
        (None, None) => "local".to_string(),
    }
}
