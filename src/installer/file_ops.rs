//! Basic file operations for installed packages
//!
//! This module handles low-level file operations:
//! - Directory creation (ensure_parent_dir)
//! - Removing an entry's owned paths (remove_owned_paths)
//! - Pruning directories left empty by a removal

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{Result, SkillsetError};

pub(crate) fn file_write_error(path: &Path, e: &std::io::Error) -> SkillsetError {
    SkillsetError::FileWriteFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

/// Ensure parent directory exists for a path
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| file_write_error(parent, &e))?;
    }
    Ok(())
}

/// Remove the project-relative `files` an entry owns.
///
/// Plain files go first, then directories deepest-first. Paths that are
/// already gone are skipped; other failures are logged. Afterwards empty
/// parent directories are pruned, stopping at the project root and at any
/// directory in `keep` (agent target directories). Returns the paths that
/// were actually removed.
pub fn remove_owned_paths(project_dir: &Path, files: &[String], keep: &BTreeSet<&str>) -> Vec<String> {
    let (mut dirs, plain): (Vec<&String>, Vec<&String>) = files.iter().partition(|f| f.ends_with('/'));
    dirs.sort_by_key(|d| std::cmp::Reverse(d.trim_end_matches('/').matches('/').count()));

    let mut removed = Vec::new();
    for rel in plain.into_iter().chain(dirs) {
        let path = project_dir.join(rel.trim_end_matches('/'));
        let result = if rel.ends_with('/') {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        match result {
            Ok(()) => removed.push(rel.clone()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Could not remove {}: {e}", path.display()),
        }
    }

    for rel in &removed {
        prune_empty_parents(project_dir, rel, keep);
    }
    removed
}

/// Remove empty ancestors of `rel`, nearest first
fn prune_empty_parents(project_dir: &Path, rel: &str, keep: &BTreeSet<&str>) {
    let mut current = Path::new(rel.trim_end_matches('/')).parent();
    while let Some(dir) = current {
        let dir_str = dir.to_string_lossy().replace('\\', "/");
        if dir_str.is_empty() || keep.contains(dir_str.as_str()) {
            return;
        }
        let absolute = project_dir.join(dir);
        let is_empty = fs::read_dir(&absolute)
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(false);
        if !is_empty || fs::remove_dir(&absolute).is_err() {
            return;
        }
        tracing::debug!("Pruned empty directory {}", absolute.display());
        current = dir.parent();
    }
}
