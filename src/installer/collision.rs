//! Pre-flight collision analysis
//!
//! Two read-only checks run before any copy:
//! - package vs package: incoming paths already owned by another manifest entry
//! - package vs unmanaged: incoming paths that exist on disk but that no
//!   entry owns (hand-written files, other tools' output)

use std::collections::BTreeMap;
use std::path::Path;

use crate::manifest::Manifest;

/// Overlapping paths per owning entry key
pub type ManifestCollisions = BTreeMap<String, Vec<String>>;

/// Incoming paths already listed in other entries' `files`.
///
/// `exclude_key` skips one entry, used when reinstalling that same key.
pub fn find_manifest_collisions(
    manifest: &Manifest,
    incoming: &[String],
    exclude_key: Option<&str>,
) -> ManifestCollisions {
    manifest
        .iter()
        .filter(|(key, _)| Some(key.as_str()) != exclude_key)
        .filter_map(|(key, entry)| {
            let overlap: Vec<String> = incoming
                .iter()
                .filter(|path| entry.files.contains(path))
                .cloned()
                .collect();
            (!overlap.is_empty()).then(|| (key.clone(), overlap))
        })
        .collect()
}

/// Incoming paths not tracked by any entry that already exist under
/// `project_dir`, in incoming order
pub fn find_unmanaged_collisions(
    manifest: &Manifest,
    incoming: &[String],
    project_dir: &Path,
) -> Vec<String> {
    let tracked = manifest.tracked_files();
    incoming
        .iter()
        .filter(|path| !tracked.contains(path.as_str()))
        .filter(|path| {
            project_dir
                .join(path.trim_end_matches('/'))
                .symlink_metadata()
                .is_ok()
        })
        .cloned()
        .collect()
}

/// Combined result of both checks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollisionReport {
    pub owned: ManifestCollisions,
    pub unmanaged: Vec<String>,
}

impl CollisionReport {
    pub fn analyze(
        manifest: &Manifest,
        incoming: &[String],
        exclude_key: Option<&str>,
        project_dir: &Path,
    ) -> Self {
        Self {
            owned: find_manifest_collisions(manifest, incoming, exclude_key),
            unmanaged: find_unmanaged_collisions(manifest, incoming, project_dir),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.owned.is_empty() && self.unmanaged.is_empty()
    }

    /// Number of owned paths across all entries
    pub fn owned_count(&self) -> usize {
        self.owned.values().map(Vec::len).sum()
    }

    /// Fold another report in (used for multi-package installs)
    pub fn merge(&mut self, other: CollisionReport) {
        for (key, paths) in other.owned {
            let existing = self.owned.entry(key).or_default();
            for path in paths {
                if !existing.contains(&path) {
                    existing.push(path);
                }
            }
        }
        for path in other.unmanaged {
            if !self.unmanaged.contains(&path) {
                self.unmanaged.push(path);
            }
        }
    }
}
