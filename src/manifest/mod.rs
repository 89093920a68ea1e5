//! Installed-package manifest (`.skillset/manifest.json`)
//!
//! The manifest maps an install key to what was installed for it: the ref and
//! commit it came from, the agents it targets and every path it wrote. It is
//! the only record of file ownership, so later updates and removals touch
//! exactly those paths.
//!
//! `Manifest` values are updated functionally (`with_entry`, `without_entry`)
//! and persisted with `write`, which replaces the file atomically.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SkillsetError};

/// Directory holding the manifest, relative to the project root
pub const MANIFEST_DIR: &str = ".skillset";

/// Manifest file name inside `MANIFEST_DIR`
pub const MANIFEST_FILE: &str = "manifest.json";

/// One installed package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    /// Requested branch or tag; `None` when pinned to HEAD or local
    #[serde(rename = "ref")]
    pub git_ref: Option<String>,

    /// Resolved commit; `None` for local sources
    pub commit: Option<String>,

    /// Time of the last successful install or update
    pub installed_at: DateTime<Utc>,

    /// Agents this package was installed for, in insertion order
    pub agents: Vec<String>,

    /// Every project-relative path this package owns (directories end in `/`)
    pub files: Vec<String>,

    /// Clone URL when the key does not resolve to one on its own.
    /// Absent in manifests written before the field existed.
    #[serde(default)]
    pub clone_url: Option<String>,
}

impl ManifestEntry {
    /// Create an entry stamped with the current time
    pub fn new(
        git_ref: Option<String>,
        commit: Option<String>,
        agents: Vec<String>,
        files: Vec<String>,
        clone_url: Option<String>,
    ) -> Self {
        Self {
            git_ref,
            commit,
            installed_at: Utc::now(),
            agents: unique_in_order(agents),
            files: unique_in_order(files),
            clone_url,
        }
    }

    /// Whether this entry was installed from a local directory
    pub fn is_local(&self) -> bool {
        self.git_ref.is_none() && self.commit.is_none()
    }
}

fn unique_in_order(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// All installed packages, keyed by install key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: BTreeMap<String, ManifestEntry>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&ManifestEntry> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ManifestEntry)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Manifest with `entry` stored under `key`, replacing any previous entry
    #[must_use]
    pub fn with_entry(mut self, key: impl Into<String>, entry: ManifestEntry) -> Self {
        self.entries.insert(key.into(), entry);
        self
    }

    /// Manifest without `key`
    #[must_use]
    pub fn without_entry(mut self, key: &str) -> Self {
        self.entries.remove(key);
        self
    }

    /// Manifest where no entry other than `keep_key` owns any of `paths`.
    ///
    /// A released directory (trailing `/`) also releases everything under it.
    /// Used when an install is allowed to overwrite another entry's files, so
    /// ownership stays partitioned.
    #[must_use]
    pub fn release_paths(mut self, paths: &[String], keep_key: &str) -> Self {
        let released = |file: &String| {
            paths
                .iter()
                .any(|p| file == p || (p.ends_with('/') && file.starts_with(p.as_str())))
        };
        for (key, entry) in &mut self.entries {
            if key != keep_key {
                entry.files.retain(|file| !released(file));
            }
        }
        self
    }

    /// Union of every path owned by any entry
    pub fn tracked_files(&self) -> HashSet<&str> {
        self.entries
            .values()
            .flat_map(|e| e.files.iter().map(String::as_str))
            .collect()
    }
}

/// Location of the manifest for a project
pub fn manifest_path(project_dir: &Path) -> PathBuf {
    project_dir.join(MANIFEST_DIR).join(MANIFEST_FILE)
}

/// Load the manifest, or an empty one if none has been written yet
pub fn read(project_dir: &Path) -> Result<Manifest> {
    let path = manifest_path(project_dir);
    if !path.exists() {
        return Ok(Manifest::new());
    }

    let content = fs::read_to_string(&path).map_err(|e| SkillsetError::FileReadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    serde_json::from_str(&content).map_err(|e| SkillsetError::ManifestParseFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Persist the manifest.
///
/// Content goes to a uniquely named temp file next to the manifest which is
/// then renamed over it, so readers see either the old or the new manifest.
pub fn write(project_dir: &Path, manifest: &Manifest) -> Result<()> {
    let path = manifest_path(project_dir);
    let dir = project_dir.join(MANIFEST_DIR);
    let write_failed = |reason: String| SkillsetError::FileWriteFailed {
        path: path.display().to_string(),
        reason,
    };

    fs::create_dir_all(&dir).map_err(|e| write_failed(e.to_string()))?;

    let mut content = serde_json::to_string_pretty(manifest)?;
    content.push('\n');

    let mut tmp = tempfile::Builder::new()
        .prefix(".manifest-")
        .suffix(".json.tmp")
        .tempfile_in(&dir)
        .map_err(|e| write_failed(e.to_string()))?;
    tmp.write_all(content.as_bytes())
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| write_failed(e.to_string()))?;
    tmp.persist(&path).map_err(|e| write_failed(e.error.to_string()))?;

    tracing::debug!("Wrote manifest with {} entries", manifest.len());
    Ok(())
}
