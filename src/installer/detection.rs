//! Package type detection
//!
//! A fetched source is one of:
//! - a bare skill: a config file and a `SKILL.md` marker, copied as one directory
//! - a plugin: a config file and one or more `skills/`, `agents/`, `hooks/` dirs
//! - a collection: no config at the root, but child directories that have one
//! - not a package

use std::fmt;
use std::fs;
use std::path::Path;

use crate::agent::AssetCategory;
use crate::config::has_config;

/// Marker file identifying a bare skill directory
pub const SKILL_MARKER: &str = "SKILL.md";

/// Shape of a fetched source directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectedType {
    BareSkill,
    Plugin { asset_dirs: Vec<AssetCategory> },
    Collection { members: Vec<String> },
    NotAPackage,
}

impl DetectedType {
    /// Whether this type can be copied directly (bare skill or plugin)
    pub fn is_installable(&self) -> bool {
        matches!(self, DetectedType::BareSkill | DetectedType::Plugin { .. })
    }
}

impl fmt::Display for DetectedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectedType::BareSkill => f.write_str("bare skill"),
            DetectedType::Plugin { .. } => f.write_str("plugin"),
            DetectedType::Collection { members } => write!(f, "collection of {} package(s)", members.len()),
            DetectedType::NotAPackage => f.write_str("not a package"),
        }
    }
}

/// Classify `dir`. `config_present` says whether `dir` has its own config file.
pub fn classify(dir: &Path, config_present: bool) -> DetectedType {
    if config_present {
        let asset_dirs: Vec<AssetCategory> = AssetCategory::ALL
            .into_iter()
            .filter(|c| dir.join(c.dir_name()).is_dir())
            .collect();
        let has_marker = dir.join(SKILL_MARKER).is_file();

        if !asset_dirs.is_empty() {
            if has_marker {
                tracing::warn!(
                    "{} has both {SKILL_MARKER} and asset directories; installing as a plugin",
                    dir.display()
                );
            }
            return DetectedType::Plugin { asset_dirs };
        }
        if has_marker {
            return DetectedType::BareSkill;
        }
        tracing::warn!(
            "{} is configured but has no {SKILL_MARKER} and no skills/, agents/ or hooks/",
            dir.display()
        );
        return DetectedType::NotAPackage;
    }

    let members = configured_children(dir);
    if members.is_empty() {
        DetectedType::NotAPackage
    } else {
        DetectedType::Collection { members }
    }
}

/// Names of immediate, non-hidden subdirectories that have a config file, sorted
fn configured_children(dir: &Path) -> Vec<String> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Cannot read {}: {e}", dir.display());
            return Vec::new();
        }
    };

    let mut members: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir() && has_config(&entry.path()))
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter(|name| !name.starts_with('.'))
        .collect();
    members.sort();
    members
}
