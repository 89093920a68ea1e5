//! Incoming-file projection
//!
//! Predicts, without copying anything, which project-relative paths an
//! install will create. The same `CopyPlan` drives the copier, so the
//! projection and what actually lands on disk cannot drift apart.

use std::fs;
use std::path::{Path, PathBuf};

use crate::agent::{AgentRegistry, AssetCategory};
use crate::error::{Result, SkillsetError};

use super::detection::DetectedType;

/// One top-level copy an install will perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCopy {
    /// Agent this copy is made for
    pub agent: String,
    /// Category for plugin assets, `None` for a bare skill
    pub category: Option<AssetCategory>,
    /// Absolute source path
    pub source: PathBuf,
    /// Project-relative destination; directories end with `/`
    pub dest: String,
    pub is_dir: bool,
}

/// Ordered copies for one package: agents in the given order, then
/// categories in scan order, then entries sorted by name.
pub type CopyPlan = Vec<PlannedCopy>;

/// An immediate entry of a category directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
}

/// Immediate, non-hidden entries of `<source_dir>/<category>`, sorted by name
pub fn category_entries(source_dir: &Path, category: AssetCategory) -> Result<Vec<CategoryEntry>> {
    let dir = source_dir.join(category.dir_name());
    let read_failed = |e: std::io::Error| SkillsetError::FileReadFailed {
        path: dir.display().to_string(),
        reason: e.to_string(),
    };

    let mut entries = Vec::new();
    for entry in fs::read_dir(&dir).map_err(read_failed)? {
        let entry = entry.map_err(read_failed)?;
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        let path = entry.path();
        entries.push(CategoryEntry {
            is_dir: path.is_dir(),
            name,
            path,
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

fn dest_path(target_dir: &str, name: &str, is_dir: bool) -> String {
    let base = target_dir.trim_end_matches('/');
    if is_dir {
        format!("{base}/{name}/")
    } else {
        format!("{base}/{name}")
    }
}

/// Build the copy plan for an installable package.
///
/// `name` is the directory name a bare skill is installed under. Agents with
/// no target directory for a category are skipped for that category.
/// Non-installable types yield an empty plan.
pub fn plan(
    source_dir: &Path,
    detected: &DetectedType,
    name: &str,
    agents: &[String],
    registry: &AgentRegistry,
) -> Result<CopyPlan> {
    let mut plan = Vec::new();

    match detected {
        DetectedType::BareSkill => {
            for agent in agents {
                if let Some(target) = registry.target_dir(agent, AssetCategory::Skills) {
                    plan.push(PlannedCopy {
                        agent: agent.clone(),
                        category: None,
                        source: source_dir.to_path_buf(),
                        dest: dest_path(target, name, true),
                        is_dir: true,
                    });
                }
            }
        }
        DetectedType::Plugin { asset_dirs } => {
            let listed: Vec<(AssetCategory, Vec<CategoryEntry>)> = asset_dirs
                .iter()
                .map(|c| category_entries(source_dir, *c).map(|entries| (*c, entries)))
                .collect::<Result<_>>()?;

            for agent in agents {
                for (category, entries) in &listed {
                    let Some(target) = registry.target_dir(agent, *category) else {
                        continue;
                    };
                    for entry in entries {
                        plan.push(PlannedCopy {
                            agent: agent.clone(),
                            category: Some(*category),
                            source: entry.path.clone(),
                            dest: dest_path(target, &entry.name, entry.is_dir),
                            is_dir: entry.is_dir,
                        });
                    }
                }
            }
        }
        DetectedType::Collection { .. } | DetectedType::NotAPackage => {}
    }

    Ok(plan)
}

/// Destinations of a plan, first occurrence wins
pub fn incoming_files(plan: &[PlannedCopy]) -> Vec<String> {
    let mut files: Vec<String> = Vec::with_capacity(plan.len());
    for copy in plan {
        if !files.contains(&copy.dest) {
            files.push(copy.dest.clone());
        }
    }
    files
}

/// Paths an install of this package would produce, deduplicated across
/// agents that share a target directory
pub fn project_incoming_files(
    source_dir: &Path,
    detected: &DetectedType,
    name: &str,
    agents: &[String],
    registry: &AgentRegistry,
) -> Result<Vec<String>> {
    Ok(incoming_files(&plan(
        source_dir, detected, name, agents, registry,
    )?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn agents(ids: &[&str]) -> Vec<String> {
        ids.iter().map(ToString::to_string).collect()
    }

    fn plugin_source() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("skills/lint")).unwrap();
        fs::write(root.join("skills/lint/SKILL.md"), "# lint").unwrap();
        fs::create_dir_all(root.join("skills/format")).unwrap();
        fs::write(root.join("skills/format/SKILL.md"), "# format").unwrap();
        fs::create_dir_all(root.join("agents")).unwrap();
        fs::write(root.join("agents/reviewer.md"), "# reviewer").unwrap();
        fs::write(root.join("agents/.DS_Store"), "").unwrap();
        fs::create_dir_all(root.join("hooks")).unwrap();
        fs::write(root.join("hooks/pre-commit.sh"), "#!/bin/sh").unwrap();
        temp
    }

    fn plugin_type() -> DetectedType {
        DetectedType::Plugin {
            asset_dirs: vec![
                AssetCategory::Skills,
                AssetCategory::Agents,
                AssetCategory::Hooks,
            ],
        }
    }

    #[test]
    fn test_bare_skill_one_dir_per_agent() {
        let temp = TempDir::new().unwrap();
        let files = project_incoming_files(
            temp.path(),
            &DetectedType::BareSkill,
            "lint",
            &agents(&["claude", "cursor"]),
            &AgentRegistry::builtin(),
        )
        .unwrap();
        assert_eq!(files, vec![".claude/skills/lint/", ".cursor/skills/lint/"]);
    }

    #[test]
    fn test_plugin_maps_entries_and_skips_unsupported_categories() {
        let source = plugin_source();
        let files = project_incoming_files(
            source.path(),
            &plugin_type(),
            "ignored",
            &agents(&["claude", "codex"]),
            &AgentRegistry::builtin(),
        )
        .unwrap();

        assert_eq!(
            files,
            vec![
                ".claude/skills/format/",
                ".claude/skills/lint/",
                ".claude/agents/reviewer.md",
                ".claude/hooks/pre-commit.sh",
                ".agents/skills/format/",
                ".agents/skills/lint/",
            ]
        );
    }

    #[test]
    fn test_shared_target_dir_is_deduplicated() {
        let source = plugin_source();
        let registry = AgentRegistry::builtin();
        let plan = plan(
            source.path(),
            &plugin_type(),
            "x",
            &agents(&["codex", "amp"]),
            &registry,
        )
        .unwrap();

        assert_eq!(plan.len(), 4);
        assert_eq!(
            incoming_files(&plan),
            vec![".agents/skills/format/", ".agents/skills/lint/"]
        );
    }

    #[test]
    fn test_projection_is_deterministic() {
        let source = plugin_source();
        let registry = AgentRegistry::builtin();
        let run = || {
            project_incoming_files(
                source.path(),
                &plugin_type(),
                "x",
                &agents(&["cursor", "claude", "gemini"]),
                &registry,
            )
            .unwrap()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_missing_category_dir_is_read_error() {
        let temp = TempDir::new().unwrap();
        let err = project_incoming_files(
            temp.path(),
            &DetectedType::Plugin {
                asset_dirs: vec![AssetCategory::Hooks],
            },
            "x",
            &agents(&["claude"]),
            &AgentRegistry::builtin(),
        )
        .unwrap_err();
        assert!(matches!(err, SkillsetError::FileReadFailed { .. }));
    }

    #[test]
    fn test_non_installable_types_project_nothing() {
        let temp = TempDir::new().unwrap();
        let files = project_incoming_files(
            temp.path(),
            &DetectedType::NotAPackage,
            "x",
            &agents(&["claude"]),
            &AgentRegistry::builtin(),
        )
        .unwrap();
        assert!(files.is_empty());
    }
}
