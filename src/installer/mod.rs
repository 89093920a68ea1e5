//! Package installation engine
//!
//! This module handles:
//! - Fetching a source (validating a local directory or cloning a repository)
//! - Choosing target agents for a package
//! - Classifying sources and expanding collections into member packages
//! - Planning copies and projecting incoming files
//!
//! Submodules provide collision analysis, the transactional copier, removal
//! of owned files and the reinstall orchestrator used by updates.

use std::path::{Path, PathBuf};

use crate::agent::AgentRegistry;
use crate::config::{has_config, read_source_config};
use crate::error::{Result, SkillsetError};
use crate::git::{self, CloneResult, GitRunner};
use crate::source::{Source, member_key};

pub mod collision;
pub mod copy;
pub mod detection;
pub mod file_ops;
pub mod projector;
pub mod reinstall;

use detection::DetectedType;
use projector::CopyPlan;

/// A source made available on disk
#[derive(Debug)]
pub enum Fetched {
    Local { path: PathBuf },
    /// Temporary clone, removed when dropped
    Cloned(CloneResult),
}

impl Fetched {
    pub fn path(&self) -> &Path {
        match self {
            Fetched::Local { path } => path,
            Fetched::Cloned(clone) => clone.path(),
        }
    }

    /// Commit of a cloned source; `None` for local directories
    pub fn commit(&self) -> Option<&str> {
        match self {
            Fetched::Local { .. } => None,
            Fetched::Cloned(clone) => Some(&clone.commit),
        }
    }
}

/// Validate a local source directory
pub fn check_local_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(SkillsetError::SourceNotFound {
            path: path.display().to_string(),
        });
    }
    if !path.is_dir() {
        return Err(SkillsetError::SourceNotADirectory {
            path: path.display().to_string(),
        });
    }
    Ok(())
}

/// Make `source` available on disk. Local paths never touch git.
pub async fn fetch<R: GitRunner>(runner: &R, source: &Source) -> Result<Fetched> {
    match source {
        Source::Local { path } => {
            check_local_dir(path)?;
            Ok(Fetched::Local { path: path.clone() })
        }
        Source::Git(git_source) => {
            let clone = git::clone(runner, &git_source.url, git_source.git_ref.as_deref()).await?;
            Ok(Fetched::Cloned(clone))
        }
    }
}

/// Directory name a bare skill installed under `key` is copied to.
///
/// Fails when the last component would escape the skills directory.
pub fn package_name(key: &str) -> Result<&str> {
    let name = key
        .trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    if name.is_empty() || name == "." || name == ".." {
        return Err(SkillsetError::InvalidSource {
            input: key.to_string(),
            reason: "cannot derive a package name from this source".to_string(),
        });
    }
    Ok(name)
}

/// Pick the agents a package is installed for.
///
/// An explicit request is filtered to the agents the package declares
/// (undeclared ones are skipped with a warning). Without one, declared
/// agents that are detected in the project are used, in declaration order.
pub fn choose_agents(
    key: &str,
    declared: &[String],
    requested: &[String],
    detected: &[String],
) -> Result<Vec<String>> {
    let chosen: Vec<String> = if requested.is_empty() {
        declared
            .iter()
            .filter(|agent| detected.contains(agent))
            .cloned()
            .collect()
    } else {
        requested
            .iter()
            .filter(|agent| {
                let ok = declared.contains(agent);
                if !ok {
                    tracing::warn!("{key} does not support agent '{agent}'; skipping it");
                }
                ok
            })
            .cloned()
            .collect()
    };

    if chosen.is_empty() {
        return Err(SkillsetError::NoAgents {
            key: key.to_string(),
        });
    }
    Ok(chosen)
}

/// Everything needed to copy one package
#[derive(Debug, Clone)]
pub struct PackagePlan {
    pub key: String,
    pub dir: PathBuf,
    pub detected: DetectedType,
    pub agents: Vec<String>,
    /// `description` from the package config
    pub description: Option<String>,
    pub copies: CopyPlan,
    /// Deduplicated destinations of `copies`
    pub incoming: Vec<String>,
}

/// Plan one configured package rooted at `dir`
pub fn plan_package(
    dir: &Path,
    key: &str,
    requested: &[String],
    detected_agents: &[String],
    registry: &AgentRegistry,
) -> Result<PackagePlan> {
    let config = read_source_config(dir, registry)?.ok_or_else(|| SkillsetError::NotConfigured {
        path: dir.display().to_string(),
    })?;
    let agents = choose_agents(key, &config.agents, requested, detected_agents)?;

    let detected = detection::classify(dir, true);
    if !detected.is_installable() {
        return Err(SkillsetError::NotAPackage {
            path: dir.display().to_string(),
        });
    }

    let copies = projector::plan(dir, &detected, package_name(key)?, &agents, registry)?;
    let incoming = projector::incoming_files(&copies);
    Ok(PackagePlan {
        key: key.to_string(),
        dir: dir.to_path_buf(),
        detected,
        agents,
        description: config.description,
        copies,
        incoming,
    })
}

/// Plan every package in a fetched source.
///
/// A configured root is a single package keyed `base_key`. An unconfigured
/// root that holds configured children is a collection: each member becomes
/// a package keyed `<base_key>/<member>`. All members are planned before any
/// is installed.
pub fn plan_packages(
    root: &Path,
    base_key: &str,
    requested: &[String],
    detected_agents: &[String],
    registry: &AgentRegistry,
) -> Result<Vec<PackagePlan>> {
    if has_config(root) {
        return Ok(vec![plan_package(
            root,
            base_key,
            requested,
            detected_agents,
            registry,
        )?]);
    }

    match detection::classify(root, false) {
        DetectedType::Collection { members } => {
            tracing::info!("{base_key} is a collection of {} packages", members.len());
            members
                .iter()
                .map(|member| {
                    plan_package(
                        &root.join(member),
                        &member_key(base_key, member),
                        requested,
                        detected_agents,
                        registry,
                    )
                })
                .collect()
        }
        _ => Err(SkillsetError::NotConfigured {
            path: root.display().to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CONFIG_FILE;
    use crate::git::testing::{MockGit, Reply};
    use std::fs;
    use tempfile::TempDir;

    fn ids(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_package_name() {
        assert_eq!(package_name("acme/lint").unwrap(), "lint");
        assert_eq!(package_name("acme/tools/format").unwrap(), "format");
        assert_eq!(package_name("/home/me/skills/review/").unwrap(), "review");
        assert_eq!(package_name("solo").unwrap(), "solo");
    }

    #[test]
    fn test_package_name_rejects_relative_components() {
        for key in ["/home/me/skills/..", "/home/me/skills/./", ".", "", "/"] {
            assert!(
                matches!(package_name(key), Err(SkillsetError::InvalidSource { .. })),
                "{key:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_choose_agents_intersects_declared_and_detected() {
        let chosen = choose_agents(
            "acme/lint",
            &ids(&["cursor", "claude", "gemini"]),
            &[],
            &ids(&["claude", "cursor"]),
        )
        .unwrap();
        assert_eq!(chosen, vec!["cursor", "claude"]);
    }

    #[test]
    fn test_choose_agents_explicit_must_be_declared() {
        let chosen = choose_agents(
            "acme/lint",
            &ids(&["claude"]),
            &ids(&["claude", "cursor"]),
            &[],
        )
        .unwrap();
        assert_eq!(chosen, vec!["claude"]);

        let err = choose_agents("acme/lint", &ids(&["claude"]), &ids(&["cursor"]), &[]).unwrap_err();
        assert!(matches!(err, SkillsetError::NoAgents { .. }));
    }

    #[test]
    fn test_check_local_dir_distinguishes_missing_and_file() {
        let temp = TempDir::new_in(crate::temp::temp_dir_base()).unwrap();
        fs::write(temp.path().join("file"), "x").unwrap();

        assert!(matches!(
            check_local_dir(&temp.path().join("missing")).unwrap_err(),
            SkillsetError::SourceNotFound { .. }
        ));
        assert!(matches!(
            check_local_dir(&temp.path().join("file")).unwrap_err(),
            SkillsetError::SourceNotADirectory { .. }
        ));
        assert!(check_local_dir(temp.path()).is_ok());
    }

    #[tokio::test]
    async fn test_fetch_local_never_calls_git() {
        let temp = TempDir::new_in(crate::temp::temp_dir_base()).unwrap();
        let git = MockGit::new(vec![Reply::Fail("should not run".to_string())]);

        let fetched = fetch(
            &git,
            &Source::Local {
                path: temp.path().to_path_buf(),
            },
        )
        .await
        .unwrap();

        assert_eq!(fetched.path(), temp.path());
        assert_eq!(fetched.commit(), None);
        assert_eq!(git.call_count(), 0);
    }

    #[test]
    fn test_plan_single_bare_skill() {
        let temp = TempDir::new_in(crate::temp::temp_dir_base()).unwrap();
        write(temp.path(), CONFIG_FILE, r#"{"agents":["claude","cursor"]}"#);
        write(temp.path(), "SKILL.md", "# lint");

        let plans = plan_packages(
            temp.path(),
            "acme/lint",
            &[],
            &ids(&["claude"]),
            &AgentRegistry::builtin(),
        )
        .unwrap();

        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].key, "acme/lint");
        assert_eq!(plans[0].agents, vec!["claude"]);
        assert_eq!(plans[0].incoming, vec![".claude/skills/lint/"]);
    }

    #[test]
    fn test_plan_collection_members() {
        let temp = TempDir::new_in(crate::temp::temp_dir_base()).unwrap();
        write(temp.path(), &format!("format/{CONFIG_FILE}"), r#"{"agents":["claude"]}"#);
        write(temp.path(), "format/SKILL.md", "# format");
        write(temp.path(), &format!("review/{CONFIG_FILE}"), r#"{"agents":["claude"]}"#);
        write(temp.path(), "review/agents/reviewer.md", "# reviewer");

        let plans = plan_packages(
            temp.path(),
            "acme/tools",
            &[],
            &ids(&["claude"]),
            &AgentRegistry::builtin(),
        )
        .unwrap();

        let keys: Vec<_> = plans.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["acme/tools/format", "acme/tools/review"]);
        assert_eq!(plans[0].incoming, vec![".claude/skills/format/"]);
        assert_eq!(plans[1].incoming, vec![".claude/agents/reviewer.md"]);
    }

    #[test]
    fn test_plan_unconfigured_source_fails() {
        let temp = TempDir::new_in(crate::temp::temp_dir_base()).unwrap();
        write(temp.path(), "SKILL.md", "# lint");

        let err = plan_packages(temp.path(), "acme/lint", &[], &ids(&["claude"]), &AgentRegistry::builtin())
            .unwrap_err();
        assert!(matches!(err, SkillsetError::NotConfigured { .. }));
    }

    #[test]
    fn test_plan_configured_non_package_fails() {
        let temp = TempDir::new_in(crate::temp::temp_dir_base()).unwrap();
        write(temp.path(), CONFIG_FILE, r#"{"agents":["claude"]}"#);
        write(temp.path(), "README.md", "nothing here");

        let err = plan_packages(temp.path(), "acme/lint", &[], &ids(&["claude"]), &AgentRegistry::builtin())
            .unwrap_err();
        assert!(matches!(err, SkillsetError::NotAPackage { .. }));
    }
}
