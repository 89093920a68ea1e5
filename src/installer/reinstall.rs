//! Reinstall orchestration for updates
//!
//! Given a freshly fetched source for an installed entry, re-reads its
//! config, narrows the agents to those still declared, re-classifies it,
//! removes the entry's old files and copies the new ones.
//!
//! Outcomes that stop early (`NoConfig`, `NoAgents`, `InvalidType`) never
//! touch the project. Once old files are removed a copy failure leaves the
//! package uninstalled, reported as `CopyFailed` with a recovery hint.

use std::path::Path;

use crate::agent::AgentRegistry;
use crate::config::read_source_config;
use crate::error::{Result, SkillsetError};
use crate::manifest::{Manifest, ManifestEntry};

use super::collision::CollisionReport;
use super::copy;
use super::detection::{self, DetectedType};
use super::file_ops::remove_owned_paths;
use super::package_name;
use super::projector;

/// Result of reinstalling one entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReinstallOutcome {
    /// Replacement entry to store under the same key
    Success { entry: ManifestEntry },
    /// The source no longer has a config file
    NoConfig,
    /// None of the previously installed agents are still declared
    NoAgents,
    /// The source is no longer a bare skill or plugin
    InvalidType { detected: DetectedType },
    /// Old files were removed but the new copy failed and was rolled back
    CopyFailed { message: String, recovery: String },
}

/// Inputs for one reinstall
#[derive(Debug, Clone, Copy)]
pub struct ReinstallRequest<'a> {
    pub project_dir: &'a Path,
    pub key: &'a str,
    pub previous: &'a ManifestEntry,
    /// Fetched source root for this entry
    pub source_dir: &'a Path,
    /// Ref requested for this update, overriding the stored one
    pub ref_override: Option<&'a str>,
    /// Commit of the fetched source; `None` for local sources
    pub commit: Option<&'a str>,
    /// Source string that reinstalls this package from scratch
    pub install_source: &'a str,
    /// Overwrite paths owned by other entries or unmanaged files
    pub force: bool,
}

/// Previously installed agents split into those still declared and those dropped
fn partition_agents(previous: &[String], declared: &[String]) -> (Vec<String>, Vec<String>) {
    previous
        .iter()
        .cloned()
        .partition(|agent| declared.contains(agent))
}

/// Reinstall one entry.
///
/// `on_dropped` is called with agents that were installed before but are no
/// longer declared by the source. Config and planning errors are returned as
/// `Err` before anything on disk changes, as are collisions with other
/// entries or unmanaged files unless `force` is set.
pub fn reinstall(
    request: &ReinstallRequest<'_>,
    manifest: &Manifest,
    registry: &AgentRegistry,
    mut on_dropped: impl FnMut(&[String]),
) -> Result<ReinstallOutcome> {
    let ReinstallRequest {
        project_dir,
        key,
        previous,
        source_dir,
        ..
    } = *request;

    let git_ref = request
        .ref_override
        .map(str::to_string)
        .or_else(|| previous.git_ref.clone());
    let commit = request.commit.map(str::to_string);

    let Some(config) = read_source_config(source_dir, registry)? else {
        return Ok(ReinstallOutcome::NoConfig);
    };

    let (agents, dropped) = partition_agents(&previous.agents, &config.agents);
    if !dropped.is_empty() {
        on_dropped(&dropped);
    }
    if agents.is_empty() {
        return Ok(ReinstallOutcome::NoAgents);
    }

    let detected = detection::classify(source_dir, true);
    if !detected.is_installable() {
        return Ok(ReinstallOutcome::InvalidType { detected });
    }

    let plan = projector::plan(source_dir, &detected, package_name(key)?, &agents, registry)?;
    let incoming = projector::incoming_files(&plan);

    let report = CollisionReport::analyze(manifest, &incoming, Some(key), project_dir);
    if !report.is_clean() && !request.force {
        return Err(SkillsetError::CollisionDetected {
            owned: report.owned_count(),
            unmanaged: report.unmanaged.len(),
        });
    }

    let removed = remove_owned_paths(project_dir, &previous.files, &registry.target_dirs());
    tracing::debug!("Removed {} old paths of {key}", removed.len());

    let copied = match &detected {
        DetectedType::BareSkill => copy::copy_bare_skill(project_dir, &plan),
        _ => copy::copy_plugin(project_dir, &plan).map(|result| result.files),
    };

    match copied {
        Ok(files) => Ok(ReinstallOutcome::Success {
            entry: ManifestEntry::new(git_ref, commit, agents, files, previous.clone_url.clone()),
        }),
        Err(e) => Ok(ReinstallOutcome::CopyFailed {
            message: e.to_string(),
            recovery: format!(
                "{key} is no longer installed; run `skillset install {}` to restore it (update cannot recover it)",
                request.install_source
            ),
        }),
    }
}
