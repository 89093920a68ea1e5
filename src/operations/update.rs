//! Update operation module
//!
//! Re-fetches installed entries and reinstalls them through the reinstall
//! orchestrator. Git entries are cloned again at the effective ref, local
//! entries are re-copied from their directory. The manifest is written after
//! every entry:
//! - success replaces the entry and takes its paths from any other owner
//! - a copy failure removes it (its old files are already gone)
//! - any other outcome leaves it untouched

use std::path::Path;

use crate::agent::AgentRegistry;
use crate::error::{Result, SkillsetError};
use crate::git::{self, GitRunner};
use crate::installer::check_local_dir;
use crate::installer::reinstall::{ReinstallOutcome, ReinstallRequest, reinstall};
use crate::manifest::{self, Manifest, ManifestEntry};
use crate::source::InstalledSource;

/// Configuration options for updates
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    /// Keys to update; empty means every installed entry
    pub keys: Vec<String>,
    /// Ref to switch to instead of the stored one
    pub git_ref: Option<String>,
    /// Overwrite colliding paths instead of failing
    pub force: bool,
}

/// Result of updating one entry
#[derive(Debug)]
pub struct UpdateResult {
    pub key: String,
    /// Agents no longer declared by the source
    pub dropped_agents: Vec<String>,
    pub outcome: Result<ReinstallOutcome>,
}

/// High-level update operation
pub struct UpdateOperation<'a, R> {
    project_dir: &'a Path,
    runner: &'a R,
    registry: &'a AgentRegistry,
    options: UpdateOptions,
}

impl<'a, R: GitRunner> UpdateOperation<'a, R> {
    pub fn new(
        project_dir: &'a Path,
        runner: &'a R,
        registry: &'a AgentRegistry,
        options: UpdateOptions,
    ) -> Self {
        Self {
            project_dir,
            runner,
            registry,
            options,
        }
    }

    /// Update the selected entries one after another.
    ///
    /// Fails up front only when the manifest cannot be read or a requested
    /// key is not installed; per-entry failures are reported in the results.
    pub async fn execute(&self) -> Result<Vec<UpdateResult>> {
        let mut manifest = manifest::read(self.project_dir)?;

        let keys: Vec<String> = if self.options.keys.is_empty() {
            manifest.keys().cloned().collect()
        } else {
            for key in &self.options.keys {
                if !manifest.contains(key) {
                    return Err(SkillsetError::EntryNotFound { key: key.clone() });
                }
            }
            self.options.keys.clone()
        };

        let mut results = Vec::with_capacity(keys.len());
        for key in keys {
            let Some(previous) = manifest.get(&key).cloned() else {
                continue;
            };
            let mut dropped_agents = Vec::new();
            let outcome = self
                .update_entry(&manifest, &key, &previous, &mut dropped_agents)
                .await;

            if let Ok(outcome) = &outcome {
                manifest = match outcome {
                    ReinstallOutcome::Success { entry } => manifest
                        .release_paths(&entry.files, &key)
                        .with_entry(key.clone(), entry.clone()),
                    ReinstallOutcome::CopyFailed { .. } => manifest.without_entry(&key),
                    _ => manifest,
                };
                manifest::write(self.project_dir, &manifest)?;
            }

            results.push(UpdateResult {
                key,
                dropped_agents,
                outcome,
            });
        }
        Ok(results)
    }

    async fn update_entry(
        &self,
        manifest: &Manifest,
        key: &str,
        previous: &ManifestEntry,
        dropped_agents: &mut Vec<String>,
    ) -> Result<ReinstallOutcome> {
        let origin = InstalledSource::locate(key, previous.clone_url.as_deref(), previous.is_local())?;
        let git_ref = self
            .options
            .git_ref
            .as_deref()
            .or(previous.git_ref.as_deref());
        let install_source = origin.install_hint(git_ref);

        let mut on_dropped = |dropped: &[String]| {
            tracing::warn!("{key} no longer supports {}", dropped.join(", "));
            dropped_agents.extend_from_slice(dropped);
        };

        match &origin {
            InstalledSource::Local { path } => {
                check_local_dir(path)?;
                let request = ReinstallRequest {
                    project_dir: self.project_dir,
                    key,
                    previous,
                    source_dir: path,
                    ref_override: None,
                    commit: None,
                    install_source: &install_source,
                    force: self.options.force,
                };
                reinstall(&request, manifest, self.registry, &mut on_dropped)
            }
            InstalledSource::Git { url, member } => {
                let clone = git::clone(self.runner, url, git_ref).await?;
                let source_dir = match member {
                    Some(member) => clone.path().join(member),
                    None => clone.path().to_path_buf(),
                };
                if !source_dir.is_dir() {
                    return Ok(ReinstallOutcome::NoConfig);
                }
                let request = ReinstallRequest {
                    project_dir: self.project_dir,
                    key,
                    previous,
                    source_dir: &source_dir,
                    ref_override: self.options.git_ref.as_deref(),
                    commit: Some(&clone.commit),
                    install_source: &install_source,
                    force: self.options.force,
                };
                reinstall(&request, manifest, self.registry, &mut on_dropped)
            }
        }
    }
}
