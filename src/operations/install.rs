//! Install operation module
//!
//! Runs the full install workflow for one source:
//! fetch → plan every package → collision check → copy → manifest write.
//! Nothing is copied until every package of the source has been planned and
//! checked. The clone, if any, is removed when the operation returns.

use std::path::Path;

use crate::agent::AgentRegistry;
use crate::error::{Result, SkillsetError};
use crate::git::GitRunner;
use crate::installer::collision::CollisionReport;
use crate::installer::copy::{self, CategoryCounts};
use crate::installer::detection::DetectedType;
use crate::installer::file_ops::remove_owned_paths;
use crate::installer::{self, PackagePlan};
use crate::manifest::{self, Manifest, ManifestEntry};
use crate::source::Source;

/// Configuration options for installation
#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    /// Agents requested explicitly; empty means "declared and detected"
    pub agents: Vec<String>,
    /// Overwrite colliding paths instead of aborting
    pub force: bool,
}

/// One package written by an install
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPackage {
    pub key: String,
    pub agents: Vec<String>,
    pub files: usize,
    pub description: Option<String>,
    /// Per-agent category counts, for plugins
    pub counts: Option<CategoryCounts>,
    /// Whether an earlier install of the same key was replaced
    pub replaced: bool,
}

/// High-level install operation
pub struct InstallOperation<'a, R> {
    project_dir: &'a Path,
    runner: &'a R,
    registry: &'a AgentRegistry,
    options: InstallOptions,
}

impl<'a, R: GitRunner> InstallOperation<'a, R> {
    pub fn new(
        project_dir: &'a Path,
        runner: &'a R,
        registry: &'a AgentRegistry,
        options: InstallOptions,
    ) -> Self {
        Self {
            project_dir,
            runner,
            registry,
            options,
        }
    }

    /// Install every package found in `source`
    pub async fn execute(&self, source: &Source) -> Result<Vec<InstalledPackage>> {
        for agent in &self.options.agents {
            if !self.registry.contains(agent) {
                return Err(SkillsetError::UnknownAgent {
                    agent: agent.clone(),
                });
            }
        }

        let base_key = source.key()?;
        let fetched = installer::fetch(self.runner, source).await?;

        let detected_agents = if self.options.agents.is_empty() {
            self.registry.detect_agents(self.project_dir).await
        } else {
            Vec::new()
        };
        tracing::debug!("Detected agents: {detected_agents:?}");

        let plans = installer::plan_packages(
            fetched.path(),
            &base_key,
            &self.options.agents,
            &detected_agents,
            self.registry,
        )?;

        let mut manifest = manifest::read(self.project_dir)?;
        self.check_collisions(&manifest, &plans)?;

        let (git_ref, clone_url) = match source {
            Source::Local { .. } => (None, None),
            Source::Git(git) => (git.git_ref.clone(), git.stored_clone_url()),
        };
        let commit = fetched.commit().map(str::to_string);

        let mut installed = Vec::with_capacity(plans.len());
        for plan in &plans {
            let (next, package) = self.apply(
                manifest,
                plan,
                git_ref.as_deref(),
                commit.as_deref(),
                clone_url.as_deref(),
            )?;
            manifest = next;
            installed.push(package);
        }
        Ok(installed)
    }

    /// Collision check across all planned packages.
    ///
    /// Each package is checked against the manifest as it would look with
    /// the earlier packages of the same batch already installed, so members
    /// of one collection that collide with each other are caught too.
    fn check_collisions(&self, manifest: &Manifest, plans: &[PackagePlan]) -> Result<()> {
        let mut report = CollisionReport::default();
        let mut provisional = manifest.clone();
        for plan in plans {
            report.merge(CollisionReport::analyze(
                &provisional,
                &plan.incoming,
                Some(&plan.key),
                self.project_dir,
            ));
            provisional = provisional.with_entry(
                plan.key.clone(),
                ManifestEntry::new(None, None, plan.agents.clone(), plan.incoming.clone(), None),
            );
        }

        if report.is_clean() {
            return Ok(());
        }
        for (owner, paths) in &report.owned {
            for path in paths {
                tracing::warn!("{path} is owned by {owner}");
            }
        }
        for path in &report.unmanaged {
            tracing::warn!("{path} exists and is not managed by skillset");
        }
        if self.options.force {
            tracing::info!("Overwriting colliding paths (--force)");
            return Ok(());
        }
        Err(SkillsetError::CollisionDetected {
            owned: report.owned_count(),
            unmanaged: report.unmanaged.len(),
        })
    }

    /// Copy one package and record it. The manifest is written after every
    /// package so earlier members stay recorded if a later one fails.
    fn apply(
        &self,
        manifest: Manifest,
        plan: &PackagePlan,
        git_ref: Option<&str>,
        commit: Option<&str>,
        clone_url: Option<&str>,
    ) -> Result<(Manifest, InstalledPackage)> {
        let mut manifest = manifest.release_paths(&plan.incoming, &plan.key);

        let previous = manifest.get(&plan.key).cloned();
        if let Some(previous) = &previous {
            tracing::info!("Replacing installed {}", plan.key);
            remove_owned_paths(self.project_dir, &previous.files, &self.registry.target_dirs());
        }

        let copied = match &plan.detected {
            DetectedType::BareSkill => {
                copy::copy_bare_skill(self.project_dir, &plan.copies).map(|files| (files, None))
            }
            _ => copy::copy_plugin(self.project_dir, &plan.copies)
                .map(|result| (result.files, Some(result.counts))),
        };

        let (files, counts) = match copied {
            Ok(copied) => copied,
            Err(e) => {
                if previous.is_some() {
                    manifest = manifest.without_entry(&plan.key);
                    manifest::write(self.project_dir, &manifest)?;
                }
                return Err(e);
            }
        };

        let entry = ManifestEntry::new(
            git_ref.map(str::to_string),
            commit.map(str::to_string),
            plan.agents.clone(),
            files,
            clone_url.map(str::to_string),
        );
        let package = InstalledPackage {
            key: plan.key.clone(),
            agents: entry.agents.clone(),
            files: entry.files.len(),
            description: plan.description.clone(),
            counts,
            replaced: previous.is_some(),
        };
        manifest = manifest.with_entry(plan.key.clone(), entry);
        manifest::write(self.project_dir, &manifest)?;

        Ok((manifest, package))
    }
}
