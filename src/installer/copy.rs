//! Transactional copier
//!
//! Executes a `CopyPlan` inside a `Transaction`. Copies are strictly
//! sequential. On any failure everything written so far is rolled back and
//! the error that caused the failure is returned unchanged.

use std::collections::BTreeMap;
use std::path::Path;

use crate::agent::AssetCategory;
use crate::config::CONFIG_FILE;
use crate::error::Result;
use crate::transaction::Transaction;

use super::projector::PlannedCopy;

/// Entries never copied out of a bare skill directory
const BARE_SKILL_EXCLUDES: &[&str] = &[".git", CONFIG_FILE];

/// Entries never copied out of a plugin asset directory
const PLUGIN_EXCLUDES: &[&str] = &[".git"];

/// Per-agent, per-category number of copied entries
pub type CategoryCounts = BTreeMap<String, BTreeMap<AssetCategory, usize>>;

/// Result of a plugin copy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginCopy {
    /// Every path written, in order
    pub files: Vec<String>,
    pub counts: CategoryCounts,
}

/// Copy a bare skill directory once per planned agent target.
///
/// Returns every written path.
pub fn copy_bare_skill(project_dir: &Path, plan: &[PlannedCopy]) -> Result<Vec<String>> {
    let mut transaction = Transaction::new(project_dir);
    run(&mut transaction, plan, BARE_SKILL_EXCLUDES, |_| {})?;
    Ok(transaction.commit())
}

/// Copy every plugin asset entry in the plan.
///
/// Entries whose destination was already written for another agent (shared
/// target directories) are not copied again but still counted for that agent.
pub fn copy_plugin(project_dir: &Path, plan: &[PlannedCopy]) -> Result<PluginCopy> {
    let mut transaction = Transaction::new(project_dir);
    let mut counts = CategoryCounts::new();

    run(&mut transaction, plan, PLUGIN_EXCLUDES, |copy| {
        if let Some(category) = copy.category {
            *counts
                .entry(copy.agent.clone())
                .or_default()
                .entry(category)
                .or_default() += 1;
        }
    })?;

    Ok(PluginCopy {
        files: transaction.commit(),
        counts,
    })
}

fn run(
    transaction: &mut Transaction,
    plan: &[PlannedCopy],
    exclude: &[&str],
    mut on_copied: impl FnMut(&PlannedCopy),
) -> Result<()> {
    for copy in plan {
        if !transaction.contains(&copy.dest) {
            let copied = if copy.is_dir {
                transaction.copy_dir(&copy.source, &copy.dest, exclude)
            } else {
                transaction.copy_file(&copy.source, &copy.dest)
            };
            if let Err(e) = copied {
                tracing::debug!("Copy to {} failed: {e}", copy.dest);
                transaction.rollback();
                return Err(e);
            }
        }
        on_copied(copy);
    }
    Ok(())
}
