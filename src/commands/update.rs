//! Update command implementation
//!
//! Runs `UpdateOperation` and reports every entry's outcome. Entries that
//! were skipped (no config, no agents, wrong type) are reported but do not
//! fail the command; clone errors and failed copies do.

use std::path::PathBuf;

use console::Style;

use crate::agent::AgentRegistry;
use crate::cli::UpdateArgs;
use crate::commands::helpers::{resolve_project_path, version_label};
use crate::error::{Result, SkillsetError};
use crate::git::SystemGit;
use crate::installer::reinstall::ReinstallOutcome;
use crate::operations::{UpdateOperation, UpdateOptions, UpdateResult};
use crate::progress::ProgressDisplay;

/// Run update command
pub async fn run(project: Option<PathBuf>, args: UpdateArgs) -> Result<()> {
    let project_dir = resolve_project_path(project)?;
    let registry = AgentRegistry::builtin();
    let options = UpdateOptions {
        keys: args.keys,
        git_ref: args.git_ref,
        force: args.force,
    };

    let progress = ProgressDisplay::spinner("Updating packages");
    let results = UpdateOperation::new(&project_dir, &SystemGit, &registry, options)
        .execute()
        .await;
    progress.finish();
    let results = results?;

    if results.is_empty() {
        println!("No packages installed.");
        return Ok(());
    }

    let mut failed = 0;
    for result in &results {
        if is_failure(result) {
            failed += 1;
        }
        let (label, style) = label(result);
        println!("{} {}", style.apply_to(label), describe(result));
        if !result.dropped_agents.is_empty() {
            println!("    no longer installed for: {}", result.dropped_agents.join(", "));
        }
        if let Ok(ReinstallOutcome::CopyFailed { recovery, .. }) = &result.outcome {
            println!("    {recovery}");
        }
    }

    if failed > 0 {
        return Err(SkillsetError::UpdateIncomplete { failed });
    }
    Ok(())
}

fn is_failure(result: &UpdateResult) -> bool {
    matches!(
        result.outcome,
        Err(_) | Ok(ReinstallOutcome::CopyFailed { .. })
    )
}

fn label(result: &UpdateResult) -> (&'static str, Style) {
    match &result.outcome {
        Ok(ReinstallOutcome::Success { .. }) => ("Updated", Style::new().bold().green()),
        Ok(ReinstallOutcome::CopyFailed { .. }) | Err(_) => ("Failed", Style::new().bold().red()),
        Ok(_) => ("Skipped", Style::new().bold().yellow()),
    }
}

fn describe(result: &UpdateResult) -> String {
    let key = &result.key;
    match &result.outcome {
        Ok(ReinstallOutcome::Success { entry }) => {
            format!("{key} to {} ({} files)", version_label(entry), entry.files.len())
        }
        Ok(ReinstallOutcome::NoConfig) => format!("{key}: source no longer has a skillset.json"),
        Ok(ReinstallOutcome::NoAgents) => format!("{key}: none of its agents are still declared"),
        Ok(ReinstallOutcome::InvalidType { detected }) => {
            format!("{key}: source is now a {detected}")
        }
        Ok(ReinstallOutcome::CopyFailed { message, .. }) => format!("{key}: {message}"),
        Err(e) => format!("{key}: {e}"),
    }
}
