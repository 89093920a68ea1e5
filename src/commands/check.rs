//! Check command implementation
//!
//! Queries every installed entry's remote concurrently and prints one status
//! per key. A failed check is reported for that key only.

use std::path::PathBuf;

use console::Style;

use crate::commands::helpers::resolve_project_path;
use crate::error::Result;
use crate::git::SystemGit;
use crate::manifest;
use crate::progress::ProgressDisplay;
use crate::update::{self, UpdateStatus};

/// Run check command
pub async fn run(project: Option<PathBuf>) -> Result<()> {
    let project_dir = resolve_project_path(project)?;
    let manifest = manifest::read(&project_dir)?;

    if manifest.is_empty() {
        println!("No packages installed.");
        return Ok(());
    }

    let progress = ProgressDisplay::spinner(format!("Checking {} package(s)", manifest.len()));
    let statuses = update::check_all(&SystemGit, &manifest).await;
    progress.finish();

    for (key, status) in &statuses {
        println!(
            "{} {}",
            Style::new().bold().apply_to(key),
            status_style(status).apply_to(status)
        );
    }
    Ok(())
}

fn status_style(status: &UpdateStatus) -> Style {
    match status {
        UpdateStatus::Local => Style::new().dim(),
        UpdateStatus::UpToDate => Style::new().green(),
        UpdateStatus::UpdateAvailable { .. } | UpdateStatus::NewerTags { .. } => Style::new().yellow(),
        UpdateStatus::CheckFailed { .. } => Style::new().red(),
    }
}
