//! List command implementation
//!
//! This command lists all installed packages with their ref or commit,
//! agents and file counts.

use std::path::PathBuf;

use console::Style;

use crate::cli::ListArgs;
use crate::commands::helpers::{resolve_project_path, version_label};
use crate::error::Result;
use crate::manifest::{self, Manifest, ManifestEntry};

/// Run list command
pub fn run(project: Option<PathBuf>, args: ListArgs) -> Result<()> {
    let project_dir = resolve_project_path(project)?;
    let manifest = manifest::read(&project_dir)?;
    list_packages(&manifest, args.files);
    Ok(())
}

fn list_packages(manifest: &Manifest, show_files: bool) {
    if manifest.is_empty() {
        println!("No packages installed.");
        return;
    }

    println!("Installed packages ({}):", manifest.len());
    println!();

    for (key, entry) in manifest.iter() {
        display_entry(key, entry, show_files);
        println!();
    }
}

fn display_entry(key: &str, entry: &ManifestEntry, show_files: bool) {
    let bold = Style::new().bold();

    println!("  {}", Style::new().bold().yellow().apply_to(key));
    println!("    {} {}", bold.apply_to("Version:"), version_label(entry));
    if let Some(url) = &entry.clone_url {
        println!("    {} {url}", bold.apply_to("Source:"));
    }
    println!("    {} {}", bold.apply_to("Agents:"), entry.agents.join(", "));
    println!(
        "    {} {}",
        bold.apply_to("Installed:"),
        entry.installed_at.format("%Y-%m-%d %H:%M UTC")
    );
    println!("    {} {}", bold.apply_to("Files:"), entry.files.len());

    if show_files {
        for file in &entry.files {
            println!("      {}", Style::new().dim().apply_to(file));
        }
    }
}
