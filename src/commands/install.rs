//! Install command implementation
//!
//! Parses the source, runs `InstallOperation` behind a spinner and prints one
//! summary per installed package. Plugins also list what each agent received.

use std::path::PathBuf;

use console::Style;

use crate::agent::AgentRegistry;
use crate::cli::InstallArgs;
use crate::commands::helpers::resolve_project_path;
use crate::error::Result;
use crate::git::SystemGit;
use crate::installer::copy::CategoryCounts;
use crate::operations::{InstallOperation, InstallOptions, InstalledPackage};
use crate::progress::ProgressDisplay;
use crate::source::Source;

/// Run install command
pub async fn run(project: Option<PathBuf>, args: InstallArgs) -> Result<()> {
    let project_dir = resolve_project_path(project)?;
    let source = Source::parse(&args.source)?;
    let registry = AgentRegistry::builtin();
    let options = InstallOptions {
        agents: args.agents,
        force: args.force,
    };

    let progress = ProgressDisplay::spinner(format!("Installing {}", args.source));
    let result = InstallOperation::new(&project_dir, &SystemGit, &registry, options)
        .execute(&source)
        .await;
    progress.finish();

    for package in &result? {
        let verb = if package.replaced { "Reinstalled" } else { "Installed" };
        println!("{} {}", Style::new().bold().green().apply_to(verb), summary(package));
        if let Some(description) = &package.description {
            println!("    {}", Style::new().dim().apply_to(description));
        }
        if let Some(counts) = &package.counts {
            for line in category_lines(counts) {
                println!("    {line}");
            }
        }
    }
    Ok(())
}

fn summary(package: &InstalledPackage) -> String {
    format!(
        "{} for {} ({} files)",
        package.key,
        package.agents.join(", "),
        package.files
    )
}

/// One line per agent, e.g. `claude: 2 skills, 1 agents`
fn category_lines(counts: &CategoryCounts) -> Vec<String> {
    counts
        .iter()
        .map(|(agent, categories)| {
            let parts: Vec<String> = categories
                .iter()
                .map(|(category, count)| format!("{count} {category}"))
                .collect();
            format!("{agent}: {}", parts.join(", "))
        })
        .collect()
}
