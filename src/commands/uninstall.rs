//! Uninstall command CLI wrapper
//!
//! Delegates all business logic to operations/uninstall.rs.

use std::path::PathBuf;

use console::Style;

use crate::agent::AgentRegistry;
use crate::cli::UninstallArgs;
use crate::commands::helpers::resolve_project_path;
use crate::error::Result;
use crate::operations::UninstallOperation;

/// Run uninstall command
pub fn run(project: Option<PathBuf>, args: UninstallArgs) -> Result<()> {
    let project_dir = resolve_project_path(project)?;
    let registry = AgentRegistry::builtin();

    let report = UninstallOperation::new(&project_dir, &registry).execute(&args.key)?;

    println!(
        "{} {} ({} paths removed)",
        Style::new().bold().green().apply_to("Uninstalled"),
        report.key,
        report.removed.len()
    );
    Ok(())
}
