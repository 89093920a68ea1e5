//! CLI definitions using clap derive API

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// skillset - install agent skills from git
///
/// Install skills, agent definitions and hooks from git repositories or local
/// directories into a project, for every coding agent that uses them.
#[derive(Parser, Debug)]
#[command(
    name = "skillset",
    author,
    version,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Install and update agent skills, agents and hooks from git",
    long_about = "skillset installs skill bundles, agent definitions and hooks from git repositories \
                  or local directories into the agent directories of a project (.claude/, .cursor/, ...), \
                  and records every file it writes so updates and removals touch exactly those files.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n    \
                  skillset install acme/skills\n    \
                  skillset install acme/skills#v1.2.0 --agent claude\n    \
                  skillset install ./my-skill\n    \
                  skillset check\n    \
                  skillset update\n    \
                  skillset uninstall acme/skills"
)]
pub struct Cli {
    /// Project directory (defaults to current directory)
    #[arg(long, short = 'p', global = true, env = "SKILLSET_PROJECT")]
    pub project: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print errors
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install packages from a git repository or local directory
    Install(InstallArgs),

    /// Re-fetch and reinstall installed packages
    Update(UpdateArgs),

    /// Check installed packages for newer commits or tags
    Check,

    /// Remove an installed package
    Uninstall(UninstallArgs),

    /// List installed packages
    List(ListArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the install command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                   Install from GitHub:\n    skillset install acme/skills\n\n\
                   Install a tag or branch:\n    skillset install acme/skills#v1.2.0\n\n\
                   Install from any git host:\n    skillset install https://gitlab.com/group/skills.git\n\n\
                   Install from a local directory:\n    skillset install ./my-skill\n\n\
                   Install for specific agents:\n    skillset install acme/skills --agent claude --agent cursor\n\n\
                   Overwrite colliding files:\n    skillset install acme/skills --force")]
pub struct InstallArgs {
    /// Package source (owner/repo[#ref], git URL, or local path)
    pub source: String,

    /// Install only for these agents (must be declared by the package)
    #[arg(long = "agent", short = 'a', value_name = "AGENT")]
    pub agents: Vec<String>,

    /// Overwrite files owned by other packages or not managed by skillset
    #[arg(long, short = 'f')]
    pub force: bool,
}

/// Arguments for the update command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Update everything:\n    skillset update\n\n\
                  Update one package:\n    skillset update acme/skills\n\n\
                  Move a package to another tag:\n    skillset update acme/skills --ref v2.0.0")]
pub struct UpdateArgs {
    /// Installed package keys (all packages when omitted)
    pub keys: Vec<String>,

    /// Branch or tag to update to instead of the installed one
    #[arg(long = "ref", value_name = "REF")]
    pub git_ref: Option<String>,

    /// Overwrite files owned by other packages or not managed by skillset
    #[arg(long, short = 'f')]
    pub force: bool,
}

/// Arguments for the uninstall command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Uninstall a package:\n    skillset uninstall acme/skills\n\n\
                  Uninstall a collection member:\n    skillset uninstall acme/skills/review")]
pub struct UninstallArgs {
    /// Installed package key
    pub key: String,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  List installed packages:\n    skillset list\n\n\
                  Include every installed path:\n    skillset list --files")]
pub struct ListArgs {
    /// Show every installed path
    #[arg(long)]
    pub files: bool,
}

/// Arguments for the completions command
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
