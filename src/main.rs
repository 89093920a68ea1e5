//! skillset - install agent skills, agents and hooks from git
//!
//! A command line tool that installs skill bundles, agent definitions and
//! hooks into a project for every coding agent that uses them.

use std::process::ExitCode;

use clap::Parser;
use console::Style;
use miette::Diagnostic;
use tracing_subscriber::EnvFilter;

use skillset::cli::{Cli, Commands};
use skillset::commands;
use skillset::error::{Result, SkillsetError};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Install(args) => commands::install::run(cli.project, args).await,
        Commands::Update(args) => commands::update::run(cli.project, args).await,
        Commands::Check => commands::check::run(cli.project).await,
        Commands::Uninstall(args) => commands::uninstall::run(cli.project, args),
        Commands::List(args) => commands::list::run(cli.project, args),
        Commands::Completions(args) => commands::completions::run(args),
    }
}

/// Log to stderr. `-v` and `-q` take precedence over `RUST_LOG`.
fn init_tracing(cli: &Cli) {
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else if cli.quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,skillset=info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn report(err: &SkillsetError) {
    tracing::debug!("{err:?}");
    eprintln!("{} {err}", Style::new().for_stderr().bold().red().apply_to("error:"));
    if let Some(help) = err.help() {
        eprintln!("  {} {help}", Style::new().for_stderr().cyan().apply_to("help:"));
    }
}
