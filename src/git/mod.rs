//! Git operations for fetching packages and inspecting remotes
//!
//! This module handles:
//! - Running the `git` executable with a hard timeout (`SystemGit`)
//! - Shallow clones into temporary directories, with retry and backoff
//! - `ls-remote` queries for HEAD, branches and tags
//! - Classifying authentication failures from stderr
//!
//! Authentication is delegated entirely to git's native system (SSH keys,
//! credential helpers). Terminal prompts are disabled so a missing credential
//! fails fast instead of hanging until the timeout.
//!
//! Everything above this module talks to git through the `GitRunner` trait,
//! so tests can script git's behaviour and count invocations.

use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncReadExt;

use crate::error::{Result, SkillsetError};

pub mod auth;
pub mod clone;
pub mod refs;

pub use clone::{CloneResult, clone};
pub use refs::{RefQuery, ls_remote};

/// Timeout for local git commands such as `rev-parse`
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for `ls-remote` queries
pub const REMOTE_TIMEOUT: Duration = Duration::from_secs(15);

/// Timeout for a single clone attempt
pub const CLONE_TIMEOUT: Duration = Duration::from_secs(60);

/// Captured result of a finished git process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Port for executing git.
///
/// Implementations return `Ok` for any process that ran to completion,
/// successful or not, and `Err` only when the process could not be started
/// (`IoError`) or exceeded `timeout` (`GitTimeout`).
#[allow(async_fn_in_trait)]
pub trait GitRunner {
    async fn run(&self, args: &[&str], timeout: Duration) -> Result<GitOutput>;
}

/// Name of the git subcommand in `args`, skipping a leading `-C <dir>`
pub fn command_name(args: &[&str]) -> String {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if *arg == "-C" {
            iter.next();
            continue;
        }
        return (*arg).to_string();
    }
    "git".to_string()
}

/// Production runner: spawns the `git` executable via tokio.
///
/// On timeout the child is killed explicitly before the error is returned,
/// so a hung network call never outlives the operation that started it.
#[derive(Debug, Clone, Default)]
pub struct SystemGit;

impl GitRunner for SystemGit {
    async fn run(&self, args: &[&str], timeout: Duration) -> Result<GitOutput> {
        let command = command_name(args);
        tracing::debug!("git {}", args.join(" "));

        let mut child = tokio::process::Command::new("git")
            .args(args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SkillsetError::IoError {
                message: format!("Failed to run git {command}: {e}"),
            })?;

        let mut stdout_handle = child.stdout.take();
        let mut stderr_handle = child.stderr.take();

        tokio::select! {
            result = async {
                let (status, stdout, stderr) = tokio::join!(
                    child.wait(),
                    async {
                        let mut buf = Vec::new();
                        if let Some(ref mut h) = stdout_handle {
                            let _ = h.read_to_end(&mut buf).await;
                        }
                        buf
                    },
                    async {
                        let mut buf = Vec::new();
                        if let Some(ref mut h) = stderr_handle {
                            let _ = h.read_to_end(&mut buf).await;
                        }
                        buf
                    },
                );
                let status = status.map_err(|e| SkillsetError::IoError {
                    message: format!("Failed waiting for git {command}: {e}"),
                })?;
                Ok(GitOutput {
                    success: status.success(),
                    stdout: String::from_utf8_lossy(&stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&stderr).into_owned(),
                })
            } => result,
            () = tokio::time::sleep(timeout) => {
                let _ = child.kill().await;
                Err(SkillsetError::GitTimeout {
                    command: command.clone(),
                    seconds: timeout.as_secs(),
                })
            }
        }
    }
}
