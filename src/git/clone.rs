//! Repository cloning
//!
//! This module handles:
//! - Shallow clones (`--depth 1`) of a branch, tag or the default HEAD
//! - Retrying transient failures with a fixed backoff
//! - Failing fast on authentication errors
//!
//! Each attempt clones into its own fresh temporary directory. A failed
//! attempt's directory is dropped (and removed) before the next attempt or
//! before the error is returned, so no partial clone is ever left behind.

use std::path::Path;
use std::time::Duration;

use tempfile::TempDir;

use super::{CLONE_TIMEOUT, GitRunner, auth, refs};
use crate::error::{Result, SkillsetError};
use crate::temp;

/// Maximum number of clone attempts
pub const CLONE_ATTEMPTS: u32 = 3;

/// Delay before the second and third attempt
const CLONE_BACKOFF: [Duration; 2] = [Duration::from_millis(500), Duration::from_millis(1000)];

/// A successful clone. The directory is removed when this is dropped.
#[derive(Debug)]
pub struct CloneResult {
    dir: TempDir,
    /// Commit checked out in the clone
    pub commit: String,
}

impl CloneResult {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

/// Clone `url` at `git_ref` (or the remote HEAD) into a temporary directory
pub async fn clone<R: GitRunner>(
    runner: &R,
    url: &str,
    git_ref: Option<&str>,
) -> Result<CloneResult> {
    let mut last_error = None;

    for attempt in 1..=CLONE_ATTEMPTS {
        match clone_once(runner, url, git_ref).await {
            Ok(result) => {
                tracing::debug!("Cloned {url} at {}", result.commit);
                return Ok(result);
            }
            Err(e) if !e.is_transient() => return Err(e),
            Err(e) => {
                tracing::warn!("Clone attempt {attempt}/{CLONE_ATTEMPTS} of {url} failed: {e}");
                last_error = Some(e);
                let delay = CLONE_BACKOFF
                    .get(attempt as usize - 1)
                    .filter(|_| attempt < CLONE_ATTEMPTS);
                if let Some(delay) = delay {
                    tokio::time::sleep(*delay).await;
                }
            }
        }
    }

    Err(SkillsetError::GitCloneFailed {
        url: url.to_string(),
        attempts: CLONE_ATTEMPTS,
        reason: last_error.map(|e| e.to_string()).unwrap_or_default(),
    })
}

/// Whether clone stderr says the requested branch or tag does not exist
fn is_missing_ref(stderr: &str) -> bool {
    stderr.contains("not found in upstream") || stderr.contains("Could not find remote branch")
}

async fn clone_once<R: GitRunner>(
    runner: &R,
    url: &str,
    git_ref: Option<&str>,
) -> Result<CloneResult> {
    let dir = temp::clone_dir()?;
    let target = dir.path().to_string_lossy().into_owned();

    let mut args = vec!["clone", "--depth", "1"];
    if let Some(git_ref) = git_ref {
        args.extend(["--branch", git_ref]);
    }
    args.extend([url, target.as_str()]);

    let output = runner.run(&args, CLONE_TIMEOUT).await?;
    if !output.success {
        let reason = output.stderr.trim().to_string();
        drop(dir);
        if auth::is_auth_failure(&reason) {
            return Err(SkillsetError::GitAuthFailed {
                url: url.to_string(),
                reason,
            });
        }
        if let Some(git_ref) = git_ref.filter(|_| is_missing_ref(&reason)) {
            return Err(SkillsetError::GitRefResolveFailed {
                git_ref: git_ref.to_string(),
                reason,
            });
        }
        return Err(SkillsetError::GitCommandFailed {
            command: "clone".to_string(),
            reason,
        });
    }

    let commit = refs::rev_parse_head(runner, dir.path()).await?;
    Ok(CloneResult { dir, commit })
}
