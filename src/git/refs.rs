//! Git reference resolution
//!
//! This module handles:
//! - Querying remote refs with `git ls-remote` without cloning
//! - Parsing `ls-remote` output (`<sha>\t<ref>` per line)
//! - Resolving the commit checked out in a clone

use std::path::Path;

use super::{DEFAULT_TIMEOUT, GitRunner, REMOTE_TIMEOUT, auth};
use crate::error::{Result, SkillsetError};

/// Which refs an `ls-remote` call asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefQuery<'a> {
    Head,
    Branch(&'a str),
    Tags,
}

/// Run `git ls-remote` and return its raw stdout
pub async fn ls_remote<R: GitRunner>(runner: &R, url: &str, query: RefQuery<'_>) -> Result<String> {
    let branch_ref;
    let args: Vec<&str> = match query {
        RefQuery::Head => vec!["ls-remote", url, "HEAD"],
        RefQuery::Branch(branch) => {
            branch_ref = format!("refs/heads/{branch}");
            vec!["ls-remote", url, branch_ref.as_str()]
        }
        RefQuery::Tags => vec!["ls-remote", "--tags", url],
    };

    let output = runner.run(&args, REMOTE_TIMEOUT).await?;
    if !output.success {
        let reason = output.stderr.trim().to_string();
        if auth::is_auth_failure(&reason) {
            return Err(SkillsetError::GitAuthFailed {
                url: url.to_string(),
                reason,
            });
        }
        return Err(SkillsetError::GitCommandFailed {
            command: "ls-remote".to_string(),
            reason,
        });
    }
    Ok(output.stdout)
}

fn is_sha(s: &str) -> bool {
    matches!(s.len(), 40 | 64) && s.chars().all(|c| c.is_ascii_hexdigit())
}

/// SHA from the first line of single-ref `ls-remote` output
pub fn first_sha(output: &str) -> Option<&str> {
    output
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().next())
        .filter(|sha| is_sha(sha))
}

/// Tag names from `ls-remote --tags` output, in remote order.
///
/// Dereferenced `^{}` entries are dropped.
pub fn parse_tags(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| line.split_once('\t').map(|(_, r)| r.trim()))
        .filter(|r| !r.ends_with("^{}"))
        .map(|r| r.strip_prefix("refs/tags/").unwrap_or(r).to_string())
        .collect()
}

/// Commit checked out in the repository at `dir`
pub async fn rev_parse_head<R: GitRunner>(runner: &R, dir: &Path) -> Result<String> {
    let dir = dir.to_string_lossy();
    let output = runner
        .run(&["-C", dir.as_ref(), "rev-parse", "HEAD"], DEFAULT_TIMEOUT)
        .await?;

    if !output.success {
        return Err(SkillsetError::GitRefResolveFailed {
            git_ref: "HEAD".to_string(),
            reason: output.stderr.trim().to_string(),
        });
    }

    let sha = output.stdout.trim();
    if !is_sha(sha) {
        return Err(SkillsetError::GitRefResolveFailed {
            git_ref: "HEAD".to_string(),
            reason: format!("invalid SHA from rev-parse: {sha}"),
        });
    }
    Ok(sha.to_string())
}
