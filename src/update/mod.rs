//! Remote update checks
//!
//! Decides, per installed entry, whether its source has moved past what is
//! installed. The kind of ref drives the query:
//! - no ref and no commit: a local install, never checked over the network
//! - no ref but a commit: compare against the remote `HEAD`
//! - a version-like ref (`v1.2.0`, `2.0`): look for tags listed after it
//! - any other ref: a branch, compare against its head
//!
//! Checks never fail; problems become `UpdateStatus::CheckFailed`.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use futures_util::future::join_all;
use regex::Regex;

use crate::git::refs::{first_sha, parse_tags};
use crate::git::{GitRunner, RefQuery, ls_remote};
use crate::manifest::{Manifest, ManifestEntry};
use crate::source::clone_url_for_key;

static TAG_LIKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v?\d").unwrap_or_else(|e| unreachable!("tag pattern is valid: {e}")));

/// Whether a ref is treated as a release tag rather than a branch
pub fn is_tag_like(git_ref: &str) -> bool {
    TAG_LIKE.is_match(git_ref)
}

/// Outcome of checking one entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateStatus {
    /// Installed from a local directory
    Local,
    UpToDate,
    /// The tracked commit moved on the remote
    UpdateAvailable { remote_commit: String },
    /// Tags listed after the installed tag, in remote order
    NewerTags { tags: Vec<String> },
    CheckFailed { reason: String },
}

impl fmt::Display for UpdateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateStatus::Local => f.write_str("local"),
            UpdateStatus::UpToDate => f.write_str("up to date"),
            UpdateStatus::UpdateAvailable { remote_commit } => {
                write!(f, "update available ({})", short_sha(remote_commit))
            }
            UpdateStatus::NewerTags { tags } => write!(f, "newer tags: {}", tags.join(", ")),
            UpdateStatus::CheckFailed { reason } => write!(f, "check failed: {reason}"),
        }
    }
}

/// First 7 characters of a commit hash
pub fn short_sha(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}

fn failed(reason: impl Into<String>) -> UpdateStatus {
    UpdateStatus::CheckFailed {
        reason: reason.into(),
    }
}

fn compare_commit(installed: Option<&str>, remote: &str) -> UpdateStatus {
    if installed == Some(remote) {
        UpdateStatus::UpToDate
    } else {
        UpdateStatus::UpdateAvailable {
            remote_commit: remote.to_string(),
        }
    }
}

/// Tags after `installed` in `tags`, or `None` if `installed` is not listed
pub fn tags_after(tags: &[String], installed: &str) -> Option<Vec<String>> {
    let position = tags.iter().position(|t| t == installed)?;
    Some(tags[position + 1..].to_vec())
}

/// Check a single manifest entry against its remote
pub async fn check_entry<R: GitRunner>(runner: &R, key: &str, entry: &ManifestEntry) -> UpdateStatus {
    if entry.is_local() {
        return UpdateStatus::Local;
    }
    let Some(url) = clone_url_for_key(key, entry.clone_url.as_deref()) else {
        return failed(format!("no clone URL known for '{key}'"));
    };

    match entry.git_ref.as_deref() {
        None => match ls_remote(runner, &url, RefQuery::Head).await {
            Ok(output) => match first_sha(&output) {
                Some(remote) => compare_commit(entry.commit.as_deref(), remote),
                None => failed("could not parse remote HEAD"),
            },
            Err(e) => failed(e.to_string()),
        },
        Some(tag) if is_tag_like(tag) => match ls_remote(runner, &url, RefQuery::Tags).await {
            Ok(output) => match tags_after(&parse_tags(&output), tag) {
                Some(newer) if newer.is_empty() => UpdateStatus::UpToDate,
                Some(tags) => UpdateStatus::NewerTags { tags },
                None => failed(format!("installed tag '{tag}' not found on remote")),
            },
            Err(e) => failed(e.to_string()),
        },
        Some(branch) => match ls_remote(runner, &url, RefQuery::Branch(branch)).await {
            Ok(output) => match first_sha(&output) {
                Some(remote) => compare_commit(entry.commit.as_deref(), remote),
                None => failed(format!("branch '{branch}' not found on remote")),
            },
            Err(e) => failed(e.to_string()),
        },
    }
}

/// Check every entry concurrently. One failing check never affects another.
pub async fn check_all<R: GitRunner>(runner: &R, manifest: &Manifest) -> BTreeMap<String, UpdateStatus> {
    let checks = manifest.iter().map(|(key, entry)| async move {
        let status = check_entry(runner, key, entry).await;
        tracing::debug!("{key}: {status}");
        (key.clone(), status)
    });
    join_all(checks).await.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::testing::{MockGit, Reply};

    const OLD: &str = "1111111111111111111111111111111111111111";
    const NEW: &str = "2222222222222222222222222222222222222222";

    fn entry(git_ref: Option<&str>, commit: Option<&str>) -> ManifestEntry {
        ManifestEntry::new(
            git_ref.map(str::to_string),
            commit.map(str::to_string),
            vec!["claude".to_string()],
            vec![".claude/skills/lint/".to_string()],
            None,
        )
    }

    fn tag_listing(tags: &[&str]) -> String {
        tags.iter()
            .flat_map(|t| {
                [
                    format!("{OLD}\trefs/tags/{t}\n"),
                    format!("{NEW}\trefs/tags/{t}^{{}}\n"),
                ]
            })
            .collect()
    }

    #[test]
    fn test_tag_like_refs() {
        assert!(is_tag_like("v1.2.0"));
        assert!(is_tag_like("2.0"));
        assert!(!is_tag_like("main"));
        assert!(!is_tag_like("version-2"));
    }

    #[tokio::test]
    async fn test_local_entry_makes_no_git_calls() {
        let git = MockGit::new(vec![]);
        let status = check_entry(&git, "/work/skills/lint", &entry(None, None)).await;
        assert_eq!(status, UpdateStatus::Local);
        assert_eq!(git.call_count(), 0);
    }

    #[tokio::test]
    async fn test_newer_tags_after_installed() {
        let git = MockGit::new(vec![Reply::Ok(tag_listing(&[
            "v1.0.0", "v1.2.0", "v1.3.0", "v2.0.0",
        ]))]);
        let status = check_entry(&git, "acme/tools", &entry(Some("v1.2.0"), Some(OLD))).await;

        assert_eq!(
            status,
            UpdateStatus::NewerTags {
                tags: vec!["v1.3.0".to_string(), "v2.0.0".to_string()]
            }
        );
        assert_eq!(
            git.calls(),
            vec![vec!["ls-remote", "--tags", "https://github.com/acme/tools.git"]]
        );
    }

    #[tokio::test]
    async fn test_latest_tag_is_up_to_date() {
        let git = MockGit::new(vec![Reply::Ok(tag_listing(&["v1.0.0", "v1.2.0"]))]);
        let status = check_entry(&git, "acme/tools", &entry(Some("v1.2.0"), Some(OLD))).await;
        assert_eq!(status, UpdateStatus::UpToDate);
    }

    #[tokio::test]
    async fn test_missing_installed_tag_fails_check() {
        let git = MockGit::new(vec![Reply::Ok(tag_listing(&["v1.0.0"]))]);
        let status = check_entry(&git, "acme/tools", &entry(Some("v1.2.0"), Some(OLD))).await;
        assert!(matches!(status, UpdateStatus::CheckFailed { .. }));
    }

    #[tokio::test]
    async fn test_branch_at_installed_commit_is_up_to_date() {
        let git = MockGit::new(vec![Reply::Ok(format!("{OLD}\trefs/heads/main\n"))]);
        let status = check_entry(&git, "acme/tools", &entry(Some("main"), Some(OLD))).await;

        assert_eq!(status, UpdateStatus::UpToDate);
        assert_eq!(
            git.calls(),
            vec![vec![
                "ls-remote",
                "https://github.com/acme/tools.git",
                "refs/heads/main"
            ]]
        );
    }

    #[tokio::test]
    async fn test_moved_head_is_update_available() {
        let git = MockGit::new(vec![Reply::Ok(format!("{NEW}\tHEAD\n"))]);
        let status = check_entry(&git, "acme/tools", &entry(None, Some(OLD))).await;
        assert_eq!(
            status,
            UpdateStatus::UpdateAvailable {
                remote_commit: NEW.to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_absent_branch_and_garbage_output_fail_check() {
        let git = MockGit::new(vec![Reply::Ok(String::new()), Reply::Ok("garbage\n".to_string())]);
        assert!(matches!(
            check_entry(&git, "acme/tools", &entry(Some("gone"), Some(OLD))).await,
            UpdateStatus::CheckFailed { .. }
        ));
        assert!(matches!(
            check_entry(&git, "acme/tools", &entry(None, Some(OLD))).await,
            UpdateStatus::CheckFailed { .. }
        ));
    }

    #[tokio::test]
    async fn test_check_all_isolates_failures() {
        let manifest = Manifest::new()
            .with_entry("acme/a", entry(Some("main"), Some(OLD)))
            .with_entry("acme/b", entry(None, Some(OLD)))
            .with_entry("/local/skill", entry(None, None));
        let git = MockGit::new(vec![
            Reply::Ok(format!("{OLD}\trefs/heads/main\n")),
            Reply::Fail("fatal: unable to access: Could not resolve host".to_string()),
        ]);

        let results = check_all(&git, &manifest).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results["/local/skill"], UpdateStatus::Local);
        assert_eq!(results["acme/a"], UpdateStatus::UpToDate);
        assert!(matches!(results["acme/b"], UpdateStatus::CheckFailed { .. }));
        assert_eq!(git.call_count(), 2);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(
            UpdateStatus::UpdateAvailable {
                remote_commit: NEW.to_string()
            }
            .to_string(),
            "update available (2222222)"
        );
        assert_eq!(UpdateStatus::Local.to_string(), "local");
    }
}
