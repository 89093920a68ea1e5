//! Package source handling
//!
//! This module handles parsing package sources from various formats:
//! - Local directory paths: `./skills/my-skill`, `../shared`, `/abs/path`
//! - GitHub short-form: `owner/repo`
//! - Git URLs: `https://github.com/owner/repo.git`, `git@github.com:owner/repo.git`,
//!   `https://gitlab.com/group/project.git`, `file:///srv/repos/tools.git`
//! - Any git form with `#ref` for a branch or tag
//!
//! It also derives manifest keys from sources and, in reverse, clone URLs from
//! manifest keys for update checks.

use std::path::{Path, PathBuf};

use normpath::PathExt;

use crate::error::{Result, SkillsetError};

const GITHUB_HOST: &str = "github.com";

/// A parsed package source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Local directory, never fetched through git
    Local { path: PathBuf },
    /// Git repository
    Git(GitSource),
}

/// Clone coordinates for a git source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitSource {
    /// URL passed to `git clone`
    pub url: String,
    /// Requested branch or tag
    pub git_ref: Option<String>,
    /// Manifest key (`owner/repo` for GitHub, `host/path` otherwise)
    pub key: String,
}

impl Source {
    /// Parse a source string
    ///
    /// Local paths are recognised first (`./`, `../`, `.`, absolute paths, or an
    /// existing directory without a `:`), everything else is parsed as git.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        if input.is_empty() {
            return Err(SkillsetError::InvalidSource {
                input: input.to_string(),
                reason: "source is empty".to_string(),
            });
        }

        if is_local_path(input) {
            return Ok(Source::Local {
                path: PathBuf::from(input),
            });
        }

        GitSource::parse(input).map(Source::Git)
    }

    /// Manifest key for this source.
    ///
    /// Local sources are keyed by their normalized absolute path, so `.` and
    /// `..` components and symlinks never reach the key.
    pub fn key(&self) -> Result<String> {
        match self {
            Source::Local { path } => Ok(normalize_local(path)?.display().to_string()),
            Source::Git(git) => Ok(git.key.clone()),
        }
    }
}

/// Resolve a local source path. Paths that do not exist yet cannot be
/// normalized and fall back to the plain absolute form.
fn normalize_local(path: &Path) -> Result<PathBuf> {
    if let Ok(normalized) = path.normalize() {
        return Ok(normalized.into_path_buf());
    }
    std::path::absolute(path).map_err(|e| SkillsetError::InvalidSource {
        input: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn is_local_path(input: &str) -> bool {
    input.starts_with("./")
        || input.starts_with("../")
        || input == "."
        || input == ".."
        || input.starts_with('/')
        || Path::new(input).is_absolute()
        || (Path::new(input).is_dir() && !input.contains(':'))
}

impl GitSource {
    /// Parse a git source string (everything except local paths)
    pub fn parse(input: &str) -> Result<Self> {
        let (main, git_ref) = match input.split_once('#') {
            Some((main, fragment)) if fragment.is_empty() => (main, None),
            Some((main, fragment)) => (main, Some(fragment.to_string())),
            None => (input, None),
        };

        let invalid = |reason: &str| SkillsetError::InvalidSource {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        if let Some(rest) = main.strip_prefix("git@") {
            let (host, path) = rest
                .split_once(':')
                .ok_or_else(|| invalid("SSH URL must look like git@host:owner/repo.git"))?;
            let path = trim_repo_path(path);
            if path.is_empty() {
                return Err(invalid("missing repository path"));
            }
            return Ok(Self {
                url: main.to_string(),
                git_ref,
                key: key_for_host_path(host, path),
            });
        }

        if let Some((scheme, rest)) = main.split_once("://") {
            return match scheme {
                "https" | "http" | "ssh" | "git" => {
                    let rest = rest.rsplit_once('@').map_or(rest, |(_, r)| r);
                    let (host, path) = rest
                        .split_once('/')
                        .ok_or_else(|| invalid("missing repository path"))?;
                    let path = trim_repo_path(path);
                    if host.is_empty() || path.is_empty() {
                        return Err(invalid("missing host or repository path"));
                    }
                    Ok(Self {
                        url: main.to_string(),
                        git_ref,
                        key: key_for_host_path(host, path),
                    })
                }
                "file" => {
                    let path = trim_repo_path(rest.trim_start_matches('/'));
                    if path.is_empty() {
                        return Err(invalid("missing repository path"));
                    }
                    Ok(Self {
                        url: main.to_string(),
                        git_ref,
                        key: format!("file/{path}"),
                    })
                }
                _ => Err(invalid("unsupported URL scheme")),
            };
        }

        let segments: Vec<&str> = main.split('/').collect();
        if segments.len() != 2 || segments.iter().any(|s| s.is_empty()) {
            return Err(invalid("expected owner/repo"));
        }
        let key = format!("{}/{}", segments[0], trim_repo_path(segments[1]));
        Ok(Self {
            url: github_clone_url(&key),
            git_ref,
            key,
        })
    }

    /// Clone URL to persist in the manifest, or `None` when the key alone
    /// resolves back to the same URL.
    pub fn stored_clone_url(&self) -> Option<String> {
        match clone_url_for_key(&self.key, None) {
            Some(derived) if derived == self.url => None,
            _ => Some(self.url.clone()),
        }
    }
}

fn trim_repo_path(path: &str) -> &str {
    let path = path.trim_matches('/');
    path.strip_suffix(".git").unwrap_or(path)
}

fn key_for_host_path(host: &str, path: &str) -> String {
    let host = host.rsplit_once('@').map_or(host, |(_, h)| h);
    let host = host.split_once(':').map_or(host, |(h, _)| h);
    if host.eq_ignore_ascii_case(GITHUB_HOST) {
        path.to_string()
    } else {
        format!("{host}/{path}")
    }
}

fn github_clone_url(owner_repo: &str) -> String {
    format!("https://{GITHUB_HOST}/{owner_repo}.git")
}

/// Resolve the clone URL for a manifest key.
///
/// A stored URL always wins. Otherwise keys of the form `owner/repo` or
/// `owner/repo/member` resolve to GitHub. Local-path keys and keys whose first
/// segment looks like a host name do not resolve.
pub fn clone_url_for_key(key: &str, stored: Option<&str>) -> Option<String> {
    if let Some(url) = stored {
        return Some(url.to_string());
    }
    if key.starts_with('/') || Path::new(key).is_absolute() {
        return None;
    }

    let mut segments = key.split('/');
    let owner = segments.next().filter(|s| !s.is_empty())?;
    let repo = segments.next().filter(|s| !s.is_empty())?;
    if owner.contains('.') || owner.contains(':') {
        return None;
    }
    Some(github_clone_url(&format!("{owner}/{repo}")))
}

/// Key for one member of a collection installed from `base_key`
pub fn member_key(base_key: &str, member: &str) -> String {
    format!("{}/{}", base_key.trim_end_matches('/'), member)
}

/// Where an installed entry can be fetched from again
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstalledSource {
    /// Local directory; the key is its absolute path
    Local { path: PathBuf },
    /// Repository URL plus the collection member directory, if any
    Git { url: String, member: Option<String> },
}

impl InstalledSource {
    /// Resolve the origin of the entry stored under `key`
    pub fn locate(key: &str, stored_url: Option<&str>, is_local: bool) -> Result<Self> {
        if is_local {
            return Ok(InstalledSource::Local {
                path: PathBuf::from(key),
            });
        }

        let url = clone_url_for_key(key, stored_url).ok_or_else(|| SkillsetError::InvalidSource {
            input: key.to_string(),
            reason: "no clone URL is recorded for this entry".to_string(),
        })?;
        let base_key = GitSource::parse(&url)?.key;
        let member = key
            .strip_prefix(base_key.as_str())
            .map(|rest| rest.trim_matches('/'))
            .filter(|rest| !rest.is_empty())
            .map(str::to_string);
        Ok(InstalledSource::Git { url, member })
    }

    /// Source string that installs this entry from scratch
    pub fn install_hint(&self, git_ref: Option<&str>) -> String {
        match (self, git_ref) {
            (InstalledSource::Local { path }, _) => path.display().to_string(),
            (InstalledSource::Git { url, .. }, Some(git_ref)) => format!("{url}#{git_ref}"),
            (InstalledSource::Git { url, .. }, None) => url.clone(),
        }
    }
}
