//! Authentication failure classification
//!
//! A clone that fails for lack of credentials will fail the same way on every
//! retry, so the clone loop consults `is_auth_failure` before retrying.

use std::sync::LazyLock;

use regex::Regex;

static AUTH_FAILURE: LazyLock<Regex> = LazyLock::new(|| {
    // GitHub answers unauthenticated requests for private repos with
    // "Repository not found", so that counts as an auth failure too.
    Regex::new(
        r"(?i)(authentication failed|permission denied|access denied|could not read (username|password)|terminal prompts disabled|invalid username or password|repository not found|returned error: 40[13])",
    )
    .unwrap_or_else(|e| unreachable!("auth pattern is valid: {e}"))
});

/// Whether git's stderr describes an authentication or permission failure
pub fn is_auth_failure(stderr: &str) -> bool {
    AUTH_FAILURE.is_match(stderr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_https_auth_failures() {
        assert!(is_auth_failure(
            "remote: Invalid username or password.\nfatal: Authentication failed for 'https://github.com/acme/x.git/'"
        ));
        assert!(is_auth_failure(
            "fatal: could not read Username for 'https://github.com': terminal prompts disabled"
        ));
        assert!(is_auth_failure(
            "fatal: unable to access 'https://example.com/x.git/': The requested URL returned error: 403"
        ));
    }

    #[test]
    fn test_detects_ssh_permission_denied() {
        assert!(is_auth_failure(
            "git@github.com: Permission denied (publickey).\nfatal: Could not read from remote repository."
        ));
    }

    #[test]
    fn test_detects_private_repo_not_found() {
        assert!(is_auth_failure(
            "remote: Repository not found.\nfatal: repository 'https://github.com/acme/private.git/' not found"
        ));
    }

    #[test]
    fn test_transient_failures_are_not_auth() {
        assert!(!is_auth_failure(
            "fatal: unable to access 'https://github.com/acme/x.git/': Could not resolve host: github.com"
        ));
        assert!(!is_auth_failure("error: RPC failed; curl 56 GnuTLS recv error"));
        assert!(!is_auth_failure(
            "fatal: Remote branch nope not found in upstream origin"
        ));
        assert!(!is_auth_failure(""));
    }
}
