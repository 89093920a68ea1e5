//! Error types and handling for skillset
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for skillset operations
#[derive(Error, Diagnostic, Debug)]
pub enum SkillsetError {
    // Source errors
    #[error("Invalid source: {input}")]
    #[diagnostic(
        code(skillset::source::invalid),
        help("Valid formats: ./path, owner/repo, owner/repo#ref, https://host/owner/repo.git")
    )]
    InvalidSource { input: String, reason: String },

    #[error("Source directory does not exist: {path}")]
    #[diagnostic(code(skillset::source::not_found))]
    SourceNotFound { path: String },

    #[error("Source is not a directory: {path}")]
    #[diagnostic(code(skillset::source::not_a_directory))]
    SourceNotADirectory { path: String },

    // Git errors
    #[error("Authentication failed for {url}")]
    #[diagnostic(
        code(skillset::git::auth_failed),
        help("Check that the repository exists and that your git credentials can access it")
    )]
    GitAuthFailed { url: String, reason: String },

    #[error("Failed to clone {url} after {attempts} attempt(s): {reason}")]
    #[diagnostic(
        code(skillset::git::clone_failed),
        help("Check that the URL and ref are correct and that the network is reachable")
    )]
    GitCloneFailed {
        url: String,
        attempts: u32,
        reason: String,
    },

    #[error("git {command} failed: {reason}")]
    #[diagnostic(code(skillset::git::command_failed))]
    GitCommandFailed { command: String, reason: String },

    #[error("git {command} timed out after {seconds}s")]
    #[diagnostic(code(skillset::git::timeout))]
    GitTimeout { command: String, seconds: u64 },

    #[error("Failed to resolve git ref '{git_ref}': {reason}")]
    #[diagnostic(code(skillset::git::ref_resolve_failed))]
    GitRefResolveFailed { git_ref: String, reason: String },

    // Configuration errors
    #[error("Source is not configured for skillset: {path}")]
    #[diagnostic(
        code(skillset::config::not_configured),
        help("Add a skillset.json with an \"agents\" list to the source root")
    )]
    NotConfigured { path: String },

    #[error("Failed to parse configuration file: {path}")]
    #[diagnostic(code(skillset::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("Invalid configuration in {path}: {message}")]
    #[diagnostic(code(skillset::config::invalid))]
    ConfigInvalid { path: String, message: String },

    // Agent errors
    #[error("Unknown agent: {agent}")]
    #[diagnostic(
        code(skillset::agent::unknown),
        help("Known agents: amp, claude, codex, cursor, gemini, opencode")
    )]
    UnknownAgent { agent: String },

    #[error("No applicable agents for {key}")]
    #[diagnostic(
        code(skillset::agent::none_applicable),
        help("Create an agent directory (e.g. .claude/) or pass --agent explicitly")
    )]
    NoAgents { key: String },

    // Install errors
    #[error("Not an installable package: {path}")]
    #[diagnostic(
        code(skillset::install::not_a_package),
        help("A package needs skills/, agents/ or hooks/ directories, or a SKILL.md file")
    )]
    NotAPackage { path: String },

    #[error(
        "Install would overwrite {owned} file(s) owned by other packages and {unmanaged} unmanaged file(s)"
    )]
    #[diagnostic(
        code(skillset::install::collision),
        help("Re-run with --force to overwrite the listed paths")
    )]
    CollisionDetected { owned: usize, unmanaged: usize },

    #[error("{failed} package(s) could not be updated")]
    #[diagnostic(
        code(skillset::install::update_incomplete),
        help("See the messages above for each failed package")
    )]
    UpdateIncomplete { failed: usize },

    // Manifest errors
    #[error("Package not installed: {key}")]
    #[diagnostic(
        code(skillset::manifest::entry_not_found),
        help("Run 'skillset list' to see installed packages")
    )]
    EntryNotFound { key: String },

    #[error("Failed to parse manifest: {path}")]
    #[diagnostic(code(skillset::manifest::parse_failed))]
    ManifestParseFailed { path: String, reason: String },

    // File system errors
    #[error("Failed to read file: {path}")]
    #[diagnostic(code(skillset::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file: {path}")]
    #[diagnostic(code(skillset::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(skillset::fs::io_error))]
    IoError { message: String },
}

impl SkillsetError {
    /// Whether a failed git invocation is worth retrying.
    ///
    /// Authentication failures never are; timeouts and other command
    /// failures are treated as transient.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SkillsetError::GitTimeout { .. } | SkillsetError::GitCommandFailed { .. }
        )
    }
}

impl From<std::io::Error> for SkillsetError {
    fn from(err: std::io::Error) -> Self {
        SkillsetError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for SkillsetError {
    fn from(err: serde_json::Error) -> Self {
        SkillsetError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, SkillsetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SkillsetError::EntryNotFound {
            key: "acme/tools".to_string(),
        };
        assert_eq!(err.to_string(), "Package not installed: acme/tools");
    }

    #[test]
    fn test_error_code() {
        let err = SkillsetError::GitAuthFailed {
            url: "https://github.com/acme/private.git".to_string(),
            reason: "Permission denied (publickey)".to_string(),
        };
        assert_eq!(
            err.code().map(|c| c.to_string()),
            Some("skillset::git::auth_failed".to_string())
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SkillsetError = io_err.into();
        assert!(matches!(err, SkillsetError::IoError { .. }));
    }

    #[test]
    fn test_json_error_conversion() {
        let parse_result: std::result::Result<serde_json::Value, _> =
            serde_json::from_str("invalid json content");
        let err: SkillsetError = parse_result.unwrap_err().into();
        assert!(matches!(err, SkillsetError::ConfigParseFailed { .. }));
    }

    #[test]
    fn test_clone_failed_mentions_attempts() {
        let err = SkillsetError::GitCloneFailed {
            url: "https://github.com/acme/tools.git".to_string(),
            attempts: 3,
            reason: "Could not resolve host".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("after 3 attempt(s)"));
        assert!(message.contains("Could not resolve host"));
    }

    #[test]
    fn test_collision_error_counts() {
        let err = SkillsetError::CollisionDetected {
            owned: 2,
            unmanaged: 1,
        };
        assert!(err.to_string().contains("2 file(s) owned by other packages"));
        assert!(err.to_string().contains("1 unmanaged file(s)"));
    }

    #[test]
    fn test_transient_classification() {
        assert!(
            SkillsetError::GitTimeout {
                command: "clone".to_string(),
                seconds: 60,
            }
            .is_transient()
        );
        assert!(
            SkillsetError::GitCommandFailed {
                command: "clone".to_string(),
                reason: "early EOF".to_string(),
            }
            .is_transient()
        );
        assert!(
            !SkillsetError::GitAuthFailed {
                url: "u".to_string(),
                reason: "r".to_string(),
            }
            .is_transient()
        );
    }
}
