//! Temporary directories for fetched sources.
//!
//! Clones are never placed under the current working directory, even when
//! TMPDIR is relative (e.g. TMPDIR=tmp), so a failed clone can never litter
//! the project being installed into.

use std::env;
use std::path::PathBuf;

use tempfile::TempDir;

use crate::error::{Result, SkillsetError};

const CLONE_DIR_PREFIX: &str = "skillset-clone-";

/// Returns an absolute directory suitable for creating temporary directories.
pub fn temp_dir_base() -> PathBuf {
    let t = env::temp_dir();
    if t.is_absolute() {
        t
    } else {
        #[cfg(windows)]
        {
            env::var("TEMP")
                .or_else(|_| env::var("TMP"))
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("C:\\Windows\\Temp"))
        }
        #[cfg(not(windows))]
        {
            PathBuf::from("/tmp")
        }
    }
}

/// Create an empty directory to clone into. Removed when dropped.
pub fn clone_dir() -> Result<TempDir> {
    tempfile::Builder::new()
        .prefix(CLONE_DIR_PREFIX)
        .tempdir_in(temp_dir_base())
        .map_err(|e| SkillsetError::IoError {
            message: format!("Failed to create temporary clone directory: {e}"),
        })
}
