//! Copy transactions with rollback
//!
//! A `Transaction` performs copies into a project and records every path it
//! writes, in order. If the work fails, `rollback` removes exactly those
//! paths so the project is left as it was before the copy began.
//!
//! ## Usage
//!
//! ```ignore
//! let mut transaction = Transaction::new(project_dir);
//! transaction.copy_dir(&source, ".claude/skills/lint/", &[".git"])?;
//!
//! // On success:
//! let written = transaction.commit();
//!
//! // On error (automatic via Drop if not committed):
//! // rollback happens automatically
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Result, SkillsetError};
use crate::installer::file_ops::{ensure_parent_dir, file_write_error};

/// A recording copy transaction rooted at a project directory
#[derive(Debug)]
pub struct Transaction {
    /// Project root every recorded path is relative to
    project_dir: PathBuf,

    /// Project-relative paths written, in write order (directories end in `/`)
    written: Vec<String>,

    /// Same paths as `written`, for membership checks
    seen: HashSet<String>,

    /// Whether the transaction has been committed
    committed: bool,
}

impl Transaction {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            written: Vec::new(),
            seen: HashSet::new(),
            committed: false,
        }
    }

    /// Paths written so far, in order
    pub fn written(&self) -> &[String] {
        &self.written
    }

    /// Whether `rel` was already written by this transaction
    pub fn contains(&self, rel: &str) -> bool {
        self.seen.contains(rel)
    }

    fn record(&mut self, rel: String) {
        if self.seen.insert(rel.clone()) {
            self.written.push(rel);
        }
    }

    fn absolute(&self, rel: &str) -> PathBuf {
        self.project_dir.join(rel.trim_end_matches('/'))
    }

    /// Copy a single file to `dest_rel`, creating parent directories
    pub fn copy_file(&mut self, source: &Path, dest_rel: &str) -> Result<()> {
        let dest = self.absolute(dest_rel);
        ensure_parent_dir(&dest)?;
        fs::copy(source, &dest).map_err(|e| file_write_error(&dest, &e))?;
        self.record(dest_rel.to_string());
        Ok(())
    }

    /// Copy the directory `source` to `dest_rel` (which ends in `/`).
    ///
    /// The directory itself and every file and subdirectory inside it are
    /// recorded individually. Top-level entries named in `exclude` are skipped.
    pub fn copy_dir(&mut self, source: &Path, dest_rel: &str, exclude: &[&str]) -> Result<()> {
        let base_rel = format!("{}/", dest_rel.trim_end_matches('/'));
        let dest_root = self.absolute(&base_rel);

        ensure_parent_dir(&dest_root)?;
        fs::create_dir_all(&dest_root).map_err(|e| file_write_error(&dest_root, &e))?;
        self.record(base_rel.clone());

        let walker = WalkDir::new(source)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() != 1
                    || entry
                        .file_name()
                        .to_str()
                        .is_none_or(|name| !exclude.contains(&name))
            });

        for entry in walker {
            let entry = entry.map_err(|e| SkillsetError::FileReadFailed {
                path: source.display().to_string(),
                reason: e.to_string(),
            })?;
            let Ok(relative) = entry.path().strip_prefix(source) else {
                continue;
            };
            let relative = relative.to_string_lossy().replace('\\', "/");
            let dest = dest_root.join(&relative);

            if entry.file_type().is_dir() {
                fs::create_dir_all(&dest).map_err(|e| file_write_error(&dest, &e))?;
                self.record(format!("{base_rel}{relative}/"));
            } else if entry.file_type().is_symlink() && entry.path().is_dir() {
                tracing::warn!("Skipping symlinked directory {}", entry.path().display());
            } else {
                fs::copy(entry.path(), &dest).map_err(|e| file_write_error(&dest, &e))?;
                self.record(format!("{base_rel}{relative}"));
            }
        }

        Ok(())
    }

    /// Commit the transaction (prevent rollback) and return every written path
    pub fn commit(mut self) -> Vec<String> {
        self.committed = true;
        std::mem::take(&mut self.written)
    }

    /// Remove every recorded path, newest first.
    ///
    /// Best-effort: failures are logged and skipped. Paths already gone (for
    /// example files inside a directory that was removed recursively) are
    /// not failures. Returns the recorded paths.
    pub fn rollback(&mut self) -> Vec<String> {
        let written = std::mem::take(&mut self.written);
        self.seen.clear();
        if written.is_empty() {
            return written;
        }

        tracing::info!("Rolling back {} written paths", written.len());
        for rel in written.iter().rev() {
            let path = self.absolute(rel);
            let metadata = match path.symlink_metadata() {
                Ok(metadata) => metadata,
                Err(_) => continue,
            };
            let removed = if metadata.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            if let Err(e) = removed {
                tracing::warn!("Rollback could not remove {}: {e}", path.display());
            }
        }
        written
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if !self.committed && !self.written.is_empty() {
            self.rollback();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn skill_source() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::write(root.join("SKILL.md"), "# lint").unwrap();
        fs::create_dir_all(root.join("scripts")).unwrap();
        fs::write(root.join("scripts/run.sh"), "#!/bin/sh").unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::write(root.join(".git/HEAD"), "ref: refs/heads/main").unwrap();
        temp
    }

    #[test]
    fn test_copy_dir_records_every_path() {
        let source = skill_source();
        let project = TempDir::new().unwrap();

        let mut transaction = Transaction::new(project.path());
        transaction
            .copy_dir(source.path(), ".claude/skills/lint/", &[".git"])
            .unwrap();
        let written = transaction.commit();

        assert_eq!(
            written,
            vec![
                ".claude/skills/lint/",
                ".claude/skills/lint/SKILL.md",
                ".claude/skills/lint/scripts/",
                ".claude/skills/lint/scripts/run.sh",
            ]
        );
        assert!(project.path().join(".claude/skills/lint/scripts/run.sh").is_file());
        assert!(!project.path().join(".claude/skills/lint/.git").exists());
    }

    #[test]
    fn test_copy_file_creates_parents() {
        let source = TempDir::new().unwrap();
        fs::write(source.path().join("reviewer.md"), "# reviewer").unwrap();
        let project = TempDir::new().unwrap();

        let mut transaction = Transaction::new(project.path());
        transaction
            .copy_file(&source.path().join("reviewer.md"), ".claude/agents/reviewer.md")
            .unwrap();
        assert!(transaction.contains(".claude/agents/reviewer.md"));
        let written = transaction.commit();

        assert_eq!(written, vec![".claude/agents/reviewer.md"]);
        assert_eq!(
            fs::read_to_string(project.path().join(".claude/agents/reviewer.md")).unwrap(),
            "# reviewer"
        );
    }

    #[test]
    fn test_rollback_removes_only_recorded_paths() {
        let source = skill_source();
        let project = TempDir::new().unwrap();
        fs::create_dir_all(project.path().join(".claude/skills/mine")).unwrap();
        fs::write(project.path().join(".claude/skills/mine/SKILL.md"), "mine").unwrap();

        let mut transaction = Transaction::new(project.path());
        transaction
            .copy_dir(source.path(), ".claude/skills/lint/", &[])
            .unwrap();
        let removed = transaction.rollback();

        assert!(removed.contains(&".claude/skills/lint/".to_string()));
        assert!(!project.path().join(".claude/skills/lint").exists());
        assert!(project.path().join(".claude/skills/mine/SKILL.md").is_file());
        assert!(transaction.written().is_empty());
    }

    #[test]
    fn test_drop_without_commit_rolls_back() {
        let source = skill_source();
        let project = TempDir::new().unwrap();

        {
            let mut transaction = Transaction::new(project.path());
            transaction
                .copy_dir(source.path(), ".cursor/skills/lint/", &[".git"])
                .unwrap();
            assert!(project.path().join(".cursor/skills/lint/SKILL.md").exists());
        }

        assert!(!project.path().join(".cursor/skills/lint").exists());
    }

    #[test]
    fn test_commit_keeps_files() {
        let source = skill_source();
        let project = TempDir::new().unwrap();

        let mut transaction = Transaction::new(project.path());
        transaction
            .copy_dir(source.path(), ".cursor/skills/lint/", &[".git"])
            .unwrap();
        transaction.commit();

        assert!(project.path().join(".cursor/skills/lint/SKILL.md").is_file());
    }

    #[test]
    fn test_failed_copy_is_not_recorded() {
        let project = TempDir::new().unwrap();
        let mut transaction = Transaction::new(project.path());

        let err = transaction
            .copy_file(&project.path().join("missing.md"), ".claude/agents/missing.md")
            .unwrap_err();

        assert!(matches!(err, SkillsetError::FileWriteFailed { .. }));
        assert!(transaction.written().is_empty());
    }
}
