//! Common test utilities for skillset integration tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// A temporary project plus a separate directory for package sources
pub struct TestWorkspace {
    project_temp: TempDir,
    sources_temp: TempDir,
    /// Project root the CLI installs into
    pub path: PathBuf,
    /// Directory holding package sources
    pub sources: PathBuf,
}

impl TestWorkspace {
    /// Create a new test workspace
    pub fn new() -> Self {
        let project_temp = TempDir::new().expect("Failed to create project directory");
        let sources_temp = TempDir::new().expect("Failed to create sources directory");
        let path = project_temp.path().to_path_buf();
        let sources = sources_temp.path().to_path_buf();
        Self {
            project_temp,
            sources_temp,
            path,
            sources,
        }
    }

    /// Write a file in the project
    pub fn write_file(&self, path: &str, content: &str) {
        write(&self.path.join(path), content);
    }

    /// Read a file from the project
    pub fn read_file(&self, path: &str) -> String {
        std::fs::read_to_string(self.path.join(path)).expect("Failed to read file")
    }

    /// Check if a path exists in the project
    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }

    /// Create an agent directory such as `.claude/`
    pub fn create_agent_dir(&self, agent: &str) -> PathBuf {
        let agent_path = self.path.join(format!(".{agent}"));
        std::fs::create_dir_all(&agent_path).expect("Failed to create agent directory");
        agent_path
    }

    /// Create a bare skill source declaring `agents`; returns its absolute path
    pub fn create_skill(&self, name: &str, agents: &[&str], body: &str) -> PathBuf {
        let dir = self.sources.join(name);
        write(&dir.join("skillset.json"), &config_json(agents));
        write(&dir.join("SKILL.md"), body);
        dir
    }

    /// Create a plugin source from `(relative path, content)` pairs
    pub fn create_plugin(&self, name: &str, agents: &[&str], files: &[(&str, &str)]) -> PathBuf {
        let dir = self.sources.join(name);
        write(&dir.join("skillset.json"), &config_json(agents));
        for (rel, content) in files {
            write(&dir.join(rel), content);
        }
        dir
    }

    /// Read the manifest as JSON
    pub fn manifest(&self) -> serde_json::Value {
        let text = std::fs::read_to_string(self.path.join(".skillset/manifest.json"))
            .expect("Failed to read manifest");
        serde_json::from_str(&text).expect("Manifest is not valid JSON")
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// `skillset` command running inside `project`
#[allow(deprecated)]
pub fn skillset_cmd(project: &Path) -> Command {
    let mut cmd = Command::cargo_bin("skillset").expect("skillset binary is built");
    cmd.current_dir(project)
        .env_remove("SKILLSET_PROJECT")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

pub fn config_json(agents: &[&str]) -> String {
    let agents: Vec<String> = agents.iter().map(|a| format!("\"{a}\"")).collect();
    format!("{{\"agents\": [{}]}}", agents.join(", "))
}

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    std::fs::write(path, content).expect("Failed to write file");
}
