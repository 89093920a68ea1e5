//! Built-in agent drivers

use std::path::Path;
use std::sync::Arc;

use super::{AgentDriver, AssetCategory};

fn any_exists(project_dir: &Path, markers: &[&str]) -> bool {
    markers.iter().any(|m| project_dir.join(m).exists())
}

/// Claude Code
pub struct Claude;

impl AgentDriver for Claude {
    fn id(&self) -> &'static str {
        "claude"
    }

    fn detect(&self, project_dir: &Path) -> bool {
        any_exists(project_dir, &[".claude", "CLAUDE.md"])
    }

    fn target_dir(&self, category: AssetCategory) -> Option<&'static str> {
        match category {
            AssetCategory::Skills => Some(".claude/skills"),
            AssetCategory::Agents => Some(".claude/agents"),
            AssetCategory::Hooks => Some(".claude/hooks"),
        }
    }
}

/// Cursor
pub struct Cursor;

impl AgentDriver for Cursor {
    fn id(&self) -> &'static str {
        "cursor"
    }

    fn detect(&self, project_dir: &Path) -> bool {
        any_exists(project_dir, &[".cursor"])
    }

    fn target_dir(&self, category: AssetCategory) -> Option<&'static str> {
        match category {
            AssetCategory::Skills => Some(".cursor/skills"),
            AssetCategory::Agents => Some(".cursor/agents"),
            AssetCategory::Hooks => None,
        }
    }
}

/// OpenAI Codex CLI
pub struct Codex;

impl AgentDriver for Codex {
    fn id(&self) -> &'static str {
        "codex"
    }

    fn detect(&self, project_dir: &Path) -> bool {
        any_exists(project_dir, &[".codex", "AGENTS.md"])
    }

    fn target_dir(&self, category: AssetCategory) -> Option<&'static str> {
        match category {
            AssetCategory::Skills => Some(".agents/skills"),
            AssetCategory::Agents | AssetCategory::Hooks => None,
        }
    }
}

/// OpenCode
pub struct OpenCode;

impl AgentDriver for OpenCode {
    fn id(&self) -> &'static str {
        "opencode"
    }

    fn detect(&self, project_dir: &Path) -> bool {
        any_exists(project_dir, &[".opencode", "opencode.json"])
    }

    fn target_dir(&self, category: AssetCategory) -> Option<&'static str> {
        match category {
            AssetCategory::Skills => Some(".opencode/skills"),
            AssetCategory::Agents => Some(".opencode/agents"),
            AssetCategory::Hooks => None,
        }
    }
}

/// Gemini CLI
pub struct Gemini;

impl AgentDriver for Gemini {
    fn id(&self) -> &'static str {
        "gemini"
    }

    fn detect(&self, project_dir: &Path) -> bool {
        any_exists(project_dir, &[".gemini", "GEMINI.md"])
    }

    fn target_dir(&self, category: AssetCategory) -> Option<&'static str> {
        match category {
            AssetCategory::Skills => Some(".gemini/skills"),
            AssetCategory::Agents | AssetCategory::Hooks => None,
        }
    }
}

/// Amp. Shares `.agents/skills` with Codex.
pub struct Amp;

impl AgentDriver for Amp {
    fn id(&self) -> &'static str {
        "amp"
    }

    fn detect(&self, project_dir: &Path) -> bool {
        any_exists(project_dir, &[".amp", "AGENT.md"])
    }

    fn target_dir(&self, category: AssetCategory) -> Option<&'static str> {
        match category {
            AssetCategory::Skills => Some(".agents/skills"),
            AssetCategory::Agents | AssetCategory::Hooks => None,
        }
    }
}

/// Every built-in driver
pub fn builtin_drivers() -> Vec<Arc<dyn AgentDriver>> {
    vec![
        Arc::new(Claude),
        Arc::new(Cursor),
        Arc::new(Codex),
        Arc::new(OpenCode),
        Arc::new(Gemini),
        Arc::new(Amp),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_detect_by_marker_file() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("CLAUDE.md"), "# Claude").unwrap();

        assert!(Claude.detect(temp.path()));
        assert!(!Gemini.detect(temp.path()));
    }

    #[test]
    fn test_codex_and_amp_share_skills_dir() {
        assert_eq!(
            Codex.target_dir(AssetCategory::Skills),
            Amp.target_dir(AssetCategory::Skills)
        );
    }

    #[test]
    fn test_detect_on_missing_project_is_false() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("does-not-exist");
        assert!(builtin_drivers().iter().all(|d| !d.detect(&missing)));
    }
}
