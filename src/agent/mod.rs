//! Agent drivers and the registry that maps agent ids to them
//!
//! This module handles:
//! - Asset categories (skills, agents, hooks) and their source directory names
//! - The `AgentDriver` capability: detection and per-category target directories
//! - An explicitly constructed `AgentRegistry` passed to every operation
//! - Concurrent detection of which agents are present in a project

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;

pub mod drivers;

/// A kind of installable content, named after its directory in a source
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetCategory {
    Skills,
    Agents,
    Hooks,
}

impl AssetCategory {
    /// All categories in scan order
    pub const ALL: [AssetCategory; 3] = [
        AssetCategory::Skills,
        AssetCategory::Agents,
        AssetCategory::Hooks,
    ];

    /// Directory name inside a plugin source
    pub fn dir_name(self) -> &'static str {
        match self {
            AssetCategory::Skills => "skills",
            AssetCategory::Agents => "agents",
            AssetCategory::Hooks => "hooks",
        }
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Per-agent behaviour the installer depends on.
///
/// `detect` is best-effort and must not fail; `target_dir` returns the
/// project-relative directory for a category, or `None` when the agent does
/// not support that category.
pub trait AgentDriver: Send + Sync {
    fn id(&self) -> &'static str;

    fn detect(&self, project_dir: &Path) -> bool;

    fn target_dir(&self, category: AssetCategory) -> Option<&'static str>;
}

/// Lookup table of agent drivers keyed by id
#[derive(Clone, Default)]
pub struct AgentRegistry {
    drivers: BTreeMap<&'static str, Arc<dyn AgentDriver>>,
}

impl AgentRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in driver
    pub fn builtin() -> Self {
        drivers::builtin_drivers()
            .into_iter()
            .fold(Self::new(), Self::with_driver)
    }

    /// Register a driver, replacing any driver with the same id
    pub fn with_driver(mut self, driver: Arc<dyn AgentDriver>) -> Self {
        self.drivers.insert(driver.id(), driver);
        self
    }

    pub fn get(&self, id: &str) -> Option<&Arc<dyn AgentDriver>> {
        self.drivers.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.drivers.contains_key(id)
    }

    /// Known agent ids in sorted order
    pub fn ids(&self) -> Vec<&'static str> {
        self.drivers.keys().copied().collect()
    }

    /// Target directory for `category` under agent `id`, if both are known
    pub fn target_dir(&self, id: &str, category: AssetCategory) -> Option<&'static str> {
        self.get(id).and_then(|d| d.target_dir(category))
    }

    /// Every target directory of every registered driver
    pub fn target_dirs(&self) -> BTreeSet<&'static str> {
        self.drivers
            .values()
            .flat_map(|d| AssetCategory::ALL.into_iter().filter_map(|c| d.target_dir(c)))
            .collect()
    }

    /// Detect which agents are present in a project.
    ///
    /// Each driver runs on the blocking pool concurrently. A driver that
    /// panics counts as not detected. Result is sorted by id.
    pub async fn detect_agents(&self, project_dir: &Path) -> Vec<String> {
        let mut set = JoinSet::new();
        for driver in self.drivers.values() {
            let driver = Arc::clone(driver);
            let dir = project_dir.to_path_buf();
            set.spawn_blocking(move || (driver.id(), driver.detect(&dir)));
        }

        let mut detected = Vec::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((id, true)) => detected.push(id.to_string()),
                Ok((_, false)) => {}
                Err(e) => tracing::warn!("Agent detection failed: {e}"),
            }
        }
        detected.sort();
        detected
    }
}

impl fmt::Debug for AgentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentRegistry")
            .field("drivers", &self.ids())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct PanickingDriver;

    impl AgentDriver for PanickingDriver {
        fn id(&self) -> &'static str {
            "broken"
        }

        #[allow(clippy::panic)]
        fn detect(&self, _project_dir: &Path) -> bool {
            panic!("detection blew up")
        }

        fn target_dir(&self, _category: AssetCategory) -> Option<&'static str> {
            None
        }
    }

    #[test]
    fn test_builtin_registry_ids() {
        let registry = AgentRegistry::builtin();
        assert_eq!(
            registry.ids(),
            vec!["amp", "claude", "codex", "cursor", "gemini", "opencode"]
        );
    }

    #[test]
    fn test_target_dir_lookup() {
        let registry = AgentRegistry::builtin();
        assert_eq!(
            registry.target_dir("claude", AssetCategory::Hooks),
            Some(".claude/hooks")
        );
        assert_eq!(registry.target_dir("codex", AssetCategory::Hooks), None);
        assert_eq!(registry.target_dir("nope", AssetCategory::Skills), None);
    }

    #[test]
    fn test_target_dirs_are_shared_once() {
        let dirs = AgentRegistry::builtin().target_dirs();
        assert!(dirs.contains(".agents/skills"));
        assert!(dirs.contains(".claude/hooks"));
        assert_eq!(dirs.iter().filter(|d| **d == ".agents/skills").count(), 1);
    }

    #[test]
    fn test_category_dir_names() {
        let names: Vec<_> = AssetCategory::ALL.iter().map(|c| c.dir_name()).collect();
        assert_eq!(names, vec!["skills", "agents", "hooks"]);
    }

    #[tokio::test]
    async fn test_detect_agents_from_directories() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join(".claude")).unwrap();
        std::fs::create_dir(temp.path().join(".cursor")).unwrap();

        let detected = AgentRegistry::builtin().detect_agents(temp.path()).await;
        assert_eq!(detected, vec!["claude", "cursor"]);
    }

    #[tokio::test]
    async fn test_detect_agents_tolerates_failing_driver() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join(".claude")).unwrap();

        let registry = AgentRegistry::builtin().with_driver(Arc::new(PanickingDriver));
        let detected = registry.detect_agents(temp.path()).await;
        assert_eq!(detected, vec!["claude"]);
    }
}
