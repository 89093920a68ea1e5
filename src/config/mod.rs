//! Source configuration (`skillset.json`)
//!
//! A package source declares which agents it supports:
//!
//! ```json
//! { "agents": ["claude", "cursor"] }
//! ```
//!
//! A source without this file is not configured for skillset, which callers
//! treat as a normal outcome rather than an error.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::agent::AgentRegistry;
use crate::error::{Result, SkillsetError};

/// Config file name at a source root (or a collection member root)
pub const CONFIG_FILE: &str = "skillset.json";

#[derive(Debug, Deserialize)]
struct RawSourceConfig {
    agents: Option<Vec<String>>,
    #[serde(default)]
    description: Option<String>,
}

/// Validated source configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    /// Declared agents known to the registry, in declaration order
    pub agents: Vec<String>,
    pub description: Option<String>,
}

/// Whether `dir` carries a config file
pub fn has_config(dir: &Path) -> bool {
    dir.join(CONFIG_FILE).is_file()
}

/// Read the config at `dir`.
///
/// Returns `Ok(None)` when there is no config file. Unknown agent ids are
/// dropped with a warning; a missing or empty `agents` list is invalid.
pub fn read_source_config(dir: &Path, registry: &AgentRegistry) -> Result<Option<SourceConfig>> {
    let path = dir.join(CONFIG_FILE);
    if !path.is_file() {
        return Ok(None);
    }
    let path_str = path.display().to_string();

    let content = fs::read_to_string(&path).map_err(|e| SkillsetError::FileReadFailed {
        path: path_str.clone(),
        reason: e.to_string(),
    })?;
    let raw: RawSourceConfig =
        serde_json::from_str(&content).map_err(|e| SkillsetError::ConfigParseFailed {
            path: path_str.clone(),
            reason: e.to_string(),
        })?;

    let declared = raw
        .agents
        .filter(|agents| !agents.is_empty())
        .ok_or_else(|| SkillsetError::ConfigInvalid {
            path: path_str.clone(),
            message: "\"agents\" must be a non-empty list".to_string(),
        })?;

    let mut agents: Vec<String> = Vec::new();
    for agent in declared {
        if !registry.contains(&agent) {
            tracing::warn!("Ignoring unknown agent '{agent}' in {path_str}");
        } else if !agents.contains(&agent) {
            agents.push(agent);
        }
    }

    Ok(Some(SourceConfig {
        agents,
        description: raw.description,
    }))
}
