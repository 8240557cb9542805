//! Project configuration for the version guard.
//!
//! Read from `<root>/.claude/plugsync.json`. Every field is optional; a missing
//! or malformed file yields the layout used by Claude Code plugin marketplaces:
//!
//! ```text
//! .claude-plugin/marketplace.json
//! docs/memory.md
//! plugins/<name>/.claude-plugin/plugin.json
//! plugins/<name>/skills/<skill>/SKILL.md
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// Location of the config file, relative to the repository root.
pub const CONFIG_PATH: &str = ".claude/plugsync.json";

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Repository layout. All paths are forward-slash and repository-relative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding one subdirectory per plugin.
    pub plugins_dir: String,
    /// Plugin manifest, relative to the plugin directory.
    pub plugin_manifest: String,
    /// Marketplace catalog listing every plugin.
    pub marketplace: String,
    /// Markdown file with the plugin version table.
    pub doc_table: String,
    /// Skills directory, relative to the plugin directory.
    pub skills_dir: String,
    /// Skill definition file inside each skill directory.
    pub skill_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            plugins_dir: "plugins".to_string(),
            plugin_manifest: ".claude-plugin/plugin.json".to_string(),
            marketplace: ".claude-plugin/marketplace.json".to_string(),
            doc_table: "docs/memory.md".to_string(),
            skills_dir: "skills".to_string(),
            skill_file: "SKILL.md".to_string(),
        }
    }
}

impl Config {
    /// `plugins/<name>`
    pub fn plugin_dir(&self, plugin: &str) -> String {
        format!("{}/{plugin}", self.plugins_dir)
    }

    /// `plugins/<name>/.claude-plugin/plugin.json`
    pub fn manifest_path(&self, plugin: &str) -> String {
        format!("{}/{}", self.plugin_dir(plugin), self.plugin_manifest)
    }

    /// `plugins/<name>/skills`
    pub fn skills_path(&self, plugin: &str) -> String {
        format!("{}/{}", self.plugin_dir(plugin), self.skills_dir)
    }

    /// `plugins/<name>/skills/<skill>/SKILL.md`
    pub fn skill_path(&self, plugin: &str, skill: &str) -> String {
        format!("{}/{skill}/{}", self.skills_path(plugin), self.skill_file)
    }

    /// Plugin name owning a repository-relative path, if any.
    ///
    /// Only paths strictly inside `plugins/<name>/` count.
    pub fn owning_plugin<'a>(&self, path: &'a str) -> Option<&'a str> {
        let rest = path.strip_prefix(self.plugins_dir.as_str())?;
        let rest = rest.strip_prefix('/')?;
        let (name, _) = rest.split_once('/')?;
        (!name.is_empty()).then_some(name)
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load config for a repository, returning defaults if the file is missing or invalid.
pub fn load_config(root: &Path) -> Config {
    load_config_from(&root.join(CONFIG_PATH))
}

fn load_config_from(path: &Path) -> Config {
    match std::fs::read_to_string(path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
            warn!("ignoring malformed {}: {e}", path.display());
            Config::default()
        }),
        Err(_) => Config::default(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
