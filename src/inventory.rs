//! `plugin-manifest.json`: the file inventory shipped with each plugin.
//!
//! Lists every file in the plugin directory so an installed copy can detect
//! and remove files orphaned by an update. Contents of the preserved
//! directories are never listed.

use crate::config::Config;
use crate::error::{GuardError, Result};
use crate::records::{json, write_atomic};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the inventory inside the plugin directory.
pub const INVENTORY_FILE: &str = "plugin-manifest.json";

/// Directories whose contents are left alone by cleanup.
pub const PRESERVE: &[&str] = &[".cache/", ".claude-plugin/"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub version: String,
    pub preserve: Vec<String>,
    pub files: Vec<String>,
}

impl Inventory {
    /// Scan `plugin_dir`. The manifest must exist and carry a version.
    pub fn generate(plugin_dir: &Path, config: &Config) -> Result<Self> {
        if !plugin_dir.is_dir() {
            return Err(GuardError::PluginNotFound(plugin_dir.display().to_string()));
        }
        let version = json::read_manifest_version(&plugin_dir.join(&config.plugin_manifest))?;

        let mut files = Vec::new();
        walk(plugin_dir, plugin_dir, &mut files)?;
        if !files.iter().any(|f| f == INVENTORY_FILE) {
            files.push(INVENTORY_FILE.to_string());
        }
        files.sort();

        Ok(Self {
            version,
            preserve: PRESERVE.iter().map(|p| p.to_string()).collect(),
            files,
        })
    }

    /// Write the inventory into `plugin_dir`, returning its path.
    pub fn write(&self, plugin_dir: &Path) -> Result<PathBuf> {
        let path = plugin_dir.join(INVENTORY_FILE);
        let mut json =
            serde_json::to_string_pretty(self).map_err(|e| GuardError::json(&path, e))?;
        json.push('\n');
        write_atomic(&path, json.as_bytes())?;
        Ok(path)
    }
}

fn walk(dir: &Path, base: &Path, files: &mut Vec<String>) -> Result<()> {
    let entries = std::fs::read_dir(dir).map_err(|e| GuardError::io(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| GuardError::io(dir, e))?;
        let path = entry.path();
        let Ok(relative) = path.strip_prefix(base) else {
            continue;
        };
        let relative = relative.to_string_lossy().replace('\\', "/");

        let file_type = entry.file_type().map_err(|e| GuardError::io(&path, e))?;
        if file_type.is_dir() {
            let as_dir = format!("{relative}/");
            if PRESERVE.iter().any(|p| as_dir.starts_with(p)) {
                continue;
            }
            walk(&path, base, files)?;
        } else {
            files.push(relative);
        }
    }
    Ok(())
}
