//! The four places a plugin version is recorded, and how to read and rewrite each.
//!
//! - `plugins/<name>/.claude-plugin/plugin.json` (the source of truth)
//! - the marketplace catalog entry for `<name>`
//! - the `version:` key of every `skills/*/SKILL.md` frontmatter block
//! - the `| <name> | X.Y.Z |` row of the documentation table

pub mod frontmatter;
pub mod json;
pub mod table;

use crate::config::Config;
use crate::error::{GuardError, Result};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

// ---------------------------------------------------------------------------
// Version
// ---------------------------------------------------------------------------

/// A `MAJOR.MINOR.PATCH` version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl FromStr for Version {
    type Err = GuardError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || GuardError::InvalidVersion(s.to_string());

        let mut parts = s.split('.');
        let mut next = || -> Result<u64> {
            let part = parts.next().ok_or_else(invalid)?;
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            // `1.02.0` would be written back as `1.2.0`
            if part.len() > 1 && part.starts_with('0') {
                return Err(invalid());
            }
            part.parse().map_err(|_| invalid())
        };

        let version = Self::new(next()?, next()?, next()?);
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(version)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

// ---------------------------------------------------------------------------
// Edits
// ---------------------------------------------------------------------------

/// Result of rewriting one version record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// The record was rewritten; `old` is the previous raw value, if any.
    Updated { old: Option<String> },
    /// The record already holds the requested version.
    Unchanged,
    /// The file exists but holds no record for this plugin.
    NotFound,
    /// The file itself does not exist.
    NoFile,
}

// ---------------------------------------------------------------------------
// Locations
// ---------------------------------------------------------------------------

/// One of the records that carries a plugin's version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionLocation {
    Manifest,
    Catalog,
    /// Frontmatter of the named skill's definition file
    Skill(String),
    DocTable,
}

impl fmt::Display for VersionLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Manifest => write!(f, "plugin manifest"),
            Self::Catalog => write!(f, "marketplace catalog"),
            Self::Skill(name) => write!(f, "skill {name}"),
            Self::DocTable => write!(f, "documentation table"),
        }
    }
}

/// Names of skill directories containing a skill definition file, sorted.
pub fn skill_names(root: &Path, config: &Config, plugin: &str) -> Vec<String> {
    let dir = root.join(config.skills_path(plugin));
    let Ok(entries) = std::fs::read_dir(&dir) else {
        return Vec::new();
    };

    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_ok_and(|t| t.is_dir()))
        .filter_map(|e| e.file_name().to_str().map(String::from))
        .filter(|name| root.join(config.skill_path(plugin, name)).is_file())
        .collect();
    names.sort();
    names
}

/// Plugin directory names under the plugins dir, sorted.
pub fn plugin_names(root: &Path, config: &Config) -> Result<Vec<String>> {
    let dir = root.join(&config.plugins_dir);
    let entries = std::fs::read_dir(&dir).map_err(|e| GuardError::io(&dir, e))?;

    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_ok_and(|t| t.is_dir()))
        .filter_map(|e| e.file_name().to_str().map(String::from))
        .collect();
    names.sort();
    Ok(names)
}

/// Read every location of `plugin` as raw strings. `None` means absent.
pub fn read_locations(
    root: &Path,
    config: &Config,
    plugin: &str,
) -> Vec<(VersionLocation, String, Option<String>)> {
    let mut out = Vec::new();

    let manifest = config.manifest_path(plugin);
    let value = json::read_manifest_version(&root.join(&manifest))
        .map_err(|e| debug!("{e}"))
        .ok();
    out.push((VersionLocation::Manifest, manifest, value));

    let catalog = config.marketplace.clone();
    let value = json::read_catalog_version(&root.join(&catalog), plugin);
    out.push((VersionLocation::Catalog, catalog, value));

    for skill in skill_names(root, config, plugin) {
        let path = config.skill_path(plugin, &skill);
        let value = read_to_string(&root.join(&path))
            .ok()
            .and_then(|content| frontmatter::read_version(&content));
        out.push((VersionLocation::Skill(skill), path, value));
    }

    let doc = config.doc_table.clone();
    let value = read_to_string(&root.join(&doc))
        .ok()
        .and_then(|content| table::read_version(&content, plugin));
    out.push((VersionLocation::DocTable, doc, value));

    out
}

// ---------------------------------------------------------------------------
// File IO
// ---------------------------------------------------------------------------

pub(crate) fn read_to_string(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| GuardError::io(path, e))
}

/// Write bytes to a file atomically: write to a temp file in the same
/// directory, then rename over the target.
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    use std::io::Write;

    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let write = || -> std::io::Result<()> {
        let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
        tmp.write_all(data)?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    };
    write().map_err(|e| GuardError::io(path, e))
}
