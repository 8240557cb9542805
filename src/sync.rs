//! Propagation of a plugin version to its dependent records.
//!
//! The manifest is the source of truth; [`SyncEngine::sync`] brings the
//! catalog entry, every skill frontmatter and the documentation table row in
//! line with it. Each record is rewritten in place and only when it differs,
//! so a second run with the same version changes nothing.

use crate::config::Config;
use crate::error::{GuardError, Result};
use crate::records::{self, Edit, Version, VersionLocation, frontmatter, json, table};
use std::path::Path;
use tracing::{debug, info, warn};

/// One record whose version was rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncChange {
    pub location: VersionLocation,
    /// Repository-relative path of the rewritten file
    pub path: String,
    pub old: Option<String>,
    pub new: String,
}

/// What happened at one location.
#[derive(Debug)]
pub struct LocationReport {
    pub location: VersionLocation,
    pub path: String,
    pub outcome: Result<Edit>,
}

/// Per-location results of one sync.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub version: Option<Version>,
    pub locations: Vec<LocationReport>,
}

impl SyncReport {
    /// Records that were rewritten, in the order they were visited.
    pub fn changes(&self) -> Vec<SyncChange> {
        let new = self.version.map(|v| v.to_string()).unwrap_or_default();
        self.locations
            .iter()
            .filter_map(|r| match &r.outcome {
                Ok(Edit::Updated { old }) => Some(SyncChange {
                    location: r.location.clone(),
                    path: r.path.clone(),
                    old: old.clone(),
                    new: new.clone(),
                }),
                _ => None,
            })
            .collect()
    }

    /// Distinct paths that were written and need staging.
    pub fn modified_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = Vec::new();
        for change in self.changes() {
            if !paths.contains(&change.path) {
                paths.push(change.path);
            }
        }
        paths
    }

    /// Locations that could not be read or written.
    pub fn failures(&self) -> impl Iterator<Item = (&LocationReport, &GuardError)> {
        self.locations
            .iter()
            .filter_map(|r| r.outcome.as_ref().err().map(|e| (r, e)))
    }

    pub fn outcome(&self, location: &VersionLocation) -> Option<&Result<Edit>> {
        self.locations
            .iter()
            .find(|r| &r.location == location)
            .map(|r| &r.outcome)
    }
}

enum TextEdit {
    Rewrite { content: String, old: String },
    Unchanged,
    /// The file has no version record for this plugin
    Missing,
}

/// Rewrites version records under a repository root.
pub struct SyncEngine<'a> {
    root: &'a Path,
    config: &'a Config,
}

impl<'a> SyncEngine<'a> {
    pub fn new(root: &'a Path, config: &'a Config) -> Self {
        Self { root, config }
    }

    /// Set the manifest itself to `version`.
    pub fn set_manifest(&self, plugin: &str, version: &Version) -> LocationReport {
        let path = self.config.manifest_path(plugin);
        let outcome = json::write_manifest_version(&self.root.join(&path), version);
        log_outcome(plugin, &VersionLocation::Manifest, &path, &outcome);
        LocationReport {
            location: VersionLocation::Manifest,
            path,
            outcome,
        }
    }

    /// Propagate `version` to the catalog, skill frontmatter and doc table.
    pub fn sync(&self, plugin: &str, version: &Version) -> SyncReport {
        let mut report = SyncReport {
            version: Some(*version),
            locations: Vec::new(),
        };
        let new = version.to_string();

        let path = self.config.marketplace.clone();
        let outcome = json::write_catalog_version(&self.root.join(&path), plugin, version);
        self.push(&mut report, plugin, VersionLocation::Catalog, path, outcome);

        for skill in records::skill_names(self.root, self.config, plugin) {
            let path = self.config.skill_path(plugin, &skill);
            let outcome = self.rewrite_text(&path, |content| {
                match frontmatter::read_version(content) {
                    None => TextEdit::Missing,
                    Some(old) => match frontmatter::rewrite_version(content, &new) {
                        Some(content) => TextEdit::Rewrite { content, old },
                        None => TextEdit::Unchanged,
                    },
                }
            });
            self.push(&mut report, plugin, VersionLocation::Skill(skill), path, outcome);
        }

        let path = self.config.doc_table.clone();
        let outcome = self.rewrite_text(&path, |content| {
            match table::read_version(content, plugin) {
                None => TextEdit::Missing,
                Some(old) => match table::rewrite_version(content, plugin, &new) {
                    Some(content) => TextEdit::Rewrite { content, old },
                    None => TextEdit::Unchanged,
                },
            }
        });
        self.push(&mut report, plugin, VersionLocation::DocTable, path, outcome);

        report
    }

    fn push(
        &self,
        report: &mut SyncReport,
        plugin: &str,
        location: VersionLocation,
        path: String,
        outcome: Result<Edit>,
    ) {
        log_outcome(plugin, &location, &path, &outcome);
        report.locations.push(LocationReport {
            location,
            path,
            outcome,
        });
    }

    /// Apply a text rewrite to a file, writing only when the content changes.
    fn rewrite_text<F>(&self, path: &str, rewrite: F) -> Result<Edit>
    where
        F: FnOnce(&str) -> TextEdit,
    {
        let full = self.root.join(path);
        if !full.is_file() {
            return Ok(Edit::NoFile);
        }
        let content = records::read_to_string(&full)?;
        match rewrite(&content) {
            TextEdit::Rewrite { content, old } => {
                records::write_atomic(&full, content.as_bytes())?;
                Ok(Edit::Updated { old: Some(old) })
            }
            TextEdit::Unchanged => Ok(Edit::Unchanged),
            TextEdit::Missing => Ok(Edit::NotFound),
        }
    }
}

// ---------------------------------------------------------------------------
// Manual sync
// ---------------------------------------------------------------------------

/// All four records set to one version, as run by `plugsync sync`.
#[derive(Debug)]
pub struct ManualSync {
    pub plugin: String,
    pub manifest: LocationReport,
    pub report: SyncReport,
}

impl ManualSync {
    /// Set the manifest, then propagate. Fails only if the plugin directory is missing.
    pub fn run(root: &Path, config: &Config, plugin: &str, version: &Version) -> Result<Self> {
        if !root.join(config.plugin_dir(plugin)).is_dir() {
            let available = records::plugin_names(root, config).unwrap_or_default();
            return Err(GuardError::PluginNotFound(format!(
                "{}/ (available: {})",
                config.plugin_dir(plugin),
                available.join(", ")
            )));
        }

        let engine = SyncEngine::new(root, config);
        Ok(Self {
            plugin: plugin.to_string(),
            manifest: engine.set_manifest(plugin, version),
            report: engine.sync(plugin, version),
        })
    }

    /// Failed locations, a missing manifest or catalog entry, and a missing
    /// doc table file. A doc table without the plugin's row is not an error.
    pub fn error_count(&self) -> usize {
        let required_missing = [&self.manifest.outcome]
            .into_iter()
            .chain(self.report.outcome(&VersionLocation::Catalog))
            .filter(|o| matches!(o, Ok(Edit::NotFound | Edit::NoFile)))
            .count();
        let doc_missing = usize::from(matches!(
            self.report.outcome(&VersionLocation::DocTable),
            Some(Ok(Edit::NoFile))
        ));
        let failed = usize::from(self.manifest.outcome.is_err()) + self.report.failures().count();
        required_missing + doc_missing + failed
    }

    /// One human-readable line per location.
    pub fn summary(&self) -> Vec<String> {
        let new = self
            .report
            .version
            .map(|v| v.to_string())
            .unwrap_or_default();
        let mut lines = vec![describe(&self.manifest, &new)];

        let mut skills_updated = 0;
        let mut skills_seen = false;
        for r in &self.report.locations {
            match r.location {
                VersionLocation::Skill(_) => {
                    skills_seen = true;
                    match &r.outcome {
                        Ok(Edit::Updated { .. }) => skills_updated += 1,
                        Err(_) => lines.push(describe(r, &new)),
                        _ => {}
                    }
                }
                _ => lines.push(describe(r, &new)),
            }
        }
        if skills_seen {
            lines.push(format!("skill files: {skills_updated} updated"));
        }
        lines
    }
}

fn describe(r: &LocationReport, new: &str) -> String {
    match &r.outcome {
        Ok(Edit::Updated { old }) => format!(
            "{}: {} -> {new}",
            r.path,
            old.as_deref().unwrap_or("none")
        ),
        Ok(Edit::Unchanged) => format!("{}: already at {new}", r.path),
        Ok(Edit::NotFound) if r.location == VersionLocation::DocTable => {
            format!("{}: no matching row found (update manually)", r.path)
        }
        Ok(Edit::NotFound) => format!("{}: no {} record", r.path, r.location),
        Ok(Edit::NoFile) => format!("{}: error: file not found", r.path),
        Err(e) => format!("{}: error: {e}", r.path),
    }
}

fn log_outcome(plugin: &str, location: &VersionLocation, path: &str, outcome: &Result<Edit>) {
    match outcome {
        Ok(Edit::Updated { old }) => info!(
            "{plugin}: synced {location} ({path}) from {}",
            old.as_deref().unwrap_or("none")
        ),
        Ok(Edit::Unchanged) => debug!("{plugin}: {location} already current"),
        Ok(Edit::NotFound) => debug!("{plugin}: no {location} record in {path}"),
        Ok(Edit::NoFile) => debug!("{plugin}: {path} does not exist"),
        Err(e) => warn!("{plugin}: cannot sync {location}: {e}"),
    }
}
