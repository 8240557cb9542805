//! Commit gate: decides whether a pending `git commit` may proceed.
//!
//! For every plugin touched by the commit the manifest version is compared
//! with the one at `HEAD`:
//!
//! - unchanged, only trivial files: nothing to do
//! - unchanged, a significant file: violation
//! - changed (or no previous version): the dependent records are synced and
//!   re-staged; a staging failure is a violation
//!
//! Any violation denies the commit. Infrastructure errors never do: they
//! surface as `Err` and the caller turns them into an allow.

use crate::changes::ChangeSet;
use crate::classify::{Significance, rule_for};
use crate::command::is_commit_command;
use crate::config::Config;
use crate::error::Result;
use crate::git::Repository;
use crate::records::{Version, json};
use crate::sync::SyncEngine;
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// Final verdict for the pending tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow { reason: Option<String> },
    Deny { reason: String },
}

impl Decision {
    pub fn allow(reason: impl Into<String>) -> Self {
        Self::Allow {
            reason: Some(reason.into()),
        }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self::Deny {
            reason: reason.into(),
        }
    }

    pub fn is_allow(&self) -> bool {
        matches!(self, Self::Allow { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Allow { reason } => reason.as_deref(),
            Self::Deny { reason } => Some(reason),
        }
    }
}

/// A plugin that cannot be committed as staged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub plugin: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.plugin, self.message)
    }
}

/// Result of checking one plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginVerdict {
    /// Version unchanged and nothing significant staged (or plugin removed)
    Clean,
    /// Version bumped; these paths were rewritten and staged
    Synced(Vec<String>),
    Violation(Violation),
}

/// Evaluates a pending command against a repository.
pub struct Gate<'a, R: Repository + ?Sized> {
    root: &'a Path,
    config: &'a Config,
    repo: &'a R,
}

impl<'a, R: Repository + ?Sized> Gate<'a, R> {
    pub fn new(root: &'a Path, config: &'a Config, repo: &'a R) -> Self {
        Self { root, config, repo }
    }

    /// Decide on `command`.
    ///
    /// `Err` means the staged files could not be listed; per-plugin problems
    /// are folded into the decision.
    pub fn evaluate(&self, command: &str) -> Result<Decision> {
        if !is_commit_command(command) {
            return Ok(Decision::allow("Not a git commit command"));
        }

        let changes = ChangeSet::inspect(self.repo, command)?;
        if changes.is_empty() {
            return Ok(Decision::allow("No staged files"));
        }

        let plugins = changes.by_plugin(self.config);
        if plugins.is_empty() {
            return Ok(Decision::allow("No plugin files modified"));
        }

        let mut violations = Vec::new();
        let mut synced = Vec::new();
        for (plugin, files) in &plugins {
            match self.check_plugin(plugin, files) {
                PluginVerdict::Clean => {}
                PluginVerdict::Synced(paths) => {
                    synced.extend(paths.into_iter().map(|p| format!("{plugin}: {p}")));
                }
                PluginVerdict::Violation(v) => violations.push(v),
            }
        }

        Ok(aggregate(&violations, &synced))
    }

    /// Check one plugin's staged files against its version history.
    pub fn check_plugin(&self, plugin: &str, files: &[String]) -> PluginVerdict {
        if !self.root.join(self.config.plugin_dir(plugin)).is_dir() {
            debug!("{plugin}: directory removed, skipping");
            return PluginVerdict::Clean;
        }
        let manifest = self.config.manifest_path(plugin);
        let manifest_file = self.root.join(&manifest);
        if !manifest_file.is_file() {
            debug!("{plugin}: no manifest, skipping");
            return PluginVerdict::Clean;
        }

        let current = match json::read_manifest_version(&manifest_file) {
            Ok(raw) => raw,
            Err(e) => {
                debug!("{plugin}: {e}");
                return violation(plugin, format!("Cannot read {manifest}"));
            }
        };
        let version: Version = match current.parse() {
            Ok(v) => v,
            Err(e) => return violation(plugin, format!("{manifest}: {e}")),
        };

        let previous = self
            .repo
            .show_head(&manifest)
            .map_err(|e| debug!("{plugin}: no previous manifest: {e}"))
            .ok()
            .and_then(|content| json::manifest_version_from_str(&content));

        match previous {
            Some(prev) if prev == version => self.check_unbumped(plugin, &version, files),
            _ => {
                info!(
                    "{plugin}: version {} -> {version}",
                    previous.map_or_else(|| "none".to_string(), |p| p.to_string())
                );
                self.sync_and_stage(plugin, &version)
            }
        }
    }

    fn check_unbumped(&self, plugin: &str, version: &Version, files: &[String]) -> PluginVerdict {
        let significant = files.iter().find(|f| {
            let rule = rule_for(f);
            debug!("{f}: {rule:?}");
            rule.significance() == Significance::Significant
        });

        match significant {
            Some(file) => {
                debug!("{plugin}: {file} changed without a version bump");
                violation(
                    plugin,
                    format!(
                        "Code changes detected but version not bumped (still {version}). \
                         Bump the version in plugin.json and the hook will sync the rest."
                    ),
                )
            }
            None => PluginVerdict::Clean,
        }
    }

    fn sync_and_stage(&self, plugin: &str, version: &Version) -> PluginVerdict {
        let report = SyncEngine::new(self.root, self.config).sync(plugin, version);
        let paths = report.modified_paths();
        if paths.is_empty() {
            return PluginVerdict::Clean;
        }

        match self.repo.stage(&paths) {
            Ok(()) => PluginVerdict::Synced(paths),
            Err(e) => violation(
                plugin,
                format!("Synced files were written but could not be staged: {e}"),
            ),
        }
    }
}

fn violation(plugin: &str, message: String) -> PluginVerdict {
    PluginVerdict::Violation(Violation {
        plugin: plugin.to_string(),
        message,
    })
}

fn aggregate(violations: &[Violation], synced: &[String]) -> Decision {
    if !violations.is_empty() {
        let list = violations
            .iter()
            .map(|v| format!("  - {v}"))
            .collect::<Vec<_>>()
            .join("\n");
        return Decision::deny(format!(
            "Version synchronization issues detected:\n\n{list}\n\n\
             Please ensure:\n\
             1. plugin.json version is bumped (PATCH for fixes, MINOR for features)\n\
             2. The hook will sync marketplace.json, SKILL.md files, and docs/memory.md"
        ));
    }

    if synced.is_empty() {
        Decision::allow("Version check passed")
    } else {
        Decision::allow(format!(
            "Version check passed (auto-synced: {})",
            synced.join(", ")
        ))
    }
}
