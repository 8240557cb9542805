//! Drift report across a plugin's version records.

use crate::config::Config;
use crate::error::{GuardError, Result};
use crate::records::{self, VersionLocation};
use std::fmt;
use std::path::Path;

/// One record as read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    pub location: VersionLocation,
    pub path: String,
    /// `None` when the file or entry is absent
    pub value: Option<String>,
}

/// Every record of one plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginStatus {
    pub plugin: String,
    pub entries: Vec<StatusEntry>,
}

impl PluginStatus {
    pub fn collect(root: &Path, config: &Config, plugin: &str) -> Self {
        let entries = records::read_locations(root, config, plugin)
            .into_iter()
            .map(|(location, path, value)| StatusEntry {
                location,
                path,
                value,
            })
            .collect();
        Self {
            plugin: plugin.to_string(),
            entries,
        }
    }

    /// Raw manifest version, the value every other record should hold.
    pub fn manifest_version(&self) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.location == VersionLocation::Manifest)
            .and_then(|e| e.value.as_deref())
    }

    /// Present records disagreeing with the manifest. Absent records are not drift.
    pub fn drift(&self) -> Vec<&StatusEntry> {
        let expected = self.manifest_version();
        self.entries
            .iter()
            .filter(|e| e.location != VersionLocation::Manifest)
            .filter(|e| e.value.is_some() && e.value.as_deref() != expected)
            .collect()
    }

    /// Manifest readable and no drift.
    pub fn is_consistent(&self) -> bool {
        self.manifest_version().is_some() && self.drift().is_empty()
    }
}

impl fmt::Display for PluginStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} {}",
            self.plugin,
            self.manifest_version().unwrap_or("(unreadable manifest)")
        )?;
        let expected = self.manifest_version();
        for entry in &self.entries {
            let value = entry.value.as_deref().unwrap_or("-");
            let mark = match entry.value.as_deref() {
                Some(v) if Some(v) != expected => "  drift",
                _ => "",
            };
            writeln!(
                f,
                "  {:<24} {:<8} {}{mark}",
                entry.location.to_string(),
                value,
                entry.path
            )?;
        }
        Ok(())
    }
}

/// Status of `plugin`, or of every plugin when `None`.
pub fn collect(root: &Path, config: &Config, plugin: Option<&str>) -> Result<Vec<PluginStatus>> {
    let names = match plugin {
        Some(name) => {
            if !root.join(config.plugin_dir(name)).is_dir() {
                return Err(GuardError::PluginNotFound(config.plugin_dir(name)));
            }
            vec![name.to_string()]
        }
        None => records::plugin_names(root, config)?,
    };

    Ok(names
        .iter()
        .map(|name| PluginStatus::collect(root, config, name))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("plugins/foo/.claude-plugin")).unwrap();
        fs::create_dir_all(root.join("plugins/foo/skills/foo-dev")).unwrap();
        fs::create_dir_all(root.join("plugins/bar/.claude-plugin")).unwrap();
        fs::create_dir_all(root.join(".claude-plugin")).unwrap();
        fs::write(
            root.join("plugins/foo/.claude-plugin/plugin.json"),
            r#"{"name":"foo","version":"1.2.1"}"#,
        )
        .unwrap();
        fs::write(
            root.join("plugins/bar/.claude-plugin/plugin.json"),
            r#"{"name":"bar","version":"0.1.0"}"#,
        )
        .unwrap();
        fs::write(
            root.join("plugins/foo/skills/foo-dev/SKILL.md"),
            "---\nversion: 1.2.0\n---\n",
        )
        .unwrap();
        fs::write(
            root.join(".claude-plugin/marketplace.json"),
            r#"{"plugins":[{"name":"foo","version":"1.2.1"},{"name":"bar","version":"0.1.0"}]}"#,
        )
        .unwrap();
        dir
    }

    #[test]
    fn drift_lists_disagreeing_records() {
        let dir = fixture();
        let status = PluginStatus::collect(dir.path(), &Config::default(), "foo");

        assert_eq!(status.manifest_version(), Some("1.2.1"));
        let drift = status.drift();
        assert_eq!(drift.len(), 1);
        assert_eq!(drift[0].location, VersionLocation::Skill("foo-dev".into()));
        assert!(!status.is_consistent());
    }

    #[test]
    fn absent_records_are_not_drift() {
        let dir = fixture();
        let status = PluginStatus::collect(dir.path(), &Config::default(), "bar");
        assert!(status.is_consistent());
        let doc = status
            .entries
            .iter()
            .find(|e| e.location == VersionLocation::DocTable)
            .unwrap();
        assert_eq!(doc.value, None);
    }

    #[test]
    fn collect_all_plugins_sorted() {
        let dir = fixture();
        let all = collect(dir.path(), &Config::default(), None).unwrap();
        let names: Vec<_> = all.iter().map(|s| s.plugin.as_str()).collect();
        assert_eq!(names, ["bar", "foo"]);
    }

    #[test]
    fn unknown_plugin_is_an_error() {
        let dir = fixture();
        assert!(matches!(
            collect(dir.path(), &Config::default(), Some("baz")),
            Err(GuardError::PluginNotFound(_))
        ));
    }

    #[test]
    fn display_marks_drift() {
        let dir = fixture();
        let text = PluginStatus::collect(dir.path(), &Config::default(), "foo").to_string();
        assert!(text.starts_with("foo 1.2.1\n"));
        assert!(text.lines().any(|l| l.contains("skill foo-dev") && l.ends_with("drift")));
    }
}
