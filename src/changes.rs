//! Files about to be committed, grouped by owning plugin.

use crate::command::pending_adds;
use crate::config::Config;
use crate::error::Result;
use crate::git::Repository;
use std::collections::BTreeMap;

/// Paths that will be part of the pending commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    files: Vec<String>,
}

impl ChangeSet {
    /// Staged files plus anything `command` adds explicitly before committing.
    pub fn inspect<R: Repository + ?Sized>(repo: &R, command: &str) -> Result<Self> {
        let mut files = repo.staged_files()?;
        for path in pending_adds(command) {
            if !files.contains(&path) {
                files.push(path);
            }
        }
        Ok(Self { files })
    }

    pub fn from_files(files: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            files: files.into_iter().map(Into::into).collect(),
        }
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Changed files keyed by plugin name. Files outside the plugins dir are dropped.
    pub fn by_plugin(&self, config: &Config) -> BTreeMap<String, Vec<String>> {
        let mut plugins: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for file in &self.files {
            if let Some(name) = config.owning_plugin(file) {
                plugins
                    .entry(name.to_string())
                    .or_default()
                    .push(file.clone());
            }
        }
        plugins
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GuardError;

    struct Staged(Vec<&'static str>);

    impl Repository for Staged {
        fn staged_files(&self) -> Result<Vec<String>> {
            Ok(self.0.iter().map(|s| s.to_string()).collect())
        }
        fn show_head(&self, path: &str) -> Result<String> {
            Err(GuardError::Git {
                command: "show".into(),
                message: format!("no {path}"),
            })
        }
        fn stage(&self, _paths: &[String]) -> Result<()> {
            Ok(())
        }
    }

    struct Broken;

    impl Repository for Broken {
        fn staged_files(&self) -> Result<Vec<String>> {
            Err(GuardError::Git {
                command: "diff".into(),
                message: "not a git repository".into(),
            })
        }
        fn show_head(&self, _path: &str) -> Result<String> {
            unreachable!()
        }
        fn stage(&self, _paths: &[String]) -> Result<()> {
            unreachable!()
        }
    }

    #[test]
    fn pending_adds_are_merged_without_duplicates() {
        let repo = Staged(vec!["plugins/foo/a.js"]);
        let changes = ChangeSet::inspect(
            &repo,
            "git add plugins/foo/a.js plugins/bar/b.js && git commit -m x",
        )
        .unwrap();
        assert_eq!(changes.files(), ["plugins/foo/a.js", "plugins/bar/b.js"]);
    }

    #[test]
    fn repository_failure_propagates() {
        assert!(ChangeSet::inspect(&Broken, "git commit").is_err());
    }

    #[test]
    fn files_are_grouped_by_plugin() {
        let changes = ChangeSet::from_files([
            "plugins/foo/hooks/a.js",
            "README.md",
            "plugins/bar/README.md",
            "plugins/foo/skills/x/SKILL.md",
            ".claude-plugin/marketplace.json",
        ]);
        let groups = changes.by_plugin(&Config::default());

        assert_eq!(groups.len(), 2);
        assert_eq!(
            groups["foo"],
            ["plugins/foo/hooks/a.js", "plugins/foo/skills/x/SKILL.md"]
        );
        assert_eq!(groups["bar"], ["plugins/bar/README.md"]);
    }

    #[test]
    fn empty_change_set() {
        let changes = ChangeSet::inspect(&Staged(vec![]), "git commit -m x").unwrap();
        assert!(changes.is_empty());
        assert!(changes.by_plugin(&Config::default()).is_empty());
    }
}
