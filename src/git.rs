//! Version-control access.
//!
//! The gate only needs three queries, so they sit behind [`Repository`] and
//! the real implementation shells out to `git`. Tests substitute an in-memory
//! repository.

use crate::error::{GuardError, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::trace;

/// The version-control operations the guard depends on.
pub trait Repository {
    /// Repository-relative paths currently staged in the index.
    fn staged_files(&self) -> Result<Vec<String>>;

    /// Content of `path` at `HEAD`.
    fn show_head(&self, path: &str) -> Result<String>;

    /// Add `paths` to the index.
    fn stage(&self, paths: &[String]) -> Result<()>;
}

/// [`Repository`] backed by the `git` binary, run in `root`.
#[derive(Debug, Clone)]
pub struct GitCli {
    root: PathBuf,
}

impl GitCli {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn run_git(&self, args: &[&str]) -> Result<String> {
        trace!("git {}", args.join(" "));
        let command = args.first().copied().unwrap_or_default().to_string();

        // Non-ASCII paths come back verbatim instead of C-quoted
        let output = Command::new("git")
            .args(["-c", "core.quotePath=false"])
            .args(args)
            .current_dir(&self.root)
            .output()
            .map_err(|e| GuardError::Git {
                command: command.clone(),
                message: e.to_string(),
            })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(GuardError::Git {
                command,
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

impl Repository for GitCli {
    fn staged_files(&self) -> Result<Vec<String>> {
        let output = self.run_git(&["diff", "--cached", "--name-only", "-z"])?;
        Ok(split_name_list(&output))
    }

    fn show_head(&self, path: &str) -> Result<String> {
        self.run_git(&["show", &format!("HEAD:{}", to_git_path(path))])
    }

    fn stage(&self, paths: &[String]) -> Result<()> {
        if paths.is_empty() {
            return Ok(());
        }
        let mut args = vec!["add", "--"];
        args.extend(paths.iter().map(String::as_str));
        self.run_git(&args).map(|_| ())
    }
}

/// Paths from a `-z` name list, which are NUL-terminated and never quoted.
fn split_name_list(output: &str) -> Vec<String> {
    output
        .split('\0')
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

/// Git object paths always use forward slashes.
pub fn to_git_path(path: &str) -> String {
    path.replace('\\', "/")
}
