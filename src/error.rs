//! Error taxonomy shared by the hook and the CLI subcommands

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while inspecting or rewriting version records
#[derive(Error, Debug)]
pub enum GuardError {
    #[error("invalid hook input: {0}")]
    InvalidInput(#[source] serde_json::Error),

    #[error("git {command} failed: {message}")]
    Git { command: String, message: String },

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no version field in {}", .0.display())]
    MissingVersion(PathBuf),

    #[error("invalid version \"{0}\", expected MAJOR.MINOR.PATCH")]
    InvalidVersion(String),

    #[error("plugin directory not found: {0}")]
    PluginNotFound(String),
}

impl GuardError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, GuardError>;
