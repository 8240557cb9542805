//! plugsync — version synchronization guard for Claude Code plugin marketplaces
//!
//! A plugin's version lives in four places: its manifest, the marketplace
//! catalog, every skill's frontmatter and the documentation table. The
//! `PreToolUse` hook in [`hook`] stops commits that change a plugin without
//! bumping its manifest, and syncs the other three records when it was bumped.

pub mod changes;
pub mod classify;
pub mod command;
pub mod config;
pub mod error;
pub mod gate;
pub mod git;
pub mod hook;
pub mod inventory;
pub mod records;
pub mod status;
pub mod sync;

pub use error::{GuardError, Result};
pub use gate::{Decision, Gate};
pub use records::{Version, VersionLocation};
