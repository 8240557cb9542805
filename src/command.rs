//! Shell command inspection for the pending Bash tool call.
//!
//! The hook runs before the command executes, so `git add X && git commit`
//! has not staged `X` yet. These helpers recover what the command is about to do.

use regex::Regex;
use std::sync::LazyLock;

static COMMIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"git\s+commit").expect("valid commit regex"));

static ADD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"git\s+add\s+([^&|;]+)").expect("valid add regex"));

/// Whether the command contains a `git commit` invocation anywhere.
pub fn is_commit_command(command: &str) -> bool {
    COMMIT_RE.is_match(command)
}

/// Paths named explicitly by `git add` invocations in the command.
///
/// An invocation whose argument list starts with a flag (`-A`, `-u`) or is
/// exactly `.` stages an unknown set of files and contributes nothing.
/// Flag tokens after the first path are dropped. Matching quotes are stripped.
pub fn pending_adds(command: &str) -> Vec<String> {
    let mut paths = Vec::new();

    for caps in ADD_RE.captures_iter(command) {
        let args = caps[1].trim();
        if args.starts_with('-') || args == "." {
            continue;
        }

        for token in args.split_whitespace() {
            if token.starts_with('-') {
                continue;
            }
            let path = unquote(token);
            if !path.is_empty() && !paths.iter().any(|p| p == path) {
                paths.push(path.to_string());
            }
        }
    }

    paths
}

fn unquote(token: &str) -> &str {
    let quoted = token.len() >= 2
        && ((token.starts_with('"') && token.ends_with('"'))
            || (token.starts_with('\'') && token.ends_with('\'')));
    if quoted {
        &token[1..token.len() - 1]
    } else {
        token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_commit() {
        assert!(is_commit_command("git commit -m 'fix'"));
        assert!(is_commit_command("git add a.js && git   commit -m x"));
        assert!(!is_commit_command("git status"));
        assert!(!is_commit_command("git push origin main"));
        assert!(!is_commit_command(""));
    }

    #[test]
    fn add_then_commit_lists_paths() {
        assert_eq!(
            pending_adds("git add plugins/foo/hooks/bar.js docs/memory.md && git commit -m x"),
            vec!["plugins/foo/hooks/bar.js", "docs/memory.md"]
        );
    }

    #[test]
    fn add_all_flags_are_ignored() {
        assert!(pending_adds("git add -A && git commit -m x").is_empty());
        assert!(pending_adds("git add . && git commit -m x").is_empty());
        assert!(pending_adds("git add -u; git commit").is_empty());
    }

    #[test]
    fn flag_tokens_after_paths_are_dropped() {
        assert_eq!(
            pending_adds("git add a.md -f b.md | cat"),
            vec!["a.md", "b.md"]
        );
    }

    #[test]
    fn quotes_are_stripped_and_duplicates_merged() {
        assert_eq!(
            pending_adds("git add \"a.md\" 'b.md' a.md && git commit"),
            vec!["a.md", "b.md"]
        );
    }

    #[test]
    fn multiple_add_invocations() {
        assert_eq!(
            pending_adds("git add a.md && git add -A && git add b.js; git commit"),
            vec!["a.md", "b.js"]
        );
    }

    #[test]
    fn no_add_means_no_paths() {
        assert!(pending_adds("git commit -am 'x'").is_empty());
    }
}
