//! Claude Code `PreToolUse` hook handler
//!
//! Reads the hook JSON from stdin, runs the commit gate, and prints exactly
//! one response line. The process always exits 0; the decision travels in
//! the JSON body.
//!
//! # Claude Code hooks config:
//! ```json
//! {
//!   "matcher": "Bash",
//!   "hooks": [{ "type": "command", "command": "plugsync hook" }]
//! }
//! ```

use crate::config::load_config;
use crate::error::{GuardError, Result};
use crate::gate::{Decision, Gate};
use crate::git::GitCli;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// The parts of a `PreToolUse` payload the gate reads. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HookInput {
    #[serde(default)]
    pub hook_event_name: Option<String>,
    #[serde(default)]
    pub tool_name: Option<String>,
    #[serde(default)]
    pub tool_input: Option<Value>,
    #[serde(default)]
    pub cwd: Option<String>,
}

impl HookInput {
    /// The pending Bash command, or `""` when there is none.
    pub fn command(&self) -> &str {
        self.tool_input
            .as_ref()
            .and_then(|v| v.get("command"))
            .and_then(Value::as_str)
            .unwrap_or("")
    }
}

/// Parse stdin. Blank input is an empty payload.
pub fn parse_input(input: &str) -> Result<HookInput> {
    if input.trim().is_empty() {
        return Ok(HookInput::default());
    }
    serde_json::from_str(input).map_err(GuardError::InvalidInput)
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionDecision {
    Allow,
    Deny,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HookSpecificOutput {
    pub hook_event_name: &'static str,
    pub permission_decision: PermissionDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission_decision_reason: Option<String>,
}

/// Response envelope expected by Claude Code for `PreToolUse` hooks.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HookOutput {
    pub hook_specific_output: HookSpecificOutput,
}

impl From<Decision> for HookOutput {
    fn from(decision: Decision) -> Self {
        let (permission_decision, reason) = match decision {
            Decision::Allow { reason } => (PermissionDecision::Allow, reason),
            Decision::Deny { reason } => (PermissionDecision::Deny, Some(reason)),
        };
        Self {
            hook_specific_output: HookSpecificOutput {
                hook_event_name: "PreToolUse",
                permission_decision,
                permission_decision_reason: reason,
            },
        }
    }
}

impl HookOutput {
    /// Single-line JSON form.
    pub fn to_json_line(&self) -> String {
        // Serializing plain strings and enums cannot fail.
        serde_json::to_string(self).unwrap_or_else(|_| {
            r#"{"hookSpecificOutput":{"hookEventName":"PreToolUse","permissionDecision":"allow"}}"#
                .to_string()
        })
    }
}

// ---------------------------------------------------------------------------
// Processing
// ---------------------------------------------------------------------------

/// Run the gate on raw hook input. Errors are returned, not swallowed.
///
/// Relative paths resolve against the payload's `cwd`, falling back to `root`.
pub fn decide(input: &str, root: &Path) -> Result<Decision> {
    let hook = parse_input(input)?;
    let command = hook.command();
    debug!(
        "{} {}: {command}",
        hook.hook_event_name.as_deref().unwrap_or("?"),
        hook.tool_name.as_deref().unwrap_or("?")
    );

    let root = hook
        .cwd
        .as_deref()
        .filter(|c| !c.is_empty())
        .map_or_else(|| root.to_path_buf(), PathBuf::from);
    let config = load_config(&root);
    let repo = GitCli::new(&root);
    Gate::new(&root, &config, &repo).evaluate(command)
}

/// Map a failed evaluation to an allow that names the cause.
pub fn fail_open(error: &GuardError) -> Decision {
    warn!("allowing after error: {error}");
    match error {
        GuardError::Git { .. } => Decision::allow("Not in a git repo or no staged files"),
        other => Decision::allow(format!(
            "Error during check, allowing to avoid blocking: {other}"
        )),
    }
}

/// Process raw hook input into the response envelope. Never fails.
pub fn process_hook_input(input: &str, root: &Path) -> HookOutput {
    decide(input, root)
        .unwrap_or_else(|e| fail_open(&e))
        .into()
}

/// Entry point for `plugsync hook`.
pub fn run(root: &Path) {
    use std::io::Read;

    let mut input = String::new();
    let output = match std::io::stdin().read_to_string(&mut input) {
        Ok(_) => process_hook_input(&input, root),
        Err(e) => {
            warn!("failed to read stdin: {e}");
            Decision::allow("Stdin error, allowing to avoid blocking").into()
        }
    };
    println!("{}", output.to_json_line());
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Input tests ====================

    #[test]
    fn command_extracted_from_tool_input() {
        let hook = parse_input(
            r#"{
                "hook_event_name": "PreToolUse",
                "session_id": "s1",
                "cwd": "/tmp/repo",
                "tool_name": "Bash",
                "tool_input": {"command": "git commit -m 'x'", "description": "Commit"}
            }"#,
        )
        .unwrap();

        assert_eq!(hook.command(), "git commit -m 'x'");
        assert_eq!(hook.cwd.as_deref(), Some("/tmp/repo"));
        assert_eq!(hook.tool_name.as_deref(), Some("Bash"));
    }

    #[test]
    fn missing_command_is_empty() {
        assert_eq!(parse_input("{}").unwrap().command(), "");
        assert_eq!(
            parse_input(r#"{"tool_input": {"file_path": "a.rs"}}"#)
                .unwrap()
                .command(),
            ""
        );
        assert_eq!(parse_input(r#"{"tool_input": "oops"}"#).unwrap().command(), "");
    }

    #[test]
    fn blank_input_is_empty_payload() {
        assert_eq!(parse_input("  \n").unwrap().command(), "");
    }

    #[test]
    fn invalid_json_is_an_input_error() {
        assert!(matches!(
            parse_input("not valid json"),
            Err(GuardError::InvalidInput(_))
        ));
    }

    // ==================== Output tests ====================

    #[test]
    fn allow_envelope() {
        let out: HookOutput = Decision::allow("Version check passed").into();
        assert_eq!(
            out.to_json_line(),
            r#"{"hookSpecificOutput":{"hookEventName":"PreToolUse","permissionDecision":"allow","permissionDecisionReason":"Version check passed"}}"#
        );
    }

    #[test]
    fn allow_without_reason_omits_field() {
        let out: HookOutput = Decision::Allow { reason: None }.into();
        assert_eq!(
            out.to_json_line(),
            r#"{"hookSpecificOutput":{"hookEventName":"PreToolUse","permissionDecision":"allow"}}"#
        );
    }

    #[test]
    fn deny_envelope_is_one_line() {
        let out: HookOutput = Decision::deny("line one\nline two").into();
        let json = out.to_json_line();
        assert!(!json.contains('\n'));
        assert!(json.contains(r#""permissionDecision":"deny""#));
        assert!(json.contains(r#"line one\nline two"#));
    }

    // ==================== Processing tests ====================

    #[test]
    fn non_commit_command_allows() {
        let dir = tempfile::TempDir::new().unwrap();
        let out = process_hook_input(
            r#"{"tool_name":"Bash","tool_input":{"command":"ls -la"}}"#,
            dir.path(),
        );
        let spec = out.hook_specific_output;
        assert_eq!(spec.permission_decision, PermissionDecision::Allow);
        assert_eq!(
            spec.permission_decision_reason.as_deref(),
            Some("Not a git commit command")
        );
    }

    #[test]
    fn malformed_input_fails_open() {
        let dir = tempfile::TempDir::new().unwrap();
        let out = process_hook_input("{ not json", dir.path());
        let spec = out.hook_specific_output;
        assert_eq!(spec.permission_decision, PermissionDecision::Allow);
        assert!(
            spec.permission_decision_reason
                .unwrap()
                .starts_with("Error during check")
        );
    }

    #[test]
    fn git_failure_fails_open() {
        let decision = fail_open(&GuardError::Git {
            command: "diff".into(),
            message: "not a git repository".into(),
        });
        assert_eq!(
            decision,
            Decision::allow("Not in a git repo or no staged files")
        );
    }
}
