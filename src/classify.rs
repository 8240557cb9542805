//! Significance classification for staged plugin files.
//!
//! A change is significant when it can alter what the plugin does at runtime.
//! Rules are evaluated in order and the first match wins:
//!
//! 1. skill, agent, hook, manifest, MCP and command definitions: significant
//! 2. readmes, ignore files, `.cache/`, reference docs, examples: trivial
//! 3. anything that is not markdown: significant
//! 4. other markdown: significant unless under `/references/`

use regex::RegexSet;
use std::sync::LazyLock;

static SIGNIFICANT: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"(?i)SKILL\.md$",
        r"(?i)agents/.*\.md$",
        r"(?i)hooks\.json$",
        r"(?i)hooks/.*\.js$",
        r"(?i)plugin\.json$",
        r"(?i)\.mcp\.json$",
        r"(?i)commands/.*\.md$",
    ])
    .expect("valid significant patterns")
});

static TRIVIAL: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"(?i)README\.md$",
        r"(?i)\.gitignore$",
        r"\.cache/",
        r"(?i)references/.*\.md$",
        r"examples/",
    ])
    .expect("valid trivial patterns")
});

/// Whether a changed file requires a version bump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Significance {
    Significant,
    Trivial,
}

/// The rule that decided a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Matched a definition pattern (skill, agent, hook, manifest, ...)
    Definition,
    /// Matched a documentation or scratch pattern
    Documentation,
    /// Not markdown
    Code,
    /// Markdown outside `/references/`
    Markdown,
    /// Markdown under `/references/`
    ReferenceMarkdown,
}

impl Rule {
    pub fn significance(self) -> Significance {
        match self {
            Self::Definition | Self::Code | Self::Markdown => Significance::Significant,
            Self::Documentation | Self::ReferenceMarkdown => Significance::Trivial,
        }
    }
}

/// Classify a repository-relative path.
pub fn classify(path: &str) -> Significance {
    rule_for(path).significance()
}

/// The first rule matching `path`.
pub fn rule_for(path: &str) -> Rule {
    if SIGNIFICANT.is_match(path) {
        Rule::Definition
    } else if TRIVIAL.is_match(path) {
        Rule::Documentation
    } else if !path.ends_with(".md") {
        Rule::Code
    } else if path.contains("/references/") {
        Rule::ReferenceMarkdown
    } else {
        Rule::Markdown
    }
}
