//! `---`-delimited metadata block at the top of a skill definition.
//!
//! The block is split into lines and a single top-level key is rewritten in
//! place. Everything outside that one line is reproduced byte for byte.

/// A document split around its frontmatter block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frontmatter<'a> {
    /// Opening delimiter including its line ending
    open: &'a str,
    /// Block lines, each including its line ending
    lines: Vec<&'a str>,
    /// Closing delimiter and the rest of the document
    rest: &'a str,
}

impl<'a> Frontmatter<'a> {
    /// Split `content`, or `None` if it does not open with a closed block.
    pub fn parse(content: &'a str) -> Option<Self> {
        let first_len = content.find('\n').map_or(content.len(), |i| i + 1);
        let (open, body) = content.split_at(first_len);
        if open.trim_end_matches(['\r', '\n']) != "---" || open == "---" {
            return None;
        }

        let mut lines = Vec::new();
        let mut offset = 0;
        for line in body.split_inclusive('\n') {
            if line.trim_end_matches(['\r', '\n']) == "---" {
                return Some(Self {
                    open,
                    lines,
                    rest: &body[offset..],
                });
            }
            lines.push(line);
            offset += line.len();
        }
        None
    }

    /// Trimmed value of a top-level `key: value` line, unquoted.
    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.lines.iter().find_map(|line| {
            let value = value_of(line, key)?;
            let value = strip_quotes(value.trim());
            (!value.is_empty()).then_some(value)
        })
    }

    /// Render the document with the first `key` line set to `value`.
    ///
    /// Returns `None` when the key is absent or already holds `value`.
    pub fn with_value(&self, key: &str, value: &str) -> Option<String> {
        let index = self
            .lines
            .iter()
            .position(|line| value_of(line, key).is_some())?;
        let line = self.lines[index];
        if value_of(line, key).map(|v| strip_quotes(v.trim())) == Some(value) {
            return None;
        }

        let ending = &line[line.trim_end_matches(['\r', '\n']).len()..];

        let mut out = String::with_capacity(self.open.len() + self.rest.len() + 64);
        out.push_str(self.open);
        for (i, l) in self.lines.iter().enumerate() {
            if i == index {
                out.push_str(key);
                out.push_str(": ");
                out.push_str(value);
                out.push_str(ending);
            } else {
                out.push_str(l);
            }
        }
        out.push_str(self.rest);
        Some(out)
    }
}

/// Text after `key:` when `line` is a top-level entry for `key`.
fn value_of<'l>(line: &'l str, key: &str) -> Option<&'l str> {
    let line = line.trim_end_matches(['\r', '\n']);
    line.strip_prefix(key)?.strip_prefix(':')
}

fn strip_quotes(s: &str) -> &str {
    for q in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(q) && s.ends_with(q) {
            return &s[1..s.len() - 1];
        }
    }
    s
}

/// `version` from the frontmatter of `content`.
pub fn read_version(content: &str) -> Option<String> {
    Frontmatter::parse(content)?.get("version").map(String::from)
}

/// `content` with its frontmatter `version` set, or `None` if nothing changes.
pub fn rewrite_version(content: &str, version: &str) -> Option<String> {
    Frontmatter::parse(content)?.with_value("version", version)
}
