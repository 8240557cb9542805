//! Markdown table rows of the form `| <plugin> | X.Y.Z | ... |`.
//!
//! A row is keyed by its first cell and versioned by its second. Only the
//! second cell's text changes on rewrite; its padding is kept.

use super::Version;

/// Version cell of the first row keyed by `plugin`.
pub fn read_version(content: &str, plugin: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let (start, end) = version_cell(line, plugin)?;
        Some(line[start..end].trim().to_string())
    })
}

/// `content` with every row keyed by `plugin` set to `version`, or `None`
/// when no row needed a change.
pub fn rewrite_version(content: &str, plugin: &str, version: &str) -> Option<String> {
    let mut out = String::with_capacity(content.len());
    let mut changed = false;

    for line in content.split_inclusive('\n') {
        let body = line.trim_end_matches(['\r', '\n']);
        match version_cell(body, plugin) {
            Some((start, end)) if body[start..end].trim() != version => {
                let cell = &body[start..end];
                let lead = &cell[..cell.len() - cell.trim_start().len()];
                let trail = &cell[cell.trim_end().len()..];
                out.push_str(&body[..start]);
                out.push_str(lead);
                out.push_str(version);
                out.push_str(trail);
                out.push_str(&line[end..]);
                changed = true;
            }
            _ => out.push_str(line),
        }
    }

    changed.then_some(out)
}

/// Byte range of the version cell when `line` is a row keyed by `plugin`.
fn version_cell(line: &str, plugin: &str) -> Option<(usize, usize)> {
    let trimmed = line.trim_start();
    if !trimmed.starts_with('|') {
        return None;
    }
    let base = line.len() - trimmed.len() + 1;
    let mut cells = trimmed[1..].split('|');

    let name = cells.next()?;
    let cell = cells.next()?;
    // A row needs a closing pipe after the version cell.
    cells.next()?;

    if name.trim() != plugin || cell.trim().parse::<Version>().is_err() {
        return None;
    }
    let start = base + name.len() + 1;
    Some((start, start + cell.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "\
# Plugins

| Plugin | Version | Description |
|--------|---------|-------------|
| foo | 1.2.0 | Foo tooling |
| foobar | 0.1.0 | Not foo |
| bar |   0.3.1   | Bar tooling |
";

    #[test]
    fn reads_row_by_exact_name() {
        assert_eq!(read_version(DOC, "foo").as_deref(), Some("1.2.0"));
        assert_eq!(read_version(DOC, "foobar").as_deref(), Some("0.1.0"));
        assert_eq!(read_version(DOC, "bar").as_deref(), Some("0.3.1"));
        assert_eq!(read_version(DOC, "baz"), None);
    }

    #[test]
    fn header_row_is_not_a_version() {
        assert_eq!(read_version(DOC, "Plugin"), None);
    }

    #[test]
    fn rewrite_changes_only_the_version_cell() {
        let updated = rewrite_version(DOC, "foo", "1.2.1").unwrap();
        assert_eq!(
            updated,
            DOC.replace("| foo | 1.2.0 |", "| foo | 1.2.1 |")
        );
        assert_eq!(read_version(&updated, "foobar").as_deref(), Some("0.1.0"));
    }

    #[test]
    fn rewrite_keeps_cell_padding() {
        let updated = rewrite_version(DOC, "bar", "0.4.0").unwrap();
        assert!(updated.contains("| bar |   0.4.0   | Bar tooling |"));
    }

    #[test]
    fn rewrite_is_idempotent() {
        let updated = rewrite_version(DOC, "foo", "1.2.1").unwrap();
        assert_eq!(rewrite_version(&updated, "foo", "1.2.1"), None);
        assert_eq!(rewrite_version(DOC, "foo", "1.2.0"), None);
    }

    #[test]
    fn missing_row_is_no_change() {
        assert_eq!(rewrite_version(DOC, "baz", "1.0.0"), None);
    }

    #[test]
    fn every_matching_row_is_rewritten() {
        let doc = "| foo | 1.0.0 |\ntext\n| foo | 1.0.0 | again |\r\n";
        assert_eq!(
            rewrite_version(doc, "foo", "1.1.0").unwrap(),
            "| foo | 1.1.0 |\ntext\n| foo | 1.1.0 | again |\r\n"
        );
    }

    #[test]
    fn non_version_cells_are_ignored() {
        let doc = "| foo | TBD | planned |\n";
        assert_eq!(read_version(doc, "foo"), None);
        assert_eq!(rewrite_version(doc, "foo", "1.0.0"), None);
    }
}
